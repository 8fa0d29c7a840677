//! # Storage Layer
//!
//! This module defines the persistence abstraction for lovestory. The
//! [`StoreBackend`] trait hides whether data lives on this device or in a
//! remote database-plus-object-storage pair; everything above it is written
//! against the trait, never a concrete backend.
//!
//! ## Contract
//!
//! Storage is a plain key/value space split into four named partitions
//! (see [`Partition`]), one per kind of record the app keeps:
//!
//! - `media`: binary payloads, addressed by item id through the blob
//!   primitives
//! - `meta`: media metadata records (`meta:{id}`) plus the ordered
//!   display index (`media:index`, newest first)
//! - `messages`: the guestbook list under a single `list` key
//! - `settings`: the settings record under a single `settings` key
//!
//! Metadata and payloads are stored separately so listing the gallery never
//! touches payload bytes.
//!
//! Each operation is a single request/response: no sessions, no ordering
//! guarantees between unrelated keys, and no atomicity beyond one key.
//! Read-modify-write sequences built on top of this are last-write-wins.
//!
//! ## Implementations
//!
//! - [`fs::FileStore`]: on-device storage under one directory. Partitions
//!   serialize to `{partition}.json`; payloads land in a sibling `media/`
//!   directory, one file per id.
//! - [`memory::InMemoryStore`]: non-persistent store for tests.
//! - [`remote::RemoteStore`]: Supabase-shaped remote pair with key/value rows
//!   in a REST table, payloads in a public storage bucket. Constructed via
//!   [`remote::RemoteStore::from_env`], which fails with a configuration
//!   error up front instead of handing back a handle that errors later.
//! - [`Backend`]: runtime choice between the local and remote variants.

use crate::error::Result;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

pub mod fs;
pub mod memory;
pub mod remote;

/// The four named partitions of the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Partition {
    Media,
    Meta,
    Messages,
    Settings,
}

impl Partition {
    pub fn name(&self) -> &'static str {
        match self {
            Partition::Media => "media",
            Partition::Meta => "meta",
            Partition::Messages => "messages",
            Partition::Settings => "settings",
        }
    }
}

impl std::fmt::Display for Partition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Whatever a caller needs to render a payload: the raw bytes (local
/// variants) or a fetchable URL (remote variant). Callers treat both forms
/// uniformly and must not assume one or the other.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaSource {
    Bytes(Vec<u8>),
    Url(String),
}

impl MediaSource {
    /// Byte length if the source is already in memory.
    pub fn len(&self) -> Option<usize> {
        match self {
            MediaSource::Bytes(b) => Some(b.len()),
            MediaSource::Url(_) => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, MediaSource::Bytes(b) if b.is_empty())
    }
}

/// Abstract interface over the persistence backend.
///
/// Key/value calls cover metadata-shaped records; the `blob` calls are the
/// payload-side primitives (upload/serve/delete binary content).
pub trait StoreBackend {
    /// Fetch the value stored under a key, `None` if absent.
    fn get(&self, partition: Partition, key: &str) -> Result<Option<Value>>;

    /// Store a value under a key (create or overwrite).
    fn set(&mut self, partition: Partition, key: &str, value: Value) -> Result<()>;

    /// Remove a key. Removing an absent key is not an error.
    fn remove(&mut self, partition: Partition, key: &str) -> Result<()>;

    /// Store a binary payload under a name.
    fn put_blob(&mut self, name: &str, bytes: &[u8], mime: &str) -> Result<()>;

    /// A renderable source for a payload, `None` if absent.
    fn get_blob(&self, name: &str) -> Result<Option<MediaSource>>;

    /// The raw payload bytes, `None` if absent. Remote variants fetch.
    fn read_blob(&self, name: &str) -> Result<Option<Vec<u8>>>;

    /// Delete a binary payload. Deleting an absent payload is not an error.
    fn remove_blob(&mut self, name: &str) -> Result<()>;

    /// Typed read: deserialize the value under a key.
    fn get_json<T: DeserializeOwned>(&self, partition: Partition, key: &str) -> Result<Option<T>>
    where
        Self: Sized,
    {
        match self.get(partition, key)? {
            Some(value) => Ok(Some(serde_json::from_value(value)?)),
            None => Ok(None),
        }
    }

    /// Typed write: serialize a record under a key.
    fn set_json<T: Serialize>(&mut self, partition: Partition, key: &str, value: &T) -> Result<()>
    where
        Self: Sized,
    {
        self.set(partition, key, serde_json::to_value(value)?)
    }
}

/// Runtime-selected backend: one binary, two interchangeable variants.
pub enum Backend {
    Local(fs::FileStore),
    Remote(remote::RemoteStore),
}

impl StoreBackend for Backend {
    fn get(&self, partition: Partition, key: &str) -> Result<Option<Value>> {
        match self {
            Backend::Local(s) => s.get(partition, key),
            Backend::Remote(s) => s.get(partition, key),
        }
    }

    fn set(&mut self, partition: Partition, key: &str, value: Value) -> Result<()> {
        match self {
            Backend::Local(s) => s.set(partition, key, value),
            Backend::Remote(s) => s.set(partition, key, value),
        }
    }

    fn remove(&mut self, partition: Partition, key: &str) -> Result<()> {
        match self {
            Backend::Local(s) => s.remove(partition, key),
            Backend::Remote(s) => s.remove(partition, key),
        }
    }

    fn put_blob(&mut self, name: &str, bytes: &[u8], mime: &str) -> Result<()> {
        match self {
            Backend::Local(s) => s.put_blob(name, bytes, mime),
            Backend::Remote(s) => s.put_blob(name, bytes, mime),
        }
    }

    fn get_blob(&self, name: &str) -> Result<Option<MediaSource>> {
        match self {
            Backend::Local(s) => s.get_blob(name),
            Backend::Remote(s) => s.get_blob(name),
        }
    }

    fn read_blob(&self, name: &str) -> Result<Option<Vec<u8>>> {
        match self {
            Backend::Local(s) => s.read_blob(name),
            Backend::Remote(s) => s.read_blob(name),
        }
    }

    fn remove_blob(&mut self, name: &str) -> Result<()> {
        match self {
            Backend::Local(s) => s.remove_blob(name),
            Backend::Remote(s) => s.remove_blob(name),
        }
    }
}
