use super::{MediaSource, Partition, StoreBackend};
use crate::error::Result;
use serde_json::Value;
use std::collections::HashMap;

/// In-memory storage for testing and development.
/// Does NOT persist data.
#[derive(Default)]
pub struct InMemoryStore {
    records: HashMap<(Partition, String), Value>,
    blobs: HashMap<String, (Vec<u8>, String)>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored payloads, used by tests checking orphan cleanup.
    pub fn blob_count(&self) -> usize {
        self.blobs.len()
    }
}

impl StoreBackend for InMemoryStore {
    fn get(&self, partition: Partition, key: &str) -> Result<Option<Value>> {
        Ok(self.records.get(&(partition, key.to_string())).cloned())
    }

    fn set(&mut self, partition: Partition, key: &str, value: Value) -> Result<()> {
        self.records.insert((partition, key.to_string()), value);
        Ok(())
    }

    fn remove(&mut self, partition: Partition, key: &str) -> Result<()> {
        self.records.remove(&(partition, key.to_string()));
        Ok(())
    }

    fn put_blob(&mut self, name: &str, bytes: &[u8], mime: &str) -> Result<()> {
        self.blobs
            .insert(name.to_string(), (bytes.to_vec(), mime.to_string()));
        Ok(())
    }

    fn get_blob(&self, name: &str) -> Result<Option<MediaSource>> {
        Ok(self.read_blob(name)?.map(MediaSource::Bytes))
    }

    fn read_blob(&self, name: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.blobs.get(name).map(|(bytes, _)| bytes.clone()))
    }

    fn remove_blob(&mut self, name: &str) -> Result<()> {
        self.blobs.remove(name);
        Ok(())
    }
}

// --- Test Fixtures ---

#[cfg(any(test, feature = "test_utils"))]
pub mod fixtures {
    use super::*;
    use crate::error::LoveStoryError;
    use crate::guestbook;
    use crate::media::{self, NewMediaFile};
    use crate::model::{GuestbookMessage, MediaItem};

    pub struct StoreFixture {
        pub store: InMemoryStore,
    }

    impl Default for StoreFixture {
        fn default() -> Self {
            Self::new()
        }
    }

    impl StoreFixture {
        pub fn new() -> Self {
            Self {
                store: InMemoryStore::new(),
            }
        }

        pub fn with_images(mut self, count: usize) -> Self {
            let files = (0..count)
                .map(|i| NewMediaFile {
                    filename: format!("photo-{}.jpg", i + 1),
                    mime: "image/jpeg".to_string(),
                    bytes: format!("jpeg bytes {}", i + 1).into_bytes(),
                })
                .collect();
            media::add_media_files(&mut self.store, files, &[]);
            self
        }

        pub fn with_image(mut self, filename: &str) -> (Self, MediaItem) {
            let added = media::add_media_files(
                &mut self.store,
                vec![NewMediaFile {
                    filename: filename.to_string(),
                    mime: "image/jpeg".to_string(),
                    bytes: b"jpeg bytes".to_vec(),
                }],
                &[],
            );
            let item = added.into_iter().next().expect("fixture image added");
            (self, item)
        }

        pub fn with_message(mut self, name: &str, text: &str) -> (Self, GuestbookMessage) {
            let msg = guestbook::add_message(&mut self.store, Some(name.to_string()), text.to_string())
                .expect("fixture message added");
            (self, msg)
        }
    }

    /// A store that fails selected metadata writes, for exercising the
    /// partial-failure paths. `fail_meta_set_calls` holds 0-based indexes
    /// into the sequence of `set` calls on the Meta partition.
    pub struct FlakyStore {
        pub inner: InMemoryStore,
        pub fail_meta_set_calls: Vec<usize>,
        meta_sets_seen: usize,
    }

    impl FlakyStore {
        pub fn failing_meta_sets(calls: Vec<usize>) -> Self {
            Self {
                inner: InMemoryStore::new(),
                fail_meta_set_calls: calls,
                meta_sets_seen: 0,
            }
        }
    }

    impl StoreBackend for FlakyStore {
        fn get(&self, partition: Partition, key: &str) -> Result<Option<Value>> {
            self.inner.get(partition, key)
        }

        fn set(&mut self, partition: Partition, key: &str, value: Value) -> Result<()> {
            if partition == Partition::Meta {
                let call = self.meta_sets_seen;
                self.meta_sets_seen += 1;
                if self.fail_meta_set_calls.contains(&call) {
                    return Err(LoveStoryError::Store(format!(
                        "injected failure writing {}",
                        key
                    )));
                }
            }
            self.inner.set(partition, key, value)
        }

        fn remove(&mut self, partition: Partition, key: &str) -> Result<()> {
            self.inner.remove(partition, key)
        }

        fn put_blob(&mut self, name: &str, bytes: &[u8], mime: &str) -> Result<()> {
            self.inner.put_blob(name, bytes, mime)
        }

        fn get_blob(&self, name: &str) -> Result<Option<MediaSource>> {
            self.inner.get_blob(name)
        }

        fn read_blob(&self, name: &str) -> Result<Option<Vec<u8>>> {
            self.inner.read_blob(name)
        }

        fn remove_blob(&mut self, name: &str) -> Result<()> {
            self.inner.remove_blob(name)
        }
    }
}
