//! # API Facade
//!
//! The single entry point for all lovestory operations, regardless of the
//! client driving them. A thin dispatch layer: normalization and business
//! logic live in the repository modules, storage behavior in `store/`.
//!
//! ## Generic Over StoreBackend
//!
//! `LoveStoryApi<S: StoreBackend>` is generic over the storage backend:
//! - Production: `LoveStoryApi<Backend>` (local or remote, picked at startup)
//! - Testing: `LoveStoryApi<InMemoryStore>`
//!
//! The backend is constructed once and handed in; repositories never
//! reach for an ambient global handle. The facade also carries the
//! install's [`ClientId`], so guestbook reactions are scoped without every
//! caller having to thread the token through.
//!
//! ## Failure Surface
//!
//! Repository operations absorb backend failures (logged, sentinel result)
//! (see the repository modules). The facade adds nothing on top; what a
//! repository returns is what the client sees.

use crate::client::ClientId;
use crate::error::Result;
use crate::export::{self, ExportSummary};
use crate::guestbook::{self, ReactionUpdate};
use crate::media::{self, NewMediaFile};
use crate::model::{GuestbookMessage, MediaItem, Reply, Settings};
use crate::seed;
use crate::settings;
use crate::store::{MediaSource, StoreBackend};
use chrono::{DateTime, Utc};
use std::io::{Seek, Write};
use uuid::Uuid;

/// The main API facade for lovestory operations.
pub struct LoveStoryApi<S: StoreBackend> {
    store: S,
    client: ClientId,
}

impl<S: StoreBackend> LoveStoryApi<S> {
    pub fn new(store: S, client: ClientId) -> Self {
        Self { store, client }
    }

    pub fn client_id(&self) -> &ClientId {
        &self.client
    }

    // --- Media ---

    pub fn add_media_files(
        &mut self,
        files: Vec<NewMediaFile>,
        default_tags: &[String],
    ) -> Vec<MediaItem> {
        media::add_media_files(&mut self.store, files, default_tags)
    }

    pub fn all_media(&self) -> Vec<MediaItem> {
        media::get_all_media_meta(&self.store)
    }

    pub fn media_meta(&self, id: Uuid) -> Option<MediaItem> {
        media::get_media_meta(&self.store, id)
    }

    pub fn media_blob(&self, id: Uuid) -> Option<MediaSource> {
        media::get_media_blob(&self.store, id)
    }

    pub fn media_bytes(&self, id: Uuid) -> Option<Vec<u8>> {
        media::get_media_bytes(&self.store, id)
    }

    pub fn toggle_favorite(&mut self, id: Uuid) -> Option<MediaItem> {
        media::toggle_favorite(&mut self.store, id)
    }

    pub fn rename_media(&mut self, id: Uuid, filename: String) -> Option<MediaItem> {
        media::rename_media(&mut self.store, id, filename)
    }

    pub fn redate_media(&mut self, id: Uuid, at: DateTime<Utc>) -> Option<MediaItem> {
        media::redate_media(&mut self.store, id, at)
    }

    pub fn delete_media(&mut self, id: Uuid) -> bool {
        media::delete_media(&mut self.store, id)
    }

    pub fn add_comment(&mut self, id: Uuid, text: String, author: Option<String>) -> Option<MediaItem> {
        media::add_comment(&mut self.store, id, text, author)
    }

    pub fn add_media_reply(
        &mut self,
        media_id: Uuid,
        comment_id: Uuid,
        name: Option<String>,
        text: String,
    ) -> Option<MediaItem> {
        media::add_reply(&mut self.store, media_id, comment_id, name, text)
    }

    pub fn add_media_reaction(
        &mut self,
        media_id: Uuid,
        comment_id: Uuid,
        emoji: &str,
    ) -> Option<MediaItem> {
        media::add_reaction(&mut self.store, media_id, comment_id, emoji)
    }

    pub fn delete_comment(&mut self, media_id: Uuid, comment_id: Uuid) -> Option<MediaItem> {
        media::delete_comment(&mut self.store, media_id, comment_id)
    }

    pub fn delete_reply(
        &mut self,
        media_id: Uuid,
        comment_id: Uuid,
        reply_id: Uuid,
    ) -> Option<MediaItem> {
        media::delete_reply(&mut self.store, media_id, comment_id, reply_id)
    }

    // --- Guestbook ---

    pub fn guestbook_messages(&self) -> Vec<GuestbookMessage> {
        guestbook::list_messages(&self.store)
    }

    pub fn add_guestbook_message(
        &mut self,
        name: Option<String>,
        text: String,
    ) -> Option<GuestbookMessage> {
        guestbook::add_message(&mut self.store, name, text)
    }

    pub fn delete_guestbook_message(&mut self, id: Uuid) -> bool {
        guestbook::delete_message(&mut self.store, id)
    }

    pub fn add_guestbook_reply(
        &mut self,
        message_id: Uuid,
        name: Option<String>,
        text: String,
    ) -> Option<Reply> {
        guestbook::add_reply(&mut self.store, message_id, name, text)
    }

    /// React as this install's client.
    pub fn react_to_message(&mut self, message_id: Uuid, emoji: &str) -> Option<ReactionUpdate> {
        guestbook::add_reaction(&mut self.store, message_id, &self.client, emoji)
    }

    // --- Settings ---

    pub fn settings(&self) -> Settings {
        settings::get_settings(&self.store)
    }

    pub fn save_settings(&mut self, next: Settings) -> Settings {
        settings::set_settings(&mut self.store, next)
    }

    // --- Export & seed ---

    pub fn export_backup<W: Write + Seek>(&self, writer: W) -> Result<ExportSummary> {
        export::export_backup(&self.store, writer)
    }

    pub fn ensure_demo_content(&mut self) -> Vec<MediaItem> {
        seed::ensure_demo_content(&mut self.store)
    }
}
