//! Media repository: the gallery's collection of photos and videos.
//!
//! Metadata records and binary payloads are stored under the same id but
//! never together; the `media:index` key holds the display order (newest
//! first). Every operation here is a single read-modify-write against the
//! backend: last write wins at whole-record granularity, which is the
//! accepted behavior for a single-user tool.
//!
//! Backend failures are caught at this boundary: operations log a
//! diagnostic and return `None`/`false`/empty instead of propagating, so a
//! failed call can never take the calling view down with it.

use crate::error::Result;
use crate::model::{Comment, MediaItem, Reply};
use crate::store::{MediaSource, Partition, StoreBackend};
use chrono::{DateTime, Utc};
use tracing::{debug, warn};
use uuid::Uuid;

const INDEX_KEY: &str = "media:index";

fn meta_key(id: Uuid) -> String {
    format!("meta:{}", id)
}

fn blob_name(id: Uuid) -> String {
    id.to_string()
}

/// One file handed in by the upload surface.
#[derive(Debug, Clone)]
pub struct NewMediaFile {
    pub filename: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

fn load_index<S: StoreBackend>(store: &S) -> Result<Vec<Uuid>> {
    Ok(store
        .get_json::<Vec<Uuid>>(Partition::Meta, INDEX_KEY)?
        .unwrap_or_default())
}

fn save_index<S: StoreBackend>(store: &mut S, index: &[Uuid]) -> Result<()> {
    store.set_json(Partition::Meta, INDEX_KEY, &index)
}

/// Store a batch of uploads. Each file gets an id, a payload record and a
/// metadata record, and lands at the front of the index.
///
/// A failure on one file never aborts the batch: the file is skipped, and
/// if its payload went in before the metadata write failed, the payload is
/// deleted again so the pair stays whole. Returns the items that made it.
pub fn add_media_files<S: StoreBackend>(
    store: &mut S,
    files: Vec<NewMediaFile>,
    default_tags: &[String],
) -> Vec<MediaItem> {
    let mut index = match load_index(store) {
        Ok(index) => index,
        Err(err) => {
            warn!(error = %err, "add_media_files: could not load media index");
            Vec::new()
        }
    };

    let mut added = Vec::new();
    for file in files {
        let item = MediaItem::new(
            file.filename,
            file.bytes.len() as u64,
            file.mime,
            default_tags.to_vec(),
        );

        if let Err(err) = store.put_blob(&blob_name(item.id), &file.bytes, &item.mime) {
            warn!(id = %item.id, filename = %item.filename, error = %err,
                "add_media_files: payload upload failed; skipping file");
            continue;
        }

        if let Err(err) = store.set_json(Partition::Meta, &meta_key(item.id), &item) {
            warn!(id = %item.id, filename = %item.filename, error = %err,
                "add_media_files: metadata write failed; skipping file");
            // Take the uploaded payload back out so no orphan is left behind.
            if let Err(err) = store.remove_blob(&blob_name(item.id)) {
                warn!(id = %item.id, error = %err,
                    "add_media_files: could not delete orphaned payload");
            }
            continue;
        }

        index.insert(0, item.id);
        added.push(item);
    }

    if let Err(err) = save_index(store, &index) {
        warn!(error = %err, "add_media_files: could not save media index");
    }

    added
}

/// All metadata records in display order. An id whose record has gone
/// missing is skipped, not fatal.
pub fn get_all_media_meta<S: StoreBackend>(store: &S) -> Vec<MediaItem> {
    let index = match load_index(store) {
        Ok(index) => index,
        Err(err) => {
            warn!(error = %err, "get_all_media_meta: could not load media index");
            return Vec::new();
        }
    };

    let mut items = Vec::with_capacity(index.len());
    for id in index {
        match store.get_json::<MediaItem>(Partition::Meta, &meta_key(id)) {
            Ok(Some(item)) => items.push(item),
            Ok(None) => warn!(%id, "get_all_media_meta: indexed id has no metadata; skipping"),
            Err(err) => warn!(%id, error = %err, "get_all_media_meta: metadata read failed; skipping"),
        }
    }
    items
}

pub fn get_media_meta<S: StoreBackend>(store: &S, id: Uuid) -> Option<MediaItem> {
    match store.get_json::<MediaItem>(Partition::Meta, &meta_key(id)) {
        Ok(item) => item,
        Err(err) => {
            warn!(%id, error = %err, "get_media_meta failed");
            None
        }
    }
}

/// A renderable source for the payload: bytes from the local store, a
/// fetchable URL from the remote one.
pub fn get_media_blob<S: StoreBackend>(store: &S, id: Uuid) -> Option<MediaSource> {
    match store.get_blob(&blob_name(id)) {
        Ok(source) => source,
        Err(err) => {
            warn!(%id, error = %err, "get_media_blob failed");
            None
        }
    }
}

/// The raw payload bytes regardless of backend variant; the export path
/// reads through this.
pub fn get_media_bytes<S: StoreBackend>(store: &S, id: Uuid) -> Option<Vec<u8>> {
    match store.read_blob(&blob_name(id)) {
        Ok(bytes) => bytes,
        Err(err) => {
            warn!(%id, error = %err, "get_media_bytes failed");
            None
        }
    }
}

/// Apply an arbitrary mutation to a metadata record and persist it.
/// Read-modify-write with no lock: two racing updates to the same item
/// resolve last-write-wins.
pub fn update_meta<S, F>(store: &mut S, id: Uuid, mutate: F) -> Option<MediaItem>
where
    S: StoreBackend,
    F: FnOnce(MediaItem) -> MediaItem,
{
    let current = get_media_meta(store, id)?;
    let next = mutate(current);
    match store.set_json(Partition::Meta, &meta_key(id), &next) {
        Ok(()) => Some(next),
        Err(err) => {
            warn!(%id, error = %err, "update_meta: write failed");
            None
        }
    }
}

pub fn toggle_favorite<S: StoreBackend>(store: &mut S, id: Uuid) -> Option<MediaItem> {
    update_meta(store, id, |mut item| {
        item.favorite = !item.favorite;
        item
    })
}

pub fn rename_media<S: StoreBackend>(store: &mut S, id: Uuid, filename: String) -> Option<MediaItem> {
    update_meta(store, id, move |mut item| {
        item.filename = filename;
        item
    })
}

/// Re-date an item to a user-chosen moment.
pub fn redate_media<S: StoreBackend>(
    store: &mut S,
    id: Uuid,
    at: DateTime<Utc>,
) -> Option<MediaItem> {
    update_meta(store, id, move |mut item| {
        item.created_at = at;
        item
    })
}

/// Remove metadata, index entry and payload together. Returns false when
/// the metadata record was already absent.
pub fn delete_media<S: StoreBackend>(store: &mut S, id: Uuid) -> bool {
    match try_delete_media(store, id) {
        Ok(existed) => existed,
        Err(err) => {
            warn!(%id, error = %err, "delete_media failed");
            false
        }
    }
}

fn try_delete_media<S: StoreBackend>(store: &mut S, id: Uuid) -> Result<bool> {
    let existed = store
        .get_json::<MediaItem>(Partition::Meta, &meta_key(id))?
        .is_some();

    let mut index = load_index(store)?;
    index.retain(|x| *x != id);
    save_index(store, &index)?;

    store.remove(Partition::Meta, &meta_key(id))?;
    store.remove_blob(&blob_name(id))?;
    Ok(existed)
}

/// Append a comment with empty replies and reactions.
pub fn add_comment<S: StoreBackend>(
    store: &mut S,
    id: Uuid,
    text: String,
    author: Option<String>,
) -> Option<MediaItem> {
    update_meta(store, id, move |mut item| {
        item.comments.push(Comment::new(text, author));
        item
    })
}

/// Append a reply to a comment's tail (oldest first). Unknown comment ids
/// leave the record unchanged.
pub fn add_reply<S: StoreBackend>(
    store: &mut S,
    media_id: Uuid,
    comment_id: Uuid,
    name: Option<String>,
    text: String,
) -> Option<MediaItem> {
    update_meta(store, media_id, move |mut item| {
        if let Some(comment) = item.comments.iter_mut().find(|c| c.id == comment_id) {
            comment.replies.push(Reply::new(name, text));
        } else {
            debug!(%media_id, %comment_id, "add_reply: comment not found");
        }
        item
    })
}

/// Bump the emoji tally on a comment. Every call counts; there is no
/// per-client de-duplication here, unlike guestbook reactions.
pub fn add_reaction<S: StoreBackend>(
    store: &mut S,
    media_id: Uuid,
    comment_id: Uuid,
    emoji: &str,
) -> Option<MediaItem> {
    let emoji = emoji.to_string();
    update_meta(store, media_id, move |mut item| {
        if let Some(comment) = item.comments.iter_mut().find(|c| c.id == comment_id) {
            *comment.reactions.entry(emoji).or_insert(0) += 1;
        } else {
            debug!(%media_id, %comment_id, "add_reaction: comment not found");
        }
        item
    })
}

pub fn delete_comment<S: StoreBackend>(
    store: &mut S,
    media_id: Uuid,
    comment_id: Uuid,
) -> Option<MediaItem> {
    update_meta(store, media_id, move |mut item| {
        item.comments.retain(|c| c.id != comment_id);
        item
    })
}

pub fn delete_reply<S: StoreBackend>(
    store: &mut S,
    media_id: Uuid,
    comment_id: Uuid,
    reply_id: Uuid,
) -> Option<MediaItem> {
    update_meta(store, media_id, move |mut item| {
        if let Some(comment) = item.comments.iter_mut().find(|c| c.id == comment_id) {
            comment.replies.retain(|r| r.id != reply_id);
        }
        item
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::MediaKind;
    use crate::store::memory::fixtures::{FlakyStore, StoreFixture};
    use crate::store::memory::InMemoryStore;

    fn file(name: &str, mime: &str, bytes: &[u8]) -> NewMediaFile {
        NewMediaFile {
            filename: name.to_string(),
            mime: mime.to_string(),
            bytes: bytes.to_vec(),
        }
    }

    #[test]
    fn added_files_come_back_from_the_listing() {
        let mut store = InMemoryStore::new();
        let added = add_media_files(
            &mut store,
            vec![
                file("a.jpg", "image/jpeg", b"a"),
                file("b.mp4", "video/mp4", b"bb"),
            ],
            &[],
        );
        assert_eq!(added.len(), 2);

        let listed = get_all_media_meta(&store);
        assert_eq!(listed.len(), 2);
        // Later files in a batch land closer to the front.
        assert_eq!(listed[0].filename, "b.mp4");
        assert_eq!(listed[0].kind, MediaKind::Video);
        assert_eq!(listed[1].filename, "a.jpg");
    }

    #[test]
    fn listing_counts_added_minus_deleted() {
        let mut store = InMemoryStore::new();
        add_media_files(&mut store, vec![file("1.jpg", "image/jpeg", b"x")], &[]);
        let added = add_media_files(
            &mut store,
            vec![
                file("2.jpg", "image/jpeg", b"y"),
                file("3.jpg", "image/jpeg", b"z"),
            ],
            &[],
        );
        assert!(delete_media(&mut store, added[0].id));
        assert_eq!(get_all_media_meta(&store).len(), 2);
    }

    #[test]
    fn upload_scenario_sets_the_documented_fields() {
        let mut store = InMemoryStore::new();
        let added = add_media_files(
            &mut store,
            vec![file("sunset.jpg", "image/jpeg", &[0u8; 2048])],
            &[],
        );
        assert_eq!(added.len(), 1);

        let listed = get_all_media_meta(&store);
        assert_eq!(listed.len(), 1);
        let item = &listed[0];
        assert_eq!(item.filename, "sunset.jpg");
        assert_eq!(item.size, 2048);
        assert_eq!(item.kind, MediaKind::Image);
        assert!(!item.favorite);
        assert!(item.comments.is_empty());
    }

    #[test]
    fn batch_tags_are_applied_to_every_file() {
        let mut store = InMemoryStore::new();
        let tags = vec!["trip".to_string()];
        let added = add_media_files(&mut store, vec![file("a.jpg", "image/jpeg", b"a")], &tags);
        assert_eq!(added[0].tags, vec!["trip".to_string()]);
    }

    #[test]
    fn one_failing_file_does_not_abort_the_batch() {
        // Meta set #1 (0-based) is the second file's metadata write.
        let mut store = FlakyStore::failing_meta_sets(vec![1]);
        let added = add_media_files(
            &mut store,
            vec![
                file("ok-1.jpg", "image/jpeg", b"a"),
                file("broken.jpg", "image/jpeg", b"b"),
                file("ok-2.jpg", "image/jpeg", b"c"),
            ],
            &[],
        );

        assert_eq!(added.len(), 2);
        assert_eq!(added[0].filename, "ok-1.jpg");
        assert_eq!(added[1].filename, "ok-2.jpg");

        // The failed file's payload was deleted again: two payloads remain.
        assert_eq!(store.inner.blob_count(), 2);

        let listed = get_all_media_meta(&store);
        assert_eq!(listed.len(), 2);
        assert!(listed.iter().all(|m| m.filename != "broken.jpg"));
    }

    #[test]
    fn listing_skips_an_indexed_id_without_metadata() {
        let (fixture, orphan) = StoreFixture::new().with_images(1).with_image("orphan.jpg");
        let mut store = fixture.store;
        // Simulate the transient inconsistency: metadata gone, index entry left.
        store.remove(Partition::Meta, &meta_key(orphan.id)).unwrap();

        let listed = get_all_media_meta(&store);
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].filename, "photo-1.jpg");
    }

    #[test]
    fn get_media_meta_unknown_id_is_none() {
        let store = InMemoryStore::new();
        assert!(get_media_meta(&store, Uuid::new_v4()).is_none());
    }

    #[test]
    fn blob_comes_back_for_stored_media() {
        let mut store = InMemoryStore::new();
        let added = add_media_files(&mut store, vec![file("a.jpg", "image/jpeg", b"pixels")], &[]);
        let id = added[0].id;

        assert_eq!(
            get_media_blob(&store, id),
            Some(MediaSource::Bytes(b"pixels".to_vec()))
        );
        assert_eq!(get_media_bytes(&store, id), Some(b"pixels".to_vec()));
        assert_eq!(get_media_blob(&store, Uuid::new_v4()), None);
    }

    #[test]
    fn toggle_favorite_twice_restores_the_original_value() {
        let (fixture, item) = StoreFixture::new().with_image("a.jpg");
        let mut store = fixture.store;

        let once = toggle_favorite(&mut store, item.id).unwrap();
        assert!(once.favorite);
        let twice = toggle_favorite(&mut store, item.id).unwrap();
        assert!(!twice.favorite);
        assert!(toggle_favorite(&mut store, Uuid::new_v4()).is_none());
    }

    #[test]
    fn rename_and_redate_persist() {
        let (fixture, item) = StoreFixture::new().with_image("old.jpg");
        let mut store = fixture.store;

        rename_media(&mut store, item.id, "new.jpg".into()).unwrap();
        let when = "2024-02-14T10:00:00Z".parse::<DateTime<Utc>>().unwrap();
        redate_media(&mut store, item.id, when).unwrap();

        let reread = get_media_meta(&store, item.id).unwrap();
        assert_eq!(reread.filename, "new.jpg");
        assert_eq!(reread.created_at, when);
    }

    #[test]
    fn delete_then_get_is_none_and_second_delete_is_false() {
        let (fixture, item) = StoreFixture::new().with_image("a.jpg");
        let mut store = fixture.store;

        assert!(delete_media(&mut store, item.id));
        assert!(get_media_meta(&store, item.id).is_none());
        assert_eq!(get_media_bytes(&store, item.id), None);
        assert!(!delete_media(&mut store, item.id));
    }

    #[test]
    fn comment_then_reply_scenario() {
        let (fixture, item) = StoreFixture::new().with_image("a.jpg");
        let mut store = fixture.store;

        let with_comment = add_comment(&mut store, item.id, "Beautiful!".into(), None).unwrap();
        assert_eq!(with_comment.comments.len(), 1);
        let comment = &with_comment.comments[0];
        assert_eq!(comment.author, "Guest");

        let with_reply = add_reply(
            &mut store,
            item.id,
            comment.id,
            Some("Sam".into()),
            "Agreed".into(),
        )
        .unwrap();
        assert_eq!(with_reply.comments[0].replies.len(), 1);
        assert_eq!(with_reply.comments[0].replies[0].name, "Sam");
    }

    #[test]
    fn media_replies_append_oldest_first() {
        let (fixture, item) = StoreFixture::new().with_image("a.jpg");
        let mut store = fixture.store;
        let comment_id = add_comment(&mut store, item.id, "c".into(), None).unwrap().comments[0].id;

        add_reply(&mut store, item.id, comment_id, None, "first".into()).unwrap();
        let item2 = add_reply(&mut store, item.id, comment_id, None, "second".into()).unwrap();
        let replies = &item2.comments[0].replies;
        assert_eq!(replies[0].text, "first");
        assert_eq!(replies[1].text, "second");
    }

    #[test]
    fn media_reactions_increment_without_dedup() {
        let (fixture, item) = StoreFixture::new().with_image("a.jpg");
        let mut store = fixture.store;
        let comment_id = add_comment(&mut store, item.id, "c".into(), None).unwrap().comments[0].id;

        for _ in 0..5 {
            add_reaction(&mut store, item.id, comment_id, "❤️").unwrap();
        }
        let item2 = get_media_meta(&store, item.id).unwrap();
        assert_eq!(item2.comments[0].reactions.get("❤️"), Some(&5));
    }

    #[test]
    fn reply_to_unknown_comment_returns_the_record_unchanged() {
        let (fixture, item) = StoreFixture::new().with_image("a.jpg");
        let mut store = fixture.store;
        add_comment(&mut store, item.id, "c".into(), None).unwrap();

        let result = add_reply(&mut store, item.id, Uuid::new_v4(), None, "r".into()).unwrap();
        assert!(result.comments[0].replies.is_empty());
    }

    #[test]
    fn comment_and_reply_deletion_go_through_update() {
        let (fixture, item) = StoreFixture::new().with_image("a.jpg");
        let mut store = fixture.store;
        let comment_id = add_comment(&mut store, item.id, "c".into(), None).unwrap().comments[0].id;
        let reply_id = add_reply(&mut store, item.id, comment_id, None, "r".into())
            .unwrap()
            .comments[0]
            .replies[0]
            .id;

        let after_reply = delete_reply(&mut store, item.id, comment_id, reply_id).unwrap();
        assert!(after_reply.comments[0].replies.is_empty());

        let after_comment = delete_comment(&mut store, item.id, comment_id).unwrap();
        assert!(after_comment.comments.is_empty());
    }
}
