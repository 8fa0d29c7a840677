//! Demo seed content: three placeholder items for a fresh install.
//!
//! Optional tooling, outside the core contract: everything else works
//! fine with zero items. Runs only when the gallery is completely empty.

use crate::media::{self, NewMediaFile};
use crate::model::{MediaItem, MediaKind};
use crate::store::StoreBackend;
use tracing::info;

const DEMO_ITEMS: [(&str, &str); 3] = [
    ("demo-1.txt", "Love Story - Our beginning"),
    ("demo-2.txt", "Memories - Special moments"),
    ("demo-3.txt", "Together - Our journey"),
];

/// Create the demo items if the gallery is empty; a no-op otherwise.
/// Returns whatever was created.
pub fn ensure_demo_content<S: StoreBackend>(store: &mut S) -> Vec<MediaItem> {
    if !media::get_all_media_meta(store).is_empty() {
        return Vec::new();
    }

    let files = DEMO_ITEMS
        .iter()
        .map(|(filename, content)| NewMediaFile {
            filename: filename.to_string(),
            mime: "text/plain".to_string(),
            bytes: content.as_bytes().to_vec(),
        })
        .collect();

    let added = media::add_media_files(store, files, &["demo".to_string()]);

    // Demo payloads are plain text, not pixels; mark them so renderers
    // don't try to decode them as images.
    let added: Vec<MediaItem> = added
        .into_iter()
        .filter_map(|item| {
            media::update_meta(store, item.id, |mut m| {
                m.kind = MediaKind::Text;
                m
            })
        })
        .collect();

    info!(count = added.len(), "seeded demo content");
    added
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::fixtures::StoreFixture;
    use crate::store::memory::InMemoryStore;

    #[test]
    fn empty_gallery_gets_three_text_items() {
        let mut store = InMemoryStore::new();
        let added = ensure_demo_content(&mut store);
        assert_eq!(added.len(), 3);

        let listed = media::get_all_media_meta(&store);
        assert_eq!(listed.len(), 3);
        for item in &listed {
            assert_eq!(item.kind, MediaKind::Text);
            assert_eq!(item.tags, vec!["demo".to_string()]);
            assert!(media::get_media_bytes(&store, item.id).is_some());
        }
    }

    #[test]
    fn seeding_twice_does_not_duplicate() {
        let mut store = InMemoryStore::new();
        ensure_demo_content(&mut store);
        assert!(ensure_demo_content(&mut store).is_empty());
        assert_eq!(media::get_all_media_meta(&store).len(), 3);
    }

    #[test]
    fn non_empty_gallery_is_left_alone() {
        let (fixture, _) = StoreFixture::new().with_image("real.jpg");
        let mut store = fixture.store;
        assert!(ensure_demo_content(&mut store).is_empty());
        assert_eq!(media::get_all_media_meta(&store).len(), 1);
    }
}
