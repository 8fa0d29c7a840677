use super::{MediaSource, Partition, StoreBackend};
use crate::error::{LoveStoryError, Result};
use serde_json::Value;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// On-device storage rooted at a single directory.
///
/// Layout:
/// ```text
/// <root>/
/// ├── meta.json       # media metadata records + display index
/// ├── messages.json   # guestbook list
/// ├── settings.json   # settings record
/// └── media/          # binary payloads, one file per id
/// ```
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn doc_path(&self, partition: Partition) -> PathBuf {
        self.root.join(format!("{}.json", partition.name()))
    }

    fn blob_path(&self, name: &str) -> PathBuf {
        self.root.join("media").join(name)
    }

    fn ensure_dir(&self, path: &Path) -> Result<()> {
        if !path.exists() {
            fs::create_dir_all(path).map_err(LoveStoryError::Io)?;
        }
        Ok(())
    }

    fn load_doc(&self, partition: Partition) -> Result<HashMap<String, Value>> {
        let path = self.doc_path(partition);
        if !path.exists() {
            return Ok(HashMap::new());
        }
        let content = fs::read_to_string(path).map_err(LoveStoryError::Io)?;
        let doc: HashMap<String, Value> =
            serde_json::from_str(&content).map_err(LoveStoryError::Serialization)?;
        Ok(doc)
    }

    fn save_doc(&self, partition: Partition, doc: &HashMap<String, Value>) -> Result<()> {
        self.ensure_dir(&self.root)?;
        let content = serde_json::to_string_pretty(doc).map_err(LoveStoryError::Serialization)?;
        fs::write(self.doc_path(partition), content).map_err(LoveStoryError::Io)?;
        Ok(())
    }
}

impl StoreBackend for FileStore {
    fn get(&self, partition: Partition, key: &str) -> Result<Option<Value>> {
        let doc = self.load_doc(partition)?;
        Ok(doc.get(key).cloned())
    }

    fn set(&mut self, partition: Partition, key: &str, value: Value) -> Result<()> {
        let mut doc = self.load_doc(partition)?;
        doc.insert(key.to_string(), value);
        self.save_doc(partition, &doc)
    }

    fn remove(&mut self, partition: Partition, key: &str) -> Result<()> {
        let mut doc = self.load_doc(partition)?;
        if doc.remove(key).is_some() {
            self.save_doc(partition, &doc)?;
        }
        Ok(())
    }

    fn put_blob(&mut self, name: &str, bytes: &[u8], _mime: &str) -> Result<()> {
        let path = self.blob_path(name);
        if let Some(dir) = path.parent() {
            self.ensure_dir(dir)?;
        }
        fs::write(path, bytes).map_err(LoveStoryError::Io)?;
        Ok(())
    }

    fn get_blob(&self, name: &str) -> Result<Option<MediaSource>> {
        Ok(self.read_blob(name)?.map(MediaSource::Bytes))
    }

    fn read_blob(&self, name: &str) -> Result<Option<Vec<u8>>> {
        let path = self.blob_path(name);
        if !path.exists() {
            return Ok(None);
        }
        let bytes = fs::read(path).map_err(LoveStoryError::Io)?;
        Ok(Some(bytes))
    }

    fn remove_blob(&mut self, name: &str) -> Result<()> {
        let path = self.blob_path(name);
        if path.exists() {
            fs::remove_file(path).map_err(LoveStoryError::Io)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn get_on_empty_store_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().to_path_buf());
        assert_eq!(store.get(Partition::Meta, "meta:x").unwrap(), None);
        assert_eq!(store.read_blob("x").unwrap(), None);
    }

    #[test]
    fn set_get_remove_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FileStore::new(dir.path().to_path_buf());

        store
            .set(Partition::Meta, "meta:a", json!({"n": 1}))
            .unwrap();
        assert_eq!(
            store.get(Partition::Meta, "meta:a").unwrap(),
            Some(json!({"n": 1}))
        );

        store.remove(Partition::Meta, "meta:a").unwrap();
        assert_eq!(store.get(Partition::Meta, "meta:a").unwrap(), None);
        // Removing again is fine.
        store.remove(Partition::Meta, "meta:a").unwrap();
    }

    #[test]
    fn partitions_do_not_bleed_into_each_other() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FileStore::new(dir.path().to_path_buf());

        store.set(Partition::Meta, "k", json!("meta")).unwrap();
        store.set(Partition::Messages, "k", json!("msg")).unwrap();

        assert_eq!(store.get(Partition::Meta, "k").unwrap(), Some(json!("meta")));
        assert_eq!(
            store.get(Partition::Messages, "k").unwrap(),
            Some(json!("msg"))
        );
    }

    #[test]
    fn blobs_roundtrip_as_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FileStore::new(dir.path().to_path_buf());

        store.put_blob("abc", b"payload", "image/jpeg").unwrap();
        assert_eq!(store.read_blob("abc").unwrap(), Some(b"payload".to_vec()));
        assert_eq!(
            store.get_blob("abc").unwrap(),
            Some(MediaSource::Bytes(b"payload".to_vec()))
        );

        store.remove_blob("abc").unwrap();
        assert_eq!(store.read_blob("abc").unwrap(), None);
        store.remove_blob("abc").unwrap();
    }

    #[test]
    fn data_survives_reopening_the_store() {
        let dir = tempfile::tempdir().unwrap();
        {
            let mut store = FileStore::new(dir.path().to_path_buf());
            store.set(Partition::Settings, "settings", json!({"theme": "dark"})).unwrap();
            store.put_blob("id1", b"bytes", "image/png").unwrap();
        }
        let store = FileStore::new(dir.path().to_path_buf());
        assert_eq!(
            store.get(Partition::Settings, "settings").unwrap(),
            Some(json!({"theme": "dark"}))
        );
        assert_eq!(store.read_blob("id1").unwrap(), Some(b"bytes".to_vec()));
    }
}
