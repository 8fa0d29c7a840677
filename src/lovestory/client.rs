use crate::error::{LoveStoryError, Result};
use std::fs;
use std::path::Path;
use tracing::warn;
use uuid::Uuid;

const CLIENT_ID_FILE: &str = "client-id";

/// Per-install random token scoping guestbook reaction de-duplication.
///
/// Generated once, persisted next to the config, and never anything more
/// than that: not an identity, not an authentication token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientId(String);

impl ClientId {
    pub fn from_string(id: String) -> Self {
        Self(id)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Read the persisted token, creating and persisting one on first use.
    /// When the directory cannot be used at all, fall back to a fixed
    /// non-persistent token so reactions still work for the session.
    pub fn load_or_create<P: AsRef<Path>>(dir: P) -> Self {
        match Self::try_load_or_create(dir.as_ref()) {
            Ok(id) => id,
            Err(err) => {
                warn!(error = %err, "client id not persistable; using session token");
                Self("anon".to_string())
            }
        }
    }

    fn try_load_or_create(dir: &Path) -> Result<Self> {
        let path = dir.join(CLIENT_ID_FILE);
        if path.exists() {
            let id = fs::read_to_string(&path).map_err(LoveStoryError::Io)?;
            let id = id.trim();
            if !id.is_empty() {
                return Ok(Self(id.to_string()));
            }
        }

        if !dir.exists() {
            fs::create_dir_all(dir).map_err(LoveStoryError::Io)?;
        }
        let id = Uuid::new_v4().to_string();
        fs::write(&path, &id).map_err(LoveStoryError::Io)?;
        Ok(Self(id))
    }
}

impl std::fmt::Display for ClientId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
