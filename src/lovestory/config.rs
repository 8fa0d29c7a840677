use crate::error::{LoveStoryError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

const CONFIG_FILENAME: &str = "config.json";

/// Which persistence variant the binary talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    Local,
    Remote,
}

/// Install-level configuration, stored in the data directory as
/// `config.json`. Distinct from the in-store [`crate::model::Settings`]
/// record: this decides how to reach storage, that lives inside it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LoveStoryConfig {
    /// Storage variant to use (`local` or `remote`).
    #[serde(default = "default_backend")]
    pub backend: BackendKind,

    /// Default author name for comments and guestbook entries.
    #[serde(default)]
    pub author: Option<String>,
}

fn default_backend() -> BackendKind {
    BackendKind::Local
}

impl Default for LoveStoryConfig {
    fn default() -> Self {
        Self {
            backend: BackendKind::Local,
            author: None,
        }
    }
}

impl LoveStoryConfig {
    /// Load config from the given directory, or return defaults if not found
    pub fn load<P: AsRef<Path>>(config_dir: P) -> Result<Self> {
        let config_path = config_dir.as_ref().join(CONFIG_FILENAME);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&config_path).map_err(LoveStoryError::Io)?;
        let config: LoveStoryConfig =
            serde_json::from_str(&content).map_err(LoveStoryError::Serialization)?;
        Ok(config)
    }

    /// Save config to the given directory
    pub fn save<P: AsRef<Path>>(&self, config_dir: P) -> Result<()> {
        let config_dir = config_dir.as_ref();

        if !config_dir.exists() {
            fs::create_dir_all(config_dir).map_err(LoveStoryError::Io)?;
        }

        let config_path = config_dir.join(CONFIG_FILENAME);
        let content = serde_json::to_string_pretty(self).map_err(LoveStoryError::Serialization)?;
        fs::write(config_path, content).map_err(LoveStoryError::Io)?;
        Ok(())
    }
}
