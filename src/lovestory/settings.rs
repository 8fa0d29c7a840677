//! Settings repository: one record, read lazily, written whole.

use crate::model::Settings;
use crate::store::{Partition, StoreBackend};
use tracing::warn;

const SETTINGS_KEY: &str = "settings";

/// The persisted settings, or the stable defaults when nothing has been
/// saved yet (or the record cannot be read).
pub fn get_settings<S: StoreBackend>(store: &S) -> Settings {
    match store.get_json::<Settings>(Partition::Settings, SETTINGS_KEY) {
        Ok(Some(settings)) => settings,
        Ok(None) => Settings::default(),
        Err(err) => {
            warn!(error = %err, "get_settings failed; using defaults");
            Settings::default()
        }
    }
}

/// Overwrite the whole record. There is no partial merge: callers submit
/// the complete record they want persisted.
pub fn set_settings<S: StoreBackend>(store: &mut S, next: Settings) -> Settings {
    if let Err(err) = store.set_json(Partition::Settings, SETTINGS_KEY, &next) {
        warn!(error = %err, "set_settings failed");
    }
    next
}
