use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::model::navigation::NavigationMode;

pub const DEFAULT_DATA_PATH: &str = "data/classbook.json";

/// Preferences persisted between sessions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserPrefs {
    pub address_book_path: PathBuf,
    pub navigation_mode: NavigationMode,
}

impl Default for UserPrefs {
    fn default() -> Self {
        Self {
            address_book_path: PathBuf::from(DEFAULT_DATA_PATH),
            navigation_mode: NavigationMode::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let prefs: UserPrefs = serde_json::from_str(r#"{"navigation_mode":"TUTORIAL"}"#).unwrap();
        assert_eq!(prefs.navigation_mode, NavigationMode::Tutorial);
        assert_eq!(prefs.address_book_path, PathBuf::from(DEFAULT_DATA_PATH));
    }
}
