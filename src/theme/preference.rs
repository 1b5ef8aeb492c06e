//! Persisted theme preference

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use super::{ThemeError, ThemeMode};

/// Schema version for theme preference files
pub const SCHEMA_VERSION: u32 = 1;

/// Schema identifier
pub const SCHEMA_ID: &str = "blitz-ui/theme_preference@1";

/// The last theme chosen by the user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThemePreference {
    pub schema_version: u32,
    pub schema_id: String,
    pub mode: ThemeMode,
    pub updated_at: DateTime<Utc>,
}

impl ThemePreference {
    pub fn new(mode: ThemeMode) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            schema_id: SCHEMA_ID.to_string(),
            mode,
            updated_at: Utc::now(),
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> Result<Self, ThemeError> {
        let preference: Self = serde_json::from_str(json)?;
        if preference.schema_version != SCHEMA_VERSION {
            return Err(ThemeError::UnsupportedVersion(preference.schema_version));
        }
        Ok(preference)
    }

    /// Write atomically to file (write-then-rename), creating the parent
    /// directory if needed.
    pub fn write_to_file(&self, path: &Path) -> Result<(), ThemeError> {
        let json = self.to_json()?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let temp_path = path.with_extension("tmp");
        fs::write(&temp_path, &json)?;
        fs::rename(&temp_path, path)?;

        Ok(())
    }

    pub fn from_file(path: &Path) -> Result<Self, ThemeError> {
        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_write_and_read_back() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("theme.json");

        let preference = ThemePreference::new(ThemeMode::Dark);
        preference.write_to_file(&path).unwrap();

        assert!(!path.with_extension("tmp").exists());
        assert_eq!(ThemePreference::from_file(&path).unwrap(), preference);
    }

    #[test]
    fn test_json_shape() {
        let json = ThemePreference::new(ThemeMode::Light).to_json().unwrap();
        assert!(json.contains("\"schema_version\": 1"));
        assert!(json.contains("\"mode\": \"light\""));
        assert!(json.contains("updated_at"));
    }

    #[test]
    fn test_rejects_future_version() {
        let json = r#"{
            "schema_version": 2,
            "schema_id": "blitz-ui/theme_preference@2",
            "mode": "dark",
            "updated_at": "2026-01-01T00:00:00Z"
        }"#;
        assert!(matches!(
            ThemePreference::from_json(json),
            Err(ThemeError::UnsupportedVersion(2))
        ));
    }
}
