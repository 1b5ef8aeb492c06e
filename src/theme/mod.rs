//! Light/dark theme state
//!
//! Two states, `Light ⇄ Dark`, changed only through [`ThemeStore::toggle`]
//! and [`ThemeStore::set`]. The store is created once from the persisted
//! preference and passed by reference to whatever renders the root class.

mod preference;

pub use preference::ThemePreference;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::{PoisonError, RwLock};

use crate::config::user_config_dir;

/// Theme errors
#[derive(Debug, thiserror::Error)]
pub enum ThemeError {
    #[error("Invalid theme '{0}', expected 'light' or 'dark'")]
    InvalidMode(String),

    #[error("Unsupported theme preference schema version {0}")]
    UnsupportedVersion(u32),

    #[error("IO error: {0}")]
    IoError(#[from] io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// Active color scheme
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    #[default]
    Light,
    Dark,
}

impl ThemeMode {
    /// The other mode.
    pub fn toggled(self) -> Self {
        match self {
            ThemeMode::Light => ThemeMode::Dark,
            ThemeMode::Dark => ThemeMode::Light,
        }
    }

    /// Class applied to the document root.
    pub fn class_token(self) -> &'static str {
        self.as_str()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ThemeMode::Light => "light",
            ThemeMode::Dark => "dark",
        }
    }
}

impl fmt::Display for ThemeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ThemeMode {
    type Err = ThemeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "light" => Ok(ThemeMode::Light),
            "dark" => Ok(ThemeMode::Dark),
            other => Err(ThemeError::InvalidMode(other.to_string())),
        }
    }
}

/// Default preference file (`~/.config/blitz-ui/theme.json`).
pub fn default_state_file() -> Option<PathBuf> {
    user_config_dir().map(|dir| dir.join("theme.json"))
}

/// Process-wide theme state, optionally backed by a preference file.
#[derive(Debug)]
pub struct ThemeStore {
    path: Option<PathBuf>,
    mode: RwLock<ThemeMode>,
}

impl ThemeStore {
    /// Load the persisted preference, falling back when none is stored.
    ///
    /// An unreadable preference is logged and treated as absent; the next
    /// change overwrites it.
    pub fn load(path: impl Into<PathBuf>, fallback: ThemeMode) -> Self {
        let path = path.into();
        let mode = if path.exists() {
            match ThemePreference::from_file(&path) {
                Ok(preference) => preference.mode,
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "ignoring unreadable theme preference");
                    fallback
                }
            }
        } else {
            fallback
        };
        tracing::debug!(path = %path.display(), %mode, "theme store loaded");

        Self {
            path: Some(path),
            mode: RwLock::new(mode),
        }
    }

    /// A store that is never persisted.
    pub fn in_memory(mode: ThemeMode) -> Self {
        Self {
            path: None,
            mode: RwLock::new(mode),
        }
    }

    /// Backing preference file, if any.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn current(&self) -> ThemeMode {
        *self.mode.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Flip between light and dark. Returns the new mode.
    pub fn toggle(&self) -> Result<ThemeMode, ThemeError> {
        self.update(ThemeMode::toggled)
    }

    /// Switch to `mode`. Returns the new mode.
    pub fn set(&self, mode: ThemeMode) -> Result<ThemeMode, ThemeError> {
        self.update(|_| mode)
    }

    /// Persist first so a failed write leaves the state unchanged.
    fn update(&self, next: impl FnOnce(ThemeMode) -> ThemeMode) -> Result<ThemeMode, ThemeError> {
        let mut mode = self.mode.write().unwrap_or_else(|poisoned| {
            tracing::warn!("theme lock poisoned, recovering");
            PoisonError::into_inner(poisoned)
        });
        let previous = *mode;
        let updated = next(previous);

        if let Some(path) = &self.path {
            ThemePreference::new(updated).write_to_file(path)?;
        }
        *mode = updated;

        tracing::info!(from = %previous, to = %updated, "theme changed");
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_mode_basics() {
        assert_eq!(ThemeMode::default(), ThemeMode::Light);
        assert_eq!(ThemeMode::Light.toggled(), ThemeMode::Dark);
        assert_eq!(ThemeMode::Dark.toggled(), ThemeMode::Light);
        assert_eq!(ThemeMode::Dark.class_token(), "dark");
        assert_eq!(" Dark ".parse::<ThemeMode>().unwrap(), ThemeMode::Dark);
        assert!(matches!(
            "sepia".parse::<ThemeMode>(),
            Err(ThemeError::InvalidMode(ref m)) if m == "sepia"
        ));
    }

    #[test]
    fn test_in_memory_toggle() {
        let store = ThemeStore::in_memory(ThemeMode::Light);
        assert_eq!(store.toggle().unwrap(), ThemeMode::Dark);
        assert_eq!(store.current(), ThemeMode::Dark);
        assert_eq!(store.toggle().unwrap(), ThemeMode::Light);
        assert!(store.path().is_none());
    }

    #[test]
    fn test_load_uses_fallback_when_missing() {
        let dir = TempDir::new().unwrap();
        let store = ThemeStore::load(dir.path().join("theme.json"), ThemeMode::Dark);
        assert_eq!(store.current(), ThemeMode::Dark);
    }

    #[test]
    fn test_changes_persist() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("theme.json");

        let store = ThemeStore::load(&path, ThemeMode::Light);
        store.set(ThemeMode::Dark).unwrap();

        let reloaded = ThemeStore::load(&path, ThemeMode::Light);
        assert_eq!(reloaded.current(), ThemeMode::Dark);

        reloaded.toggle().unwrap();
        assert_eq!(ThemePreference::from_file(&path).unwrap().mode, ThemeMode::Light);
    }

    #[test]
    fn test_corrupt_preference_falls_back() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("theme.json");
        fs::write(&path, "{not json").unwrap();

        let store = ThemeStore::load(&path, ThemeMode::Dark);
        assert_eq!(store.current(), ThemeMode::Dark);

        store.toggle().unwrap();
        assert_eq!(ThemePreference::from_file(&path).unwrap().mode, ThemeMode::Light);
    }

    #[test]
    fn test_failed_write_keeps_state() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("file");
        fs::write(&blocker, "").unwrap();

        let store = ThemeStore::load(blocker.join("theme.json"), ThemeMode::Light);
        assert!(store.toggle().is_err());
        assert_eq!(store.current(), ThemeMode::Light);
    }

    #[test]
    fn test_concurrent_toggles() {
        let store = ThemeStore::in_memory(ThemeMode::Light);
        std::thread::scope(|scope| {
            for _ in 0..4 {
                scope.spawn(|| store.toggle().unwrap());
            }
        });
        assert_eq!(store.current(), ThemeMode::Light);
    }
}
