//! Configuration merge system
//!
//! Implements the 4-layer configuration merge:
//! 1. Built-in defaults
//! 2. User config (~/.config/blitz-ui/config.toml)
//! 3. Project config (./blitz-ui.toml, or --config)
//! 4. CLI flags

mod defaults;
mod effective;
mod merge;

pub use defaults::BuiltinDefaults;
pub use effective::{
    ConfigError, ConfigOrigin, ConfigSource, EffectiveConfig, OutputFormat, Settings,
};
pub use merge::{deep_merge, merge_layers};

use std::path::PathBuf;

/// Project config file name, looked up in the working directory.
pub const PROJECT_CONFIG_FILE: &str = "blitz-ui.toml";

/// Per-user configuration directory (`~/.config/blitz-ui`).
pub fn user_config_dir() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|home| PathBuf::from(home).join(".config").join("blitz-ui"))
}

/// Per-user config file path.
pub fn user_config_path() -> Option<PathBuf> {
    user_config_dir().map(|dir| dir.join("config.toml"))
}
