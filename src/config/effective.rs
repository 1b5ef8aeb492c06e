//! Effective configuration with full provenance
//!
//! The effective config captures the merged configuration plus information
//! about where each layer came from.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use super::defaults::BuiltinDefaults;
use super::merge::merge_layers;
use super::{user_config_path, PROJECT_CONFIG_FILE};
use crate::theme::ThemeMode;

/// Schema version for effective_config
pub const SCHEMA_VERSION: u32 = 1;

/// Schema identifier
pub const SCHEMA_ID: &str = "blitz-ui/effective_config@1";

/// Keys holding file system paths (dot-separated).
const PATH_KEYS: [&str; 3] = ["conflict_table", "components_dir", "theme.state_file"];

/// Origin of a configuration source
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum ConfigOrigin {
    Builtin,
    User,
    Project,
    Cli,
}

/// A contributing config source with provenance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigSource {
    /// Origin of this source
    pub origin: ConfigOrigin,

    /// File path (None for builtin/cli)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    /// SHA-256 digest of raw file bytes (None for builtin/cli)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub digest: Option<String>,
}

/// Output format for `resolve` and `list`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Typed view of the merged configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Conflict table file; None means the built-in table
    pub conflict_table: Option<PathBuf>,

    /// Directory of component files layered over the built-in registry
    pub components_dir: Option<PathBuf>,

    /// Theme used when nothing is persisted
    pub theme_default: ThemeMode,

    /// Persisted theme preference; None means the per-user default path
    pub theme_state_file: Option<PathBuf>,

    pub output_format: OutputFormat,
}

/// Effective configuration with full provenance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EffectiveConfig {
    /// Schema version
    pub schema_version: u32,

    /// Schema identifier
    pub schema_id: String,

    /// When this config was computed
    pub created_at: DateTime<Utc>,

    /// The merged configuration object
    pub config: Value,

    /// Contributing sources in precedence order
    pub sources: Vec<ConfigSource>,
}

impl EffectiveConfig {
    /// Build effective config from layers. Missing files are skipped.
    ///
    /// Relative paths in a config file are taken from that file's
    /// directory; relative paths in CLI overrides stay relative to the
    /// working directory.
    pub fn build(
        user_config_path: Option<&Path>,
        project_config_path: Option<&Path>,
        cli_overrides: Option<Value>,
    ) -> Result<Self, ConfigError> {
        let mut layers = Vec::new();
        let mut sources = Vec::new();

        layers.push(BuiltinDefaults::default().to_value());
        sources.push(ConfigSource {
            origin: ConfigOrigin::Builtin,
            path: None,
            digest: None,
        });

        let files = [
            (ConfigOrigin::User, user_config_path),
            (ConfigOrigin::Project, project_config_path),
        ];
        for (origin, path) in files {
            let Some(path) = path.filter(|p| p.exists()) else {
                continue;
            };
            let (mut value, digest) = Self::load_toml_file(path)?;
            anchor_paths(&mut value, path);
            tracing::info!(origin = ?origin, path = %path.display(), "loaded config layer");
            layers.push(value);
            sources.push(ConfigSource {
                origin,
                path: Some(path.to_string_lossy().to_string()),
                digest: Some(digest),
            });
        }

        if let Some(cli) = cli_overrides {
            layers.push(cli);
            sources.push(ConfigSource {
                origin: ConfigOrigin::Cli,
                path: None,
                digest: None,
            });
        }

        let merged = merge_layers(layers);
        Self::validate_config(&merged)?;

        Ok(Self {
            schema_version: SCHEMA_VERSION,
            schema_id: SCHEMA_ID.to_string(),
            created_at: Utc::now(),
            config: merged,
            sources,
        })
    }

    /// Build from the standard locations.
    ///
    /// An explicit project config must exist; the implicit
    /// `./blitz-ui.toml` and the user config are optional.
    pub fn discover(
        explicit_project: Option<&Path>,
        cli_overrides: Option<Value>,
    ) -> Result<Self, ConfigError> {
        if let Some(path) = explicit_project {
            if !path.exists() {
                return Err(ConfigError::Io {
                    path: path.display().to_string(),
                    source: io::Error::new(io::ErrorKind::NotFound, "config file not found"),
                });
            }
        }

        let user = user_config_path();
        let project = explicit_project
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(PROJECT_CONFIG_FILE));
        Self::build(user.as_deref(), Some(&project), cli_overrides)
    }

    /// Load and parse a TOML file, returning the value and digest
    fn load_toml_file(path: &Path) -> Result<(Value, String), ConfigError> {
        let bytes = fs::read(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;

        let mut hasher = Sha256::new();
        hasher.update(&bytes);
        let digest = hex::encode(hasher.finalize());

        let contents = String::from_utf8_lossy(&bytes);
        let toml_value: toml::Value =
            toml::from_str(&contents).map_err(|source| ConfigError::Parse {
                path: path.display().to_string(),
                source,
            })?;

        Ok((Self::toml_to_json(toml_value), digest))
    }

    /// Convert TOML Value to JSON Value
    fn toml_to_json(toml: toml::Value) -> Value {
        match toml {
            toml::Value::String(s) => Value::String(s),
            toml::Value::Integer(i) => Value::Number(i.into()),
            toml::Value::Float(f) => serde_json::Number::from_f64(f)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            toml::Value::Boolean(b) => Value::Bool(b),
            toml::Value::Datetime(dt) => Value::String(dt.to_string()),
            toml::Value::Array(arr) => {
                Value::Array(arr.into_iter().map(Self::toml_to_json).collect())
            }
            toml::Value::Table(table) => Value::Object(
                table
                    .into_iter()
                    .map(|(k, v)| (k, Self::toml_to_json(v)))
                    .collect(),
            ),
        }
    }

    /// Validate configuration values
    fn validate_config(config: &Value) -> Result<(), ConfigError> {
        let lookup = |path: &str| {
            path.split('.')
                .try_fold(config, |current, part| current.get(part))
        };

        for key in PATH_KEYS {
            match lookup(key) {
                None | Some(Value::Null) | Some(Value::String(_)) => {}
                Some(other) => {
                    return Err(ConfigError::Validation(format!(
                        "{} must be a path string, got {}",
                        key, other
                    )))
                }
            }
        }

        if let Some(theme) = lookup("theme.default") {
            if !matches!(theme.as_str(), Some("light" | "dark")) {
                return Err(ConfigError::Validation(format!(
                    "theme.default must be \"light\" or \"dark\", got {}",
                    theme
                )));
            }
        }

        if let Some(format) = lookup("output.format") {
            if !matches!(format.as_str(), Some("text" | "json")) {
                return Err(ConfigError::Validation(format!(
                    "output.format must be \"text\" or \"json\", got {}",
                    format
                )));
            }
        }

        Ok(())
    }

    /// Typed view of the merged values
    pub fn settings(&self) -> Result<Settings, ConfigError> {
        let theme_default = match self.get_str("theme.default") {
            Some(mode) => mode
                .parse()
                .map_err(|e| ConfigError::Validation(format!("theme.default: {}", e)))?,
            None => ThemeMode::default(),
        };
        let output_format = match self.get_str("output.format") {
            Some("json") => OutputFormat::Json,
            _ => OutputFormat::Text,
        };

        Ok(Settings {
            conflict_table: self.get_path("conflict_table"),
            components_dir: self.get_path("components_dir"),
            theme_default,
            theme_state_file: self.get_path("theme.state_file"),
            output_format,
        })
    }

    /// Serialize to JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Get a config value by path (dot-separated)
    pub fn get(&self, path: &str) -> Option<&Value> {
        let mut current = &self.config;
        for part in path.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    /// Get a config value as string
    pub fn get_str(&self, path: &str) -> Option<&str> {
        self.get(path).and_then(|v| v.as_str())
    }

    fn get_path(&self, path: &str) -> Option<PathBuf> {
        self.get_str(path).map(PathBuf::from)
    }
}

/// Rewrite relative path values of a file layer against the file's directory.
fn anchor_paths(value: &mut Value, file: &Path) {
    let Some(dir) = file.parent() else {
        return;
    };
    for key in PATH_KEYS {
        let pointer = format!("/{}", key.replace('.', "/"));
        if let Some(Value::String(raw)) = value.pointer_mut(&pointer) {
            if Path::new(raw.as_str()).is_relative() {
                let anchored = dir.join(raw.as_str()).to_string_lossy().into_owned();
                *raw = anchored;
            }
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("Invalid TOML in {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("Validation error: {0}")]
    Validation(String),
}
