//! Built-in defaults (layer 1)

use serde::{Deserialize, Serialize};

/// Built-in default configuration values
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuiltinDefaults {
    /// Theme used when no preference is persisted (default: "light")
    pub theme_default: String,

    /// Output format for `resolve` and `list` (default: "text")
    pub output_format: String,
}

impl Default for BuiltinDefaults {
    fn default() -> Self {
        Self {
            theme_default: "light".to_string(),
            output_format: "text".to_string(),
        }
    }
}

impl BuiltinDefaults {
    /// Convert to JSON Value for merging.
    ///
    /// `conflict_table`, `components_dir` and `theme.state_file` have no
    /// built-in value; unset means the built-in table, the built-in registry
    /// and the per-user state file.
    pub fn to_value(&self) -> serde_json::Value {
        serde_json::json!({
            "theme": {
                "default": self.theme_default
            },
            "output": {
                "format": self.output_format
            }
        })
    }
}
