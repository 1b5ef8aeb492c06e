//! Component registry: named variant schemas.
//!
//! Starts from the built-in definitions and can be layered with a directory
//! of `*.toml` component files; a file component replaces a built-in one of
//! the same name.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::schema::{ComponentFile, SchemaError, VariantSchema};

/// Built-in component definitions.
const BUILTIN_COMPONENTS: &str = include_str!("components.toml");

/// Errors for registry operations
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("Unknown component '{0}'")]
    UnknownComponent(String),

    #[error("Component '{name}' is defined twice in {path}")]
    DuplicateComponent { name: String, path: String },

    #[error("Invalid component file {path}: {source}")]
    Schema {
        path: String,
        #[source]
        source: SchemaError,
    },

    #[error("Failed to scan component directory: {0}")]
    Walk(#[from] walkdir::Error),
}

/// Component kind → schema, ordered by name.
#[derive(Debug, Clone, Default)]
pub struct ComponentRegistry {
    components: BTreeMap<String, VariantSchema>,
}

impl ComponentRegistry {
    /// Registry with no components.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Registry holding the built-in components.
    pub fn builtin() -> Result<Self, RegistryError> {
        let mut registry = Self::empty();
        registry.load_str(BUILTIN_COMPONENTS, "<builtin>")?;
        Ok(registry)
    }

    /// Add a schema, returning the one it replaced.
    pub fn insert(&mut self, schema: VariantSchema) -> Option<VariantSchema> {
        self.components.insert(schema.name().to_string(), schema)
    }

    /// Load the components of one file. Returns how many were loaded.
    pub fn load_file(&mut self, path: &Path) -> Result<usize, RegistryError> {
        let file = ComponentFile::from_file(path).map_err(|source| RegistryError::Schema {
            path: path.display().to_string(),
            source,
        })?;
        self.load_definitions(file, &path.display().to_string())
    }

    /// Load every `*.toml` file under a directory, in path order.
    pub fn load_dir(&mut self, dir: &Path) -> Result<usize, RegistryError> {
        let mut files: Vec<PathBuf> = Vec::new();
        for entry in WalkDir::new(dir).follow_links(true) {
            let entry = entry?;
            let path = entry.path();
            if entry.file_type().is_file() && path.extension().is_some_and(|e| e == "toml") {
                files.push(path.to_path_buf());
            }
        }
        files.sort();

        let mut loaded = 0;
        for file in &files {
            loaded += self.load_file(file)?;
        }
        tracing::debug!(dir = %dir.display(), files = files.len(), loaded, "loaded component directory");
        Ok(loaded)
    }

    fn load_str(&mut self, contents: &str, origin: &str) -> Result<usize, RegistryError> {
        let file = ComponentFile::from_toml_str(contents).map_err(|source| RegistryError::Schema {
            path: origin.to_string(),
            source,
        })?;
        self.load_definitions(file, origin)
    }

    fn load_definitions(&mut self, file: ComponentFile, origin: &str) -> Result<usize, RegistryError> {
        let schemas = file.into_schemas().map_err(|source| RegistryError::Schema {
            path: origin.to_string(),
            source,
        })?;

        let mut names = Vec::with_capacity(schemas.len());
        for schema in &schemas {
            if names.contains(&schema.name()) {
                return Err(RegistryError::DuplicateComponent {
                    name: schema.name().to_string(),
                    path: origin.to_string(),
                });
            }
            names.push(schema.name());
        }

        let count = schemas.len();
        for schema in schemas {
            let name = schema.name().to_string();
            if self.insert(schema).is_some() {
                tracing::warn!(component = %name, origin, "component definition replaced");
            }
        }
        Ok(count)
    }

    pub fn get(&self, name: &str) -> Option<&VariantSchema> {
        self.components.get(name)
    }

    /// Like [`get`](Self::get), failing with `UnknownComponent`.
    pub fn require(&self, name: &str) -> Result<&VariantSchema, RegistryError> {
        self.get(name)
            .ok_or_else(|| RegistryError::UnknownComponent(name.to_string()))
    }

    pub fn names(&self) -> Vec<&str> {
        self.components.keys().map(String::as_str).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &VariantSchema> {
        self.components.values()
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_builtin_registry() {
        let registry = ComponentRegistry::builtin().unwrap();
        assert!(registry.get("button").is_some());
        assert!(registry.get("badge").is_some());
        assert!(registry.get("card").is_some());
        assert_eq!(registry.names()[0], "badge");
    }

    #[test]
    fn test_builtin_button_shape() {
        let registry = ComponentRegistry::builtin().unwrap();
        let button = registry.require("button").unwrap();
        let variant = button.group("variant").unwrap();
        assert_eq!(
            variant.option_names().len(),
            6,
            "default, destructive, ghost, link, outline, secondary"
        );
        assert_eq!(
            button.group("size").unwrap().option_names(),
            vec!["default", "icon", "lg", "sm"]
        );
        assert_eq!(button.default_option("variant"), Some("default"));
        assert_eq!(button.default_option("size"), Some("default"));
    }

    #[test]
    fn test_builtin_tabs_family() {
        let registry = ComponentRegistry::builtin().unwrap();
        for name in ["tabs", "tabs-list", "tabs-trigger", "tabs-content"] {
            assert!(registry.get(name).is_some(), "{} missing", name);
        }
        let trigger = registry.require("tabs-trigger").unwrap();
        assert_eq!(
            trigger.group("variant").unwrap().option_names(),
            vec!["default", "line"]
        );
        assert!(registry.require("tabs").unwrap().base().is_empty());
    }

    #[test]
    fn test_require_unknown() {
        let registry = ComponentRegistry::builtin().unwrap();
        let err = registry.require("carousel").unwrap_err();
        assert!(matches!(err, RegistryError::UnknownComponent(ref n) if n == "carousel"));
    }

    #[test]
    fn test_load_dir_overrides_builtin() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("button.toml"),
            "[[component]]\nname = \"button\"\nbase = \"btn\"\n",
        )
        .unwrap();
        fs::write(
            dir.path().join("chip.toml"),
            "[[component]]\nname = \"chip\"\nbase = \"chip\"\n",
        )
        .unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let mut registry = ComponentRegistry::builtin().unwrap();
        let before = registry.len();
        let loaded = registry.load_dir(dir.path()).unwrap();

        assert_eq!(loaded, 2);
        assert_eq!(registry.len(), before + 1);
        assert_eq!(registry.require("button").unwrap().base(), &["btn".to_string()]);
        assert!(registry.get("chip").is_some());
    }

    #[test]
    fn test_duplicate_within_file_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("dup.toml");
        fs::write(
            &path,
            "[[component]]\nname = \"a\"\n\n[[component]]\nname = \"a\"\n",
        )
        .unwrap();

        let mut registry = ComponentRegistry::empty();
        let err = registry.load_file(&path).unwrap_err();
        assert!(matches!(err, RegistryError::DuplicateComponent { .. }));
    }

    #[test]
    fn test_invalid_file_reports_path() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.toml");
        fs::write(&path, "[[component]]\nname = \"x\"\n[component.defaults]\nsize = \"sm\"\n").unwrap();

        let mut registry = ComponentRegistry::empty();
        let err = registry.load_file(&path).unwrap_err();
        assert!(err.to_string().contains("broken.toml"));
    }

    #[test]
    fn test_missing_dir_is_error() {
        let mut registry = ComponentRegistry::empty();
        assert!(registry.load_dir(Path::new("/nonexistent/components")).is_err());
    }
}
