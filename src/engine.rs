//! Conflict table, component registry and result cache bundled together.

use blitz_merge::{ConflictTable, TableError};

use crate::config::{ConfigError, Settings};
use crate::explain::ExplainOutput;
use crate::registry::{ComponentRegistry, RegistryError};
use crate::resolver::{ResolveCache, VariantResolver};
use crate::schema::{ResolveError, Selection};
use crate::theme::ThemeError;

/// Any failure surfaced by the engine or the command-line tool
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Table(#[from] TableError),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Theme(#[from] ThemeError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Resolves registered components against one conflict table.
#[derive(Debug)]
pub struct StyleEngine {
    table: ConflictTable,
    registry: ComponentRegistry,
    cache: ResolveCache,
}

impl StyleEngine {
    pub fn new(table: ConflictTable, registry: ComponentRegistry) -> Self {
        Self {
            table,
            registry,
            cache: ResolveCache::new(),
        }
    }

    /// Built-in table and components.
    pub fn builtin() -> Result<Self, Error> {
        Ok(Self::new(ConflictTable::builtin()?, ComponentRegistry::builtin()?))
    }

    /// Table and components as configured.
    pub fn from_settings(settings: &Settings) -> Result<Self, Error> {
        let table = match &settings.conflict_table {
            Some(path) => ConflictTable::from_file(path)?,
            None => ConflictTable::builtin()?,
        };

        let mut registry = ComponentRegistry::builtin()?;
        if let Some(dir) = &settings.components_dir {
            registry.load_dir(dir)?;
        }

        tracing::debug!(
            table = table.version(),
            components = registry.len(),
            "style engine ready"
        );
        Ok(Self::new(table, registry))
    }

    pub fn table(&self) -> &ConflictTable {
        &self.table
    }

    pub fn registry(&self) -> &ComponentRegistry {
        &self.registry
    }

    pub fn resolver(&self) -> VariantResolver<'_> {
        VariantResolver::new(&self.table)
    }

    /// Class string for a component selection plus override.
    pub fn resolve(
        &self,
        component: &str,
        selection: &Selection,
        override_tokens: &str,
    ) -> Result<String, Error> {
        let schema = self.registry.require(component)?;
        Ok(self
            .cache
            .resolve(&self.resolver(), schema, selection, override_tokens)?)
    }

    /// Traced resolution rendered for the `explain` command.
    pub fn explain(
        &self,
        component: &str,
        selection: &Selection,
        override_tokens: &str,
    ) -> Result<ExplainOutput, Error> {
        let schema = self.registry.require(component)?;
        let resolution = self
            .resolver()
            .resolve_traced(schema, selection, override_tokens)?;
        Ok(ExplainOutput::from_resolution(&resolution, &self.table))
    }

    /// Merge free-form class strings.
    pub fn merge_classes<I, S>(&self, parts: I) -> String
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.resolver().merge_classes(parts)
    }
}
