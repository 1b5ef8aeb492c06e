//! Blitz UI styling engine
//!
//! Resolves component variant selections into conflict-free utility class
//! strings. A component's [`VariantSchema`] expands a selection into tokens,
//! caller overrides are appended last, and the class token merger keeps only
//! the last member of every conflict group.

pub mod config;
pub mod engine;
pub mod explain;
pub mod logging;
pub mod registry;
pub mod resolver;
pub mod schema;
pub mod theme;

pub use blitz_merge::{ClassTokenMerger, ConflictTable, DropReason, MergeOutcome, TableError};
pub use config::{ConfigError, EffectiveConfig, OutputFormat, Settings};
pub use engine::{Error, StyleEngine};
pub use explain::ExplainOutput;
pub use registry::{ComponentRegistry, RegistryError};
pub use resolver::{Resolution, ResolveCache, VariantResolver};
pub use schema::{
    CompoundRule, ResolveError, SchemaError, Selection, TokenSource, VariantSchema,
};
pub use theme::{ThemeError, ThemeMode, ThemeStore};
