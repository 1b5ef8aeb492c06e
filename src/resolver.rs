//! Variant resolution: schema expansion followed by conflict merging.
//!
//! The resolver expands a selection through a [`VariantSchema`], appends the
//! caller's override tokens last and hands everything to the class token
//! merger, so overrides win every conflict.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use blitz_merge::{ClassTokenMerger, ConflictTable, DropReason, MergeOutcome};
use serde::Serialize;

use crate::schema::{ResolveError, Selection, TokenSource, VariantSchema};

/// One token fed to the merger, with where it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InputToken {
    pub token: String,
    pub source: TokenSource,
}

/// A dropped token, with its provenance and the reason it lost.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DroppedInput {
    pub token: String,
    pub position: usize,
    pub source: TokenSource,
    pub reason: DropReason,
}

/// Full trace of one resolution.
#[derive(Debug, Clone, Serialize)]
pub struct Resolution {
    /// Component kind that was resolved.
    pub component: String,

    /// Selection as given by the caller.
    pub requested: Selection,

    /// Selection after default fallback.
    pub effective: Selection,

    /// Override tokens appended after the schema tokens.
    pub override_tokens: Vec<String>,

    /// Every merger input, by position.
    pub inputs: Vec<InputToken>,

    /// Raw merge result; positions index into `inputs`.
    pub outcome: MergeOutcome,
}

impl Resolution {
    /// The final class string.
    pub fn to_class_string(&self) -> String {
        self.outcome.to_class_string()
    }

    /// Surviving tokens.
    pub fn tokens(&self) -> Vec<&str> {
        self.outcome.tokens()
    }

    /// Survivors paired with their provenance.
    pub fn kept(&self) -> Vec<InputToken> {
        self.outcome
            .kept
            .iter()
            .filter_map(|k| self.inputs.get(k.position).cloned())
            .collect()
    }

    /// Dropped tokens paired with their provenance.
    pub fn dropped(&self) -> Vec<DroppedInput> {
        self.outcome
            .dropped
            .iter()
            .filter_map(|d| {
                self.inputs.get(d.position).map(|input| DroppedInput {
                    token: d.token.clone(),
                    position: d.position,
                    source: input.source.clone(),
                    reason: d.reason.clone(),
                })
            })
            .collect()
    }

    /// Provenance of the input token at a position.
    pub fn source_of(&self, position: usize) -> Option<&TokenSource> {
        self.inputs.get(position).map(|i| &i.source)
    }
}

/// Resolves component selections against a conflict table.
#[derive(Debug, Clone, Copy)]
pub struct VariantResolver<'t> {
    merger: ClassTokenMerger<'t>,
}

impl<'t> VariantResolver<'t> {
    pub fn new(table: &'t ConflictTable) -> Self {
        Self {
            merger: ClassTokenMerger::new(table),
        }
    }

    pub fn table(&self) -> &'t ConflictTable {
        self.merger.table()
    }

    /// Resolve a selection plus override into one class string.
    ///
    /// Override tokens are not validated against the schema.
    pub fn resolve(
        &self,
        schema: &VariantSchema,
        selection: &Selection,
        override_tokens: &str,
    ) -> Result<String, ResolveError> {
        Ok(self.resolve_tokens(schema, selection, override_tokens)?.join(" "))
    }

    /// Like [`resolve`](Self::resolve), returning the surviving tokens.
    pub fn resolve_tokens(
        &self,
        schema: &VariantSchema,
        selection: &Selection,
        override_tokens: &str,
    ) -> Result<Vec<String>, ResolveError> {
        let mut tokens = schema.resolve(selection)?;
        tokens.extend(override_tokens.split_whitespace());
        let merged = self.merger.merge(&tokens);
        tracing::debug!(
            component = schema.name(),
            %selection,
            input = tokens.len(),
            output = merged.len(),
            "resolved component classes"
        );
        Ok(merged)
    }

    /// Resolve and keep the full trace for explanation.
    pub fn resolve_traced(
        &self,
        schema: &VariantSchema,
        selection: &Selection,
        override_tokens: &str,
    ) -> Result<Resolution, ResolveError> {
        let effective = schema.effective_selection(selection)?.to_selection();
        let mut inputs: Vec<InputToken> = schema
            .resolve_sourced(selection)?
            .into_iter()
            .map(|t| InputToken {
                token: t.token.to_string(),
                source: t.source,
            })
            .collect();

        let override_tokens: Vec<String> = override_tokens
            .split_whitespace()
            .map(str::to_string)
            .collect();
        inputs.extend(override_tokens.iter().map(|t| InputToken {
            token: t.clone(),
            source: TokenSource::Override,
        }));

        let outcome = self.merger.merge_traced(inputs.iter().map(|i| i.token.as_str()));
        tracing::debug!(
            component = schema.name(),
            %selection,
            kept = outcome.kept.len(),
            dropped = outcome.dropped.len(),
            "traced component resolution"
        );

        Ok(Resolution {
            component: schema.name().to_string(),
            requested: selection.clone(),
            effective,
            override_tokens,
            inputs,
            outcome,
        })
    }

    /// Join class strings and merge them, for components without variants.
    pub fn merge_classes<I, S>(&self, parts: I) -> String
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.merger.merge(parts).join(" ")
    }
}

/// (table digest, schema fingerprint, selection, normalized override)
type CacheKey = (String, String, Selection, String);

/// Entries kept before the cache starts over.
pub const DEFAULT_CACHE_CAPACITY: usize = 4096;

/// Memoizes resolved class strings. Errors are never cached.
///
/// Keys carry the table digest and the schema fingerprint, so one cache may
/// serve several tables and schemas. Once `capacity` entries are held the
/// cache is emptied before the next insert.
#[derive(Debug)]
pub struct ResolveCache {
    entries: RwLock<HashMap<CacheKey, String>>,
    capacity: usize,
}

impl Default for ResolveCache {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CACHE_CAPACITY)
    }
}

impl ResolveCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cache holding at most `capacity` entries (at least one).
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            capacity: capacity.max(1),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Return the cached class string or resolve and remember it.
    pub fn resolve(
        &self,
        resolver: &VariantResolver<'_>,
        schema: &VariantSchema,
        selection: &Selection,
        override_tokens: &str,
    ) -> Result<String, ResolveError> {
        let normalized = override_tokens.split_whitespace().collect::<Vec<_>>().join(" ");
        let key = (
            resolver.table().digest().to_string(),
            schema.fingerprint().to_string(),
            selection.clone(),
            normalized,
        );

        {
            let entries = self.entries.read().unwrap_or_else(|poisoned| {
                tracing::warn!("resolve cache lock poisoned, recovering");
                PoisonError::into_inner(poisoned)
            });
            if let Some(hit) = entries.get(&key) {
                return Ok(hit.clone());
            }
        }

        let resolved = resolver.resolve(schema, selection, &key.3)?;
        let mut entries = self.entries.write().unwrap_or_else(|poisoned| {
            tracing::warn!("resolve cache lock poisoned, recovering");
            PoisonError::into_inner(poisoned)
        });
        if entries.len() >= self.capacity && !entries.contains_key(&key) {
            tracing::debug!(capacity = self.capacity, "resolve cache full, clearing");
            entries.clear();
        }
        entries.insert(key, resolved.clone());
        Ok(resolved)
    }

    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}
