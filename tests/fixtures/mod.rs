//! Test fixtures for the resolution corpus
//!
//! Each case names a built-in component, a selection and an override, and
//! expects either the exact class string or an error code.

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Path to the resolution corpus fixture
pub fn resolution_corpus_path() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/resolution_corpus/corpus.json")
}

/// The whole corpus file
#[derive(Debug, Clone, serde::Deserialize)]
pub struct ResolutionCorpus {
    /// Conflict table version the expectations were written against
    pub table_version: String,
    pub cases: Vec<ResolutionCase>,
}

/// One resolution case
#[derive(Debug, Clone, serde::Deserialize)]
pub struct ResolutionCase {
    pub id: String,
    pub description: String,
    pub component: String,
    pub selection: BTreeMap<String, String>,
    #[serde(rename = "override")]
    pub override_tokens: String,
    pub expected: ResolutionExpectation,
}

/// Expected outcome: a class string or an error code
#[derive(Debug, Clone, serde::Deserialize)]
pub struct ResolutionExpectation {
    #[serde(default)]
    pub classes: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Load the corpus from disk
pub fn load_resolution_corpus() -> ResolutionCorpus {
    let path = resolution_corpus_path();
    let json = std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("failed to read {}: {}", path.display(), e));
    serde_json::from_str(&json).expect("corpus.json must parse")
}
