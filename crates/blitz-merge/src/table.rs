//! Conflict table: which class tokens are mutually exclusive.
//!
//! A table is data, loaded from TOML. Each group lists literal member tokens
//! and/or regular expressions matched against a token's base utility. Lookup
//! order for a raw token:
//!
//! 1. literal assignment of the raw token as written
//! 2. literal assignment of the base utility (modifiers and `!` removed)
//! 3. the first rule whose pattern matches the base utility
//!
//! Groups found through 2 and 3 are scoped by the token's modifiers, so
//! `hover:bg-primary` and `bg-secondary` never conflict.

use regex_lite::Regex;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::{HashMap, HashSet};
use std::fs;
use std::io;
use std::path::Path;
use std::sync::OnceLock;

use crate::token::parse_token;

/// Built-in Tailwind-style table source.
const BUILTIN_TABLE: &str = include_str!("../tables/tailwind.toml");

/// Errors raised while building or loading a conflict table.
#[derive(Debug, thiserror::Error)]
pub enum TableError {
    #[error("Failed to read conflict table: {0}")]
    Io(#[from] io::Error),

    #[error("Failed to parse conflict table TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid pattern '{pattern}' in group '{group}': {message}")]
    InvalidPattern {
        group: String,
        pattern: String,
        message: String,
    },

    #[error("Token '{token}' assigned to both '{first}' and '{second}'")]
    DuplicateToken {
        token: String,
        first: String,
        second: String,
    },

    #[error("Group '{0}' is declared more than once")]
    DuplicateGroup(String),

    #[error("Group '{0}' has neither tokens nor patterns")]
    EmptyGroup(String),
}

/// On-disk representation of a conflict table.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TableFile {
    /// Data version of the utility taxonomy (e.g. "tailwind-3/1").
    pub version: String,

    /// Conflict groups in rule precedence order.
    #[serde(default)]
    pub groups: Vec<GroupDef>,
}

/// One conflict group definition.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GroupDef {
    /// Group id.
    pub id: String,

    /// Literal member tokens.
    #[serde(default)]
    pub tokens: Vec<String>,

    /// Regular expressions matched against the base utility.
    #[serde(default)]
    pub patterns: Vec<String>,
}

#[derive(Debug, Clone)]
struct ConflictRule {
    group: String,
    pattern: Regex,
}

/// Lookup table from class token to conflict group.
///
/// Immutable once built; share it by reference across threads.
#[derive(Debug, Clone)]
pub struct ConflictTable {
    version: String,
    digest: OnceLock<String>,
    literals: HashMap<String, String>,
    rules: Vec<ConflictRule>,
    group_ids: Vec<String>,
}

impl ConflictTable {
    /// Create an empty table. Every token is group-less.
    pub fn empty(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            digest: OnceLock::new(),
            literals: HashMap::new(),
            rules: Vec::new(),
            group_ids: Vec::new(),
        }
    }

    /// Load the built-in Tailwind-style table.
    pub fn builtin() -> Result<Self, TableError> {
        Self::from_toml_str(BUILTIN_TABLE)
    }

    /// Load a table from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, TableError> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Parse a table from a TOML string.
    pub fn from_toml_str(contents: &str) -> Result<Self, TableError> {
        let file: TableFile = toml::from_str(contents)?;
        let mut table = Self::from_definition(file)?;
        table.digest = OnceLock::from(digest_of(contents.as_bytes()));
        tracing::debug!(
            version = %table.version,
            digest = %table.digest(),
            literals = table.literals.len(),
            rules = table.rules.len(),
            "loaded conflict table"
        );
        Ok(table)
    }

    /// Build a table from an in-memory definition.
    pub fn from_definition(file: TableFile) -> Result<Self, TableError> {
        let mut table = Self::empty(file.version);
        let mut seen = HashSet::new();

        for group in file.groups {
            if !seen.insert(group.id.clone()) {
                return Err(TableError::DuplicateGroup(group.id));
            }
            if group.tokens.is_empty() && group.patterns.is_empty() {
                return Err(TableError::EmptyGroup(group.id));
            }
            for token in &group.tokens {
                table.insert_token(token, &group.id)?;
            }
            for pattern in &group.patterns {
                table.insert_rule(&group.id, pattern)?;
            }
        }

        Ok(table)
    }

    /// Assign a literal token to a group.
    ///
    /// Re-assigning a token to the same group is a no-op; assigning it to a
    /// different group fails, so a token never has two groups.
    pub fn insert_token(&mut self, token: &str, group: &str) -> Result<(), TableError> {
        if let Some(existing) = self.literals.get(token) {
            if existing != group {
                return Err(TableError::DuplicateToken {
                    token: token.to_string(),
                    first: existing.clone(),
                    second: group.to_string(),
                });
            }
            return Ok(());
        }
        self.literals.insert(token.to_string(), group.to_string());
        self.note_group(group);
        self.digest = OnceLock::new();
        Ok(())
    }

    /// Append a utility pattern rule for a group.
    pub fn insert_rule(&mut self, group: &str, pattern: &str) -> Result<(), TableError> {
        let compiled = Regex::new(pattern).map_err(|e| TableError::InvalidPattern {
            group: group.to_string(),
            pattern: pattern.to_string(),
            message: e.to_string(),
        })?;
        self.rules.push(ConflictRule {
            group: group.to_string(),
            pattern: compiled,
        });
        self.note_group(group);
        self.digest = OnceLock::new();
        Ok(())
    }

    /// Builder form of [`insert_token`](Self::insert_token).
    pub fn with_token(mut self, token: &str, group: &str) -> Result<Self, TableError> {
        self.insert_token(token, group)?;
        Ok(self)
    }

    /// Builder form of [`insert_rule`](Self::insert_rule).
    pub fn with_rule(mut self, group: &str, pattern: &str) -> Result<Self, TableError> {
        self.insert_rule(group, pattern)?;
        Ok(self)
    }

    /// Conflict group of a token, scoped by its modifiers.
    pub fn group_of(&self, token: &str) -> Option<String> {
        if let Some(group) = self.literals.get(token) {
            return Some(group.clone());
        }

        let parsed = parse_token(token);
        if parsed.utility.is_empty() {
            return None;
        }

        let base = self.literals.get(parsed.utility).map(String::as_str).or_else(|| {
            self.rules
                .iter()
                .find(|rule| rule.pattern.is_match(parsed.utility))
                .map(|rule| rule.group.as_str())
        })?;

        Some(parsed.scoped_group(base))
    }

    /// Data version declared by the table.
    pub fn version(&self) -> &str {
        &self.version
    }

    /// SHA-256, hex encoded, identifying the table contents.
    ///
    /// Loaded tables hash their TOML source. Tables built or changed in code
    /// hash their version, literal assignments and rules, so two such tables
    /// share a digest only when they assign every token alike.
    pub fn digest(&self) -> &str {
        self.digest.get_or_init(|| self.content_digest())
    }

    /// Group ids in declaration order.
    pub fn group_ids(&self) -> &[String] {
        &self.group_ids
    }

    /// Number of literal assignments.
    pub fn literal_count(&self) -> usize {
        self.literals.len()
    }

    /// Number of pattern rules.
    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    fn content_digest(&self) -> String {
        let mut literals: Vec<(&String, &String)> = self.literals.iter().collect();
        literals.sort();

        let mut hasher = Sha256::new();
        hasher.update(self.version.as_bytes());
        for (token, group) in literals {
            hasher.update(b"\0literal\0");
            hasher.update(token.as_bytes());
            hasher.update(b"\0");
            hasher.update(group.as_bytes());
        }
        for rule in &self.rules {
            hasher.update(b"\0rule\0");
            hasher.update(rule.group.as_bytes());
            hasher.update(b"\0");
            hasher.update(rule.pattern.as_str().as_bytes());
        }
        hex::encode(hasher.finalize())
    }

    fn note_group(&mut self, group: &str) {
        if !self.group_ids.iter().any(|g| g == group) {
            self.group_ids.push(group.to_string());
        }
    }
}

fn digest_of(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}
