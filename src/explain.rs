//! Explain command output for component resolution
//!
//! Provides structured JSON and human-readable explanations of which tokens
//! a resolution kept, which it dropped and why.

use serde::{Deserialize, Serialize};

use blitz_merge::ConflictTable;

use crate::resolver::Resolution;
use crate::schema::{Selection, TokenSource};

/// Explanation of one component resolution
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExplainOutput {
    /// Component kind that was resolved
    pub component: String,

    /// Selection as requested
    pub selection: Selection,

    /// Selection after default fallback
    pub effective_selection: Selection,

    /// Raw override tokens
    pub override_tokens: Vec<String>,

    /// Final class string
    pub classes: String,

    /// Surviving tokens with provenance
    pub kept: Vec<TokenExplanation>,

    /// Removed tokens with provenance and reason
    pub dropped: Vec<DroppedExplanation>,

    /// Conflict table the merge ran against
    pub table: TableInfo,
}

/// A surviving token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenExplanation {
    pub token: String,
    pub position: usize,
    pub source: TokenSource,
    pub group: Option<String>,
}

/// A removed token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DroppedExplanation {
    pub token: String,
    pub position: usize,
    pub source: TokenSource,

    /// Machine-readable reason code
    pub reason: String,

    /// Token that displaced this one
    pub displaced_by: Option<String>,
}

/// Identity of the conflict table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableInfo {
    pub version: String,
    pub digest: String,
}

impl ExplainOutput {
    /// Create an ExplainOutput from a traced resolution
    pub fn from_resolution(resolution: &Resolution, table: &ConflictTable) -> Self {
        let source_at = |position: usize| {
            resolution
                .source_of(position)
                .cloned()
                .unwrap_or(TokenSource::Override)
        };

        let kept = resolution
            .outcome
            .kept
            .iter()
            .map(|k| TokenExplanation {
                token: k.token.clone(),
                position: k.position,
                source: source_at(k.position),
                group: k.group.clone(),
            })
            .collect();

        let dropped = resolution
            .outcome
            .dropped
            .iter()
            .map(|d| DroppedExplanation {
                token: d.token.clone(),
                position: d.position,
                source: source_at(d.position),
                reason: d.reason.to_code(),
                displaced_by: resolution
                    .inputs
                    .get(d.reason.winner())
                    .map(|i| i.token.clone()),
            })
            .collect();

        Self {
            component: resolution.component.clone(),
            selection: resolution.requested.clone(),
            effective_selection: resolution.effective.clone(),
            override_tokens: resolution.override_tokens.clone(),
            classes: resolution.to_class_string(),
            kept,
            dropped,
            table: TableInfo {
                version: table.version().to_string(),
                digest: table.digest().to_string(),
            },
        }
    }

    /// Format as JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Format as human-readable text
    pub fn to_human(&self) -> String {
        let mut lines = Vec::new();

        lines.push(format!("Component: {}", self.component));
        lines.push(format!("Selection: {}", display_selection(&self.effective_selection)));
        if !self.override_tokens.is_empty() {
            lines.push(format!("Override: {}", self.override_tokens.join(" ")));
        }
        lines.push(String::new());
        lines.push(format!("Classes: {}", self.classes));

        lines.push(String::new());
        lines.push("Kept:".to_string());
        for token in &self.kept {
            lines.push(format!(
                "  {:<32} {}",
                token.token,
                format_source(&token.source)
            ));
        }

        if !self.dropped.is_empty() {
            lines.push(String::new());
            lines.push("Dropped:".to_string());
            for token in &self.dropped {
                let by = token.displaced_by.as_deref().unwrap_or("?");
                lines.push(format!(
                    "  {:<32} {} (by {}, {})",
                    token.token,
                    format_source(&token.source),
                    by,
                    token.reason
                ));
            }
        }

        lines.push(String::new());
        lines.push(format!(
            "Conflict table: {} ({})",
            self.table.version,
            short_digest(&self.table.digest)
        ));

        lines.join("\n")
    }
}

fn display_selection(selection: &Selection) -> String {
    if selection.is_empty() {
        "(none)".to_string()
    } else {
        selection.to_string()
    }
}

/// Format a token source for human reading
fn format_source(source: &TokenSource) -> String {
    match source {
        TokenSource::Base => "base".to_string(),
        TokenSource::Variant { group, option } => format!("{}={}", group, option),
        TokenSource::Compound { index } => format!("compound #{}", index),
        TokenSource::Override => "override".to_string(),
    }
}

fn short_digest(digest: &str) -> &str {
    digest.get(..12).unwrap_or(digest)
}
