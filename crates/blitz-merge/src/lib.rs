//! Conflict-aware class token merging.
//!
//! Takes class strings in precedence order (lowest first) and produces a
//! deduplicated token sequence in which every conflict group keeps only its
//! last member. Which tokens conflict is decided by a [`ConflictTable`],
//! which is data rather than code.

mod result;
mod table;
mod token;

pub use result::{DropReason, DroppedToken, KeptToken, MergeOutcome};
pub use table::{ConflictTable, GroupDef, TableError, TableFile};
pub use token::{parse_token, split_tokens, ParsedToken};

use std::collections::HashMap;

/// Merges class tokens against a conflict table.
///
/// Pure: holds only a shared reference to the table.
#[derive(Debug, Clone, Copy)]
pub struct ClassTokenMerger<'t> {
    table: &'t ConflictTable,
}

impl<'t> ClassTokenMerger<'t> {
    /// Create a merger over the given table.
    pub fn new(table: &'t ConflictTable) -> Self {
        Self { table }
    }

    /// The table used for conflict lookups.
    pub fn table(&self) -> &'t ConflictTable {
        self.table
    }

    /// Merge class strings and return the surviving tokens.
    pub fn merge<I, S>(&self, inputs: I) -> Vec<String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.merge_traced(inputs)
            .kept
            .into_iter()
            .map(|k| k.token)
            .collect()
    }

    /// Merge a single class string into a single class string.
    pub fn merge_str(&self, input: &str) -> String {
        self.merge([input]).join(" ")
    }

    /// Merge class strings, recording why each dropped token lost.
    ///
    /// A token survives when it is the last member of its conflict group,
    /// or, for group-less tokens, the last literal occurrence. Survivors
    /// keep their input order.
    pub fn merge_traced<I, S>(&self, inputs: I) -> MergeOutcome
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let tokens = split_tokens(inputs);
        let groups: Vec<Option<String>> =
            tokens.iter().map(|t| self.table.group_of(t)).collect();

        let mut group_winner: HashMap<&str, usize> = HashMap::new();
        let mut literal_last: HashMap<&str, usize> = HashMap::new();
        for (position, (token, group)) in tokens.iter().zip(&groups).enumerate() {
            match group {
                Some(group) => group_winner.insert(group.as_str(), position),
                None => literal_last.insert(token.as_str(), position),
            };
        }

        let mut outcome = MergeOutcome::default();
        for (position, (token, group)) in tokens.iter().zip(&groups).enumerate() {
            let winner = match group {
                Some(group) => group_winner.get(group.as_str()),
                None => literal_last.get(token.as_str()),
            }
            .copied()
            .unwrap_or(position);

            if winner == position {
                outcome.kept.push(KeptToken {
                    token: token.clone(),
                    position,
                    group: group.clone(),
                });
                continue;
            }

            let reason = match group {
                Some(group) => DropReason::Superseded {
                    group: group.clone(),
                    by: winner,
                },
                None => DropReason::Duplicate { by: winner },
            };
            outcome.dropped.push(DroppedToken {
                token: token.clone(),
                position,
                reason,
            });
        }

        tracing::trace!(
            input = tokens.len(),
            kept = outcome.kept.len(),
            dropped = outcome.dropped.len(),
            "merged class tokens"
        );
        outcome
    }
}

/// Merge class strings against a table.
pub fn merge<I, S>(table: &ConflictTable, inputs: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    ClassTokenMerger::new(table).merge(inputs)
}
