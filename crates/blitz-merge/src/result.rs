//! Merge result types.

use serde::{Deserialize, Serialize};

/// Why a token was removed from the merged output.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", content = "detail")]
pub enum DropReason {
    /// A later token of the same conflict group won.
    #[serde(rename = "SUPERSEDED")]
    Superseded { group: String, by: usize },

    /// A later literal duplicate of this group-less token was kept.
    #[serde(rename = "DUPLICATE")]
    Duplicate { by: usize },
}

impl DropReason {
    /// Get a machine-readable string representation.
    pub fn to_code(&self) -> String {
        match self {
            DropReason::Superseded { group, by } => format!("SUPERSEDED:{}@{}", group, by),
            DropReason::Duplicate { by } => format!("DUPLICATE@{}", by),
        }
    }

    /// Position of the token that displaced this one.
    pub fn winner(&self) -> usize {
        match self {
            DropReason::Superseded { by, .. } | DropReason::Duplicate { by } => *by,
        }
    }
}

/// A token that survived merging.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct KeptToken {
    /// The token text.
    pub token: String,

    /// Position in the flattened input.
    pub position: usize,

    /// Scoped conflict group, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
}

/// A token removed during merging.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DroppedToken {
    /// The token text.
    pub token: String,

    /// Position in the flattened input.
    pub position: usize,

    /// Why it was removed.
    pub reason: DropReason,
}

/// Full outcome of a merge: survivors in input order plus what was dropped.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct MergeOutcome {
    /// Surviving tokens in ascending position order.
    pub kept: Vec<KeptToken>,

    /// Removed tokens in ascending position order.
    #[serde(default)]
    pub dropped: Vec<DroppedToken>,
}

impl MergeOutcome {
    /// Surviving token texts.
    pub fn tokens(&self) -> Vec<&str> {
        self.kept.iter().map(|k| k.token.as_str()).collect()
    }

    /// Surviving tokens joined by single spaces.
    pub fn to_class_string(&self) -> String {
        self.tokens().join(" ")
    }

    /// Drop reasons as machine-readable strings.
    pub fn drop_codes(&self) -> Vec<String> {
        self.dropped.iter().map(|d| d.reason.to_code()).collect()
    }

    /// Total tokens seen by the merge.
    pub fn input_len(&self) -> usize {
        self.kept.len() + self.dropped.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome() -> MergeOutcome {
        MergeOutcome {
            kept: vec![
                KeptToken {
                    token: "flex".to_string(),
                    position: 0,
                    group: Some("display".to_string()),
                },
                KeptToken {
                    token: "p-4".to_string(),
                    position: 2,
                    group: Some("padding".to_string()),
                },
            ],
            dropped: vec![DroppedToken {
                token: "p-2".to_string(),
                position: 1,
                reason: DropReason::Superseded {
                    group: "padding".to_string(),
                    by: 2,
                },
            }],
        }
    }

    #[test]
    fn test_class_string() {
        assert_eq!(outcome().to_class_string(), "flex p-4");
        assert_eq!(outcome().input_len(), 3);
    }

    #[test]
    fn test_drop_codes() {
        let mut o = outcome();
        o.dropped.push(DroppedToken {
            token: "group".to_string(),
            position: 3,
            reason: DropReason::Duplicate { by: 5 },
        });
        assert_eq!(o.drop_codes(), vec!["SUPERSEDED:padding@2", "DUPLICATE@5"]);
        assert_eq!(o.dropped[1].reason.winner(), 5);
    }

    #[test]
    fn test_serialization() {
        let json = serde_json::to_string(&outcome()).unwrap();
        assert!(json.contains("\"SUPERSEDED\""));
        assert!(json.contains("\"group\":\"padding\""));
    }
}
