//! Caller-side variant selection.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// A partial mapping from variant group to chosen option.
///
/// Groups left out fall back to the schema's defaults. Ordered so equal
/// selections hash and print identically.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Selection(BTreeMap<String, String>);

impl Selection {
    /// Empty selection: every group takes its default.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, group: impl Into<String>, option: impl Into<String>) -> Self {
        self.insert(group, option);
        self
    }

    /// Select an option, replacing any earlier choice for the group.
    pub fn insert(&mut self, group: impl Into<String>, option: impl Into<String>) {
        self.0.insert(group.into(), option.into());
    }

    /// The option chosen for a group, if any.
    pub fn get(&self, group: &str) -> Option<&str> {
        self.0.get(group).map(String::as_str)
    }

    /// Chosen (group, option) pairs ordered by group name.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(g, o)| (g.as_str(), o.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl<G, O> FromIterator<(G, O)> for Selection
where
    G: Into<String>,
    O: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (G, O)>>(iter: I) -> Self {
        let mut selection = Selection::new();
        for (group, option) in iter {
            selection.insert(group, option);
        }
        selection
    }
}

/// Parse one `group=option` pair.
pub fn parse_pair(s: &str) -> Result<(String, String), String> {
    let (group, option) = s
        .split_once('=')
        .ok_or_else(|| format!("expected group=option, got '{}'", s))?;
    let group = group.trim();
    let option = option.trim();
    if group.is_empty() || option.is_empty() {
        return Err(format!("expected group=option, got '{}'", s));
    }
    Ok((group.to_string(), option.to_string()))
}

impl FromStr for Selection {
    type Err = String;

    /// Parse `variant=secondary,size=lg`. An empty string is an empty selection.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.split(',')
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(parse_pair)
            .collect()
    }
}

impl fmt::Display for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let pairs: Vec<String> = self.iter().map(|(g, o)| format!("{}={}", g, o)).collect();
        write!(f, "{}", pairs.join(","))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_and_get() {
        let selection = Selection::new().with("variant", "outline").with("size", "sm");
        assert_eq!(selection.get("variant"), Some("outline"));
        assert_eq!(selection.get("tone"), None);
        assert_eq!(selection.len(), 2);
    }

    #[test]
    fn test_later_insert_replaces() {
        let selection = Selection::new().with("size", "sm").with("size", "lg");
        assert_eq!(selection.get("size"), Some("lg"));
        assert_eq!(selection.len(), 1);
    }

    #[test]
    fn test_from_str_round_trip() {
        let selection: Selection = "variant=secondary, size=lg".parse().unwrap();
        assert_eq!(selection.get("size"), Some("lg"));
        assert_eq!(selection.to_string(), "size=lg,variant=secondary");
    }

    #[test]
    fn test_from_str_empty() {
        let selection: Selection = "".parse().unwrap();
        assert!(selection.is_empty());
    }

    #[test]
    fn test_parse_pair_errors() {
        assert!(parse_pair("variant").is_err());
        assert!(parse_pair("=outline").is_err());
        assert!(parse_pair("variant=").is_err());
        assert_eq!(
            parse_pair("size=icon").unwrap(),
            ("size".to_string(), "icon".to_string())
        );
    }
}
