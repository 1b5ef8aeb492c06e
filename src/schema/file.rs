//! TOML component definitions.
//!
//! A component file holds one or more `[[component]]` tables:
//!
//! ```toml
//! [[component]]
//! name = "badge"
//! base = "inline-flex items-center rounded-md border"
//!
//! [[component.groups]]
//! name = "variant"
//! [component.groups.options]
//! default = "bg-primary text-primary-foreground"
//! outline = "text-foreground"
//!
//! [component.defaults]
//! variant = "default"
//!
//! [[component.compounds]]
//! tokens = "shadow-none"
//! conditions = { variant = ["outline"] }
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use super::{CompoundRule, SchemaError, VariantSchema};

/// Tokens written as one whitespace-separated string or as an array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TokenList {
    Text(String),
    List(Vec<String>),
}

impl Default for TokenList {
    fn default() -> Self {
        TokenList::Text(String::new())
    }
}

impl TokenList {
    /// Flatten into individual tokens.
    pub fn to_tokens(&self) -> Vec<String> {
        match self {
            TokenList::Text(text) => text.split_whitespace().map(str::to_string).collect(),
            TokenList::List(items) => items
                .iter()
                .flat_map(|item| item.split_whitespace())
                .map(str::to_string)
                .collect(),
        }
    }

    /// Space-joined form.
    pub fn to_text(&self) -> String {
        self.to_tokens().join(" ")
    }
}

/// A compound condition value: one option or a list of accepted options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl OneOrMany {
    fn into_vec(self) -> Vec<String> {
        match self {
            OneOrMany::One(option) => vec![option],
            OneOrMany::Many(options) => options,
        }
    }
}

/// A variant group as written in a file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GroupFile {
    pub name: String,

    /// Option name → tokens.
    #[serde(default)]
    pub options: BTreeMap<String, TokenList>,
}

/// A compound rule as written in a file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompoundFile {
    #[serde(default)]
    pub conditions: BTreeMap<String, OneOrMany>,

    #[serde(default)]
    pub tokens: TokenList,
}

/// One component definition.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SchemaFile {
    pub name: String,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub base: TokenList,

    /// Groups in declaration order.
    #[serde(default)]
    pub groups: Vec<GroupFile>,

    #[serde(default)]
    pub defaults: BTreeMap<String, String>,

    #[serde(default)]
    pub compounds: Vec<CompoundFile>,
}

impl SchemaFile {
    /// Validate and convert into a schema.
    pub fn into_schema(self) -> Result<VariantSchema, SchemaError> {
        let mut builder = VariantSchema::builder(self.name).base(&self.base.to_text());

        if let Some(description) = self.description {
            builder = builder.description(description);
        }

        for group in self.groups {
            let options: Vec<(String, String)> = group
                .options
                .into_iter()
                .map(|(option, tokens)| (option, tokens.to_text()))
                .collect();
            builder = builder.group(group.name, options);
        }

        for (group, option) in self.defaults {
            builder = builder.default_option(group, option);
        }

        for compound in self.compounds {
            let rule = compound
                .conditions
                .into_iter()
                .fold(CompoundRule::new(&compound.tokens.to_text()), |rule, (group, options)| {
                    rule.when_any(group, options.into_vec())
                });
            builder = builder.compound_rule(rule);
        }

        builder.build()
    }
}

/// A file of `[[component]]` definitions.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ComponentFile {
    #[serde(default, rename = "component")]
    pub components: Vec<SchemaFile>,
}

impl ComponentFile {
    /// Load and parse a component file.
    pub fn from_file(path: &Path) -> Result<Self, SchemaError> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Parse component definitions from a TOML string.
    pub fn from_toml_str(contents: &str) -> Result<Self, SchemaError> {
        Ok(toml::from_str(contents)?)
    }

    /// Validate every definition, in file order.
    pub fn into_schemas(self) -> Result<Vec<VariantSchema>, SchemaError> {
        self.components
            .into_iter()
            .map(SchemaFile::into_schema)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Selection;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const BADGE: &str = r#"
[[component]]
name = "badge"
description = "Small status label"
base = "inline-flex items-center rounded-md border"

[[component.groups]]
name = "variant"
[component.groups.options]
default = "border-transparent bg-primary"
outline = ["text-foreground", "bg-transparent"]

[[component.groups]]
name = "size"
[component.groups.options]
sm = "px-2 text-xs"
md = "px-2.5 text-sm"

[component.defaults]
variant = "default"
size = "md"

[[component.compounds]]
tokens = "shadow-none"
conditions = { variant = "outline", size = ["sm", "md"] }
"#;

    #[test]
    fn test_token_list_forms() {
        assert_eq!(
            TokenList::Text(" a  b ".to_string()).to_tokens(),
            vec!["a", "b"]
        );
        assert_eq!(
            TokenList::List(vec!["a b".to_string(), "c".to_string()]).to_tokens(),
            vec!["a", "b", "c"]
        );
        assert!(TokenList::default().to_tokens().is_empty());
    }

    #[test]
    fn test_parse_component_file() {
        let schemas = ComponentFile::from_toml_str(BADGE)
            .unwrap()
            .into_schemas()
            .unwrap();
        assert_eq!(schemas.len(), 1);

        let badge = &schemas[0];
        assert_eq!(badge.name(), "badge");
        assert_eq!(badge.description(), Some("Small status label"));
        assert_eq!(badge.groups()[0].name, "variant");
        assert_eq!(badge.groups()[1].name, "size");
        assert_eq!(badge.default_option("size"), Some("md"));
    }

    #[test]
    fn test_file_compound_conditions() {
        let badge = ComponentFile::from_toml_str(BADGE)
            .unwrap()
            .into_schemas()
            .unwrap()
            .remove(0);

        let outline = badge
            .resolve(&Selection::new().with("variant", "outline"))
            .unwrap();
        assert_eq!(outline.last(), Some(&"shadow-none"));

        let default = badge.resolve(&Selection::new()).unwrap();
        assert!(!default.contains(&"shadow-none"));
    }

    #[test]
    fn test_invalid_default_in_file() {
        let toml = r#"
[[component]]
name = "x"
[[component.groups]]
name = "size"
[component.groups.options]
sm = "a"
[component.defaults]
size = "lg"
"#;
        let result = ComponentFile::from_toml_str(toml).unwrap().into_schemas();
        assert!(matches!(result, Err(SchemaError::UnknownOption { .. })));
    }

    #[test]
    fn test_empty_condition_list_in_file() {
        let toml = r#"
[[component]]
name = "x"
[[component.groups]]
name = "size"
[component.groups.options]
sm = "a"
[[component.compounds]]
tokens = "b"
conditions = { size = [] }
"#;
        let result = ComponentFile::from_toml_str(toml).unwrap().into_schemas();
        assert!(matches!(result, Err(SchemaError::EmptyCondition { .. })));
    }

    #[test]
    fn test_parse_error() {
        let result = ComponentFile::from_toml_str("[[component]\nname=");
        assert!(matches!(result, Err(SchemaError::Parse(_))));
    }

    #[test]
    fn test_from_file() {
        let mut temp = NamedTempFile::new().unwrap();
        write!(temp, "{}", BADGE).unwrap();
        let file = ComponentFile::from_file(temp.path()).unwrap();
        assert_eq!(file.components.len(), 1);
    }
}
