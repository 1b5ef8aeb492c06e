//! Variant schemas: the declared styling surface of a component kind.
//!
//! A schema lists base tokens, named variant groups mapping options to
//! tokens, a default option per group and compound rules. It is validated
//! once at construction and immutable afterwards.

mod error;
mod file;
mod selection;

pub use error::{ResolveError, SchemaError};
pub use file::{CompoundFile, ComponentFile, GroupFile, OneOrMany, SchemaFile, TokenList};
pub use selection::{parse_pair, Selection};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, HashSet};

/// One option of a variant group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VariantOption {
    pub name: String,
    pub tokens: Vec<String>,
}

/// A named axis of mutually exclusive options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VariantGroup {
    pub name: String,
    pub options: Vec<VariantOption>,
}

impl VariantGroup {
    /// Look up an option by name.
    pub fn option(&self, name: &str) -> Option<&VariantOption> {
        self.options.iter().find(|o| o.name == name)
    }

    /// Option names in declaration order.
    pub fn option_names(&self) -> Vec<&str> {
        self.options.iter().map(|o| o.name.as_str()).collect()
    }
}

/// Extra tokens applied when the effective selection matches every condition.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CompoundRule {
    /// Group → accepted options. A condition matches when the effective
    /// option of the group is any of its accepted options.
    pub conditions: BTreeMap<String, Vec<String>>,
    pub tokens: Vec<String>,
}

impl CompoundRule {
    /// Rule applying the given whitespace-separated tokens.
    pub fn new(tokens: &str) -> Self {
        Self {
            conditions: BTreeMap::new(),
            tokens: tokens.split_whitespace().map(str::to_string).collect(),
        }
    }

    /// Require `group` to resolve to `option`.
    pub fn when(self, group: impl Into<String>, option: impl Into<String>) -> Self {
        self.when_any(group, [option])
    }

    /// Require `group` to resolve to any of `options`.
    pub fn when_any<I, O>(mut self, group: impl Into<String>, options: I) -> Self
    where
        I: IntoIterator<Item = O>,
        O: Into<String>,
    {
        self.conditions
            .entry(group.into())
            .or_default()
            .extend(options.into_iter().map(Into::into));
        self
    }

    fn matches(&self, effective: &EffectiveSelection<'_>) -> bool {
        self.conditions.iter().all(|(group, accepted)| {
            effective
                .get(group)
                .is_some_and(|option| accepted.iter().any(|a| a == option))
        })
    }
}

/// Where a resolved token came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TokenSource {
    Base,
    Variant { group: String, option: String },
    Compound { index: usize },
    Override,
}

/// A resolved token with its provenance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourcedToken<'s> {
    pub token: &'s str,
    pub source: TokenSource,
}

/// Selection after default fallback, in group declaration order.
#[derive(Debug, Clone)]
pub struct EffectiveSelection<'s> {
    chosen: Vec<(&'s VariantGroup, &'s VariantOption)>,
}

impl<'s> EffectiveSelection<'s> {
    /// Effective option of a group, if it has one.
    pub fn get(&self, group: &str) -> Option<&'s str> {
        self.chosen
            .iter()
            .find(|(g, _)| g.name == group)
            .map(|(_, o)| o.name.as_str())
    }

    /// (group, option) pairs in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&'s str, &'s str)> + '_ {
        self.chosen
            .iter()
            .map(|(g, o)| (g.name.as_str(), o.name.as_str()))
    }

    /// Owned copy, ordered by group name.
    pub fn to_selection(&self) -> Selection {
        self.iter().collect()
    }
}

/// Declared styling surface of one component kind.
///
/// Deserializes from the component file layout ([`SchemaFile`]) and is
/// validated on the way in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "SchemaFile")]
pub struct VariantSchema {
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    base: Vec<String>,
    groups: Vec<VariantGroup>,
    defaults: BTreeMap<String, String>,
    compounds: Vec<CompoundRule>,
    #[serde(skip)]
    fingerprint: String,
}

impl TryFrom<SchemaFile> for VariantSchema {
    type Error = SchemaError;

    fn try_from(file: SchemaFile) -> Result<Self, Self::Error> {
        file.into_schema()
    }
}

impl VariantSchema {
    /// Start building a schema for a component kind.
    pub fn builder(name: impl Into<String>) -> SchemaBuilder {
        SchemaBuilder::new(name)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn base(&self) -> &[String] {
        &self.base
    }

    /// Groups in declaration order.
    pub fn groups(&self) -> &[VariantGroup] {
        &self.groups
    }

    pub fn group(&self, name: &str) -> Option<&VariantGroup> {
        self.groups.iter().find(|g| g.name == name)
    }

    pub fn defaults(&self) -> &BTreeMap<String, String> {
        &self.defaults
    }

    pub fn default_option(&self, group: &str) -> Option<&str> {
        self.defaults.get(group).map(String::as_str)
    }

    pub fn compounds(&self) -> &[CompoundRule] {
        &self.compounds
    }

    /// SHA-256 over the whole definition, hex encoded. Equal only for
    /// schemas that resolve every selection alike.
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    /// Apply default fallback to a selection and validate it.
    ///
    /// Every selected group must be declared and every resolved option must
    /// exist. Groups with neither a selection nor a default are left out.
    pub fn effective_selection(
        &self,
        selection: &Selection,
    ) -> Result<EffectiveSelection<'_>, ResolveError> {
        if let Some((group, _)) = selection.iter().find(|(g, _)| self.group(g).is_none()) {
            return Err(ResolveError::UnknownGroup {
                schema: self.name.clone(),
                group: group.to_string(),
            });
        }

        let mut chosen = Vec::with_capacity(self.groups.len());
        for group in &self.groups {
            let Some(option_name) = selection
                .get(&group.name)
                .or_else(|| self.default_option(&group.name))
            else {
                continue;
            };
            let option = group
                .option(option_name)
                .ok_or_else(|| ResolveError::UnknownOption {
                    schema: self.name.clone(),
                    group: group.name.clone(),
                    option: option_name.to_string(),
                })?;
            chosen.push((group, option));
        }

        Ok(EffectiveSelection { chosen })
    }

    /// Expand a selection into ordered tokens: base, then each group's
    /// option in declaration order, then matching compounds in order.
    /// Duplicates are kept; merging removes them.
    pub fn resolve(&self, selection: &Selection) -> Result<Vec<&str>, ResolveError> {
        Ok(self
            .resolve_sourced(selection)?
            .into_iter()
            .map(|t| t.token)
            .collect())
    }

    /// Like [`resolve`](Self::resolve), tagging every token with its source.
    pub fn resolve_sourced(
        &self,
        selection: &Selection,
    ) -> Result<Vec<SourcedToken<'_>>, ResolveError> {
        let effective = self.effective_selection(selection)?;
        let mut tokens = Vec::new();

        tokens.extend(self.base.iter().map(|t| SourcedToken {
            token: t.as_str(),
            source: TokenSource::Base,
        }));

        for &(group, option) in &effective.chosen {
            tokens.extend(option.tokens.iter().map(|t| SourcedToken {
                token: t.as_str(),
                source: TokenSource::Variant {
                    group: group.name.clone(),
                    option: option.name.clone(),
                },
            }));
        }

        for (index, rule) in self.compounds.iter().enumerate() {
            if rule.matches(&effective) {
                tokens.extend(rule.tokens.iter().map(|t| SourcedToken {
                    token: t.as_str(),
                    source: TokenSource::Compound { index },
                }));
            }
        }

        Ok(tokens)
    }

    fn validate(&self) -> Result<(), SchemaError> {
        if self.name.trim().is_empty() {
            return Err(SchemaError::MissingName);
        }

        let mut seen_groups = HashSet::new();
        for group in &self.groups {
            if !seen_groups.insert(group.name.as_str()) {
                return Err(SchemaError::DuplicateGroup {
                    schema: self.name.clone(),
                    group: group.name.clone(),
                });
            }
            if group.options.is_empty() {
                return Err(SchemaError::EmptyGroup {
                    schema: self.name.clone(),
                    group: group.name.clone(),
                });
            }
            let mut seen_options = HashSet::new();
            for option in &group.options {
                if !seen_options.insert(option.name.as_str()) {
                    return Err(SchemaError::DuplicateOption {
                        schema: self.name.clone(),
                        group: group.name.clone(),
                        option: option.name.clone(),
                    });
                }
                self.check_tokens(&option.tokens)?;
            }
        }
        self.check_tokens(&self.base)?;

        for (group, option) in &self.defaults {
            self.check_reference("default", group, option)?;
        }

        for (index, rule) in self.compounds.iter().enumerate() {
            let context = format!("compound #{}", index);
            self.check_tokens(&rule.tokens)?;
            for (group, options) in &rule.conditions {
                if options.is_empty() {
                    return Err(SchemaError::EmptyCondition {
                        schema: self.name.clone(),
                        context,
                        group: group.clone(),
                    });
                }
                for option in options {
                    self.check_reference(&context, group, option)?;
                }
            }
        }

        Ok(())
    }

    /// Tokens are single class names: non-empty, no whitespace.
    fn check_tokens(&self, tokens: &[String]) -> Result<(), SchemaError> {
        match tokens
            .iter()
            .find(|t| t.is_empty() || t.contains(char::is_whitespace))
        {
            Some(token) => Err(SchemaError::InvalidToken {
                schema: self.name.clone(),
                token: token.clone(),
            }),
            None => Ok(()),
        }
    }

    fn compute_fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        let mut field = |tag: &str, value: &str| {
            hasher.update(tag.as_bytes());
            hasher.update(b"\0");
            hasher.update(value.as_bytes());
            hasher.update(b"\0");
        };

        field("name", &self.name);
        for token in &self.base {
            field("base", token);
        }
        for group in &self.groups {
            field("group", &group.name);
            for option in &group.options {
                field("option", &option.name);
                for token in &option.tokens {
                    field("token", token);
                }
            }
        }
        for (group, option) in &self.defaults {
            field("default", group);
            field("=", option);
        }
        for rule in &self.compounds {
            field("compound", "");
            for (group, options) in &rule.conditions {
                field("when", group);
                for option in options {
                    field("=", option);
                }
            }
            for token in &rule.tokens {
                field("token", token);
            }
        }

        hex::encode(hasher.finalize())
    }

    fn check_reference(&self, context: &str, group: &str, option: &str) -> Result<(), SchemaError> {
        let Some(declared) = self.group(group) else {
            return Err(SchemaError::UnknownGroup {
                schema: self.name.clone(),
                context: context.to_string(),
                group: group.to_string(),
            });
        };
        if declared.option(option).is_none() {
            return Err(SchemaError::UnknownOption {
                schema: self.name.clone(),
                context: context.to_string(),
                group: group.to_string(),
                option: option.to_string(),
            });
        }
        Ok(())
    }
}

/// Builder for [`VariantSchema`]. Validation happens in [`build`](Self::build).
#[derive(Debug, Clone)]
pub struct SchemaBuilder {
    schema: VariantSchema,
}

impl SchemaBuilder {
    fn new(name: impl Into<String>) -> Self {
        Self {
            schema: VariantSchema {
                name: name.into(),
                description: None,
                base: Vec::new(),
                groups: Vec::new(),
                defaults: BTreeMap::new(),
                compounds: Vec::new(),
                fingerprint: String::new(),
            },
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.schema.description = Some(description.into());
        self
    }

    /// Append whitespace-separated base tokens.
    pub fn base(mut self, tokens: &str) -> Self {
        self.schema
            .base
            .extend(tokens.split_whitespace().map(str::to_string));
        self
    }

    /// Declare a variant group with (option, tokens) pairs.
    pub fn group<I, O, T>(mut self, name: impl Into<String>, options: I) -> Self
    where
        I: IntoIterator<Item = (O, T)>,
        O: Into<String>,
        T: AsRef<str>,
    {
        let options = options
            .into_iter()
            .map(|(option, tokens)| VariantOption {
                name: option.into(),
                tokens: tokens
                    .as_ref()
                    .split_whitespace()
                    .map(str::to_string)
                    .collect(),
            })
            .collect();
        self.schema.groups.push(VariantGroup {
            name: name.into(),
            options,
        });
        self
    }

    /// Set the default option of a group.
    pub fn default_option(mut self, group: impl Into<String>, option: impl Into<String>) -> Self {
        self.schema.defaults.insert(group.into(), option.into());
        self
    }

    /// Add a compound applying `tokens` when every (group, option) matches.
    pub fn compound<I, G, O>(self, conditions: I, tokens: &str) -> Self
    where
        I: IntoIterator<Item = (G, O)>,
        G: Into<String>,
        O: Into<String>,
    {
        let rule = conditions
            .into_iter()
            .fold(CompoundRule::new(tokens), |rule, (g, o)| rule.when(g, o));
        self.compound_rule(rule)
    }

    /// Add a prepared compound rule.
    pub fn compound_rule(mut self, rule: CompoundRule) -> Self {
        self.schema.compounds.push(rule);
        self
    }

    /// Validate and freeze the schema.
    pub fn build(mut self) -> Result<VariantSchema, SchemaError> {
        self.schema.validate()?;
        self.schema.fingerprint = self.schema.compute_fingerprint();
        Ok(self.schema)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::BTreeMap;

    fn button() -> VariantSchema {
        VariantSchema::builder("button")
            .base("inline-flex items-center")
            .group(
                "variant",
                [
                    ("default", "bg-primary text-primary-foreground"),
                    ("outline", "border bg-background"),
                ],
            )
            .group("size", [("default", "h-9 px-4"), ("icon", "h-9 w-9")])
            .default_option("variant", "default")
            .default_option("size", "default")
            .compound([("variant", "outline"), ("size", "icon")], "X")
            .build()
            .unwrap()
    }

    #[test]
    fn test_default_resolution() {
        let schema = button();
        let tokens = schema.resolve(&Selection::new()).unwrap();
        assert_eq!(
            tokens,
            vec![
                "inline-flex",
                "items-center",
                "bg-primary",
                "text-primary-foreground",
                "h-9",
                "px-4"
            ]
        );
    }

    #[test]
    fn test_selection_overrides_default() {
        let schema = button();
        let tokens = schema
            .resolve(&Selection::new().with("variant", "outline"))
            .unwrap();
        assert_eq!(
            tokens,
            vec!["inline-flex", "items-center", "border", "bg-background", "h-9", "px-4"]
        );
    }

    #[test]
    fn test_compound_applies_only_on_full_match() {
        let schema = button();
        let hit = schema
            .resolve(&Selection::new().with("variant", "outline").with("size", "icon"))
            .unwrap();
        assert_eq!(hit.last(), Some(&"X"));

        let miss = schema
            .resolve(&Selection::new().with("variant", "outline").with("size", "default"))
            .unwrap();
        assert!(!miss.contains(&"X"));
    }

    #[test]
    fn test_compound_matches_defaulted_groups() {
        let schema = VariantSchema::builder("chip")
            .group("tone", [("plain", "a"), ("loud", "b")])
            .group("size", [("sm", "c"), ("lg", "d")])
            .default_option("tone", "loud")
            .default_option("size", "sm")
            .compound([("tone", "loud"), ("size", "sm")], "e")
            .build()
            .unwrap();
        assert_eq!(schema.resolve(&Selection::new()).unwrap(), vec!["b", "c", "e"]);
    }

    #[test]
    fn test_compound_any_of() {
        let schema = VariantSchema::builder("chip")
            .group("size", [("sm", "a"), ("md", "b"), ("lg", "c")])
            .default_option("size", "md")
            .compound_rule(CompoundRule::new("z").when_any("size", ["sm", "lg"]))
            .build()
            .unwrap();
        assert!(!schema.resolve(&Selection::new()).unwrap().contains(&"z"));
        assert!(schema
            .resolve(&Selection::new().with("size", "lg"))
            .unwrap()
            .contains(&"z"));
    }

    #[test]
    fn test_compounds_apply_in_declaration_order() {
        let schema = VariantSchema::builder("chip")
            .group("size", [("sm", "a")])
            .default_option("size", "sm")
            .compound([("size", "sm")], "second")
            .compound_rule(CompoundRule::new("first"))
            .build()
            .unwrap();
        assert_eq!(
            schema.resolve(&Selection::new()).unwrap(),
            vec!["a", "second", "first"]
        );
    }

    #[test]
    fn test_unknown_group_fails() {
        let schema = button();
        let err = schema
            .resolve(&Selection::new().with("nonexistent", "x"))
            .unwrap_err();
        assert_eq!(
            err,
            ResolveError::UnknownGroup {
                schema: "button".to_string(),
                group: "nonexistent".to_string()
            }
        );
    }

    #[test]
    fn test_unknown_option_fails() {
        let schema = button();
        let err = schema
            .resolve(&Selection::new().with("size", "nonexistentOption"))
            .unwrap_err();
        assert!(matches!(err, ResolveError::UnknownOption { ref group, .. } if group == "size"));
    }

    #[test]
    fn test_group_without_default_contributes_nothing() {
        let schema = VariantSchema::builder("badge")
            .base("inline-flex")
            .group("tone", [("muted", "text-muted")])
            .build()
            .unwrap();
        assert_eq!(schema.resolve(&Selection::new()).unwrap(), vec!["inline-flex"]);
        assert_eq!(
            schema
                .resolve(&Selection::new().with("tone", "muted"))
                .unwrap(),
            vec!["inline-flex", "text-muted"]
        );
    }

    #[test]
    fn test_effective_selection() {
        let schema = button();
        let effective = schema
            .effective_selection(&Selection::new().with("size", "icon"))
            .unwrap();
        let pairs: Vec<_> = effective.iter().collect();
        assert_eq!(pairs, vec![("variant", "default"), ("size", "icon")]);
        assert_eq!(
            effective.to_selection(),
            Selection::new().with("variant", "default").with("size", "icon")
        );
    }

    #[test]
    fn test_resolve_sourced() {
        let schema = button();
        let sourced = schema
            .resolve_sourced(&Selection::new().with("variant", "outline").with("size", "icon"))
            .unwrap();
        assert_eq!(sourced[0].source, TokenSource::Base);
        assert_eq!(
            sourced[2].source,
            TokenSource::Variant {
                group: "variant".to_string(),
                option: "outline".to_string()
            }
        );
        assert_eq!(
            sourced.last().map(|t| &t.source),
            Some(&TokenSource::Compound { index: 0 })
        );
    }

    #[test]
    fn test_duplicate_group_rejected() {
        let result = VariantSchema::builder("x")
            .group("size", [("sm", "a")])
            .group("size", [("lg", "b")])
            .build();
        assert!(matches!(result, Err(SchemaError::DuplicateGroup { .. })));
    }

    #[test]
    fn test_duplicate_option_rejected() {
        let result = VariantSchema::builder("x")
            .group("size", [("sm", "a"), ("sm", "b")])
            .build();
        assert!(matches!(result, Err(SchemaError::DuplicateOption { .. })));
    }

    #[test]
    fn test_empty_group_rejected() {
        let result = VariantSchema::builder("x")
            .group("size", Vec::<(String, String)>::new())
            .build();
        assert!(matches!(result, Err(SchemaError::EmptyGroup { .. })));
    }

    #[test]
    fn test_default_must_reference_declared_option() {
        let unknown_group = VariantSchema::builder("x")
            .group("size", [("sm", "a")])
            .default_option("tone", "sm")
            .build();
        assert!(matches!(unknown_group, Err(SchemaError::UnknownGroup { .. })));

        let unknown_option = VariantSchema::builder("x")
            .group("size", [("sm", "a")])
            .default_option("size", "xl")
            .build();
        assert!(matches!(unknown_option, Err(SchemaError::UnknownOption { .. })));
    }

    #[test]
    fn test_compound_must_reference_declared_option() {
        let result = VariantSchema::builder("x")
            .group("size", [("sm", "a")])
            .compound([("size", "lg")], "b")
            .build();
        assert!(
            matches!(result, Err(SchemaError::UnknownOption { ref context, .. }) if context == "compound #0")
        );
    }

    #[test]
    fn test_empty_condition_rejected() {
        let result = VariantSchema::builder("x")
            .group("size", [("sm", "a")])
            .compound_rule(CompoundRule::new("b").when_any("size", Vec::<String>::new()))
            .build();
        assert!(
            matches!(result, Err(SchemaError::EmptyCondition { ref group, .. }) if group == "size")
        );
    }

    #[test]
    fn test_token_with_whitespace_rejected() {
        let rule = CompoundRule {
            conditions: BTreeMap::new(),
            tokens: vec!["a b".to_string()],
        };
        let result = VariantSchema::builder("x").compound_rule(rule).build();
        assert!(matches!(result, Err(SchemaError::InvalidToken { ref token, .. }) if token == "a b"));
    }

    #[test]
    fn test_deserialize_validates() {
        let valid: VariantSchema = serde_json::from_str(
            r#"{"name":"chip","base":"a b","groups":[{"name":"size","options":{"sm":"c"}}],"defaults":{"size":"sm"}}"#,
        )
        .unwrap();
        assert_eq!(valid.resolve(&Selection::new()).unwrap(), vec!["a", "b", "c"]);
        assert!(!valid.fingerprint().is_empty());

        let bad_default = serde_json::from_str::<VariantSchema>(
            r#"{"name":"chip","groups":[{"name":"size","options":{"sm":"c"}}],"defaults":{"size":"xl"}}"#,
        );
        let err = bad_default.unwrap_err().to_string();
        assert!(err.contains("xl"), "{}", err);
    }

    #[test]
    fn test_fingerprint_tracks_definition() {
        let plain = VariantSchema::builder("box").base("p-2").build().unwrap();
        let same = VariantSchema::builder("box").base("p-2").build().unwrap();
        let other = VariantSchema::builder("box").base("p-3").build().unwrap();
        assert_eq!(plain.fingerprint(), same.fingerprint());
        assert_ne!(plain.fingerprint(), other.fingerprint());
        assert_ne!(button().fingerprint(), plain.fingerprint());
    }

    #[test]
    fn test_empty_name_rejected() {
        assert!(matches!(
            VariantSchema::builder("  ").build(),
            Err(SchemaError::MissingName)
        ));
    }
}
