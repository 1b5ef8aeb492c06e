//! Class token parser.
//!
//! Splits raw class strings into tokens and tokens into their variant
//! modifiers, important marker and base utility.

/// Separator between variant modifiers and the utility.
const MODIFIER_SEPARATOR: char = ':';

/// Marker for an important utility (`!p-4`).
const IMPORTANT_MARKER: char = '!';

/// A class token split into its parts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedToken<'a> {
    /// The token as written.
    pub raw: &'a str,

    /// Variant modifiers (`hover`, `md`, `supports-[display:grid]`), sorted.
    pub modifiers: Vec<&'a str>,

    /// Whether the utility carries the `!` important marker.
    pub important: bool,

    /// The base utility without modifiers or marker (`bg-primary/90`).
    pub utility: &'a str,
}

impl ParsedToken<'_> {
    /// Scope a base conflict group by this token's modifiers and marker.
    ///
    /// `hover:bg-primary` with base group `bg-color` scopes to
    /// `hover:bg-color`; `!p-2` with `padding` scopes to `!padding`.
    pub fn scoped_group(&self, base_group: &str) -> String {
        let mut scoped = String::with_capacity(base_group.len() + 16);
        for modifier in &self.modifiers {
            scoped.push_str(modifier);
            scoped.push(MODIFIER_SEPARATOR);
        }
        if self.important {
            scoped.push(IMPORTANT_MARKER);
        }
        scoped.push_str(base_group);
        scoped
    }
}

/// Split any number of raw class strings into tokens, in order.
///
/// Whitespace of any length separates tokens; empty tokens never appear.
pub fn split_tokens<I, S>(inputs: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    inputs
        .into_iter()
        .flat_map(|s| {
            s.as_ref()
                .split_whitespace()
                .map(str::to_string)
                .collect::<Vec<_>>()
        })
        .collect()
}

/// Parse one token into modifiers, marker and utility.
///
/// Colons inside `[...]` belong to arbitrary values and never split.
pub fn parse_token(raw: &str) -> ParsedToken<'_> {
    let mut modifiers = Vec::new();
    let mut depth: usize = 0;
    let mut start = 0;

    for (i, c) in raw.char_indices() {
        match c {
            '[' => depth += 1,
            ']' => depth = depth.saturating_sub(1),
            MODIFIER_SEPARATOR if depth == 0 => {
                modifiers.push(&raw[start..i]);
                start = i + c.len_utf8();
            }
            _ => {}
        }
    }

    let mut utility = &raw[start..];
    let mut important = false;
    if let Some(rest) = utility.strip_prefix(IMPORTANT_MARKER) {
        utility = rest;
        important = true;
    } else if let Some(rest) = utility.strip_suffix(IMPORTANT_MARKER) {
        utility = rest;
        important = true;
    }

    modifiers.retain(|m| !m.is_empty());
    modifiers.sort_unstable();

    ParsedToken {
        raw,
        modifiers,
        important,
        utility,
    }
}
