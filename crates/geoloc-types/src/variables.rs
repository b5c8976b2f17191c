//! Ordered name/value variable lists.
//!
//! A [`VariableList`] is the currency passed between every part of the
//! geolocation engine: location data, refinements, usage rules and the
//! effective location are all variable lists. Names are not unique; lookups
//! return the first match and order is preserved for output.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Default separator between list items.
pub const ITEM_SEPARATOR: &str = ",";
/// Default separator between a name and its value.
pub const NAME_VALUE_SEPARATOR: &str = "=";
/// Default quote character protecting embedded separators.
pub const QUOTE: char = '"';
/// Inside a quoted value, takes the next character literally.
pub const ESCAPE: char = '\\';

/// Errors from parsing the text form of a variable list.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VariableListError {
    #[error("item '{item}' has no '{separator}' between name and value")]
    MissingSeparator { item: String, separator: String },

    #[error("item '{item}' has an empty name")]
    EmptyName { item: String },
}

/// A single name/value pair.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Variable {
    pub name: String,
    pub value: String,
}

impl Variable {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// An ordered list of [`Variable`]s.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VariableList(Vec<Variable>);

impl VariableList {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Variable> {
        self.0.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|v| v.name.as_str())
    }

    /// Value of the first variable called `name`.
    pub fn find(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|v| v.name == name)
            .map(|v| v.value.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.iter().any(|v| v.name == name)
    }

    /// Number of variables called `name`.
    pub fn count(&self, name: &str) -> usize {
        self.0.iter().filter(|v| v.name == name).count()
    }

    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.push(Variable::new(name, value));
    }

    /// Replace the value of the first variable called `name`.
    ///
    /// Returns `false` (and leaves the list untouched) when no variable has
    /// that name.
    pub fn replace(&mut self, name: &str, value: impl Into<String>) -> bool {
        match self.0.iter_mut().find(|v| v.name == name) {
            Some(var) => {
                var.value = value.into();
                true
            }
            None => false,
        }
    }

    /// Replace the first variable called `name`, appending it if absent.
    pub fn replace_or_push(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        if !self.replace(name, value.clone()) {
            self.push(name, value);
        }
    }

    /// Parse the default text form: `name=value` items separated by commas,
    /// values optionally double-quoted.
    pub fn parse(input: &str) -> Result<Self, VariableListError> {
        Self::parse_with(input, ITEM_SEPARATOR, NAME_VALUE_SEPARATOR, Some(QUOTE))
    }

    /// Parse with explicit separators and quote character.
    ///
    /// Separators inside a quoted region are not split on, and within it
    /// [`ESCAPE`] takes the next character literally. Surrounding whitespace
    /// and quotes are stripped from names and values. Blank items are
    /// skipped; an item without a name/value separator fails the parse.
    pub fn parse_with(
        input: &str,
        item_separator: &str,
        name_value_separator: &str,
        quote: Option<char>,
    ) -> Result<Self, VariableListError> {
        let mut list = Self::new();
        for item in split_quoted(input, item_separator, quote) {
            let item = item.trim();
            if item.is_empty() {
                continue;
            }
            let (name, value) = split_once_quoted(item, name_value_separator, quote).ok_or_else(
                || VariableListError::MissingSeparator {
                    item: item.to_string(),
                    separator: name_value_separator.to_string(),
                },
            )?;
            let name = unquote(name, quote);
            if name.is_empty() {
                return Err(VariableListError::EmptyName {
                    item: item.to_string(),
                });
            }
            list.push(name, unquote(value, quote));
        }
        Ok(list)
    }

    /// Join into text form, optionally wrapping every value in `quote`.
    ///
    /// Quoted values have `quote` and [`ESCAPE`] escaped, so the output
    /// parses back to the same list.
    pub fn join(&self, item_separator: &str, name_value_separator: &str, quote: Option<char>) -> String {
        let mut out = String::new();
        for (i, var) in self.0.iter().enumerate() {
            if i > 0 {
                out.push_str(item_separator);
            }
            out.push_str(&var.name);
            out.push_str(name_value_separator);
            match quote {
                Some(q) => {
                    out.push(q);
                    for c in var.value.chars() {
                        if c == q || c == ESCAPE {
                            out.push(ESCAPE);
                        }
                        out.push(c);
                    }
                    out.push(q);
                }
                None => out.push_str(&var.value),
            }
        }
        out
    }
}

impl fmt::Display for VariableList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.join(ITEM_SEPARATOR, NAME_VALUE_SEPARATOR, Some(QUOTE)))
    }
}

impl FromStr for VariableList {
    type Err = VariableListError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl<N: Into<String>, V: Into<String>> FromIterator<(N, V)> for VariableList {
    fn from_iter<I: IntoIterator<Item = (N, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(n, v)| Variable::new(n, v)).collect())
    }
}

impl IntoIterator for VariableList {
    type Item = Variable;
    type IntoIter = std::vec::IntoIter<Variable>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a VariableList {
    type Item = &'a Variable;
    type IntoIter = std::slice::Iter<'a, Variable>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

fn split_quoted<'a>(input: &'a str, separator: &str, quote: Option<char>) -> Vec<&'a str> {
    if separator.is_empty() {
        return vec![input];
    }
    let mut parts = Vec::new();
    let mut in_quote = false;
    let mut escaped = false;
    let mut start = 0;
    let mut chars = input.char_indices();
    while let Some((i, c)) = chars.next() {
        if escaped {
            escaped = false;
        } else if in_quote && c == ESCAPE {
            escaped = true;
        } else if Some(c) == quote {
            in_quote = !in_quote;
        } else if !in_quote && input[i..].starts_with(separator) {
            parts.push(&input[start..i]);
            start = i + separator.len();
            // skip the rest of a multi-byte separator
            for _ in 1..separator.chars().count() {
                chars.next();
            }
        }
    }
    parts.push(&input[start..]);
    parts
}

fn split_once_quoted<'a>(
    input: &'a str,
    separator: &str,
    quote: Option<char>,
) -> Option<(&'a str, &'a str)> {
    let mut in_quote = false;
    let mut escaped = false;
    for (i, c) in input.char_indices() {
        if escaped {
            escaped = false;
        } else if in_quote && c == ESCAPE {
            escaped = true;
        } else if Some(c) == quote {
            in_quote = !in_quote;
        } else if !in_quote && !separator.is_empty() && input[i..].starts_with(separator) {
            return Some((&input[..i], &input[i + separator.len()..]));
        }
    }
    None
}

/// Trim, then strip one pair of surrounding quotes and resolve escapes.
fn unquote(s: &str, quote: Option<char>) -> Cow<'_, str> {
    let s = s.trim();
    let inner = match quote {
        Some(q) => match s.strip_prefix(q).and_then(|rest| rest.strip_suffix(q)) {
            Some(inner) => inner,
            None => return Cow::Borrowed(s),
        },
        None => return Cow::Borrowed(s),
    };
    if !inner.contains(ESCAPE) {
        return Cow::Borrowed(inner);
    }
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        out.push(if c == ESCAPE { chars.next().unwrap_or(ESCAPE) } else { c });
    }
    Cow::Owned(out)
}
