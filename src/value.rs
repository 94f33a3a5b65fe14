//! Values held by a parsed project script.
//!
//! A value only changes shape through promotion:
//! `None -> String -> List -> DeepList`, or `None -> Table` when a dotted
//! key passes through it. Each promotion replaces the variant wholesale.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;

use crate::lexer::is_identifier_char;

/// Nested key/value mapping.
pub type Table = BTreeMap<String, Value>;

/// A script value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Value {
    /// Key declared with no value yet.
    #[default]
    None,
    /// Single scalar.
    String(String),
    /// Values of one statement, or of several statements before grouping.
    List(Vec<String>),
    /// One group per statement.
    DeepList(Vec<Vec<String>>),
    /// Dotted-key namespace.
    Table(Table),
}

/// Discriminant of a `Value`, for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    None,
    String,
    List,
    DeepList,
    Table,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::None => "none",
            Self::String => "string",
            Self::List => "list",
            Self::DeepList => "deep list",
            Self::Table => "table",
        };
        f.write_str(name)
    }
}

/// Returned when a scalar is pushed into a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("cannot assign a value to a table")]
pub struct TableAssignment;

impl Value {
    #[must_use]
    pub const fn kind(&self) -> ValueKind {
        match self {
            Self::None => ValueKind::None,
            Self::String(_) => ValueKind::String,
            Self::List(_) => ValueKind::List,
            Self::DeepList(_) => ValueKind::DeepList,
            Self::Table(_) => ValueKind::Table,
        }
    }

    #[must_use]
    pub const fn is_table(&self) -> bool {
        matches!(self, Self::Table(_))
    }

    /// Append one value, promoting the variant as needed.
    ///
    /// # Errors
    ///
    /// Tables never take scalars.
    pub fn push(&mut self, item: impl Into<String>) -> Result<(), TableAssignment> {
        let item = item.into();
        match self {
            Self::None => *self = Self::String(item),
            Self::String(old) => {
                let old = std::mem::take(old);
                *self = Self::List(vec![old, item]);
            }
            Self::List(items) => items.push(item),
            Self::DeepList(groups) => match groups.last_mut() {
                Some(last) => last.push(item),
                None => groups.push(vec![item]),
            },
            Self::Table(_) => return Err(TableAssignment),
        }
        Ok(())
    }

    /// Start a new statement group.
    ///
    /// A `List` becomes a `DeepList` whose first group is the old list; a
    /// `DeepList` gains an empty group. Other variants are left alone.
    pub fn begin_group(&mut self) {
        match self {
            Self::List(items) => {
                let first = std::mem::take(items);
                *self = Self::DeepList(vec![first, Vec::new()]);
            }
            Self::DeepList(groups) => groups.push(Vec::new()),
            _ => {}
        }
    }

    /// Concatenate every group into one list. Grouping is lost.
    ///
    /// Scalars become one-element lists; `None` and tables become empty.
    #[must_use]
    pub fn flatten(&self) -> Vec<String> {
        match self {
            Self::None | Self::Table(_) => Vec::new(),
            Self::String(s) => vec![s.clone()],
            Self::List(items) => items.clone(),
            Self::DeepList(groups) => groups.iter().flatten().cloned().collect(),
        }
    }

    /// Consuming variant of [`Value::flatten`] returning a `List`.
    #[must_use]
    pub fn into_list(self) -> Self {
        match self {
            Self::DeepList(groups) => Self::List(groups.into_iter().flatten().collect()),
            other => other,
        }
    }

    /// Statement groups: a `DeepList` as is, a `List` or `String` as one
    /// group.
    #[must_use]
    pub fn groups(&self) -> Vec<Vec<String>> {
        match self {
            Self::None | Self::Table(_) => Vec::new(),
            Self::String(s) => vec![vec![s.clone()]],
            Self::List(items) => vec![items.clone()],
            Self::DeepList(groups) => groups.clone(),
        }
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_deep_list(&self) -> Option<&[Vec<String>]> {
        match self {
            Self::DeepList(groups) => Some(groups),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_table(&self) -> Option<&Table> {
        match self {
            Self::Table(table) => Some(table),
            _ => None,
        }
    }

    /// Follow a dotted key path through nested tables.
    #[must_use]
    pub fn get(&self, path: &str) -> Option<&Self> {
        path.split('.')
            .try_fold(self, |value, segment| value.as_table()?.get(segment))
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<Vec<String>> for Value {
    fn from(items: Vec<String>) -> Self {
        Self::List(items)
    }
}

/// Writes `key = ...` statements back in script form.
pub(crate) fn write_entry(f: &mut fmt::Formatter<'_>, key: &str, value: &Value) -> fmt::Result {
    match value {
        Value::None => writeln!(f, "{} =", key_text(key)),
        Value::String(s) => writeln!(f, "{} = {}", key_text(key), quoted(s)),
        Value::List(items) => write_statement(f, key, items),
        Value::DeepList(groups) => groups
            .iter()
            .try_for_each(|group| write_statement(f, key, group)),
        Value::Table(table) => table
            .iter()
            .try_for_each(|(name, inner)| write_entry(f, &format!("{key}.{name}"), inner)),
    }
}

fn write_statement(f: &mut fmt::Formatter<'_>, key: &str, items: &[String]) -> fmt::Result {
    write!(f, "{} =", key_text(key))?;
    for (i, item) in items.iter().enumerate() {
        let sep = if i == 0 { " " } else { ", " };
        write!(f, "{sep}{}", quoted(item))?;
    }
    writeln!(f)
}

/// Dotted keys stay bare while they lex as one identifier. Quoted keys are
/// split on `.` too, so quoting the whole path keeps its segments.
fn key_text(key: &str) -> Cow<'_, str> {
    if !key.is_empty() && key.chars().all(is_identifier_char) {
        Cow::Borrowed(key)
    } else {
        Cow::Owned(quoted(key))
    }
}

/// Literal quotes when the text allows it, escaped double quotes otherwise.
fn quoted(s: &str) -> String {
    if !s.contains('\'') && !s.contains(['\n', '\r']) {
        return format!("'{s}'");
    }
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for ch in s.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => Ok(()),
            Self::String(s) => f.write_str(&quoted(s)),
            Self::List(items) => {
                let parts: Vec<_> = items.iter().map(|s| quoted(s)).collect();
                write!(f, "[{}]", parts.join(", "))
            }
            Self::DeepList(groups) => {
                let parts: Vec<_> = groups.iter().map(|g| Self::List(g.clone()).to_string()).collect();
                write!(f, "[{}]", parts.join(", "))
            }
            Self::Table(table) => {
                let parts: Vec<_> = table.iter().map(|(k, v)| format!("{k} = {v}")).collect();
                write!(f, "{{{}}}", parts.join(", "))
            }
        }
    }
}
