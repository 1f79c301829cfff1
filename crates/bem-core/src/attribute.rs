//! Declared attribute values.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::value::Value;

/// A value declared for an attribute: a mount-parameter default, a request
/// override or a resolved argument.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Attribute {
    Flag(bool),
    Quantity(Value),
    List(Vec<String>),
    Text(String),
}

impl Attribute {
    /// Interpret command-line or manifest text.
    ///
    /// `true`/`false` become flags, anything that parses as a quantity becomes
    /// a quantity, comma-separated text becomes a list, the rest is text.
    pub fn parse(text: &str) -> Self {
        let text = text.trim();
        match text {
            "true" => return Attribute::Flag(true),
            "false" => return Attribute::Flag(false),
            _ => {}
        }

        if let Ok(value) = Value::parse(text) {
            return Attribute::Quantity(value);
        }

        if text.contains(',') {
            return Attribute::List(
                text.split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect(),
            );
        }

        Attribute::Text(text.to_string())
    }

    /// The quantity carried by this attribute, parsing text when needed.
    pub fn as_value(&self) -> Option<Value> {
        match self {
            Attribute::Quantity(v) => Some(*v),
            Attribute::Text(t) => Value::parse(t).ok(),
            _ => None,
        }
    }

    /// Textual forms of this attribute, one per element.
    pub fn texts(&self) -> Vec<String> {
        match self {
            Attribute::Flag(b) => vec![b.to_string()],
            Attribute::Quantity(v) => vec![v.to_string()],
            Attribute::List(items) => items.clone(),
            Attribute::Text(t) => vec![t.clone()],
        }
    }

    /// True for empty text and empty lists.
    pub fn is_empty(&self) -> bool {
        match self {
            Attribute::Text(t) => t.is_empty(),
            Attribute::List(items) => items.is_empty(),
            _ => false,
        }
    }
}

impl From<Value> for Attribute {
    fn from(value: Value) -> Self {
        Attribute::Quantity(value)
    }
}

impl From<&str> for Attribute {
    fn from(text: &str) -> Self {
        Attribute::Text(text.to_string())
    }
}

impl From<bool> for Attribute {
    fn from(flag: bool) -> Self {
        Attribute::Flag(flag)
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Attribute::Flag(b) => write!(f, "{b}"),
            Attribute::Quantity(v) => write!(f, "{v}"),
            Attribute::List(items) => write!(f, "[{}]", items.join(", ")),
            Attribute::Text(t) => write!(f, "{t:?}"),
        }
    }
}
