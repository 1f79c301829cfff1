//! The component specification: what is being built and how it is
//! parameterized.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::attribute::Attribute;
use crate::error::{CoreError, Result};

/// A request to resolve one component.
///
/// `name` is the dotted block name (`"basic.Resistor"`), `modifiers` select
/// capability modules (`series = ["E24"]`) and `overrides` set mount
/// arguments directly (`value = 4.7k`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ComponentSpecification {
    pub name: String,
    #[serde(default)]
    pub modifiers: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    pub overrides: BTreeMap<String, Attribute>,
    /// Caller-supplied identifier for the instance (e.g. `"R1"`).
    #[serde(default)]
    pub reference: Option<String>,
}

impl ComponentSpecification {
    pub fn new(name: impl Into<String>) -> Self {
        ComponentSpecification {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Add modifier values for `key`. Comma-joined values are split.
    pub fn with_modifier<I, S>(mut self, key: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let entry = self.modifiers.entry(key.into()).or_default();
        for value in values {
            entry.extend(split_values(value.as_ref()));
        }
        self
    }

    pub fn with_override(mut self, name: impl Into<String>, value: impl Into<Attribute>) -> Self {
        self.overrides.insert(name.into(), value.into());
        self
    }

    pub fn with_reference(mut self, reference: impl Into<String>) -> Self {
        self.reference = Some(reference.into());
        self
    }

    /// Apply a `key=v1,v2` modifier selection.
    pub fn apply_modifier(&mut self, selection: &str) -> Result<()> {
        let (key, values) = parse_modifier(selection)?;
        self.modifiers.entry(key).or_default().extend(values);
        Ok(())
    }

    /// Apply a `name=value` argument override.
    pub fn apply_override(&mut self, assignment: &str) -> Result<()> {
        let (name, value) = assignment
            .split_once('=')
            .filter(|(name, _)| !name.trim().is_empty())
            .ok_or_else(|| CoreError::InvalidAttribute {
                input: assignment.to_string(),
            })?;
        self.overrides
            .insert(name.trim().to_string(), Attribute::parse(value));
        Ok(())
    }

    /// Human-readable label: dotted name words capitalized, then modifiers,
    /// then the reference if one was given.
    pub fn label(&self) -> String {
        let mut words: Vec<String> = self.name.split('.').map(capitalize).collect();
        for (key, values) in &self.modifiers {
            let mut entry = vec![capitalize(key)];
            entry.extend(values.iter().map(|v| capitalize(v)));
            words.push(entry.join(" "));
        }
        if let Some(reference) = &self.reference {
            words.push(format!("#{reference}"));
        }
        words.join(" ")
    }
}

/// Parse `key=v1,v2` into its key and values.
pub fn parse_modifier(selection: &str) -> Result<(String, Vec<String>)> {
    let invalid = || CoreError::InvalidModifier {
        input: selection.to_string(),
    };
    let (key, values) = selection.split_once('=').ok_or_else(invalid)?;
    let key = key.trim();
    let values = split_values(values);
    if key.is_empty() || values.is_empty() {
        return Err(invalid());
    }
    Ok((key.to_string(), values))
}

fn split_values(text: &str) -> Vec<String> {
    text.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
