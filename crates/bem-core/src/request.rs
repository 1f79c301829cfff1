//! Attribute requests: what a resolution asks of a stock part.
//!
//! Every requested attribute carries its comparison rule explicitly, so the
//! matcher never has to infer from the shape of a value whether "close to"
//! or "at least" is meant.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::value::Value;

/// Default relative tolerance for precision attributes (10 %).
pub const DEFAULT_TOLERANCE: f64 = 0.1;

/// The comparison rule for one requested attribute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum Requirement {
    /// The part's value must be one of these (modifiers, properties, model).
    Exact { values: Vec<String> },
    /// Precision attribute: the part's value must be close to `value`.
    Tolerance { value: Value, tolerance: f64 },
    /// Rating attribute: the part's value must be at least `value`.
    Sufficiency { value: Value },
    /// Anything goes.
    Unconstrained,
}

impl Requirement {
    pub fn exact<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Requirement::Exact {
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    /// Precision requirement with the default 10 % tolerance.
    pub fn tolerance(value: Value) -> Self {
        Requirement::Tolerance {
            value,
            tolerance: DEFAULT_TOLERANCE,
        }
    }

    pub fn sufficiency(value: Value) -> Self {
        Requirement::Sufficiency { value }
    }

    /// The quantity this requirement is anchored on, if any.
    pub fn value(&self) -> Option<Value> {
        match self {
            Requirement::Tolerance { value, .. } | Requirement::Sufficiency { value } => {
                Some(*value)
            }
            _ => None,
        }
    }
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Requirement::Exact { values } => write!(f, "one of [{}]", values.join(", ")),
            Requirement::Tolerance { value, tolerance } => {
                write!(f, "{value} ±{}%", tolerance * 100.0)
            }
            Requirement::Sufficiency { value } => write!(f, ">= {value}"),
            Requirement::Unconstrained => write!(f, "any"),
        }
    }
}

/// A set of named attribute requirements plus the number of functional
/// units the part must expose.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeRequest {
    #[serde(default)]
    attributes: BTreeMap<String, Requirement>,
    #[serde(default = "default_units")]
    units: u32,
}

fn default_units() -> u32 {
    1
}

impl Default for AttributeRequest {
    fn default() -> Self {
        AttributeRequest {
            attributes: BTreeMap::new(),
            units: 1,
        }
    }
}

impl AttributeRequest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, name: impl Into<String>, requirement: Requirement) -> Self {
        self.insert(name, requirement);
        self
    }

    /// Builder-style unit count.
    pub fn with_units(mut self, units: u32) -> Self {
        self.units = units;
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, requirement: Requirement) {
        self.attributes.insert(name.into(), requirement);
    }

    pub fn remove(&mut self, name: &str) -> Option<Requirement> {
        self.attributes.remove(name)
    }

    pub fn set_units(&mut self, units: u32) {
        self.units = units;
    }

    pub fn get(&self, name: &str) -> Option<&Requirement> {
        self.attributes.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.attributes.contains_key(name)
    }

    /// Number of functional units requested (1 unless stated).
    pub fn units(&self) -> u32 {
        self.units
    }

    /// Requested attributes in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Requirement)> {
        self.attributes.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }
}

impl fmt::Display for AttributeRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .attributes
            .iter()
            .map(|(name, req)| format!("{name} {req}"))
            .collect();
        write!(f, "{}", parts.join(", "))?;
        if self.units != 1 {
            write!(f, ", units >= {}", self.units)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Dimension;

    #[test]
    fn builder_and_lookup() {
        let req = AttributeRequest::new()
            .with("V", Requirement::sufficiency(Value::new(12.0, Dimension::Voltage)))
            .with("series", Requirement::exact(["E12"]))
            .with_units(2);

        assert_eq!(req.len(), 2);
        assert_eq!(req.units(), 2);
        assert!(req.contains("series"));
        assert_eq!(
            req.get("V").and_then(Requirement::value).map(|v| v.magnitude()),
            Some(12.0)
        );
        let names: Vec<&str> = req.iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["V", "series"]);
    }

    #[test]
    fn default_tolerance_is_ten_percent() {
        match Requirement::tolerance(Value::scalar(100.0)) {
            Requirement::Tolerance { tolerance, .. } => assert_eq!(tolerance, 0.1),
            other => panic!("unexpected requirement {other:?}"),
        }
    }

    #[test]
    fn display_is_readable() {
        let req = AttributeRequest::new()
            .with("P", Requirement::sufficiency(Value::new(0.25, Dimension::Power)))
            .with("model", Requirement::exact(["BC547"]));
        let text = req.to_string();
        assert!(text.contains("P >= 250 mW"));
        assert!(text.contains("model one of [BC547]"));
    }

    #[test]
    fn serde_tagged_rules() {
        let json = r#"{"attributes": {"V": {"rule": "sufficiency", "value": "12 V"}}}"#;
        let req: AttributeRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.units(), 1);
        assert!(matches!(req.get("V"), Some(Requirement::Sufficiency { .. })));
    }
}
