//! Stock part records.

use std::collections::BTreeMap;

use bem_core::{Dimension, Value};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{Result, StockError};

/// Named attribute values of a part. One name may carry several values
/// (`units = ["A", "B"]` for a dual package).
pub type AttributeMap = BTreeMap<String, Vec<String>>;

/// A concrete part available from stock. Read-only during resolution.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StockPart {
    #[serde(default)]
    pub id: String,
    /// Dotted block name the part realizes.
    pub block: String,
    #[serde(default)]
    pub model: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub library: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub symbol: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub footprint: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub datasheet: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(default, deserialize_with = "one_or_many", skip_serializing_if = "BTreeMap::is_empty")]
    pub params: AttributeMap,
    #[serde(default, deserialize_with = "one_or_many", skip_serializing_if = "BTreeMap::is_empty")]
    pub mods: AttributeMap,
    #[serde(default, deserialize_with = "one_or_many", skip_serializing_if = "BTreeMap::is_empty")]
    pub props: AttributeMap,
    /// SPICE model text.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub spice: String,
}

/// A catalog entry may be a string, a number, a flag or a list of those.
#[derive(Deserialize)]
#[serde(untagged)]
enum Entry {
    Text(String),
    Number(f64),
    Flag(bool),
    Many(Vec<Entry>),
}

impl Entry {
    fn flatten_into(self, out: &mut Vec<String>) {
        match self {
            Entry::Text(t) => out.push(t),
            Entry::Number(n) => out.push(n.to_string()),
            Entry::Flag(b) => out.push(b.to_string()),
            Entry::Many(items) => {
                for item in items {
                    item.flatten_into(out);
                }
            }
        }
    }
}

fn one_or_many<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<AttributeMap, D::Error> {
    let raw: BTreeMap<String, Entry> = BTreeMap::deserialize(deserializer)?;
    Ok(raw
        .into_iter()
        .map(|(name, entry)| {
            let mut values = Vec::new();
            entry.flatten_into(&mut values);
            (name, values)
        })
        .collect())
}

impl StockPart {
    pub fn new(block: impl Into<String>, model: impl Into<String>) -> Self {
        StockPart {
            block: block.into(),
            model: model.into(),
            ..Default::default()
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_param<I, S>(mut self, name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.params
            .entry(name.into())
            .or_default()
            .extend(values.into_iter().map(Into::into));
        self
    }

    pub fn with_mod(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.mods.entry(name.into()).or_default().push(value.into());
        self
    }

    pub fn with_prop(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.props.entry(name.into()).or_default().push(value.into());
        self
    }

    pub fn with_spice(mut self, spice: impl Into<String>) -> Self {
        self.spice = spice.into();
        self
    }

    /// Values of the param `name`, empty when undeclared.
    pub fn param(&self, name: &str) -> &[String] {
        self.params.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Number of functional units the part exposes.
    pub fn units(&self) -> usize {
        self.param("units").len().max(1)
    }

    /// Label for logs: id when present, otherwise the model.
    pub fn label(&self) -> &str {
        if self.id.is_empty() {
            &self.model
        } else {
            &self.id
        }
    }

    /// `KEY=VALUE` pairs of a `.model` line. Keys are upper-cased, values
    /// keep their case so SI prefixes still parse.
    ///
    /// Subcircuit models carry no parameters this way and yield nothing.
    pub fn spice_params(&self) -> BTreeMap<String, String> {
        let mut params = BTreeMap::new();
        if self.spice.to_uppercase().contains("SUBCKT") {
            return params;
        }

        let joined: String = self
            .spice
            .lines()
            .filter(|line| !line.trim_start().starts_with('*'))
            .collect::<Vec<_>>()
            .join(" ")
            .replace(['+', '(', ')'], " ");
        let normalized = joined
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .replace(" =", "=")
            .replace("= ", "=");

        for token in normalized.split(' ') {
            if let Some((key, value)) = token.split_once('=') {
                if !key.is_empty() {
                    params.insert(key.to_uppercase(), value.to_string());
                }
            }
        }
        params
    }

    /// Mean absolute magnitude of a rating param; 0 when absent.
    pub fn mean_rating(&self, name: &str) -> f64 {
        let values: Vec<f64> = self
            .param(name)
            .iter()
            .filter_map(|v| Value::parse(v).ok())
            .map(|v| v.abs())
            .collect();
        if values.is_empty() {
            0.0
        } else {
            values.iter().sum::<f64>() / values.len() as f64
        }
    }

    /// Every value the part can provide, with ranges expanded.
    ///
    /// A `value` entry is either a space-separated list (`"100 220"`) or a
    /// range `"<mantissas> / <exponents>"`, where each exponent is an SI
    /// prefix or a power of ten: `"1 2.2 4.7 / 0 1 k"` yields 1, 2.2, 4.7,
    /// 10, 22, 47, 1k, 2.2k and 4.7k. Dimensionless values take `dimension`.
    pub fn part_values(&self, dimension: Dimension) -> Result<Vec<Value>> {
        let mut values = Vec::new();
        for entry in self.param("value") {
            match entry.split_once('/') {
                Some((mantissas, exponents)) => {
                    let mantissas = mantissas
                        .split_whitespace()
                        .map(|m| self.parse_number(m))
                        .collect::<Result<Vec<f64>>>()?;
                    for exponent in exponents.split_whitespace() {
                        let scale = self.exponent_scale(exponent)?;
                        values.extend(
                            mantissas
                                .iter()
                                .map(|m| Value::new(m * scale, dimension)),
                        );
                    }
                }
                None => {
                    for token in entry.split_whitespace() {
                        let value = Value::parse_as(token, dimension).map_err(|_| {
                            StockError::InvalidPartValue {
                                part: self.label().to_string(),
                                value: token.to_string(),
                            }
                        })?;
                        values.push(value);
                    }
                }
            }
        }
        Ok(values)
    }

    fn parse_number(&self, text: &str) -> Result<f64> {
        text.parse::<f64>()
            .map_err(|_| StockError::InvalidPartValue {
                part: self.label().to_string(),
                value: text.to_string(),
            })
    }

    fn exponent_scale(&self, exponent: &str) -> Result<f64> {
        if let Ok(power) = exponent.parse::<i32>() {
            return Ok(10f64.powi(power));
        }
        match Value::parse(&format!("1{exponent}")) {
            Ok(v) if v.dimension() == Dimension::Scalar => Ok(v.magnitude()),
            _ => Err(StockError::InvalidPartValue {
                part: self.label().to_string(),
                value: exponent.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() <= b.abs() * 1e-9
    }

    #[test]
    fn deserialize_one_or_many() {
        let json = r#"{
            "id": "7",
            "block": "basic.Resistor",
            "model": "RC0805",
            "params": {"value": "1 2.2 4.7 / 0 1 k", "P": 0.125, "units": ["A", "B"]},
            "mods": {"series": "E24"}
        }"#;
        let part: StockPart = serde_json::from_str(json).unwrap();
        assert_eq!(part.param("P"), ["0.125"]);
        assert_eq!(part.param("units"), ["A", "B"]);
        assert_eq!(part.units(), 2);
        assert_eq!(part.mods["series"], vec!["E24"]);
        assert!(part.props.is_empty());
    }

    #[test]
    fn expand_value_range() {
        let part = StockPart::new("basic.Resistor", "RC").with_param("value", ["1 2.2 4.7 / 0 1 k"]);
        let values = part.part_values(Dimension::Resistance).unwrap();
        let magnitudes: Vec<f64> = values.iter().map(|v| v.magnitude()).collect();
        let expected = [1.0, 2.2, 4.7, 10.0, 22.0, 47.0, 1000.0, 2200.0, 4700.0];
        assert_eq!(magnitudes.len(), expected.len());
        for (got, want) in magnitudes.iter().zip(expected) {
            assert!(close(*got, want), "{got} != {want}");
        }
        assert!(values.iter().all(|v| v.dimension() == Dimension::Resistance));
    }

    #[test]
    fn plain_value_lists() {
        let part = StockPart::new("basic.Capacitor", "C").with_param("value", ["100n 1u"]);
        let values = part.part_values(Dimension::Capacitance).unwrap();
        assert!(close(values[0].magnitude(), 100e-9));
        assert!(close(values[1].magnitude(), 1e-6));
        assert_eq!(values[0].dimension(), Dimension::Capacitance);
    }

    #[test]
    fn invalid_values_are_reported() {
        let part = StockPart::new("basic.Resistor", "RC").with_param("value", ["1 2 / x"]);
        assert!(matches!(
            part.part_values(Dimension::Resistance),
            Err(StockError::InvalidPartValue { .. })
        ));
    }

    #[test]
    fn spice_model_params() {
        let part = StockPart::new("basic.Diode", "1N4148").with_spice(
            "* fast switching diode\n.model 1N4148 D(is = 2.52n RS=0.568\n+ BV=100 IBV=100u)",
        );
        let params = part.spice_params();
        assert_eq!(params["IS"], "2.52n");
        assert_eq!(params["RS"], "0.568");
        assert_eq!(params["BV"], "100");
        assert_eq!(params["IBV"], "100u");
    }

    #[test]
    fn subcircuits_have_no_model_params() {
        let part = StockPart::new("basic.Opamp", "LM358").with_spice(".SUBCKT LM358 1 2 3 4 5 GAIN=100");
        assert!(part.spice_params().is_empty());
    }

    #[test]
    fn mean_rating() {
        let part = StockPart::new("basic.Resistor", "R")
            .with_param("V", ["100", "200"])
            .with_param("P", ["0.25"]);
        assert_eq!(part.mean_rating("V"), 150.0);
        assert_eq!(part.mean_rating("P"), 0.25);
        assert_eq!(part.mean_rating("I"), 0.0);
    }
}
