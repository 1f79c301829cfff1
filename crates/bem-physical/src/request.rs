//! Turning a composition into a stock request.

use std::collections::BTreeMap;

use bem_core::{Attribute, AttributeRequest, Requirement, DEFAULT_TOLERANCE};
use bem_registry::ComposedSpecification;
use serde::{Deserialize, Serialize};

/// Blocks building on this one may be realized by series/parallel
/// combinations.
pub const COMBINATION_BLOCK: &str = "abstract.Combination";

/// Which connection adds values for a combinable block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sense {
    /// Series adds (resistors, inductors).
    Increase,
    /// Parallel adds (capacitors).
    Decrease,
}

impl Sense {
    pub fn prefer_increase(self) -> bool {
        self == Sense::Increase
    }
}

/// Knobs of a resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolveOptions {
    /// Relative tolerance of precision attributes.
    pub tolerance: f64,
    /// Attributes compared as "at least" ratings.
    pub rating: Vec<String>,
    /// Allowed error of a synthesized combination, in percent.
    pub error_percent: f64,
    /// Allowed error of the closest single value, in percent.
    pub closest_error_percent: f64,
    /// Blocks that may be realized by series/parallel combinations.
    pub combinable: BTreeMap<String, Sense>,
    /// Proceed without a concrete part when stock has none.
    pub virtual_part: bool,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        ResolveOptions {
            tolerance: DEFAULT_TOLERANCE,
            rating: ["V", "I", "P", "Z"].iter().map(|s| s.to_string()).collect(),
            error_percent: 15.0,
            closest_error_percent: 5.0,
            combinable: BTreeMap::new(),
            virtual_part: false,
        }
    }
}

impl ResolveOptions {
    /// Configured combination sense of block `name`.
    pub fn sense(&self, name: &str) -> Option<Sense> {
        self.combinable.get(name).copied()
    }

    /// Combination sense of a composed block, if it is combinable.
    ///
    /// The configured sense wins. Otherwise a block is combinable when it
    /// builds on [`COMBINATION_BLOCK`] or declares an `increase` flag, and
    /// `increase` (default true) picks the sense.
    pub fn combination_sense(&self, composed: &ComposedSpecification) -> Option<Sense> {
        if let Some(sense) = self.sense(&composed.name) {
            return Some(sense);
        }
        let increase = match composed.lookup("increase") {
            Some(Attribute::Flag(flag)) => Some(*flag),
            _ => None,
        };
        if increase.is_none() && !composed.contains(COMBINATION_BLOCK) {
            return None;
        }
        Some(if increase.unwrap_or(true) {
            Sense::Increase
        } else {
            Sense::Decrease
        })
    }
}

/// Build the attribute request for `composed`.
///
/// Modifiers and properties must match exactly, rating attributes must be
/// met, `model` pins a model when set and `value` is compared with the
/// configured tolerance. `units` becomes the unit count.
pub fn build_request(composed: &ComposedSpecification, options: &ResolveOptions) -> AttributeRequest {
    let mut request = AttributeRequest::new();

    for (key, values) in composed.selections() {
        request.insert(key, Requirement::Exact { values });
    }

    let arguments = composed.arguments();

    for rating in &options.rating {
        if let Some(value) = arguments.get(rating).and_then(Attribute::as_value) {
            request.insert(rating.clone(), Requirement::sufficiency(value));
        }
    }

    if let Some(model) = arguments.get("model") {
        let models: Vec<String> = model
            .texts()
            .into_iter()
            .filter(|m| !m.trim().is_empty())
            .collect();
        if !model.is_empty() && !models.is_empty() {
            request.insert("model", Requirement::Exact { values: models });
        }
    }

    if let Some(value) = arguments.get("value").and_then(Attribute::as_value) {
        request.insert(
            "value",
            Requirement::Tolerance {
                value,
                tolerance: options.tolerance,
            },
        );
    }

    if let Some(units) = arguments.get("units").and_then(Attribute::as_value) {
        let units = units.magnitude().round();
        if units >= 1.0 {
            request.set_units(units as u32);
        }
    }

    request
}
