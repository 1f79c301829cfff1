//! Resolution of a component specification to a stock part.

use bem_core::{Attribute, AttributeRequest, ComponentSpecification, Requirement, Value};
use bem_registry::{ComposedSpecification, Composer, Registry};
use bem_stock::{closest, match_parts, synthesize, Catalog, Combination, StockPart};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::{ResolveError, Result};
use crate::request::{build_request, ResolveOptions};

/// The outcome of a resolution.
#[derive(Debug, Clone, Serialize)]
pub struct Resolution {
    pub composed: ComposedSpecification,
    pub request: AttributeRequest,
    /// The selected part; absent for virtual resolutions without stock.
    pub part: Option<StockPart>,
    /// How the requested value is realized, when the block has one.
    pub combination: Option<Combination>,
    /// Resolved without requiring stock.
    #[serde(rename = "virtual")]
    pub is_virtual: bool,
}

/// Composes, matches and selects.
#[derive(Debug, Clone)]
pub struct Resolver<R, C> {
    composer: Composer<R>,
    catalog: C,
    options: ResolveOptions,
}

impl<R: Registry, C: Catalog> Resolver<R, C> {
    pub fn new(registry: R, catalog: C, options: ResolveOptions) -> Self {
        Resolver {
            composer: Composer::new(registry),
            catalog,
            options,
        }
    }

    pub fn options(&self) -> &ResolveOptions {
        &self.options
    }

    /// Compose `spec` without touching stock.
    pub fn compose(&self, spec: &ComponentSpecification) -> Result<ComposedSpecification> {
        Ok(self.composer.compose(spec)?)
    }

    /// Suitable parts for `composed`, best first, with the request used.
    pub fn candidates(
        &self,
        composed: &ComposedSpecification,
    ) -> Result<(AttributeRequest, Vec<StockPart>)> {
        let request = build_request(composed, &self.options);
        let parts = self.matching(&composed.name, &request)?;
        Ok((request, parts))
    }

    fn matching(&self, name: &str, request: &AttributeRequest) -> Result<Vec<StockPart>> {
        let stock = self.catalog.query(name)?;
        let parts = match_parts(request, &stock);
        debug!(block = name, stock = stock.len(), suitable = parts.len(), "matched catalog");
        Ok(parts)
    }

    /// Resolve `spec` to a part and, for valued blocks, a combination.
    pub fn resolve(&self, spec: &ComponentSpecification) -> Result<Resolution> {
        let composed = self.compose(spec)?;
        let (mut request, mut parts) = self.candidates(&composed)?;

        // Without the requested model in stock, fall back to the best ranked
        // part that meets everything else.
        if parts.is_empty() && request.contains("model") {
            let mut relaxed = request.clone();
            relaxed.remove("model");
            let fallback = self.matching(&composed.name, &relaxed)?;
            if !fallback.is_empty() {
                warn!(block = %composed.name, "requested model not in stock, using best ranked part");
                request = relaxed;
                parts = fallback;
            }
        }

        let is_virtual = self.options.virtual_part
            || matches!(composed.lookup("virtual_part"), Some(Attribute::Flag(true)));

        if parts.is_empty() {
            if !is_virtual {
                return Err(ResolveError::NoSuitablePart {
                    name: composed.name.clone(),
                    request: request.to_string(),
                });
            }
            warn!(block = %composed.name, "no suitable part, resolving as virtual");
            let combination = requested_value(&request).map(Combination::Single);
            return Ok(Resolution {
                composed,
                request,
                part: None,
                combination,
                is_virtual,
            });
        }

        let (candidates, combination) = match requested_value(&request) {
            Some(value) if !is_virtual => self.settle_value(&composed, value, &parts)?,
            Some(value) => (parts.clone(), Some(Combination::Single(value))),
            None => (parts.clone(), None),
        };

        let part = prefer_model(&candidates, composed.lookup("model"));
        if let Some(part) = &part {
            info!(block = %composed.name, part = part.label(), model = %part.model, "selected part");
        }

        Ok(Resolution {
            composed,
            request,
            part,
            combination,
            is_virtual,
        })
    }

    /// Narrow `parts` to those providing `desired`.
    ///
    /// An exact value wins; otherwise the closest value within the closest
    /// error; otherwise a synthesized combination for combinable blocks.
    fn settle_value(
        &self,
        composed: &ComposedSpecification,
        desired: Value,
        parts: &[StockPart],
    ) -> Result<(Vec<StockPart>, Option<Combination>)> {
        let name = composed.name.as_str();
        let mut offered: Vec<(usize, Value)> = Vec::new();
        for (index, part) in parts.iter().enumerate() {
            for value in part.part_values(desired.dimension())? {
                offered.push((index, value));
            }
        }

        // Parts without declared values cannot be told apart by value.
        if offered.is_empty() {
            return Ok((parts.to_vec(), Some(Combination::Single(desired))));
        }

        let exact: Vec<StockPart> = parts
            .iter()
            .enumerate()
            .filter(|(index, _)| {
                offered
                    .iter()
                    .any(|(i, v)| i == index && v.magnitude() == desired.magnitude())
            })
            .map(|(_, part)| part.clone())
            .collect();
        if !exact.is_empty() {
            return Ok((exact, Some(Combination::Single(desired))));
        }

        let values: Vec<Value> = offered.iter().map(|(_, v)| *v).collect();
        let max_error = desired.abs() * self.options.closest_error_percent / 100.0;
        if let Some(nearest) = closest(&values, desired.magnitude()) {
            if (nearest.magnitude() - desired.magnitude()).abs() < max_error {
                let supplier = offered
                    .iter()
                    .find(|(_, v)| v.magnitude() == nearest.magnitude())
                    .map(|(i, _)| parts[*i].clone());
                debug!(block = name, %desired, %nearest, "using closest value");
                return Ok((supplier.into_iter().collect(), Some(Combination::Single(nearest))));
            }
        }

        let Some(sense) = self.options.combination_sense(composed) else {
            return Err(ResolveError::Unavailable {
                name: name.to_string(),
                value: desired,
            });
        };

        let combination = synthesize(
            &desired,
            &values,
            self.options.error_percent,
            sense.prefer_increase(),
        )
        .ok_or_else(|| ResolveError::Unavailable {
            name: name.to_string(),
            value: desired,
        })?;

        let leaves = combination.leaves();
        let suppliers: Vec<StockPart> = parts
            .iter()
            .enumerate()
            .filter(|(index, _)| {
                offered.iter().any(|(i, v)| {
                    i == index && leaves.iter().any(|l| l.magnitude() == v.magnitude())
                })
            })
            .map(|(_, part)| part.clone())
            .collect();
        info!(block = name, %desired, %combination, "synthesized value");
        Ok((suppliers, Some(combination)))
    }
}

fn requested_value(request: &AttributeRequest) -> Option<Value> {
    match request.get("value") {
        Some(Requirement::Tolerance { value, .. }) => Some(*value),
        _ => None,
    }
}

/// The part with the requested model, else the best ranked one.
fn prefer_model(candidates: &[StockPart], model: Option<&Attribute>) -> Option<StockPart> {
    let wanted: Vec<String> = model.map(Attribute::texts).unwrap_or_default();
    candidates
        .iter()
        .find(|p| !p.model.is_empty() && wanted.contains(&p.model))
        .or_else(|| candidates.first())
        .cloned()
}
