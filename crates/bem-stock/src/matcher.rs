//! Catalog matching: which stock parts can realize a request.
//!
//! A part is suitable when
//!
//! 1. every modifier and property it declares was asked for with a
//!    compatible value,
//! 2. it has enough functional units, and
//! 3. each requested attribute it declares (as a param, modifier, property
//!    or SPICE model parameter) satisfies the attribute's [`Requirement`].
//!
//! Attributes a part does not declare pass; `model` is compared with the
//! part's model. `value` is never checked here; choosing among values is
//! the caller's job.

use bem_core::{is_enough, is_tolerated, AttributeRequest, Requirement, Value};
use tracing::debug;

use crate::part::StockPart;

/// Attributes the matcher leaves to the caller.
const SKIPPED: &[&str] = &["value", "units"];

/// Suitable parts from `catalog`, best first.
///
/// Ranking is ascending by mean `V`, then `I`, then `P` rating, so the
/// smallest sufficient part comes first. Ties keep catalog order.
pub fn match_parts(request: &AttributeRequest, catalog: &[StockPart]) -> Vec<StockPart> {
    let mut parts: Vec<StockPart> = catalog
        .iter()
        .filter(|part| is_part_suitable(request, part))
        .cloned()
        .collect();

    parts.sort_by(|a, b| {
        rating_key(a)
            .iter()
            .zip(rating_key(b).iter())
            .map(|(x, y)| x.total_cmp(y))
            .find(|o| o.is_ne())
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    parts
}

fn rating_key(part: &StockPart) -> [f64; 3] {
    [
        part.mean_rating("V"),
        part.mean_rating("I"),
        part.mean_rating("P"),
    ]
}

/// Whether one part satisfies `request`.
pub fn is_part_suitable(request: &AttributeRequest, part: &StockPart) -> bool {
    for (name, values) in part.mods.iter().chain(part.props.iter()) {
        if values.is_empty() {
            continue;
        }
        let Some(requirement) = request.get(name) else {
            debug!(part = part.label(), attribute = %name, "rejected: not requested");
            return false;
        };
        if !values.iter().any(|v| satisfies(requirement, v)) {
            debug!(part = part.label(), attribute = %name, "rejected: modifier mismatch");
            return false;
        }
    }

    let units = request.units();
    if units != 1 && part.units() < units as usize {
        debug!(part = part.label(), units, "rejected: not enough units");
        return false;
    }

    let spice = part.spice_params();
    for (name, requirement) in request.iter() {
        if SKIPPED.contains(&name) {
            continue;
        }

        if name == "model" && !part.model.is_empty() && !satisfies(requirement, &part.model) {
            debug!(part = part.label(), model = %part.model, %requirement, "rejected: model");
            return false;
        }

        let declared = [
            part.params.get(name).map(Vec::as_slice),
            part.mods.get(name).map(Vec::as_slice),
            part.props.get(name).map(Vec::as_slice),
        ];
        for values in declared.into_iter().flatten() {
            if !values.is_empty() && !values.iter().any(|v| satisfies(requirement, v)) {
                debug!(part = part.label(), attribute = name, %requirement, "rejected");
                return false;
            }
        }

        if let Some(value) = spice.get(&name.to_uppercase()) {
            if !satisfies(requirement, value) {
                debug!(part = part.label(), attribute = name, %requirement, "rejected by spice model");
                return false;
            }
        }
    }

    true
}

/// Whether the declared text `actual` meets `requirement`.
pub fn satisfies(requirement: &Requirement, actual: &str) -> bool {
    match requirement {
        Requirement::Unconstrained => true,
        Requirement::Exact { values } => {
            if values.iter().any(|v| v == actual) {
                return true;
            }
            match Value::parse(actual) {
                Ok(part) => values
                    .iter()
                    .filter_map(|v| Value::parse(v).ok())
                    .any(|v| v.magnitude() == part.magnitude()),
                Err(_) => false,
            }
        }
        Requirement::Sufficiency { value } => Value::parse(actual)
            .map(|part| is_enough(value.magnitude(), part.magnitude()))
            .unwrap_or(false),
        Requirement::Tolerance { value, tolerance } => {
            if value.to_string() == actual {
                return true;
            }
            Value::parse(actual)
                .map(|part| is_tolerated(value.magnitude(), part.magnitude(), *tolerance))
                .unwrap_or(false)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bem_core::Dimension;

    fn volts(v: f64) -> Value {
        Value::new(v, Dimension::Voltage)
    }

    fn resistor(model: &str) -> StockPart {
        StockPart::new("basic.Resistor", model)
    }

    #[test]
    fn sufficiency_rule() {
        let part = resistor("R").with_param("R", ["10"]);
        let enough = AttributeRequest::new().with("R", Requirement::sufficiency(Value::scalar(8.0)));
        let too_much = AttributeRequest::new().with("R", Requirement::sufficiency(Value::scalar(12.0)));
        assert!(is_part_suitable(&enough, &part));
        assert!(!is_part_suitable(&too_much, &part));
    }

    #[test]
    fn tolerance_rule() {
        let request = AttributeRequest::new().with("C", Requirement::tolerance(Value::scalar(100.0)));
        assert!(is_part_suitable(&request, &resistor("a").with_param("C", ["109"])));
        assert!(!is_part_suitable(&request, &resistor("b").with_param("C", ["111"])));
        assert!(is_part_suitable(&request, &resistor("c").with_param("C", ["0.1k"])));
    }

    #[test]
    fn undeclared_attributes_pass() {
        let request = AttributeRequest::new().with("V", Requirement::sufficiency(volts(50.0)));
        assert!(is_part_suitable(&request, &resistor("plain")));
    }

    #[test]
    fn any_declared_value_may_satisfy() {
        let request = AttributeRequest::new().with("V", Requirement::sufficiency(volts(50.0)));
        let part = resistor("multi").with_param("V", ["12", "100"]);
        assert!(is_part_suitable(&request, &part));
    }

    #[test]
    fn value_is_ignored() {
        let request = AttributeRequest::new().with("value", Requirement::tolerance(Value::scalar(1.0)));
        assert!(is_part_suitable(&request, &resistor("x").with_param("value", ["1000"])));
    }

    #[test]
    fn part_modifiers_must_be_requested() {
        let part = resistor("e24").with_mod("series", "E24");

        let none = AttributeRequest::new();
        assert!(!is_part_suitable(&none, &part));

        let other = AttributeRequest::new().with("series", Requirement::exact(["E96"]));
        assert!(!is_part_suitable(&other, &part));

        let either = AttributeRequest::new().with("series", Requirement::exact(["E96", "E24"]));
        assert!(is_part_suitable(&either, &part));

        let prop = resistor("smd").with_prop("footprint", "0805");
        let request = AttributeRequest::new().with("footprint", Requirement::exact(["0805"]));
        assert!(is_part_suitable(&request, &prop));
    }

    #[test]
    fn exact_compares_quantities() {
        assert!(satisfies(&Requirement::exact(["1k"]), "1000"));
        assert!(!satisfies(&Requirement::exact(["1k"]), "1001"));
        assert!(!satisfies(&Requirement::exact(["smd"]), "tht"));
        assert!(satisfies(&Requirement::Unconstrained, "anything"));
    }

    #[test]
    fn units_must_suffice() {
        let dual = resistor("dual").with_param("units", ["A", "B"]);
        let single = resistor("single");
        let request = AttributeRequest::new().with_units(2);
        assert!(is_part_suitable(&request, &dual));
        assert!(!is_part_suitable(&request, &single));
        assert!(is_part_suitable(&AttributeRequest::new(), &single));
    }

    #[test]
    fn spice_params_are_checked() {
        let part = StockPart::new("basic.Diode", "1N4148").with_spice(".model 1N4148 D(BV=100)");
        let ok = AttributeRequest::new().with("BV", Requirement::sufficiency(Value::scalar(75.0)));
        let too_high = AttributeRequest::new().with("BV", Requirement::sufficiency(Value::scalar(200.0)));
        assert!(is_part_suitable(&ok, &part));
        assert!(!is_part_suitable(&too_high, &part));
    }

    #[test]
    fn model_is_compared_with_part_model() {
        let catalog = vec![resistor("RC0805"), resistor("RC1206"), resistor("")];
        let request = AttributeRequest::new().with("model", Requirement::exact(["RC1206"]));
        let models: Vec<String> = match_parts(&request, &catalog)
            .into_iter()
            .map(|p| p.model)
            .collect();
        assert_eq!(models, vec!["RC1206", ""]);
    }

    #[test]
    fn ranking_by_mean_ratings() {
        let catalog = vec![
            resistor("big").with_param("V", ["200"]).with_param("P", ["1"]),
            resistor("small").with_param("V", ["50"]),
            resistor("mid-hot").with_param("V", ["100"]).with_param("I", ["2"]),
            resistor("mid-cool").with_param("V", ["50", "150"]).with_param("I", ["1"]),
            resistor("weak").with_param("V", ["10"]),
        ];
        let request = AttributeRequest::new().with("V", Requirement::sufficiency(volts(24.0)));
        let models: Vec<String> = match_parts(&request, &catalog)
            .into_iter()
            .map(|p| p.model)
            .collect();
        assert_eq!(models, vec!["small", "mid-cool", "mid-hot", "big"]);
    }

    #[test]
    fn empty_result_is_not_an_error() {
        let request = AttributeRequest::new().with("V", Requirement::sufficiency(volts(1000.0)));
        let catalog = vec![resistor("r").with_param("V", ["50"])];
        assert!(match_parts(&request, &catalog).is_empty());
    }
}
