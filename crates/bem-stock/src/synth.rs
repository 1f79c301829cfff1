//! Series/parallel synthesis of values that stock cannot supply directly.
//!
//! Given the values available from stock, [`synthesize`] looks for the
//! closest single value and, when that is too far off, greedily combines
//! values. For resistor-like components (`prefer_increase`) putting parts in
//! series adds their values; for capacitor-like components parallel does.

use std::fmt;

use bem_core::Value;
use serde::Serialize;

/// Recursion limit for the greedy decomposition.
pub const MAX_DEPTH: usize = 8;

/// How the children of a combination are connected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CombinationKind {
    Series,
    Parallel,
}

impl CombinationKind {
    /// The kind that adds values for the given sense.
    pub fn additive(prefer_increase: bool) -> Self {
        if prefer_increase {
            CombinationKind::Series
        } else {
            CombinationKind::Parallel
        }
    }

    /// The kind that reduces values for the given sense.
    pub fn subtractive(prefer_increase: bool) -> Self {
        match Self::additive(prefer_increase) {
            CombinationKind::Series => CombinationKind::Parallel,
            CombinationKind::Parallel => CombinationKind::Series,
        }
    }
}

impl fmt::Display for CombinationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CombinationKind::Series => write!(f, "series"),
            CombinationKind::Parallel => write!(f, "parallel"),
        }
    }
}

/// A single stock value or a network of them.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Combination {
    Single(Value),
    Group {
        kind: CombinationKind,
        children: Vec<Combination>,
        /// Resolved aggregate value.
        value: Value,
    },
}

impl Combination {
    /// The value this combination realizes.
    pub fn value(&self) -> Value {
        match self {
            Combination::Single(v) => *v,
            Combination::Group { value, .. } => *value,
        }
    }

    /// Stock values used, in order.
    pub fn leaves(&self) -> Vec<Value> {
        match self {
            Combination::Single(v) => vec![*v],
            Combination::Group { children, .. } => {
                children.iter().flat_map(Combination::leaves).collect()
            }
        }
    }

    pub fn is_single(&self) -> bool {
        matches!(self, Combination::Single(_))
    }
}

impl fmt::Display for Combination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Combination::Single(v) => write!(f, "{v}"),
            Combination::Group { kind, children, .. } => {
                let joint = match kind {
                    CombinationKind::Series => " + ",
                    CombinationKind::Parallel => " || ",
                };
                let parts: Vec<String> = children
                    .iter()
                    .map(|c| match c {
                        Combination::Single(_) => c.to_string(),
                        Combination::Group { .. } => format!("({c})"),
                    })
                    .collect();
                write!(f, "{}", parts.join(joint))
            }
        }
    }
}

/// The available value closest to `target`; the first one wins a tie.
pub fn closest(available: &[Value], target: f64) -> Option<Value> {
    let mut best: Option<Value> = None;
    for value in available {
        match best {
            Some(b) if (target - b.magnitude()).abs() <= (target - value.magnitude()).abs() => {}
            _ => best = Some(*value),
        }
    }
    best
}

/// Realize `desired` from `available` values within `error_percent`.
///
/// Returns `None` when no single value or bounded combination gets within
/// twice the allowed error of `desired`.
pub fn synthesize(
    desired: &Value,
    available: &[Value],
    error_percent: f64,
    prefer_increase: bool,
) -> Option<Combination> {
    let values: Vec<Value> = available
        .iter()
        .filter(|v| v.magnitude().is_finite() && v.magnitude() > 0.0)
        .copied()
        .collect();
    if values.is_empty() || !desired.magnitude().is_finite() {
        return None;
    }

    let synthesizer = Synthesizer {
        values,
        error_percent,
        prefer_increase,
        template: *desired,
    };
    let threshold = desired.abs() * error_percent / 100.0;
    let combination = synthesizer.build(desired.magnitude(), threshold, 0)?;

    let gap = (desired.magnitude() - combination.value().magnitude()).abs();
    if gap > 2.0 * threshold {
        return None;
    }
    Some(combination)
}

struct Synthesizer {
    values: Vec<Value>,
    error_percent: f64,
    prefer_increase: bool,
    /// Carries the dimension of the request into aggregates.
    template: Value,
}

impl Synthesizer {
    fn build(&self, desired: f64, threshold: f64, depth: usize) -> Option<Combination> {
        if depth >= MAX_DEPTH {
            return None;
        }

        let nearest = closest(&self.values, desired)?;
        let max_error = desired.abs() * self.error_percent / 100.0;
        let diff = desired - nearest.magnitude();

        if max_error > diff.abs() || diff.abs() < threshold {
            return Some(Combination::Single(nearest));
        }

        if diff > 0.0 {
            let rest = self.build(diff.abs(), threshold, depth + 1)?;
            let additive = CombinationKind::additive(self.prefer_increase);
            let mut children = vec![Combination::Single(nearest)];
            match rest {
                Combination::Group { kind, children: inner, .. } if kind == additive => {
                    children.extend(inner)
                }
                other => children.push(other),
            }
            return Some(self.group(additive, children));
        }

        let first = closest(&self.values, (2.0 * diff).abs())?;
        let second = first.magnitude() * diff / (diff - first.magnitude());
        let second = closest(&self.values, second.abs())?;
        Some(self.group(
            CombinationKind::subtractive(self.prefer_increase),
            vec![Combination::Single(first), Combination::Single(second)],
        ))
    }

    fn group(&self, kind: CombinationKind, children: Vec<Combination>) -> Combination {
        let magnitudes: Vec<f64> = children.iter().map(|c| c.value().magnitude()).collect();
        let aggregate = if kind == CombinationKind::additive(self.prefer_increase) {
            magnitudes.iter().sum()
        } else {
            1.0 / magnitudes.iter().map(|m| 1.0 / m).sum::<f64>()
        };
        Combination::Group {
            kind,
            children,
            value: self.template.with_magnitude(aggregate),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bem_core::Dimension;

    fn ohms(values: &[f64]) -> Vec<Value> {
        values.iter().map(|v| Value::new(*v, Dimension::Resistance)).collect()
    }

    #[test]
    fn close_single_value_wins() {
        let desired = Value::new(100.0, Dimension::Resistance);
        let result = synthesize(&desired, &ohms(&[95.0, 103.0, 150.0]), 10.0, true).unwrap();
        assert_eq!(result, Combination::Single(Value::new(103.0, Dimension::Resistance)));
    }

    #[test]
    fn series_fills_the_gap() {
        let desired = Value::new(150.0, Dimension::Resistance);
        let result = synthesize(&desired, &ohms(&[100.0]), 5.0, true).unwrap();

        let achieved = result.value().magnitude();
        assert!((achieved - 150.0).abs() <= 150.0 * 0.05, "got {achieved}");
        match &result {
            Combination::Group { kind, .. } => assert_eq!(*kind, CombinationKind::Series),
            other => panic!("expected a series group, got {other}"),
        }
        assert_eq!(result.leaves().len(), 3);
        assert_eq!(result.value().dimension(), Dimension::Resistance);
        assert_eq!(result.to_string(), "100 Ω + (100 Ω || 100 Ω)");
    }

    #[test]
    fn unreachable_value_is_none() {
        let desired = Value::scalar(10_000.0);
        assert!(synthesize(&desired, &ohms(&[1.0, 2.0, 3.0]), 10.0, true).is_none());
    }

    #[test]
    fn capacitive_sense_adds_in_parallel() {
        let desired = Value::new(200e-9, Dimension::Capacitance);
        let available = vec![Value::new(100e-9, Dimension::Capacitance)];
        let result = synthesize(&desired, &available, 5.0, false).unwrap();
        match &result {
            Combination::Group { kind, children, value } => {
                assert_eq!(*kind, CombinationKind::Parallel);
                assert_eq!(children.len(), 2);
                assert!((value.magnitude() - 200e-9).abs() < 1e-15);
            }
            other => panic!("expected a parallel group, got {other}"),
        }
    }

    #[test]
    fn unusable_values_are_ignored() {
        let desired = Value::scalar(100.0);
        assert!(synthesize(&desired, &[], 10.0, true).is_none());
        assert!(synthesize(&desired, &ohms(&[0.0, -5.0, f64::NAN]), 10.0, true).is_none());
        let result = synthesize(&desired, &ohms(&[-100.0, 100.0]), 10.0, true).unwrap();
        assert_eq!(result.value().magnitude(), 100.0);
    }

    #[test]
    fn closest_prefers_first_on_tie() {
        let values = ohms(&[90.0, 110.0]);
        assert_eq!(closest(&values, 100.0).unwrap().magnitude(), 90.0);
        assert!(closest(&[], 1.0).is_none());
    }
}
