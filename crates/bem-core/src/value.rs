//! Physical quantities with SI-prefix parsing and engineering display.
//!
//! A [`Value`] stores its magnitude normalized to base units (ohms, farads,
//! volts, ...) so comparisons never depend on how the quantity was written:
//! `"4.7k"`, `"4700"` and `"4.7 kOhm"` all carry the magnitude `4700.0`.

use std::fmt;
use std::ops::{Add, Div, Mul, Neg, Sub};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

/// SI prefixes and their scale factors.
const PREFIXES: &[(&str, f64)] = &[
    ("y", 1e-24),
    ("z", 1e-21),
    ("a", 1e-18),
    ("f", 1e-15),
    ("p", 1e-12),
    ("n", 1e-9),
    ("u", 1e-6),
    ("μ", 1e-6),
    ("m", 1e-3),
    ("c", 1e-2),
    ("d", 1e-1),
    ("k", 1e3),
    ("M", 1e6),
    ("G", 1e9),
    ("T", 1e12),
    ("P", 1e15),
    ("E", 1e18),
    ("Z", 1e21),
    ("Y", 1e24),
];

/// Engineering prefixes used for display, indexed by exponent / 3 + 8.
const ENGINEERING: [&str; 17] = [
    "y", "z", "a", "f", "p", "n", "u", "m", "", "k", "M", "G", "T", "P", "E", "Z", "Y",
];

/// Unit suffixes accepted by the parser, longest first.
const UNIT_SUFFIXES: &[(&str, Dimension)] = &[
    ("Ohm", Dimension::Resistance),
    ("ohm", Dimension::Resistance),
    ("Hz", Dimension::Frequency),
    ("Ω", Dimension::Resistance),
    ("F", Dimension::Capacitance),
    ("H", Dimension::Inductance),
    ("V", Dimension::Voltage),
    ("A", Dimension::Current),
    ("W", Dimension::Power),
    ("s", Dimension::Time),
    ("C", Dimension::Charge),
    ("S", Dimension::Conductance),
];

/// The physical dimension of a [`Value`].
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    /// Dimensionless number.
    #[default]
    Scalar,
    Resistance,
    Capacitance,
    Inductance,
    Voltage,
    Current,
    Power,
    Frequency,
    Time,
    Charge,
    Conductance,
}

impl Dimension {
    /// Unit symbol used when displaying values of this dimension.
    pub fn symbol(&self) -> &'static str {
        match self {
            Dimension::Scalar => "",
            Dimension::Resistance => "Ω",
            Dimension::Capacitance => "F",
            Dimension::Inductance => "H",
            Dimension::Voltage => "V",
            Dimension::Current => "A",
            Dimension::Power => "W",
            Dimension::Frequency => "Hz",
            Dimension::Time => "s",
            Dimension::Charge => "C",
            Dimension::Conductance => "S",
        }
    }
}

/// A quantity: magnitude in base units plus a dimension.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ValueRepr", into = "String")]
pub struct Value {
    magnitude: f64,
    dimension: Dimension,
}

/// Accepted serialized forms: a bare number or a quantity string.
#[derive(Deserialize)]
#[serde(untagged)]
enum ValueRepr {
    Number(f64),
    Text(String),
}

impl TryFrom<ValueRepr> for Value {
    type Error = CoreError;

    fn try_from(repr: ValueRepr) -> Result<Self> {
        match repr {
            ValueRepr::Number(n) => Ok(Value::scalar(n)),
            ValueRepr::Text(s) => Value::parse(&s),
        }
    }
}

impl From<Value> for String {
    fn from(value: Value) -> Self {
        value.to_string()
    }
}

impl Value {
    /// Create a value from a magnitude in base units.
    pub fn new(magnitude: f64, dimension: Dimension) -> Self {
        Value {
            magnitude,
            dimension,
        }
    }

    /// Create a dimensionless value.
    pub fn scalar(magnitude: f64) -> Self {
        Value::new(magnitude, Dimension::Scalar)
    }

    /// Magnitude in base units.
    pub fn magnitude(&self) -> f64 {
        self.magnitude
    }

    /// Absolute magnitude in base units.
    pub fn abs(&self) -> f64 {
        self.magnitude.abs()
    }

    pub fn dimension(&self) -> Dimension {
        self.dimension
    }

    /// Return the same magnitude tagged with another dimension.
    pub fn with_dimension(self, dimension: Dimension) -> Self {
        Value::new(self.magnitude, dimension)
    }

    /// Return a value with the same dimension and a new magnitude.
    pub fn with_magnitude(self, magnitude: f64) -> Self {
        Value::new(magnitude, self.dimension)
    }

    /// Multiply the magnitude by `factor`.
    pub fn scale(self, factor: f64) -> Self {
        self.with_magnitude(self.magnitude * factor)
    }

    /// Parse a quantity such as `"4.7k"`, `"100 nF"`, `"2.2MΩ"` or `"1e3"`.
    ///
    /// The number may be followed by an optional SI prefix and an optional
    /// unit symbol. Without a unit symbol the value is a [`Dimension::Scalar`].
    pub fn parse(input: &str) -> Result<Self> {
        let text = input.trim();
        let invalid = |detail: &str| CoreError::InvalidValue {
            input: input.to_string(),
            detail: detail.to_string(),
        };

        let (number, rest) = split_number(text).ok_or_else(|| invalid("no leading number"))?;
        let rest = rest.trim();

        let (factor, dimension) = parse_suffix(rest).ok_or_else(|| {
            invalid(&format!("unknown prefix or unit '{rest}'"))
        })?;

        Ok(Value::new(number * factor, dimension))
    }

    /// Parse a quantity, tagging dimensionless input with `dimension`.
    pub fn parse_as(input: &str, dimension: Dimension) -> Result<Self> {
        let value = Value::parse(input)?;
        if value.dimension == Dimension::Scalar {
            Ok(value.with_dimension(dimension))
        } else {
            Ok(value)
        }
    }

    /// Split the magnitude into an engineering mantissa and prefix,
    /// e.g. `4700.0` → `(4.7, "k")`.
    pub fn canonical(&self) -> (f64, &'static str) {
        let m = self.magnitude;
        if m == 0.0 || !m.is_finite() {
            return (m, "");
        }

        let exponent = (m.abs().log10() / 3.0).floor() as i32;
        let exponent = exponent.clamp(-8, 8);
        let mut mantissa = m / 10f64.powi(exponent * 3);
        let mut index = (exponent + 8) as usize;

        // log10 rounding can leave the mantissa at 1000.
        if mantissa.abs() >= 999.9999995 && index + 1 < ENGINEERING.len() {
            mantissa /= 1000.0;
            index += 1;
        }

        (mantissa, ENGINEERING[index])
    }
}

/// Longest leading slice of `text` that parses as a float.
fn split_number(text: &str) -> Option<(f64, &str)> {
    let mut boundaries: Vec<usize> = text.char_indices().map(|(i, _)| i).skip(1).collect();
    boundaries.push(text.len());

    boundaries.into_iter().rev().find_map(|end| {
        let head = &text[..end];
        // `inf`/`nan` spellings are not quantities.
        if head.chars().any(|c| c.is_ascii_alphabetic() && c != 'e' && c != 'E') {
            return None;
        }
        head.parse::<f64>().ok().map(|n| (n, &text[end..]))
    })
}

/// Interpret `<prefix?><unit?>`.
fn parse_suffix(rest: &str) -> Option<(f64, Dimension)> {
    if rest.is_empty() {
        return Some((1.0, Dimension::Scalar));
    }

    for (unit, dimension) in UNIT_SUFFIXES {
        if let Some(head) = rest.strip_suffix(unit) {
            if let Some(factor) = prefix_factor(head.trim()) {
                return Some((factor, *dimension));
            }
        }
    }

    prefix_factor(rest).map(|factor| (factor, Dimension::Scalar))
}

fn prefix_factor(prefix: &str) -> Option<f64> {
    if prefix.is_empty() {
        return Some(1.0);
    }
    PREFIXES
        .iter()
        .find(|(p, _)| *p == prefix)
        .map(|(_, factor)| *factor)
}

/// Format a mantissa with up to six decimals and no trailing zeros.
fn format_mantissa(mantissa: f64) -> String {
    let text = format!("{mantissa:.6}");
    let text = text.trim_end_matches('0').trim_end_matches('.');
    if text == "-0" {
        "0".to_string()
    } else {
        text.to_string()
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (mantissa, prefix) = self.canonical();
        let unit = format!("{prefix}{}", self.dimension.symbol());
        if unit.is_empty() {
            write!(f, "{}", format_mantissa(mantissa))
        } else {
            write!(f, "{} {unit}", format_mantissa(mantissa))
        }
    }
}

impl FromStr for Value {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        Value::parse(s)
    }
}

impl From<f64> for Value {
    fn from(magnitude: f64) -> Self {
        Value::scalar(magnitude)
    }
}

impl Add for Value {
    type Output = Value;

    fn add(self, rhs: Value) -> Value {
        self.with_magnitude(self.magnitude + rhs.magnitude)
    }
}

impl Sub for Value {
    type Output = Value;

    fn sub(self, rhs: Value) -> Value {
        self.with_magnitude(self.magnitude - rhs.magnitude)
    }
}

impl Mul<f64> for Value {
    type Output = Value;

    fn mul(self, rhs: f64) -> Value {
        self.scale(rhs)
    }
}

impl Div<f64> for Value {
    type Output = Value;

    fn div(self, rhs: f64) -> Value {
        self.with_magnitude(self.magnitude / rhs)
    }
}

impl Neg for Value {
    type Output = Value;

    fn neg(self) -> Value {
        self.with_magnitude(-self.magnitude)
    }
}

/// Symmetric tolerance check: `actual` lies within `desired * (1 ± tolerance)`.
///
/// Magnitudes are compared by absolute value. Exactly equal magnitudes always
/// match, so a zero request still matches a zero part.
pub fn is_tolerated(desired: f64, actual: f64, tolerance: f64) -> bool {
    let desired = desired.abs();
    let actual = actual.abs();
    desired == actual || (desired - actual).abs() < desired * tolerance
}

/// Rating check: `actual` is at least as large as `desired`.
pub fn is_enough(desired: f64, actual: f64) -> bool {
    actual.abs() >= desired.abs()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_plain_numbers() {
        assert_eq!(Value::parse("100").unwrap(), Value::scalar(100.0));
        assert_eq!(Value::parse(" -2.5 ").unwrap(), Value::scalar(-2.5));
        assert_eq!(Value::parse("1e3").unwrap().magnitude(), 1000.0);
    }

    #[test]
    fn parse_prefixes() {
        assert_eq!(Value::parse("4.7k").unwrap().magnitude(), 4700.0);
        assert!((Value::parse("100n").unwrap().magnitude() - 100e-9).abs() < 1e-18);
        assert_eq!(Value::parse("2 M").unwrap().magnitude(), 2e6);
        assert!((Value::parse("10 u").unwrap().magnitude() - 10e-6).abs() < 1e-15);
        assert!((Value::parse("10μ").unwrap().magnitude() - 10e-6).abs() < 1e-15);
        assert!((Value::parse("5m").unwrap().magnitude() - 0.005).abs() < 1e-12);
    }

    #[test]
    fn parse_units() {
        let r = Value::parse("4.7 kOhm").unwrap();
        assert_eq!(r.magnitude(), 4700.0);
        assert_eq!(r.dimension(), Dimension::Resistance);

        let c = Value::parse("100nF").unwrap();
        assert_eq!(c.dimension(), Dimension::Capacitance);

        let f = Value::parse("1.5 MHz").unwrap();
        assert_eq!(f.magnitude(), 1.5e6);
        assert_eq!(f.dimension(), Dimension::Frequency);

        assert_eq!(Value::parse("2.2MΩ").unwrap().magnitude(), 2.2e6);
        assert_eq!(Value::parse("12 V").unwrap().dimension(), Dimension::Voltage);
        assert_eq!(Value::parse("3 ms").unwrap().dimension(), Dimension::Time);
    }

    #[test]
    fn farad_is_not_femto() {
        let farad = Value::parse("1F").unwrap();
        assert_eq!(farad.magnitude(), 1.0);
        assert_eq!(farad.dimension(), Dimension::Capacitance);

        let femto = Value::parse("1f").unwrap();
        assert_eq!(femto.dimension(), Dimension::Scalar);
        assert!((femto.magnitude() - 1e-15).abs() < 1e-24);
    }

    #[test]
    fn reject_garbage() {
        assert!(Value::parse("").is_err());
        assert!(Value::parse("abc").is_err());
        assert!(Value::parse("10 q").is_err());
        assert!(Value::parse("1N4148").is_err());
        assert!(Value::parse("inf").is_err());
    }

    #[test]
    fn parse_as_tags_scalars() {
        let v = Value::parse_as("10k", Dimension::Resistance).unwrap();
        assert_eq!(v.dimension(), Dimension::Resistance);
        let kept = Value::parse_as("5 V", Dimension::Resistance).unwrap();
        assert_eq!(kept.dimension(), Dimension::Voltage);
    }

    #[test]
    fn canonical_form() {
        assert_eq!(Value::new(4700.0, Dimension::Resistance).to_string(), "4.7 kΩ");
        assert_eq!(Value::new(100e-9, Dimension::Capacitance).to_string(), "100 nF");
        assert_eq!(Value::scalar(100.0).to_string(), "100");
        assert_eq!(Value::scalar(0.0).to_string(), "0");
        assert_eq!(Value::scalar(1000.0).canonical(), (1.0, "k"));
        assert_eq!(Value::new(12.0, Dimension::Voltage).to_string(), "12 V");
    }

    #[test]
    fn display_parses_back() {
        for text in ["4.7 kΩ", "100 nF", "1.5 MHz", "12 V", "330"] {
            let v = Value::parse(text).unwrap();
            let again = Value::parse(&v.to_string()).unwrap();
            assert!((v.magnitude() - again.magnitude()).abs() <= v.abs() * 1e-9);
            assert_eq!(v.dimension(), again.dimension());
        }
    }

    #[test]
    fn arithmetic_keeps_dimension() {
        let a = Value::new(100.0, Dimension::Resistance);
        let b = Value::new(50.0, Dimension::Resistance);
        assert_eq!((a + b).magnitude(), 150.0);
        assert_eq!((a - b).magnitude(), 50.0);
        assert_eq!((a * 2.0).magnitude(), 200.0);
        assert_eq!((a / 4.0).magnitude(), 25.0);
        assert_eq!((-a).magnitude(), -100.0);
        assert_eq!((a + b).dimension(), Dimension::Resistance);
    }

    #[test]
    fn tolerance_boundary() {
        assert!(is_tolerated(100.0, 109.0, 0.1));
        assert!(is_tolerated(100.0, 91.0, 0.1));
        assert!(!is_tolerated(100.0, 111.0, 0.1));
        assert!(!is_tolerated(100.0, 89.0, 0.1));
        assert!(is_tolerated(0.0, 0.0, 0.1));
        assert!(is_tolerated(-100.0, 105.0, 0.1));
    }

    #[test]
    fn sufficiency() {
        assert!(is_enough(8.0, 10.0));
        assert!(is_enough(10.0, 10.0));
        assert!(!is_enough(12.0, 10.0));
        assert!(is_enough(-8.0, 10.0));
    }

    #[test]
    fn serde_forms() {
        let v: Value = serde_json::from_str("\"4.7k\"").unwrap();
        assert_eq!(v.magnitude(), 4700.0);
        let n: Value = serde_json::from_str("42").unwrap();
        assert_eq!(n, Value::scalar(42.0));
        let out = serde_json::to_string(&Value::new(12.0, Dimension::Voltage)).unwrap();
        assert_eq!(out, "\"12 V\"");
        assert!(serde_json::from_str::<Value>("\"nope\"").is_err());
    }
}
