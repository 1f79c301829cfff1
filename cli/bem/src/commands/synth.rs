//! `bem synth`: realize a value from a list of available values.

use anyhow::{bail, Context, Result};
use bem_core::Value;
use bem_stock::{synthesize, Combination};
use serde::Serialize;

use super::to_json;

/// Arguments of one synthesis run.
#[derive(Debug, Clone)]
pub struct SynthRequest<'a> {
    pub desired: &'a str,
    pub values: &'a [String],
    pub error_percent: f64,
    pub decrease: bool,
    pub json: bool,
}

#[derive(Serialize)]
struct SynthReport<'a> {
    desired: Value,
    achieved: Value,
    error_percent: f64,
    combination: &'a Combination,
}

pub fn run(request: &SynthRequest<'_>) -> Result<()> {
    print!("{}", render(request)?);
    Ok(())
}

pub(crate) fn render(request: &SynthRequest<'_>) -> Result<String> {
    let desired = Value::parse(request.desired)
        .with_context(|| format!("invalid desired value '{}'", request.desired))?;
    let available = request
        .values
        .iter()
        .map(|v| Value::parse_as(v, desired.dimension()).with_context(|| format!("invalid value '{v}'")))
        .collect::<Result<Vec<Value>>>()?;

    let Some(combination) = synthesize(&desired, &available, request.error_percent, !request.decrease)
    else {
        bail!(
            "cannot realize {desired} within {}% from {} values",
            request.error_percent,
            available.len()
        );
    };

    let achieved = combination.value();
    let error = if desired.magnitude() == 0.0 {
        0.0
    } else {
        (achieved.magnitude() - desired.magnitude()).abs() / desired.abs() * 100.0
    };

    if request.json {
        let report = SynthReport {
            desired,
            achieved,
            error_percent: error,
            combination: &combination,
        };
        return Ok(to_json(&report)? + "\n");
    }

    Ok(format!("{desired} ≈ {combination}\n  = {achieved} ({error:.2}% off)\n"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn request<'a>(desired: &'a str, values: &'a [String], error_percent: f64) -> SynthRequest<'a> {
        SynthRequest {
            desired,
            values,
            error_percent,
            decrease: false,
            json: false,
        }
    }

    #[test]
    fn single_value_is_reported() {
        let available = values(&["95", "103", "150"]);
        let out = render(&request("100", &available, 10.0)).unwrap();
        assert!(out.starts_with("100 ≈ 103\n"));
        assert!(out.contains("3.00% off"));
    }

    #[test]
    fn series_combination_is_reported() {
        let available = values(&["100"]);
        let out = render(&request("150", &available, 5.0)).unwrap();
        assert!(out.contains(" + "));
    }

    #[test]
    fn unreachable_value_fails() {
        let available = values(&["1", "2", "3"]);
        let err = render(&request("10k", &available, 10.0)).unwrap_err();
        assert!(err.to_string().contains("cannot realize"));
    }

    #[test]
    fn decrease_sense_uses_parallel() {
        let available = values(&["100n"]);
        let mut req = request("200nF", &available, 5.0);
        req.decrease = true;
        req.json = true;
        let out = render(&req).unwrap();

        let json: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(json["combination"]["group"]["kind"], "parallel");
        assert_eq!(json["desired"], "200 nF");
    }

    #[test]
    fn invalid_value_is_reported() {
        let available = values(&["abc"]);
        assert!(render(&request("100", &available, 10.0)).is_err());
    }
}
