//! `bem match`: stock parts that can realize a block.

use anyhow::Result;
use bem_stock::StockPart;
use serde::Serialize;

use super::{to_json, BlockArgs, Project};

#[derive(Serialize)]
struct MatchReport<'a> {
    request: String,
    parts: &'a [StockPart],
}

pub fn run(project: &Project, args: &BlockArgs) -> Result<()> {
    print!("{}", render(project, args)?);
    Ok(())
}

pub(crate) fn render(project: &Project, args: &BlockArgs) -> Result<String> {
    let spec = args.specification()?;
    let resolver = project.resolver(project.options())?;
    let composed = resolver.compose(&spec)?;
    let (request, parts) = resolver.candidates(&composed)?;

    if args.json {
        let report = MatchReport {
            request: request.to_string(),
            parts: &parts,
        };
        return Ok(to_json(&report)? + "\n");
    }

    let mut out = format!("{}\n  request: {request}\n\n", spec.label());
    for (rank, part) in parts.iter().enumerate() {
        out.push_str(&format!("{:>3}. {}", rank + 1, part.model));
        if !part.id.is_empty() {
            out.push_str(&format!(" (#{})", part.id));
        }
        for rating in ["V", "I", "P"] {
            let values = part.param(rating);
            if !values.is_empty() {
                out.push_str(&format!("  {rating}={}", values.join(",")));
            }
        }
        out.push('\n');
    }
    out.push_str(&format!("\n{} suitable parts\n", parts.len()));
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::testing;

    #[test]
    fn match_ranks_parts_by_rating() {
        let (_dir, project) = testing::project();
        let out = render(&project, &testing::block("basic.Resistor", &[], &[])).unwrap();

        let small = out.find("RC0805").unwrap();
        let large = out.find("RC1206").unwrap();
        assert!(small < large);
        assert!(out.contains("2 suitable parts"));
    }

    #[test]
    fn ratings_filter_parts() {
        let (_dir, project) = testing::project();
        let out = render(&project, &testing::block("basic.Resistor", &[], &["V=180"])).unwrap();
        assert!(!out.contains("RC0805"));
        assert!(out.contains("RC1206"));
        assert!(out.contains("1 suitable parts"));
    }

    #[test]
    fn unrequested_modifier_excludes_part() {
        let (_dir, project) = testing::project();
        let mut args = testing::block("basic.Resistor", &["series=E96"], &[]);
        args.json = true;
        let out = render(&project, &args).unwrap();

        let json: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(json["parts"].as_array().unwrap().len(), 0);
    }
}
