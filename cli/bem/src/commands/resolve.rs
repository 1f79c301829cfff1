//! `bem resolve`: compose a block, pick a stock part and settle its value.

use anyhow::Result;
use bem_physical::Resolution;

use super::{to_json, BlockArgs, Project};

pub fn run(project: &Project, args: &BlockArgs, virtual_part: bool) -> Result<()> {
    print!("{}", render(project, args, virtual_part)?);
    Ok(())
}

pub(crate) fn render(project: &Project, args: &BlockArgs, virtual_part: bool) -> Result<String> {
    let spec = args.specification()?;
    let mut options = project.options();
    options.virtual_part |= virtual_part;

    let resolution = project.resolver(options)?.resolve(&spec)?;
    if args.json {
        return Ok(to_json(&resolution)? + "\n");
    }
    Ok(describe(&spec.label(), &resolution))
}

fn describe(label: &str, resolution: &Resolution) -> String {
    let mut out = format!("{label}\n");
    match &resolution.part {
        Some(part) => {
            out.push_str(&format!("  part:  {}", part.model));
            if !part.id.is_empty() {
                out.push_str(&format!(" (#{})", part.id));
            }
            out.push('\n');
            if !part.description.is_empty() {
                out.push_str(&format!("         {}\n", part.description));
            }
        }
        None => out.push_str("  part:  (none)\n"),
    }
    if let Some(combination) = &resolution.combination {
        out.push_str(&format!("  value: {combination}"));
        if !combination.is_single() {
            out.push_str(&format!(" = {}", combination.value()));
        }
        out.push('\n');
    }
    if resolution.is_virtual {
        out.push_str("  (virtual)\n");
    }
    out
}
