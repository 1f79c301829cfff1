//! `bem compose`: show how a block is put together.

use anyhow::Result;
use bem_registry::{format_tree, Composer};

use super::{to_json, BlockArgs, Project};

pub fn run(project: &Project, args: &BlockArgs) -> Result<()> {
    print!("{}", render(project, args)?);
    Ok(())
}

pub(crate) fn render(project: &Project, args: &BlockArgs) -> Result<String> {
    let spec = args.specification()?;
    let composed = Composer::new(project.registry()).compose(&spec)?;
    if args.json {
        Ok(to_json(&composed)? + "\n")
    } else {
        Ok(format_tree(&composed))
    }
}
