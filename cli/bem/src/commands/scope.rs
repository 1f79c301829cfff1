//! `bem scope`: list the block library.

use anyhow::{Context, Result};
use bem_registry::{format_scope, LocalRegistry};

use super::{to_json, Project};

pub fn run(project: &Project, json: bool) -> Result<()> {
    print!("{}", render(project, json)?);
    Ok(())
}

pub(crate) fn render(project: &Project, json: bool) -> Result<String> {
    let root = project.blocks_dir();
    let scope = LocalRegistry::new(root.clone())
        .scope()
        .with_context(|| format!("scanning {}", root.display()))?;
    if json {
        Ok(to_json(&scope)? + "\n")
    } else {
        Ok(format_scope(&scope))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::testing;

    #[test]
    fn scope_lists_scaffolded_blocks() {
        let (_dir, project) = testing::project();
        let out = render(&project, false).unwrap();
        assert!(out.contains("basic.Resistor\n"));
        assert!(out.contains("basic.Capacitor\n"));
        assert!(out.contains("abstract.Combination\n"));
        assert!(out.contains("E24"));
        assert!(out.ends_with("4 blocks\n"));
    }

    #[test]
    fn scope_json_maps_modifiers() {
        let (_dir, project) = testing::project();
        let out = render(&project, true).unwrap();
        let json: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(json["basic.Resistor"]["series"][0], "E24");
    }
}
