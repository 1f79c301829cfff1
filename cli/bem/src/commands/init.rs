//! `bem init`: project scaffolding.

use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use bem_core::{Dimension, Value};
use bem_physical::COMBINATION_BLOCK;
use bem_registry::{AncestorRef, CapabilityModule, ModuleKey, ModuleManifest};
use bem_stock::{LocalCatalog, StockPart};

use crate::config::{BemConfig, CONFIG_FILE};

/// Create a new BEM project in the directory `name`, relative to cwd.
pub fn run(name: &str) -> Result<()> {
    let project_dir = Path::new(name);
    create_project(project_dir, name)
}

pub(crate) fn create_project(project_dir: &Path, name: &str) -> Result<()> {
    if project_dir.exists() {
        bail!("directory '{}' already exists", project_dir.display());
    }

    let blocks = project_dir.join("blocks");
    fs::create_dir_all(&blocks).context("creating blocks/ directory")?;

    fs::write(project_dir.join(CONFIG_FILE), BemConfig::template(name))
        .with_context(|| format!("writing {CONFIG_FILE}"))?;

    let mut written = Vec::new();
    for (relative, module) in sample_modules() {
        let path = blocks.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
        let content = ModuleManifest::from_module(&module).to_toml()?;
        fs::write(&path, content).with_context(|| format!("writing {}", path.display()))?;
        written.push(format!("blocks/{relative}"));
    }

    LocalCatalog::write(&project_dir.join("stock.json"), sample_stock())
        .context("writing stock.json")?;

    println!("Created project '{name}'");
    println!("  {name}/{CONFIG_FILE}");
    for file in written {
        println!("  {name}/{file}");
    }
    println!("  {name}/stock.json");

    Ok(())
}

fn sample_modules() -> Vec<(&'static str, CapabilityModule)> {
    let physical = CapabilityModule::new(ModuleKey::base("abstract.Physical"))
        .with_param("model", "")
        .with_param("V", Value::new(5.0, Dimension::Voltage));

    let combination = CapabilityModule::new(ModuleKey::base(COMBINATION_BLOCK))
        .with_param("increase", true);

    let resistor = CapabilityModule::new(ModuleKey::base("basic.Resistor"))
        .with_ancestor(AncestorRef::new("abstract.Physical"))
        .with_ancestor(AncestorRef::new(COMBINATION_BLOCK))
        .with_mods("series", ["E24"])
        .with_param("value", Value::new(1000.0, Dimension::Resistance));

    let e24 = CapabilityModule::new(ModuleKey::modifier("basic.Resistor", "series", "E24"));

    let capacitor = CapabilityModule::new(ModuleKey::base("basic.Capacitor"))
        .with_ancestor(AncestorRef::new("abstract.Physical"))
        .with_ancestor(AncestorRef::new(COMBINATION_BLOCK))
        .with_param("increase", false)
        .with_param("value", Value::new(100e-9, Dimension::Capacitance));

    vec![
        ("abstract/Physical/module.toml", physical),
        ("abstract/Combination/module.toml", combination),
        ("basic/Resistor/module.toml", resistor),
        ("basic/Resistor/_series/E24.toml", e24),
        ("basic/Capacitor/module.toml", capacitor),
    ]
}

fn sample_stock() -> Vec<StockPart> {
    vec![
        StockPart::new("basic.Resistor", "RC0805")
            .with_id("1")
            .with_mod("series", "E24")
            .with_param("value", ["1 2.2 4.7 / 0 1 2 3 4 5"])
            .with_param("V", ["150"])
            .with_param("P", ["0.125"]),
        StockPart::new("basic.Resistor", "RC1206")
            .with_id("2")
            .with_mod("series", "E24")
            .with_param("value", ["1 2.2 4.7 / 0 1 2 3 4 5"])
            .with_param("V", ["200"])
            .with_param("P", ["0.25"]),
        StockPart::new("basic.Capacitor", "CL21")
            .with_id("3")
            .with_param("value", ["1 2.2 4.7 / -12 -11 -10 -9 -8 -7"])
            .with_param("V", ["50"]),
    ]
}
