//! Composition display.
//!
//! Formats a composed specification as a human-readable ASCII tree:
//! ```text
//! basic.Resistor
//! ├── modules
//! │   ├── basic.Resistor[series=E24]
//! │   ├── basic.Resistor
//! │   └── abstract.Physical
//! ├── mods
//! │   └── series = E24
//! ├── arguments
//! │   ├── P = 125 m
//! │   └── value = 4.7 k (override)
//! └── sources
//!     ├── basic.Resistor[series=E24]  basic/Resistor/_series/E24.toml @5d1c0e9a3f27
//!     ├── basic.Resistor  basic/Resistor/module.toml @0b8e6f41c2d9
//!     └── abstract.Physical  abstract/Physical/module.toml @c4a09d7be215
//!
//! 3 modules, 1 modifiers, 0 properties
//! ```

use crate::client::Scope;
use crate::compose::ComposedSpecification;

/// Format a composition as a human-readable string.
pub fn format_tree(composed: &ComposedSpecification) -> String {
    let mut out = composed.name.clone();
    if let Some(reference) = &composed.reference {
        out.push_str(&format!(" #{reference}"));
    }
    out.push('\n');

    let modules: Vec<String> = composed
        .modules
        .iter()
        .map(|m| match &m.version {
            Some(v) => format!("{} v{v}", m.key),
            None => m.key.to_string(),
        })
        .collect();

    let arguments: Vec<String> = composed
        .arguments()
        .iter()
        .map(|(name, value)| {
            if composed.overrides.contains_key(name) {
                format!("{name} = {value} (override)")
            } else {
                format!("{name} = {value}")
            }
        })
        .collect();

    let sources: Vec<String> = composed
        .sources
        .iter()
        .map(|s| format!("{}  {} @{}", s.module, s.provenance.path, s.provenance.sha256.short()))
        .collect();

    let sections = [
        ("modules", modules),
        ("mods", assignments(&composed.mods)),
        ("properties", assignments(&composed.properties)),
        ("arguments", arguments),
        ("sources", sources),
    ];
    let sections: Vec<_> = sections
        .into_iter()
        .filter(|(_, children)| !children.is_empty())
        .collect();

    let count = sections.len();
    for (i, (label, children)) in sections.iter().enumerate() {
        format_branch(&mut out, label, children, "", i == count - 1);
    }

    // Summary line
    out.push_str(&format!(
        "\n{} modules, {} modifiers, {} properties\n",
        composed.modules.len(),
        composed.mods.len(),
        composed.properties.len()
    ));

    out
}

/// Format a block library listing.
pub fn format_scope(scope: &Scope) -> String {
    let mut out = String::new();
    for (block, modifiers) in scope {
        out.push_str(block);
        out.push('\n');
        let count = modifiers.len();
        for (i, (key, values)) in modifiers.iter().enumerate() {
            format_branch(&mut out, key, values, "", i == count - 1);
        }
    }
    out.push_str(&format!("\n{} blocks\n", scope.len()));
    out
}

fn assignments(map: &std::collections::BTreeMap<String, Vec<String>>) -> Vec<String> {
    map.iter()
        .map(|(key, values)| format!("{key} = {}", values.join(", ")))
        .collect()
}

/// Format one labelled branch with leaf children.
fn format_branch(out: &mut String, label: &str, children: &[String], prefix: &str, is_last: bool) {
    let connector = if is_last { "└── " } else { "├── " };
    out.push_str(&format!("{prefix}{connector}{label}\n"));

    let child_prefix = if is_last {
        format!("{prefix}    ")
    } else {
        format!("{prefix}│   ")
    };

    let child_count = children.len();
    for (i, child) in children.iter().enumerate() {
        let child_connector = if i == child_count - 1 { "└── " } else { "├── " };
        out.push_str(&format!("{child_prefix}{child_connector}{child}\n"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::MemoryRegistry;
    use crate::compose::compose;
    use crate::module::{AncestorRef, CapabilityModule, ModuleKey};
    use crate::provenance::Provenance;
    use bem_core::{ComponentSpecification, Value};

    fn registry() -> MemoryRegistry {
        let mut registry = MemoryRegistry::new();
        registry
            .insert(
                CapabilityModule::new(ModuleKey::base("basic.Resistor"))
                    .with_ancestor(AncestorRef::new("abstract.Physical"))
                    .with_param("value", Value::scalar(1000.0)),
            )
            .unwrap();
        registry
            .insert(
                CapabilityModule::new(ModuleKey::base("abstract.Physical"))
                    .with_param("P", Value::scalar(0.125)),
            )
            .unwrap();
        registry
            .insert(CapabilityModule::new(ModuleKey::modifier(
                "basic.Resistor",
                "series",
                "E24",
            )))
            .unwrap();
        registry
    }

    #[test]
    fn tree_shows_sections() {
        let spec = ComponentSpecification::new("basic.Resistor")
            .with_modifier("series", ["E24"])
            .with_modifier("color", ["red"])
            .with_override("value", Value::scalar(4700.0));
        let composed = compose(&registry(), &spec).unwrap();
        let output = format_tree(&composed);

        let expected = "\
basic.Resistor
├── modules
│   ├── basic.Resistor[series=E24]
│   ├── basic.Resistor
│   └── abstract.Physical
├── mods
│   └── series = E24
├── properties
│   └── color = red
└── arguments
    ├── P = 125 m
    └── value = 4.7 k (override)

3 modules, 1 modifiers, 1 properties
";
        assert_eq!(output, expected);
    }

    #[test]
    fn empty_sections_are_omitted() {
        let composed = compose(&registry(), &ComponentSpecification::new("abstract.Physical")).unwrap();
        let output = format_tree(&composed);
        assert!(!output.contains("mods"));
        assert!(output.contains("└── arguments"));
        assert!(output.ends_with("1 modules, 0 modifiers, 0 properties\n"));
    }

    #[test]
    fn sources_follow_arguments() {
        let mut registry = MemoryRegistry::new();
        let mut module = CapabilityModule::new(ModuleKey::base("basic.Fuse"))
            .with_param("I", Value::scalar(0.5));
        module.provenance = Some(Provenance::new("basic/Fuse/module.toml", b""));
        registry.insert(module).unwrap();

        let composed = compose(&registry, &ComponentSpecification::new("basic.Fuse")).unwrap();
        let output = format_tree(&composed);
        assert!(output.contains(
            "├── arguments\n│   └── I = 500 m\n└── sources\n    └── basic.Fuse  basic/Fuse/module.toml @e3b0c44298fc\n"
        ));
    }

    #[test]
    fn scope_listing() {
        let output = format_scope(&registry().scope());
        assert!(output.contains("basic.Resistor\n└── series\n    └── E24\n"));
        assert!(output.starts_with("abstract.Physical\nbasic.Resistor\n"));
        assert!(output.ends_with("\n2 blocks\n"));
    }
}
