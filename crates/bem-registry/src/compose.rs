//! Composition of capability modules into one specification.
//!
//! Given `basic.Resistor` with `series = E24`, the composer collects the
//! modifier modules the request selects, the base module, and every ancestor
//! chain they declare, then merges their defaults. The result is ordered most
//! specific first, and an attribute resolves to the first module in that
//! order that declares it.

use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};
use std::sync::Arc;

use bem_core::{Attribute, ComponentSpecification};
use serde::{Serialize, Serializer};
use tracing::debug;

use crate::client::Registry;
use crate::error::{RegistryError, Result};
use crate::module::{CapabilityModule, ModuleKey};
use crate::provenance::Provenance;

/// Maximum ancestor nesting before composition gives up.
const MAX_DEPTH: usize = 100;

/// The outcome of composition.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComposedSpecification {
    /// Requested block name.
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    /// Composed modules, most specific first, without duplicates.
    #[serde(serialize_with = "serialize_module_keys")]
    pub modules: Vec<Arc<CapabilityModule>>,
    /// Modifier values that selected a module.
    pub mods: BTreeMap<String, Vec<String>>,
    /// Modifier values no module exists for.
    pub properties: BTreeMap<String, Vec<String>>,
    /// Mount defaults after precedence merging.
    pub defaults: BTreeMap<String, Attribute>,
    /// Parameter names, least specific module first.
    pub parameters: Vec<String>,
    /// Arguments set by the request.
    pub overrides: BTreeMap<String, Attribute>,
    /// Source files of the composed modules.
    pub files: Vec<String>,
    /// Manifests the composed modules were read from, in module order.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub sources: Vec<ModuleSource>,
}

/// A composed module together with the manifest it was loaded from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModuleSource {
    pub module: String,
    #[serde(flatten)]
    pub provenance: Provenance,
}

fn serialize_module_keys<S: Serializer>(
    modules: &[Arc<CapabilityModule>],
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.collect_seq(modules.iter().map(|m| m.key.to_string()))
}

impl ComposedSpecification {
    pub fn module_keys(&self) -> Vec<&ModuleKey> {
        self.modules.iter().map(|m| &m.key).collect()
    }

    /// Whether any composed module belongs to block `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.modules.iter().any(|m| m.key.name == name)
    }

    /// Resolve one attribute: a request override, otherwise the default of
    /// the most specific module declaring it.
    pub fn lookup(&self, attribute: &str) -> Option<&Attribute> {
        self.overrides.get(attribute).or_else(|| {
            self.modules
                .iter()
                .find_map(|m| m.param(attribute).map(|p| &p.default))
        })
    }

    /// The resolved argument set: merged defaults overlaid by overrides.
    pub fn arguments(&self) -> BTreeMap<String, Attribute> {
        let mut arguments = self.defaults.clone();
        for (name, value) in &self.overrides {
            arguments.insert(name.clone(), value.clone());
        }
        arguments
    }

    /// Modifier values and properties together, as the stock matcher sees
    /// them.
    pub fn selections(&self) -> BTreeMap<String, Vec<String>> {
        let mut all = self.mods.clone();
        for (key, values) in &self.properties {
            let entry = all.entry(key.clone()).or_default();
            for value in values {
                if !entry.contains(value) {
                    entry.push(value.clone());
                }
            }
        }
        all
    }
}

/// One block expanded with its ancestors, before deduplication.
#[derive(Clone)]
struct Expansion {
    modules: Vec<Arc<CapabilityModule>>,
    mods: BTreeMap<String, Vec<String>>,
    properties: BTreeMap<String, Vec<String>>,
}

/// Expansions already computed during one composition, keyed by block name
/// and the modifiers it was asked for. Shared ancestors expand once.
type Expanded = HashMap<(String, BTreeMap<String, Vec<String>>), Expansion>;

/// Composes component specifications against a registry.
#[derive(Debug, Clone)]
pub struct Composer<R> {
    registry: R,
}

impl<R: Registry> Composer<R> {
    pub fn new(registry: R) -> Self {
        Composer { registry }
    }

    pub fn registry(&self) -> &R {
        &self.registry
    }

    /// Compose `spec` into an ordered module list with merged defaults.
    pub fn compose(&self, spec: &ComponentSpecification) -> Result<ComposedSpecification> {
        let mut stack = Vec::new();
        let mut expanded = Expanded::new();
        let expansion = self.expand(&spec.name, &spec.modifiers, &mut stack, &mut expanded)?;

        let mut seen = HashSet::new();
        let modules: Vec<Arc<CapabilityModule>> = expansion
            .modules
            .into_iter()
            .filter(|m| seen.insert(m.key.clone()))
            .collect();

        let mut defaults = BTreeMap::new();
        let mut parameters: Vec<String> = Vec::new();
        for module in modules.iter().rev() {
            for param in &module.params {
                if !parameters.contains(&param.name) {
                    parameters.push(param.name.clone());
                }
                defaults.insert(param.name.clone(), param.default.clone());
            }
        }

        let mut files: Vec<String> = Vec::new();
        for file in modules.iter().flat_map(|m| &m.files) {
            if !files.contains(file) {
                files.push(file.clone());
            }
        }

        let sources: Vec<ModuleSource> = modules
            .iter()
            .filter_map(|m| {
                m.provenance.as_ref().map(|provenance| ModuleSource {
                    module: m.key.to_string(),
                    provenance: provenance.clone(),
                })
            })
            .collect();

        debug!(
            block = %spec.name,
            modules = modules.len(),
            expansions = expanded.len(),
            properties = expansion.properties.len(),
            "composed"
        );

        Ok(ComposedSpecification {
            name: spec.name.clone(),
            reference: spec.reference.clone(),
            modules,
            mods: expansion.mods,
            properties: expansion.properties,
            defaults,
            parameters,
            overrides: spec.overrides.clone(),
            files,
            sources,
        })
    }

    fn expand(
        &self,
        name: &str,
        requested: &BTreeMap<String, Vec<String>>,
        stack: &mut Vec<String>,
        expanded: &mut Expanded,
    ) -> Result<Expansion> {
        if stack.iter().any(|n| n == name) {
            return Err(RegistryError::ResolutionConflict {
                detail: format!("ancestor cycle: {} -> {name}", stack.join(" -> ")),
            });
        }
        if stack.len() >= MAX_DEPTH {
            return Err(RegistryError::ResolutionConflict {
                detail: format!("ancestor depth exceeds {MAX_DEPTH} at '{name}'"),
            });
        }
        let memo_key = (name.to_string(), requested.clone());
        if let Some(expansion) = expanded.get(&memo_key) {
            return Ok(expansion.clone());
        }

        let base = self
            .registry
            .resolve(name, None)?
            .ok_or_else(|| RegistryError::ModuleNotFound {
                name: name.to_string(),
            })?;

        // Requested values win; base defaults fill missing or empty keys.
        let mut selected: BTreeMap<String, Vec<String>> = requested
            .iter()
            .filter(|(_, values)| !values.is_empty())
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        for (key, values) in &base.mods {
            if !values.is_empty() && !selected.contains_key(key) {
                selected.insert(key.clone(), values.clone());
            }
        }

        let mut discovered = Vec::new();
        let mut mods: BTreeMap<String, Vec<String>> = BTreeMap::new();
        let mut properties: BTreeMap<String, Vec<String>> = BTreeMap::new();
        let mut pending: VecDeque<String> = selected.keys().cloned().collect();

        while let Some(key) = pending.pop_front() {
            let values = selected.get(&key).cloned().unwrap_or_default();
            let mut seen_values = HashSet::new();
            for value in values {
                if !seen_values.insert(value.clone()) {
                    continue;
                }
                match self.registry.resolve(name, Some((&key, &value)))? {
                    Some(module) => {
                        for (k, v) in &module.mods {
                            if !v.is_empty() && !selected.contains_key(k) {
                                selected.insert(k.clone(), v.clone());
                                pending.push_back(k.clone());
                            }
                        }
                        mods.entry(key.clone()).or_default().push(value);
                        discovered.push(module);
                    }
                    None => {
                        debug!(block = name, key = %key, value = %value, "no modifier module, kept as property");
                        properties.entry(key.clone()).or_default().push(value);
                    }
                }
            }
        }

        let mut local: Vec<Arc<CapabilityModule>> = discovered.into_iter().rev().collect();
        local.push(base);

        stack.push(name.to_string());
        let mut modules = local.clone();
        for module in &local {
            for ancestor in &module.ancestors {
                let mut inherited = mods.clone();
                for (k, v) in &ancestor.mods {
                    inherited.insert(k.clone(), v.clone());
                }
                let ancestry = self.expand(&ancestor.name, &inherited, stack, expanded)?;
                modules.extend(ancestry.modules);
            }
        }
        stack.pop();

        let expansion = Expansion {
            modules,
            mods,
            properties,
        };
        expanded.insert(memo_key, expansion.clone());
        Ok(expansion)
    }
}

/// Compose `spec` against `registry`.
pub fn compose<R: Registry + ?Sized>(
    registry: &R,
    spec: &ComponentSpecification,
) -> Result<ComposedSpecification> {
    Composer::new(registry).compose(spec)
}
