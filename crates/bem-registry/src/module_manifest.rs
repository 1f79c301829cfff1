//! Capability module manifest parsing.
//!
//! A module on disk is a TOML manifest:
//!
//! ```toml
//! [module]
//! name = "basic.Resistor"
//! version = "0.1.0"
//! description = "Fixed resistor"
//! files = ["resistor.py"]
//!
//! # only for modifier modules
//! [module.modifier]
//! key = "series"
//! value = "E24"
//!
//! [mods]
//! series = ["E24"]
//!
//! [[inherits]]
//! name = "abstract.Physical"
//!
//! [[param]]
//! name = "value"
//! default = "1k"
//! ```

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::error::{RegistryError, Result};
use crate::provenance::Provenance;
use crate::module::{AncestorRef, CapabilityModule, ModuleKey, MountParam};

/// A complete capability module manifest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModuleManifest {
    /// Module metadata (required).
    pub module: ModuleMetadata,
    /// Default modifier values.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub mods: BTreeMap<String, Vec<String>>,
    /// Required ancestors.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub inherits: Vec<AncestorRef>,
    /// Mount parameters.
    #[serde(default, rename = "param", skip_serializing_if = "Vec::is_empty")]
    pub params: Vec<MountParam>,
}

/// Core module metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModuleMetadata {
    /// Dotted block name.
    pub name: String,
    /// Semantic version.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Source files the module is built from.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub files: Vec<String>,
    /// Present on modifier modules.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modifier: Option<ModifierDecl>,
}

/// The `(key, value)` pair a modifier module is selected by.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModifierDecl {
    pub key: String,
    pub value: String,
}

impl ModuleManifest {
    /// Parse a module manifest from a TOML string.
    pub fn parse(input: &str) -> Result<Self> {
        let manifest: ModuleManifest = toml::from_str(input)?;
        manifest.validate()?;
        Ok(manifest)
    }

    /// Build a manifest describing an existing module.
    pub fn from_module(module: &CapabilityModule) -> Self {
        ModuleManifest {
            module: ModuleMetadata {
                name: module.key.name.clone(),
                version: module.version.as_ref().map(ToString::to_string),
                description: module.description.clone(),
                files: module.files.clone(),
                modifier: module.key.modifier.as_ref().map(|(key, value)| ModifierDecl {
                    key: key.clone(),
                    value: value.clone(),
                }),
            },
            mods: module.mods.clone(),
            inherits: module.ancestors.clone(),
            params: module.params.clone(),
        }
    }

    /// The registry key this manifest declares.
    pub fn key(&self) -> ModuleKey {
        match &self.module.modifier {
            Some(m) => ModuleKey::modifier(&self.module.name, &m.key, &m.value),
            None => ModuleKey::base(&self.module.name),
        }
    }

    /// Get the parsed semantic version, if one is declared.
    pub fn version(&self) -> Result<Option<semver::Version>> {
        match &self.module.version {
            Some(v) => Ok(Some(semver::Version::parse(v)?)),
            None => Ok(None),
        }
    }

    /// Turn the manifest into a registry module.
    pub fn into_module(self, provenance: Option<Provenance>) -> Result<CapabilityModule> {
        let version = self.version()?;
        let key = self.key();
        Ok(CapabilityModule {
            key,
            version,
            description: self.module.description,
            ancestors: self.inherits,
            mods: self.mods,
            params: self.params,
            files: self.module.files,
            provenance,
        })
    }

    /// Serialize this manifest to a TOML string.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| RegistryError::InvalidManifest {
            detail: format!("failed to serialize: {e}"),
        })
    }

    fn validate(&self) -> Result<()> {
        let invalid = |detail: String| Err(RegistryError::InvalidManifest { detail });

        if self.module.name.is_empty() {
            return invalid("module.name is required".to_string());
        }
        if !is_block_name(&self.module.name) {
            return invalid(format!("'{}' is not a dotted block name", self.module.name));
        }

        // Validate version is valid semver
        self.version()?;

        if let Some(m) = &self.module.modifier {
            if m.key.is_empty() || m.value.is_empty() {
                return invalid("module.modifier needs both key and value".to_string());
            }
        }

        for ancestor in &self.inherits {
            if !is_block_name(&ancestor.name) {
                return invalid(format!("invalid ancestor name '{}'", ancestor.name));
            }
        }

        let mut seen = HashSet::new();
        for param in &self.params {
            if param.name.is_empty() {
                return invalid("param.name is required".to_string());
            }
            if !seen.insert(param.name.as_str()) {
                return invalid(format!("duplicate param '{}'", param.name));
            }
        }

        Ok(())
    }
}

/// Whether `name` is a dotted block name (`basic.Resistor`).
pub(crate) fn is_block_name(name: &str) -> bool {
    !name.is_empty()
        && name.split('.').all(|segment| {
            !segment.is_empty()
                && !segment.starts_with('_')
                && segment
                    .chars()
                    .all(|c| c.is_alphanumeric() || c == '_' || c == '-')
        })
}
