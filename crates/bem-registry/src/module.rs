//! Capability modules: the reusable units a block is composed from.

use std::collections::BTreeMap;
use std::fmt;

use bem_core::Attribute;
use serde::{Deserialize, Serialize};

use crate::provenance::Provenance;

/// Identity of a module in the registry: the block name, plus the modifier
/// pair for modifier modules.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ModuleKey {
    pub name: String,
    #[serde(default)]
    pub modifier: Option<(String, String)>,
}

impl ModuleKey {
    /// Key of a block's base module.
    pub fn base(name: impl Into<String>) -> Self {
        ModuleKey {
            name: name.into(),
            modifier: None,
        }
    }

    /// Key of the module a block uses for `key = value`.
    pub fn modifier(
        name: impl Into<String>,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        ModuleKey {
            name: name.into(),
            modifier: Some((key.into(), value.into())),
        }
    }

    /// Borrowed modifier pair, as passed to [`Registry::resolve`](crate::Registry::resolve).
    pub fn modifier_pair(&self) -> Option<(&str, &str)> {
        self.modifier
            .as_ref()
            .map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn is_base(&self) -> bool {
        self.modifier.is_none()
    }
}

impl fmt::Display for ModuleKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.modifier {
            Some((key, value)) => write!(f, "{}[{key}={value}]", self.name),
            None => write!(f, "{}", self.name),
        }
    }
}

/// A required ancestor: another block this module builds on, optionally
/// pinned to fixed modifier values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AncestorRef {
    pub name: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub mods: BTreeMap<String, Vec<String>>,
}

impl AncestorRef {
    pub fn new(name: impl Into<String>) -> Self {
        AncestorRef {
            name: name.into(),
            mods: BTreeMap::new(),
        }
    }
}

/// A mount parameter: an attribute the module introduces, with its default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MountParam {
    pub name: String,
    pub default: Attribute,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A named unit of behavior with ancestors, default modifiers and mount
/// parameters. Registry-owned and immutable once loaded.
#[derive(Debug, Clone, PartialEq)]
pub struct CapabilityModule {
    pub key: ModuleKey,
    pub version: Option<semver::Version>,
    pub description: Option<String>,
    /// Required ancestors, in declaration order.
    pub ancestors: Vec<AncestorRef>,
    /// Default modifier values contributed when a request omits them.
    pub mods: BTreeMap<String, Vec<String>>,
    /// Mount parameters, in declaration order.
    pub params: Vec<MountParam>,
    /// Source files this module is built from.
    pub files: Vec<String>,
    pub provenance: Option<Provenance>,
}

impl CapabilityModule {
    pub fn new(key: ModuleKey) -> Self {
        CapabilityModule {
            key,
            version: None,
            description: None,
            ancestors: Vec::new(),
            mods: BTreeMap::new(),
            params: Vec::new(),
            files: Vec::new(),
            provenance: None,
        }
    }

    pub fn with_ancestor(mut self, ancestor: AncestorRef) -> Self {
        self.ancestors.push(ancestor);
        self
    }

    pub fn with_mods<I, S>(mut self, key: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.mods
            .insert(key.into(), values.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_param(mut self, name: impl Into<String>, default: impl Into<Attribute>) -> Self {
        self.params.push(MountParam {
            name: name.into(),
            default: default.into(),
            description: None,
        });
        self
    }

    pub fn with_file(mut self, file: impl Into<String>) -> Self {
        self.files.push(file.into());
        self
    }

    /// The mount parameter called `name`, if this module declares it.
    pub fn param(&self, name: &str) -> Option<&MountParam> {
        self.params.iter().find(|p| p.name == name)
    }
}
