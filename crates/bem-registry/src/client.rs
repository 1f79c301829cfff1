//! Registry trait and its in-memory and filesystem implementations.
//!
//! A [`Registry`] answers one question: which capability module does a block
//! name (plus, optionally, a modifier pair) refer to? Lookups are pure, so a
//! composition never changes the registry it reads from.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::debug;

use crate::error::{RegistryError, Result};
use crate::module::{CapabilityModule, ModuleKey};
use crate::module_manifest::{is_block_name, ModifierDecl, ModuleManifest};
use crate::provenance::Provenance;

/// Every block in a library with the values available for each modifier key.
pub type Scope = BTreeMap<String, BTreeMap<String, Vec<String>>>;

/// Module lookup.
///
/// `Ok(None)` means "no such module": the composer treats a missing modifier
/// module as a property and a missing base module as an error. `Err` is
/// reserved for backends that cannot answer (I/O, malformed manifests,
/// ambiguous entries).
pub trait Registry {
    fn resolve(
        &self,
        name: &str,
        modifier: Option<(&str, &str)>,
    ) -> Result<Option<Arc<CapabilityModule>>>;
}

impl<R: Registry + ?Sized> Registry for &R {
    fn resolve(
        &self,
        name: &str,
        modifier: Option<(&str, &str)>,
    ) -> Result<Option<Arc<CapabilityModule>>> {
        (**self).resolve(name, modifier)
    }
}

impl<R: Registry + ?Sized> Registry for Box<R> {
    fn resolve(
        &self,
        name: &str,
        modifier: Option<(&str, &str)>,
    ) -> Result<Option<Arc<CapabilityModule>>> {
        (**self).resolve(name, modifier)
    }
}

/// An embedded module table.
#[derive(Debug, Default, Clone)]
pub struct MemoryRegistry {
    modules: HashMap<ModuleKey, Arc<CapabilityModule>>,
}

impl MemoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a module.
    ///
    /// A second module for the same `(name, key, value)` would make the
    /// modifier ambiguous and is rejected; so is a second base module.
    pub fn insert(&mut self, module: CapabilityModule) -> Result<()> {
        if !is_block_name(&module.key.name) {
            return Err(RegistryError::InvalidName {
                name: module.key.name.clone(),
            });
        }
        if self.modules.contains_key(&module.key) {
            return Err(match &module.key.modifier {
                Some((key, value)) => RegistryError::AmbiguousModifier {
                    name: module.key.name.clone(),
                    key: key.clone(),
                    value: value.clone(),
                },
                None => RegistryError::AlreadyRegistered {
                    key: module.key.to_string(),
                },
            });
        }
        self.modules.insert(module.key.clone(), Arc::new(module));
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// Blocks and their modifier values.
    pub fn scope(&self) -> Scope {
        let mut scope = Scope::new();
        for key in self.modules.keys() {
            let block = scope.entry(key.name.clone()).or_default();
            if let Some((k, v)) = &key.modifier {
                block.entry(k.clone()).or_default().push(v.clone());
            }
        }
        for block in scope.values_mut() {
            for values in block.values_mut() {
                values.sort();
            }
        }
        scope
    }
}

impl Registry for MemoryRegistry {
    fn resolve(
        &self,
        name: &str,
        modifier: Option<(&str, &str)>,
    ) -> Result<Option<Arc<CapabilityModule>>> {
        let key = match modifier {
            Some((k, v)) => ModuleKey::modifier(name, k, v),
            None => ModuleKey::base(name),
        };
        Ok(self.modules.get(&key).cloned())
    }
}

/// A block library on the local filesystem.
///
/// Layout:
/// ```text
/// <root>/
///   basic/
///     Resistor/
///       module.toml          base module of basic.Resistor
///       _series/
///         E24.toml           modifier module series=E24
///         E96/module.toml    modifier module series=E96
/// ```
#[derive(Debug, Clone)]
pub struct LocalRegistry {
    root: PathBuf,
}

const MANIFEST_FILE: &str = "module.toml";

impl LocalRegistry {
    /// Create a local registry rooted at the given directory.
    pub fn new(root: PathBuf) -> Self {
        LocalRegistry { root }
    }

    /// Get the root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn block_dir(&self, name: &str) -> Result<PathBuf> {
        if !is_block_name(name) {
            return Err(RegistryError::InvalidName {
                name: name.to_string(),
            });
        }
        Ok(name.split('.').fold(self.root.clone(), |dir, part| dir.join(part)))
    }

    fn load(&self, path: &Path, expected: &ModuleKey) -> Result<Arc<CapabilityModule>> {
        let data = std::fs::read(path)?;
        let text = std::str::from_utf8(&data).map_err(|e| RegistryError::InvalidManifest {
            detail: format!("{}: invalid UTF-8: {e}", path.display()),
        })?;
        let mut manifest = ModuleManifest::parse(text)?;

        if manifest.module.name != expected.name {
            return Err(RegistryError::InvalidManifest {
                detail: format!(
                    "{} declares '{}' but lives at '{}'",
                    path.display(),
                    manifest.module.name,
                    expected.name
                ),
            });
        }

        // A modifier module may leave its pair implicit in the path.
        if manifest.module.modifier.is_none() {
            if let Some((key, value)) = &expected.modifier {
                manifest.module.modifier = Some(ModifierDecl {
                    key: key.clone(),
                    value: value.clone(),
                });
            }
        }
        if manifest.key() != *expected {
            return Err(RegistryError::InvalidManifest {
                detail: format!(
                    "{} declares module '{}', expected '{expected}'",
                    path.display(),
                    manifest.key()
                ),
            });
        }

        let relative = path.strip_prefix(&self.root).unwrap_or(path).display().to_string();
        if manifest.module.files.is_empty() {
            manifest.module.files.push(relative.clone());
        }

        let provenance = Provenance::new(relative, &data);
        debug!(module = %expected, source = %path.display(), "loaded module");
        Ok(Arc::new(manifest.into_module(Some(provenance))?))
    }

    /// Walk the library and list every block with its modifier values.
    ///
    /// Modifier values ending in `_test` are fixtures and are left out.
    pub fn scope(&self) -> Result<Scope> {
        let mut scope = Scope::new();
        if self.root.is_dir() {
            self.scan(&self.root, &mut Vec::new(), &mut scope)?;
        }
        Ok(scope)
    }

    fn scan(&self, dir: &Path, prefix: &mut Vec<String>, scope: &mut Scope) -> Result<()> {
        let mut modifiers: BTreeMap<String, Vec<String>> = BTreeMap::new();

        for entry in sorted_entries(dir)? {
            let file_name = entry.file_name().to_string_lossy().to_string();
            let path = entry.path();
            if !path.is_dir() {
                continue;
            }
            if let Some(key) = file_name.strip_prefix('_') {
                if !prefix.is_empty() {
                    let values = modifier_values(&path)?;
                    if !values.is_empty() {
                        modifiers.insert(key.to_string(), values);
                    }
                }
                continue;
            }
            prefix.push(file_name);
            self.scan(&path, prefix, scope)?;
            prefix.pop();
        }

        if !prefix.is_empty() && dir.join(MANIFEST_FILE).is_file() {
            scope.insert(prefix.join("."), modifiers);
        }
        Ok(())
    }
}

fn sorted_entries(dir: &Path) -> Result<Vec<std::fs::DirEntry>> {
    let mut entries = std::fs::read_dir(dir)?.collect::<std::io::Result<Vec<_>>>()?;
    entries.sort_by_key(|e| e.file_name());
    Ok(entries)
}

fn modifier_values(dir: &Path) -> Result<Vec<String>> {
    let mut values = Vec::new();
    for entry in sorted_entries(dir)? {
        let path = entry.path();
        let value = if path.is_file() && path.extension().is_some_and(|ext| ext == "toml") {
            path.file_stem().map(|s| s.to_string_lossy().to_string())
        } else if path.join(MANIFEST_FILE).is_file() {
            Some(entry.file_name().to_string_lossy().to_string())
        } else {
            None
        };
        if let Some(value) = value.filter(|v| !v.ends_with("_test")) {
            if !values.contains(&value) {
                values.push(value);
            }
        }
    }
    Ok(values)
}

fn is_path_segment(s: &str) -> bool {
    !s.is_empty() && s != "." && s != ".." && !s.contains(['/', '\\'])
}

impl Registry for LocalRegistry {
    fn resolve(
        &self,
        name: &str,
        modifier: Option<(&str, &str)>,
    ) -> Result<Option<Arc<CapabilityModule>>> {
        let dir = self.block_dir(name)?;

        let Some((key, value)) = modifier else {
            let path = dir.join(MANIFEST_FILE);
            if !path.is_file() {
                return Ok(None);
            }
            return self.load(&path, &ModuleKey::base(name)).map(Some);
        };

        // A pair that cannot name a file (`power=1/4W`) has no module.
        if !is_path_segment(key) || !is_path_segment(value) {
            debug!(block = name, key, value, "modifier is not a path segment");
            return Ok(None);
        }

        let modifier_dir = dir.join(format!("_{key}"));
        let flat = modifier_dir.join(format!("{value}.toml"));
        let nested = modifier_dir.join(value).join(MANIFEST_FILE);
        let expected = ModuleKey::modifier(name, key, value);

        match (flat.is_file(), nested.is_file()) {
            (true, true) => Err(RegistryError::AmbiguousModifier {
                name: name.to_string(),
                key: key.to_string(),
                value: value.to_string(),
            }),
            (true, false) => self.load(&flat, &expected).map(Some),
            (false, true) => self.load(&nested, &expected).map(Some),
            (false, false) => Ok(None),
        }
    }
}
