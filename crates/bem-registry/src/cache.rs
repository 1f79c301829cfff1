//! Session-scoped lookup cache.
//!
//! Composition asks the registry for the same `(name, modifier)` pairs over
//! and over (every ancestor chain passes through `abstract.*` blocks).
//! [`CachedRegistry`] remembers answers, including misses, for as long as the
//! cache value lives. Errors are not cached.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::client::Registry;
use crate::error::Result;
use crate::module::{CapabilityModule, ModuleKey};

type Entry = Option<Arc<CapabilityModule>>;

/// Memoizing wrapper over any [`Registry`].
#[derive(Debug)]
pub struct CachedRegistry<R> {
    inner: R,
    entries: RwLock<HashMap<ModuleKey, Entry>>,
}

impl<R: Registry> CachedRegistry<R> {
    pub fn new(inner: R) -> Self {
        CachedRegistry {
            inner,
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// The wrapped backend.
    pub fn inner(&self) -> &R {
        &self.inner
    }

    /// Number of remembered lookups (hits and misses).
    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Forget every remembered lookup.
    pub fn clear(&self) {
        if let Ok(mut entries) = self.entries.write() {
            entries.clear();
        }
    }
}

impl<R: Registry> Registry for CachedRegistry<R> {
    fn resolve(&self, name: &str, modifier: Option<(&str, &str)>) -> Result<Entry> {
        let key = match modifier {
            Some((k, v)) => ModuleKey::modifier(name, k, v),
            None => ModuleKey::base(name),
        };

        if let Ok(entries) = self.entries.read() {
            if let Some(hit) = entries.get(&key) {
                return Ok(hit.clone());
            }
        }

        let found = self.inner.resolve(name, modifier)?;
        if let Ok(mut entries) = self.entries.write() {
            entries.entry(key).or_insert_with(|| found.clone());
        }
        Ok(found)
    }
}
