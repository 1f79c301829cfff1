//! Part catalogs.
//!
//! The matcher only ever sees a slice of parts; a [`Catalog`] decides where
//! those parts come from.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, StockError};
use crate::part::StockPart;

/// Source of stock parts.
pub trait Catalog {
    /// All parts that realize block `component`.
    fn query(&self, component: &str) -> Result<Vec<StockPart>>;
}

impl<C: Catalog + ?Sized> Catalog for &C {
    fn query(&self, component: &str) -> Result<Vec<StockPart>> {
        (**self).query(component)
    }
}

impl<C: Catalog + ?Sized> Catalog for Box<C> {
    fn query(&self, component: &str) -> Result<Vec<StockPart>> {
        (**self).query(component)
    }
}

/// An embedded part table.
#[derive(Debug, Clone, Default)]
pub struct MemoryCatalog {
    parts: Vec<StockPart>,
}

impl MemoryCatalog {
    pub fn new(parts: Vec<StockPart>) -> Self {
        MemoryCatalog { parts }
    }

    pub fn push(&mut self, part: StockPart) {
        self.parts.push(part);
    }

    pub fn parts(&self) -> &[StockPart] {
        &self.parts
    }
}

impl Catalog for MemoryCatalog {
    fn query(&self, component: &str) -> Result<Vec<StockPart>> {
        Ok(self
            .parts
            .iter()
            .filter(|p| p.block == component)
            .cloned()
            .collect())
    }
}

/// On-disk catalog format: `{ "parts": [...] }`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogSnapshot {
    #[serde(default)]
    pub parts: Vec<StockPart>,
}

impl CatalogSnapshot {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// A catalog loaded from a JSON snapshot.
#[derive(Debug, Clone)]
pub struct LocalCatalog {
    path: PathBuf,
    parts: MemoryCatalog,
}

impl LocalCatalog {
    /// Load the snapshot at `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)?;
        let snapshot: CatalogSnapshot =
            serde_json::from_str(&data).map_err(|e| StockError::InvalidCatalog {
                path: path.to_path_buf(),
                detail: e.to_string(),
            })?;

        for (index, part) in snapshot.parts.iter().enumerate() {
            if part.block.is_empty() {
                return Err(StockError::InvalidCatalog {
                    path: path.to_path_buf(),
                    detail: format!("part #{index} has no block"),
                });
            }
        }

        debug!(path = %path.display(), parts = snapshot.parts.len(), "loaded catalog");
        Ok(LocalCatalog {
            path: path.to_path_buf(),
            parts: MemoryCatalog::new(snapshot.parts),
        })
    }

    /// Write `parts` as a snapshot at `path`.
    pub fn write(path: &Path, parts: Vec<StockPart>) -> Result<()> {
        let snapshot = CatalogSnapshot { parts };
        std::fs::write(path, snapshot.to_json()?)?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn parts(&self) -> &[StockPart] {
        self.parts.parts()
    }
}

impl Catalog for LocalCatalog {
    fn query(&self, component: &str) -> Result<Vec<StockPart>> {
        self.parts.query(component)
    }
}
