//! Stock parts and value selection for BEM blocks.
//!
//! A composed block is realized by a concrete part from stock. This crate
//! holds the part model and the two algorithms that pick parts:
//!
//! - [`match_parts`] filters a catalog against an
//!   [`AttributeRequest`](bem_core::AttributeRequest) and ranks what is left
//!   by electrical ratings.
//! - [`synthesize`] builds a series/parallel [`Combination`] of available
//!   values when no single part is close enough to the desired value.
//!
//! Parts come from a [`Catalog`]: [`MemoryCatalog`] for embedded tables,
//! [`LocalCatalog`] for a JSON snapshot on disk.

pub mod catalog;
pub mod error;
pub mod matcher;
pub mod part;
pub mod synth;

// Re-exports for convenience.
pub use catalog::{Catalog, CatalogSnapshot, LocalCatalog, MemoryCatalog};
pub use error::{Result, StockError};
pub use matcher::{is_part_suitable, match_parts, satisfies};
pub use part::StockPart;
pub use synth::{closest, synthesize, Combination, CombinationKind, MAX_DEPTH};
