//! Capability module registry and composer for BEM blocks.
//!
//! A block such as `basic.Resistor` is described by a base capability module
//! plus optional *modifier modules* selected by `(key, value)` pairs
//! (`series = E24`). The [`Composer`] turns a
//! [`ComponentSpecification`](bem_core::ComponentSpecification) into a
//! [`ComposedSpecification`]: the ordered, duplicate-free module sequence
//! (most specific first) with merged modifiers and argument defaults.
//!
//! # Architecture
//!
//! - [`Registry`]: pure lookup `resolve(name, modifier?) -> module`.
//!   Backends: [`MemoryRegistry`] (embedded table) and [`LocalRegistry`]
//!   (directory tree of TOML manifests).
//! - [`CachedRegistry`]: session-scoped memoization over any backend.
//! - [`compose`]: the composition algorithm.
//! - [`Provenance`]: manifest path and digest of every module read from disk.
//! - [`format_tree`]: human-readable composition display.

pub mod cache;
pub mod client;
pub mod compose;
pub mod error;
pub mod module;
pub mod module_manifest;
pub mod provenance;
pub mod tree;

// Re-exports for convenience.
pub use cache::CachedRegistry;
pub use client::{LocalRegistry, MemoryRegistry, Registry, Scope};
pub use compose::{compose, ComposedSpecification, Composer};
pub use error::{RegistryError, Result};
pub use module::{AncestorRef, CapabilityModule, ModuleKey, MountParam};
pub use module_manifest::ModuleManifest;
pub use provenance::{ManifestDigest, Provenance};
pub use tree::{format_scope, format_tree};
