//! Part selection for composed BEM blocks.
//!
//! The [`Resolver`] drives a whole resolution: it composes the requested
//! block, turns the composition into an
//! [`AttributeRequest`](bem_core::AttributeRequest), matches it against the
//! catalog and settles the value, synthesizing a series/parallel combination
//! when the block allows it and no single part is close enough.

pub mod error;
pub mod request;
pub mod select;

// Re-exports for convenience.
pub use error::{ResolveError, Result};
pub use request::{build_request, ResolveOptions, Sense, COMBINATION_BLOCK};
pub use select::{Resolution, Resolver};
