//! Core types for BEM component resolution.
//!
//! Everything the composer, the catalog matcher and the combination
//! synthesizer exchange lives here:
//!
//! - [`Value`]: a physical quantity (magnitude in base units + dimension)
//!   with SI-prefix parsing and engineering display.
//! - [`Attribute`]: a declared attribute value (quantity, text, flag, list).
//! - [`Requirement`] / [`AttributeRequest`]: what a resolution asks of a
//!   stock part, with an explicit comparison rule per attribute.
//! - [`ComponentSpecification`]: the request entering composition.

pub mod attribute;
pub mod error;
pub mod request;
pub mod spec;
pub mod value;

pub use attribute::Attribute;
pub use error::{CoreError, Result};
pub use request::{AttributeRequest, Requirement, DEFAULT_TOLERANCE};
pub use spec::ComponentSpecification;
pub use value::{is_enough, is_tolerated, Dimension, Value};
