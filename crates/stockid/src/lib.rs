#![doc = include_str!("../README.md")]

mod allocator;
mod enumeration;
mod error;
mod generator;
mod id;
mod time;
mod validate;
pub mod wire;

pub use crate::allocator::*;
pub use crate::enumeration::*;
pub use crate::error::*;
pub use crate::generator::*;
pub use crate::id::*;
pub use crate::time::*;
pub use crate::validate::*;

/// Re-exports used by [`define_validated_enum!`]. Not part of the public API.
#[doc(hidden)]
pub mod __private {
    pub use serde;
    pub use serde_json;
}
