//! Driftcheck common types and errors.
//!
//! This crate provides the types shared across dc-core modules:
//! - The closed Value Tree variant (scalar / array / sequence / mapping)
//! - Shaped contiguous array buffers
//! - Common error types

pub mod error;
pub mod value;

pub use error::{Error, Result};
pub use value::{ArrayBuf, Value};
