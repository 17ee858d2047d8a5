//! lf-core: stable foundation for logicflow.
//!
//! Contains:
//! - ids (stable compact handles for circuit objects)
//! - arena (slot storage addressed by those handles)
//! - clamped (bounded integers used for port counts)
//! - error (shared error types)

pub mod arena;
pub mod clamped;
pub mod error;
pub mod ids;

// Re-exports: nice ergonomics for downstream crates
pub use arena::Arena;
pub use clamped::ClampedValue;
pub use error::{LfError, LfResult};
pub use ids::*;
