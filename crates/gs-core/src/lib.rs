//! gs-core: stable foundation for gearsim.
//!
//! Contains:
//! - numeric (Real + tolerances + float helpers)
//! - error (shared error types)

pub mod error;
pub mod numeric;

// Re-exports: nice ergonomics for downstream crates
pub use error::{GsError, GsResult};
pub use numeric::*;
