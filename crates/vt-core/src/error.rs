//! Core error type.
//!
//! Sub-crates define their own error enums and wrap `CoreError` as one
//! variant via `#[from]` where they surface core validation failures.

use thiserror::Error;

/// Validation failures for the primitive types in this crate.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CoreError {
    #[error("invalid time window [{start}, {end}]: start must be finite and end must not precede it")]
    InvalidWindow { start: f64, end: f64 },
}

/// Shorthand result type for `vt-core`.
pub type CoreResult<T> = Result<T, CoreError>;
