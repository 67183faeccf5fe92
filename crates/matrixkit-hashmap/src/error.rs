//! Error types for matrixkit-hashmap

use thiserror::Error;

/// Errors raised while configuring an [`OpenIntMap`](crate::OpenIntMap).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum HashMapError {
    /// Load factors must satisfy `0 <= min < max <= 1`.
    #[error("Invalid load factors: min={min}, max={max} (require 0 <= min < max <= 1)")]
    InvalidLoadFactors { min: f64, max: f64 },
}

/// Result type for hash map configuration.
pub type Result<T> = std::result::Result<T, HashMapError>;
