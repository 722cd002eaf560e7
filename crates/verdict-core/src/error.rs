//! # Core Validation Errors
//!
//! Structured errors for domain-primitive construction. Uses `thiserror`
//! for ergonomic error definitions with diagnostic context.

use thiserror::Error;

/// Errors from validating domain primitives at construction time.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Account address does not match the `0x` + 40 hex chars format.
    #[error("invalid account address: {0:?}")]
    InvalidAddress(String),

    /// Machine hash string is not 64 hex characters (optionally `0x`-prefixed).
    #[error("invalid machine hash: {0:?}")]
    InvalidHash(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_address_display() {
        let err = ValidationError::InvalidAddress("bogus".to_string());
        assert!(format!("{err}").contains("bogus"));
    }

    #[test]
    fn invalid_hash_display() {
        let err = ValidationError::InvalidHash("xyz".to_string());
        assert!(format!("{err}").contains("xyz"));
    }
}
