//! # Cryptographic Error Types
//!
//! Structured errors for commitment and Merkle operations in
//! `verdict-crypto`. Uses `thiserror` for ergonomic error definitions
//! with diagnostic context.

use thiserror::Error;

/// Errors from hashing and Merkle operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CryptoError {
    /// A size exponent is outside the supported range of the machine
    /// address space (word level through full address space).
    #[error("size exponent {log2_size} out of range [{min}, {max}]")]
    SizeOutOfRange {
        /// The rejected exponent.
        log2_size: u32,
        /// Smallest supported exponent.
        min: u32,
        /// Largest supported exponent.
        max: u32,
    },

    /// Content does not fit in the declared drive size.
    #[error("content of {len} bytes exceeds drive capacity of {capacity} bytes")]
    ContentTooLarge {
        /// Actual content length.
        len: usize,
        /// Capacity implied by the size exponent.
        capacity: usize,
    },

    /// A root fold was asked for a leaf count that is not a power of two.
    #[error("leaf count {0} is not a non-zero power of two")]
    LeafCountNotPowerOfTwo(usize),

    /// A sibling path does not have the length the target level dictates.
    #[error("sibling path has {actual} hashes, expected {expected}")]
    SiblingCountMismatch {
        /// Hashes required to reach the address-space root.
        expected: usize,
        /// Hashes supplied.
        actual: usize,
    },

    /// A position is not aligned to the subtree size it addresses.
    #[error("position {position:#x} is not aligned to a 2^{log2_size}-byte boundary")]
    Misaligned {
        /// The offending address.
        position: u64,
        /// The subtree size exponent.
        log2_size: u32,
    },
}
