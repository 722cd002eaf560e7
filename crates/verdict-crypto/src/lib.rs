//! # verdict-crypto — Hashing and Merkle Primitives
//!
//! This crate provides the commitment machinery consumed by the
//! arbitration core:
//!
//! - **Word hashing** ([`words`]): machine memory is committed at 8-byte
//!   word granularity. [`drive_root`] turns raw drive content into a
//!   single root hash (zero-pad, hash each word, fold).
//!
//! - **Merkle primitives** ([`merkle`]): power-of-two root folds,
//!   [`pristine_root`] values for all-zero subtrees, and [`roll_up`] —
//!   recomputing a machine root after substituting one subtree, given a
//!   sibling path.
//!
//! - **Page tree** ([`tree`]): a sparse Merkle tree over the full 64-bit
//!   machine address space with pristine defaults. This is how a claimer
//!   assembles template hashes and the sibling paths submitted alongside
//!   a claim, without materializing 2^61 words.
//!
//! All hashing is SHA-256.

pub mod error;
pub mod merkle;
pub mod tree;
pub mod words;

// Re-export primary items.
pub use error::CryptoError;
pub use merkle::{
    hash_pair, pristine_root, roll_up, root_from_leaves, sibling_path_len, ADDRESS_SPACE_LOG2,
};
pub use tree::PageTree;
pub use words::{drive_root, hash_word, word_hashes, WORD_LOG2_SIZE, WORD_SIZE};
