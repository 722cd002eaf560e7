//! # Word-Level Drive Commitments
//!
//! Machine memory is committed at 8-byte word granularity: drive content
//! is zero-padded to its declared power-of-two size, each word is hashed
//! independently, and the word hashes are folded into a single root.
//! Two drives with the same bytes and size always commit to the same
//! root, regardless of how the bytes were supplied.

use sha2::{Digest, Sha256};
use verdict_core::MachineHash;

use crate::error::CryptoError;
use crate::merkle::{root_from_leaves, ADDRESS_SPACE_LOG2};

/// Size of a machine word in bytes.
pub const WORD_SIZE: usize = 8;

/// Size exponent of a machine word (`2^3` bytes).
pub const WORD_LOG2_SIZE: u32 = 3;

/// Hash a single 8-byte machine word.
pub fn hash_word(word: &[u8; WORD_SIZE]) -> MachineHash {
    let digest = Sha256::digest(word);
    let mut bytes = [0u8; 32];
    bytes.copy_from_slice(&digest);
    MachineHash::from_bytes(bytes)
}

/// Split drive content into word hashes, zero-padded to `2^log2_size` bytes.
///
/// # Errors
///
/// - [`CryptoError::SizeOutOfRange`] if `log2_size` is below the word
///   level or beyond the address space.
/// - [`CryptoError::ContentTooLarge`] if the content does not fit.
pub fn word_hashes(content: &[u8], log2_size: u32) -> Result<Vec<MachineHash>, CryptoError> {
    if !(WORD_LOG2_SIZE..ADDRESS_SPACE_LOG2).contains(&log2_size) {
        return Err(CryptoError::SizeOutOfRange {
            log2_size,
            min: WORD_LOG2_SIZE,
            max: ADDRESS_SPACE_LOG2 - 1,
        });
    }
    let capacity = 1usize << log2_size;
    if content.len() > capacity {
        return Err(CryptoError::ContentTooLarge {
            len: content.len(),
            capacity,
        });
    }

    let word_count = capacity / WORD_SIZE;
    let mut hashes = Vec::with_capacity(word_count);
    for i in 0..word_count {
        let mut word = [0u8; WORD_SIZE];
        let start = i * WORD_SIZE;
        if start < content.len() {
            let end = usize::min(start + WORD_SIZE, content.len());
            word[..end - start].copy_from_slice(&content[start..end]);
        }
        hashes.push(hash_word(&word));
    }
    Ok(hashes)
}

/// Commit drive content to a single root hash.
///
/// Zero-pads to `2^log2_size` bytes, hashes each 8-byte word, and folds
/// the word hashes into the subtree root.
///
/// # Errors
///
/// Propagates the validation errors of [`word_hashes`].
pub fn drive_root(content: &[u8], log2_size: u32) -> Result<MachineHash, CryptoError> {
    let leaves = word_hashes(content, log2_size)?;
    root_from_leaves(&leaves)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::merkle::pristine_root;

    #[test]
    fn hash_word_is_deterministic() {
        let w = [1, 2, 3, 4, 5, 6, 7, 8];
        assert_eq!(hash_word(&w), hash_word(&w));
    }

    #[test]
    fn hash_word_distinguishes_words() {
        assert_ne!(hash_word(&[0u8; 8]), hash_word(&[1u8; 8]));
    }

    #[test]
    fn single_word_drive_root_is_word_hash() {
        let content = [9u8, 8, 7, 6, 5, 4, 3, 2];
        let root = drive_root(&content, WORD_LOG2_SIZE).unwrap();
        assert_eq!(root, hash_word(&content));
    }

    #[test]
    fn short_content_is_zero_padded() {
        // 3 bytes into an 8-byte drive pads with five zero bytes.
        let root = drive_root(&[1, 2, 3], WORD_LOG2_SIZE).unwrap();
        let padded = [1, 2, 3, 0, 0, 0, 0, 0];
        assert_eq!(root, hash_word(&padded));
    }

    #[test]
    fn empty_content_commits_to_pristine() {
        for log2 in [3u32, 5, 10] {
            let root = drive_root(&[], log2).unwrap();
            assert_eq!(root, pristine_root(log2).unwrap());
        }
    }

    #[test]
    fn oversized_content_is_rejected() {
        let err = drive_root(&[0u8; 9], WORD_LOG2_SIZE).unwrap_err();
        assert_eq!(
            err,
            CryptoError::ContentTooLarge {
                len: 9,
                capacity: 8
            }
        );
    }

    #[test]
    fn sub_word_exponent_is_rejected() {
        assert!(matches!(
            drive_root(&[], 2),
            Err(CryptoError::SizeOutOfRange { .. })
        ));
    }

    #[test]
    fn word_count_matches_exponent() {
        let hashes = word_hashes(&[], 6).unwrap();
        assert_eq!(hashes.len(), 8); // 2^6 bytes / 8 bytes per word
    }

    #[test]
    fn padding_position_matters() {
        // Same bytes, different placement via length, different roots.
        let a = drive_root(&[1, 2], 4).unwrap();
        let b = drive_root(&[0, 1, 2], 4).unwrap();
        assert_ne!(a, b);
    }
}
