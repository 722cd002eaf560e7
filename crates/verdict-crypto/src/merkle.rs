//! # Merkle Primitives
//!
//! Root folds, pristine subtree roots, and sibling-path proof
//! application over the machine's address space.
//!
//! The machine state is modeled as a full binary Merkle tree over a
//! 64-bit byte-addressed space with 8-byte word leaves. A subtree of
//! `2^log2_size` bytes sits at level `log2_size`; its path to the root
//! therefore carries exactly `64 - log2_size` sibling hashes. Every
//! proof checked here is positional: at each level the direction is
//! taken from the corresponding address bit, so a path valid for one
//! position cannot be replayed at another.

use sha2::{Digest, Sha256};
use verdict_core::MachineHash;

use crate::error::CryptoError;
use crate::words::{hash_word, WORD_LOG2_SIZE, WORD_SIZE};

/// Size exponent of the machine's byte-addressed space.
pub const ADDRESS_SPACE_LOG2: u32 = 64;

/// Hash an ordered pair of child nodes into their parent.
pub fn hash_pair(left: &MachineHash, right: &MachineHash) -> MachineHash {
    let mut hasher = Sha256::new();
    hasher.update(left.as_bytes());
    hasher.update(right.as_bytes());
    let digest = hasher.finalize();
    let mut bytes = [0u8; 32];
    bytes.copy_from_slice(&digest);
    MachineHash::from_bytes(bytes)
}

/// Number of sibling hashes needed to lift a subtree of the given size
/// exponent to the address-space root.
pub fn sibling_path_len(log2_size: u32) -> usize {
    (ADDRESS_SPACE_LOG2 - log2_size) as usize
}

/// Fold a power-of-two leaf layer into its root.
///
/// # Errors
///
/// Returns [`CryptoError::LeafCountNotPowerOfTwo`] for an empty layer or
/// a count with more than one bit set.
pub fn root_from_leaves(leaves: &[MachineHash]) -> Result<MachineHash, CryptoError> {
    if leaves.is_empty() || !leaves.len().is_power_of_two() {
        return Err(CryptoError::LeafCountNotPowerOfTwo(leaves.len()));
    }
    let mut layer = leaves.to_vec();
    while layer.len() > 1 {
        let mut next = Vec::with_capacity(layer.len() / 2);
        for pair in layer.chunks_exact(2) {
            next.push(hash_pair(&pair[0], &pair[1]));
        }
        layer = next;
    }
    Ok(layer[0])
}

/// Root of an all-zero subtree at the given level. Infallible for
/// levels the crate itself produces.
pub(crate) fn pristine_level(log2_size: u32) -> MachineHash {
    let mut node = hash_word(&[0u8; WORD_SIZE]);
    let mut level = WORD_LOG2_SIZE;
    while level < log2_size {
        node = hash_pair(&node, &node);
        level += 1;
    }
    node
}

/// Root hash of an all-zero subtree of `2^log2_size` bytes.
///
/// This is the "before" placeholder when proving that mounting a drive
/// turned an empty region into committed content.
///
/// # Errors
///
/// Returns [`CryptoError::SizeOutOfRange`] outside the word-to-address-space
/// range.
pub fn pristine_root(log2_size: u32) -> Result<MachineHash, CryptoError> {
    if !(WORD_LOG2_SIZE..=ADDRESS_SPACE_LOG2).contains(&log2_size) {
        return Err(CryptoError::SizeOutOfRange {
            log2_size,
            min: WORD_LOG2_SIZE,
            max: ADDRESS_SPACE_LOG2,
        });
    }
    Ok(pristine_level(log2_size))
}

/// Check that `position` addresses a `2^log2_size`-aligned subtree.
pub(crate) fn check_alignment(position: u64, log2_size: u32) -> Result<(), CryptoError> {
    let misaligned = if log2_size >= ADDRESS_SPACE_LOG2 {
        position != 0
    } else {
        position & ((1u64 << log2_size) - 1) != 0
    };
    if misaligned {
        return Err(CryptoError::Misaligned {
            position,
            log2_size,
        });
    }
    Ok(())
}

/// Recompute the address-space root with `subtree_root` substituted at
/// `position`, walking the sibling path upward.
///
/// The same call serves both proof verification (substitute the value
/// the prover says was there and compare against a known root) and root
/// replacement (substitute the new value and adopt the result).
///
/// # Errors
///
/// - [`CryptoError::SizeOutOfRange`] / [`CryptoError::Misaligned`] for a
///   bad target subtree.
/// - [`CryptoError::SiblingCountMismatch`] unless exactly
///   `64 - log2_size` hashes are supplied.
pub fn roll_up(
    position: u64,
    log2_size: u32,
    subtree_root: MachineHash,
    siblings: &[MachineHash],
) -> Result<MachineHash, CryptoError> {
    if !(WORD_LOG2_SIZE..=ADDRESS_SPACE_LOG2).contains(&log2_size) {
        return Err(CryptoError::SizeOutOfRange {
            log2_size,
            min: WORD_LOG2_SIZE,
            max: ADDRESS_SPACE_LOG2,
        });
    }
    check_alignment(position, log2_size)?;
    let expected = sibling_path_len(log2_size);
    if siblings.len() != expected {
        return Err(CryptoError::SiblingCountMismatch {
            expected,
            actual: siblings.len(),
        });
    }

    let mut node = subtree_root;
    for (i, sibling) in siblings.iter().enumerate() {
        let level = log2_size + i as u32;
        if position >> level & 1 == 0 {
            node = hash_pair(&node, sibling);
        } else {
            node = hash_pair(sibling, &node);
        }
    }
    Ok(node)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn h(byte: u8) -> MachineHash {
        MachineHash::from_bytes([byte; 32])
    }

    #[test]
    fn root_of_single_leaf_is_the_leaf() {
        assert_eq!(root_from_leaves(&[h(1)]).unwrap(), h(1));
    }

    #[test]
    fn root_of_four_leaves_matches_manual_fold() {
        let leaves = [h(1), h(2), h(3), h(4)];
        let left = hash_pair(&h(1), &h(2));
        let right = hash_pair(&h(3), &h(4));
        assert_eq!(
            root_from_leaves(&leaves).unwrap(),
            hash_pair(&left, &right)
        );
    }

    #[test]
    fn root_rejects_non_power_of_two() {
        assert!(root_from_leaves(&[]).is_err());
        assert!(root_from_leaves(&[h(1), h(2), h(3)]).is_err());
    }

    #[test]
    fn pristine_roots_chain_by_doubling() {
        let p3 = pristine_root(3).unwrap();
        let p4 = pristine_root(4).unwrap();
        assert_eq!(p4, hash_pair(&p3, &p3));
    }

    #[test]
    fn pristine_root_rejects_out_of_range() {
        assert!(pristine_root(2).is_err());
        assert!(pristine_root(65).is_err());
    }

    #[test]
    fn pristine_address_space_root_is_reachable() {
        // 61 doublings from the zero word.
        let root = pristine_root(ADDRESS_SPACE_LOG2).unwrap();
        assert!(!root.is_zero());
    }

    #[test]
    fn roll_up_pristine_path_reproduces_pristine_machine() {
        // A pristine subtree lifted through pristine siblings must give
        // the pristine address-space root, wherever it sits.
        let log2 = 5u32;
        let siblings: Vec<MachineHash> = (log2..ADDRESS_SPACE_LOG2)
            .map(|level| pristine_root(level).unwrap())
            .collect();
        for position in [0u64, 1 << 5, 1 << 20, 0xffff_ffff_ffff_ffe0] {
            let root = roll_up(position, log2, pristine_root(log2).unwrap(), &siblings).unwrap();
            assert_eq!(root, pristine_root(ADDRESS_SPACE_LOG2).unwrap());
        }
    }

    #[test]
    fn roll_up_is_position_sensitive() {
        let log2 = 3u32;
        let siblings: Vec<MachineHash> = (log2..ADDRESS_SPACE_LOG2)
            .map(|level| pristine_root(level).unwrap())
            .collect();
        let at_zero = roll_up(0, log2, h(9), &siblings).unwrap();
        let at_eight = roll_up(8, log2, h(9), &siblings).unwrap();
        assert_ne!(at_zero, at_eight);
    }

    #[test]
    fn roll_up_rejects_short_path() {
        let siblings = vec![h(0); 60];
        let err = roll_up(0, 3, h(1), &siblings).unwrap_err();
        assert_eq!(
            err,
            CryptoError::SiblingCountMismatch {
                expected: 61,
                actual: 60
            }
        );
    }

    #[test]
    fn roll_up_rejects_misaligned_position() {
        let siblings = vec![h(0); 59];
        assert!(matches!(
            roll_up(12, 5, h(1), &siblings),
            Err(CryptoError::Misaligned { .. })
        ));
    }

    #[test]
    fn full_space_roll_up_is_identity() {
        let root = roll_up(0, ADDRESS_SPACE_LOG2, h(7), &[]).unwrap();
        assert_eq!(root, h(7));
    }

    proptest! {
        #[test]
        fn tampered_sibling_changes_root(level in 0usize..61) {
            let siblings: Vec<MachineHash> = (3..ADDRESS_SPACE_LOG2)
                .map(|l| pristine_root(l).unwrap())
                .collect();
            let honest = roll_up(0, 3, h(1), &siblings).unwrap();
            let mut tampered = siblings;
            tampered[level] = h(0xee);
            let forged = roll_up(0, 3, h(1), &tampered).unwrap();
            prop_assert_ne!(honest, forged);
        }
    }
}
