//! # Sparse Page Tree
//!
//! [`PageTree`] materializes only the nodes that differ from an all-zero
//! machine; everything else defaults to the pristine root of its level.
//! That makes the full 64-bit address space tractable: mounting a drive
//! touches one node per level, ~61 entries.
//!
//! This is the off-ledger half of the protocol: a claimer uses it to
//! compute the machine template hash, the sibling path for each drive
//! mount (taken *before* the mount, against the previous state), and the
//! output-inclusion path against the final state.

use std::collections::HashMap;

use verdict_core::MachineHash;

use crate::error::CryptoError;
use crate::merkle::{
    check_alignment, hash_pair, pristine_level, ADDRESS_SPACE_LOG2,
};
use crate::words::{drive_root, WORD_LOG2_SIZE};

/// A sparse Merkle tree over the machine's byte-addressed space.
///
/// Nodes are keyed by `(level, index)` where `index = position >> level`.
/// Absent nodes are pristine.
#[derive(Debug, Clone, Default)]
pub struct PageTree {
    nodes: HashMap<(u32, u64), MachineHash>,
}

impl PageTree {
    /// An all-pristine machine: every drive empty.
    pub fn new() -> Self {
        Self::default()
    }

    fn node(&self, level: u32, index: u64) -> MachineHash {
        self.nodes
            .get(&(level, index))
            .copied()
            .unwrap_or_else(|| pristine_level(level))
    }

    /// The current address-space root.
    pub fn root(&self) -> MachineHash {
        self.node(ADDRESS_SPACE_LOG2, 0)
    }

    /// Substitute a subtree root at `position` and rehash the path to
    /// the address-space root.
    ///
    /// # Errors
    ///
    /// [`CryptoError::SizeOutOfRange`] or [`CryptoError::Misaligned`]
    /// for a bad target subtree.
    pub fn replace(
        &mut self,
        position: u64,
        log2_size: u32,
        subtree_root: MachineHash,
    ) -> Result<(), CryptoError> {
        self.check_target(position, log2_size)?;
        self.nodes
            .insert((log2_size, position >> log2_size), subtree_root);
        for level in log2_size..ADDRESS_SPACE_LOG2 {
            let index = position >> level;
            let parent = if index & 1 == 0 {
                hash_pair(&self.node(level, index), &self.node(level, index ^ 1))
            } else {
                hash_pair(&self.node(level, index ^ 1), &self.node(level, index))
            };
            self.nodes.insert((level + 1, index >> 1), parent);
        }
        Ok(())
    }

    /// Commit raw bytes at `position` as a `2^log2_size` drive and mount
    /// the resulting root. Returns the committed drive root.
    ///
    /// # Errors
    ///
    /// Propagates content/size validation from [`drive_root`] and target
    /// validation from [`PageTree::replace`].
    pub fn write_bytes(
        &mut self,
        position: u64,
        log2_size: u32,
        content: &[u8],
    ) -> Result<MachineHash, CryptoError> {
        let root = drive_root(content, log2_size)?;
        self.replace(position, log2_size, root)?;
        Ok(root)
    }

    /// The sibling path lifting the subtree at `position` to the
    /// address-space root, ordered leaf-to-root.
    ///
    /// Taken against the tree's *current* contents — call it before
    /// mounting to prove what the region looked like beforehand.
    ///
    /// # Errors
    ///
    /// [`CryptoError::SizeOutOfRange`] or [`CryptoError::Misaligned`]
    /// for a bad target subtree.
    pub fn siblings(
        &self,
        position: u64,
        log2_size: u32,
    ) -> Result<Vec<MachineHash>, CryptoError> {
        self.check_target(position, log2_size)?;
        Ok((log2_size..ADDRESS_SPACE_LOG2)
            .map(|level| self.node(level, (position >> level) ^ 1))
            .collect())
    }

    fn check_target(&self, position: u64, log2_size: u32) -> Result<(), CryptoError> {
        if !(WORD_LOG2_SIZE..=ADDRESS_SPACE_LOG2).contains(&log2_size) {
            return Err(CryptoError::SizeOutOfRange {
                log2_size,
                min: WORD_LOG2_SIZE,
                max: ADDRESS_SPACE_LOG2,
            });
        }
        check_alignment(position, log2_size)
    }
}
