//! # Drives and the Commitment Engine
//!
//! A drive is one input segment mounted into the machine's address
//! space before execution. Its content is committed to a single root
//! hash: inline content through word hashing (zero-padded to the
//! declared size), logger-backed content by adopting the root under
//! which the log store archives it.
//!
//! The commitment is written exactly once per drive — at creation when
//! the content is already known, or when the registered provider
//! supplies it later. A second write is rejected, whatever the caller.

use serde::{Deserialize, Serialize};

use verdict_core::{Address, DisputeIndex, MachineHash};
use verdict_crypto::drive_root;

use crate::error::ArbitrationError;

/// Smallest drive size exponent: one 8-byte word.
pub const DRIVE_MIN_LOG2: u32 = 3;

/// Largest size exponent for a drive whose content is passed inline.
pub const DIRECT_DRIVE_MAX_LOG2: u32 = 10;

/// Largest size exponent for a logger-backed drive.
pub const LOGGER_DRIVE_MAX_LOG2: u32 = 63;

/// Declaration of one input drive, fixed at instance creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DriveSpec {
    /// Address the drive is mounted at. Must be `2^log2_size`-aligned.
    pub position: u64,
    /// Size exponent of the mounted region, in bytes.
    pub log2_size: u32,
    /// Inline content for direct drives. Ignored for logger drives.
    pub direct_value: Vec<u8>,
    /// Content root for logger drives. Ignored for direct drives.
    pub logger_root_hash: MachineHash,
    /// Identity allowed to supply the content later.
    pub provider: Address,
    /// Content arrives from the provider after creation.
    pub waits_provider: bool,
    /// Content lives in the external log store rather than inline.
    pub needs_logger: bool,
}

/// One mounted input segment of a dispute instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Drive {
    /// Address the drive is mounted at.
    pub position: u64,
    /// Size exponent of the mounted region, in bytes.
    pub log2_size: u32,
    /// Inline content, when supplied directly.
    pub direct_value: Vec<u8>,
    /// Content root, for logger-backed drives.
    pub logger_root_hash: MachineHash,
    /// Identity allowed to supply the content.
    pub provider: Address,
    /// Whether content arrives from the provider after creation.
    pub waits_provider: bool,
    /// Whether content lives in the external log store.
    pub needs_logger: bool,
    drive_hash: Option<MachineHash>,
}

impl Drive {
    /// Validate a creation-time declaration and commit its content if
    /// it is already known.
    ///
    /// # Errors
    ///
    /// Returns [`ArbitrationError::Validation`] for a size exponent out
    /// of bounds, a misaligned position, or oversized inline content.
    pub fn from_spec(spec: DriveSpec) -> Result<Self, ArbitrationError> {
        let max_log2 = if spec.needs_logger {
            LOGGER_DRIVE_MAX_LOG2
        } else {
            DIRECT_DRIVE_MAX_LOG2
        };
        if !(DRIVE_MIN_LOG2..=max_log2).contains(&spec.log2_size) {
            return Err(ArbitrationError::Validation {
                reason: format!(
                    "drive size exponent {} out of bounds [{DRIVE_MIN_LOG2}, {max_log2}]",
                    spec.log2_size
                ),
            });
        }
        if spec.position & ((1u64 << spec.log2_size) - 1) != 0 {
            return Err(ArbitrationError::Validation {
                reason: format!(
                    "drive position {:#x} is not aligned to 2^{} bytes",
                    spec.position, spec.log2_size
                ),
            });
        }
        if !spec.needs_logger && spec.direct_value.len() > 1usize << spec.log2_size {
            return Err(ArbitrationError::Validation {
                reason: format!(
                    "drive content of {} bytes exceeds 2^{} bytes",
                    spec.direct_value.len(),
                    spec.log2_size
                ),
            });
        }

        let mut drive = Self {
            position: spec.position,
            log2_size: spec.log2_size,
            direct_value: spec.direct_value,
            logger_root_hash: spec.logger_root_hash,
            provider: spec.provider,
            waits_provider: spec.waits_provider,
            needs_logger: spec.needs_logger,
            drive_hash: None,
        };
        if !drive.waits_provider {
            let root = if drive.needs_logger {
                drive.logger_root_hash
            } else {
                drive_root(&drive.direct_value, drive.log2_size)?
            };
            drive.drive_hash = Some(root);
        }
        Ok(drive)
    }

    /// The committed root, once written.
    pub fn drive_hash(&self) -> Option<MachineHash> {
        self.drive_hash
    }

    /// Commit inline content supplied by the provider.
    ///
    /// # Errors
    ///
    /// [`ArbitrationError::Ordering`] if the commitment was already
    /// written; [`ArbitrationError::Validation`] for oversized content
    /// or a direct write to a logger-backed drive.
    pub(crate) fn commit_direct(
        &mut self,
        index: DisputeIndex,
        content: Vec<u8>,
    ) -> Result<MachineHash, ArbitrationError> {
        if self.needs_logger {
            return Err(ArbitrationError::Validation {
                reason: format!(
                    "drive at {:#x} is logger-backed and takes a content root, not bytes",
                    self.position
                ),
            });
        }
        let root = drive_root(&content, self.log2_size)?;
        self.write_once(index, root)?;
        self.direct_value = content;
        Ok(root)
    }

    /// Commit the content root supplied by the provider of a
    /// logger-backed drive.
    ///
    /// # Errors
    ///
    /// [`ArbitrationError::Ordering`] if the commitment was already
    /// written; [`ArbitrationError::Validation`] if the drive is not
    /// logger-backed.
    pub(crate) fn commit_logger_root(
        &mut self,
        index: DisputeIndex,
        root: MachineHash,
    ) -> Result<MachineHash, ArbitrationError> {
        if !self.needs_logger {
            return Err(ArbitrationError::Validation {
                reason: format!(
                    "drive at {:#x} takes inline bytes, not a logger root",
                    self.position
                ),
            });
        }
        self.write_once(index, root)?;
        self.logger_root_hash = root;
        Ok(root)
    }

    fn write_once(
        &mut self,
        index: DisputeIndex,
        root: MachineHash,
    ) -> Result<(), ArbitrationError> {
        if self.drive_hash.is_some() {
            return Err(ArbitrationError::Ordering {
                index,
                reason: format!("drive at {:#x} is already committed", self.position),
            });
        }
        self.drive_hash = Some(root);
        Ok(())
    }
}
