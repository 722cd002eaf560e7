//! # Claim Verification
//!
//! Validates a claimer's end-to-end assertion in one atomic check. The
//! claim ties three things together: the output bytes must be contained
//! in the claimed final state, each drive's sibling path must prove the
//! drive's region was pristine in the state produced by mounting its
//! predecessors, and folding the committed drive roots in, one mount at
//! a time and in declaration order, must yield the fully-mounted
//! initial state.
//!
//! Verification is a pure function over the instance's committed fields.
//! The caller applies the result only after the whole chain checks out,
//! so a single tampered sibling leaves the instance untouched.

use serde::{Deserialize, Serialize};

use verdict_core::MachineHash;
use verdict_crypto::{drive_root, pristine_root, roll_up};

use crate::drive::Drive;
use crate::error::ArbitrationError;

/// Everything a claimer submits to back its claimed result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClaimSubmission {
    /// Root hash of the machine after `final_time` steps.
    pub claimed_final_hash: MachineHash,
    /// One sibling path per drive, in declaration order. Path `j`
    /// proves against the state with drives `0..j` mounted.
    pub drive_sibling_paths: Vec<Vec<MachineHash>>,
    /// The machine's output region, exactly `2^output_log2_size` bytes.
    pub claimed_output: Vec<u8>,
    /// Sibling path proving the output region inside the claimed final
    /// state.
    pub output_sibling_path: Vec<MachineHash>,
}

/// Outcome of a successful verification: the fully-mounted initial
/// state the instance should adopt.
#[derive(Debug, Clone, Copy)]
pub(crate) struct VerifiedClaim {
    pub initial_hash: MachineHash,
}

/// Verify a claim against the instance's committed drives.
///
/// # Errors
///
/// [`ArbitrationError::Validation`] for a wrong output length, a path
/// of the wrong shape, or any hash mismatch. No partial progress is
/// reported: the first failing link aborts the whole check.
pub(crate) fn verify_claim(
    output_position: u64,
    output_log2_size: u32,
    initial_hash: MachineHash,
    drives: &[Drive],
    claim: &ClaimSubmission,
) -> Result<VerifiedClaim, ArbitrationError> {
    // Output containment in the claimed final state.
    let output_len = 1usize << output_log2_size;
    if claim.claimed_output.len() != output_len {
        return Err(ArbitrationError::Validation {
            reason: format!(
                "claimed output is {} bytes, expected exactly {output_len}",
                claim.claimed_output.len()
            ),
        });
    }
    let output_root = drive_root(&claim.claimed_output, output_log2_size)?;
    let rolled_final = roll_up(
        output_position,
        output_log2_size,
        output_root,
        &claim.output_sibling_path,
    )?;
    if rolled_final != claim.claimed_final_hash {
        return Err(ArbitrationError::Validation {
            reason: "claimed output is not contained in the claimed final hash".to_string(),
        });
    }

    if claim.drive_sibling_paths.len() != drives.len() {
        return Err(ArbitrationError::Validation {
            reason: format!(
                "{} drive sibling paths supplied for {} drives",
                claim.drive_sibling_paths.len(),
                drives.len()
            ),
        });
    }

    // Chain the drives into the template, one mount at a time. Each
    // path must first reproduce the running root with the drive's
    // region still pristine, which pins it to the state before this
    // mount.
    let mut running = initial_hash;
    for (j, (drive, siblings)) in drives.iter().zip(&claim.drive_sibling_paths).enumerate() {
        let pristine = pristine_root(drive.log2_size)?;
        let before = roll_up(drive.position, drive.log2_size, pristine, siblings)?;
        if before != running {
            return Err(ArbitrationError::Validation {
                reason: format!("sibling path for drive {j} does not match the pre-mount state"),
            });
        }
        let committed = drive.drive_hash().ok_or_else(|| ArbitrationError::Validation {
            reason: format!("drive {j} has no committed root"),
        })?;
        running = roll_up(drive.position, drive.log2_size, committed, siblings)?;
    }

    Ok(VerifiedClaim {
        initial_hash: running,
    })
}
