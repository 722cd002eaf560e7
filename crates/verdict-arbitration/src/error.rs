//! # Arbitration Error Taxonomy
//!
//! Every rejected call maps to exactly one category, and every category
//! carries the context a caller needs to correct its input. Guards run
//! before any mutation, so a returned error always means the instance is
//! unchanged.

use chrono::{DateTime, Utc};
use thiserror::Error;

use verdict_core::{Address, DisputeIndex};
use verdict_crypto::CryptoError;

use crate::state::DisputeState;

/// Errors from dispute arbitration operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ArbitrationError {
    /// The caller does not hold the capability the action requires.
    #[error("caller {caller} is not the {role} of {index}")]
    Authorization {
        /// The targeted dispute.
        index: DisputeIndex,
        /// Who attempted the call.
        caller: Address,
        /// The capability the action is gated on.
        role: &'static str,
    },

    /// The action is not legal in the instance's current state.
    #[error("{action} is not available for {index} in state {state}")]
    State {
        /// The targeted dispute.
        index: DisputeIndex,
        /// The state the instance is actually in.
        state: DisputeState,
        /// The rejected action.
        action: &'static str,
    },

    /// A drive was acted on outside its fixed pointer order, or a
    /// commitment was written twice.
    #[error("drive ordering violation on {index}: {reason}")]
    Ordering {
        /// The targeted dispute.
        index: DisputeIndex,
        /// What was out of order.
        reason: String,
    },

    /// Malformed size, content, or proof.
    #[error("validation failed: {reason}")]
    Validation {
        /// The violated condition.
        reason: String,
    },

    /// Progress was forced before the current state's deadline.
    #[error("deadline for {index} not reached: now {now}, deadline {deadline}")]
    Deadline {
        /// The targeted dispute.
        index: DisputeIndex,
        /// The clock reading at the call.
        now: DateTime<Utc>,
        /// The earliest instant the call can succeed.
        deadline: DateTime<Utc>,
    },

    /// The verification game has not reported a finished winner yet.
    #[error("verification game for {index} is still in progress")]
    ExternalPending {
        /// The targeted dispute.
        index: DisputeIndex,
    },

    /// No instance was ever created at this index.
    #[error("unknown dispute index {0}")]
    UnknownInstance(DisputeIndex),

    /// The instance at this index was destroyed by its owner.
    #[error("dispute {0} is inactive")]
    InactiveInstance(DisputeIndex),
}

impl From<CryptoError> for ArbitrationError {
    fn from(err: CryptoError) -> Self {
        Self::Validation {
            reason: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr() -> Address {
        Address::new("0x00000000000000000000000000000000000000aa").unwrap()
    }

    #[test]
    fn authorization_display_names_role() {
        let err = ArbitrationError::Authorization {
            index: DisputeIndex::new(3),
            caller: addr(),
            role: "claimer",
        };
        let msg = format!("{err}");
        assert!(msg.contains("claimer"));
        assert!(msg.contains("dispute:3"));
    }

    #[test]
    fn state_display_names_action() {
        let err = ArbitrationError::State {
            index: DisputeIndex::new(0),
            state: DisputeState::WaitingClaim,
            action: "confirm",
        };
        assert!(format!("{err}").contains("confirm"));
    }

    #[test]
    fn crypto_errors_become_validation() {
        let err: ArbitrationError = CryptoError::LeafCountNotPowerOfTwo(3).into();
        assert!(matches!(err, ArbitrationError::Validation { .. }));
    }

    #[test]
    fn unknown_and_inactive_are_distinct() {
        let unknown = format!("{}", ArbitrationError::UnknownInstance(DisputeIndex::new(9)));
        let inactive = format!("{}", ArbitrationError::InactiveInstance(DisputeIndex::new(9)));
        assert_ne!(unknown, inactive);
    }
}
