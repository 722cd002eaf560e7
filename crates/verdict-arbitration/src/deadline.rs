//! # Deadline Engine
//!
//! Computes, per state, the worst-case time a well-behaved party needs
//! to respond, and decides when a dispute has stalled. The bound is
//! recomputed fresh on every call — it depends on the *current* state,
//! and caching a value computed for an earlier state would let a party
//! be aborted on the wrong budget.
//!
//! Claim construction and confirmation both require re-running the
//! machine, so those states budget boot time plus the projected run
//! time for `final_time` steps on top of the base reaction round.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::external::VerificationGame;
use crate::state::DisputeState;

/// Protocol timing constants, fixed for an arena at construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtocolParams {
    /// Seconds to boot a machine from its template.
    pub machine_boot_secs: u64,
    /// Worst-case seconds to upload one drive to the log store.
    pub log_upload_max_secs: u64,
    /// Projected cost of one machine step, in picoseconds.
    pub picoseconds_per_step: u64,
    /// Partition granularity the verification game bisects with.
    pub partition_size: u64,
}

impl Default for ProtocolParams {
    fn default() -> Self {
        Self {
            machine_boot_secs: 40,
            log_upload_max_secs: 40 * 60,
            picoseconds_per_step: 500,
            partition_size: 25,
        }
    }
}

impl ProtocolParams {
    /// Projected seconds to run the machine for `final_time` steps,
    /// boot included. Rounds the step cost up so a nonzero run never
    /// costs zero.
    pub fn run_time_secs(&self, final_time: u64) -> u64 {
        let step_secs = (final_time as u128 * self.picoseconds_per_step as u128)
            .div_ceil(1_000_000_000_000) as u64;
        self.machine_boot_secs + step_secs
    }
}

/// Worst-case seconds a well-behaved party may take to respond in the
/// given state. Zero for terminal states.
pub fn max_duration_secs(
    state: DisputeState,
    params: &ProtocolParams,
    final_time: u64,
    round_duration_secs: u64,
    game: &dyn VerificationGame,
) -> u64 {
    match state {
        DisputeState::WaitingProviders => round_duration_secs,
        DisputeState::WaitingReveals => params.log_upload_max_secs + round_duration_secs,
        DisputeState::WaitingClaim | DisputeState::WaitingConfirmation => {
            params.run_time_secs(final_time) + round_duration_secs
        }
        DisputeState::WaitingChallenge => {
            game.max_duration_secs(
                round_duration_secs,
                params.machine_boot_secs,
                params.partition_size,
                final_time,
                params.picoseconds_per_step,
            ) + round_duration_secs
        }
        DisputeState::ConsensusResult
        | DisputeState::ClaimerWon
        | DisputeState::ChallengerWon
        | DisputeState::ProviderMissedDeadline
        | DisputeState::ClaimerMissedDeadline => 0,
    }
}

/// The instant at which the current state's budget expires.
pub fn deadline_for(
    state: DisputeState,
    params: &ProtocolParams,
    final_time: u64,
    round_duration_secs: u64,
    time_of_last_move: DateTime<Utc>,
    game: &dyn VerificationGame,
) -> DateTime<Utc> {
    let secs = max_duration_secs(state, params, final_time, round_duration_secs, game);
    time_of_last_move + Duration::seconds(secs as i64)
}
