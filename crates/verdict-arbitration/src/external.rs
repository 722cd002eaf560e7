//! # External Collaborator Interfaces
//!
//! The arbitration core consumes two external systems through narrow
//! traits, injected at arena construction:
//!
//! - the **log store**, a content-addressed archive holding large drive
//!   payloads off-ledger; the core only asks whether a committed root is
//!   actually retrievable before treating the drive as readable;
//!
//! - the **verification game**, the interactive bisection sub-protocol
//!   that settles a challenged claim. The core spawns it, polls its two
//!   finished-outcome predicates, and budgets its worst-case duration
//!   into the challenge-state deadline. The game's internal rounds are
//!   entirely its own business.

use verdict_core::{Address, GameRef, MachineHash};

/// Content-addressed log store backing logger drives.
pub trait LogStore: Send + Sync {
    /// Whether content with this root and size is retrievable from the
    /// store right now.
    fn is_content_available(&self, root: &MachineHash, log2_size: u32) -> bool;
}

/// The interactive verification game settling a challenged claim.
pub trait VerificationGame: Send + Sync {
    /// Start a game between the parties over the span from the mounted
    /// initial state to the claimed final state. Returns the handle the
    /// arbitration core will poll.
    #[allow(clippy::too_many_arguments)]
    fn spawn(
        &self,
        challenger: &Address,
        claimer: &Address,
        round_duration_secs: u64,
        machine_template: &MachineHash,
        initial_hash: &MachineHash,
        claimed_final_hash: &MachineHash,
        final_time: u64,
    ) -> GameRef;

    /// Whether the game has finished with the challenger as winner.
    fn is_finished_challenger_won(&self, game: &GameRef) -> bool;

    /// Whether the game has finished with the claimer as winner.
    fn is_finished_claimer_won(&self, game: &GameRef) -> bool;

    /// Worst-case wall-clock duration of a full game, in seconds.
    ///
    /// Parameterized rather than read from the spawned game so the
    /// deadline engine can budget a challenge before any game exists.
    fn max_duration_secs(
        &self,
        round_duration_secs: u64,
        machine_boot_secs: u64,
        partition_size: u64,
        final_time: u64,
        picoseconds_per_step: u64,
    ) -> u64;
}
