//! # Deterministic In-Memory Collaborators
//!
//! Test and development implementations of the [`LogStore`] and
//! [`VerificationGame`] traits. Both are fully deterministic: the log
//! store answers from an explicitly published set, and the game reports
//! exactly the outcome a test scripted for it.
//!
//! **Not for production.** A real deployment wires the arena to the
//! actual log store and bisection game; these doubles exist so the
//! lifecycle can be driven end-to-end without either.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use verdict_core::{Address, GameRef, MachineHash};

use crate::external::{LogStore, VerificationGame};

/// A log store whose contents are whatever tests have published.
#[derive(Debug, Default)]
pub struct MemoryLogStore {
    available: Mutex<HashSet<(MachineHash, u32)>>,
}

impl MemoryLogStore {
    /// An empty store: nothing is available.
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark content with this root and size as retrievable.
    pub fn publish(&self, root: MachineHash, log2_size: u32) {
        self.available
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert((root, log2_size));
    }
}

impl LogStore for MemoryLogStore {
    fn is_content_available(&self, root: &MachineHash, log2_size: u32) -> bool {
        self.available
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .contains(&(*root, log2_size))
    }
}

/// Outcome a scripted game reports for a spawned instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameOutcome {
    /// The game has not finished.
    InProgress,
    /// The game finished and the challenger won.
    ChallengerWon,
    /// The game finished and the claimer won.
    ClaimerWon,
}

/// Parameters recorded for each spawned game.
#[derive(Debug, Clone)]
pub struct SpawnRecord {
    /// The handle returned to the core.
    pub game: GameRef,
    /// The challenging party.
    pub challenger: Address,
    /// The claiming party.
    pub claimer: Address,
    /// The disputed span's starting root.
    pub initial_hash: MachineHash,
    /// The claimed final root.
    pub claimed_final_hash: MachineHash,
    /// Upper bound on machine step count.
    pub final_time: u64,
}

/// A verification game whose outcomes are set by the test.
///
/// Every spawn starts [`GameOutcome::InProgress`]; tests call
/// [`ScriptedGame::finish`] to settle it.
#[derive(Debug, Default)]
pub struct ScriptedGame {
    spawned: Mutex<Vec<SpawnRecord>>,
    outcomes: Mutex<HashMap<GameRef, GameOutcome>>,
}

impl ScriptedGame {
    /// A game registry with no spawned instances.
    pub fn new() -> Self {
        Self::default()
    }

    /// Settle a spawned game with the given outcome.
    pub fn finish(&self, game: &GameRef, outcome: GameOutcome) {
        self.outcomes
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(*game, outcome);
    }

    /// Every spawn observed so far, in order.
    pub fn spawned(&self) -> Vec<SpawnRecord> {
        self.spawned
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    fn outcome(&self, game: &GameRef) -> GameOutcome {
        self.outcomes
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(game)
            .copied()
            .unwrap_or(GameOutcome::InProgress)
    }
}

impl VerificationGame for ScriptedGame {
    fn spawn(
        &self,
        challenger: &Address,
        claimer: &Address,
        _round_duration_secs: u64,
        _machine_template: &MachineHash,
        initial_hash: &MachineHash,
        claimed_final_hash: &MachineHash,
        final_time: u64,
    ) -> GameRef {
        let game = GameRef::new();
        self.spawned
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(SpawnRecord {
                game,
                challenger: challenger.clone(),
                claimer: claimer.clone(),
                initial_hash: *initial_hash,
                claimed_final_hash: *claimed_final_hash,
                final_time,
            });
        self.outcomes
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(game, GameOutcome::InProgress);
        game
    }

    fn is_finished_challenger_won(&self, game: &GameRef) -> bool {
        self.outcome(game) == GameOutcome::ChallengerWon
    }

    fn is_finished_claimer_won(&self, game: &GameRef) -> bool {
        self.outcome(game) == GameOutcome::ClaimerWon
    }

    fn max_duration_secs(
        &self,
        round_duration_secs: u64,
        machine_boot_secs: u64,
        partition_size: u64,
        final_time: u64,
        picoseconds_per_step: u64,
    ) -> u64 {
        // Conservative envelope: one reaction round per bisection level
        // until the span narrows to a single step, then one machine run
        // to check that step.
        let mut rounds: u64 = 1;
        let mut span = final_time.max(1);
        let partition = partition_size.max(2);
        while span > 1 {
            span = span.div_ceil(partition);
            rounds += 1;
        }
        let run_secs =
            ((final_time as u128 * picoseconds_per_step as u128).div_ceil(1_000_000_000_000)) as u64;
        rounds * round_duration_secs + machine_boot_secs + run_secs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn root(byte: u8) -> MachineHash {
        MachineHash::from_bytes([byte; 32])
    }

    fn addr(tail: &str) -> Address {
        Address::new(format!("0x{:0>40}", tail)).unwrap()
    }

    #[test]
    fn log_store_only_serves_published_content() {
        let store = MemoryLogStore::new();
        assert!(!store.is_content_available(&root(1), 10));
        store.publish(root(1), 10);
        assert!(store.is_content_available(&root(1), 10));
        // Same root at a different size is a different artifact.
        assert!(!store.is_content_available(&root(1), 11));
    }

    #[test]
    fn scripted_game_starts_in_progress() {
        let game = ScriptedGame::new();
        let g = game.spawn(&addr("1"), &addr("2"), 45, &root(0), &root(1), &root(2), 100);
        assert!(!game.is_finished_challenger_won(&g));
        assert!(!game.is_finished_claimer_won(&g));
    }

    #[test]
    fn scripted_game_reports_scripted_winner() {
        let game = ScriptedGame::new();
        let g = game.spawn(&addr("1"), &addr("2"), 45, &root(0), &root(1), &root(2), 100);
        game.finish(&g, GameOutcome::ChallengerWon);
        assert!(game.is_finished_challenger_won(&g));
        assert!(!game.is_finished_claimer_won(&g));
    }

    #[test]
    fn spawn_records_parameters() {
        let game = ScriptedGame::new();
        game.spawn(&addr("1"), &addr("2"), 45, &root(0), &root(1), &root(2), 77);
        let records = game.spawned();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].final_time, 77);
        assert_eq!(records[0].initial_hash, root(1));
    }

    #[test]
    fn max_duration_grows_with_final_time() {
        let game = ScriptedGame::new();
        let short = game.max_duration_secs(45, 40, 25, 100, 500);
        let long = game.max_duration_secs(45, 40, 25, 1_000_000_000, 500);
        assert!(long > short);
    }

    #[test]
    fn unknown_game_is_in_progress() {
        let game = ScriptedGame::new();
        assert!(!game.is_finished_challenger_won(&GameRef::new()));
    }
}
