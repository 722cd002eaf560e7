//! # Dispute Arena
//!
//! The keyed registry of dispute instances and the public entry points.
//! Indices are assigned monotonically and never reused; destroying an
//! instance marks its slot inactive so stale references fail with a
//! typed error instead of aliasing a newer dispute.
//!
//! All state-changing operations take `&mut self`: the arbitrating
//! ledger serializes calls, and the exclusive borrow models exactly
//! that. The clock and both external collaborators are injected once at
//! construction.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use chrono::{DateTime, Utc};
use tracing::info;

use verdict_core::{Address, Clock, DisputeIndex, GameRef, MachineHash};

use crate::claim::ClaimSubmission;
use crate::deadline::ProtocolParams;
use crate::drive::DriveSpec;
use crate::error::ArbitrationError;
use crate::external::{LogStore, VerificationGame};
use crate::instance::DisputeInstance;
use crate::outcome::{resolve, DisputeResult};
use crate::state::DisputeState;

/// Component tag reported for spawned verification games.
const VERIFICATION_GAME_COMPONENT: &str = "verification-game";

struct Slot {
    instance: DisputeInstance,
    active: bool,
}

/// The registry of all dispute instances.
pub struct DisputeArena {
    slots: Vec<Slot>,
    clock: Arc<dyn Clock>,
    log_store: Arc<dyn LogStore>,
    game: Arc<dyn VerificationGame>,
    params: ProtocolParams,
}

/// The drive currently blocking progress, as reported to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingDrive {
    /// Address the drive mounts at.
    pub position: u64,
    /// Size exponent of the mounted region.
    pub log2_size: u32,
    /// Identity expected to act.
    pub provider: Address,
    /// Whether the drive's content lives in the log store.
    pub needs_logger: bool,
}

/// A spawned sub-instance handled by an external component.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubInstance {
    /// Which external component owns the sub-instance.
    pub component: String,
    /// The component's handle for it.
    pub game: GameRef,
}

/// Snapshot of an instance for external consumption.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisputeDescription {
    /// Upper bound on machine step count.
    pub final_time: u64,
    /// When the current state's response budget expires.
    pub deadline: DateTime<Utc>,
    /// Address of the machine's output region.
    pub output_position: u64,
    /// Size exponent of the output region.
    pub output_log2_size: u32,
    /// The challenging party.
    pub challenger: Address,
    /// The claiming party.
    pub claimer: Address,
    /// Root hash of the machine with all drives empty.
    pub template_hash: MachineHash,
    /// Running root with the drives mounted so far.
    pub initial_hash: MachineHash,
    /// The claimed final root, once submitted.
    pub claimed_final_hash: Option<MachineHash>,
    /// Canonical tag of the current state.
    pub state: String,
    /// The claimed output bytes, once submitted.
    pub claimed_output: Option<Vec<u8>>,
    /// The drive blocking progress, if any.
    pub pending_drive: Option<PendingDrive>,
    /// Whether the queried user is a party to this dispute.
    pub concerned: bool,
}

impl DisputeArena {
    /// An empty arena wired to its collaborators.
    pub fn new(
        clock: Arc<dyn Clock>,
        log_store: Arc<dyn LogStore>,
        game: Arc<dyn VerificationGame>,
        params: ProtocolParams,
    ) -> Self {
        Self {
            slots: Vec::new(),
            clock,
            log_store,
            game,
            params,
        }
    }

    fn slot(&self, index: DisputeIndex) -> Result<&Slot, ArbitrationError> {
        let slot = self
            .slots
            .get(index.as_u64() as usize)
            .ok_or(ArbitrationError::UnknownInstance(index))?;
        if !slot.active {
            return Err(ArbitrationError::InactiveInstance(index));
        }
        Ok(slot)
    }

    fn slot_mut(&mut self, index: DisputeIndex) -> Result<&mut Slot, ArbitrationError> {
        let slot = self
            .slots
            .get_mut(index.as_u64() as usize)
            .ok_or(ArbitrationError::UnknownInstance(index))?;
        if !slot.active {
            return Err(ArbitrationError::InactiveInstance(index));
        }
        Ok(slot)
    }

    /// Read access to an instance.
    pub fn instance(&self, index: DisputeIndex) -> Result<&DisputeInstance, ArbitrationError> {
        Ok(&self.slot(index)?.instance)
    }

    /// Number of indices ever assigned, inactive slots included.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether no dispute was ever created.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    // ── Entry points ───────────────────────────────────────────────────

    /// Create a dispute instance. The caller becomes its owner.
    ///
    /// # Errors
    ///
    /// [`ArbitrationError::Validation`] if claimer equals challenger,
    /// the output region is malformed, or a drive declaration is
    /// invalid.
    #[allow(clippy::too_many_arguments)]
    pub fn create(
        &mut self,
        owner: Address,
        claimer: Address,
        challenger: Address,
        final_time: u64,
        template_hash: MachineHash,
        output_position: u64,
        output_log2_size: u32,
        round_duration_secs: u64,
        drives: Vec<DriveSpec>,
    ) -> Result<DisputeIndex, ArbitrationError> {
        let index = DisputeIndex::new(self.slots.len() as u64);
        let now = self.clock.now();
        let instance = DisputeInstance::create(
            index,
            owner,
            claimer,
            challenger,
            final_time,
            template_hash,
            output_position,
            output_log2_size,
            round_duration_secs,
            drives,
            now,
        )?;
        info!(index = %index, state = %instance.current_state, "dispute created");
        self.slots.push(Slot {
            instance,
            active: true,
        });
        Ok(index)
    }

    /// Provider supplies inline content for the next pending drive.
    pub fn provide_direct_drive(
        &mut self,
        index: DisputeIndex,
        caller: &Address,
        content: Vec<u8>,
    ) -> Result<(), ArbitrationError> {
        let now = self.clock.now();
        let instance = &mut self.slot_mut(index)?.instance;
        instance.provide_direct_drive(caller, content, now)?;
        info!(index = %index, state = %instance.current_state, "drive inserted");
        Ok(())
    }

    /// Provider supplies the content root for the next pending
    /// logger-backed drive.
    pub fn provide_logger_drive(
        &mut self,
        index: DisputeIndex,
        caller: &Address,
        root: MachineHash,
    ) -> Result<(), ArbitrationError> {
        let now = self.clock.now();
        let instance = &mut self.slot_mut(index)?.instance;
        instance.provide_logger_drive(caller, root, now)?;
        info!(index = %index, state = %instance.current_state, "drive inserted");
        Ok(())
    }

    /// Confirm off-ledger availability of the next pending logger
    /// drive. Callable by anyone.
    pub fn reveal_logger_drive(&mut self, index: DisputeIndex) -> Result<(), ArbitrationError> {
        let now = self.clock.now();
        let log_store = Arc::clone(&self.log_store);
        let instance = &mut self.slot_mut(index)?.instance;
        instance.reveal_logger_drive(log_store.as_ref(), now)?;
        info!(index = %index, state = %instance.current_state, "drive revealed");
        Ok(())
    }

    /// Claimer submits its claimed final state and output.
    pub fn submit_claim(
        &mut self,
        index: DisputeIndex,
        caller: &Address,
        claim: ClaimSubmission,
    ) -> Result<(), ArbitrationError> {
        let now = self.clock.now();
        let instance = &mut self.slot_mut(index)?.instance;
        instance.submit_claim(caller, claim, now)?;
        info!(index = %index, state = %instance.current_state, "claim submitted");
        Ok(())
    }

    /// Challenger accepts the claim.
    pub fn confirm(
        &mut self,
        index: DisputeIndex,
        caller: &Address,
    ) -> Result<(), ArbitrationError> {
        let now = self.clock.now();
        let instance = &mut self.slot_mut(index)?.instance;
        instance.confirm(caller, now)?;
        info!(index = %index, state = %instance.current_state, "dispute settled by consensus");
        Ok(())
    }

    /// Challenger contests the claim, spawning a verification game.
    pub fn challenge(
        &mut self,
        index: DisputeIndex,
        caller: &Address,
    ) -> Result<GameRef, ArbitrationError> {
        let now = self.clock.now();
        let game = Arc::clone(&self.game);
        let instance = &mut self.slot_mut(index)?.instance;
        let game_ref = instance.challenge(caller, game.as_ref(), now)?;
        info!(index = %index, game = %game_ref, "challenge started");
        Ok(game_ref)
    }

    /// Adopt the verification game's outcome. Callable by anyone once
    /// the game reports a finished winner.
    pub fn resolve_challenge(
        &mut self,
        index: DisputeIndex,
    ) -> Result<DisputeState, ArbitrationError> {
        let now = self.clock.now();
        let game = Arc::clone(&self.game);
        let instance = &mut self.slot_mut(index)?.instance;
        let outcome = instance.resolve_challenge(game.as_ref(), now)?;
        info!(index = %index, state = %outcome, "dispute settled by verification game");
        Ok(outcome)
    }

    /// Foreclose a stalled party's window. Callable by anyone once the
    /// current state's deadline has passed.
    pub fn force_deadline(
        &mut self,
        index: DisputeIndex,
    ) -> Result<DisputeState, ArbitrationError> {
        let now = self.clock.now();
        let game = Arc::clone(&self.game);
        let params = self.params.clone();
        let instance = &mut self.slot_mut(index)?.instance;
        let target = instance.force_deadline(&params, game.as_ref(), now)?;
        info!(index = %index, state = %target, "deadline enforced");
        Ok(target)
    }

    /// Tear down a terminal instance. Owner only. The slot stays behind,
    /// inactive, so the index is never reused.
    pub fn destroy(
        &mut self,
        index: DisputeIndex,
        caller: &Address,
    ) -> Result<(), ArbitrationError> {
        let slot = self.slot_mut(index)?;
        if *caller != slot.instance.owner {
            return Err(ArbitrationError::Authorization {
                index,
                caller: caller.clone(),
                role: "owner",
            });
        }
        if !slot.instance.current_state.is_terminal() {
            return Err(ArbitrationError::State {
                index,
                state: slot.instance.current_state,
                action: "destroy",
            });
        }
        slot.instance.clear();
        slot.active = false;
        info!(index = %index, "dispute destroyed");
        Ok(())
    }

    // ── Queries ────────────────────────────────────────────────────────

    /// Whether the user is a party to this dispute.
    pub fn is_concerned(
        &self,
        index: DisputeIndex,
        user: &Address,
    ) -> Result<bool, ArbitrationError> {
        let instance = self.instance(index)?;
        Ok(*user == instance.claimer || *user == instance.challenger)
    }

    /// Canonical tag of the instance's current state.
    pub fn state_tag(&self, index: DisputeIndex) -> Result<&'static str, ArbitrationError> {
        Ok(self.instance(index)?.current_state.as_str())
    }

    /// Snapshot the instance for the given user.
    pub fn describe(
        &self,
        index: DisputeIndex,
        user: &Address,
    ) -> Result<DisputeDescription, ArbitrationError> {
        let instance = self.instance(index)?;
        Ok(DisputeDescription {
            final_time: instance.final_time,
            deadline: instance.deadline(&self.params, self.game.as_ref()),
            output_position: instance.output_position,
            output_log2_size: instance.output_log2_size,
            challenger: instance.challenger.clone(),
            claimer: instance.claimer.clone(),
            template_hash: instance.template_hash,
            initial_hash: instance.initial_hash,
            claimed_final_hash: instance.claimed_final_hash,
            state: instance.current_state.as_str().to_string(),
            claimed_output: instance.claimed_output.clone(),
            pending_drive: instance.pending_drive().map(|drive| PendingDrive {
                position: drive.position,
                log2_size: drive.log2_size,
                provider: drive.provider.clone(),
                needs_logger: drive.needs_logger,
            }),
            concerned: *user == instance.claimer || *user == instance.challenger,
        })
    }

    /// Sub-instances spawned for recursive arbitration: the
    /// verification game, while a challenge is active.
    pub fn sub_instances(
        &self,
        index: DisputeIndex,
    ) -> Result<Vec<SubInstance>, ArbitrationError> {
        let instance = self.instance(index)?;
        let active_game = match instance.current_state {
            DisputeState::WaitingChallenge => instance.vg_instance,
            _ => None,
        };
        Ok(active_game
            .map(|game| SubInstance {
                component: VERIFICATION_GAME_COMPONENT.to_string(),
                game,
            })
            .into_iter()
            .collect())
    }

    /// The externally consumable result of the dispute.
    pub fn result(&self, index: DisputeIndex) -> Result<DisputeResult, ArbitrationError> {
        Ok(resolve(self.instance(index)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use verdict_core::ManualClock;
    use verdict_crypto::PageTree;

    use crate::mock::{MemoryLogStore, ScriptedGame};

    fn addr(tail: &str) -> Address {
        Address::new(format!("0x{tail:0>40}")).unwrap()
    }

    fn arena() -> DisputeArena {
        DisputeArena::new(
            Arc::new(ManualClock::new()),
            Arc::new(MemoryLogStore::new()),
            Arc::new(ScriptedGame::new()),
            ProtocolParams::default(),
        )
    }

    fn create_empty(arena: &mut DisputeArena) -> DisputeIndex {
        arena
            .create(
                addr("aa"),
                addr("c1"),
                addr("c2"),
                1000,
                PageTree::new().root(),
                0x800,
                3,
                45,
                Vec::new(),
            )
            .unwrap()
    }

    #[test]
    fn indices_are_monotonic() {
        let mut arena = arena();
        let first = create_empty(&mut arena);
        let second = create_empty(&mut arena);
        assert_eq!(first.as_u64(), 0);
        assert_eq!(second.as_u64(), 1);
        assert_eq!(arena.len(), 2);
    }

    #[test]
    fn unknown_index_is_rejected() {
        let arena = arena();
        assert!(matches!(
            arena.state_tag(DisputeIndex::new(5)),
            Err(ArbitrationError::UnknownInstance(_))
        ));
    }

    #[test]
    fn is_concerned_covers_both_parties_only() {
        let mut arena = arena();
        let index = create_empty(&mut arena);
        assert!(arena.is_concerned(index, &addr("c1")).unwrap());
        assert!(arena.is_concerned(index, &addr("c2")).unwrap());
        assert!(!arena.is_concerned(index, &addr("aa")).unwrap());
    }

    #[test]
    fn destroy_requires_owner_and_terminal_state() {
        let mut arena = arena();
        let index = create_empty(&mut arena);

        let err = arena.destroy(index, &addr("aa")).unwrap_err();
        assert!(matches!(err, ArbitrationError::State { .. }));

        // Stall out the claim to reach a terminal state.
        let deadline_secs = ProtocolParams::default().run_time_secs(1000) + 45;
        let clock = Arc::new(ManualClock::new());
        let mut arena = DisputeArena::new(
            Arc::clone(&clock) as Arc<dyn Clock>,
            Arc::new(MemoryLogStore::new()),
            Arc::new(ScriptedGame::new()),
            ProtocolParams::default(),
        );
        let index = create_empty(&mut arena);
        clock.advance_secs(deadline_secs as i64);
        arena.force_deadline(index).unwrap();

        let err = arena.destroy(index, &addr("c1")).unwrap_err();
        assert!(matches!(err, ArbitrationError::Authorization { .. }));

        arena.destroy(index, &addr("aa")).unwrap();
        assert!(matches!(
            arena.state_tag(index),
            Err(ArbitrationError::InactiveInstance(_))
        ));
        // The slot is retained; the index is not reissued.
        let next = create_empty(&mut arena);
        assert_eq!(next.as_u64(), 1);
    }

    #[test]
    fn describe_reports_state_and_concern() {
        let mut arena = arena();
        let index = create_empty(&mut arena);
        let description = arena.describe(index, &addr("c1")).unwrap();
        assert_eq!(description.state, "WAITING_CLAIM");
        assert!(description.concerned);
        assert!(description.pending_drive.is_none());
        assert!(description.claimed_final_hash.is_none());
        assert_eq!(description.final_time, 1000);
    }

    #[test]
    fn describe_surfaces_the_pending_drive() {
        let mut arena = arena();
        let index = arena
            .create(
                addr("aa"),
                addr("c1"),
                addr("c2"),
                1000,
                PageTree::new().root(),
                0x800,
                3,
                45,
                vec![DriveSpec {
                    position: 0x40,
                    log2_size: 3,
                    direct_value: Vec::new(),
                    logger_root_hash: MachineHash::ZERO,
                    provider: addr("d1"),
                    waits_provider: true,
                    needs_logger: false,
                }],
            )
            .unwrap();
        let description = arena.describe(index, &addr("aa")).unwrap();
        let pending = description.pending_drive.unwrap();
        assert_eq!(pending.position, 0x40);
        assert_eq!(pending.provider, addr("d1"));
        assert!(!description.concerned);
    }

    #[test]
    fn sub_instances_empty_without_challenge() {
        let mut arena = arena();
        let index = create_empty(&mut arena);
        assert!(arena.sub_instances(index).unwrap().is_empty());
    }

    #[test]
    fn description_serializes() {
        let mut arena = arena();
        let index = create_empty(&mut arena);
        let description = arena.describe(index, &addr("c1")).unwrap();
        let json = serde_json::to_string(&description).unwrap();
        assert!(json.contains("WAITING_CLAIM"));
    }
}
