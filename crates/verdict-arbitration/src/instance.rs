//! # Dispute Instance Lifecycle
//!
//! The per-dispute mutable context and every legal transition. Each
//! entry point runs its guards — caller capability, current state,
//! pointer order — before touching anything, so a rejected call leaves
//! the instance exactly as it was.
//!
//! Drive provisioning and reveals proceed strictly in the order fixed
//! at creation. At most one item is ever pending, which keeps the
//! liveness question trivial: either the pending party acts, or anyone
//! forecloses its window once the deadline passes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use verdict_core::{Address, DisputeIndex, GameRef, MachineHash};

use crate::claim::{verify_claim, ClaimSubmission};
use crate::deadline::{deadline_for, ProtocolParams};
use crate::drive::{Drive, DriveSpec};
use crate::error::ArbitrationError;
use crate::external::{LogStore, VerificationGame};
use crate::state::DisputeState;

/// Smallest output size exponent: one 8-byte word.
pub const OUTPUT_MIN_LOG2: u32 = 3;

/// Largest output size exponent; the output travels inline with the
/// claim, so it is bounded like a direct drive.
pub const OUTPUT_MAX_LOG2: u32 = 10;

/// A record of a single state-advancing call, kept for audit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionRecord {
    /// State before the call.
    pub from: DisputeState,
    /// State after the call.
    pub to: DisputeState,
    /// Clock reading stamped by the call.
    pub at: DateTime<Utc>,
    /// The entry point that caused it.
    pub trigger: String,
}

/// One dispute between a claimer and a challenger.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisputeInstance {
    /// Arena key of this instance.
    pub index: DisputeIndex,
    /// Identity permitted to tear the instance down once terminal.
    pub owner: Address,
    /// The party asserting a computation result.
    pub claimer: Address,
    /// The party that may contest it.
    pub challenger: Address,
    /// Upper bound on machine step count for this computation.
    pub final_time: u64,
    /// Root hash of the machine with all drives empty.
    pub template_hash: MachineHash,
    /// Running root as drives are folded in; equals `template_hash`
    /// until the claim submission mounts the first drive.
    pub initial_hash: MachineHash,
    /// Root hash the claimer asserts for the final state.
    pub claimed_final_hash: Option<MachineHash>,
    /// Output bytes the claimer asserts.
    pub claimed_output: Option<Vec<u8>>,
    /// Address of the machine's output region.
    pub output_position: u64,
    /// Size exponent of the output region, in bytes.
    pub output_log2_size: u32,
    /// Base reaction-time budget added to every state's deadline.
    pub round_duration_secs: u64,
    /// Stamped on every state-advancing call.
    pub time_of_last_move: DateTime<Utc>,
    /// Current lifecycle state.
    pub current_state: DisputeState,
    /// Handle of the spawned verification game, set on challenge.
    pub vg_instance: Option<GameRef>,
    pub(crate) input_drives: Vec<Drive>,
    pub(crate) provider_drives: Vec<usize>,
    pub(crate) reveal_drives: Vec<usize>,
    pub(crate) provider_drives_pointer: usize,
    pub(crate) reveal_drives_pointer: usize,
    transition_log: Vec<TransitionRecord>,
}

impl DisputeInstance {
    /// Create an instance from its creation parameters, committing
    /// every drive whose content is already known.
    ///
    /// # Errors
    ///
    /// [`ArbitrationError::Validation`] if claimer and challenger
    /// coincide, the output region is malformed, or any drive
    /// declaration fails validation.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn create(
        index: DisputeIndex,
        owner: Address,
        claimer: Address,
        challenger: Address,
        final_time: u64,
        template_hash: MachineHash,
        output_position: u64,
        output_log2_size: u32,
        round_duration_secs: u64,
        specs: Vec<DriveSpec>,
        now: DateTime<Utc>,
    ) -> Result<Self, ArbitrationError> {
        if claimer == challenger {
            return Err(ArbitrationError::Validation {
                reason: "claimer and challenger must be distinct parties".to_string(),
            });
        }
        if !(OUTPUT_MIN_LOG2..=OUTPUT_MAX_LOG2).contains(&output_log2_size) {
            return Err(ArbitrationError::Validation {
                reason: format!(
                    "output size exponent {output_log2_size} out of bounds \
                     [{OUTPUT_MIN_LOG2}, {OUTPUT_MAX_LOG2}]"
                ),
            });
        }
        if output_position & ((1u64 << output_log2_size) - 1) != 0 {
            return Err(ArbitrationError::Validation {
                reason: format!(
                    "output position {output_position:#x} is not aligned to \
                     2^{output_log2_size} bytes"
                ),
            });
        }

        let mut input_drives = Vec::with_capacity(specs.len());
        let mut provider_drives = Vec::new();
        let mut reveal_drives = Vec::new();
        for (j, spec) in specs.into_iter().enumerate() {
            let drive = Drive::from_spec(spec)?;
            if drive.waits_provider {
                provider_drives.push(j);
            }
            if drive.needs_logger {
                reveal_drives.push(j);
            }
            input_drives.push(drive);
        }

        let current_state = if !provider_drives.is_empty() {
            DisputeState::WaitingProviders
        } else if !reveal_drives.is_empty() {
            DisputeState::WaitingReveals
        } else {
            DisputeState::WaitingClaim
        };

        Ok(Self {
            index,
            owner,
            claimer,
            challenger,
            final_time,
            template_hash,
            initial_hash: template_hash,
            claimed_final_hash: None,
            claimed_output: None,
            output_position,
            output_log2_size,
            round_duration_secs,
            time_of_last_move: now,
            current_state,
            vg_instance: None,
            input_drives,
            provider_drives,
            reveal_drives,
            provider_drives_pointer: 0,
            reveal_drives_pointer: 0,
            transition_log: vec![TransitionRecord {
                from: current_state,
                to: current_state,
                at: now,
                trigger: "create".to_string(),
            }],
        })
    }

    /// The instance's input drives, in declaration order.
    pub fn input_drives(&self) -> &[Drive] {
        &self.input_drives
    }

    /// Cursor into the provider-pending drive list.
    pub fn provider_drives_pointer(&self) -> usize {
        self.provider_drives_pointer
    }

    /// Cursor into the reveal-pending drive list.
    pub fn reveal_drives_pointer(&self) -> usize {
        self.reveal_drives_pointer
    }

    /// The audit log of every state-advancing call.
    pub fn transition_log(&self) -> &[TransitionRecord] {
        &self.transition_log
    }

    /// The drive currently blocking progress, if the instance is in a
    /// provisioning or reveal state.
    pub fn pending_drive(&self) -> Option<&Drive> {
        let j = match self.current_state {
            DisputeState::WaitingProviders => {
                self.provider_drives.get(self.provider_drives_pointer)
            }
            DisputeState::WaitingReveals => self.reveal_drives.get(self.reveal_drives_pointer),
            _ => None,
        }?;
        self.input_drives.get(*j)
    }

    /// The instant the current state's response budget expires.
    pub fn deadline(&self, params: &ProtocolParams, game: &dyn VerificationGame) -> DateTime<Utc> {
        deadline_for(
            self.current_state,
            params,
            self.final_time,
            self.round_duration_secs,
            self.time_of_last_move,
            game,
        )
    }

    // ── Guards ─────────────────────────────────────────────────────────

    fn require_state(
        &self,
        expected: DisputeState,
        action: &'static str,
    ) -> Result<(), ArbitrationError> {
        if self.current_state != expected {
            return Err(ArbitrationError::State {
                index: self.index,
                state: self.current_state,
                action,
            });
        }
        Ok(())
    }

    fn require_caller(
        &self,
        caller: &Address,
        expected: &Address,
        role: &'static str,
    ) -> Result<(), ArbitrationError> {
        if caller != expected {
            return Err(ArbitrationError::Authorization {
                index: self.index,
                caller: caller.clone(),
                role,
            });
        }
        Ok(())
    }

    /// Record a state-advancing call and stamp the move time.
    fn advance(&mut self, to: DisputeState, trigger: &'static str, now: DateTime<Utc>) {
        self.transition_log.push(TransitionRecord {
            from: self.current_state,
            to,
            at: now,
            trigger: trigger.to_string(),
        });
        self.current_state = to;
        self.time_of_last_move = now;
    }

    // ── Provisioning ───────────────────────────────────────────────────

    /// The next provider-pending drive index, in pointer order.
    fn pending_provider_drive(&self, action: &'static str) -> Result<usize, ArbitrationError> {
        self.provider_drives
            .get(self.provider_drives_pointer)
            .copied()
            .ok_or(ArbitrationError::State {
                index: self.index,
                state: self.current_state,
                action,
            })
    }

    fn after_provisioning(&self) -> DisputeState {
        if self.provider_drives_pointer + 1 < self.provider_drives.len() {
            DisputeState::WaitingProviders
        } else if !self.reveal_drives.is_empty() {
            DisputeState::WaitingReveals
        } else {
            DisputeState::WaitingClaim
        }
    }

    /// Provider supplies inline content for the next pending drive.
    pub(crate) fn provide_direct_drive(
        &mut self,
        caller: &Address,
        content: Vec<u8>,
        now: DateTime<Utc>,
    ) -> Result<(), ArbitrationError> {
        self.require_state(DisputeState::WaitingProviders, "provide_direct_drive")?;
        let j = self.pending_provider_drive("provide_direct_drive")?;
        self.require_caller(caller, &self.input_drives[j].provider, "drive provider")?;
        let index = self.index;
        self.input_drives[j].commit_direct(index, content)?;
        let next = self.after_provisioning();
        self.provider_drives_pointer += 1;
        self.advance(next, "provide_direct_drive", now);
        Ok(())
    }

    /// Provider supplies the content root for the next pending
    /// logger-backed drive.
    pub(crate) fn provide_logger_drive(
        &mut self,
        caller: &Address,
        root: MachineHash,
        now: DateTime<Utc>,
    ) -> Result<(), ArbitrationError> {
        self.require_state(DisputeState::WaitingProviders, "provide_logger_drive")?;
        let j = self.pending_provider_drive("provide_logger_drive")?;
        self.require_caller(caller, &self.input_drives[j].provider, "drive provider")?;
        let index = self.index;
        self.input_drives[j].commit_logger_root(index, root)?;
        let next = self.after_provisioning();
        self.provider_drives_pointer += 1;
        self.advance(next, "provide_logger_drive", now);
        Ok(())
    }

    /// Confirm off-ledger availability of the next pending logger
    /// drive. Callable by anyone; the log store is the gatekeeper.
    pub(crate) fn reveal_logger_drive(
        &mut self,
        log_store: &dyn LogStore,
        now: DateTime<Utc>,
    ) -> Result<(), ArbitrationError> {
        self.require_state(DisputeState::WaitingReveals, "reveal_logger_drive")?;
        let j = self
            .reveal_drives
            .get(self.reveal_drives_pointer)
            .copied()
            .ok_or(ArbitrationError::State {
                index: self.index,
                state: self.current_state,
                action: "reveal_logger_drive",
            })?;
        let drive = &self.input_drives[j];
        let root = drive.drive_hash().ok_or_else(|| ArbitrationError::Validation {
            reason: format!("drive at {:#x} has no committed root to reveal", drive.position),
        })?;
        if !log_store.is_content_available(&root, drive.log2_size) {
            return Err(ArbitrationError::Validation {
                reason: format!("logger content {root} is not yet available"),
            });
        }
        let next = if self.reveal_drives_pointer + 1 < self.reveal_drives.len() {
            DisputeState::WaitingReveals
        } else {
            DisputeState::WaitingClaim
        };
        self.reveal_drives_pointer += 1;
        self.advance(next, "reveal_logger_drive", now);
        Ok(())
    }

    // ── Claim / confirmation / challenge ──────────────────────────────

    /// Claimer submits its end-to-end assertion.
    pub(crate) fn submit_claim(
        &mut self,
        caller: &Address,
        claim: ClaimSubmission,
        now: DateTime<Utc>,
    ) -> Result<(), ArbitrationError> {
        self.require_state(DisputeState::WaitingClaim, "submit_claim")?;
        self.require_caller(caller, &self.claimer, "claimer")?;
        let verified = verify_claim(
            self.output_position,
            self.output_log2_size,
            self.initial_hash,
            &self.input_drives,
            &claim,
        )?;
        self.initial_hash = verified.initial_hash;
        self.claimed_final_hash = Some(claim.claimed_final_hash);
        self.claimed_output = Some(claim.claimed_output);
        self.advance(DisputeState::WaitingConfirmation, "submit_claim", now);
        Ok(())
    }

    /// Challenger accepts the claim.
    pub(crate) fn confirm(
        &mut self,
        caller: &Address,
        now: DateTime<Utc>,
    ) -> Result<(), ArbitrationError> {
        self.require_state(DisputeState::WaitingConfirmation, "confirm")?;
        self.require_caller(caller, &self.challenger, "challenger")?;
        self.advance(DisputeState::ConsensusResult, "confirm", now);
        Ok(())
    }

    /// Challenger contests the claim, spawning a verification game.
    pub(crate) fn challenge(
        &mut self,
        caller: &Address,
        game: &dyn VerificationGame,
        now: DateTime<Utc>,
    ) -> Result<GameRef, ArbitrationError> {
        self.require_state(DisputeState::WaitingConfirmation, "challenge")?;
        self.require_caller(caller, &self.challenger, "challenger")?;
        let claimed_final = self
            .claimed_final_hash
            .ok_or_else(|| ArbitrationError::Validation {
                reason: "no claimed final hash on record".to_string(),
            })?;
        let game_ref = game.spawn(
            &self.challenger,
            &self.claimer,
            self.round_duration_secs,
            &self.template_hash,
            &self.initial_hash,
            &claimed_final,
            self.final_time,
        );
        self.vg_instance = Some(game_ref);
        self.advance(DisputeState::WaitingChallenge, "challenge", now);
        Ok(game_ref)
    }

    /// Adopt the verification game's outcome, if it has one.
    pub(crate) fn resolve_challenge(
        &mut self,
        game: &dyn VerificationGame,
        now: DateTime<Utc>,
    ) -> Result<DisputeState, ArbitrationError> {
        self.require_state(DisputeState::WaitingChallenge, "resolve_challenge")?;
        let game_ref = self.vg_instance.ok_or(ArbitrationError::State {
            index: self.index,
            state: self.current_state,
            action: "resolve_challenge",
        })?;
        let outcome = if game.is_finished_challenger_won(&game_ref) {
            DisputeState::ChallengerWon
        } else if game.is_finished_claimer_won(&game_ref) {
            DisputeState::ClaimerWon
        } else {
            return Err(ArbitrationError::ExternalPending { index: self.index });
        };
        self.advance(outcome, "resolve_challenge", now);
        Ok(outcome)
    }

    // ── Liveness ───────────────────────────────────────────────────────

    /// Foreclose a stalled party's window. Callable by anyone once the
    /// current state's deadline has passed.
    pub(crate) fn force_deadline(
        &mut self,
        params: &ProtocolParams,
        game: &dyn VerificationGame,
        now: DateTime<Utc>,
    ) -> Result<DisputeState, ArbitrationError> {
        let target = match self.current_state {
            DisputeState::WaitingProviders | DisputeState::WaitingReveals => {
                DisputeState::ProviderMissedDeadline
            }
            DisputeState::WaitingClaim => DisputeState::ClaimerMissedDeadline,
            // Silence from the challenger is implicit acceptance.
            DisputeState::WaitingConfirmation => DisputeState::ConsensusResult,
            state => {
                return Err(ArbitrationError::State {
                    index: self.index,
                    state,
                    action: "force_deadline",
                });
            }
        };
        let deadline = self.deadline(params, game);
        if now < deadline {
            return Err(ArbitrationError::Deadline {
                index: self.index,
                now,
                deadline,
            });
        }
        self.advance(target, "force_deadline", now);
        Ok(target)
    }

    /// Drop the dynamic payload of a destroyed instance. The index,
    /// parties, and audit log stay behind.
    pub(crate) fn clear(&mut self) {
        self.input_drives.clear();
        self.provider_drives.clear();
        self.reveal_drives.clear();
        self.claimed_output = None;
    }
}
