//! # Dispute Lifecycle States
//!
//! The lifecycle is a validated enum rather than typestate: deadline
//! aborts enter from four different states, instances are stored and
//! serialized keyed by index, and every entry point already re-checks
//! the state at runtime because callers are untrusted.
//!
//! ## Transition Graph
//!
//! ```text
//! WaitingProviders ──last provider drive──▶ WaitingReveals ──last reveal──▶ WaitingClaim
//!        │                                        │                             │
//!        │ (skipped when no drive                 │ (skipped when no            │ submit_claim
//!        │  waits for a provider)                 │  logger drives)             ▼
//!        │                                        │                     WaitingConfirmation
//!        │ deadline                               │ deadline              │        │
//!        ▼                                        ▼                 confirm     challenge
//! ProviderMissedDeadline              ProviderMissedDeadline           │        │
//!                                                                      ▼        ▼
//!                                                          ConsensusResult   WaitingChallenge
//!                                                       (also on deadline:      │
//!                                                        silence accepts)  resolve_challenge
//!                                                                               │
//!                                                                   ┌───────────┴──────────┐
//!                                                                   ▼                      ▼
//!                                                              ClaimerWon           ChallengerWon
//!
//! WaitingClaim ──deadline──▶ ClaimerMissedDeadline
//! ```

use serde::{Deserialize, Serialize};

/// The lifecycle state of a dispute instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DisputeState {
    /// One or more drives still wait for their provider's content.
    WaitingProviders,
    /// Logger-backed drives wait for off-ledger content availability.
    WaitingReveals,
    /// All drives committed; the claimer must submit a claim.
    WaitingClaim,
    /// A verified claim is on the table; the challenger must react.
    WaitingConfirmation,
    /// A verification game is running. Exits only through its outcome.
    WaitingChallenge,
    /// Both parties agree on the result. Terminal state.
    ConsensusResult,
    /// The verification game found for the claimer. Terminal state.
    ClaimerWon,
    /// The verification game found for the challenger. Terminal state.
    ChallengerWon,
    /// A provider stalled past its deadline. Terminal state.
    ProviderMissedDeadline,
    /// The claimer stalled past its deadline. Terminal state.
    ClaimerMissedDeadline,
}

impl DisputeState {
    /// The canonical string tag of this state.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::WaitingProviders => "WAITING_PROVIDERS",
            Self::WaitingReveals => "WAITING_REVEALS",
            Self::WaitingClaim => "WAITING_CLAIM",
            Self::WaitingConfirmation => "WAITING_CONFIRMATION",
            Self::WaitingChallenge => "WAITING_CHALLENGE",
            Self::ConsensusResult => "CONSENSUS_RESULT",
            Self::ClaimerWon => "CLAIMER_WON",
            Self::ChallengerWon => "CHALLENGER_WON",
            Self::ProviderMissedDeadline => "PROVIDER_MISSED_DEADLINE",
            Self::ClaimerMissedDeadline => "CLAIMER_MISSED_DEADLINE",
        }
    }

    /// Whether this state is terminal (no further transitions allowed).
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::ConsensusResult
                | Self::ClaimerWon
                | Self::ChallengerWon
                | Self::ProviderMissedDeadline
                | Self::ClaimerMissedDeadline
        )
    }

    /// Valid target states from this state, deadline edges included.
    pub fn valid_transitions(&self) -> &'static [DisputeState] {
        match self {
            Self::WaitingProviders => &[
                Self::WaitingReveals,
                Self::WaitingClaim,
                Self::ProviderMissedDeadline,
            ],
            Self::WaitingReveals => &[Self::WaitingClaim, Self::ProviderMissedDeadline],
            Self::WaitingClaim => &[Self::WaitingConfirmation, Self::ClaimerMissedDeadline],
            Self::WaitingConfirmation => &[Self::ConsensusResult, Self::WaitingChallenge],
            Self::WaitingChallenge => &[Self::ClaimerWon, Self::ChallengerWon],
            Self::ConsensusResult
            | Self::ClaimerWon
            | Self::ChallengerWon
            | Self::ProviderMissedDeadline
            | Self::ClaimerMissedDeadline => &[],
        }
    }
}

impl std::fmt::Display for DisputeState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [DisputeState; 10] = [
        DisputeState::WaitingProviders,
        DisputeState::WaitingReveals,
        DisputeState::WaitingClaim,
        DisputeState::WaitingConfirmation,
        DisputeState::WaitingChallenge,
        DisputeState::ConsensusResult,
        DisputeState::ClaimerWon,
        DisputeState::ChallengerWon,
        DisputeState::ProviderMissedDeadline,
        DisputeState::ClaimerMissedDeadline,
    ];

    #[test]
    fn exactly_five_terminal_states() {
        let terminal = ALL.iter().filter(|s| s.is_terminal()).count();
        assert_eq!(terminal, 5);
    }

    #[test]
    fn terminal_states_have_no_successors() {
        for state in ALL.iter().filter(|s| s.is_terminal()) {
            assert!(state.valid_transitions().is_empty(), "{state}");
        }
    }

    #[test]
    fn transition_relation_never_reenters_a_waiting_state_backwards() {
        // The waiting states form a strict forward order; the only
        // cycles the relation could have would come from re-entering an
        // earlier waiting state.
        let order = |s: &DisputeState| match s {
            DisputeState::WaitingProviders => 0,
            DisputeState::WaitingReveals => 1,
            DisputeState::WaitingClaim => 2,
            DisputeState::WaitingConfirmation => 3,
            DisputeState::WaitingChallenge => 4,
            _ => 5,
        };
        for state in &ALL {
            for target in state.valid_transitions() {
                assert!(
                    order(target) > order(state),
                    "{state} -> {target} goes backwards"
                );
            }
        }
    }

    #[test]
    fn tags_are_unique() {
        let mut tags: Vec<&str> = ALL.iter().map(|s| s.as_str()).collect();
        tags.sort_unstable();
        tags.dedup();
        assert_eq!(tags.len(), ALL.len());
    }

    #[test]
    fn display_matches_tag() {
        assert_eq!(
            format!("{}", DisputeState::WaitingConfirmation),
            "WAITING_CONFIRMATION"
        );
    }

    #[test]
    fn serde_roundtrip() {
        for state in ALL {
            let json = serde_json::to_string(&state).unwrap();
            let back: DisputeState = serde_json::from_str(&json).unwrap();
            assert_eq!(back, state);
        }
    }
}
