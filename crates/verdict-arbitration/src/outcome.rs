//! # Outcome Resolution
//!
//! Maps any lifecycle state to an externally consumable answer: is the
//! output ready, is the dispute still running, and if it stalled or was
//! lost, which party is at fault.

use serde::{Deserialize, Serialize};

use verdict_core::Address;

use crate::instance::DisputeInstance;
use crate::state::DisputeState;

/// The externally consumable result of a dispute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisputeResult {
    /// The output is final and available.
    pub ready: bool,
    /// The dispute is still being played out.
    pub running: bool,
    /// The party to blame, when the dispute stalled or was lost.
    pub fault: Option<Address>,
    /// The agreed output bytes, once ready.
    pub output: Option<Vec<u8>>,
}

/// Resolve an instance's current state into a [`DisputeResult`].
pub(crate) fn resolve(instance: &DisputeInstance) -> DisputeResult {
    match instance.current_state {
        DisputeState::ConsensusResult => DisputeResult {
            ready: true,
            running: false,
            fault: None,
            output: instance.claimed_output.clone(),
        },
        DisputeState::WaitingProviders
        | DisputeState::WaitingReveals
        | DisputeState::WaitingClaim
        | DisputeState::WaitingConfirmation
        | DisputeState::WaitingChallenge => DisputeResult {
            ready: false,
            running: true,
            fault: None,
            output: None,
        },
        DisputeState::ProviderMissedDeadline => DisputeResult {
            ready: false,
            running: false,
            fault: stalled_provider(instance),
            output: None,
        },
        DisputeState::ClaimerMissedDeadline | DisputeState::ChallengerWon => DisputeResult {
            ready: false,
            running: false,
            fault: Some(instance.claimer.clone()),
            output: None,
        },
        DisputeState::ClaimerWon => DisputeResult {
            ready: false,
            running: false,
            fault: Some(instance.challenger.clone()),
            output: None,
        },
    }
}

/// The provider blamed for a missed provisioning deadline.
///
/// Indexes `input_drives` with the raw phase pointer — the provider
/// pointer while the provider list is unexhausted, the reveal pointer
/// otherwise. The two index spaces coincide only when the waiting
/// drives form a prefix of the drive list; the reference system ships
/// this behavior and it is kept as observed.
fn stalled_provider(instance: &DisputeInstance) -> Option<Address> {
    let pointer = if instance.provider_drives_pointer() < instance.provider_drives.len() {
        instance.provider_drives_pointer()
    } else {
        instance.reveal_drives_pointer()
    };
    instance
        .input_drives()
        .get(pointer)
        .map(|drive| drive.provider.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use chrono::Utc;
    use verdict_core::{DisputeIndex, MachineHash};

    use crate::drive::DriveSpec;

    fn addr(tail: &str) -> Address {
        Address::new(format!("0x{tail:0>40}")).unwrap()
    }

    fn spec(position: u64, provider: &Address, waits: bool, logger: bool) -> DriveSpec {
        DriveSpec {
            position,
            log2_size: if logger { 12 } else { 3 },
            direct_value: Vec::new(),
            logger_root_hash: MachineHash::from_bytes([3u8; 32]),
            provider: provider.clone(),
            waits_provider: waits,
            needs_logger: logger,
        }
    }

    fn instance_with(specs: Vec<DriveSpec>) -> DisputeInstance {
        DisputeInstance::create(
            DisputeIndex::new(0),
            addr("aa"),
            addr("c1"),
            addr("c2"),
            1000,
            MachineHash::ZERO,
            0x800,
            3,
            45,
            specs,
            Utc.timestamp_opt(1_700_000_000, 0).single().unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn running_states_report_running() {
        let instance = instance_with(Vec::new());
        let result = resolve(&instance);
        assert!(!result.ready);
        assert!(result.running);
        assert!(result.fault.is_none());
        assert!(result.output.is_none());
    }

    #[test]
    fn consensus_reports_ready_with_output() {
        let mut instance = instance_with(Vec::new());
        instance.current_state = DisputeState::ConsensusResult;
        instance.claimed_output = Some(b"answer!!".to_vec());
        let result = resolve(&instance);
        assert!(result.ready);
        assert!(!result.running);
        assert!(result.fault.is_none());
        assert_eq!(result.output.unwrap(), b"answer!!");
    }

    #[test]
    fn claimer_is_blamed_for_missed_claim_and_lost_game() {
        for state in [
            DisputeState::ClaimerMissedDeadline,
            DisputeState::ChallengerWon,
        ] {
            let mut instance = instance_with(Vec::new());
            instance.current_state = state;
            assert_eq!(resolve(&instance).fault.unwrap(), addr("c1"));
        }
    }

    #[test]
    fn challenger_is_blamed_for_lost_game() {
        let mut instance = instance_with(Vec::new());
        instance.current_state = DisputeState::ClaimerWon;
        assert_eq!(resolve(&instance).fault.unwrap(), addr("c2"));
    }

    #[test]
    fn stalled_provider_phase_blames_by_raw_pointer() {
        // Drive 0 is inline; drive 1 waits for its provider. The raw
        // pointer is 0, so the blame lands on drive 0's provider even
        // though drive 1 is the one actually pending.
        let inline_provider = addr("d0");
        let waiting_provider = addr("d1");
        let mut instance = instance_with(vec![
            spec(0x00, &inline_provider, false, false),
            {
                let mut s = spec(0x40, &waiting_provider, true, false);
                s.log2_size = 3;
                s
            },
        ]);
        assert_eq!(instance.current_state, DisputeState::WaitingProviders);
        instance.current_state = DisputeState::ProviderMissedDeadline;
        assert_eq!(resolve(&instance).fault.unwrap(), inline_provider);
    }

    #[test]
    fn stalled_reveal_phase_falls_back_to_reveal_pointer() {
        let provider = addr("d7");
        let mut instance = instance_with(vec![spec(0, &provider, false, true)]);
        assert_eq!(instance.current_state, DisputeState::WaitingReveals);
        instance.current_state = DisputeState::ProviderMissedDeadline;
        assert_eq!(resolve(&instance).fault.unwrap(), provider);
    }
}
