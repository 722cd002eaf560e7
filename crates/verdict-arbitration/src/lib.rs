//! # verdict-arbitration — Dispute Arbitration for Off-Ledger Computation
//!
//! Arbitrates disagreement between two mutually distrusting parties — a
//! *claimer* and a *challenger* — about the result of a long-running
//! deterministic computation, without re-executing it on the ledger. The
//! claimer mounts input drives into a machine template, runs the machine
//! off-ledger, and submits the claimed final state with Merkle proofs
//! tying every input to the template. The challenger either accepts the
//! claim or escalates to an external verification game that narrows the
//! disagreement to a single machine step.
//!
//! Modules:
//!
//! - **Error** ([`error`]): structured error taxonomy for every rejected
//!   call — authorization, state, ordering, validation, deadline, and
//!   pending-external failures.
//!
//! - **State** ([`state`]): the dispute lifecycle states and their
//!   transition relation.
//!
//! - **Drive** ([`drive`]): input-segment records and the commitment
//!   engine that turns drive content into root hashes.
//!
//! - **Claim** ([`claim`]): atomic verification of a claimer's final
//!   hash, output, and per-drive mount proofs.
//!
//! - **Deadline** ([`deadline`]): per-state worst-case response bounds
//!   and the stall test behind `force_deadline`.
//!
//! - **Instance** ([`instance`]): the per-dispute mutable context and
//!   every legal transition.
//!
//! - **Outcome** ([`outcome`]): maps any state to an externally
//!   consumable result — ready/running/fault/output.
//!
//! - **Arena** ([`arena`]): the monotonically indexed registry of
//!   instances and the public entry points.
//!
//! - **External** ([`external`]): the collaborator traits consumed by
//!   the core (log store, verification game), with deterministic
//!   in-memory implementations in [`mock`].

pub mod arena;
pub mod claim;
pub mod deadline;
pub mod drive;
pub mod error;
pub mod external;
pub mod instance;
pub mod mock;
pub mod outcome;
pub mod state;

// Re-export primary types for ergonomic imports.

pub use arena::{DisputeArena, DisputeDescription, PendingDrive, SubInstance};
pub use claim::ClaimSubmission;
pub use deadline::ProtocolParams;
pub use drive::{Drive, DriveSpec};
pub use error::ArbitrationError;
pub use external::{LogStore, VerificationGame};
pub use instance::{DisputeInstance, TransitionRecord};
pub use outcome::DisputeResult;
pub use state::DisputeState;
