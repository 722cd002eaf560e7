//! # verdict-core — Foundational Types for the Verdict Stack
//!
//! This crate provides the domain primitives shared by the workspace:
//!
//! - **Identity newtypes** ([`identity`]): validated [`Address`] values for
//!   the parties to a dispute, the monotonic [`DisputeIndex`] arena key,
//!   and [`GameRef`] handles to spawned verification-game sub-instances.
//!
//! - **Machine hashes** ([`hash`]): the 32-byte [`MachineHash`] root-hash
//!   newtype with hex display and validating serde.
//!
//! - **Time** ([`time`]): the injected [`Clock`] capability. The
//!   arbitration core never reads the wall clock directly, which keeps
//!   every deadline decision deterministic under test.

pub mod error;
pub mod hash;
pub mod identity;
pub mod time;

// Re-export primary types.
pub use error::ValidationError;
pub use hash::MachineHash;
pub use identity::{Address, DisputeIndex, GameRef};
pub use time::{Clock, ManualClock, SystemClock};
