//! # Identity Newtypes
//!
//! Domain-primitive newtypes for identifiers throughout the Verdict stack.
//! Each identifier is a distinct type — you cannot pass a [`DisputeIndex`]
//! where a [`GameRef`] is expected.
//!
//! ## Validation
//!
//! [`Address`] validates its format at construction time and stores the
//! canonical lowercase form. [`DisputeIndex`] and [`GameRef`] are always
//! valid by construction.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ValidationError;

/// Helper macro to implement `Deserialize` for string newtypes that must
/// validate their contents. Deserializes as a plain `String`, then routes
/// through the type's `new()` constructor so that invalid values are
/// rejected at deserialization time — not silently accepted.
macro_rules! impl_validating_deserialize {
    ($ty:ident) => {
        impl<'de> Deserialize<'de> for $ty {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                let raw = String::deserialize(deserializer)?;
                Self::new(raw).map_err(serde::de::Error::custom)
            }
        }
    };
}

// ---------------------------------------------------------------------------
// Address (validated at construction)
// ---------------------------------------------------------------------------

/// A ledger account address: the identity of an owner, claimer, challenger,
/// or drive provider.
///
/// Format: `0x` followed by exactly 40 hex characters. Mixed-case input is
/// accepted and canonicalized to lowercase, so two spellings of the same
/// account compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Address(String);

impl_validating_deserialize!(Address);

impl Address {
    /// Create an address from a string, validating format.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidAddress`] if the string is not
    /// `0x` followed by 40 hex characters.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let s = value.into();
        let Some(body) = s.strip_prefix("0x") else {
            return Err(ValidationError::InvalidAddress(s));
        };
        if body.len() != 40 || !body.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ValidationError::InvalidAddress(s));
        }
        Ok(Self(format!("0x{}", body.to_ascii_lowercase())))
    }

    /// Access the canonical (lowercase) address string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for Address {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

// ---------------------------------------------------------------------------
// DisputeIndex (always valid by construction)
// ---------------------------------------------------------------------------

/// The arena key of a dispute instance.
///
/// Assigned monotonically at creation and never reused; a destroyed
/// instance keeps its index so stale references fail predictably instead
/// of aliasing a newer dispute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DisputeIndex(u64);

impl DisputeIndex {
    /// Wrap a raw index value.
    pub fn new(index: u64) -> Self {
        Self(index)
    }

    /// Access the underlying index value.
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl From<u64> for DisputeIndex {
    fn from(index: u64) -> Self {
        Self(index)
    }
}

impl std::fmt::Display for DisputeIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "dispute:{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// GameRef (always valid by construction)
// ---------------------------------------------------------------------------

/// A handle to a spawned verification-game sub-instance.
///
/// The arbitration core never looks inside the game; it holds this
/// reference, polls the game's finished-outcome predicates, and reports
/// the pair (game component, reference) to callers interested in
/// recursive arbitration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GameRef(Uuid);

impl GameRef {
    /// Create a new random game reference.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a game reference from an existing UUID.
    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for GameRef {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for GameRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "game:{}", self.0)
    }
}
