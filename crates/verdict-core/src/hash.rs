//! # Machine Root Hashes
//!
//! [`MachineHash`] is the 32-byte root hash used everywhere a subtree of
//! the machine's address space is committed to: drive roots, the pristine
//! template, the incrementally mounted initial state, and the claimed
//! final state.
//!
//! Hashes serialize as `0x`-prefixed lowercase hex strings and validate
//! on deserialization, so a truncated or non-hex value is rejected at the
//! boundary instead of producing a silently corrupt commitment.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// A 32-byte root hash over a subtree of the machine address space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MachineHash([u8; 32]);

impl MachineHash {
    /// The all-zero hash, used as the "unset" sentinel for drive
    /// commitments that have not been written yet.
    pub const ZERO: MachineHash = MachineHash([0u8; 32]);

    /// Wrap raw hash bytes.
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Parse from a hex string, with or without a `0x` prefix.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidHash`] unless the input is
    /// exactly 64 hex characters after stripping the prefix.
    pub fn from_hex(value: &str) -> Result<Self, ValidationError> {
        let body = value.strip_prefix("0x").unwrap_or(value);
        if body.len() != 64 {
            return Err(ValidationError::InvalidHash(value.to_string()));
        }
        let raw =
            hex::decode(body).map_err(|_| ValidationError::InvalidHash(value.to_string()))?;
        let mut bytes = [0u8; 32];
        bytes.copy_from_slice(&raw);
        Ok(Self(bytes))
    }

    /// Return the hash as `0x`-prefixed lowercase hex.
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }

    /// Access the raw hash bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Whether this is the all-zero sentinel.
    pub fn is_zero(&self) -> bool {
        *self == Self::ZERO
    }
}

impl From<[u8; 32]> for MachineHash {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

impl std::fmt::Display for MachineHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl std::str::FromStr for MachineHash {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl Serialize for MachineHash {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for MachineHash {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Self::from_hex(&raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_roundtrip() {
        let h = MachineHash::from_bytes([0xab; 32]);
        let parsed = MachineHash::from_hex(&h.to_hex()).unwrap();
        assert_eq!(parsed, h);
    }

    #[test]
    fn from_hex_accepts_unprefixed() {
        let h = MachineHash::from_hex(&"cd".repeat(32)).unwrap();
        assert_eq!(h.as_bytes()[0], 0xcd);
    }

    #[test]
    fn from_hex_rejects_short_input() {
        assert!(MachineHash::from_hex("0x1234").is_err());
    }

    #[test]
    fn from_hex_rejects_non_hex() {
        assert!(MachineHash::from_hex(&"zz".repeat(32)).is_err());
    }

    #[test]
    fn zero_sentinel() {
        assert!(MachineHash::ZERO.is_zero());
        assert!(!MachineHash::from_bytes([1u8; 32]).is_zero());
    }

    #[test]
    fn display_is_prefixed_lowercase() {
        let h = MachineHash::from_bytes([0xAB; 32]);
        let s = format!("{h}");
        assert!(s.starts_with("0x"));
        assert_eq!(s.len(), 66);
        assert_eq!(s, s.to_ascii_lowercase());
    }

    #[test]
    fn serde_roundtrip() {
        let h = MachineHash::from_bytes([7u8; 32]);
        let json = serde_json::to_string(&h).unwrap();
        let back: MachineHash = serde_json::from_str(&json).unwrap();
        assert_eq!(back, h);
    }

    #[test]
    fn deserialize_rejects_invalid() {
        let result: Result<MachineHash, _> = serde_json::from_str("\"0x123\"");
        assert!(result.is_err());
    }
}
