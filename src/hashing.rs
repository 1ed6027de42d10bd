// hashing.rs

use serde::{Serialize, Serializer};
use sha3::{Digest, Keccak256};
use std::fmt;

/// 32-byte value used for address hashes, payment references and Merkle nodes
///
/// Renders as `0x`-prefixed lowercase hex, which is also its JSON form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Bytes32(pub [u8; 32]);

impl Bytes32 {
    /// All-zero sentinel used when no valid payment reference exists
    pub const ZERO: Bytes32 = Bytes32([0u8; 32]);

    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|b| *b == 0)
    }

    /// Parse a 64-char hex string, with or without `0x` prefix
    pub fn from_hex(value: &str) -> Option<Self> {
        let raw = unprefix_0x(value);
        if raw.len() != 64 {
            return None;
        }
        let bytes = hex::decode(raw).ok()?;
        let mut out = [0u8; 32];
        out.copy_from_slice(&bytes);
        Some(Bytes32(out))
    }

    pub fn from_slice(bytes: &[u8]) -> Option<Self> {
        if bytes.len() != 32 {
            return None;
        }
        let mut out = [0u8; 32];
        out.copy_from_slice(bytes);
        Some(Bytes32(out))
    }

    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for Bytes32 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl Serialize for Bytes32 {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_hex())
    }
}

pub fn keccak256(data: &[u8]) -> Bytes32 {
    let digest = Keccak256::digest(data);
    let mut out = [0u8; 32];
    out.copy_from_slice(&digest);
    Bytes32(out)
}

/// Canonical hash of an address: Keccak-256 over its UTF-8 text
///
/// Used for Merkle leaves, summary address hashes and balance-decreasing
/// source indicators alike.
pub fn standard_address_hash(address: &str) -> Bytes32 {
    keccak256(address.as_bytes())
}

pub fn unprefix_0x(value: &str) -> &str {
    value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
        .unwrap_or(value)
}

pub fn prefix_0x(value: &str) -> String {
    if value.starts_with("0x") || value.starts_with("0X") {
        value.to_string()
    } else {
        format!("0x{}", value)
    }
}

/// True when `value` is exactly 32 bytes of hex (prefix optional)
pub fn is_valid_bytes32_hex(value: &str) -> bool {
    Bytes32::from_hex(value).is_some()
}

/// Standardized payment reference from a list of raw references
///
/// Exactly one well-formed 32-byte reference is required; anything else
/// yields the zero sentinel.
pub fn standardize_reference(references: &[String]) -> Bytes32 {
    match references {
        [only] => Bytes32::from_hex(only).unwrap_or(Bytes32::ZERO),
        _ => Bytes32::ZERO,
    }
}
