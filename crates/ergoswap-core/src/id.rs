use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::CoreError;

/// A 32-byte chain-level token id
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssetId(#[serde(with = "hex_bytes")] pub [u8; 32]);

/// A 32-byte liquidity pool id
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PoolId(#[serde(with = "hex_bytes")] pub [u8; 32]);

impl AssetId {
    /// The chain's native asset
    pub const NATIVE: AssetId = AssetId([0u8; 32]);

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn is_native(&self) -> bool {
        *self == Self::NATIVE
    }

    pub fn from_hex(s: &str) -> Result<Self, CoreError> {
        decode_32(s).map(AssetId)
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Derive a stable id from a label. Handy for fixtures and sample configs.
    pub fn derive(label: &str) -> Self {
        AssetId(*blake3::hash(label.as_bytes()).as_bytes())
    }
}

impl PoolId {
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn from_hex(s: &str) -> Result<Self, CoreError> {
        decode_32(s).map(PoolId)
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

fn decode_32(s: &str) -> Result<[u8; 32], CoreError> {
    let bytes = hex::decode(s)?;
    if bytes.len() != 32 {
        return Err(CoreError::InvalidIdLength);
    }
    let mut out = [0u8; 32];
    out.copy_from_slice(&bytes);
    Ok(out)
}

impl fmt::Debug for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AssetId({})", self.to_hex())
    }
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl fmt::Debug for PoolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PoolId({})", self.to_hex())
    }
}

impl fmt::Display for PoolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

mod hex_bytes {
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8; 32], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<[u8; 32], D::Error> {
        let s = String::deserialize(deserializer)?;
        super::decode_32(&s).map_err(D::Error::custom)
    }
}
