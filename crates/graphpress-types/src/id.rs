use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;
use uuid::Uuid;

/// Width of a node or edge ID in hex characters.
pub const ID_HEX_LEN: usize = 32;

/// Identifier shared by graph nodes and edges: 128 bits rendered as
/// 32 hex characters. Parsing accepts either case, display is lowercase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GraphId([u8; 16]);

#[derive(Debug, Error, PartialEq)]
pub enum InvalidId {
    #[error("expected 32 hex characters, got {0} bytes")]
    Length(usize),
    #[error("not a hex string: {0}")]
    NotHex(#[from] hex::FromHexError),
}

impl GraphId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().into_bytes())
    }
}

impl FromStr for GraphId {
    type Err = InvalidId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != ID_HEX_LEN {
            return Err(InvalidId::Length(s.len()));
        }
        let mut bytes = [0u8; 16];
        hex::decode_to_slice(s, &mut bytes)?;
        Ok(Self(bytes))
    }
}

impl fmt::Display for GraphId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl Serialize for GraphId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for GraphId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
