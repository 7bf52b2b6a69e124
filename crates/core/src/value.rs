//! Value type for kvmodel
//!
//! A value is either present with payload bytes or a tombstone marking the
//! key as deleted at that point of its version chain.
//!
//! ## Equality
//!
//! - Two tombstones are equal
//! - Two present values are equal iff their payloads are identical
//! - A tombstone never equals a present value, not even an empty payload

use serde::{Deserialize, Serialize};

/// Payload of a version record
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Value {
    /// Present value with payload bytes
    Bytes(Vec<u8>),
    /// Deletion marker
    Tombstone,
}

impl Value {
    /// Create a present value
    pub fn bytes(payload: impl Into<Vec<u8>>) -> Self {
        Value::Bytes(payload.into())
    }

    /// Check if this is a deletion marker
    #[inline]
    pub fn is_tombstone(&self) -> bool {
        matches!(self, Value::Tombstone)
    }

    /// Check if this value carries a payload
    #[inline]
    pub fn is_present(&self) -> bool {
        !self.is_tombstone()
    }

    /// Borrow the payload, `None` for a tombstone
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Bytes(b) => Some(b),
            Value::Tombstone => None,
        }
    }

    /// Consume and return the payload, `None` for a tombstone
    pub fn into_bytes(self) -> Option<Vec<u8>> {
        match self {
            Value::Bytes(b) => Some(b),
            Value::Tombstone => None,
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Bytes(s.as_bytes().to_vec())
    }
}

impl From<Vec<u8>> for Value {
    fn from(b: Vec<u8>) -> Self {
        Value::Bytes(b)
    }
}

impl From<&[u8]> for Value {
    fn from(b: &[u8]) -> Self {
        Value::Bytes(b.to_vec())
    }
}
