//! Identity and time types for kvmodel
//!
//! This module defines:
//! - Timestamp: Logical time with `NONE` (unresolved) and `LATEST` sentinels
//! - TxnId: Transaction identifier, `NONE` reserved for unattributed records
//! - Key: Opaque byte key of a table item

use serde::{Deserialize, Serialize};
use std::fmt;

/// Logical timestamp
///
/// Timestamps are opaque, totally ordered `u64` values handed out by the
/// timestamp oracle. Two values are reserved:
///
/// - `Timestamp::NONE` (0): unresolved, e.g. a commit timestamp not yet fixed
///   or a transaction with no read timestamp
/// - `Timestamp::LATEST` (`u64::MAX`): ignore timestamp filtering and read the
///   most recent committed version
///
/// Every other value is a real timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp(u64);

impl Timestamp {
    /// Unresolved timestamp
    pub const NONE: Timestamp = Timestamp(0);

    /// Read the latest committed version regardless of its timestamp
    pub const LATEST: Timestamp = Timestamp(u64::MAX);

    /// Create a timestamp from a raw value
    #[inline]
    pub const fn new(ts: u64) -> Self {
        Timestamp(ts)
    }

    /// Raw value
    #[inline]
    pub const fn as_u64(&self) -> u64 {
        self.0
    }

    /// Check for the `NONE` sentinel
    #[inline]
    pub const fn is_none(&self) -> bool {
        self.0 == Self::NONE.0
    }

    /// Check for the `LATEST` sentinel
    #[inline]
    pub const fn is_latest(&self) -> bool {
        self.0 == Self::LATEST.0
    }

    /// True unless this is one of the two sentinels
    #[inline]
    pub const fn is_real(&self) -> bool {
        !self.is_none() && !self.is_latest()
    }
}

impl From<u64> for Timestamp {
    fn from(ts: u64) -> Self {
        Timestamp(ts)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_none() {
            write!(f, "NONE")
        } else if self.is_latest() {
            write!(f, "LATEST")
        } else {
            write!(f, "{}", self.0)
        }
    }
}

/// Transaction identifier
///
/// Unique per transaction for the lifetime of a database. `TxnId::NONE`
/// marks a record that is not attributed to any transaction and is never
/// handed out by the oracle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TxnId(u64);

impl TxnId {
    /// Reserved, never allocated
    pub const NONE: TxnId = TxnId(0);

    /// Create a transaction id from a raw value
    #[inline]
    pub const fn new(id: u64) -> Self {
        TxnId(id)
    }

    /// Raw value
    #[inline]
    pub const fn as_u64(&self) -> u64 {
        self.0
    }

    /// Check for the `NONE` sentinel
    #[inline]
    pub const fn is_none(&self) -> bool {
        self.0 == Self::NONE.0
    }
}

impl From<u64> for TxnId {
    fn from(id: u64) -> Self {
        TxnId(id)
    }
}

impl fmt::Display for TxnId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "txn:{}", self.0)
    }
}

/// Key of a table item
///
/// Keys are opaque bytes. Convenience conversions exist for strings so
/// tests and drivers can write `Key::from("x")`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Key(Vec<u8>);

impl Key {
    /// Create a key from raw bytes
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Key(bytes.into())
    }

    /// Raw key bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl From<&str> for Key {
    fn from(s: &str) -> Self {
        Key(s.as_bytes().to_vec())
    }
}

impl From<String> for Key {
    fn from(s: String) -> Self {
        Key(s.into_bytes())
    }
}

impl From<&[u8]> for Key {
    fn from(b: &[u8]) -> Self {
        Key(b.to_vec())
    }
}

impl From<Vec<u8>> for Key {
    fn from(b: Vec<u8>) -> Self {
        Key(b)
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", String::from_utf8_lossy(&self.0))
    }
}
