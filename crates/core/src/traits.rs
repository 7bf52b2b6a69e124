//! Core traits shared between storage and concurrency
//!
//! Version chains live in the storage crate, transactions in the concurrency
//! crate. A chain only needs to know who is reading and as of when, so the
//! seam between the two is the `TxnView` trait.

use crate::types::{Timestamp, TxnId};

/// What a version chain needs to know about a reading transaction
///
/// # Examples
///
/// ```
/// use kvmodel_core::{Timestamp, TxnId, TxnView};
///
/// struct Reader(TxnId);
///
/// impl TxnView for Reader {
///     fn txn_id(&self) -> TxnId {
///         self.0
///     }
///     fn read_timestamp(&self) -> Timestamp {
///         Timestamp::NONE
///     }
/// }
///
/// let r = Reader(TxnId::new(3));
/// assert_eq!(r.effective_read_timestamp(), Timestamp::LATEST);
/// ```
pub trait TxnView {
    /// Identifier of the transaction
    fn txn_id(&self) -> TxnId;

    /// Read timestamp, `Timestamp::NONE` if the transaction has none
    fn read_timestamp(&self) -> Timestamp;

    /// Timestamp to filter committed versions with
    ///
    /// A transaction without a read timestamp reads as `LATEST`.
    fn effective_read_timestamp(&self) -> Timestamp {
        let ts = self.read_timestamp();
        if ts.is_none() {
            Timestamp::LATEST
        } else {
            ts
        }
    }
}
