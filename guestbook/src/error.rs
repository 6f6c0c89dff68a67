//! Typed errors for the guestbook core.
//!
//! Validation failures (`DuplicateIdentity`, `InvalidPax`, blank fields) are
//! surfaced to the caller before any write is attempted; store and feed
//! failures are recoverable at the view level by retry or a full cache
//! rebuild. Nothing in this module is fatal to the process.

use thiserror::Error;

use crate::core::types::RecordId;

/// Failure talking to the backing store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum StoreError {
    /// The store could not be reached or refused the operation.
    #[error("backing store unavailable: {0}")]
    Unavailable(String),
    /// An update referenced a record the store does not hold.
    #[error("record {0} not found")]
    NotFound(RecordId),
}

/// A live change feed stopped delivering events.
///
/// Either way the local cache must be considered stale: resubscribe and
/// perform a fresh bulk load to reconcile anything missed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FeedLost {
    /// The subscriber fell behind and the store dropped events.
    #[error("change feed lagged, {missed} events were dropped")]
    Lagged { missed: u64 },
    /// The store side of the subscription went away.
    #[error("change feed closed by the store")]
    Closed,
}

/// Guest registration failure.
#[derive(Debug, Error)]
pub enum RegisterError {
    /// The derived slug collides with a guest already on the roster.
    #[error("a guest with slug '{slug}' already exists")]
    DuplicateIdentity { slug: String },
    /// The name was empty after trimming.
    #[error("guest name must not be blank")]
    EmptyName,
    /// Party size for a register-and-check-in must be a positive integer.
    #[error("party size must be a positive integer, got {0}")]
    InvalidPax(i64),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Check-in / cancellation failure.
#[derive(Debug, Error)]
pub enum CheckInError {
    /// Party size must be a positive integer.
    #[error("party size must be a positive integer, got {0}")]
    InvalidPax(i64),
    /// No guest with this id exists.
    #[error("unknown guest {0}")]
    UnknownGuest(RecordId),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Wish submission failure.
#[derive(Debug, Error)]
pub enum WishError {
    /// Name or message was empty after trimming.
    #[error("name and message must not be blank")]
    EmptyField,
    #[error(transparent)]
    Store(#[from] StoreError),
}
