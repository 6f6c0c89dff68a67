//! Real-time engagement synchronization for a wedding-invitation app: the
//! live wall of wishes and the guest attendance roster, kept in sync with a
//! shared backing store.
//!
//! The architecture enforces a strict separation:
//!
//! - **[`core`]**: Pure, deterministic logic (snapshot merging, the popup
//!   queue, freshness highlighting, lane distribution, attendance
//!   transitions, statistics). No I/O, no clocks of its own, fully testable
//!   in isolation.
//! - **[`io`]**: Side-effecting operations (the backing-store contract and
//!   its in-memory implementation, admin entry points, configuration).
//!
//! View modules ([`wall`], [`roster`]) compose core state per view, and
//! [`session`] drives them from the store's change feeds with an explicit
//! dispose contract: every subscription and timer dies with its session.

pub mod core;
pub mod error;
pub mod io;
pub mod logging;
pub mod roster;
pub mod session;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
pub mod wall;
