//! Backing-store contract and change-stream subscriptions.
//!
//! The store is the single source of truth; everything local is a disposable
//! projection. The contract mirrors what the hosted datastore offers: bulk
//! queries, inserts, partial updates, and per-collection change feeds with
//! at-least-once delivery in commit order.

use async_trait::async_trait;
use tokio::sync::broadcast;

use crate::core::types::{Guest, GuestPatch, NewGuest, NewWish, RecordId, Wish};
use crate::error::{FeedLost, StoreError};

/// A single change notification for one collection.
#[derive(Debug, Clone)]
pub enum Change<T> {
    Inserted(T),
    Updated(T),
}

impl<T> Change<T> {
    pub fn record(&self) -> &T {
        match self {
            Change::Inserted(record) | Change::Updated(record) => record,
        }
    }
}

/// Live subscription to one collection's change stream.
///
/// Events arrive in store-commit order, at least once: a duplicate insert for
/// an id the consumer already holds is possible and must be ignored by the
/// consumer. Dropping the feed — or the idempotent [`ChangeFeed::close`] —
/// unsubscribes immediately and releases the underlying channel.
#[derive(Debug)]
pub struct ChangeFeed<T> {
    rx: Option<broadcast::Receiver<Change<T>>>,
}

impl<T: Clone> ChangeFeed<T> {
    /// Wrap a raw broadcast receiver; store implementations hand these out
    /// from their `watch_*` methods.
    pub fn new(rx: broadcast::Receiver<Change<T>>) -> Self {
        Self { rx: Some(rx) }
    }

    /// Wait for the next change.
    ///
    /// Any [`FeedLost`] means the subscription is gone and the local cache
    /// may be stale; the feed closes itself so the error is sticky, and the
    /// consumer should resubscribe and bulk-load to reconcile.
    pub async fn next(&mut self) -> Result<Change<T>, FeedLost> {
        let Some(rx) = self.rx.as_mut() else {
            return Err(FeedLost::Closed);
        };
        match rx.recv().await {
            Ok(change) => Ok(change),
            Err(broadcast::error::RecvError::Lagged(missed)) => {
                self.close();
                Err(FeedLost::Lagged { missed })
            }
            Err(broadcast::error::RecvError::Closed) => {
                self.close();
                Err(FeedLost::Closed)
            }
        }
    }

    /// Stop the subscription. Safe to call more than once.
    pub fn close(&mut self) {
        self.rx = None;
    }

    pub fn is_closed(&self) -> bool {
        self.rx.is_none()
    }
}

/// Abstract backing store for the guestbook collections.
///
/// Bulk loads return rows ordered by `(created_at, id)` ascending — the total
/// order arrival indices are derived from. `insert_guests` must return the
/// inserted rows in input order.
#[async_trait]
pub trait Store: Send + Sync + 'static {
    async fn load_wishes(&self) -> Result<Vec<Wish>, StoreError>;

    async fn load_guests(&self) -> Result<Vec<Guest>, StoreError>;

    async fn insert_wish(&self, wish: NewWish) -> Result<Wish, StoreError>;

    async fn insert_guests(&self, guests: Vec<NewGuest>) -> Result<Vec<Guest>, StoreError>;

    async fn update_guest(&self, id: RecordId, patch: GuestPatch) -> Result<Guest, StoreError>;

    async fn watch_wishes(&self) -> ChangeFeed<Wish>;

    async fn watch_guests(&self) -> ChangeFeed<Guest>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::wish;

    #[tokio::test]
    async fn feed_delivers_in_send_order() {
        let (tx, rx) = broadcast::channel(8);
        let mut feed = ChangeFeed::new(rx);
        tx.send(Change::Inserted(wish(1, "a"))).expect("send");
        tx.send(Change::Inserted(wish(2, "b"))).expect("send");

        let first = feed.next().await.expect("first");
        let second = feed.next().await.expect("second");
        assert_eq!(first.record().id.0, 1);
        assert_eq!(second.record().id.0, 2);
    }

    #[tokio::test]
    async fn lag_closes_the_feed() {
        let (tx, rx) = broadcast::channel(1);
        let mut feed = ChangeFeed::new(rx);
        for i in 0..3 {
            tx.send(Change::Inserted(wish(i, "w"))).expect("send");
        }
        assert!(matches!(
            feed.next().await,
            Err(FeedLost::Lagged { missed: 2 })
        ));
        assert!(feed.is_closed());
        // Sticky: once lost, always lost.
        assert!(matches!(feed.next().await, Err(FeedLost::Closed)));
    }

    #[tokio::test]
    async fn sender_drop_closes_the_feed() {
        let (tx, rx) = broadcast::channel::<Change<Wish>>(1);
        let mut feed = ChangeFeed::new(rx);
        drop(tx);
        assert!(matches!(feed.next().await, Err(FeedLost::Closed)));
    }

    #[tokio::test]
    async fn close_is_idempotent() {
        let (_tx, rx) = broadcast::channel::<Change<Wish>>(1);
        let mut feed = ChangeFeed::new(rx);
        feed.close();
        feed.close();
        assert!(feed.is_closed());
    }
}
