//! In-memory backing store.
//!
//! Reference implementation of [`Store`] used by tests and `guestbook-ui`:
//! mutexed tables, monotonically increasing ids, creation timestamps stamped
//! at insert, and per-collection broadcast channels backing the change feeds.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;
use tokio::sync::broadcast;

use crate::core::types::{Guest, GuestPatch, NewGuest, NewWish, RecordId, Wish};
use crate::error::StoreError;
use crate::io::store::{Change, ChangeFeed, Store};

const DEFAULT_FEED_CAPACITY: usize = 64;

struct Tables {
    wishes: Vec<Wish>,
    guests: Vec<Guest>,
    next_id: u64,
    wish_tx: broadcast::Sender<Change<Wish>>,
    guest_tx: broadcast::Sender<Change<Guest>>,
}

impl Tables {
    fn assign_id(&mut self) -> RecordId {
        let id = RecordId(self.next_id);
        self.next_id += 1;
        id
    }
}

/// In-memory [`Store`]. Cloning shares the same tables and feeds.
#[derive(Clone)]
pub struct MemoryStore {
    inner: Arc<Mutex<Tables>>,
    unavailable: Arc<AtomicBool>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::with_feed_capacity(DEFAULT_FEED_CAPACITY)
    }

    /// A store whose change feeds buffer at most `capacity` events per
    /// subscriber before the subscriber is considered lagged.
    pub fn with_feed_capacity(capacity: usize) -> Self {
        let (wish_tx, _) = broadcast::channel(capacity);
        let (guest_tx, _) = broadcast::channel(capacity);
        Self {
            inner: Arc::new(Mutex::new(Tables {
                wishes: Vec::new(),
                guests: Vec::new(),
                next_id: 1,
                wish_tx,
                guest_tx,
            })),
            unavailable: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Fault injection: while set, every query/insert/update fails with
    /// [`StoreError::Unavailable`]. Existing feeds keep working.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn check_available(&self) -> Result<(), StoreError> {
        if self.unavailable.load(Ordering::SeqCst) {
            Err(StoreError::Unavailable("store marked unavailable".to_string()))
        } else {
            Ok(())
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn load_wishes(&self) -> Result<Vec<Wish>, StoreError> {
        self.check_available()?;
        let tables = self.inner.lock().await;
        let mut rows = tables.wishes.clone();
        rows.sort_by_key(|w| (w.created_at, w.id));
        Ok(rows)
    }

    async fn load_guests(&self) -> Result<Vec<Guest>, StoreError> {
        self.check_available()?;
        let tables = self.inner.lock().await;
        let mut rows = tables.guests.clone();
        rows.sort_by_key(|g| (g.created_at, g.id));
        Ok(rows)
    }

    async fn insert_wish(&self, wish: NewWish) -> Result<Wish, StoreError> {
        self.check_available()?;
        let mut tables = self.inner.lock().await;
        let row = Wish {
            id: tables.assign_id(),
            name: wish.name,
            message: wish.message,
            created_at: Utc::now(),
        };
        tables.wishes.push(row.clone());
        let _ = tables.wish_tx.send(Change::Inserted(row.clone()));
        Ok(row)
    }

    async fn insert_guests(&self, guests: Vec<NewGuest>) -> Result<Vec<Guest>, StoreError> {
        self.check_available()?;
        let mut tables = self.inner.lock().await;
        let mut inserted = Vec::with_capacity(guests.len());
        for guest in guests {
            let row = Guest {
                id: tables.assign_id(),
                name: guest.name,
                slug: guest.slug,
                category: guest.category,
                attendance_status: guest.attendance_status,
                pax: guest.pax,
                created_at: Utc::now(),
                updated_at: None,
            };
            tables.guests.push(row.clone());
            let _ = tables.guest_tx.send(Change::Inserted(row.clone()));
            inserted.push(row);
        }
        Ok(inserted)
    }

    async fn update_guest(&self, id: RecordId, patch: GuestPatch) -> Result<Guest, StoreError> {
        self.check_available()?;
        let mut tables = self.inner.lock().await;
        let Some(row) = tables.guests.iter_mut().find(|g| g.id == id) else {
            return Err(StoreError::NotFound(id));
        };
        patch.apply_to(row);
        let updated = row.clone();
        let _ = tables.guest_tx.send(Change::Updated(updated.clone()));
        Ok(updated)
    }

    async fn watch_wishes(&self) -> ChangeFeed<Wish> {
        let tables = self.inner.lock().await;
        ChangeFeed::new(tables.wish_tx.subscribe())
    }

    async fn watch_guests(&self) -> ChangeFeed<Guest> {
        let tables = self.inner.lock().await;
        ChangeFeed::new(tables.guest_tx.subscribe())
    }
}

#[cfg(any(test, feature = "test-support"))]
impl MemoryStore {
    /// Re-broadcast an insert notification for a wish already in the table,
    /// simulating the stream's at-least-once redelivery.
    pub async fn replay_wish_insert(&self, wish: Wish) {
        let tables = self.inner.lock().await;
        let _ = tables.wish_tx.send(Change::Inserted(wish));
    }

    /// Tear down the current change feeds, simulating a lost connection.
    ///
    /// Existing subscribers observe `FeedLost::Closed` once they drain;
    /// subsequent `watch_*` calls subscribe to fresh feeds.
    pub async fn interrupt_feeds(&self) {
        let mut tables = self.inner.lock().await;
        let capacity = DEFAULT_FEED_CAPACITY;
        let (wish_tx, _) = broadcast::channel(capacity);
        let (guest_tx, _) = broadcast::channel(capacity);
        tables.wish_tx = wish_tx;
        tables.guest_tx = guest_tx;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ledger;
    use crate::core::types::{AttendanceStatus, GuestCategory};

    fn new_guest(name: &str) -> NewGuest {
        NewGuest {
            name: name.to_string(),
            slug: crate::core::slug::derive_slug(name),
            category: GuestCategory::Couple,
            attendance_status: AttendanceStatus::None,
            pax: 0,
        }
    }

    #[tokio::test]
    async fn insert_assigns_monotonic_ids_and_broadcasts() {
        let store = MemoryStore::new();
        let mut feed = store.watch_wishes().await;

        let a = store
            .insert_wish(NewWish {
                name: "Budi".to_string(),
                message: "selamat".to_string(),
            })
            .await
            .expect("insert");
        let b = store
            .insert_wish(NewWish {
                name: "Siti".to_string(),
                message: "bahagia".to_string(),
            })
            .await
            .expect("insert");
        assert!(a.id < b.id);

        let first = feed.next().await.expect("event");
        assert_eq!(first.record().id, a.id);
        let second = feed.next().await.expect("event");
        assert_eq!(second.record().id, b.id);

        let rows = store.load_wishes().await.expect("load");
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].id, a.id);
    }

    #[tokio::test]
    async fn update_patches_in_place_and_broadcasts() {
        let store = MemoryStore::new();
        let inserted = store
            .insert_guests(vec![new_guest("Budi Santoso")])
            .await
            .expect("insert");
        let id = inserted[0].id;

        let mut feed = store.watch_guests().await;
        let patch = ledger::check_in(2, Utc::now()).expect("valid pax");
        let updated = store.update_guest(id, patch).await.expect("update");
        assert!(updated.is_present());
        assert_eq!(updated.pax, 2);

        let event = feed.next().await.expect("event");
        assert!(matches!(event, Change::Updated(ref g) if g.id == id && g.pax == 2));
    }

    #[tokio::test]
    async fn update_unknown_guest_is_not_found() {
        let store = MemoryStore::new();
        let patch = ledger::cancel(Utc::now());
        assert_eq!(
            store.update_guest(RecordId(99), patch).await,
            Err(StoreError::NotFound(RecordId(99)))
        );
    }

    #[tokio::test]
    async fn unavailable_store_fails_every_operation() {
        let store = MemoryStore::new();
        store.set_unavailable(true);
        assert!(matches!(
            store.load_wishes().await,
            Err(StoreError::Unavailable(_))
        ));
        assert!(matches!(
            store
                .insert_wish(NewWish {
                    name: "x".to_string(),
                    message: "y".to_string(),
                })
                .await,
            Err(StoreError::Unavailable(_))
        ));
        store.set_unavailable(false);
        assert!(store.load_wishes().await.is_ok());
    }

    #[tokio::test]
    async fn interrupt_closes_existing_feeds_but_new_ones_work() {
        let store = MemoryStore::new();
        let mut old = store.watch_wishes().await;
        store.interrupt_feeds().await;
        assert!(old.next().await.is_err());

        let mut fresh = store.watch_wishes().await;
        store
            .insert_wish(NewWish {
                name: "Budi".to_string(),
                message: "selamat".to_string(),
            })
            .await
            .expect("insert");
        assert!(fresh.next().await.is_ok());
    }
}
