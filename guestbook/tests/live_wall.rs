//! End-to-end wall session tests: stream → snapshot cache → popup queue,
//! highlights, and lanes, against the in-memory store.

use std::sync::Arc;
use std::time::Duration;

use guestbook::io::config::GuestbookConfig;
use guestbook::io::memory::MemoryStore;
use guestbook::io::store::Store;
use guestbook::session::{WallEvent, WallSession};
use guestbook::core::types::NewWish;

fn test_config() -> GuestbookConfig {
    GuestbookConfig {
        resubscribe_delay_ms: 10,
        ..GuestbookConfig::default()
    }
}

async fn settle() {
    tokio::time::sleep(Duration::from_millis(100)).await;
}

fn new_wish(name: &str) -> NewWish {
    NewWish {
        name: name.to_string(),
        message: format!("{name} says congrats"),
    }
}

#[tokio::test]
async fn loads_snapshot_then_appends_live_arrivals_in_order() {
    let store = Arc::new(MemoryStore::new());
    let a = store.insert_wish(new_wish("Budi")).await.expect("insert");
    let b = store.insert_wish(new_wish("Siti")).await.expect("insert");

    let session = WallSession::spawn(Arc::clone(&store), &test_config());
    settle().await;

    let view = session.view().await;
    assert!(view.available);
    assert_eq!(view.total, 2);
    assert_eq!(view.wishes[0].id, a.id);
    assert_eq!(view.wishes[1].id, b.id);

    let c = store.insert_wish(new_wish("Joko")).await.expect("insert");
    settle().await;

    let view = session.view().await;
    assert_eq!(view.total, 3);
    assert_eq!(view.wishes[2].id, c.id);

    // Lane assignment is arrival-index mod lane-count, stable under growth.
    assert_eq!(view.lanes[0].wishes[0].id, a.id);
    assert_eq!(view.lanes[1].wishes[0].id, b.id);
    assert_eq!(view.lanes[2].wishes[0].id, c.id);
}

#[tokio::test]
async fn live_arrival_is_highlighted_and_announced() {
    let store = Arc::new(MemoryStore::new());
    let session = WallSession::spawn(Arc::clone(&store), &test_config());
    settle().await;

    let mut events = session.subscribe();
    let wish = store.insert_wish(new_wish("Budi")).await.expect("insert");
    settle().await;

    let view = session.view().await;
    assert!(view.fresh.contains(&wish.id));
    assert_eq!(view.popup.map(|p| p.id), Some(wish.id));

    let mut saw_arrival = false;
    while let Ok(event) = events.try_recv() {
        if matches!(event, WallEvent::WishArrived { id } if id == wish.id) {
            saw_arrival = true;
        }
    }
    assert!(saw_arrival);
}

#[tokio::test]
async fn duplicate_delivery_is_ignored() {
    let store = Arc::new(MemoryStore::new());
    let session = WallSession::spawn(Arc::clone(&store), &test_config());
    settle().await;

    let wish = store.insert_wish(new_wish("Budi")).await.expect("insert");
    settle().await;
    assert_eq!(session.view().await.total, 1);

    // At-least-once delivery: the same insert event shows up again.
    store.replay_wish_insert(wish.clone()).await;
    store.replay_wish_insert(wish).await;
    settle().await;

    assert_eq!(session.view().await.total, 1);
}

#[tokio::test]
async fn lost_feed_resubscribes_and_reloads() {
    let store = Arc::new(MemoryStore::new());
    let session = WallSession::spawn(Arc::clone(&store), &test_config());
    settle().await;

    store.insert_wish(new_wish("Budi")).await.expect("insert");
    settle().await;
    assert_eq!(session.view().await.total, 1);

    // Connection drops; the insert below lands while we are resubscribing
    // and is recovered by the fresh bulk load.
    store.interrupt_feeds().await;
    store.insert_wish(new_wish("Siti")).await.expect("insert");
    settle().await;

    let view = session.view().await;
    assert!(view.available);
    assert_eq!(view.total, 2);

    // And the new subscription keeps delivering live events.
    store.insert_wish(new_wish("Joko")).await.expect("insert");
    settle().await;
    assert_eq!(session.view().await.total, 3);
}

#[tokio::test]
async fn failed_bulk_load_degrades_but_stream_still_applies() {
    let store = Arc::new(MemoryStore::new());
    store.insert_wish(new_wish("Budi")).await.expect("insert");
    store.set_unavailable(true);

    let session = WallSession::spawn(Arc::clone(&store), &test_config());
    settle().await;

    let view = session.view().await;
    assert!(!view.available);
    assert_eq!(view.total, 0);

    // The subscription survived the failed load: live inserts still arrive.
    store.set_unavailable(false);
    store.insert_wish(new_wish("Siti")).await.expect("insert");
    settle().await;

    let view = session.view().await;
    assert!(!view.available);
    assert_eq!(view.total, 1);
    assert_eq!(view.wishes[0].name, "Siti");
}

#[tokio::test]
async fn dispose_stops_processing_and_is_idempotent() {
    let store = Arc::new(MemoryStore::new());
    let session = WallSession::spawn(Arc::clone(&store), &test_config());
    settle().await;

    store.insert_wish(new_wish("Budi")).await.expect("insert");
    settle().await;
    assert_eq!(session.view().await.total, 1);

    session.dispose();
    session.dispose();
    settle().await;
    assert!(session.is_disposed());

    // Popup and highlight deadlines were cancelled with the view.
    let view = session.view().await;
    assert!(view.popup.is_none());
    assert!(view.fresh.is_empty());

    store.insert_wish(new_wish("Siti")).await.expect("insert");
    settle().await;
    assert_eq!(session.view().await.total, 1);
}
