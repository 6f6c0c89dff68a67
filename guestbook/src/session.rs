//! Subscription lifecycle: ties the store's change feeds, the view
//! aggregates, and their timers together in one owned task per view.
//!
//! Each session opens its feed *before* the bulk load so no commit between
//! the two is missed (the cache absorbs the resulting duplicates). A lost
//! feed triggers resubscription plus a fresh bulk load to reconcile missed
//! events. `dispose()` is idempotent, stops the task immediately, and cancels
//! every pending popup and highlight deadline; dropping a session disposes
//! it.

use std::sync::Arc;
use std::time::Instant;

use tokio::sync::Mutex;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::core::types::RecordId;
use crate::io::config::GuestbookConfig;
use crate::io::desk::FrontDesk;
use crate::io::store::Store;
use crate::roster::{Roster, RosterDelta, RosterView};
use crate::wall::{LiveWall, WallView};

/// Events broadcast to presentation collaborators of the wish wall.
#[derive(Debug, Clone)]
pub enum WallEvent {
    /// Initial snapshot loaded, or reloaded after a feed loss.
    Loaded { count: usize },
    /// Bulk load failed; the wall is serving an empty, degraded view.
    Unavailable,
    /// A new wish arrived on the stream.
    WishArrived { id: RecordId },
    /// The visible popup changed (started, rotated, or ended).
    PopupChanged,
}

/// Events broadcast to presentation collaborators of the guest roster.
#[derive(Debug, Clone)]
pub enum RosterEvent {
    Loaded { count: usize },
    Unavailable,
    GuestAdded { id: RecordId },
    GuestUpdated { id: RecordId },
}

/// Owning handle for the live wish-wall view.
///
/// Must be spawned from within a tokio runtime.
pub struct WallSession {
    wall: Arc<Mutex<LiveWall>>,
    events: broadcast::Sender<WallEvent>,
    task: JoinHandle<()>,
}

impl WallSession {
    pub fn spawn<S: Store>(store: Arc<S>, config: &GuestbookConfig) -> Self {
        let wall = Arc::new(Mutex::new(LiveWall::new(config)));
        let (events, _) = broadcast::channel(config.event_capacity);
        let task = tokio::spawn(run_wall(
            store,
            Arc::clone(&wall),
            events.clone(),
            config.clone(),
        ));
        Self { wall, events, task }
    }

    /// Subscribe to wall events. Slow subscribers may lag and miss events;
    /// the view itself stays consistent via [`WallSession::view`].
    pub fn subscribe(&self) -> broadcast::Receiver<WallEvent> {
        self.events.subscribe()
    }

    /// Snapshot the current read surface.
    pub async fn view(&self) -> WallView {
        self.wall.lock().await.view(Instant::now())
    }

    /// Shared handle to the underlying aggregate.
    pub fn wall(&self) -> Arc<Mutex<LiveWall>> {
        Arc::clone(&self.wall)
    }

    /// Tear the view down: stop processing events and cancel all pending
    /// popup and highlight deadlines. Safe to call more than once.
    pub fn dispose(&self) {
        self.task.abort();
        if let Ok(mut wall) = self.wall.try_lock() {
            wall.reset();
        }
    }

    pub fn is_disposed(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for WallSession {
    fn drop(&mut self) {
        self.dispose();
    }
}

/// Owning handle for the admin roster view.
///
/// Must be spawned from within a tokio runtime.
pub struct RosterSession {
    roster: Arc<Mutex<Roster>>,
    events: broadcast::Sender<RosterEvent>,
    task: JoinHandle<()>,
}

impl RosterSession {
    pub fn spawn<S: Store>(store: Arc<S>, config: &GuestbookConfig) -> Self {
        let roster = Arc::new(Mutex::new(Roster::new(config)));
        let (events, _) = broadcast::channel(config.event_capacity);
        let task = tokio::spawn(run_roster(
            store,
            Arc::clone(&roster),
            events.clone(),
            config.clone(),
        ));
        Self {
            roster,
            events,
            task,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<RosterEvent> {
        self.events.subscribe()
    }

    /// Snapshot the current read surface, optionally filtered by a search
    /// query.
    pub async fn view(&self, query: Option<&str>) -> RosterView {
        self.roster.lock().await.view(query, Instant::now())
    }

    /// Full-snapshot attendance statistics.
    pub async fn stats(&self) -> crate::core::stats::AttendanceStats {
        self.roster.lock().await.stats()
    }

    /// Shared handle to the underlying aggregate.
    pub fn roster(&self) -> Arc<Mutex<Roster>> {
        Arc::clone(&self.roster)
    }

    /// Build the admin mutation surface bound to this view's roster.
    pub fn desk<S: Store>(&self, store: Arc<S>) -> FrontDesk<S> {
        FrontDesk::new(store, self.roster())
    }

    /// Tear the view down; idempotent, cancels pending highlight deadlines.
    pub fn dispose(&self) {
        self.task.abort();
        if let Ok(mut roster) = self.roster.try_lock() {
            roster.reset();
        }
    }

    pub fn is_disposed(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for RosterSession {
    fn drop(&mut self) {
        self.dispose();
    }
}

async fn run_wall<S: Store>(
    store: Arc<S>,
    wall: Arc<Mutex<LiveWall>>,
    events: broadcast::Sender<WallEvent>,
    config: GuestbookConfig,
) {
    let mut first = true;
    loop {
        if !first {
            tokio::time::sleep(config.resubscribe_delay()).await;
        }
        first = false;

        // Subscribe before loading so nothing committed in between is missed.
        let mut feed = store.watch_wishes().await;
        match store.load_wishes().await {
            Ok(rows) => {
                let count = rows.len();
                wall.lock().await.load(rows);
                info!(count, "wish wall loaded");
                let _ = events.send(WallEvent::Loaded { count });
            }
            Err(err) => {
                warn!(error = %err, "wish bulk load failed, serving degraded wall");
                wall.lock().await.mark_unavailable();
                let _ = events.send(WallEvent::Unavailable);
            }
        }

        loop {
            let deadline = {
                let mut wall = wall.lock().await;
                if wall.tick(Instant::now()) {
                    let _ = events.send(WallEvent::PopupChanged);
                }
                wall.next_deadline()
            };

            tokio::select! {
                change = feed.next() => match change {
                    Ok(change) => {
                        let arrived = wall.lock().await.apply(change, Instant::now());
                        if let Some(id) = arrived {
                            let _ = events.send(WallEvent::WishArrived { id });
                        }
                    }
                    Err(lost) => {
                        warn!(error = %lost, "wish feed lost, resubscribing");
                        break;
                    }
                },
                () = wait_until(deadline) => {}
            }
        }
    }
}

async fn run_roster<S: Store>(
    store: Arc<S>,
    roster: Arc<Mutex<Roster>>,
    events: broadcast::Sender<RosterEvent>,
    config: GuestbookConfig,
) {
    let mut first = true;
    loop {
        if !first {
            tokio::time::sleep(config.resubscribe_delay()).await;
        }
        first = false;

        let mut feed = store.watch_guests().await;
        match store.load_guests().await {
            Ok(rows) => {
                let count = rows.len();
                roster.lock().await.load(rows);
                info!(count, "guest roster loaded");
                let _ = events.send(RosterEvent::Loaded { count });
            }
            Err(err) => {
                warn!(error = %err, "guest bulk load failed, serving degraded roster");
                roster.lock().await.mark_unavailable();
                let _ = events.send(RosterEvent::Unavailable);
            }
        }

        loop {
            let deadline = {
                let mut roster = roster.lock().await;
                roster.tick(Instant::now());
                roster.next_deadline()
            };

            tokio::select! {
                change = feed.next() => match change {
                    Ok(change) => {
                        let delta = roster.lock().await.apply(change, Instant::now());
                        match delta {
                            Some(RosterDelta::Added(id)) => {
                                let _ = events.send(RosterEvent::GuestAdded { id });
                            }
                            Some(RosterDelta::Updated(id)) => {
                                let _ = events.send(RosterEvent::GuestUpdated { id });
                            }
                            None => {}
                        }
                    }
                    Err(lost) => {
                        warn!(error = %lost, "guest feed lost, resubscribing");
                        break;
                    }
                },
                () = wait_until(deadline) => {}
            }
        }
    }
}

/// Sleep until `deadline`, or forever when there is no pending deadline —
/// the select's other arm stays responsible for waking up.
async fn wait_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => {
            let now = Instant::now();
            tokio::time::sleep(deadline.saturating_duration_since(now)).await;
        }
        None => std::future::pending().await,
    }
}
