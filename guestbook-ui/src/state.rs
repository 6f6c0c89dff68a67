//! Shared application state for the UI server.

use std::sync::Arc;

use guestbook::io::config::GuestbookConfig;
use guestbook::io::desk::FrontDesk;
use guestbook::io::memory::MemoryStore;
use guestbook::session::{RosterSession, WallSession};

/// Shared state accessible from all request handlers.
///
/// One wall session and one roster session serve every connected client;
/// each session owns its own subscription and timers and is torn down with
/// the process.
#[derive(Clone)]
pub struct AppState {
    pub wall: Arc<WallSession>,
    pub roster: Arc<RosterSession>,
    pub desk: Arc<FrontDesk<MemoryStore>>,
}

impl AppState {
    pub fn new(config: &GuestbookConfig) -> Self {
        let store = Arc::new(MemoryStore::new());
        let wall = Arc::new(WallSession::spawn(Arc::clone(&store), config));
        let roster = Arc::new(RosterSession::spawn(Arc::clone(&store), config));
        let desk = Arc::new(roster.desk(store));
        Self { wall, roster, desk }
    }
}
