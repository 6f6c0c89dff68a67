//! Server-Sent Events stream of wall and roster changes.

use std::convert::Infallible;
use std::time::Duration;

use axum::extract::State;
use axum::response::sse::{Event, Sse};
use futures::stream::Stream;
use serde::Serialize;
use tokio::sync::broadcast;
use tracing::warn;

use guestbook::session::{RosterEvent, WallEvent};

use crate::state::AppState;

#[derive(Serialize)]
struct SsePayload {
    #[serde(rename = "type")]
    event_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    count: Option<usize>,
}

impl SsePayload {
    fn bare(event_type: &str) -> Self {
        SsePayload {
            event_type: event_type.to_string(),
            id: None,
            count: None,
        }
    }
}

impl From<&WallEvent> for SsePayload {
    fn from(event: &WallEvent) -> Self {
        match event {
            WallEvent::Loaded { count } => SsePayload {
                count: Some(*count),
                ..SsePayload::bare("wall_loaded")
            },
            WallEvent::Unavailable => SsePayload::bare("wall_unavailable"),
            WallEvent::WishArrived { id } => SsePayload {
                id: Some(id.0),
                ..SsePayload::bare("wish_arrived")
            },
            WallEvent::PopupChanged => SsePayload::bare("popup_changed"),
        }
    }
}

impl From<&RosterEvent> for SsePayload {
    fn from(event: &RosterEvent) -> Self {
        match event {
            RosterEvent::Loaded { count } => SsePayload {
                count: Some(*count),
                ..SsePayload::bare("roster_loaded")
            },
            RosterEvent::Unavailable => SsePayload::bare("roster_unavailable"),
            RosterEvent::GuestAdded { id } => SsePayload {
                id: Some(id.0),
                ..SsePayload::bare("guest_added")
            },
            RosterEvent::GuestUpdated { id } => SsePayload {
                id: Some(id.0),
                ..SsePayload::bare("guest_updated")
            },
        }
    }
}

/// SSE endpoint handler: one merged stream of both sessions' events.
pub async fn events_handler(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let mut wall_rx = state.wall.subscribe();
    let mut roster_rx = state.roster.subscribe();

    let stream = async_stream::stream! {
        // Send initial connected event
        yield Ok(Event::default().event("connected").data("{}"));

        loop {
            let payload = tokio::select! {
                event = wall_rx.recv() => match event {
                    Ok(event) => Some(SsePayload::from(&event)),
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        warn!(skipped = n, "SSE client lagged, some wall events dropped");
                        None
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                },
                event = roster_rx.recv() => match event {
                    Ok(event) => Some(SsePayload::from(&event)),
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        warn!(skipped = n, "SSE client lagged, some roster events dropped");
                        None
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                },
            };

            if let Some(payload) = payload
                && let Ok(json) = serde_json::to_string(&payload)
            {
                yield Ok(Event::default().event("change").data(json));
            }
        }
    };

    Sse::new(stream).keep_alive(
        axum::response::sse::KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("ping"),
    )
}
