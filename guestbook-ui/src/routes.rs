//! HTTP route handlers for the UI API.

use axum::Router;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Json;
use axum::routing::{get, post};
use serde::{Deserialize, Serialize};

use guestbook::core::stats::AttendanceStats;
use guestbook::core::types::{Guest, GuestCategory, RecordId, Wish};
use guestbook::error::{CheckInError, RegisterError, WishError};
use guestbook::io::desk::BatchReport;
use guestbook::roster::RosterView;
use guestbook::wall::WallView;

use crate::state::AppState;

/// Build the API router.
pub fn api_router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/wall", get(get_wall))
        .route("/stats", get(get_stats))
        .route("/guests", get(list_guests).post(add_guest))
        .route("/guests/batch", post(add_guest_batch))
        .route("/guests/{id}/check-in", post(check_in))
        .route("/guests/{id}/cancel", post(cancel_check_in))
        .route("/wishes", post(add_wish))
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

type ApiError = (StatusCode, Json<ErrorBody>);

fn api_error(status: StatusCode, err: impl std::fmt::Display) -> ApiError {
    (
        status,
        Json(ErrorBody {
            error: err.to_string(),
        }),
    )
}

fn register_error(err: RegisterError) -> ApiError {
    let status = match &err {
        RegisterError::DuplicateIdentity { .. } => StatusCode::CONFLICT,
        RegisterError::EmptyName | RegisterError::InvalidPax(_) => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        RegisterError::Store(_) => StatusCode::SERVICE_UNAVAILABLE,
    };
    api_error(status, err)
}

fn check_in_error(err: CheckInError) -> ApiError {
    let status = match &err {
        CheckInError::InvalidPax(_) => StatusCode::UNPROCESSABLE_ENTITY,
        CheckInError::UnknownGuest(_) => StatusCode::NOT_FOUND,
        CheckInError::Store(_) => StatusCode::SERVICE_UNAVAILABLE,
    };
    api_error(status, err)
}

fn wish_error(err: WishError) -> ApiError {
    let status = match &err {
        WishError::EmptyField => StatusCode::UNPROCESSABLE_ENTITY,
        WishError::Store(_) => StatusCode::SERVICE_UNAVAILABLE,
    };
    api_error(status, err)
}

async fn health() -> &'static str {
    "ok"
}

/// GET /api/wall - the live wall: wishes, lanes, popup, highlights.
async fn get_wall(State(state): State<AppState>) -> Json<WallView> {
    Json(state.wall.view().await)
}

/// GET /api/stats - full-snapshot attendance statistics.
async fn get_stats(State(state): State<AppState>) -> Json<AttendanceStats> {
    Json(state.roster.stats().await)
}

#[derive(Deserialize)]
struct GuestQuery {
    q: Option<String>,
}

/// GET /api/guests?q= - the roster, name-sorted, optionally filtered.
async fn list_guests(
    State(state): State<AppState>,
    Query(query): Query<GuestQuery>,
) -> Json<RosterView> {
    Json(state.roster.view(query.q.as_deref()).await)
}

#[derive(Deserialize)]
struct AddGuestBody {
    name: String,
    category: GuestCategory,
    /// When set, the walk-in flow: register and check in at once.
    pax: Option<i64>,
}

/// POST /api/guests - register a guest (optionally checked in on the spot).
async fn add_guest(
    State(state): State<AppState>,
    Json(body): Json<AddGuestBody>,
) -> Result<Json<Guest>, ApiError> {
    let result = match body.pax {
        Some(pax) => {
            state
                .desk
                .register_checked_in(&body.name, body.category, pax)
                .await
        }
        None => state.desk.register(&body.name, body.category).await,
    };
    result.map(Json).map_err(register_error)
}

#[derive(Deserialize)]
struct BatchBody {
    names: Vec<String>,
    category: GuestCategory,
}

/// POST /api/guests/batch - register many guests, one outcome per entry.
async fn add_guest_batch(
    State(state): State<AppState>,
    Json(body): Json<BatchBody>,
) -> Result<Json<BatchReport>, ApiError> {
    state
        .desk
        .register_batch(body.names, body.category)
        .await
        .map(Json)
        .map_err(|err| api_error(StatusCode::SERVICE_UNAVAILABLE, err))
}

#[derive(Deserialize)]
struct CheckInBody {
    pax: i64,
}

/// POST /api/guests/:id/check-in - check in or edit party size.
async fn check_in(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Json(body): Json<CheckInBody>,
) -> Result<Json<Guest>, ApiError> {
    state
        .desk
        .check_in(RecordId(id), body.pax)
        .await
        .map(Json)
        .map_err(check_in_error)
}

#[derive(Deserialize)]
struct CancelBody {
    #[serde(default)]
    confirm: bool,
}

/// POST /api/guests/:id/cancel - cancel a check-in. Destructive, so the
/// client must send `confirm: true` after asking the operator.
async fn cancel_check_in(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Json(body): Json<CancelBody>,
) -> Result<Json<Guest>, ApiError> {
    if !body.confirm {
        return Err(api_error(
            StatusCode::BAD_REQUEST,
            "cancellation requires confirm: true",
        ));
    }
    state
        .desk
        .cancel_check_in(RecordId(id))
        .await
        .map(Json)
        .map_err(check_in_error)
}

#[derive(Deserialize)]
struct AddWishBody {
    name: String,
    message: String,
}

/// POST /api/wishes - the guest-facing submission form.
async fn add_wish(
    State(state): State<AppState>,
    Json(body): Json<AddWishBody>,
) -> Result<Json<Wish>, ApiError> {
    state
        .desk
        .submit_wish(&body.name, &body.message)
        .await
        .map(Json)
        .map_err(wish_error)
}
