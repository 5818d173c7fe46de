//! Legacy room HTTP surface. These endpoints answer 200 with in-band
//! payload strings on miss or failure, because the clients they serve
//! branch on the body instead of the status code.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
};
use serde_json::{Value, json};
use tracing::warn;

use crate::{
    dto::{
        common::RoomSnapshot,
        http::{
            GAME_NOT_FOUND, GamesListResponse, NewGameRequest, NewGameResponse, NewUserRequest,
            RoomDataPayload, RoomDataResponse,
        },
    },
    error::AppError,
    services::room_service,
    state::SharedState,
};

/// Routes handling room discovery, creation, and pre-join registration.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/", get(hello))
        .route("/games", get(list_games))
        .route("/games/{room_number}", get(get_game))
        .route("/newGame", post(new_game))
        .route("/newUser", post(new_user))
}

/// Greeting kept for clients that probe the root path.
#[utoipa::path(
    get,
    path = "/",
    tag = "room",
    responses((status = 200, description = "Greeting payload"))
)]
pub async fn hello() -> Json<Value> {
    Json(json!({ "Hello": "Why are you here?" }))
}

/// List the numbers of every known room.
#[utoipa::path(
    get,
    path = "/games",
    tag = "room",
    responses((status = 200, description = "Known room numbers", body = GamesListResponse))
)]
pub async fn list_games(
    State(state): State<SharedState>,
) -> Result<Json<GamesListResponse>, AppError> {
    let games = room_service::list_rooms(&state).await?;
    Ok(Json(GamesListResponse { games }))
}

/// Fetch one room by number, answering the legacy miss string when absent.
#[utoipa::path(
    get,
    path = "/games/{room_number}",
    tag = "room",
    params(("room_number" = String, Path, description = "Human-entered room number")),
    responses((status = 200, description = "Room snapshot or the miss string"))
)]
pub async fn get_game(
    State(state): State<SharedState>,
    Path(room_number): Path<String>,
) -> Result<Json<RoomDataResponse>, AppError> {
    let data = match room_service::fetch_room(&state, &room_number).await? {
        Some(room) => RoomDataPayload::Found(Box::new(RoomSnapshot::from(room))),
        None => RoomDataPayload::Missing(GAME_NOT_FOUND),
    };
    Ok(Json(RoomDataResponse { data }))
}

/// Create a room. Failures stay in-band: the body carries the legacy
/// failure string and the status is still 200.
#[utoipa::path(
    post,
    path = "/newGame",
    tag = "room",
    responses((status = 200, description = "Created room number or the failure string", body = NewGameResponse))
)]
pub async fn new_game(
    State(state): State<SharedState>,
    Json(payload): Json<NewGameRequest>,
) -> Json<NewGameResponse> {
    match room_service::create_room(&state, payload).await {
        Ok(room_number) => Json(NewGameResponse::created(room_number)),
        Err(err) => {
            warn!(error = %err, "room creation failed");
            Json(NewGameResponse::failed())
        }
    }
}

/// Register a user into a room's roster ahead of the realtime join.
#[utoipa::path(
    post,
    path = "/newUser",
    tag = "room",
    responses((status = 200, description = "User registered"))
)]
pub async fn new_user(
    State(state): State<SharedState>,
    Json(payload): Json<NewUserRequest>,
) -> Result<StatusCode, AppError> {
    room_service::register_user(&state, payload).await?;
    Ok(StatusCode::OK)
}
