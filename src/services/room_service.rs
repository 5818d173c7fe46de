//! Room discovery, creation, and pre-join registration behind the legacy
//! HTTP surface.

use crate::{
    dao::models::RoomRecord,
    dto::http::{NewGameRequest, NewUserRequest},
    error::ServiceError,
    room::{GameData, roster},
    services::sync,
    state::SharedState,
};

/// All known room numbers.
pub async fn list_rooms(state: &SharedState) -> Result<Vec<String>, ServiceError> {
    sync::list_room_numbers(state).await
}

/// Fetch one room by its human-entered number.
pub async fn fetch_room(
    state: &SharedState,
    room_number: &str,
) -> Result<Option<RoomRecord>, ServiceError> {
    sync::find_room_by_number(state, room_number).await
}

/// Create a fresh room with an empty roster and a seeded chat line.
///
/// Room numbers are unique: a collision fails the creation rather than
/// silently shadowing the existing room.
pub async fn create_room(
    state: &SharedState,
    request: NewGameRequest,
) -> Result<String, ServiceError> {
    let room_number = request.game_number.into_string();
    if room_number.trim().is_empty() {
        return Err(ServiceError::InvalidInput(
            "gameNumber must not be empty".into(),
        ));
    }

    if sync::find_room_by_number(state, &room_number).await?.is_some() {
        return Err(ServiceError::RoomNumberTaken(room_number));
    }

    let room = RoomRecord::new(
        room_number.clone(),
        request.game,
        request.players.into_string(),
        request.game_data.unwrap_or_else(GameData::new),
    );

    sync::create_room(state, room).await?;
    Ok(room_number)
}

/// Register a user into a room's roster ahead of the realtime join.
///
/// Runs through the same gated read-modify-write path as socket events, but
/// broadcasts nothing: the legacy registration endpoint was silent.
pub async fn register_user(
    state: &SharedState,
    request: NewUserRequest,
) -> Result<(), ServiceError> {
    let room_number = request.game_number.into_string();
    let room = sync::find_room_by_number(state, &room_number)
        .await?
        .ok_or(ServiceError::RoomNotFound(room_number))?;

    let mut user = request.new_user_object;
    user.name = request.user_name;

    sync::mutate_room(state, room.id, move |record| {
        record.users = roster::upsert_user(&record.users, user);
        Ok(crate::dto::ws::RoomDelta::users(record.users.clone()))
    })
    .await?;
    Ok(())
}
