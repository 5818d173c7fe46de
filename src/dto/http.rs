//! Payloads of the legacy HTTP surface. Shapes and failure strings are a
//! compatibility contract with existing clients and must not change.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    dto::common::RoomSnapshot,
    room::{GameData, User},
};

/// In-band failure string for `GET /games/{roomNumber}` misses.
pub const GAME_NOT_FOUND: &str = "Game Number Not Found";
/// In-band failure string for `POST /newGame`.
pub const CREATE_FAILED: &str = "Failed To Create New Game";

/// Body of `GET /games`.
#[derive(Debug, Serialize, ToSchema)]
pub struct GamesListResponse {
    /// All known room numbers.
    pub games: Vec<String>,
}

/// Body of `GET /games/{roomNumber}`: the room's fields, or the legacy
/// miss string.
#[derive(Debug, Serialize)]
pub struct RoomDataResponse {
    /// Snapshot on hit, [`GAME_NOT_FOUND`] on miss.
    pub data: RoomDataPayload,
}

/// Either a room snapshot or an in-band failure string.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum RoomDataPayload {
    /// The room exists.
    Found(Box<RoomSnapshot>),
    /// Legacy miss string.
    Missing(&'static str),
}

/// A value legacy clients send either as a string or a bare number.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum Numberish {
    /// Already a string.
    Text(String),
    /// Bare JSON number.
    Int(i64),
}

impl Numberish {
    /// Normalize to the string form used everywhere server-side.
    pub fn into_string(self) -> String {
        match self {
            Numberish::Text(text) => text,
            Numberish::Int(value) => value.to_string(),
        }
    }
}

/// Body of `POST /newGame`.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewGameRequest {
    /// Human-entered room number for the new room.
    pub game_number: Numberish,
    /// Which game will be played.
    pub game: String,
    /// Advertised player count.
    pub players: Numberish,
    /// Optional initial game data.
    #[serde(default)]
    #[schema(value_type = Option<Object>)]
    pub game_data: Option<GameData>,
}

/// Body returned by `POST /newGame`.
#[derive(Debug, Serialize, ToSchema)]
pub struct NewGameResponse {
    /// The created room's number, or [`CREATE_FAILED`].
    pub record: String,
}

impl NewGameResponse {
    /// Creation succeeded; echo the room number.
    pub fn created(room_number: impl Into<String>) -> Self {
        Self {
            record: room_number.into(),
        }
    }

    /// Creation failed; legacy in-band failure string.
    pub fn failed() -> Self {
        Self {
            record: CREATE_FAILED.to_string(),
        }
    }
}

/// Body of `POST /newUser` (pre-join registration path).
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewUserRequest {
    /// Room to register into.
    pub game_number: Numberish,
    /// The user object to add to the roster.
    #[schema(value_type = Object)]
    pub new_user_object: User,
    /// Identity stamped onto the user object.
    pub user_name: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn numberish_accepts_both_wire_forms() {
        let text: Numberish = serde_json::from_value(json!("4821")).expect("string");
        let int: Numberish = serde_json::from_value(json!(4821)).expect("number");
        assert_eq!(text.into_string(), "4821");
        assert_eq!(int.into_string(), "4821");
    }

    #[test]
    fn room_data_miss_serializes_the_legacy_string() {
        let body = RoomDataResponse {
            data: RoomDataPayload::Missing(GAME_NOT_FOUND),
        };
        assert_eq!(
            serde_json::to_value(&body).expect("serialize"),
            json!({"data": "Game Number Not Found"})
        );
    }

    #[test]
    fn new_user_request_parses_legacy_field_names() {
        let body: NewUserRequest = serde_json::from_value(json!({
            "gameNumber": "4821",
            "userName": "Alice",
            "newUserObject": {"name": "", "seat": "chatRoom", "inGame": false}
        }))
        .expect("parse");
        assert_eq!(body.user_name, "Alice");
        assert_eq!(body.new_user_object.seat, "chatRoom");
    }
}
