use serde::{Deserialize, Serialize};

use crate::{
    dao::models::RoomRecord,
    room::{GameData, User},
};

/// Full room state as clients see it; field names follow the legacy wire
/// contract (`gameNumber`, `game`, `players`, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomSnapshot {
    /// Human-entered room number.
    #[serde(rename = "gameNumber")]
    pub game_number: String,
    /// Which game is being played.
    #[serde(rename = "game")]
    pub game_kind: String,
    /// Advertised player count.
    #[serde(rename = "players")]
    pub player_count: String,
    /// Ordered roster.
    pub users: Vec<User>,
    /// Nested game-data document.
    #[serde(rename = "gameData")]
    pub game_data: GameData,
    /// Full chat log.
    #[serde(rename = "chatLog")]
    pub chat_log: Vec<String>,
}

impl From<&RoomRecord> for RoomSnapshot {
    fn from(record: &RoomRecord) -> Self {
        Self {
            game_number: record.room_number.clone(),
            game_kind: record.game_kind.clone(),
            player_count: record.player_count.clone(),
            users: record.users.clone(),
            game_data: record.game_data.clone(),
            chat_log: record.chat_log.clone(),
        }
    }
}

impl From<RoomRecord> for RoomSnapshot {
    fn from(record: RoomRecord) -> Self {
        Self {
            game_number: record.room_number,
            game_kind: record.game_kind,
            player_count: record.player_count,
            users: record.users,
            game_data: record.game_data,
            chat_log: record.chat_log,
        }
    }
}
