use std::time::SystemTime;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::room::{GameData, User, chat, clock};

/// Aggregate room record persisted by the storage layer.
///
/// The store always holds the latest full value of each field; mutations are
/// applied to a typed in-memory copy and written back whole.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomRecord {
    /// Store-assigned identifier, never changes after creation.
    pub id: Uuid,
    /// Human-entered room number, unique across rooms.
    pub room_number: String,
    /// Which game is being played in this room.
    pub game_kind: String,
    /// Advertised number of players (kept as entered).
    pub player_count: String,
    /// Ordered roster of participants.
    pub users: Vec<User>,
    /// Nested game-data document, merged per [`crate::room::merge`].
    pub game_data: GameData,
    /// Append-only chat/event log.
    pub chat_log: Vec<String>,
    /// Creation timestamp for auditing/debugging.
    pub created_at: SystemTime,
    /// Last time any field of this record was written.
    pub updated_at: SystemTime,
}

impl RoomRecord {
    /// Build a fresh room with an empty roster and a single chat line
    /// announcing it.
    pub fn new(
        room_number: impl Into<String>,
        game_kind: impl Into<String>,
        player_count: impl Into<String>,
        game_data: GameData,
    ) -> Self {
        let room_number = room_number.into();
        let opened = chat::event_line(
            &clock::current_clock_time(),
            &format!("room {room_number}"),
            "is open",
        );
        let now = SystemTime::now();
        Self {
            id: Uuid::new_v4(),
            room_number,
            game_kind: game_kind.into(),
            player_count: player_count.into(),
            users: Vec::new(),
            game_data,
            chat_log: vec![opened],
            created_at: now,
            updated_at: now,
        }
    }

    /// Refresh the update timestamp; called once per persisted mutation.
    pub fn touch(&mut self) {
        self.updated_at = SystemTime::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_room_is_seeded_with_an_announcement_line() {
        let room = RoomRecord::new("4821", "pinochle", "4", GameData::new());
        assert!(room.users.is_empty());
        assert_eq!(room.chat_log.len(), 1);
        assert!(room.chat_log[0].ends_with("room 4821 is open"));
    }
}
