//! Websocket protocol: event names and payload shapes follow the legacy
//! socket contract, carried here as JSON messages tagged by `type`.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use validator::Validate;

use crate::{
    dto::common::RoomSnapshot,
    room::{GameData, User},
};

/// Failure parsing or validating an inbound message.
#[derive(Debug, Error)]
pub enum MessageParseError {
    /// The payload was not valid JSON for any known message.
    #[error("malformed message: {0}")]
    Json(#[from] serde_json::Error),
    /// The payload parsed but failed field validation.
    #[error("invalid message: {0}")]
    Validation(#[from] validator::ValidationErrors),
}

/// Join handshake payload; the first message every connection must send.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct FirstContact {
    /// Identity joining the room.
    #[validate(length(min = 1, message = "userName must not be empty"))]
    pub user_name: String,
    /// Number of the room to join.
    #[validate(length(min = 1, message = "gameNumber must not be empty"))]
    pub game_number: String,
    /// Fresh user object for this participant, kept as the vacated-seat
    /// template for later stand-ups.
    pub new_user_object: User,
}

/// Messages accepted from room clients.
#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
pub enum ClientMessage {
    /// Join handshake.
    #[serde(rename = "first-contact")]
    FirstContact(FirstContact),
    /// Plain chat message.
    #[serde(rename = "chatLogMessage")]
    ChatLogMessage {
        /// Message body; the server prefixes clock and sender.
        text: String,
    },
    /// Game event announcement, logged like chat without the colon.
    #[serde(rename = "gameEventMessage")]
    GameEventMessage {
        /// Event description; the server prefixes clock and actor.
        text: String,
    },
    /// Roster upsert with the sender's current user object.
    #[serde(rename = "updateUser")]
    UpdateUser(User),
    /// The sender stands up mid-hand; payload is their current seat object.
    #[serde(rename = "standUpInGame")]
    StandUpInGame(User),
    /// The sender picks up the cards waiting at `seat`.
    #[serde(rename = "removeCardsWaiting")]
    RemoveCardsWaiting {
        /// Seat to pick up.
        seat: String,
    },
    /// Flip every seated user into an active hand.
    #[serde(rename = "startGame")]
    StartGame,
    /// Flip every seated user out of the active hand.
    #[serde(rename = "endGame")]
    EndGame,
    /// Explicit form of startGame/endGame.
    #[serde(rename = "setInGame")]
    SetInGame {
        /// Desired in-hand status for every seated user.
        #[serde(rename = "inGame")]
        in_game: bool,
    },
    /// Partial game-data update, merged per the reserved-key policy.
    #[serde(rename = "updateGameData")]
    UpdateGameData(GameData),
    /// Anything this server version does not understand.
    #[serde(other)]
    Unknown,
}

impl ClientMessage {
    /// Parse and validate one inbound frame.
    pub fn from_json_str(raw: &str) -> Result<Self, MessageParseError> {
        let message: ClientMessage = serde_json::from_str(raw)?;
        if let ClientMessage::FirstContact(contact) = &message {
            contact.validate()?;
        }
        Ok(message)
    }
}

/// Partial room state broadcast after a mutation; only the changed facets
/// are present.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RoomDelta {
    /// New full roster, when the roster changed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub users: Option<Vec<User>>,
    /// New full game-data document, when it changed.
    #[serde(rename = "gameData", skip_serializing_if = "Option::is_none")]
    pub game_data: Option<GameData>,
    /// The appended chat line, when one was appended.
    #[serde(rename = "chatLog", skip_serializing_if = "Option::is_none")]
    pub chat_log: Option<String>,
}

impl RoomDelta {
    /// Delta carrying only a roster change.
    pub fn users(users: Vec<User>) -> Self {
        Self {
            users: Some(users),
            ..Self::default()
        }
    }

    /// Delta carrying only a game-data change.
    pub fn game_data(game_data: GameData) -> Self {
        Self {
            game_data: Some(game_data),
            ..Self::default()
        }
    }

    /// Delta carrying only an appended chat line.
    pub fn chat_line(line: impl Into<String>) -> Self {
        Self {
            chat_log: Some(line.into()),
            ..Self::default()
        }
    }
}

/// Messages sent to room clients.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum ServerMessage {
    /// Full room snapshot, sent to a joining connection only.
    #[serde(rename = "gameRoomState")]
    GameRoomState(RoomSnapshot),
    /// Broadcast delta after a mutation.
    #[serde(rename = "updateRoom")]
    UpdateRoom(RoomDelta),
    /// Periodic liveness message; empty payload, no acknowledgment.
    #[serde(rename = "stayAlive")]
    StayAlive,
    /// Error acknowledgment sent to the originating connection only.
    #[serde(rename = "errorMessage")]
    ErrorMessage {
        /// Human-readable description of what was rejected.
        message: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn first_contact_parses_the_legacy_event_name() {
        let raw = json!({
            "type": "first-contact",
            "userName": "Alice",
            "gameNumber": "4821",
            "newUserObject": {"name": "Alice", "seat": "chatRoom", "inGame": false}
        })
        .to_string();
        let message = ClientMessage::from_json_str(&raw).expect("parse");
        let ClientMessage::FirstContact(contact) = message else {
            panic!("expected first-contact");
        };
        assert_eq!(contact.user_name, "Alice");
        assert_eq!(contact.game_number, "4821");
    }

    #[test]
    fn first_contact_with_empty_name_is_rejected() {
        let raw = json!({
            "type": "first-contact",
            "userName": "",
            "gameNumber": "4821",
            "newUserObject": {"name": "", "seat": "chatRoom"}
        })
        .to_string();
        assert!(matches!(
            ClientMessage::from_json_str(&raw),
            Err(MessageParseError::Validation(_))
        ));
    }

    #[test]
    fn update_user_carries_the_user_object_inline() {
        let raw = json!({
            "type": "updateUser",
            "name": "Alice",
            "seat": "N",
            "inGame": true,
            "hand": ["AS", "KS"]
        })
        .to_string();
        let ClientMessage::UpdateUser(user) = ClientMessage::from_json_str(&raw).expect("parse")
        else {
            panic!("expected updateUser");
        };
        assert_eq!(user.seat, "N");
        assert_eq!(user.payload.get("hand"), Some(&json!(["AS", "KS"])));
    }

    #[test]
    fn unknown_event_types_parse_as_unknown() {
        let raw = json!({"type": "future-event", "anything": 1}).to_string();
        assert!(matches!(
            ClientMessage::from_json_str(&raw).expect("parse"),
            ClientMessage::Unknown
        ));
    }

    #[test]
    fn deltas_only_serialize_present_facets() {
        let message = ServerMessage::UpdateRoom(RoomDelta::chat_line("3:07pm Alice: hi"));
        let value = serde_json::to_value(&message).expect("serialize");
        assert_eq!(
            value,
            json!({"type": "updateRoom", "chatLog": "3:07pm Alice: hi"})
        );
    }

    #[test]
    fn stay_alive_is_an_empty_payload() {
        let value = serde_json::to_value(&ServerMessage::StayAlive).expect("serialize");
        assert_eq!(value, json!({"type": "stayAlive"}));
    }
}
