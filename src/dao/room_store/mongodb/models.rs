use mongodb::bson::{Binary, DateTime, Document, doc, spec::BinarySubtype};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    dao::models::RoomRecord,
    room::{GameData, User},
};

/// On-disk shape of a room record; timestamps become BSON datetimes, the
/// rest maps straight through serde.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(super) struct MongoRoomDocument {
    #[serde(rename = "_id")]
    id: Uuid,
    room_number: String,
    game_kind: String,
    player_count: String,
    users: Vec<User>,
    game_data: GameData,
    chat_log: Vec<String>,
    created_at: DateTime,
    updated_at: DateTime,
}

impl From<RoomRecord> for MongoRoomDocument {
    fn from(value: RoomRecord) -> Self {
        Self {
            id: value.id,
            room_number: value.room_number,
            game_kind: value.game_kind,
            player_count: value.player_count,
            users: value.users,
            game_data: value.game_data,
            chat_log: value.chat_log,
            created_at: DateTime::from_system_time(value.created_at),
            updated_at: DateTime::from_system_time(value.updated_at),
        }
    }
}

impl From<MongoRoomDocument> for RoomRecord {
    fn from(value: MongoRoomDocument) -> Self {
        Self {
            id: value.id,
            room_number: value.room_number,
            game_kind: value.game_kind,
            player_count: value.player_count,
            users: value.users,
            game_data: value.game_data,
            chat_log: value.chat_log,
            created_at: value.created_at.to_system_time(),
            updated_at: value.updated_at.to_system_time(),
        }
    }
}

fn uuid_as_binary(id: Uuid) -> Binary {
    Binary {
        subtype: BinarySubtype::Uuid,
        bytes: id.into_bytes().to_vec(),
    }
}

pub(super) fn doc_id(id: Uuid) -> Document {
    doc! {"_id": uuid_as_binary(id)}
}
