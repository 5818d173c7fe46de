//! MongoDB-backed [`crate::dao::room_store::RoomStore`].

mod config;
mod connection;
mod error;
mod models;
mod store;

pub use config::MongoConfig;
pub use error::MongoDaoError;
pub use store::MongoRoomStore;

use crate::dao::storage::StorageError;

impl From<MongoDaoError> for StorageError {
    fn from(err: MongoDaoError) -> Self {
        if err.is_duplicate_key()
            && let MongoDaoError::CreateRoom { room_number, .. } = &err
        {
            StorageError::conflict(room_number.clone())
        } else {
            StorageError::unavailable(err.to_string(), err)
        }
    }
}
