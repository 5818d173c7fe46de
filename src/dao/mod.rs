//! Persistence layer: record entities, the [`room_store::RoomStore`]
//! abstraction, and its backends.

pub mod models;
pub mod room_store;
pub mod storage;
