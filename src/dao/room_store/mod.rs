pub mod memory;
#[cfg(feature = "mongo-store")]
pub mod mongodb;

use futures::future::BoxFuture;
use uuid::Uuid;

use crate::dao::{models::RoomRecord, storage::StorageResult};

/// Abstraction over the durable store holding room records.
///
/// The synchronization engine only ever talks to this trait, so the core can
/// be exercised in tests against [`memory::InMemoryRoomStore`] while
/// production runs against a real database.
pub trait RoomStore: Send + Sync {
    /// Insert a new room; fails with a conflict when the room number is taken.
    fn create_room(&self, room: RoomRecord) -> BoxFuture<'static, StorageResult<()>>;
    /// Write back the full current value of a room record.
    fn save_room(&self, room: RoomRecord) -> BoxFuture<'static, StorageResult<()>>;
    /// Fetch a room by its store-assigned id.
    fn find_room(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<RoomRecord>>>;
    /// Fetch a room by its human-entered number.
    fn find_by_number(
        &self,
        room_number: String,
    ) -> BoxFuture<'static, StorageResult<Option<RoomRecord>>>;
    /// All known room numbers.
    fn list_room_numbers(&self) -> BoxFuture<'static, StorageResult<Vec<String>>>;
    /// Cheap liveness probe used by the storage supervisor.
    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>>;
    /// Attempt to re-establish a broken backend connection.
    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>>;
}
