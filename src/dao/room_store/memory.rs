//! Process-local [`RoomStore`] used by tests and by builds without a
//! database backend. Contents are lost on restart.

use std::{
    collections::HashMap,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};

use futures::future::BoxFuture;
use thiserror::Error;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::dao::{
    models::RoomRecord,
    room_store::RoomStore,
    storage::{StorageError, StorageResult},
};

#[derive(Debug, Error)]
#[error("in-memory store switched off")]
struct SwitchedOff;

/// In-memory room store keyed by room id.
#[derive(Clone, Default)]
pub struct InMemoryRoomStore {
    rooms: Arc<RwLock<HashMap<Uuid, RoomRecord>>>,
    available: Arc<AtomicBool>,
}

impl InMemoryRoomStore {
    /// Fresh, empty, available store.
    pub fn new() -> Self {
        Self {
            rooms: Arc::new(RwLock::new(HashMap::new())),
            available: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Toggle simulated availability; while off every call fails as
    /// unavailable. Used by tests exercising degraded behavior.
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    fn check_available(&self) -> StorageResult<()> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(StorageError::unavailable("in-memory store", SwitchedOff))
        }
    }
}

impl RoomStore for InMemoryRoomStore {
    fn create_room(&self, room: RoomRecord) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            store.check_available()?;
            let mut rooms = store.rooms.write().await;
            if rooms
                .values()
                .any(|existing| existing.room_number == room.room_number)
            {
                return Err(StorageError::conflict(room.room_number));
            }
            rooms.insert(room.id, room);
            Ok(())
        })
    }

    fn save_room(&self, room: RoomRecord) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            store.check_available()?;
            store.rooms.write().await.insert(room.id, room);
            Ok(())
        })
    }

    fn find_room(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<RoomRecord>>> {
        let store = self.clone();
        Box::pin(async move {
            store.check_available()?;
            Ok(store.rooms.read().await.get(&id).cloned())
        })
    }

    fn find_by_number(
        &self,
        room_number: String,
    ) -> BoxFuture<'static, StorageResult<Option<RoomRecord>>> {
        let store = self.clone();
        Box::pin(async move {
            store.check_available()?;
            Ok(store
                .rooms
                .read()
                .await
                .values()
                .find(|room| room.room_number == room_number)
                .cloned())
        })
    }

    fn list_room_numbers(&self) -> BoxFuture<'static, StorageResult<Vec<String>>> {
        let store = self.clone();
        Box::pin(async move {
            store.check_available()?;
            let mut numbers: Vec<String> = store
                .rooms
                .read()
                .await
                .values()
                .map(|room| room.room_number.clone())
                .collect();
            numbers.sort_unstable();
            Ok(numbers)
        })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.check_available() })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.check_available() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::room::GameData;

    #[tokio::test]
    async fn create_then_find_round_trips() {
        let store = InMemoryRoomStore::new();
        let room = RoomRecord::new("4821", "pinochle", "4", GameData::new());
        let id = room.id;

        store.create_room(room.clone()).await.expect("create");
        let found = store.find_room(id).await.expect("find").expect("present");
        assert_eq!(found, room);

        let by_number = store
            .find_by_number("4821".into())
            .await
            .expect("find")
            .expect("present");
        assert_eq!(by_number.id, id);
    }

    #[tokio::test]
    async fn duplicate_room_number_conflicts() {
        let store = InMemoryRoomStore::new();
        store
            .create_room(RoomRecord::new("4821", "pinochle", "4", GameData::new()))
            .await
            .expect("first create");
        let err = store
            .create_room(RoomRecord::new("4821", "euchre", "4", GameData::new()))
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::Conflict { .. }));
    }

    #[tokio::test]
    async fn switched_off_store_reports_unavailable() {
        let store = InMemoryRoomStore::new();
        store.set_available(false);
        let err = store.list_room_numbers().await.unwrap_err();
        assert!(matches!(err, StorageError::Unavailable { .. }));
    }
}
