use std::sync::Arc;

use futures::{TryStreamExt, future::BoxFuture};
use mongodb::{Client, Collection, Database, bson::doc, options::IndexOptions};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{
    config::MongoConfig,
    connection::establish_connection,
    error::{MongoDaoError, MongoResult},
    models::{MongoRoomDocument, doc_id},
};
use crate::dao::{models::RoomRecord, room_store::RoomStore, storage::StorageResult};

const ROOM_COLLECTION_NAME: &str = "rooms";

/// MongoDB-backed room store; cheap to clone, reconnectable in place.
#[derive(Clone)]
pub struct MongoRoomStore {
    inner: Arc<MongoInner>,
}

struct MongoInner {
    state: RwLock<MongoState>,
    config: MongoConfig,
}

struct MongoState {
    #[allow(dead_code)]
    client: Client,
    database: Database,
}

impl MongoInner {
    async fn ping(&self) -> MongoResult<()> {
        let database = {
            let guard = self.state.read().await;
            guard.database.clone()
        };

        database
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|source| MongoDaoError::HealthPing { source })?;
        Ok(())
    }

    async fn reconnect(&self) -> MongoResult<()> {
        let (client, database) =
            establish_connection(&self.config.options, &self.config.database_name).await?;
        let mut guard = self.state.write().await;
        guard.client = client;
        guard.database = database;
        Ok(())
    }
}

impl MongoRoomStore {
    /// Connect to MongoDB and ensure the room-number index exists.
    pub async fn connect(config: MongoConfig) -> MongoResult<Self> {
        let (client, database) =
            establish_connection(&config.options, &config.database_name).await?;

        let inner = Arc::new(MongoInner {
            state: RwLock::new(MongoState { client, database }),
            config,
        });

        let store = Self { inner };
        store.ensure_indexes().await?;
        Ok(store)
    }

    /// Room numbers are the human-facing lookup key and must stay unique.
    async fn ensure_indexes(&self) -> MongoResult<()> {
        let collection = self.collection().await;
        let index = mongodb::IndexModel::builder()
            .keys(doc! {"room_number": 1})
            .options(
                IndexOptions::builder()
                    .name(Some("room_number_idx".to_owned()))
                    .unique(Some(true))
                    .build(),
            )
            .build();

        collection
            .create_index(index)
            .await
            .map_err(|source| MongoDaoError::EnsureIndex {
                collection: ROOM_COLLECTION_NAME,
                index: "room_number",
                source,
            })?;

        Ok(())
    }

    async fn collection(&self) -> Collection<MongoRoomDocument> {
        let guard = self.inner.state.read().await;
        guard
            .database
            .collection::<MongoRoomDocument>(ROOM_COLLECTION_NAME)
    }

    async fn create_room(&self, room: RoomRecord) -> MongoResult<()> {
        let room_number = room.room_number.clone();
        let document: MongoRoomDocument = room.into();
        self.collection()
            .await
            .insert_one(&document)
            .await
            .map_err(|source| MongoDaoError::CreateRoom {
                room_number,
                source,
            })?;
        Ok(())
    }

    async fn save_room(&self, room: RoomRecord) -> MongoResult<()> {
        let id = room.id;
        let document: MongoRoomDocument = room.into();
        self.collection()
            .await
            .replace_one(doc_id(id), &document)
            .upsert(true)
            .await
            .map_err(|source| MongoDaoError::SaveRoom { id, source })?;
        Ok(())
    }

    async fn find_room(&self, id: Uuid) -> MongoResult<Option<RoomRecord>> {
        let document = self
            .collection()
            .await
            .find_one(doc_id(id))
            .await
            .map_err(|source| MongoDaoError::LoadRoom { id, source })?;
        Ok(document.map(Into::into))
    }

    async fn find_by_number(&self, room_number: String) -> MongoResult<Option<RoomRecord>> {
        let document = self
            .collection()
            .await
            .find_one(doc! {"room_number": &room_number})
            .await
            .map_err(|source| MongoDaoError::FindRoom {
                room_number,
                source,
            })?;
        Ok(document.map(Into::into))
    }

    async fn list_room_numbers(&self) -> MongoResult<Vec<String>> {
        let documents: Vec<MongoRoomDocument> = self
            .collection()
            .await
            .find(doc! {})
            .await
            .map_err(|source| MongoDaoError::ListRooms { source })?
            .try_collect()
            .await
            .map_err(|source| MongoDaoError::ListRooms { source })?;

        Ok(documents
            .into_iter()
            .map(|document| RoomRecord::from(document).room_number)
            .collect())
    }
}

impl RoomStore for MongoRoomStore {
    fn create_room(&self, room: RoomRecord) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.create_room(room).await.map_err(Into::into) })
    }

    fn save_room(&self, room: RoomRecord) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.save_room(room).await.map_err(Into::into) })
    }

    fn find_room(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<RoomRecord>>> {
        let store = self.clone();
        Box::pin(async move { store.find_room(id).await.map_err(Into::into) })
    }

    fn find_by_number(
        &self,
        room_number: String,
    ) -> BoxFuture<'static, StorageResult<Option<RoomRecord>>> {
        let store = self.clone();
        Box::pin(async move { store.find_by_number(room_number).await.map_err(Into::into) })
    }

    fn list_room_numbers(&self) -> BoxFuture<'static, StorageResult<Vec<String>>> {
        let store = self.clone();
        Box::pin(async move { store.list_room_numbers().await.map_err(Into::into) })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.inner.ping().await.map_err(Into::into) })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.inner.reconnect().await.map_err(Into::into) })
    }
}
