//! Shared application state: the installed store, the registry of live
//! websocket connections, and the per-room mutation gates.

pub mod session;

use std::sync::Arc;

use axum::extract::ws::Message;
use dashmap::DashMap;
use tokio::sync::{Mutex, RwLock, mpsc, watch};
use tracing::warn;
use uuid::Uuid;

use crate::{
    config::AppConfig, dao::room_store::RoomStore, dto::ws::ServerMessage, error::ServiceError,
};

/// Cheaply clonable handle on the application state.
pub type SharedState = Arc<AppState>;

/// Handle used to push messages to one connected room member.
#[derive(Clone)]
pub struct MemberConnection {
    /// Process-local connection identifier.
    pub connection_id: Uuid,
    /// Room this connection is bound to.
    pub room_id: Uuid,
    /// Identity announced at join time.
    pub user_name: String,
    /// Writer-task channel for this socket.
    pub tx: mpsc::UnboundedSender<Message>,
}

/// Central application state storing live connections and the store handle.
pub struct AppState {
    config: AppConfig,
    room_store: RwLock<Option<Arc<dyn RoomStore>>>,
    members: DashMap<Uuid, MemberConnection>,
    room_gates: DashMap<Uuid, Arc<Mutex<()>>>,
    degraded: watch::Sender<bool>,
}

impl AppState {
    /// Construct the state wrapped in an [`Arc`]. The application starts in
    /// degraded mode until a storage backend is installed.
    pub fn new(config: AppConfig) -> SharedState {
        let (degraded_tx, _rx) = watch::channel(true);
        Arc::new(Self {
            config,
            room_store: RwLock::new(None),
            members: DashMap::new(),
            room_gates: DashMap::new(),
            degraded: degraded_tx,
        })
    }

    /// Runtime configuration.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Handle on the current room store, if one is installed.
    pub async fn room_store(&self) -> Option<Arc<dyn RoomStore>> {
        let guard = self.room_store.read().await;
        guard.as_ref().cloned()
    }

    /// Handle on the current room store, or [`ServiceError::Degraded`].
    pub async fn require_room_store(&self) -> Result<Arc<dyn RoomStore>, ServiceError> {
        self.room_store().await.ok_or(ServiceError::Degraded)
    }

    /// Install a storage backend and leave degraded mode.
    pub async fn set_room_store(&self, store: Arc<dyn RoomStore>) {
        {
            let mut guard = self.room_store.write().await;
            *guard = Some(store);
        }
        self.update_degraded(false);
    }

    /// Whether the application currently has no usable storage backend.
    pub fn is_degraded(&self) -> bool {
        *self.degraded.borrow()
    }

    /// Update and broadcast the degraded flag when the value changes.
    pub fn update_degraded(&self, value: bool) {
        self.degraded.send_if_modified(|current| {
            let changed = *current != value;
            *current = value;
            changed
        });
    }

    /// Subscribe to degraded mode updates.
    pub fn degraded_watcher(&self) -> watch::Receiver<bool> {
        self.degraded.subscribe()
    }

    /// Registry of live websocket connections keyed by connection id.
    pub fn members(&self) -> &DashMap<Uuid, MemberConnection> {
        &self.members
    }

    /// Mutation gate for one room. All read-modify-write cycles for a room
    /// run under this lock, so concurrent events against the same room apply
    /// in arrival order instead of racing on the store.
    pub fn room_gate(&self, room_id: Uuid) -> Arc<Mutex<()>> {
        self.room_gates.entry(room_id).or_default().clone()
    }

    /// Send a message to every connection bound to `room_id`.
    ///
    /// The payload is serialized once; connections whose writer has already
    /// gone away are dropped from the registry.
    pub fn send_to_room(&self, room_id: Uuid, message: &ServerMessage) {
        let payload = match serde_json::to_string(message) {
            Ok(payload) => payload,
            Err(err) => {
                warn!(error = %err, "failed to serialize room broadcast");
                return;
            }
        };

        let mut dead = Vec::new();
        for member in self.members.iter() {
            if member.room_id != room_id {
                continue;
            }
            if member.tx.send(Message::Text(payload.clone().into())).is_err() {
                dead.push(member.connection_id);
            }
        }
        for connection_id in dead {
            self.members.remove(&connection_id);
        }
    }
}
