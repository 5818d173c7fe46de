//! Read-modify-write coordination against the room store.
//!
//! Every mutation of a room goes through [`mutate_room`]: take the room's
//! gate, re-read the latest persisted record, apply a pure transform, write
//! the full record back. The gate serializes concurrent events for the same
//! room into arrival order; without it two connections could interleave
//! their read-modify-write cycles and silently drop one side's update.

use std::time::Duration;

use tokio::time::{sleep, timeout};
use tracing::warn;
use uuid::Uuid;

use crate::{
    dao::models::RoomRecord,
    dto::ws::{RoomDelta, ServerMessage},
    error::ServiceError,
    state::SharedState,
};

const RETRY_BACKOFF: Duration = Duration::from_millis(250);

/// Load a room by store id, with the configured timeout and read retries.
pub async fn load_room(state: &SharedState, room_id: Uuid) -> Result<RoomRecord, ServiceError> {
    let room = retry_read(state, || async {
        let store = state.require_room_store().await?;
        Ok(bounded(state, store.find_room(room_id)).await??)
    })
    .await?;
    room.ok_or_else(|| ServiceError::RoomNotFound(room_id.to_string()))
}

/// Look a room up by its human-entered number.
pub async fn find_room_by_number(
    state: &SharedState,
    room_number: &str,
) -> Result<Option<RoomRecord>, ServiceError> {
    retry_read(state, || async {
        let store = state.require_room_store().await?;
        Ok(bounded(state, store.find_by_number(room_number.to_owned())).await??)
    })
    .await
}

/// All known room numbers.
pub async fn list_room_numbers(state: &SharedState) -> Result<Vec<String>, ServiceError> {
    retry_read(state, || async {
        let store = state.require_room_store().await?;
        Ok(bounded(state, store.list_room_numbers()).await??)
    })
    .await
}

/// Write the full record back. Never retried: a write that may have
/// partially applied must not be replayed, or merge deltas could apply
/// twice.
pub async fn save_room(state: &SharedState, room: RoomRecord) -> Result<(), ServiceError> {
    let store = state.require_room_store().await?;
    bounded(state, store.save_room(room)).await??;
    Ok(())
}

/// Insert a brand-new room. Like saves, creates are not retried.
pub async fn create_room(state: &SharedState, room: RoomRecord) -> Result<(), ServiceError> {
    let store = state.require_room_store().await?;
    bounded(state, store.create_room(room)).await??;
    Ok(())
}

/// Apply one mutation to a room under its gate.
///
/// The transform receives the latest persisted record and returns the
/// broadcast delta describing what it changed; the record is then written
/// back whole. A failing transform leaves the store untouched.
pub async fn mutate_room<F>(
    state: &SharedState,
    room_id: Uuid,
    mutate: F,
) -> Result<(RoomRecord, RoomDelta), ServiceError>
where
    F: FnOnce(&mut RoomRecord) -> Result<RoomDelta, ServiceError>,
{
    let gate = state.room_gate(room_id);
    let _guard = gate.lock().await;

    let mut room = load_room(state, room_id).await?;
    let delta = mutate(&mut room)?;
    room.touch();
    save_room(state, room.clone()).await?;
    Ok((room, delta))
}

/// [`mutate_room`] followed by broadcasting the delta to every member of the
/// room.
pub async fn mutate_and_broadcast<F>(
    state: &SharedState,
    room_id: Uuid,
    mutate: F,
) -> Result<(RoomRecord, RoomDelta), ServiceError>
where
    F: FnOnce(&mut RoomRecord) -> Result<RoomDelta, ServiceError>,
{
    let (room, delta) = mutate_room(state, room_id, mutate).await?;
    state.send_to_room(room.id, &ServerMessage::UpdateRoom(delta.clone()));
    Ok((room, delta))
}

/// Bound a storage future by the configured timeout.
async fn bounded<T>(
    state: &SharedState,
    call: impl Future<Output = T>,
) -> Result<T, ServiceError> {
    timeout(state.config().store_timeout, call)
        .await
        .map_err(|_| ServiceError::Timeout)
}

/// Run a read closure, retrying transient failures a fixed number of times
/// with backoff.
async fn retry_read<T, F, Fut>(state: &SharedState, op: F) -> Result<T, ServiceError>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T, ServiceError>>,
{
    let retries = state.config().store_read_retries;
    let mut attempt = 0;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(err @ (ServiceError::Unavailable(_) | ServiceError::Timeout))
                if attempt < retries =>
            {
                attempt += 1;
                warn!(error = %err, attempt, "storage read failed; retrying");
                sleep(RETRY_BACKOFF * attempt).await;
            }
            Err(err) => return Err(err),
        }
    }
}
