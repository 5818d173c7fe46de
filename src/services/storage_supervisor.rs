//! Background task that owns the storage connection lifecycle. While the
//! store is unreachable the shared state stays in degraded mode and room
//! traffic is refused with a retryable error.

use std::{future::Future, sync::Arc, time::Duration};

use tokio::time::sleep;
use tracing::{info, warn};

use crate::{
    dao::{room_store::RoomStore, storage::StorageError},
    state::SharedState,
};

const INITIAL_DELAY: Duration = Duration::from_millis(1_000);
const MAX_DELAY: Duration = Duration::from_secs(10);
const HEALTH_POLL_INTERVAL: Duration = Duration::from_secs(5);
const MAX_RECONNECT_ATTEMPTS: u32 = 3;

/// Connect the storage backend, then watch it; runs until the process exits.
///
/// `connect` is retried with capped exponential backoff until it yields a
/// working store. Once installed, the store is health-polled; a failed poll
/// triggers a bounded reconnect cycle, and only when that cycle is exhausted
/// do we fall back to a fresh `connect` from scratch.
pub async fn run<F, Fut>(state: SharedState, mut connect: F)
where
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = Result<Arc<dyn RoomStore>, StorageError>> + Send,
{
    let mut delay = INITIAL_DELAY;

    loop {
        let store = match connect().await {
            Ok(store) => store,
            Err(err) => {
                warn!(error = %err, "storage connection attempt failed");
                sleep(delay).await;
                delay = (delay * 2).min(MAX_DELAY);
                continue;
            }
        };

        state.set_room_store(store.clone()).await;
        info!("storage connection established; leaving degraded mode");
        delay = INITIAL_DELAY;

        watch_store(&state, store.as_ref()).await;

        warn!("exhausted storage reconnect attempts; staying in degraded mode");
        sleep(delay).await;
        delay = (delay * 2).min(MAX_DELAY);
    }
}

/// Poll the installed store until its reconnect budget is spent.
async fn watch_store(state: &SharedState, store: &dyn RoomStore) {
    loop {
        match store.health_check().await {
            Ok(()) => {
                if state.is_degraded() {
                    info!("storage healthy again; leaving degraded mode");
                    state.update_degraded(false);
                }
            }
            Err(err) => {
                warn!(error = %err, "storage health check failed");
                if !recover_store(state, store).await {
                    return;
                }
                state.update_degraded(false);
            }
        }
        sleep(HEALTH_POLL_INTERVAL).await;
    }
}

/// Drive the store's own reconnect up to [`MAX_RECONNECT_ATTEMPTS`] times.
/// Degraded mode is entered on the first failed attempt so callers start
/// shedding writes as soon as the outage is confirmed.
async fn recover_store(state: &SharedState, store: &dyn RoomStore) -> bool {
    let mut reconnect_delay = INITIAL_DELAY;

    for attempt in 0..MAX_RECONNECT_ATTEMPTS {
        match store.try_reconnect().await {
            Ok(()) => {
                info!("storage reconnection succeeded after health check failure");
                return true;
            }
            Err(err) => {
                if attempt == 0 {
                    warn!(
                        attempt, error = %err,
                        "storage reconnect first attempt failed; entering degraded mode"
                    );
                    state.update_degraded(true);
                } else {
                    warn!(attempt, error = %err, "storage reconnect attempt failed");
                }
                sleep(reconnect_delay).await;
                reconnect_delay = (reconnect_delay * 2).min(MAX_DELAY);
            }
        }
    }

    false
}
