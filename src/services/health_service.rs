use tracing::warn;

use crate::{dto::health::HealthResponse, state::SharedState};

/// Build the `/healthcheck` payload, pinging the store so connectivity
/// issues show up in the logs before clients notice them.
pub async fn health_status(state: &SharedState) -> HealthResponse {
    match state.room_store().await {
        Some(store) => {
            if let Err(err) = store.health_check().await {
                warn!(error = %err, "storage health check failed");
            }
        }
        None => warn!("storage unavailable (degraded mode)"),
    }

    if state.is_degraded() {
        HealthResponse::degraded()
    } else {
        HealthResponse::ok()
    }
}
