/// OpenAPI documentation generation.
pub mod documentation;
/// Health check service.
pub mod health_service;
/// Room lifecycle operations behind the legacy HTTP surface.
pub mod room_service;
/// WebSocket connection lifecycle and room event handling.
pub mod socket_service;
/// Storage reconnection loop and degraded-mode management.
pub mod storage_supervisor;
/// Bounded, serialized access to the room store.
pub mod sync;
