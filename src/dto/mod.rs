//! Wire types for the HTTP surface and the websocket protocol.

pub mod common;
pub mod health;
pub mod http;
pub mod ws;
