//! Pure room-state logic: roster bookkeeping, game-data merging, the chat
//! log, and the wall-clock format used in chat lines.
//!
//! Nothing in this module touches the network or the store. Every operation
//! takes the current value and returns the next one, which keeps the
//! synchronization layer in [`crate::services::sync`] a thin
//! read-modify-write shell around testable functions.

pub mod chat;
pub mod clock;
pub mod merge;
pub mod roster;

pub use merge::{GameData, merge_game_data};
pub use roster::{CARDS_WAITING, CHAT_ROOM_SEAT, User};
