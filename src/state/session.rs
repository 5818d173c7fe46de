//! Per-connection lifecycle: `Unbound` until the join handshake completes,
//! `Bound` while room events are accepted, `Closed` after disconnect.

use thiserror::Error;
use uuid::Uuid;

use crate::room::User;

/// Everything the coordinator needs to know about a bound connection.
///
/// This record replaces the legacy design's ambient per-connection globals;
/// every handler receives it explicitly.
#[derive(Debug, Clone, PartialEq)]
pub struct RoomSession {
    /// Process-local identifier of the websocket connection.
    pub connection_id: Uuid,
    /// Store id of the joined room.
    pub room_id: Uuid,
    /// Human-entered number of the joined room.
    pub room_number: String,
    /// Identity announced in the join handshake.
    pub user_name: String,
    /// The fresh user object supplied at join time, reused as the vacated
    /// seat template when this user stands up mid-hand.
    pub seat_template: User,
}

/// Phase violations of the connection state machine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidTransition {
    /// A second join handshake arrived on an already-bound connection.
    #[error("connection is already bound to room `{room_number}`")]
    AlreadyBound {
        /// Number of the room the connection is bound to.
        room_number: String,
    },
    /// A room event arrived before the join handshake.
    #[error("event received before the join handshake")]
    NotBound,
    /// An event arrived after the connection closed.
    #[error("connection is closed")]
    Closed,
}

/// State of one websocket connection.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ConnectionPhase {
    /// Connected, no room joined yet. Room events are rejected.
    #[default]
    Unbound,
    /// Join handshake completed; room events are accepted.
    Bound(RoomSession),
    /// Disconnected; nothing is accepted anymore.
    Closed,
}

impl ConnectionPhase {
    /// `Unbound -> Bound`; any other start phase is an error.
    pub fn bind(&mut self, session: RoomSession) -> Result<(), InvalidTransition> {
        match self {
            ConnectionPhase::Unbound => {
                *self = ConnectionPhase::Bound(session);
                Ok(())
            }
            ConnectionPhase::Bound(bound) => Err(InvalidTransition::AlreadyBound {
                room_number: bound.room_number.clone(),
            }),
            ConnectionPhase::Closed => Err(InvalidTransition::Closed),
        }
    }

    /// The bound session, or the phase violation explaining why there is none.
    pub fn session(&self) -> Result<&RoomSession, InvalidTransition> {
        match self {
            ConnectionPhase::Bound(session) => Ok(session),
            ConnectionPhase::Unbound => Err(InvalidTransition::NotBound),
            ConnectionPhase::Closed => Err(InvalidTransition::Closed),
        }
    }

    /// `* -> Closed`, returning the session that was bound, if any. Closing
    /// twice is harmless.
    pub fn close(&mut self) -> Option<RoomSession> {
        match std::mem::replace(self, ConnectionPhase::Closed) {
            ConnectionPhase::Bound(session) => Some(session),
            _ => None,
        }
    }
}
