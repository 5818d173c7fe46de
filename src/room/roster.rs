//! Ordered roster of the participants in a room and the transforms applied
//! to it by join, seating, and disconnect events.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Seat value reserved for non-seated spectators.
pub const CHAT_ROOM_SEAT: &str = "chatRoom";

/// Placeholder identity that keeps a vacated seat's in-progress hand around
/// until another participant picks it up.
pub const CARDS_WAITING: &str = "Cards Waiting";

/// One participant entry in a room roster.
///
/// Only `name`, `seat` and `inGame` are interpreted by the server. Whatever
/// else a client attaches to its user object (hand contents, bid, score)
/// rides along in `payload` untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Identity, unique within a roster at any instant.
    pub name: String,
    /// Play position, or [`CHAT_ROOM_SEAT`] for spectators.
    pub seat: String,
    /// Whether the seat is part of an active hand.
    #[serde(default)]
    pub in_game: bool,
    /// Opaque game-specific fields, preserved verbatim.
    #[serde(flatten)]
    pub payload: Map<String, Value>,
}

impl User {
    /// True when the entry occupies a play position rather than the chat room.
    pub fn is_seated(&self) -> bool {
        self.seat != CHAT_ROOM_SEAT
    }

    /// Copy of this entry under a different identity, seat and payload kept.
    pub fn renamed(&self, name: &str) -> User {
        let mut user = self.clone();
        user.name = name.to_owned();
        user
    }
}

/// Raised by [`sit_in`] when no cards are waiting at the requested seat.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("no cards are waiting at seat `{seat}`")]
pub struct SeatNotFound {
    /// The seat the pickup was attempted at.
    pub seat: String,
}

/// Replace-or-append a user entry by identity.
///
/// Any existing entry under the same name is dropped, the new entry goes
/// last, and the relative order of untouched entries is preserved. The
/// result therefore never contains duplicate names.
pub fn upsert_user(roster: &[User], user: User) -> Vec<User> {
    let mut next: Vec<User> = roster
        .iter()
        .filter(|entry| entry.name != user.name)
        .cloned()
        .collect();
    next.push(user);
    next
}

/// A seated user stands up mid-hand.
///
/// The user re-enters under `vacated_template` (typically their chat-room
/// placeholder object), while the seat they left is re-appended under the
/// [`CARDS_WAITING`] identity so the unfinished hand survives for pickup.
/// At most one waiting entry may exist per seat; a repeat stand-up replaces
/// the previous placeholder instead of duplicating it.
pub fn stand_up(roster: &[User], name: &str, vacated_template: &User) -> Vec<User> {
    let vacated = roster.iter().find(|entry| entry.name == name).cloned();
    let mut next: Vec<User> = roster
        .iter()
        .filter(|entry| entry.name != name)
        .cloned()
        .collect();
    next.push(vacated_template.renamed(name));

    if let Some(seat_entry) = vacated {
        next.retain(|entry| !(entry.name == CARDS_WAITING && entry.seat == seat_entry.seat));
        next.push(seat_entry.renamed(CARDS_WAITING));
    }

    next
}

/// A participant picks up the cards waiting at `seat`.
///
/// The waiting entry is renamed to `new_occupant`; any previous entry for
/// that participant (their chat-room placeholder, usually) and any stray
/// waiting entries at the same seat are dropped. The renamed entry goes
/// last. The input roster is returned unchanged inside the error when no
/// waiting entry matches.
pub fn sit_in(roster: &[User], seat: &str, new_occupant: &str) -> Result<Vec<User>, SeatNotFound> {
    let waiting = roster
        .iter()
        .find(|entry| entry.name == CARDS_WAITING && entry.seat == seat)
        .ok_or_else(|| SeatNotFound {
            seat: seat.to_owned(),
        })?;
    let picked_up = waiting.renamed(new_occupant);

    let mut next: Vec<User> = roster
        .iter()
        .filter(|entry| entry.name != new_occupant)
        .filter(|entry| !(entry.name == CARDS_WAITING && entry.seat == seat))
        .cloned()
        .collect();
    next.push(picked_up);
    Ok(next)
}

/// Flip the `inGame` flag on every seated entry; chat-room entries are left
/// alone. The result lists chat-room entries first, then seated entries,
/// each group in original relative order.
pub fn set_in_game_for_seated(roster: &[User], status: bool) -> Vec<User> {
    let mut next: Vec<User> = roster
        .iter()
        .filter(|entry| !entry.is_seated())
        .cloned()
        .collect();
    next.extend(roster.iter().filter(|entry| entry.is_seated()).map(|entry| {
        let mut seated = entry.clone();
        seated.in_game = status;
        seated
    }));
    next
}

/// Drop a user on disconnect.
///
/// A user who was part of an active hand is not lost: their entry is
/// re-appended under [`CARDS_WAITING`] with seat and payload intact, so a
/// reconnecting or replacement player can pick the hand back up. Users who
/// were not in a hand are simply removed. Unknown names are a no-op.
pub fn remove_on_disconnect(roster: &[User], name: &str) -> Vec<User> {
    let leaving = roster.iter().find(|entry| entry.name == name).cloned();
    let mut next: Vec<User> = roster
        .iter()
        .filter(|entry| entry.name != name)
        .cloned()
        .collect();

    if let Some(user) = leaving
        && user.in_game
    {
        next.retain(|entry| !(entry.name == CARDS_WAITING && entry.seat == user.seat));
        next.push(user.renamed(CARDS_WAITING));
    }

    next
}
