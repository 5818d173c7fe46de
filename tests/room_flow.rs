//! End-to-end room lifecycle against the in-memory store: create a room over
//! the service layer, join two members, seat them, run a hand, and check the
//! roster and chat log reconcile the way clients expect.

use std::sync::Arc;

use axum::extract::ws::Message;
use serde_json::{Value, json};
use tokio::sync::mpsc;
use uuid::Uuid;

use cardroom_back::{
    config::AppConfig,
    dao::room_store::memory::InMemoryRoomStore,
    dto::{
        http::{NewGameRequest, Numberish},
        ws::FirstContact,
    },
    error::ServiceError,
    room::{CARDS_WAITING, User},
    services::{room_service, socket_service, sync},
    state::{AppState, SharedState, session::RoomSession},
};

async fn fresh_state() -> SharedState {
    let state = AppState::new(AppConfig::default());
    state.set_room_store(Arc::new(InMemoryRoomStore::new())).await;
    state
}

async fn create_room(state: &SharedState, number: &str) -> String {
    room_service::create_room(
        state,
        NewGameRequest {
            game_number: Numberish::Text(number.into()),
            game: "Pinochle".into(),
            players: Numberish::Int(4),
            game_data: None,
        },
    )
    .await
    .expect("room creation")
}

fn seat_template(seat: &str) -> User {
    User {
        name: String::new(),
        seat: seat.into(),
        in_game: false,
        payload: serde_json::Map::new(),
    }
}

fn seated_user(name: &str, seat: &str) -> User {
    User {
        name: name.into(),
        seat: seat.into(),
        in_game: false,
        payload: serde_json::Map::new(),
    }
}

async fn join(
    state: &SharedState,
    room_number: &str,
    name: &str,
) -> (RoomSession, mpsc::UnboundedReceiver<Message>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let contact = FirstContact {
        user_name: name.into(),
        game_number: room_number.into(),
        new_user_object: seat_template("chatRoom"),
    };
    let session = socket_service::join_room(state, Uuid::new_v4(), contact, &tx)
        .await
        .expect("join");
    (session, rx)
}

fn next_json(rx: &mut mpsc::UnboundedReceiver<Message>) -> Value {
    match rx.try_recv().expect("a queued message") {
        Message::Text(text) => serde_json::from_str(text.as_str()).expect("valid json"),
        other => panic!("expected a text frame, got {other:?}"),
    }
}

#[tokio::test]
async fn joining_sends_the_snapshot_then_announces_the_member() {
    let state = fresh_state().await;
    create_room(&state, "4821").await;

    let (session, mut rx) = join(&state, "4821", "Alice").await;

    let snapshot = next_json(&mut rx);
    assert_eq!(snapshot["type"], "gameRoomState");
    assert_eq!(snapshot["gameNumber"], "4821");
    assert_eq!(snapshot["game"], "Pinochle");
    assert_eq!(snapshot["users"], json!([]));

    let announce = next_json(&mut rx);
    assert_eq!(announce["type"], "updateRoom");
    let line = announce["chatLog"].as_str().expect("chat line");
    assert!(line.ends_with("Alice entered the room"), "unexpected line {line}");

    let room = sync::load_room(&state, session.room_id).await.expect("room");
    assert_eq!(room.chat_log.len(), 2);
    assert!(room.chat_log[0].ends_with("room 4821 is open"));
}

#[tokio::test]
async fn duplicate_room_numbers_are_refused_with_the_number() {
    let state = fresh_state().await;
    create_room(&state, "4821").await;

    let err = room_service::create_room(
        &state,
        NewGameRequest {
            game_number: Numberish::Text("4821".into()),
            game: "Euchre".into(),
            players: Numberish::Int(4),
            game_data: None,
        },
    )
    .await
    .expect_err("duplicate number");

    assert!(matches!(&err, ServiceError::RoomNumberTaken(number) if number == "4821"));
    assert_eq!(err.to_string(), "room number `4821` is already taken");
}

#[tokio::test]
async fn joining_a_missing_room_is_refused() {
    let state = fresh_state().await;
    let (tx, _rx) = mpsc::unbounded_channel();
    let contact = FirstContact {
        user_name: "Alice".into(),
        game_number: "9999".into(),
        new_user_object: seat_template("chatRoom"),
    };

    let err = socket_service::join_room(&state, Uuid::new_v4(), contact, &tx)
        .await
        .expect_err("missing room");
    assert!(matches!(err, ServiceError::RoomNotFound(number) if number == "9999"));
    assert!(state.members().is_empty());
}

#[tokio::test]
async fn a_full_hand_reconciles_the_roster_on_disconnect() {
    let state = fresh_state().await;
    create_room(&state, "4821").await;

    let (alice, mut alice_rx) = join(&state, "4821", "Alice").await;
    let (bob, mut bob_rx) = join(&state, "4821", "Bob").await;

    socket_service::handle_update_user(&state, &alice, seated_user("Alice", "N"))
        .await
        .expect("seat Alice");
    socket_service::handle_update_user(&state, &bob, seated_user("Bob", "S"))
        .await
        .expect("seat Bob");
    socket_service::handle_set_in_game(&state, &alice, true)
        .await
        .expect("start hand");

    // Alice drops mid-hand; her seat's hand is parked under the sentinel.
    state.members().remove(&alice.connection_id);
    socket_service::handle_disconnect(&state, &alice)
        .await
        .expect("disconnect");

    let room = sync::load_room(&state, alice.room_id).await.expect("room");
    assert_eq!(room.users.len(), 2);

    let bob_entry = room
        .users
        .iter()
        .find(|user| user.name == "Bob")
        .expect("Bob stays");
    assert_eq!(bob_entry.seat, "S");
    assert!(bob_entry.in_game);

    let waiting = room
        .users
        .iter()
        .find(|user| user.name == CARDS_WAITING)
        .expect("parked hand");
    assert_eq!(waiting.seat, "N");
    assert!(waiting.in_game);

    let lines: Vec<&str> = room.chat_log.iter().map(String::as_str).collect();
    assert!(lines[1].ends_with("Alice entered the room"));
    assert!(lines[2].ends_with("Bob entered the room"));
    assert!(lines[3].ends_with("Alice left the room"));

    // Bob saw every broadcast; drain his queue and check the last roster.
    let mut last_roster = None;
    while let Ok(message) = bob_rx.try_recv() {
        if let Message::Text(text) = message {
            let value: Value = serde_json::from_str(text.as_str()).expect("valid json");
            if value["type"] == "updateRoom" && value.get("users").is_some() {
                last_roster = Some(value["users"].clone());
            }
        }
    }
    let roster = last_roster.expect("Bob received roster broadcasts");
    assert_eq!(roster.as_array().map(Vec::len), Some(2));

    // Alice's writer is gone from the registry, nothing more is queued for it
    // beyond what she received while connected.
    while alice_rx.try_recv().is_ok() {}
    assert!(alice_rx.try_recv().is_err());
}

#[tokio::test]
async fn concurrent_events_against_one_room_all_land() {
    let state = fresh_state().await;
    create_room(&state, "4821").await;
    let (alice, _alice_rx) = join(&state, "4821", "Alice").await;
    let (bob, _bob_rx) = join(&state, "4821", "Bob").await;

    // Each message is a separate gated read-modify-write; if two cycles
    // interleaved on a stale copy, one line would silently vanish.
    let mut handles = Vec::new();
    for i in 0..10 {
        let state = state.clone();
        let session = if i % 2 == 0 { alice.clone() } else { bob.clone() };
        handles.push(tokio::spawn(async move {
            socket_service::handle_chat_message(&state, &session, &format!("message {i}")).await
        }));
    }
    for handle in handles {
        handle.await.expect("task").expect("chat message");
    }

    let room = sync::load_room(&state, alice.room_id).await.expect("room");
    // Seed line, two join announcements, ten chat lines.
    assert_eq!(room.chat_log.len(), 13);
    for i in 0..10 {
        let expected = format!("message {i}");
        assert!(
            room.chat_log.iter().any(|line| line.ends_with(&expected)),
            "missing {expected}"
        );
    }
}

#[tokio::test]
async fn game_data_updates_merge_reserved_keys() {
    let state = fresh_state().await;
    create_room(&state, "4821").await;
    let (alice, _rx) = join(&state, "4821", "Alice").await;

    let first: cardroom_back::room::GameData =
        serde_json::from_value(json!({"round": {"trick": 1, "leader": "N"}, "phase": "bidding"}))
            .expect("game data");
    socket_service::handle_update_game_data(&state, &alice, first)
        .await
        .expect("first update");

    let second: cardroom_back::room::GameData =
        serde_json::from_value(json!({"round": {"trick": 2}, "phase": "play"}))
            .expect("game data");
    socket_service::handle_update_game_data(&state, &alice, second)
        .await
        .expect("second update");

    let room = sync::load_room(&state, alice.room_id).await.expect("room");
    let game_data = serde_json::to_value(&room.game_data).expect("serialize");
    assert_eq!(
        game_data,
        json!({"round": {"trick": 2, "leader": "N"}, "phase": "play"})
    );
}

#[tokio::test]
async fn picking_up_a_missing_seat_reports_the_seat() {
    let state = fresh_state().await;
    create_room(&state, "4821").await;
    let (alice, _rx) = join(&state, "4821", "Alice").await;

    let err = socket_service::handle_remove_cards_waiting(&state, &alice, "W")
        .await
        .expect_err("no cards waiting at W");
    assert!(matches!(err, ServiceError::SeatNotFound(inner) if inner.seat == "W"));

    // The failed pickup must not have touched the room.
    let room = sync::load_room(&state, alice.room_id).await.expect("room");
    assert!(room.users.is_empty());
}

#[tokio::test]
async fn stand_up_parks_the_hand_and_reseats_from_the_template() {
    let state = fresh_state().await;
    create_room(&state, "4821").await;
    let (alice, _rx) = join(&state, "4821", "Alice").await;

    let mut seated = seated_user("Alice", "E");
    seated.in_game = true;
    socket_service::handle_update_user(&state, &alice, seated.clone())
        .await
        .expect("seat Alice");

    socket_service::handle_stand_up(&state, &alice, seated)
        .await
        .expect("stand up");

    let room = sync::load_room(&state, alice.room_id).await.expect("room");
    let alice_entry = room
        .users
        .iter()
        .find(|user| user.name == "Alice")
        .expect("Alice reseated");
    assert_eq!(alice_entry.seat, "chatRoom");

    let waiting = room
        .users
        .iter()
        .find(|user| user.name == CARDS_WAITING)
        .expect("parked hand");
    assert_eq!(waiting.seat, "E");

    // Picking the seat back up folds the parked hand into Alice.
    socket_service::handle_remove_cards_waiting(&state, &alice, "E")
        .await
        .expect("pick up");
    let room = sync::load_room(&state, alice.room_id).await.expect("room");
    assert!(room.users.iter().all(|user| user.name != CARDS_WAITING));
    let alice_entry = room
        .users
        .iter()
        .find(|user| user.name == "Alice" && user.seat == "E")
        .expect("Alice back at E");
    assert!(alice_entry.in_game);
}
