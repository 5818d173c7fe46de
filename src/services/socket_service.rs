//! Websocket lifecycle for one room connection: join handshake, event
//! dispatch, heartbeat, and disconnect reconciliation.
//!
//! The per-event handlers are free functions over the shared state and the
//! connection's [`RoomSession`] so integration tests can drive them without
//! a socket.

use std::time::Duration;

use axum::extract::ws::{Message, WebSocket};
use futures::{SinkExt, StreamExt};
use tokio::{sync::mpsc, task::JoinHandle};
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    dto::{
        common::RoomSnapshot,
        ws::{ClientMessage, FirstContact, RoomDelta, ServerMessage},
    },
    error::ServiceError,
    room::{User, chat, clock, merge, roster},
    services::sync,
    state::{
        MemberConnection, SharedState,
        session::{ConnectionPhase, RoomSession},
    },
};

/// How long a fresh connection gets to send its join handshake.
const JOIN_TIMEOUT: Duration = Duration::from_secs(10);

/// Handle the full lifecycle of an individual room websocket connection.
pub async fn handle_socket(state: SharedState, socket: WebSocket) {
    let (mut sender, mut receiver) = socket.split();
    let (outbound_tx, mut outbound_rx) = mpsc::unbounded_channel::<Message>();

    // Dedicated writer task keeps outbound messages flowing even while we
    // await inbound frames.
    let writer_task = tokio::spawn(async move {
        while let Some(message) = outbound_rx.recv().await {
            if sender.send(message).await.is_err() {
                break;
            }
        }
    });

    let connection_id = Uuid::new_v4();
    let mut phase = ConnectionPhase::Unbound;

    // The first frame must be the join handshake.
    let contact = match await_first_contact(&mut receiver).await {
        Some(contact) => contact,
        None => {
            let _ = outbound_tx.send(Message::Close(None));
            finalize(writer_task, outbound_tx).await;
            return;
        }
    };

    let session = match join_room(&state, connection_id, contact, &outbound_tx).await {
        Ok(session) => session,
        Err(err) => {
            warn!(error = %err, "join handshake failed");
            send_error_ack(&outbound_tx, &err);
            let _ = outbound_tx.send(Message::Close(None));
            finalize(writer_task, outbound_tx).await;
            return;
        }
    };

    info!(
        connection = %connection_id,
        room = %session.room_number,
        user = %session.user_name,
        "connection bound to room"
    );
    if let Err(err) = phase.bind(session) {
        // Unreachable from Unbound; guard against future refactors.
        warn!(error = %err, "failed to bind fresh connection");
        finalize(writer_task, outbound_tx).await;
        return;
    }

    let mut heartbeat = tokio::time::interval(state.config().heartbeat_interval);
    heartbeat.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    heartbeat.reset();

    loop {
        tokio::select! {
            _ = heartbeat.tick() => {
                if send_message(&outbound_tx, &ServerMessage::StayAlive).is_err() {
                    break;
                }
            }
            frame = receiver.next() => {
                match frame {
                    Some(Ok(Message::Text(text))) => {
                        if let Ok(session) = phase.session() {
                            handle_text_frame(&state, session, &outbound_tx, &text).await;
                        }
                    }
                    Some(Ok(Message::Ping(payload))) => {
                        let _ = outbound_tx.send(Message::Pong(payload));
                    }
                    Some(Ok(Message::Close(frame))) => {
                        let _ = outbound_tx.send(Message::Close(frame));
                        break;
                    }
                    Some(Ok(Message::Binary(_))) | Some(Ok(Message::Pong(_))) => {}
                    Some(Err(err)) => {
                        warn!(connection = %connection_id, error = %err, "websocket error");
                        break;
                    }
                    None => break,
                }
            }
        }
    }

    state.members().remove(&connection_id);
    if let Some(session) = phase.close() {
        info!(
            connection = %connection_id,
            room = %session.room_number,
            user = %session.user_name,
            "connection left room"
        );
        if let Err(err) = handle_disconnect(&state, &session).await {
            warn!(error = %err, "failed to reconcile disconnect");
        }
    }

    finalize(writer_task, outbound_tx).await;
}

/// Wait for the join handshake frame, tolerating nothing else.
async fn await_first_contact(
    receiver: &mut (impl StreamExt<Item = Result<Message, axum::Error>> + Unpin),
) -> Option<FirstContact> {
    let first_frame = match tokio::time::timeout(JOIN_TIMEOUT, receiver.next()).await {
        Ok(Some(Ok(Message::Text(text)))) => text,
        Ok(Some(Ok(_))) => {
            warn!("expected join handshake, got a non-text frame");
            return None;
        }
        Ok(Some(Err(err))) => {
            warn!(error = %err, "websocket receive error during handshake");
            return None;
        }
        Ok(None) => return None,
        Err(_) => {
            warn!("join handshake timed out");
            return None;
        }
    };

    match ClientMessage::from_json_str(&first_frame) {
        Ok(ClientMessage::FirstContact(contact)) => Some(contact),
        Ok(_) => {
            warn!("first frame was not a join handshake");
            None
        }
        Err(err) => {
            warn!(error = %err, "failed to parse join handshake");
            None
        }
    }
}

/// Perform the join transition: resolve the room, register the connection,
/// send the full snapshot to the joiner, and announce them in the chat log.
pub async fn join_room(
    state: &SharedState,
    connection_id: Uuid,
    contact: FirstContact,
    outbound_tx: &mpsc::UnboundedSender<Message>,
) -> Result<RoomSession, ServiceError> {
    let room = sync::find_room_by_number(state, &contact.game_number)
        .await?
        .ok_or_else(|| ServiceError::RoomNotFound(contact.game_number.clone()))?;

    let session = RoomSession {
        connection_id,
        room_id: room.id,
        room_number: room.room_number.clone(),
        user_name: contact.user_name,
        seat_template: contact.new_user_object,
    };

    state.members().insert(
        connection_id,
        MemberConnection {
            connection_id,
            room_id: room.id,
            user_name: session.user_name.clone(),
            tx: outbound_tx.clone(),
        },
    );

    // Snapshot first, so the joiner never sees their own entry announcement
    // twice: the snapshot predates the chat line, the broadcast carries it.
    let _ = send_message(outbound_tx, &ServerMessage::GameRoomState(RoomSnapshot::from(&room)));

    let user_name = session.user_name.clone();
    let announce = sync::mutate_and_broadcast(state, room.id, move |record| {
        let line = chat::entered_line(&clock::current_clock_time(), &user_name);
        record.chat_log = chat::append_log(&record.chat_log, line.clone());
        Ok(RoomDelta::chat_line(line))
    })
    .await;

    if let Err(err) = announce {
        state.members().remove(&connection_id);
        return Err(err);
    }

    Ok(session)
}

/// Dispatch one parsed text frame from a bound connection. Failures are
/// acknowledged to the sender only; the rest of the room never sees a
/// partial broadcast.
async fn handle_text_frame(
    state: &SharedState,
    session: &RoomSession,
    outbound_tx: &mpsc::UnboundedSender<Message>,
    text: &str,
) {
    let message = match ClientMessage::from_json_str(text) {
        Ok(message) => message,
        Err(err) => {
            warn!(user = %session.user_name, error = %err, "rejected malformed frame");
            send_error_ack(outbound_tx, &ServiceError::InvalidInput(err.to_string()));
            return;
        }
    };

    let outcome = match message {
        ClientMessage::FirstContact(_) => {
            warn!(user = %session.user_name, "ignoring duplicate join handshake");
            return;
        }
        ClientMessage::ChatLogMessage { text } => handle_chat_message(state, session, &text).await,
        ClientMessage::GameEventMessage { text } => {
            handle_game_event_message(state, session, &text).await
        }
        ClientMessage::UpdateUser(user) => handle_update_user(state, session, user).await,
        ClientMessage::StandUpInGame(user) => handle_stand_up(state, session, user).await,
        ClientMessage::RemoveCardsWaiting { seat } => {
            handle_remove_cards_waiting(state, session, &seat).await
        }
        ClientMessage::StartGame => handle_set_in_game(state, session, true).await,
        ClientMessage::EndGame => handle_set_in_game(state, session, false).await,
        ClientMessage::SetInGame { in_game } => handle_set_in_game(state, session, in_game).await,
        ClientMessage::UpdateGameData(patch) => {
            handle_update_game_data(state, session, patch).await
        }
        ClientMessage::Unknown => {
            warn!(user = %session.user_name, "ignoring unknown event type");
            return;
        }
    };

    if let Err(err) = outcome {
        warn!(user = %session.user_name, error = %err, "event handling failed");
        send_error_ack(outbound_tx, &err);
    }
}

/// Append a chat line and broadcast it.
pub async fn handle_chat_message(
    state: &SharedState,
    session: &RoomSession,
    text: &str,
) -> Result<(), ServiceError> {
    let line = chat::chat_line(&clock::current_clock_time(), &session.user_name, text);
    append_line(state, session, line).await
}

/// Append a game-event line and broadcast it.
pub async fn handle_game_event_message(
    state: &SharedState,
    session: &RoomSession,
    text: &str,
) -> Result<(), ServiceError> {
    let line = chat::event_line(&clock::current_clock_time(), &session.user_name, text);
    append_line(state, session, line).await
}

async fn append_line(
    state: &SharedState,
    session: &RoomSession,
    line: String,
) -> Result<(), ServiceError> {
    sync::mutate_and_broadcast(state, session.room_id, move |record| {
        record.chat_log = chat::append_log(&record.chat_log, line.clone());
        Ok(RoomDelta::chat_line(line))
    })
    .await?;
    Ok(())
}

/// Upsert the sender's user object and broadcast roster plus game data, so
/// clients reconcile both together.
pub async fn handle_update_user(
    state: &SharedState,
    session: &RoomSession,
    user: User,
) -> Result<(), ServiceError> {
    sync::mutate_and_broadcast(state, session.room_id, move |record| {
        record.users = roster::upsert_user(&record.users, user);
        Ok(RoomDelta {
            users: Some(record.users.clone()),
            game_data: Some(record.game_data.clone()),
            chat_log: None,
        })
    })
    .await?;
    Ok(())
}

/// The sender stands up mid-hand; their connection's seat template becomes
/// their fresh entry and the seat's hand is parked under "Cards Waiting".
pub async fn handle_stand_up(
    state: &SharedState,
    session: &RoomSession,
    user: User,
) -> Result<(), ServiceError> {
    let template = session.seat_template.clone();
    sync::mutate_and_broadcast(state, session.room_id, move |record| {
        record.users = roster::stand_up(&record.users, &user.name, &template);
        Ok(RoomDelta::users(record.users.clone()))
    })
    .await?;
    Ok(())
}

/// The sender picks up the cards waiting at `seat`.
pub async fn handle_remove_cards_waiting(
    state: &SharedState,
    session: &RoomSession,
    seat: &str,
) -> Result<(), ServiceError> {
    let seat = seat.to_owned();
    let user_name = session.user_name.clone();
    sync::mutate_and_broadcast(state, session.room_id, move |record| {
        record.users = roster::sit_in(&record.users, &seat, &user_name)?;
        Ok(RoomDelta::users(record.users.clone()))
    })
    .await?;
    Ok(())
}

/// Flip every seated user's in-hand status and broadcast the roster.
pub async fn handle_set_in_game(
    state: &SharedState,
    session: &RoomSession,
    status: bool,
) -> Result<(), ServiceError> {
    sync::mutate_and_broadcast(state, session.room_id, move |record| {
        record.users = roster::set_in_game_for_seated(&record.users, status);
        Ok(RoomDelta::users(record.users.clone()))
    })
    .await?;
    Ok(())
}

/// Merge a partial game-data update and broadcast the merged document.
pub async fn handle_update_game_data(
    state: &SharedState,
    session: &RoomSession,
    patch: merge::GameData,
) -> Result<(), ServiceError> {
    sync::mutate_and_broadcast(state, session.room_id, move |record| {
        record.game_data = merge::merge_game_data(&record.game_data, patch);
        Ok(RoomDelta::game_data(record.game_data.clone()))
    })
    .await?;
    Ok(())
}

/// Reconcile a disconnect: announce the departure and either drop the user
/// or park their in-progress hand under "Cards Waiting".
pub async fn handle_disconnect(
    state: &SharedState,
    session: &RoomSession,
) -> Result<(), ServiceError> {
    let user_name = session.user_name.clone();
    sync::mutate_and_broadcast(state, session.room_id, move |record| {
        let line = chat::left_line(&clock::current_clock_time(), &user_name);
        record.chat_log = chat::append_log(&record.chat_log, line.clone());
        record.users = roster::remove_on_disconnect(&record.users, &user_name);
        Ok(RoomDelta {
            users: Some(record.users.clone()),
            game_data: None,
            chat_log: Some(line),
        })
    })
    .await?;
    Ok(())
}

/// Serialize a payload onto the connection's writer channel.
fn send_message(
    tx: &mpsc::UnboundedSender<Message>,
    message: &ServerMessage,
) -> Result<(), ServiceError> {
    let payload = serde_json::to_string(message)
        .map_err(|err| ServiceError::InvalidInput(err.to_string()))?;
    tx.send(Message::Text(payload.into()))
        .map_err(|_| ServiceError::InvalidInput("connection writer closed".into()))
}

/// Error acknowledgment to the originating connection only.
fn send_error_ack(tx: &mpsc::UnboundedSender<Message>, err: &ServiceError) {
    let _ = send_message(
        tx,
        &ServerMessage::ErrorMessage {
            message: err.to_string(),
        },
    );
}

/// Ensure the writer task winds down before we return from the handler.
async fn finalize(writer_task: JoinHandle<()>, outbound_tx: mpsc::UnboundedSender<Message>) {
    drop(outbound_tx);
    let _ = writer_task.await;
}
