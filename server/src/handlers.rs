use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use futures_util::{SinkExt, StreamExt};
use log::{debug, info, warn};
use syncsketch_shared::{ClientMessage, ServerMessage};
use tokio::sync::{mpsc, RwLock};
use uuid::Uuid;

use crate::logic::handle_client_message;
use crate::sessions::{get_or_create_session, normalize_session_id, save_session};
use crate::state::{AppState, Session};

pub async fn ping_handler() -> impl IntoResponse {
    StatusCode::NO_CONTENT
}

pub async fn ws_handler(
    Path(session_id): Path<String>,
    State(state): State<AppState>,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    let session_id = match normalize_session_id(&session_id) {
        Some(id) => id,
        None => return StatusCode::NOT_FOUND.into_response(),
    };
    ws.on_upgrade(move |socket| handle_socket(socket, state, session_id))
}

async fn handle_socket(socket: WebSocket, state: AppState, session_id: String) {
    let (mut socket_sender, mut socket_receiver) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel::<ServerMessage>();
    let connection_id = Uuid::new_v4();

    let session = get_or_create_session(&state, &session_id).await;
    {
        let mut session = session.write().await;
        let (user_id, color) = session.join(connection_id, tx.clone());
        info!(
            "connected session={session_id} user={user_id} peers={}",
            session.peers.len()
        );
        // Queued under the lock so no broadcast lands ahead of the snapshot.
        let _ = tx.send(ServerMessage::Welcome { user_id, color });
        let _ = tx.send(ServerMessage::HistorySnapshot {
            strokes: session.strokes.clone(),
        });
    }
    drop(tx);

    let send_task = tokio::spawn(async move {
        while let Some(message) = rx.recv().await {
            let payload = match serde_json::to_string(&message) {
                Ok(payload) => payload,
                Err(error) => {
                    warn!("failed to encode outbound message: {error}");
                    continue;
                }
            };
            if socket_sender.send(Message::Text(payload)).await.is_err() {
                break;
            }
        }
    });

    while let Some(Ok(message)) = socket_receiver.next().await {
        match message {
            Message::Text(text) => {
                let client_message = match serde_json::from_str::<ClientMessage>(&text) {
                    Ok(client_message) => client_message,
                    Err(error) => {
                        debug!("ignoring malformed frame from {connection_id}: {error}");
                        continue;
                    }
                };
                let mut session_guard = session.write().await;
                handle_client_message(&mut session_guard, connection_id, client_message);
            }
            Message::Close(frame) => {
                if let Some(frame) = frame {
                    debug!(
                        "close frame session={session_id} conn={connection_id} code={} reason={}",
                        frame.code, frame.reason
                    );
                }
                break;
            }
            _ => {}
        }
    }

    {
        let mut session = session.write().await;
        if let Some(peer) = session.leave(connection_id) {
            session.broadcast(
                &ServerMessage::UserLeft {
                    user_id: peer.user_id,
                },
                None,
            );
        }
        info!(
            "disconnected session={session_id} conn={connection_id} peers={}",
            session.peers.len()
        );
    }
    send_task.abort();

    unload_if_abandoned(&state, &session_id, &session).await;
}

/// Saves and unloads a session nobody is connected to anymore. A newer
/// session registered under the same id is left alone.
async fn unload_if_abandoned(state: &AppState, session_id: &str, session: &Arc<RwLock<Session>>) {
    let pending_save = {
        let mut guard = session.write().await;
        if !guard.peers.is_empty() {
            return;
        }
        std::mem::take(&mut guard.dirty).then(|| guard.to_session_file_data())
    };
    if let Some(data) = pending_save {
        save_session(state, session_id, &data).await;
    }
    let mut sessions = state.sessions.write().await;
    let still_registered = sessions
        .get(session_id)
        .is_some_and(|current| Arc::ptr_eq(current, session));
    if still_registered {
        sessions.remove(session_id);
        debug!("unloaded session {session_id}");
    }
}
