use std::sync::Arc;

use log::{info, warn};
use tokio::sync::RwLock;
use uuid::Uuid;

use syncsketch_shared::SessionFileData;

use crate::logic::sanitize_strokes;
use crate::state::{AppState, Session};
use crate::storage::StorageError;

pub fn normalize_session_id(value: &str) -> Option<String> {
    let parsed = Uuid::parse_str(value).ok()?;
    Some(parsed.to_string())
}

pub async fn get_or_create_session(state: &AppState, session_id: &str) -> Arc<RwLock<Session>> {
    if let Some(session) = state.sessions.read().await.get(session_id).cloned() {
        return session;
    }
    let strokes = match &state.storage {
        Some(storage) => match storage.load_session(session_id).await {
            Ok(data) => {
                info!("loaded session {session_id} with {} strokes", data.strokes.len());
                data.strokes
            }
            Err(StorageError::Io(error)) if error.kind() == std::io::ErrorKind::NotFound => {
                info!("creating session {session_id}");
                Vec::new()
            }
            Err(error) => {
                warn!("failed to load session {session_id}: {error}");
                Vec::new()
            }
        },
        None => Vec::new(),
    };
    let session = Arc::new(RwLock::new(Session::new(sanitize_strokes(strokes))));
    let mut sessions = state.sessions.write().await;
    let entry = sessions
        .entry(session_id.to_string())
        .or_insert_with(|| session.clone());
    entry.clone()
}

pub async fn save_session(state: &AppState, session_id: &str, data: &SessionFileData) {
    let Some(storage) = &state.storage else {
        return;
    };
    match storage.save_session(session_id, data).await {
        Ok(()) => info!("saved session {session_id} ({} strokes)", data.strokes.len()),
        Err(error) => warn!("failed to save session {session_id}: {error}"),
    }
}
