use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use axum::routing::get;
use axum::Router;
use clap::Parser;
use log::info;

mod handlers;
mod logic;
mod sessions;
mod state;
mod storage;

use crate::handlers::{ping_handler, ws_handler};
use crate::sessions::save_session;
use crate::state::AppState;
use crate::storage::FileStorage;

const BACKUP_INTERVAL: Duration = Duration::from_secs(60);

#[derive(Parser)]
#[command(author, version, about)]
struct Args {
    /// Directory holding one `<session id>.bin` file per board.
    #[arg(long)]
    session_dir: Option<PathBuf>,
    #[arg(long, env = "PORT", default_value_t = 3000)]
    port: u16,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let session_dir = args
        .session_dir
        .unwrap_or_else(|| PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../sessions"));
    tokio::fs::create_dir_all(&session_dir)
        .await
        .with_context(|| format!("failed to create session dir {}", session_dir.display()))?;
    let state = AppState::new(Some(FileStorage::new(session_dir)));

    tokio::spawn(backup_dirty_sessions(state.clone()));

    let app = Router::new()
        .route("/ws/:session_id", get(ws_handler))
        .route("/ping", get(ping_handler))
        .with_state(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], args.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("drawing service listening on {addr}");
    axum::serve(listener, app).await.context("server crashed")?;
    Ok(())
}

async fn backup_dirty_sessions(state: AppState) {
    let mut interval = tokio::time::interval(BACKUP_INTERVAL);
    loop {
        interval.tick().await;
        let sessions = {
            let sessions = state.sessions.read().await;
            sessions
                .iter()
                .map(|(session_id, session)| (session_id.clone(), session.clone()))
                .collect::<Vec<_>>()
        };
        for (session_id, session) in sessions {
            let maybe_data = {
                let mut session = session.write().await;
                if !session.dirty {
                    None
                } else {
                    session.dirty = false;
                    Some(session.to_session_file_data())
                }
            };
            if let Some(data) = maybe_data {
                save_session(&state, &session_id, &data).await;
            }
        }
    }
}
