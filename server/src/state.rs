use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use syncsketch_shared::{Color, ServerMessage, SessionFileData, Stroke, StrokeId, UserId};
use tokio::sync::{mpsc, RwLock};
use uuid::Uuid;

use crate::storage::FileStorage;

pub const MAX_STROKES: usize = 2000;
pub const MAX_POINTS_PER_STROKE: usize = 5000;
pub const MAX_FILL_PIXELS: usize = 1 << 20;

/// Cursor colors handed out to participants in join order.
pub const CURSOR_COLORS: [Color; 8] = [
    Color::rgb(0xff, 0x6b, 0x6b),
    Color::rgb(0x4e, 0xcd, 0xc4),
    Color::rgb(0x45, 0xb7, 0xd1),
    Color::rgb(0xf9, 0xa8, 0x25),
    Color::rgb(0x96, 0x6b, 0xd8),
    Color::rgb(0x2e, 0xcc, 0x71),
    Color::rgb(0xe6, 0x7e, 0x22),
    Color::rgb(0xe8, 0x43, 0x93),
];

#[derive(Clone)]
pub struct AppState {
    pub sessions: Arc<RwLock<HashMap<String, Arc<RwLock<Session>>>>>,
    pub storage: Option<Arc<FileStorage>>,
}

impl AppState {
    pub fn new(storage: Option<FileStorage>) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            storage: storage.map(Arc::new),
        }
    }
}

pub struct Peer {
    pub user_id: UserId,
    pub color: Color,
    pub tx: mpsc::UnboundedSender<ServerMessage>,
}

/// Per-connection history. Undo entries name strokes still on the board;
/// redo entries carry the full stroke that was taken off it.
#[derive(Default)]
pub struct ClientHistory {
    pub undo: Vec<StrokeId>,
    pub redo: Vec<Stroke>,
}

pub struct Session {
    pub strokes: Vec<Stroke>,
    pub active_ids: HashSet<StrokeId>,
    pub owners: HashMap<StrokeId, Uuid>,
    pub histories: HashMap<Uuid, ClientHistory>,
    pub peers: HashMap<Uuid, Peer>,
    pub dirty: bool,
    joined: usize,
}

impl Session {
    pub fn new(strokes: Vec<Stroke>) -> Self {
        Self {
            strokes,
            active_ids: HashSet::new(),
            owners: HashMap::new(),
            histories: HashMap::new(),
            peers: HashMap::new(),
            dirty: false,
            joined: 0,
        }
    }

    /// Registers a connection and assigns it an identity and cursor color.
    pub fn join(
        &mut self,
        connection_id: Uuid,
        tx: mpsc::UnboundedSender<ServerMessage>,
    ) -> (UserId, Color) {
        let user_id = UserId::new(connection_id.to_string());
        let color = CURSOR_COLORS[self.joined % CURSOR_COLORS.len()];
        self.joined += 1;
        self.peers.insert(
            connection_id,
            Peer {
                user_id: user_id.clone(),
                color,
                tx,
            },
        );
        self.histories.insert(connection_id, ClientHistory::default());
        (user_id, color)
    }

    /// Queues `message` on every peer channel except `skip`'s. Peers whose
    /// channel has closed are dropped.
    pub fn broadcast(&mut self, message: &ServerMessage, skip: Option<Uuid>) {
        let stale: Vec<Uuid> = self
            .peers
            .iter()
            .filter(|(id, _)| Some(**id) != skip)
            .filter(|(_, peer)| peer.tx.send(message.clone()).is_err())
            .map(|(id, _)| *id)
            .collect();
        for id in stale {
            self.leave(id);
        }
    }

    pub fn leave(&mut self, connection_id: Uuid) -> Option<Peer> {
        self.histories.remove(&connection_id);
        self.peers.remove(&connection_id)
    }

    pub fn to_session_file_data(&self) -> SessionFileData {
        SessionFileData {
            strokes: self.strokes.clone(),
        }
    }
}
