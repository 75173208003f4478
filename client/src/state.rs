use std::collections::{BTreeMap, HashSet};

use syncsketch_shared::{
    sanitize_line_width, Color, Point, Stroke, StrokeId, Tool, UserId, DEFAULT_LINE_WIDTH,
};

use crate::events::Layer;
use crate::raster::Raster;
use crate::store::StrokeStore;

pub const DEFAULT_COLOR: Color = Color::rgb(0x9e, 0x1c, 0x60);

/// What the local participant draws with next.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ToolSettings {
    pub tool: Tool,
    pub color: Color,
    pub line_width: f64,
}

impl Default for ToolSettings {
    fn default() -> Self {
        Self {
            tool: Tool::Brush,
            color: DEFAULT_COLOR,
            line_width: DEFAULT_LINE_WIDTH,
        }
    }
}

impl ToolSettings {
    pub fn set_line_width(&mut self, width: f64) {
        self.line_width = sanitize_line_width(width);
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RemoteCursor {
    pub position: Point,
    pub color: Color,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StrokePhase {
    Idle,
    Active,
    Committed,
}

/// Everything one canvas owns. Freehand strokes live in the store from their
/// first point on and are tracked in `active_ids` until they end; anchor-pair
/// strokes stay in `pending` and only reach the store once expanded.
/// Freehand strokes adopted from a history snapshot may still be in flight
/// elsewhere; they sit in `resumable` and keep accepting points until their
/// end arrives.
pub struct State {
    pub store: StrokeStore,
    pub raster: Raster,
    pub preview: Raster,
    pub overlay: Raster,
    pub active_ids: HashSet<StrokeId>,
    pub resumable: HashSet<StrokeId>,
    pub pending: BTreeMap<StrokeId, Stroke>,
    pub cursors: BTreeMap<UserId, RemoteCursor>,
}

impl State {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            store: StrokeStore::new(),
            raster: Raster::new(width, height),
            preview: Raster::new(width, height),
            overlay: Raster::new(width, height),
            active_ids: HashSet::new(),
            resumable: HashSet::new(),
            pending: BTreeMap::new(),
            cursors: BTreeMap::new(),
        }
    }

    pub fn width(&self) -> u32 {
        self.raster.width()
    }

    pub fn height(&self) -> u32 {
        self.raster.height()
    }

    pub fn phase(&self, id: &StrokeId) -> StrokePhase {
        if self.pending.contains_key(id) || self.active_ids.contains(id) {
            StrokePhase::Active
        } else if self.store.contains(id) {
            StrokePhase::Committed
        } else {
            StrokePhase::Idle
        }
    }

    /// The layer an active stroke repaints while it is being built.
    pub fn authoring_layer(&self, id: &StrokeId) -> Option<Layer> {
        if self.pending.contains_key(id) {
            Some(Layer::Preview)
        } else if self.active_ids.contains(id)
            || (self.resumable.contains(id) && self.store.contains(id))
        {
            Some(Layer::Main)
        } else {
            None
        }
    }

    /// Main raster with the preview and cursor layers stacked on top.
    pub fn composite(&self) -> Raster {
        let mut out = self.raster.clone();
        out.draw_over(&self.preview);
        out.draw_over(&self.overlay);
        out
    }
}
