mod actions;
mod app;
mod cursors;
mod events;
mod fill;
mod geometry;
mod history;
mod net;
mod raster;
mod render;
mod state;
mod store;
mod sync;
mod util;

pub use actions::{
    adopt_strokes, cancel_stroke, clear_board, end_stroke, fill_stroke, move_stroke, resize_canvas,
    start_stroke, FILL_LINE_WIDTH,
};
pub use app::App;
pub use cursors::{draw_cursors, remove_remote_cursor, update_remote_cursor};
pub use events::{CanvasEvent, EventSink, Layer};
pub use fill::{colors_match, flood_fill, FloodFill, MATCH_THRESHOLD, MAX_PENDING};
pub use history::{redo_stroke, undo_stroke};
pub use net::{decode_server_message, encode_client_message, Outbox, Transport};
pub use raster::{blend, opaque, with_alpha, Composite, Raster, Rgba, TRANSPARENT};
pub use render::{redraw, redraw_all, redraw_preview, PREVIEW_ALPHA};
pub use state::{RemoteCursor, State, StrokePhase, ToolSettings, DEFAULT_COLOR};
pub use store::StrokeStore;
pub use sync::apply_server_message;
pub use util::make_id;
