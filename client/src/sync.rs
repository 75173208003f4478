use log::debug;

use syncsketch_shared::{Point, ServerMessage, Tool};

use crate::actions::{adopt_strokes, end_stroke, fill_stroke, move_stroke, start_stroke};
use crate::cursors::{remove_remote_cursor, update_remote_cursor};
use crate::events::{CanvasEvent, EventSink, Layer};
use crate::history::{redo_stroke, undo_stroke};
use crate::state::{State, StrokePhase};

/// Applies one inbound message to `state`, replaying remote strokes through
/// the same state machine local input uses.
pub fn apply_server_message<S: EventSink + ?Sized>(
    state: &mut State,
    message: ServerMessage,
    sink: &mut S,
) {
    match message {
        ServerMessage::Welcome { user_id, color } => {
            sink.emit(CanvasEvent::Joined { user_id, color });
        }
        ServerMessage::DrawStart {
            stroke_id,
            tool,
            color,
            line_width,
            x,
            y,
            user_id,
            fill_pixels,
        } => {
            let anchor = Point::new(x, y);
            if tool == Tool::Fill {
                if fill_stroke(state, stroke_id.clone(), color, anchor, user_id, fill_pixels) {
                    sink.emit(CanvasEvent::LayerChanged(Layer::Main));
                    sink.emit(CanvasEvent::StrokeCommitted(stroke_id));
                }
                return;
            }
            if start_stroke(state, stroke_id.clone(), tool, color, line_width, anchor, user_id) {
                if let Some(layer) = state.authoring_layer(&stroke_id) {
                    sink.emit(CanvasEvent::LayerChanged(layer));
                }
            }
        }
        ServerMessage::DrawMove { stroke_id, x, y } => {
            let Some(layer) = state.authoring_layer(&stroke_id) else {
                debug!("remote move for inactive stroke {stroke_id}");
                return;
            };
            if move_stroke(state, &stroke_id, Point::new(x, y)) {
                sink.emit(CanvasEvent::LayerChanged(layer));
            }
        }
        ServerMessage::DrawEnd { stroke_id } => {
            if state.phase(&stroke_id) != StrokePhase::Active {
                end_stroke(state, &stroke_id);
                return;
            }
            let was_shape = state.authoring_layer(&stroke_id) == Some(Layer::Preview);
            if end_stroke(state, &stroke_id) {
                if was_shape {
                    sink.emit(CanvasEvent::LayerChanged(Layer::Preview));
                    sink.emit(CanvasEvent::LayerChanged(Layer::Main));
                }
                sink.emit(CanvasEvent::StrokeCommitted(stroke_id));
            }
        }
        ServerMessage::CursorUpdate {
            user_id,
            x,
            y,
            color,
        } => {
            update_remote_cursor(state, user_id, Point::new(x, y), color);
            sink.emit(CanvasEvent::LayerChanged(Layer::Overlay));
        }
        ServerMessage::UserLeft { user_id } => {
            if remove_remote_cursor(state, &user_id) {
                sink.emit(CanvasEvent::LayerChanged(Layer::Overlay));
            }
        }
        ServerMessage::HistorySnapshot { strokes } => {
            adopt_strokes(state, strokes);
            sink.emit(CanvasEvent::HistoryReplaced {
                strokes: state.store.len(),
            });
            sink.emit(CanvasEvent::LayerChanged(Layer::Main));
            sink.emit(CanvasEvent::LayerChanged(Layer::Preview));
        }
        ServerMessage::UndoApplied { stroke_id } => {
            if undo_stroke(state, &stroke_id).is_some() {
                sink.emit(CanvasEvent::StrokeRemoved(stroke_id));
                sink.emit(CanvasEvent::LayerChanged(Layer::Main));
            }
        }
        ServerMessage::RedoApplied { stroke } => {
            let id = stroke.id.clone();
            redo_stroke(state, stroke);
            sink.emit(CanvasEvent::StrokeCommitted(id));
            sink.emit(CanvasEvent::LayerChanged(Layer::Main));
        }
    }
}
