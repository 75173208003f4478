use log::{debug, info};

use syncsketch_shared::{
    normalize_point, sanitize_line_width, ClientMessage, Color, Point, ServerMessage, StrokeBody,
    StrokeId, Tool, ToolKind, UserId,
};

use crate::actions::{
    cancel_stroke, clear_board, end_stroke, fill_stroke, move_stroke, resize_canvas, start_stroke,
    FILL_LINE_WIDTH,
};
use crate::events::{CanvasEvent, EventSink, Layer};
use crate::net::{decode_server_message, Transport};
use crate::state::{State, ToolSettings};
use crate::sync::apply_server_message;
use crate::util::make_id;

/// One participant's canvas: local pointer input goes out through the
/// transport, inbound messages come back through [`App::handle_message`].
pub struct App<T: Transport, S: EventSink> {
    state: State,
    transport: T,
    sink: S,
    settings: ToolSettings,
    user_id: UserId,
    cursor_color: Option<Color>,
    authoring: Option<StrokeId>,
}

impl<T: Transport, S: EventSink> App<T, S> {
    pub fn new(width: u32, height: u32, transport: T, sink: S) -> Self {
        Self {
            state: State::new(width, height),
            transport,
            sink,
            settings: ToolSettings::default(),
            user_id: UserId::default(),
            cursor_color: None,
            authoring: None,
        }
    }

    pub fn state(&self) -> &State {
        &self.state
    }

    pub fn settings(&self) -> &ToolSettings {
        &self.settings
    }

    pub fn set_tool(&mut self, tool: Tool) {
        self.settings.tool = tool;
    }

    pub fn set_color(&mut self, color: Color) {
        self.settings.color = color;
    }

    pub fn set_line_width(&mut self, width: f64) {
        self.settings.set_line_width(width);
    }

    /// Empty until the service has welcomed us.
    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    pub fn cursor_color(&self) -> Option<Color> {
        self.cursor_color
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn authoring(&self) -> Option<&StrokeId> {
        self.authoring.as_ref()
    }

    pub fn pointer_down(&mut self, point: Point) {
        let Some(point) = normalize_point(point) else {
            return;
        };
        if self.authoring.is_some() {
            self.pointer_up();
        }
        let ToolSettings {
            tool,
            color,
            line_width,
        } = self.settings;
        let id = make_id();

        match tool.kind() {
            ToolKind::Fill => self.fill_at(id, point),
            ToolKind::Shape(_) => {
                if start_stroke(
                    &mut self.state,
                    id.clone(),
                    tool,
                    color,
                    line_width,
                    point,
                    self.user_id.clone(),
                ) {
                    self.sink.emit(CanvasEvent::LayerChanged(Layer::Preview));
                    self.authoring = Some(id);
                }
            }
            ToolKind::Freehand(_) => {
                if start_stroke(
                    &mut self.state,
                    id.clone(),
                    tool,
                    color,
                    line_width,
                    point,
                    self.user_id.clone(),
                ) {
                    self.transport.send(&ClientMessage::DrawStart {
                        stroke_id: id.clone(),
                        tool,
                        color,
                        line_width: sanitize_line_width(line_width),
                        x: point.x,
                        y: point.y,
                        fill_pixels: None,
                    });
                    self.sink.emit(CanvasEvent::LayerChanged(Layer::Main));
                    self.authoring = Some(id);
                }
            }
        }
    }

    fn fill_at(&mut self, id: StrokeId, point: Point) {
        let color = self.settings.color;
        if !fill_stroke(
            &mut self.state,
            id.clone(),
            color,
            point,
            self.user_id.clone(),
            None,
        ) {
            debug!("fill at ({}, {}) changed nothing", point.x, point.y);
            return;
        }
        let pixels = match self.state.store.get(&id).map(|stroke| &stroke.body) {
            Some(StrokeBody::Fill { pixels, .. }) => pixels.clone(),
            _ => return,
        };
        self.transport.send(&ClientMessage::DrawStart {
            stroke_id: id.clone(),
            tool: Tool::Fill,
            color,
            line_width: FILL_LINE_WIDTH,
            x: point.x,
            y: point.y,
            fill_pixels: Some(pixels),
        });
        self.transport.send(&ClientMessage::DrawEnd {
            stroke_id: id.clone(),
        });
        self.sink.emit(CanvasEvent::LayerChanged(Layer::Main));
        self.sink.emit(CanvasEvent::StrokeCommitted(id));
    }

    pub fn pointer_move(&mut self, point: Point) {
        let Some(point) = normalize_point(point) else {
            return;
        };
        self.transport.send(&ClientMessage::CursorMove {
            x: point.x,
            y: point.y,
        });
        let Some(id) = self.authoring.clone() else {
            return;
        };
        let Some(layer) = self.state.authoring_layer(&id) else {
            self.authoring = None;
            return;
        };
        if !move_stroke(&mut self.state, &id, point) {
            return;
        }
        if layer == Layer::Main {
            self.transport.send(&ClientMessage::DrawMove {
                stroke_id: id,
                x: point.x,
                y: point.y,
            });
        }
        self.sink.emit(CanvasEvent::LayerChanged(layer));
    }

    /// Commits the stroke being authored. Shapes are announced only now, as
    /// start, move to the final anchor, and end.
    pub fn pointer_up(&mut self) {
        let Some(id) = self.authoring.take() else {
            return;
        };
        let shape = self.state.pending.get(&id).and_then(|stroke| match stroke.body {
            StrokeBody::Shape { start, end, .. } => {
                Some((stroke.tool(), stroke.color, stroke.line_width, start, end))
            }
            _ => None,
        });
        if !end_stroke(&mut self.state, &id) {
            return;
        }
        match shape {
            Some((tool, color, line_width, start, end)) => {
                self.transport.send(&ClientMessage::DrawStart {
                    stroke_id: id.clone(),
                    tool,
                    color,
                    line_width,
                    x: start.x,
                    y: start.y,
                    fill_pixels: None,
                });
                self.transport.send(&ClientMessage::DrawMove {
                    stroke_id: id.clone(),
                    x: end.x,
                    y: end.y,
                });
                self.transport.send(&ClientMessage::DrawEnd {
                    stroke_id: id.clone(),
                });
                self.sink.emit(CanvasEvent::LayerChanged(Layer::Preview));
                self.sink.emit(CanvasEvent::LayerChanged(Layer::Main));
            }
            None => {
                self.transport.send(&ClientMessage::DrawEnd {
                    stroke_id: id.clone(),
                });
            }
        }
        self.sink.emit(CanvasEvent::StrokeCommitted(id));
    }

    /// The pointer left the canvas: shapes are dropped without a trace,
    /// freehand strokes end where they are.
    pub fn pointer_leave(&mut self) {
        let Some(id) = self.authoring.as_ref() else {
            return;
        };
        if self.state.authoring_layer(id) != Some(Layer::Preview) {
            self.pointer_up();
            return;
        }
        if let Some(id) = self.authoring.take() {
            cancel_stroke(&mut self.state, &id);
            self.sink.emit(CanvasEvent::LayerChanged(Layer::Preview));
        }
    }

    pub fn request_undo(&mut self) {
        self.transport.send(&ClientMessage::Undo);
    }

    pub fn request_redo(&mut self) {
        self.transport.send(&ClientMessage::Redo);
    }

    pub fn handle_message(&mut self, message: ServerMessage) {
        if let ServerMessage::Welcome { user_id, color } = &message {
            info!("joined as {user_id}");
            self.user_id = user_id.clone();
            self.cursor_color = Some(*color);
        }
        if matches!(message, ServerMessage::HistorySnapshot { .. }) {
            self.authoring = None;
        }
        apply_server_message(&mut self.state, message, &mut self.sink);
    }

    /// Decodes one JSON frame and applies it.
    pub fn handle_text(&mut self, text: &str) -> Result<(), serde_json::Error> {
        let message = decode_server_message(text)?;
        self.handle_message(message);
        Ok(())
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        resize_canvas(&mut self.state, width, height);
        for layer in [Layer::Main, Layer::Preview, Layer::Overlay] {
            self.sink.emit(CanvasEvent::LayerChanged(layer));
        }
    }

    /// Wipes the local board only; peers are not told.
    pub fn clear(&mut self) {
        clear_board(&mut self.state);
        self.authoring = None;
        self.sink.emit(CanvasEvent::LayerChanged(Layer::Main));
        self.sink.emit(CanvasEvent::LayerChanged(Layer::Preview));
    }

    pub fn into_parts(self) -> (State, T, S) {
        (self.state, self.transport, self.sink)
    }
}
