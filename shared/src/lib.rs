use std::fmt;

use bincode::{Decode, Encode};
use serde::{Deserialize, Serialize};

mod color;
pub mod geometry;
mod session_format;
mod stroke;

pub use color::{Color, ColorParseError};
pub use session_format::{
    decode_session_file, encode_session_file, SessionFileData, SessionFileDecodeError,
    SESSION_FILE_MAGIC, SESSION_FILE_VERSION,
};
pub use stroke::{
    Extension, FreehandTool, ShapeTool, Stroke, StrokeBody, StrokeError, Tool, ToolKind,
};

pub const DEFAULT_LINE_WIDTH: f64 = 5.0;
pub const MIN_LINE_WIDTH: f64 = 1.0;
pub const MAX_LINE_WIDTH: f64 = 100.0;

#[derive(Serialize, Deserialize, Encode, Decode, Clone, Copy, Debug, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// The raster pixel containing this point.
    pub fn to_pixel(self) -> Pixel {
        Pixel {
            x: self.x.floor() as i32,
            y: self.y.floor() as i32,
        }
    }
}

/// Integer raster coordinate, as recorded by a fill.
#[derive(Serialize, Deserialize, Encode, Decode, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Pixel {
    pub x: i32,
    pub y: i32,
}

impl Pixel {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

#[derive(
    Serialize, Deserialize, Encode, Decode, Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord,
)]
#[serde(transparent)]
pub struct StrokeId(pub String);

impl StrokeId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for StrokeId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for StrokeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(
    Serialize, Deserialize, Encode, Decode, Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord,
)]
#[serde(transparent)]
pub struct UserId(pub String);

impl UserId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for UserId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

pub fn normalize_point(point: Point) -> Option<Point> {
    if !point.is_finite() {
        return None;
    }
    Some(point)
}

pub fn sanitize_line_width(width: f64) -> f64 {
    let width = if width.is_finite() {
        width
    } else {
        DEFAULT_LINE_WIDTH
    };
    width.clamp(MIN_LINE_WIDTH, MAX_LINE_WIDTH)
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(tag = "type")]
pub enum ClientMessage {
    #[serde(rename = "draw-start", rename_all = "camelCase")]
    DrawStart {
        stroke_id: StrokeId,
        tool: Tool,
        color: Color,
        line_width: f64,
        x: f64,
        y: f64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        fill_pixels: Option<Vec<Pixel>>,
    },
    #[serde(rename = "draw-move", rename_all = "camelCase")]
    DrawMove { stroke_id: StrokeId, x: f64, y: f64 },
    #[serde(rename = "draw-end", rename_all = "camelCase")]
    DrawEnd { stroke_id: StrokeId },
    #[serde(rename = "cursor-move")]
    CursorMove { x: f64, y: f64 },
    #[serde(rename = "undo")]
    Undo,
    #[serde(rename = "redo")]
    Redo,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(tag = "type")]
pub enum ServerMessage {
    #[serde(rename = "welcome", rename_all = "camelCase")]
    Welcome { user_id: UserId, color: Color },
    #[serde(rename = "draw-start", rename_all = "camelCase")]
    DrawStart {
        stroke_id: StrokeId,
        tool: Tool,
        color: Color,
        line_width: f64,
        x: f64,
        y: f64,
        user_id: UserId,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        fill_pixels: Option<Vec<Pixel>>,
    },
    #[serde(rename = "draw-move", rename_all = "camelCase")]
    DrawMove { stroke_id: StrokeId, x: f64, y: f64 },
    #[serde(rename = "draw-end", rename_all = "camelCase")]
    DrawEnd { stroke_id: StrokeId },
    #[serde(rename = "cursor-update", rename_all = "camelCase")]
    CursorUpdate {
        user_id: UserId,
        x: f64,
        y: f64,
        color: Color,
    },
    #[serde(rename = "user-left", rename_all = "camelCase")]
    UserLeft { user_id: UserId },
    #[serde(rename = "history-snapshot")]
    HistorySnapshot { strokes: Vec<Stroke> },
    #[serde(rename = "undo-applied", rename_all = "camelCase")]
    UndoApplied { stroke_id: StrokeId },
    #[serde(rename = "redo-applied")]
    RedoApplied { stroke: Stroke },
}
