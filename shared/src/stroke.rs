use bincode::{Decode, Encode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::geometry::expand;
use crate::{normalize_point, Color, Pixel, Point, StrokeId, UserId};

#[derive(Serialize, Deserialize, Encode, Decode, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Tool {
    Brush,
    Eraser,
    Sparkle,
    Line,
    Rectangle,
    Square,
    Circle,
    Triangle,
    Fill,
}

/// Tools that accumulate every pointer position into their path.
#[derive(Encode, Decode, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FreehandTool {
    Brush,
    Eraser,
    Sparkle,
}

/// Tools defined by an anchor pair and expanded into a polygon on commit.
#[derive(Encode, Decode, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ShapeTool {
    Line,
    Rectangle,
    Square,
    Circle,
    Triangle,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ToolKind {
    Freehand(FreehandTool),
    Shape(ShapeTool),
    Fill,
}

impl Tool {
    pub const ALL: [Tool; 9] = [
        Tool::Brush,
        Tool::Eraser,
        Tool::Sparkle,
        Tool::Line,
        Tool::Rectangle,
        Tool::Square,
        Tool::Circle,
        Tool::Triangle,
        Tool::Fill,
    ];

    pub fn kind(self) -> ToolKind {
        match self {
            Tool::Brush => ToolKind::Freehand(FreehandTool::Brush),
            Tool::Eraser => ToolKind::Freehand(FreehandTool::Eraser),
            Tool::Sparkle => ToolKind::Freehand(FreehandTool::Sparkle),
            Tool::Line => ToolKind::Shape(ShapeTool::Line),
            Tool::Rectangle => ToolKind::Shape(ShapeTool::Rectangle),
            Tool::Square => ToolKind::Shape(ShapeTool::Square),
            Tool::Circle => ToolKind::Shape(ShapeTool::Circle),
            Tool::Triangle => ToolKind::Shape(ShapeTool::Triangle),
            Tool::Fill => ToolKind::Fill,
        }
    }
}

impl From<FreehandTool> for Tool {
    fn from(tool: FreehandTool) -> Self {
        match tool {
            FreehandTool::Brush => Tool::Brush,
            FreehandTool::Eraser => Tool::Eraser,
            FreehandTool::Sparkle => Tool::Sparkle,
        }
    }
}

impl From<ShapeTool> for Tool {
    fn from(tool: ShapeTool) -> Self {
        match tool {
            ShapeTool::Line => Tool::Line,
            ShapeTool::Rectangle => Tool::Rectangle,
            ShapeTool::Square => Tool::Square,
            ShapeTool::Circle => Tool::Circle,
            ShapeTool::Triangle => Tool::Triangle,
        }
    }
}

#[derive(Encode, Decode, Clone, Debug, PartialEq)]
pub enum StrokeBody {
    Freehand {
        tool: FreehandTool,
        points: Vec<Point>,
    },
    /// `points` stays empty until [`Stroke::finalize`]; before that only the
    /// anchors are authoritative.
    Shape {
        tool: ShapeTool,
        start: Point,
        end: Point,
        points: Vec<Point>,
    },
    /// `pixels` is captured once when the fill happens and replayed verbatim.
    Fill { seed: Point, pixels: Vec<Pixel> },
}

/// One atomic drawing action: the unit of storage, rendering and undo.
#[derive(Serialize, Deserialize, Encode, Decode, Clone, Debug, PartialEq)]
#[serde(try_from = "WireStroke", into = "WireStroke")]
pub struct Stroke {
    pub id: StrokeId,
    pub color: Color,
    pub line_width: f64,
    pub user_id: UserId,
    pub body: StrokeBody,
}

/// What a single `extend` did to a stroke.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Extension {
    /// A freehand path grew by one segment.
    Segment { from: Point, to: Point },
    /// A shape's moving anchor was updated.
    Anchor,
    /// The stroke does not accept further points.
    Ignored,
}

#[derive(Debug, Error, PartialEq)]
pub enum StrokeError {
    #[error("stroke {id} has invalid line width {width}")]
    InvalidLineWidth { id: StrokeId, width: f64 },
    #[error("{tool:?} stroke {id} has no anchor point")]
    MissingAnchor { id: StrokeId, tool: Tool },
}

impl Stroke {
    /// Creates a stroke in its just-started form: freehand tools take the
    /// anchor as their first point, shapes start with `end == start`, fills
    /// start with an empty pixel set.
    pub fn begin(
        id: StrokeId,
        tool: Tool,
        color: Color,
        line_width: f64,
        anchor: Point,
        user_id: UserId,
    ) -> Self {
        let body = match tool.kind() {
            ToolKind::Freehand(tool) => StrokeBody::Freehand {
                tool,
                points: vec![anchor],
            },
            ToolKind::Shape(tool) => StrokeBody::Shape {
                tool,
                start: anchor,
                end: anchor,
                points: Vec::new(),
            },
            ToolKind::Fill => StrokeBody::Fill {
                seed: anchor,
                pixels: Vec::new(),
            },
        };
        Self {
            id,
            color,
            line_width,
            user_id,
            body,
        }
    }

    pub fn tool(&self) -> Tool {
        match &self.body {
            StrokeBody::Freehand { tool, .. } => (*tool).into(),
            StrokeBody::Shape { tool, .. } => (*tool).into(),
            StrokeBody::Fill { .. } => Tool::Fill,
        }
    }

    /// Path or finalized polygon; a fill reports its seed.
    pub fn points(&self) -> &[Point] {
        match &self.body {
            StrokeBody::Freehand { points, .. } | StrokeBody::Shape { points, .. } => points,
            StrokeBody::Fill { seed, .. } => std::slice::from_ref(seed),
        }
    }

    pub fn extend(&mut self, point: Point) -> Extension {
        match &mut self.body {
            StrokeBody::Freehand { points, .. } => {
                let from = points.last().copied().unwrap_or(point);
                points.push(point);
                Extension::Segment { from, to: point }
            }
            StrokeBody::Shape { end, .. } => {
                *end = point;
                Extension::Anchor
            }
            StrokeBody::Fill { .. } => Extension::Ignored,
        }
    }

    /// Expands a shape's anchors into its final polygon. Freehand paths and
    /// fills are already final.
    pub fn finalize(&mut self) {
        if let StrokeBody::Shape {
            tool,
            start,
            end,
            points,
        } = &mut self.body
        {
            *points = expand(*tool, *start, *end);
        }
    }

    pub fn point_count(&self) -> usize {
        match &self.body {
            StrokeBody::Freehand { points, .. } | StrokeBody::Shape { points, .. } => points.len(),
            StrokeBody::Fill { pixels, .. } => pixels.len(),
        }
    }
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireStroke {
    id: StrokeId,
    tool: Tool,
    color: Color,
    line_width: f64,
    #[serde(default)]
    points: Vec<Point>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    start: Option<Point>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    end: Option<Point>,
    #[serde(default)]
    user_id: UserId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    fill_pixels: Option<Vec<Pixel>>,
}

impl TryFrom<WireStroke> for Stroke {
    type Error = StrokeError;

    fn try_from(wire: WireStroke) -> Result<Self, Self::Error> {
        if !wire.line_width.is_finite() || wire.line_width <= 0.0 {
            return Err(StrokeError::InvalidLineWidth {
                id: wire.id,
                width: wire.line_width,
            });
        }
        let points = wire
            .points
            .into_iter()
            .filter_map(normalize_point)
            .collect::<Vec<_>>();
        let start = wire.start.and_then(normalize_point);
        let end = wire.end.and_then(normalize_point);
        let body = match wire.tool.kind() {
            ToolKind::Freehand(tool) => StrokeBody::Freehand { tool, points },
            ToolKind::Shape(tool) => {
                let Some(start) = start.or_else(|| points.first().copied()) else {
                    return Err(StrokeError::MissingAnchor {
                        id: wire.id,
                        tool: wire.tool,
                    });
                };
                let end = end.or_else(|| points.last().copied()).unwrap_or(start);
                StrokeBody::Shape {
                    tool,
                    start,
                    end,
                    points,
                }
            }
            ToolKind::Fill => {
                let Some(seed) = points.first().copied().or(start) else {
                    return Err(StrokeError::MissingAnchor {
                        id: wire.id,
                        tool: wire.tool,
                    });
                };
                StrokeBody::Fill {
                    seed,
                    pixels: wire.fill_pixels.unwrap_or_default(),
                }
            }
        };
        Ok(Self {
            id: wire.id,
            color: wire.color,
            line_width: wire.line_width,
            user_id: wire.user_id,
            body,
        })
    }
}

impl From<Stroke> for WireStroke {
    fn from(stroke: Stroke) -> Self {
        let tool = stroke.tool();
        let (points, start, end, fill_pixels) = match stroke.body {
            StrokeBody::Freehand { points, .. } => (points, None, None, None),
            StrokeBody::Shape {
                start, end, points, ..
            } => (points, Some(start), Some(end), None),
            StrokeBody::Fill { seed, pixels } => (vec![seed], None, None, Some(pixels)),
        };
        Self {
            id: stroke.id,
            tool,
            color: stroke.color,
            line_width: stroke.line_width,
            points,
            start,
            end,
            user_id: stroke.user_id,
            fill_pixels,
        }
    }
}
