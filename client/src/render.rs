use std::f64::consts::PI;

use syncsketch_shared::geometry::expand;
use syncsketch_shared::{Color, Extension, FreehandTool, Pixel, Point, Stroke, StrokeBody};

use crate::cursors::draw_cursors;
use crate::geometry::{distance, Bounds};
use crate::raster::{opaque, with_alpha, Composite, Raster, Rgba};
use crate::state::State;

/// Alpha of anchor-pair strokes while they are being authored.
pub const PREVIEW_ALPHA: u8 = 128;
const SPARKLE_PARTICLE_RADIUS: f64 = 2.0;
const SPARKLE_DIM: f64 = 0.7;

fn freehand_paint(tool: FreehandTool, color: Color) -> (Rgba<u8>, Composite) {
    match tool {
        FreehandTool::Eraser => (Rgba([0, 0, 0, 255]), Composite::DestinationOut),
        FreehandTool::Brush | FreehandTool::Sparkle => (opaque(color), Composite::SourceOver),
    }
}

/// First point of a freehand stroke. Sparkle strokes burst instead.
pub fn draw_dot(raster: &mut Raster, tool: FreehandTool, point: Point, color: Color, width: f64) {
    if tool == FreehandTool::Sparkle {
        draw_sparkle(raster, point, color, width);
        return;
    }
    let (src, op) = freehand_paint(tool, color);
    raster.fill_disc(point, width / 2.0, src, op);
}

/// One incremental step of a freehand stroke ending at `to`.
pub fn draw_segment(
    raster: &mut Raster,
    tool: FreehandTool,
    from: Point,
    to: Point,
    color: Color,
    width: f64,
) {
    if tool == FreehandTool::Sparkle {
        draw_sparkle(raster, to, color, width);
        return;
    }
    let (src, op) = freehand_paint(tool, color);
    raster.stroke_polyline(&[from, to], width, src, op);
}

fn sparkle_shade(core: Color, dim: Color, t: f64) -> Option<Rgba<u8>> {
    if t > 1.0 {
        return None;
    }
    let lerp = |a: u8, b: u8, k: f64| (a as f64 + (b as f64 - a as f64) * k).round() as u8;
    if t <= 0.5 {
        let k = t / 0.5;
        Some(Rgba([
            lerp(core.r, dim.r, k),
            lerp(core.g, dim.g, k),
            lerp(core.b, dim.b, k),
            255,
        ]))
    } else {
        let k = (t - 0.5) / 0.5;
        Some(with_alpha(dim, lerp(255, 0, k)))
    }
}

/// Additive glow of radius `2 * width` plus three particles around it.
pub fn draw_sparkle(raster: &mut Raster, center: Point, color: Color, width: f64) {
    let radius = width * 2.0;
    let dim = color.scaled(SPARKLE_DIM);
    if let Some(bounds) = Bounds::around(&[center], radius, raster.width(), raster.height()) {
        raster.shade(bounds, Composite::Lighter, |point| {
            sparkle_shade(color, dim, distance(point, center) / radius)
        });
    }
    let offset = width * 1.5;
    for i in 0..3 {
        let angle = (PI * 2.0 * i as f64) / 3.0;
        let particle = Point::new(center.x + angle.cos() * offset, center.y + angle.sin() * offset);
        raster.fill_disc(
            particle,
            SPARKLE_PARTICLE_RADIUS,
            opaque(color),
            Composite::Lighter,
        );
    }
}

/// Writes the recorded pixels opaque, replacing whatever was there.
pub fn draw_fill(raster: &mut Raster, pixels: &[Pixel], color: Color) {
    let value = opaque(color);
    for pixel in pixels {
        raster.put(pixel.x, pixel.y, value);
    }
}

pub fn draw_shape(raster: &mut Raster, points: &[Point], color: Color, width: f64, alpha: u8) {
    if points.is_empty() {
        return;
    }
    raster.stroke_polyline(points, width, with_alpha(color, alpha), Composite::SourceOver);
}

/// Paints a stored stroke in full. Freehand strokes replay the same dot and
/// segment calls that drew them live.
pub fn draw_stroke(raster: &mut Raster, stroke: &Stroke) {
    match &stroke.body {
        StrokeBody::Freehand { tool, points } => {
            let Some(first) = points.first() else {
                return;
            };
            draw_dot(raster, *tool, *first, stroke.color, stroke.line_width);
            for window in points.windows(2) {
                draw_segment(
                    raster,
                    *tool,
                    window[0],
                    window[1],
                    stroke.color,
                    stroke.line_width,
                );
            }
        }
        StrokeBody::Shape { points, .. } => {
            draw_shape(raster, points, stroke.color, stroke.line_width, 255);
        }
        StrokeBody::Fill { pixels, .. } => draw_fill(raster, pixels, stroke.color),
    }
}

pub fn draw_extension(raster: &mut Raster, stroke: &Stroke, extension: Extension) {
    let StrokeBody::Freehand { tool, .. } = &stroke.body else {
        return;
    };
    if let Extension::Segment { from, to } = extension {
        draw_segment(raster, *tool, from, to, stroke.color, stroke.line_width);
    }
}

/// Half-transparent outline of an anchor-pair stroke that is not yet final.
pub fn draw_preview(raster: &mut Raster, stroke: &Stroke) {
    if let StrokeBody::Shape {
        tool, start, end, ..
    } = &stroke.body
    {
        let points = expand(*tool, *start, *end);
        draw_shape(raster, &points, stroke.color, stroke.line_width, PREVIEW_ALPHA);
    }
}

pub fn redraw(state: &mut State) {
    state.raster.clear();
    for stroke in &state.store {
        draw_stroke(&mut state.raster, stroke);
    }
}

pub fn redraw_preview(state: &mut State) {
    state.preview.clear();
    for stroke in state.pending.values() {
        draw_preview(&mut state.preview, stroke);
    }
}

/// Repaints every layer from scratch.
pub fn redraw_all(state: &mut State) {
    redraw(state);
    redraw_preview(state);
    draw_cursors(state);
}
