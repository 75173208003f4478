use log::debug;

use syncsketch_shared::{
    normalize_point, sanitize_line_width, Color, Pixel, Point, Stroke, StrokeBody, StrokeId, Tool,
    ToolKind, UserId,
};

use crate::fill::flood_fill;
use crate::render::{draw_dot, draw_extension, draw_stroke, redraw, redraw_all, redraw_preview};
use crate::state::{State, StrokePhase};

/// Line width recorded on fill strokes.
pub const FILL_LINE_WIDTH: f64 = 1.0;

/// Opens a stroke at `anchor`. Freehand strokes enter the store right away
/// and paint their first dot; anchor-pair strokes only show a preview; fills
/// are single-shot and commit immediately.
pub fn start_stroke(
    state: &mut State,
    id: StrokeId,
    tool: Tool,
    color: Color,
    line_width: f64,
    anchor: Point,
    user_id: UserId,
) -> bool {
    let Some(anchor) = normalize_point(anchor) else {
        debug!("dropping start of {id}: non-finite anchor");
        return false;
    };
    let line_width = sanitize_line_width(line_width);

    match tool.kind() {
        ToolKind::Fill => fill_stroke(state, id, color, anchor, user_id, None),
        ToolKind::Shape(_) => {
            state.active_ids.remove(&id);
            state.resumable.remove(&id);
            let stroke = Stroke::begin(id.clone(), tool, color, line_width, anchor, user_id);
            state.pending.insert(id, stroke);
            redraw_preview(state);
            true
        }
        ToolKind::Freehand(freehand) => {
            let had_preview = state.pending.remove(&id).is_some();
            let stroke = Stroke::begin(id.clone(), tool, color, line_width, anchor, user_id);
            state.resumable.remove(&id);
            state.active_ids.insert(id);
            if state.store.put(stroke).is_some() {
                redraw(state);
            } else {
                draw_dot(&mut state.raster, freehand, anchor, color, line_width);
            }
            if had_preview {
                redraw_preview(state);
            }
            true
        }
    }
}

/// Feeds one pointer position into an active stroke. Unknown and finished
/// ids are ignored.
pub fn move_stroke(state: &mut State, id: &StrokeId, point: Point) -> bool {
    let Some(point) = normalize_point(point) else {
        return false;
    };
    if let Some(stroke) = state.pending.get_mut(id) {
        stroke.extend(point);
        redraw_preview(state);
        return true;
    }
    if !state.active_ids.contains(id) && !state.resumable.contains(id) {
        debug!("ignoring move for inactive stroke {id}");
        return false;
    }
    let Some(stroke) = state.store.get_mut(id) else {
        state.active_ids.remove(id);
        state.resumable.remove(id);
        return false;
    };
    let extension = stroke.extend(point);
    draw_extension(&mut state.raster, stroke, extension);
    true
}

/// Finishes an active stroke. Anchor-pair strokes are expanded and committed;
/// freehand strokes keep their points as they are. Ending a fill that is
/// already committed is accepted.
pub fn end_stroke(state: &mut State, id: &StrokeId) -> bool {
    if let Some(mut stroke) = state.pending.remove(id) {
        stroke.finalize();
        redraw_preview(state);
        commit_stroke(state, stroke);
        return true;
    }
    if state.active_ids.remove(id) {
        return true;
    }
    if state.resumable.remove(id) && state.store.contains(id) {
        return true;
    }
    let committed_fill = state.phase(id) == StrokePhase::Committed
        && state.store.get(id).map(Stroke::tool) == Some(Tool::Fill);
    if !committed_fill {
        debug!("ignoring end for inactive stroke {id}");
    }
    committed_fill
}

/// Aborts an anchor-pair stroke without committing it. Freehand strokes are
/// ended instead, keeping what they accumulated.
pub fn cancel_stroke(state: &mut State, id: &StrokeId) -> bool {
    if state.pending.remove(id).is_some() {
        redraw_preview(state);
        return true;
    }
    end_stroke(state, id)
}

/// Commits a fill seeded at `seed`. Recorded `pixels` are replayed verbatim;
/// without them the region is computed from the main raster. A computed fill
/// that covers nothing leaves no stroke behind.
pub fn fill_stroke(
    state: &mut State,
    id: StrokeId,
    color: Color,
    seed: Point,
    user_id: UserId,
    pixels: Option<Vec<Pixel>>,
) -> bool {
    let Some(seed) = normalize_point(seed) else {
        debug!("dropping fill {id}: non-finite seed");
        return false;
    };
    let pixels = match pixels {
        Some(pixels) => pixels,
        None => {
            let result = flood_fill(&state.raster, seed.to_pixel(), color);
            if result.truncated {
                debug!("fill {id} truncated after {} pixels", result.pixels.len());
            }
            if result.pixels.is_empty() {
                return false;
            }
            result.pixels
        }
    };
    state.pending.remove(&id);
    commit_stroke(
        state,
        Stroke {
            id,
            color,
            line_width: FILL_LINE_WIDTH,
            user_id,
            body: StrokeBody::Fill { seed, pixels },
        },
    );
    true
}

/// Stores a finished stroke. A new id is painted on top of the raster; an id
/// that replaces an existing stroke forces a full redraw.
pub(crate) fn commit_stroke(state: &mut State, stroke: Stroke) {
    let id = stroke.id.clone();
    state.active_ids.remove(&id);
    state.resumable.remove(&id);
    if state.store.put(stroke).is_some() {
        redraw(state);
        return;
    }
    if let Some(stroke) = state.store.get(&id) {
        draw_stroke(&mut state.raster, stroke);
    }
}

/// Replaces the whole store with `strokes` and repaints once. Shapes that
/// were never expanded are still being authored by someone, so they go back
/// to `pending`; freehand strokes stay open for further points.
pub fn adopt_strokes(state: &mut State, strokes: Vec<Stroke>) {
    state.active_ids.clear();
    state.pending.clear();
    state.resumable.clear();
    let mut settled = Vec::with_capacity(strokes.len());
    for stroke in strokes {
        match &stroke.body {
            StrokeBody::Shape { points, .. } if points.is_empty() => {
                state.pending.insert(stroke.id.clone(), stroke);
            }
            StrokeBody::Freehand { .. } => {
                state.resumable.insert(stroke.id.clone());
                settled.push(stroke);
            }
            StrokeBody::Shape { .. } | StrokeBody::Fill { .. } => settled.push(stroke),
        }
    }
    state.store.replace_all(settled);
    redraw(state);
    redraw_preview(state);
}

pub fn clear_board(state: &mut State) {
    state.store.clear();
    state.active_ids.clear();
    state.resumable.clear();
    state.pending.clear();
    redraw(state);
    redraw_preview(state);
}

/// Reallocates every layer and repaints from stored geometry. Fill strokes
/// keep their absolute pixels.
pub fn resize_canvas(state: &mut State, width: u32, height: u32) {
    state.raster.resize(width, height);
    state.preview.resize(width, height);
    state.overlay.resize(width, height);
    redraw_all(state);
}
