use log::debug;
use syncsketch_shared::{
    normalize_point, sanitize_line_width, ClientMessage, Extension, Point, ServerMessage, Stroke,
    StrokeBody, StrokeId, Tool,
};
use uuid::Uuid;

use crate::state::{Session, MAX_FILL_PIXELS, MAX_POINTS_PER_STROKE, MAX_STROKES};

const MAX_ID_LEN: usize = 64;

/// Applies one message from `sender` to the session. Returns what to send
/// and whether the sender receives it too.
pub fn apply_client_message(
    session: &mut Session,
    sender: Uuid,
    message: ClientMessage,
) -> Option<(Vec<ServerMessage>, bool)> {
    match message {
        ClientMessage::DrawStart {
            stroke_id,
            tool,
            color,
            line_width,
            x,
            y,
            fill_pixels,
        } => {
            if !valid_id(&stroke_id) {
                return None;
            }
            let anchor = normalize_point(Point::new(x, y))?;
            let user_id = session.peers.get(&sender)?.user_id.clone();
            let line_width = sanitize_line_width(line_width);
            let mut stroke = Stroke::begin(
                stroke_id.clone(),
                tool,
                color,
                line_width,
                anchor,
                user_id.clone(),
            );
            let fill_pixels = fill_pixels.map(|mut pixels| {
                pixels.truncate(MAX_FILL_PIXELS);
                pixels
            });
            if let StrokeBody::Fill { pixels, .. } = &mut stroke.body {
                if let Some(recorded) = &fill_pixels {
                    pixels.clone_from(recorded);
                }
                stroke.line_width = 1.0;
            }
            let line_width = stroke.line_width;

            put_stroke(session, stroke);
            session.active_ids.insert(stroke_id.clone());
            session.owners.insert(stroke_id.clone(), sender);

            Some((
                vec![ServerMessage::DrawStart {
                    stroke_id,
                    tool,
                    color,
                    line_width,
                    x: anchor.x,
                    y: anchor.y,
                    user_id,
                    fill_pixels,
                }],
                false,
            ))
        }
        ClientMessage::DrawMove { stroke_id, x, y } => {
            if !valid_id(&stroke_id) {
                return None;
            }
            let point = normalize_point(Point::new(x, y))?;
            if !session.active_ids.contains(&stroke_id) {
                return None;
            }
            let stroke = session
                .strokes
                .iter_mut()
                .find(|stroke| stroke.id == stroke_id)?;
            if stroke.tool() != Tool::Fill && stroke.point_count() >= MAX_POINTS_PER_STROKE {
                return None;
            }
            if stroke.extend(point) == Extension::Ignored {
                return None;
            }
            session.dirty = true;
            Some((
                vec![ServerMessage::DrawMove {
                    stroke_id,
                    x: point.x,
                    y: point.y,
                }],
                false,
            ))
        }
        ClientMessage::DrawEnd { stroke_id } => {
            if !valid_id(&stroke_id) {
                return None;
            }
            if !session.active_ids.remove(&stroke_id) {
                return None;
            }
            if let Some(stroke) = session
                .strokes
                .iter_mut()
                .find(|stroke| stroke.id == stroke_id)
            {
                stroke.finalize();
                session.dirty = true;
            }
            if session.owners.get(&stroke_id) == Some(&sender) {
                if let Some(history) = session.histories.get_mut(&sender) {
                    history.undo.push(stroke_id.clone());
                    history.redo.clear();
                }
            }
            Some((vec![ServerMessage::DrawEnd { stroke_id }], false))
        }
        ClientMessage::CursorMove { x, y } => {
            let point = normalize_point(Point::new(x, y))?;
            let peer = session.peers.get(&sender)?;
            Some((
                vec![ServerMessage::CursorUpdate {
                    user_id: peer.user_id.clone(),
                    x: point.x,
                    y: point.y,
                    color: peer.color,
                }],
                false,
            ))
        }
        ClientMessage::Undo => {
            let stroke_id = session
                .histories
                .get_mut(&sender)
                .and_then(|history| history.undo.pop())?;
            let Some(stroke) = remove_stroke(session, &stroke_id) else {
                debug!("undo target {stroke_id} is gone");
                return None;
            };
            if let Some(history) = session.histories.get_mut(&sender) {
                history.redo.push(stroke);
            }
            Some((vec![ServerMessage::UndoApplied { stroke_id }], true))
        }
        ClientMessage::Redo => {
            let stroke = session
                .histories
                .get_mut(&sender)
                .and_then(|history| history.redo.pop())?;
            let stroke_id = stroke.id.clone();
            put_stroke(session, stroke.clone());
            session.owners.insert(stroke_id.clone(), sender);
            if let Some(history) = session.histories.get_mut(&sender) {
                history.undo.push(stroke_id);
            }
            Some((vec![ServerMessage::RedoApplied { stroke }], true))
        }
    }
}

/// Applies one message and queues the resulting broadcasts before the
/// caller releases the session, so every peer sees events in the order they
/// were applied to the history.
pub fn handle_client_message(session: &mut Session, sender: Uuid, message: ClientMessage) {
    let Some((messages, include_sender)) = apply_client_message(session, sender, message) else {
        return;
    };
    let skip = (!include_sender).then_some(sender);
    for message in &messages {
        session.broadcast(message, skip);
    }
}

/// Drops strokes that cannot be drawn and enforces the session limits on a
/// freshly loaded history.
pub fn sanitize_strokes(strokes: Vec<Stroke>) -> Vec<Stroke> {
    let mut strokes = strokes
        .into_iter()
        .filter_map(sanitize_stroke)
        .collect::<Vec<_>>();
    let overflow = strokes.len().saturating_sub(MAX_STROKES);
    strokes.drain(0..overflow);
    strokes
}

fn sanitize_stroke(mut stroke: Stroke) -> Option<Stroke> {
    if !valid_id(&stroke.id) {
        return None;
    }
    stroke.line_width = sanitize_line_width(stroke.line_width);
    match &mut stroke.body {
        StrokeBody::Freehand { points, .. } => {
            points.retain(|point| point.is_finite());
            points.truncate(MAX_POINTS_PER_STROKE);
            if points.is_empty() {
                return None;
            }
        }
        StrokeBody::Shape { points, .. } => {
            points.retain(|point| point.is_finite());
            if points.is_empty() {
                stroke.finalize();
            }
        }
        StrokeBody::Fill { pixels, .. } => pixels.truncate(MAX_FILL_PIXELS),
    }
    Some(stroke)
}

fn valid_id(id: &StrokeId) -> bool {
    !id.as_str().is_empty() && id.as_str().len() <= MAX_ID_LEN
}

/// Appends `stroke`, or replaces the stroke with the same id in place.
/// Evicts the oldest strokes past the session limit.
fn put_stroke(session: &mut Session, stroke: Stroke) {
    session.dirty = true;
    if let Some(existing) = session.strokes.iter_mut().find(|s| s.id == stroke.id) {
        *existing = stroke;
        return;
    }
    session.strokes.push(stroke);
    let overflow = session.strokes.len().saturating_sub(MAX_STROKES);
    if overflow > 0 {
        let removed = session.strokes.drain(0..overflow).collect::<Vec<_>>();
        for stroke in removed {
            session.active_ids.remove(&stroke.id);
            session.owners.remove(&stroke.id);
        }
    }
}

fn remove_stroke(session: &mut Session, id: &StrokeId) -> Option<Stroke> {
    let index = session.strokes.iter().position(|s| &s.id == id)?;
    let removed = session.strokes.remove(index);
    session.active_ids.remove(id);
    session.owners.remove(id);
    session.dirty = true;
    Some(removed)
}
