//! Executes undo and redo decisions made elsewhere. Which stroke is affected
//! is never chosen here.
//!
//! Redo appends the stroke at the current end of the store instead of its
//! original slot, so strokes drawn after the undo end up underneath it.

use log::debug;

use syncsketch_shared::{Stroke, StrokeId};

use crate::actions::commit_stroke;
use crate::render::redraw;
use crate::state::State;

/// Removes `id` and repaints the main raster from scratch.
pub fn undo_stroke(state: &mut State, id: &StrokeId) -> Option<Stroke> {
    let Some(stroke) = state.store.delete(id) else {
        debug!("undo for unknown stroke {id}");
        return None;
    };
    state.active_ids.remove(id);
    redraw(state);
    Some(stroke)
}

/// Reinserts a fully specified stroke and paints only that stroke.
pub fn redo_stroke(state: &mut State, mut stroke: Stroke) {
    if stroke.points().is_empty() {
        stroke.finalize();
    }
    commit_stroke(state, stroke);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::{end_stroke, move_stroke, start_stroke};
    use syncsketch_shared::{Color, Point, Tool, UserId};

    fn draw(state: &mut State, id: &str, from: Point, to: Point) {
        let id = StrokeId::from(id);
        start_stroke(
            state,
            id.clone(),
            Tool::Brush,
            Color::rgb(0, 128, 0),
            6.0,
            from,
            UserId::from("u"),
        );
        move_stroke(state, &id, to);
        end_stroke(state, &id);
    }

    #[test]
    fn undo_then_redo_restores_pixels() {
        let mut state = State::new(40, 40);
        draw(&mut state, "a", Point::new(2.0, 2.0), Point::new(38.0, 2.0));
        let blank = state.raster.clone();
        draw(&mut state, "b", Point::new(5.0, 30.0), Point::new(35.0, 30.0));
        let drawn = state.raster.clone();

        let removed = undo_stroke(&mut state, &StrokeId::from("b")).unwrap();
        assert_eq!(state.raster, blank);
        redo_stroke(&mut state, removed);
        assert_eq!(state.raster, drawn);
    }

    #[test]
    fn redo_appends_at_the_end() {
        let mut state = State::new(40, 40);
        draw(&mut state, "a", Point::new(2.0, 2.0), Point::new(38.0, 2.0));
        draw(&mut state, "b", Point::new(2.0, 9.0), Point::new(38.0, 9.0));
        let removed = undo_stroke(&mut state, &StrokeId::from("a")).unwrap();
        draw(&mut state, "c", Point::new(2.0, 20.0), Point::new(38.0, 20.0));
        redo_stroke(&mut state, removed);
        let ids: Vec<_> = state.store.iter().map(|stroke| stroke.id.as_str()).collect();
        assert_eq!(ids, ["b", "c", "a"]);
    }

    #[test]
    fn undo_of_unknown_id_is_a_noop() {
        let mut state = State::new(10, 10);
        assert!(undo_stroke(&mut state, &StrokeId::from("nope")).is_none());
    }
}
