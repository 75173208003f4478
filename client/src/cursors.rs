use syncsketch_shared::{normalize_point, Color, Point, UserId};

use crate::raster::{opaque, Composite};
use crate::state::{RemoteCursor, State};

const RING_RADIUS: f64 = 10.0;
const RING_WIDTH: f64 = 2.0;
const DOT_RADIUS: f64 = 3.0;

pub fn update_remote_cursor(state: &mut State, user_id: UserId, position: Point, color: Color) {
    let Some(position) = normalize_point(position) else {
        return;
    };
    state.cursors.insert(user_id, RemoteCursor { position, color });
    draw_cursors(state);
}

pub fn remove_remote_cursor(state: &mut State, user_id: &UserId) -> bool {
    if state.cursors.remove(user_id).is_none() {
        return false;
    }
    draw_cursors(state);
    true
}

/// Clears the overlay and draws a ring with a center dot per participant.
pub fn draw_cursors(state: &mut State) {
    state.overlay.clear();
    for cursor in state.cursors.values() {
        let ink = opaque(cursor.color);
        state
            .overlay
            .stroke_ring(cursor.position, RING_RADIUS, RING_WIDTH, ink, Composite::SourceOver);
        state
            .overlay
            .fill_disc(cursor.position, DOT_RADIUS, ink, Composite::SourceOver);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::TRANSPARENT;

    #[test]
    fn cursor_moves_only_touch_the_overlay() {
        let mut state = State::new(60, 60);
        let red = Color::rgb(255, 0, 0);
        update_remote_cursor(&mut state, UserId::from("a"), Point::new(20.0, 20.0), red);
        assert_eq!(state.overlay.get(20, 20), Some(opaque(red)));
        assert_eq!(state.raster.count(|pixel| pixel[3] != 0), 0);

        update_remote_cursor(&mut state, UserId::from("a"), Point::new(40.0, 40.0), red);
        assert_eq!(state.cursors.len(), 1);
        assert_eq!(state.overlay.get(20, 20), Some(TRANSPARENT));
        assert_eq!(state.overlay.get(40, 40), Some(opaque(red)));
    }

    #[test]
    fn removing_a_cursor_clears_it() {
        let mut state = State::new(60, 60);
        update_remote_cursor(&mut state, UserId::from("a"), Point::new(20.0, 20.0), Color::BLACK);
        assert!(remove_remote_cursor(&mut state, &UserId::from("a")));
        assert!(!remove_remote_cursor(&mut state, &UserId::from("a")));
        assert_eq!(state.overlay.count(|pixel| pixel[3] != 0), 0);
    }
}
