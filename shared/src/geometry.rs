//! Anchor-pair expansion for the shape tools.
//!
//! Every function here is pure: the same `(start, end)` always yields the
//! same points, bit for bit, so peers that finalize a shape independently
//! store identical geometry.

use std::f64::consts::PI;

use crate::{Point, ShapeTool};

/// Number of segments in a finalized circle; the polygon has one more point
/// because the first sample is repeated at angle 2π.
pub const CIRCLE_SEGMENTS: usize = 64;

pub fn expand(tool: ShapeTool, start: Point, end: Point) -> Vec<Point> {
    match tool {
        ShapeTool::Line => vec![start, end],
        ShapeTool::Rectangle => rectangle(start, end),
        ShapeTool::Square => square(start, end),
        ShapeTool::Circle => circle(start, end),
        ShapeTool::Triangle => triangle(start, end),
    }
}

/// Center and radius shared by the circle and triangle tools: the midpoint of
/// the anchors and the larger half-extent of their bounding box.
pub fn bounding_circle(start: Point, end: Point) -> (Point, f64) {
    let center = Point {
        x: (start.x + end.x) / 2.0,
        y: (start.y + end.y) / 2.0,
    };
    let radius_x = (end.x - start.x).abs() / 2.0;
    let radius_y = (end.y - start.y).abs() / 2.0;
    (center, radius_x.max(radius_y))
}

fn closed_box(x: f64, y: f64, width: f64, height: f64) -> Vec<Point> {
    vec![
        Point { x, y },
        Point { x: x + width, y },
        Point {
            x: x + width,
            y: y + height,
        },
        Point { x, y: y + height },
        Point { x, y },
    ]
}

fn rectangle(start: Point, end: Point) -> Vec<Point> {
    let x = start.x.min(end.x);
    let y = start.y.min(end.y);
    let width = (end.x - start.x).abs();
    let height = (end.y - start.y).abs();
    closed_box(x, y, width, height)
}

fn square(start: Point, end: Point) -> Vec<Point> {
    let delta_x = end.x - start.x;
    let delta_y = end.y - start.y;
    let side = delta_x.abs().max(delta_y.abs());
    let x = start.x + if delta_x < 0.0 { -side } else { 0.0 };
    let y = start.y + if delta_y < 0.0 { -side } else { 0.0 };
    closed_box(x, y, side, side)
}

fn circle(start: Point, end: Point) -> Vec<Point> {
    let (center, radius) = bounding_circle(start, end);
    (0..=CIRCLE_SEGMENTS)
        .map(|i| {
            let angle = (i as f64 / CIRCLE_SEGMENTS as f64) * PI * 2.0;
            Point {
                x: center.x + radius * angle.cos(),
                y: center.y + radius * angle.sin(),
            }
        })
        .collect()
}

fn triangle(start: Point, end: Point) -> Vec<Point> {
    let (center, radius) = bounding_circle(start, end);
    // first vertex points straight up
    let base = -PI / 2.0;
    let mut points = (0..3)
        .map(|i| {
            let angle = base + (i as f64 * 2.0 * PI / 3.0);
            Point {
                x: center.x + radius * angle.cos(),
                y: center.y + radius * angle.sin(),
            }
        })
        .collect::<Vec<_>>();
    points.push(points[0]);
    points
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(x: f64, y: f64) -> Point {
        Point { x, y }
    }

    #[test]
    fn line_keeps_anchors() {
        assert_eq!(
            expand(ShapeTool::Line, p(1.0, 2.0), p(3.0, 4.0)),
            vec![p(1.0, 2.0), p(3.0, 4.0)]
        );
    }

    #[test]
    fn rectangle_normalizes_corners() {
        let points = expand(ShapeTool::Rectangle, p(10.0, 20.0), p(4.0, 5.0));
        assert_eq!(
            points,
            vec![
                p(4.0, 5.0),
                p(10.0, 5.0),
                p(10.0, 20.0),
                p(4.0, 20.0),
                p(4.0, 5.0)
            ]
        );
    }

    #[test]
    fn square_uses_larger_side_towards_end() {
        let points = expand(ShapeTool::Square, p(10.0, 10.0), p(4.0, 12.0));
        assert_eq!(
            points,
            vec![
                p(4.0, 10.0),
                p(10.0, 10.0),
                p(10.0, 16.0),
                p(4.0, 16.0),
                p(4.0, 10.0)
            ]
        );
    }

    #[test]
    fn circle_has_sixty_five_samples_and_closes() {
        let points = expand(ShapeTool::Circle, p(0.0, 0.0), p(20.0, 10.0));
        assert_eq!(points.len(), CIRCLE_SEGMENTS + 1);
        assert_eq!(points[0], p(20.0, 5.0));
        let last = points[CIRCLE_SEGMENTS];
        assert!((last.x - 20.0).abs() < 1e-9);
        assert!((last.y - 5.0).abs() < 1e-9);
        for point in &points {
            let distance = ((point.x - 10.0).powi(2) + (point.y - 5.0).powi(2)).sqrt();
            assert!((distance - 10.0).abs() < 1e-9);
        }
    }

    #[test]
    fn triangle_starts_at_top_and_repeats_first_vertex() {
        let points = expand(ShapeTool::Triangle, p(0.0, 0.0), p(20.0, 20.0));
        assert_eq!(points.len(), 4);
        assert_eq!(points[0], points[3]);
        assert!((points[0].x - 10.0).abs() < 1e-9);
        assert!((points[0].y - 0.0).abs() < 1e-9);
        // the other two vertices sit below the center, mirrored
        assert!(points[1].y > 10.0 && points[2].y > 10.0);
        assert!(((points[1].x - 10.0) + (points[2].x - 10.0)).abs() < 1e-9);
    }

    #[test]
    fn expansion_is_repeatable() {
        let start = p(13.25, 7.5);
        let end = p(-40.125, 99.0);
        for tool in [
            ShapeTool::Line,
            ShapeTool::Rectangle,
            ShapeTool::Square,
            ShapeTool::Circle,
            ShapeTool::Triangle,
        ] {
            assert_eq!(expand(tool, start, end), expand(tool, start, end));
        }
    }
}
