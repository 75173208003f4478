use syncsketch_shared::Point;

/// Inclusive pixel rectangle touched by a draw call, already clipped to the
/// raster.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Bounds {
    pub min_x: i32,
    pub min_y: i32,
    pub max_x: i32,
    pub max_y: i32,
}

impl Bounds {
    /// Pixels whose centers may lie within `pad` of the box spanned by
    /// `points`, clipped to a `width` x `height` grid. `None` when nothing is
    /// on the grid.
    pub fn around(points: &[Point], pad: f64, width: u32, height: u32) -> Option<Bounds> {
        if points.is_empty() || width == 0 || height == 0 {
            return None;
        }
        let mut min_x = f64::MAX;
        let mut min_y = f64::MAX;
        let mut max_x = f64::MIN;
        let mut max_y = f64::MIN;
        for point in points {
            min_x = min_x.min(point.x);
            min_y = min_y.min(point.y);
            max_x = max_x.max(point.x);
            max_y = max_y.max(point.y);
        }
        let min_x = ((min_x - pad).floor() - 1.0).max(0.0);
        let min_y = ((min_y - pad).floor() - 1.0).max(0.0);
        let max_x = ((max_x + pad).ceil() + 1.0).min(width as f64 - 1.0);
        let max_y = ((max_y + pad).ceil() + 1.0).min(height as f64 - 1.0);
        if min_x > max_x || min_y > max_y {
            return None;
        }
        Some(Bounds {
            min_x: min_x as i32,
            min_y: min_y as i32,
            max_x: max_x as i32,
            max_y: max_y as i32,
        })
    }

    pub fn pixels(self) -> impl Iterator<Item = (i32, i32)> {
        (self.min_y..=self.max_y).flat_map(move |y| (self.min_x..=self.max_x).map(move |x| (x, y)))
    }
}

/// Center of pixel `(x, y)` in canvas coordinates.
pub fn pixel_center(x: i32, y: i32) -> Point {
    Point {
        x: x as f64 + 0.5,
        y: y as f64 + 0.5,
    }
}

pub fn distance(a: Point, b: Point) -> f64 {
    ((a.x - b.x).powi(2) + (a.y - b.y).powi(2)).sqrt()
}

pub fn distance_to_segment(point: Point, from: Point, to: Point) -> f64 {
    let dx = to.x - from.x;
    let dy = to.y - from.y;
    if dx.abs() < f64::EPSILON && dy.abs() < f64::EPSILON {
        return distance(point, from);
    }
    let t = ((point.x - from.x) * dx + (point.y - from.y) * dy) / (dx * dx + dy * dy);
    let t = t.clamp(0.0, 1.0);
    let projected = Point {
        x: from.x + t * dx,
        y: from.y + t * dy,
    };
    distance(point, projected)
}

/// Smallest distance from `point` to any segment of the polyline.
pub fn distance_to_polyline(point: Point, points: &[Point]) -> f64 {
    match points {
        [] => f64::INFINITY,
        [single] => distance(point, *single),
        _ => points
            .windows(2)
            .map(|window| distance_to_segment(point, window[0], window[1]))
            .fold(f64::INFINITY, f64::min),
    }
}
