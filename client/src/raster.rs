//! Software raster surface the renderer paints into, backed by an
//! `image::RgbaImage`.
//!
//! Coverage is aliased: a pixel is painted when its center falls inside the
//! shape. All blending is integer arithmetic, so two rasters fed the same
//! draw calls are byte-identical.

pub use image::Rgba;
use image::RgbaImage;
use syncsketch_shared::{Color, Point};

use crate::geometry::{distance, distance_to_polyline, pixel_center, Bounds};

pub const TRANSPARENT: Rgba<u8> = Rgba([0, 0, 0, 0]);

pub fn opaque(color: Color) -> Rgba<u8> {
    with_alpha(color, 255)
}

pub fn with_alpha(color: Color, alpha: u8) -> Rgba<u8> {
    Rgba([color.r, color.g, color.b, alpha])
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Composite {
    /// Paint over whatever is below.
    SourceOver,
    /// Remove coverage from the destination; the eraser.
    DestinationOut,
    /// Add premultiplied source to destination, saturating.
    Lighter,
}

fn div_round(value: u32, divisor: u32) -> u32 {
    (value + divisor / 2) / divisor
}

pub fn blend(dst: Rgba<u8>, src: Rgba<u8>, op: Composite) -> Rgba<u8> {
    let Rgba([sr, sg, sb, sa]) = src;
    let Rgba([dr, dg, db, da]) = dst;
    let (sa, da) = (sa as u32, da as u32);
    match op {
        Composite::SourceOver => {
            if sa == 255 {
                return src;
            }
            if sa == 0 {
                return dst;
            }
            let inv = 255 - sa;
            let out_scaled = sa * 255 + da * inv;
            if out_scaled == 0 {
                return TRANSPARENT;
            }
            let channel = |s: u8, d: u8| {
                div_round(s as u32 * sa * 255 + d as u32 * da * inv, out_scaled).min(255) as u8
            };
            Rgba([
                channel(sr, dr),
                channel(sg, dg),
                channel(sb, db),
                div_round(out_scaled, 255) as u8,
            ])
        }
        Composite::DestinationOut => {
            let out_a = div_round(da * (255 - sa), 255);
            if out_a == 0 {
                return TRANSPARENT;
            }
            Rgba([dr, dg, db, out_a as u8])
        }
        Composite::Lighter => {
            let out_a = (sa + da).min(255);
            if out_a == 0 {
                return TRANSPARENT;
            }
            let channel = |s: u8, d: u8| {
                let premultiplied = (s as u32 * sa + d as u32 * da).min(255 * 255);
                div_round(premultiplied, out_a).min(255) as u8
            };
            Rgba([
                channel(sr, dr),
                channel(sg, dg),
                channel(sb, db),
                out_a as u8,
            ])
        }
    }
}

/// RGBA grid with `(0, 0)` at the top left, starting out transparent.
/// Writes outside the grid are dropped.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Raster {
    image: RgbaImage,
}

impl Raster {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            image: RgbaImage::new(width, height),
        }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    fn coords(&self, x: i32, y: i32) -> Option<(u32, u32)> {
        let (x, y) = (u32::try_from(x).ok()?, u32::try_from(y).ok()?);
        (x < self.image.width() && y < self.image.height()).then_some((x, y))
    }

    pub fn get(&self, x: i32, y: i32) -> Option<Rgba<u8>> {
        let (x, y) = self.coords(x, y)?;
        Some(*self.image.get_pixel(x, y))
    }

    pub fn put(&mut self, x: i32, y: i32, value: Rgba<u8>) {
        if let Some((x, y)) = self.coords(x, y) {
            self.image.put_pixel(x, y, value);
        }
    }

    pub fn blend(&mut self, x: i32, y: i32, src: Rgba<u8>, op: Composite) {
        if let Some((x, y)) = self.coords(x, y) {
            let pixel = self.image.get_pixel_mut(x, y);
            *pixel = blend(*pixel, src, op);
        }
    }

    pub fn clear(&mut self) {
        self.image.pixels_mut().for_each(|pixel| *pixel = TRANSPARENT);
    }

    /// Reallocates the grid; the contents are discarded.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.image = RgbaImage::new(width, height);
    }

    /// Evaluates `shader` at every pixel center inside `bounds` and blends the
    /// returned color, if any.
    pub fn shade(&mut self, bounds: Bounds, op: Composite, shader: impl Fn(Point) -> Option<Rgba<u8>>) {
        for (x, y) in bounds.pixels() {
            if let Some(src) = shader(pixel_center(x, y)) {
                self.blend(x, y, src, op);
            }
        }
    }

    pub fn fill_disc(&mut self, center: Point, radius: f64, src: Rgba<u8>, op: Composite) {
        let Some(bounds) = Bounds::around(&[center], radius, self.width(), self.height()) else {
            return;
        };
        self.shade(bounds, op, |point| {
            (distance(point, center) <= radius).then_some(src)
        });
    }

    /// Strokes the whole path with round caps and joins, touching each pixel
    /// once. A single point paints a dot.
    pub fn stroke_polyline(&mut self, points: &[Point], width: f64, src: Rgba<u8>, op: Composite) {
        let half = width / 2.0;
        let Some(bounds) = Bounds::around(points, half, self.width(), self.height()) else {
            return;
        };
        let columns = (bounds.max_x - bounds.min_x + 1) as usize;
        let rows = (bounds.max_y - bounds.min_y + 1) as usize;
        let mut covered = vec![false; columns * rows];
        let segments: Vec<&[Point]> = if points.len() == 1 {
            vec![points]
        } else {
            points.windows(2).collect()
        };
        for segment in segments {
            let Some(local) = Bounds::around(segment, half, self.width(), self.height()) else {
                continue;
            };
            for (x, y) in local.pixels() {
                if distance_to_polyline(pixel_center(x, y), segment) <= half {
                    let column = (x - bounds.min_x) as usize;
                    let row = (y - bounds.min_y) as usize;
                    covered[row * columns + column] = true;
                }
            }
        }
        for (x, y) in bounds.pixels() {
            let column = (x - bounds.min_x) as usize;
            let row = (y - bounds.min_y) as usize;
            if covered[row * columns + column] {
                self.blend(x, y, src, op);
            }
        }
    }

    pub fn stroke_ring(&mut self, center: Point, radius: f64, width: f64, src: Rgba<u8>, op: Composite) {
        let half = width / 2.0;
        let Some(bounds) = Bounds::around(&[center], radius + half, self.width(), self.height()) else {
            return;
        };
        self.shade(bounds, op, |point| {
            ((distance(point, center) - radius).abs() <= half).then_some(src)
        });
    }

    /// Source-over composites `layer` onto this raster. Both must share a
    /// size; extra pixels on either side are ignored.
    pub fn draw_over(&mut self, layer: &Raster) {
        for (dst, src) in self.image.pixels_mut().zip(layer.image.pixels()) {
            *dst = blend(*dst, *src, Composite::SourceOver);
        }
    }

    pub fn count(&self, predicate: impl Fn(Rgba<u8>) -> bool) -> usize {
        self.image.pixels().filter(|pixel| predicate(**pixel)).count()
    }
}
