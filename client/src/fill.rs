//! Bounded 4-connected flood fill.
//!
//! The search keeps an explicit stack of pending pixels and gives up once
//! that stack reaches [`MAX_PENDING`]. On very large uniform regions this
//! yields a partial fill: the pixels visited so far are returned and the rest
//! of the region stays untouched. Callers accept the partial result as is;
//! `FloodFill::truncated` only reports that it happened.

use std::collections::HashSet;

use syncsketch_shared::{Color, Pixel};

use crate::raster::{opaque, Raster, Rgba};

/// Per-channel absolute difference below which two colors match.
pub const MATCH_THRESHOLD: u8 = 10;
/// Soft cap on the pending frontier.
pub const MAX_PENDING: usize = 10_000;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FloodFill {
    pub pixels: Vec<Pixel>,
    pub truncated: bool,
}

/// Alpha is ignored, so a transparent pixel matches black.
pub fn colors_match(a: Rgba<u8>, b: Rgba<u8>) -> bool {
    a.0[..3]
        .iter()
        .zip(&b.0[..3])
        .all(|(x, y)| x.abs_diff(*y) < MATCH_THRESHOLD)
}

/// Collects the region around `seed` whose color matches the seed's. Nothing
/// is written; the caller paints (and records) the returned pixels.
pub fn flood_fill(raster: &Raster, seed: Pixel, fill: Color) -> FloodFill {
    let Some(target) = raster.get(seed.x, seed.y) else {
        return FloodFill::default();
    };
    if colors_match(target, opaque(fill)) {
        return FloodFill::default();
    }

    let mut stack = vec![seed];
    let mut visited = HashSet::new();
    let mut pixels = Vec::new();
    let mut truncated = false;

    loop {
        if stack.len() >= MAX_PENDING {
            truncated = true;
            break;
        }
        let Some(pixel) = stack.pop() else {
            break;
        };
        if visited.contains(&pixel) {
            continue;
        }
        let Some(color) = raster.get(pixel.x, pixel.y) else {
            continue;
        };
        if !colors_match(color, target) {
            continue;
        }
        visited.insert(pixel);
        pixels.push(pixel);

        stack.push(Pixel::new(pixel.x + 1, pixel.y));
        stack.push(Pixel::new(pixel.x - 1, pixel.y));
        stack.push(Pixel::new(pixel.x, pixel.y + 1));
        stack.push(Pixel::new(pixel.x, pixel.y - 1));
    }

    FloodFill { pixels, truncated }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::Composite;
    use syncsketch_shared::Point;

    const INK: Rgba<u8> = Rgba([0, 0, 0, 255]);
    const PAPER: Rgba<u8> = Rgba([250, 250, 250, 255]);

    fn paper(width: u32, height: u32) -> Raster {
        let mut raster = Raster::new(width, height);
        for y in 0..height as i32 {
            for x in 0..width as i32 {
                raster.put(x, y, PAPER);
            }
        }
        raster
    }

    #[test]
    fn threshold_is_strict_per_channel() {
        assert!(colors_match(PAPER, Rgba([255, 255, 255, 0])));
        assert!(!colors_match(PAPER, Rgba([240, 250, 250, 255])));
        assert!(colors_match(PAPER, Rgba([241, 250, 250, 255])));
    }

    #[test]
    fn seed_already_matching_fill_is_a_noop() {
        let raster = paper(8, 8);
        let result = flood_fill(&raster, Pixel::new(3, 3), Color::rgb(255, 255, 255));
        assert!(result.pixels.is_empty());
        assert!(!result.truncated);
    }

    #[test]
    fn out_of_range_seed_fills_nothing() {
        let raster = paper(8, 8);
        let result = flood_fill(&raster, Pixel::new(-1, 3), Color::rgb(255, 0, 0));
        assert!(result.pixels.is_empty());
    }

    #[test]
    fn closed_ring_contains_the_fill() {
        let mut raster = paper(40, 40);
        raster.stroke_ring(Point::new(20.0, 20.0), 10.0, 2.0, INK, Composite::SourceOver);
        let result = flood_fill(&raster, Pixel::new(20, 20), Color::rgb(255, 0, 0));
        assert!(!result.pixels.is_empty());
        assert!(!result.truncated);
        for pixel in &result.pixels {
            let dx = pixel.x as f64 + 0.5 - 20.0;
            let dy = pixel.y as f64 + 0.5 - 20.0;
            assert!((dx * dx + dy * dy).sqrt() < 10.0, "leaked to {pixel:?}");
        }
        assert!(!result.pixels.contains(&Pixel::new(0, 0)));
    }

    #[test]
    fn every_filled_pixel_is_unique() {
        let raster = paper(16, 16);
        let result = flood_fill(&raster, Pixel::new(0, 0), Color::rgb(0, 0, 255));
        let unique = result.pixels.iter().collect::<HashSet<_>>();
        assert_eq!(unique.len(), result.pixels.len());
        assert_eq!(result.pixels.len(), 256);
    }

    #[test]
    fn huge_uniform_region_stops_at_the_cap() {
        let raster = paper(400, 400);
        let result = flood_fill(&raster, Pixel::new(200, 200), Color::rgb(0, 0, 255));
        assert!(result.truncated);
        assert!(!result.pixels.is_empty());
        assert!(result.pixels.len() < 400 * 400);
    }
}
