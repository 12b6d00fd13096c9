// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Orbifold-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Orbifold and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::f64::consts::FRAC_PI_4;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::geom::{Point, Rect};
use crate::model::Block;

/// Tunables for drop placement, in layout units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PlacementOptions {
    /// Ring spacing of the collision search.
    pub grid_step: f64,
    /// Clearance kept around every existing block.
    pub padding: f64,
    /// Largest ring radius tried before falling back to the right edge.
    pub max_radius: f64,
}

impl Default for PlacementOptions {
    fn default() -> Self {
        Self { grid_step: 20.0, padding: 10.0, max_radius: 400.0 }
    }
}

/// Picks a position for a new block near `requested` that does not overlap `existing`.
///
/// The requested point is returned untouched when it is already free. Otherwise rings of growing
/// radius are sampled at the eight compass angles; the first free sample wins. When every ring up
/// to `max_radius` is blocked the block goes directly right of the rightmost block.
pub fn resolve_placement(requested: Point, existing: &[Block], options: &PlacementOptions) -> Point {
    let occupied = existing
        .iter()
        .map(|block| Rect::block_at(block.position()))
        .collect::<SmallVec<[Rect; 32]>>();

    let is_free = |candidate: Point| {
        let footprint = Rect::block_at(candidate).padded(options.padding);
        !occupied.iter().any(|rect| footprint.intersects(rect))
    };

    if is_free(requested) {
        return requested;
    }

    if options.grid_step > 0.0 {
        let mut ring = 1u32;
        loop {
            let radius = options.grid_step * f64::from(ring);
            if radius > options.max_radius {
                break;
            }
            for step in 0..8u8 {
                let angle = FRAC_PI_4 * f64::from(step);
                let candidate = Point::new(
                    requested.x + radius * angle.cos(),
                    requested.y + radius * angle.sin(),
                )
                .rounded()
                .clamp_non_negative();
                if is_free(candidate) {
                    return candidate;
                }
            }
            ring += 1;
        }
    }

    let rightmost = occupied.iter().map(Rect::right).fold(0.0_f64, f64::max);
    Point::new(rightmost + options.padding, requested.y).clamp_non_negative()
}

#[cfg(test)]
mod tests {
    use super::{resolve_placement, PlacementOptions};
    use crate::layout::geom::{Point, Rect};
    use crate::model::{Block, BlockId, BlockKind};

    fn block_at(id: &str, x: f64, y: f64) -> Block {
        Block::new(
            BlockId::new(id).expect("block id"),
            BlockKind::Input,
            "Input",
            Point::new(x, y),
        )
    }

    fn overlaps_any(position: Point, blocks: &[Block], padding: f64) -> bool {
        let footprint = Rect::block_at(position).padded(padding);
        blocks
            .iter()
            .any(|block| footprint.intersects(&Rect::block_at(block.position())))
    }

    #[test]
    fn free_position_is_returned_unchanged() {
        let blocks = [block_at("a", 0.0, 0.0)];
        let requested = Point::new(400.0, 300.0);
        let options = PlacementOptions::default();
        assert_eq!(resolve_placement(requested, &blocks, &options), requested);
    }

    #[test]
    fn empty_canvas_accepts_any_position() {
        let requested = Point::new(12.5, 7.0);
        assert_eq!(resolve_placement(requested, &[], &PlacementOptions::default()), requested);
    }

    #[test]
    fn coinciding_position_moves_to_a_free_spot() {
        let blocks = [block_at("a", 100.0, 100.0)];
        let requested = Point::new(100.0, 100.0);
        let options = PlacementOptions::default();

        let placed = resolve_placement(requested, &blocks, &options);

        assert_ne!(placed, requested);
        assert!(!overlaps_any(placed, &blocks, options.padding));
        assert!(placed.x >= 0.0 && placed.y >= 0.0);
    }

    #[test]
    fn ring_search_prefers_the_nearest_ring() {
        let blocks = [block_at("a", 100.0, 100.0)];
        let placed =
            resolve_placement(Point::new(100.0, 100.0), &blocks, &PlacementOptions::default());
        // Straight down clears the block plus padding at radius 60 before any other angle does.
        assert_eq!(placed, Point::new(100.0, 160.0));
    }

    #[test]
    fn candidates_are_clamped_to_the_canvas() {
        let blocks = [block_at("a", 0.0, 0.0)];
        let options = PlacementOptions::default();
        let placed = resolve_placement(Point::new(0.0, 0.0), &blocks, &options);
        assert!(placed.x >= 0.0 && placed.y >= 0.0);
        assert!(!overlaps_any(placed, &blocks, options.padding));
    }

    #[test]
    fn exhausted_search_falls_back_to_the_right_of_the_rightmost_block() {
        let blocks = [block_at("a", 0.0, 0.0), block_at("b", 500.0, 0.0)];
        let options = PlacementOptions { grid_step: 20.0, padding: 10.0, max_radius: 0.0 };

        let placed = resolve_placement(Point::new(0.0, 0.0), &blocks, &options);

        assert_eq!(placed, Point::new(630.0, 0.0));
        assert!(!overlaps_any(placed, &blocks, options.padding));
    }
}
