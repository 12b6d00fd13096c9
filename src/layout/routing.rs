// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Orbifold-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Orbifold and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Orthogonal connection routing between block anchors.
//!
//! Every route leaves its source perpendicular to the anchor edge, runs a fixed stub outward so the
//! line clears the block border, crosses over with one elbow pair, and enters the target through
//! its own stub. When that shape would fold back over itself (a backward route, or a loop onto the
//! same anchor) the route takes a detour lane that clears both blocks instead. Routing is pure:
//! the same endpoints always produce the same polyline.

use smallvec::SmallVec;

use super::geom::{Anchor, Point, Rect, BLOCK_HEIGHT, BLOCK_WIDTH};

/// Distance a route travels straight out of an anchor before its first turn.
pub const ROUTE_OFFSET: f64 = 40.0;

/// An orthogonal polyline. Routes never need more than six points.
pub type RoutePath = SmallVec<[Point; 6]>;

/// Midpoint of the named edge of the block rectangle at `position`.
pub fn anchor_point(position: Point, anchor: Anchor) -> Point {
    match anchor {
        Anchor::Left => Point::new(position.x, position.y + BLOCK_HEIGHT / 2.0),
        Anchor::Right => Point::new(position.x + BLOCK_WIDTH, position.y + BLOCK_HEIGHT / 2.0),
        Anchor::Top => Point::new(position.x + BLOCK_WIDTH / 2.0, position.y),
        Anchor::Bottom => Point::new(position.x + BLOCK_WIDTH / 2.0, position.y + BLOCK_HEIGHT),
    }
}

/// Top-left corner of the block whose `anchor` sits at `point`.
fn block_origin(point: Point, anchor: Anchor) -> Point {
    match anchor {
        Anchor::Left => Point::new(point.x, point.y - BLOCK_HEIGHT / 2.0),
        Anchor::Right => Point::new(point.x - BLOCK_WIDTH, point.y - BLOCK_HEIGHT / 2.0),
        Anchor::Top => Point::new(point.x - BLOCK_WIDTH / 2.0, point.y),
        Anchor::Bottom => Point::new(point.x - BLOCK_WIDTH / 2.0, point.y - BLOCK_HEIGHT),
    }
}

fn extend(point: Point, anchor: Anchor, offset: f64) -> Point {
    let (nx, ny) = anchor.outward_normal();
    point.offset(nx * offset, ny * offset)
}

/// Routes a finished connection with the default stub length.
pub fn route_path(
    source: Point,
    source_anchor: Anchor,
    target: Point,
    target_anchor: Anchor,
) -> RoutePath {
    route_path_with_offset(source, source_anchor, target, target_anchor, ROUTE_OFFSET)
}

pub fn route_path_with_offset(
    source: Point,
    source_anchor: Anchor,
    target: Point,
    target_anchor: Anchor,
    offset: f64,
) -> RoutePath {
    let source_stub = extend(source, source_anchor, offset);
    let target_stub = extend(target, target_anchor, offset);

    let mut points = RoutePath::new();
    points.push(source);
    points.push(source_stub);
    push_elbows(&mut points, source_stub, target_stub);
    points.push(target_stub);
    points.push(target);
    let direct = compress_to_polyline(&points);
    if !doubles_back(&direct) {
        return direct;
    }

    if source.approx_eq(target) {
        return loop_back(source, source_anchor, offset);
    }
    let ends = DetourEnds { source, source_anchor, source_stub, target, target_anchor, target_stub };
    detour(&ends, offset).unwrap_or(direct)
}

/// True when two consecutive segments run in opposite directions.
fn doubles_back(path: &[Point]) -> bool {
    path.windows(3).any(|triple| {
        let (ax, ay) = direction(triple[0], triple[1]);
        let (bx, by) = direction(triple[1], triple[2]);
        ax == -bx && ay == -by
    })
}

/// A square loop that leaves through the stub and comes back onto the same anchor.
fn loop_back(anchor_at: Point, anchor: Anchor, offset: f64) -> RoutePath {
    let (nx, ny) = anchor.outward_normal();
    // Left turn from the outward heading, in screen coordinates.
    let (sx, sy) = (ny * offset, -nx * offset);
    let stub = extend(anchor_at, anchor, offset);

    let mut points = RoutePath::new();
    points.push(anchor_at);
    points.push(stub);
    points.push(stub.offset(sx, sy));
    points.push(anchor_at.offset(sx, sy));
    points.push(anchor_at);
    points
}

struct DetourEnds {
    source: Point,
    source_anchor: Anchor,
    source_stub: Point,
    target: Point,
    target_anchor: Anchor,
    target_stub: Point,
}

/// Routes around both blocks on a lane parallel to the crossing axis.
///
/// Horizontal source anchors cross on a horizontal lane and vertical ones on a vertical lane.
/// Candidate lanes are the gap between the blocks and the two outer sides; the one nearest the
/// midpoint of the endpoints wins unless its route would still fold back. Returns `None` when
/// every lane folds, which only happens when both stubs share the crossing coordinate.
fn detour(ends: &DetourEnds, offset: f64) -> Option<RoutePath> {
    let source_rect = Rect::block_at(block_origin(ends.source, ends.source_anchor));
    let target_rect = Rect::block_at(block_origin(ends.target, ends.target_anchor));
    let horizontal = ends.source_anchor.is_horizontal();

    let (first, second, preferred) = if horizontal {
        (
            (source_rect.y, source_rect.bottom()),
            (target_rect.y, target_rect.bottom()),
            (ends.source.y + ends.target.y) / 2.0,
        )
    } else {
        (
            (source_rect.x, source_rect.right()),
            (target_rect.x, target_rect.right()),
            (ends.source.x + ends.target.x) / 2.0,
        )
    };
    let mut lanes = detour_lanes(first, second, offset);
    lanes.sort_by(|a, b| (a - preferred).abs().total_cmp(&(b - preferred).abs()));

    lanes
        .into_iter()
        .map(|lane| {
            let (enter, leave) = if horizontal {
                (Point::new(ends.source_stub.x, lane), Point::new(ends.target_stub.x, lane))
            } else {
                (Point::new(lane, ends.source_stub.y), Point::new(lane, ends.target_stub.y))
            };
            compress_to_polyline(&[
                ends.source,
                ends.source_stub,
                enter,
                leave,
                ends.target_stub,
                ends.target,
            ])
        })
        .find(|path| !doubles_back(path))
}

/// Lane coordinates that clear both block spans: the gap midpoint first, then the lower and
/// upper outer lanes.
fn detour_lanes(first: (f64, f64), second: (f64, f64), offset: f64) -> SmallVec<[f64; 3]> {
    let mut lanes = SmallVec::new();
    if first.1 < second.0 {
        lanes.push((first.1 + second.0) / 2.0);
    } else if second.1 < first.0 {
        lanes.push((second.1 + first.0) / 2.0);
    }
    lanes.push(first.0.min(second.0) - offset);
    lanes.push(first.1.max(second.1) + offset);
    lanes
}

/// Stable anchor for per-connection controls: the midpoint of the longest segment.
///
/// Ties resolve to the earliest segment so the control does not hop between equal segments.
pub fn midpoint_for_affordance(path: &[Point]) -> Option<Point> {
    match path {
        [] => None,
        [only] => Some(*only),
        _ => {
            let mut best = (path[0], path[1]);
            let mut best_len = segment_length(path[0], path[1]);
            for pair in path.windows(2).skip(1) {
                let len = segment_length(pair[0], pair[1]);
                if len > best_len {
                    best = (pair[0], pair[1]);
                    best_len = len;
                }
            }
            Some(Point::new((best.0.x + best.1.x) / 2.0, (best.0.y + best.1.y) / 2.0))
        }
    }
}

fn segment_length(a: Point, b: Point) -> f64 {
    (b.x - a.x).abs() + (b.y - a.y).abs()
}

/// Distance from `point` to the closest segment of `path`.
pub fn distance_to_path(path: &[Point], point: Point) -> Option<f64> {
    match path {
        [] => None,
        [only] => Some(only.distance_to(point)),
        _ => path
            .windows(2)
            .map(|pair| distance_to_segment(pair[0], pair[1], point))
            .min_by(f64::total_cmp),
    }
}

fn distance_to_segment(a: Point, b: Point, p: Point) -> f64 {
    let (dx, dy) = (b.x - a.x, b.y - a.y);
    let len_sq = dx * dx + dy * dy;
    if len_sq == 0.0 {
        return a.distance_to(p);
    }
    let t = (((p.x - a.x) * dx + (p.y - a.y) * dy) / len_sq).clamp(0.0, 1.0);
    Point::new(a.x + t * dx, a.y + t * dy).distance_to(p)
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::{
        anchor_point, distance_to_path, doubles_back, midpoint_for_affordance, route_path,
        route_preview, ROUTE_OFFSET,
    };
    use crate::layout::geom::{Anchor, Point, Rect};

    fn assert_orthogonal(path: &[Point]) {
        for pair in path.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            assert!(
                a.x == b.x || a.y == b.y,
                "segment {a:?} -> {b:?} is not axis-aligned in {path:?}"
            );
        }
    }

    /// Whether any axis-aligned segment of `path` passes through the open interior of `rect`.
    fn crosses_interior(path: &[Point], rect: Rect) -> bool {
        path.windows(2).any(|pair| {
            let (a, b) = (pair[0], pair[1]);
            a.x.min(b.x) < rect.right()
                && a.x.max(b.x) > rect.x
                && a.y.min(b.y) < rect.bottom()
                && a.y.max(b.y) > rect.y
        })
    }

    #[rstest]
    #[case(Anchor::Left, Point::new(100.0, 125.0))]
    #[case(Anchor::Right, Point::new(220.0, 125.0))]
    #[case(Anchor::Top, Point::new(160.0, 100.0))]
    #[case(Anchor::Bottom, Point::new(160.0, 150.0))]
    fn anchor_points_sit_on_edge_midpoints(#[case] anchor: Anchor, #[case] expected: Point) {
        assert_eq!(anchor_point(Point::new(100.0, 100.0), anchor), expected);
    }

    #[test]
    fn horizontal_route_uses_a_single_elbow_pair() {
        let source = anchor_point(Point::new(0.0, 0.0), Anchor::Right);
        let target = anchor_point(Point::new(300.0, 100.0), Anchor::Left);
        let path = route_path(source, Anchor::Right, target, Anchor::Left);

        assert_eq!(
            path.as_slice(),
            &[
                Point::new(120.0, 25.0),
                Point::new(210.0, 25.0),
                Point::new(210.0, 125.0),
                Point::new(300.0, 125.0),
            ]
        );
        assert_orthogonal(&path);
    }

    #[test]
    fn aligned_anchors_collapse_to_a_straight_line() {
        let source = anchor_point(Point::new(0.0, 0.0), Anchor::Right);
        let target = anchor_point(Point::new(300.0, 0.0), Anchor::Left);
        let path = route_path(source, Anchor::Right, target, Anchor::Left);
        assert_eq!(path.as_slice(), &[source, target]);
    }

    #[test]
    fn vertical_dominant_route_turns_vertically_first() {
        let source = anchor_point(Point::new(0.0, 0.0), Anchor::Bottom);
        let target = anchor_point(Point::new(40.0, 300.0), Anchor::Top);
        let path = route_path(source, Anchor::Bottom, target, Anchor::Top);

        assert_orthogonal(&path);
        assert_eq!(path.first(), Some(&source));
        assert_eq!(path.last(), Some(&target));
        // Leaves downward, crosses over horizontally at the vertical midpoint, enters from above.
        assert_eq!(path[1].x, source.x);
        assert_eq!(path[1].y, path[2].y);
        assert_eq!(path[2].x, target.x);
    }

    #[test]
    fn route_leaves_and_enters_perpendicular_to_anchor_edges() {
        let source = anchor_point(Point::new(200.0, 200.0), Anchor::Top);
        let target = anchor_point(Point::new(0.0, 0.0), Anchor::Right);
        let path = route_path(source, Anchor::Top, target, Anchor::Right);

        assert_orthogonal(&path);
        let first = (path[0], path[1]);
        assert_eq!(first.0.x, first.1.x);
        assert!(first.1.y < first.0.y);
        let n = path.len();
        let last = (path[n - 2], path[n - 1]);
        assert_eq!(last.0.y, last.1.y);
        assert!(last.0.x > last.1.x);
    }

    #[test]
    fn self_loop_route_goes_over_the_block() {
        let position = Point::new(100.0, 100.0);
        let source = anchor_point(position, Anchor::Right);
        let target = anchor_point(position, Anchor::Left);
        let path = route_path(source, Anchor::Right, target, Anchor::Left);

        assert_eq!(
            path.as_slice(),
            &[
                source,
                Point::new(220.0 + ROUTE_OFFSET, 125.0),
                Point::new(260.0, 100.0 - ROUTE_OFFSET),
                Point::new(100.0 - ROUTE_OFFSET, 60.0),
                Point::new(60.0, 125.0),
                target,
            ]
        );
        assert!(!crosses_interior(&path, Rect::block_at(position)));
    }

    #[test]
    fn looping_onto_the_same_anchor_draws_a_square() {
        let source = anchor_point(Point::new(100.0, 100.0), Anchor::Right);
        let path = route_path(source, Anchor::Right, source, Anchor::Right);

        assert_eq!(
            path.as_slice(),
            &[
                Point::new(220.0, 125.0),
                Point::new(260.0, 125.0),
                Point::new(260.0, 85.0),
                Point::new(220.0, 85.0),
                Point::new(220.0, 125.0),
            ]
        );
        assert!(!doubles_back(&path));
    }

    #[test]
    fn backward_route_detours_around_both_blocks() {
        let source_block = Point::new(300.0, 0.0);
        let target_block = Point::new(0.0, 0.0);
        let source = anchor_point(source_block, Anchor::Right);
        let target = anchor_point(target_block, Anchor::Left);
        let path = route_path(source, Anchor::Right, target, Anchor::Left);

        assert_eq!(
            path.as_slice(),
            &[
                Point::new(420.0, 25.0),
                Point::new(460.0, 25.0),
                Point::new(460.0, -40.0),
                Point::new(-40.0, -40.0),
                Point::new(-40.0, 25.0),
                Point::new(0.0, 25.0),
            ]
        );
        assert!(!crosses_interior(&path, Rect::block_at(source_block)));
        assert!(!crosses_interior(&path, Rect::block_at(target_block)));
    }

    #[test]
    fn backward_route_prefers_the_gap_between_blocks() {
        let source = anchor_point(Point::new(300.0, 0.0), Anchor::Right);
        let target = anchor_point(Point::new(0.0, 300.0), Anchor::Left);
        let path = route_path(source, Anchor::Right, target, Anchor::Left);

        assert_eq!(
            path.as_slice(),
            &[
                Point::new(420.0, 25.0),
                Point::new(460.0, 25.0),
                Point::new(460.0, 175.0),
                Point::new(-40.0, 175.0),
                Point::new(-40.0, 325.0),
                Point::new(0.0, 325.0),
            ]
        );
    }

    #[test]
    fn detour_enters_vertical_anchors_from_outside() {
        let source = anchor_point(Point::new(300.0, 0.0), Anchor::Right);
        let target_block = Point::new(0.0, 60.0);
        let target = anchor_point(target_block, Anchor::Bottom);
        let path = route_path(source, Anchor::Right, target, Anchor::Bottom);

        assert_orthogonal(&path);
        assert_eq!(path.last(), Some(&target));
        let n = path.len();
        assert_eq!(path[n - 2].x, target.x);
        assert!(path[n - 2].y > target.y);
        assert!(!crosses_interior(&path, Rect::block_at(target_block)));
    }

    #[test]
    fn no_route_folds_back_on_itself() {
        let anchors = [Anchor::Left, Anchor::Right, Anchor::Top, Anchor::Bottom];
        let origin = Point::new(400.0, 400.0);
        let targets = [-400.0, -150.0, 0.0, 150.0, 400.0]
            .into_iter()
            .flat_map(|dx| [-300.0, -80.0, 0.0, 80.0, 300.0].map(|dy| origin.offset(dx, dy)))
            .collect::<Vec<_>>();

        for source_anchor in anchors {
            for target_anchor in anchors {
                for target_block in &targets {
                    let source = anchor_point(origin, source_anchor);
                    let target = anchor_point(*target_block, target_anchor);
                    let path = route_path(source, source_anchor, target, target_anchor);

                    assert_orthogonal(&path);
                    assert_eq!(path.first(), Some(&source));
                    assert_eq!(path.last(), Some(&target));
                    assert!(
                        !doubles_back(&path),
                        "{source_anchor:?} -> {target_anchor:?} folds back: {path:?}"
                    );
                }
            }
        }
    }

    #[test]
    fn preview_terminates_at_the_pointer() {
        let source = anchor_point(Point::new(0.0, 0.0), Anchor::Right);
        let pointer = Point::new(260.0, 180.0);
        let path = route_preview(source, Anchor::Right, pointer, ROUTE_OFFSET);

        assert_orthogonal(&path);
        assert_eq!(path.first(), Some(&source));
        assert_eq!(path.last(), Some(&pointer));
    }

    #[test]
    fn affordance_sits_on_the_longest_segment() {
        let path = [
            Point::new(0.0, 0.0),
            Point::new(40.0, 0.0),
            Point::new(40.0, 200.0),
            Point::new(80.0, 200.0),
        ];
        assert_eq!(midpoint_for_affordance(&path), Some(Point::new(40.0, 100.0)));
        assert_eq!(midpoint_for_affordance(&[]), None);
    }

    #[test]
    fn affordance_is_stable_across_equal_segments() {
        let path = [Point::new(0.0, 0.0), Point::new(10.0, 0.0), Point::new(10.0, 10.0)];
        assert_eq!(midpoint_for_affordance(&path), Some(Point::new(5.0, 0.0)));
    }

    #[test]
    fn distance_to_path_measures_perpendicular_offset() {
        let path = [Point::new(0.0, 0.0), Point::new(100.0, 0.0)];
        assert_eq!(distance_to_path(&path, Point::new(50.0, 7.0)), Some(7.0));
        assert_eq!(distance_to_path(&path, Point::new(103.0, 4.0)), Some(5.0));
    }
}
