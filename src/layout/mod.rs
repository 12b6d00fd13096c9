// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Orbifold-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Orbifold and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Canvas geometry.
//!
//! This module maps block positions to anchor points, routes connections as orthogonal polylines,
//! and resolves collision-free drop positions.

pub mod geom;
pub mod placement;
pub mod routing;

pub use geom::{Anchor, ParseAnchorError, Point, Rect, BLOCK_HEIGHT, BLOCK_WIDTH};
pub use placement::{resolve_placement, PlacementOptions};
pub use routing::{
    anchor_point, distance_to_path, midpoint_for_affordance, route_path, route_path_with_offset,
    route_preview, RoutePath, ROUTE_OFFSET,
};
