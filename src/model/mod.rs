// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Orbifold-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Orbifold and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Core data model.
//!
//! A diagram holds typed blocks placed on a canvas and directed connections between block anchors.

pub mod block;
pub mod connection;
pub mod diagram;
#[cfg(test)]
pub(crate) mod fixtures;
pub mod ids;
pub mod object_ref;
pub mod palette;

pub use block::{Block, BlockKind, ParseBlockKindError};
pub use connection::Connection;
pub use diagram::{Diagram, DiagramDocument, DocumentRepair};
pub use ids::{BlockId, ConnectionId, Id, IdError, IdPrefix};
pub use object_ref::{ObjectRef, ParseObjectRefError};
pub use palette::{search_palette, BlockProperties, PaletteEntry, PropertyKey, ZK_CURVE_CHOICES};
