// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Orbifold-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Orbifold and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Orbifold: a protocol-diagram editor.
//!
//! Blocks from a fixed palette of cryptographic primitives are placed on a canvas and wired
//! anchor-to-anchor. [`editor::Editor`] owns the diagram, the pointer state machine and the undo
//! history; [`layout`] routes connections and resolves placement; [`store`] and [`server`] persist
//! documents behind a small JSON API; [`tui`] is the terminal front end.

pub mod config;
pub mod editor;
pub mod export;
pub mod history;
pub mod layout;
pub mod model;
pub mod ops;
pub mod server;
pub mod store;
pub mod telemetry;
pub mod tui;
pub mod validate;
