// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Orbifold-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Orbifold and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Persistence for saved protocols.
//!
//! A [`ProtocolStore`] keeps records in memory and, when opened with a path, mirrors every
//! mutation into a single JSON file that is replaced atomically.

use std::io;
use std::path::PathBuf;

mod atomic;
pub mod protocol_store;

pub use atomic::WriteDurability;
pub(crate) use atomic::write_atomic;
pub use protocol_store::{ProtocolPatch, ProtocolRecord, ProtocolStore};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("io error at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("json error at {}: {source}", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("refusing to write through symlink {}", .path.display())]
    SymlinkRefused { path: PathBuf },
    #[error("protocol {id} not found")]
    NotFound { id: u64 },
}
