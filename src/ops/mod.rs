// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Orbifold-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Orbifold and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Mutation operations for diagrams.
//!
//! A batch of ops is applied all-or-nothing and produces a minimal delta that the editor and the
//! terminal front end use to refresh derived state.

use std::collections::HashSet;

use smol_str::SmolStr;

use crate::layout::Point;
use crate::model::{Block, BlockId, BlockProperties, Connection, ConnectionId, Diagram, ObjectRef};

#[derive(Debug, Clone, PartialEq)]
pub enum Op {
    AddBlock { block: Block },
    UpdateBlock { block_id: BlockId, patch: BlockPatch },
    RemoveBlock { block_id: BlockId },
    AddConnection { connection: Connection },
    RemoveConnection { connection_id: ConnectionId },
    Clear,
}

/// Partial block update. Properties are merged key by key into the existing overrides.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BlockPatch {
    pub position: Option<Point>,
    pub display_name: Option<SmolStr>,
    pub properties: BlockProperties,
}

impl BlockPatch {
    pub fn position(position: Point) -> Self {
        Self { position: Some(position), ..Self::default() }
    }

    pub fn display_name(display_name: impl Into<SmolStr>) -> Self {
        Self { display_name: Some(display_name.into()), ..Self::default() }
    }

    pub fn is_empty(&self) -> bool {
        self.position.is_none() && self.display_name.is_none() && self.properties.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplyResult {
    pub applied: usize,
    pub delta: Delta,
}

/// Minimal delta describing which objects changed as the result of applying ops.
///
/// Cascaded connection removals are reported alongside the block that caused them.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Delta {
    pub added: Vec<ObjectRef>,
    pub removed: Vec<ObjectRef>,
    pub updated: Vec<ObjectRef>,
}

impl Delta {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.updated.is_empty()
    }

    pub fn removes(&self, object_ref: &ObjectRef) -> bool {
        self.removed.contains(object_ref)
    }
}

#[derive(Debug, Default)]
struct DeltaBuilder {
    added: HashSet<ObjectRef>,
    removed: HashSet<ObjectRef>,
    updated: HashSet<ObjectRef>,
}

impl DeltaBuilder {
    fn record_added(&mut self, object_ref: ObjectRef) {
        self.removed.remove(&object_ref);
        self.updated.remove(&object_ref);
        self.added.insert(object_ref);
    }

    fn record_removed(&mut self, object_ref: ObjectRef) {
        // Added and removed within one batch: the object never became visible.
        if self.added.remove(&object_ref) {
            self.updated.remove(&object_ref);
            return;
        }
        self.updated.remove(&object_ref);
        self.removed.insert(object_ref);
    }

    fn record_updated(&mut self, object_ref: ObjectRef) {
        if self.added.contains(&object_ref) || self.removed.contains(&object_ref) {
            return;
        }
        self.updated.insert(object_ref);
    }

    fn finish(self) -> Delta {
        let mut added = self.added.into_iter().collect::<Vec<_>>();
        let mut removed = self.removed.into_iter().collect::<Vec<_>>();
        let mut updated = self.updated.into_iter().collect::<Vec<_>>();

        added.sort();
        removed.sort();
        updated.sort();

        Delta { added, removed, updated }
    }
}

/// Applies `ops` in order. Either every op succeeds or the diagram is left untouched.
pub fn apply_ops(diagram: &mut Diagram, ops: &[Op]) -> Result<ApplyResult, ApplyError> {
    if ops.is_empty() {
        return Ok(ApplyResult { applied: 0, delta: Delta::default() });
    }

    let mut scratch = diagram.clone();
    let mut delta = DeltaBuilder::default();
    for op in ops {
        apply_op(&mut scratch, op, &mut delta)?;
    }
    *diagram = scratch;

    Ok(ApplyResult { applied: ops.len(), delta: delta.finish() })
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApplyError {
    #[error("object already exists ({object})")]
    AlreadyExists { object: ObjectRef },
    #[error("object not found ({object})")]
    NotFound { object: ObjectRef },
    #[error("connection endpoint block not found (id={block_id})")]
    MissingBlock { block_id: BlockId },
    #[error("connection duplicates the endpoints of {existing}")]
    DuplicateConnection { existing: ConnectionId },
}

// Extracted op-application implementation for block/connection mutations.
include!("ops_impl.rs");
