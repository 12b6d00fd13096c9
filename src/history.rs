// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Orbifold-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Orbifold and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Snapshot-based undo/redo.
//!
//! The history is a bounded run of immutable snapshots with a cursor pointing at the one that
//! matches the live diagram. Undo and redo move the cursor; a new checkpoint discards everything
//! after it.

use std::collections::VecDeque;

use crate::model::{Block, Connection, Diagram};

pub const DEFAULT_HISTORY_CAPACITY: usize = 50;

/// Deep copy of the mutable part of a diagram.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    blocks: Vec<Block>,
    connections: Vec<Connection>,
}

impl Snapshot {
    pub fn capture(diagram: &Diagram) -> Self {
        Self {
            blocks: diagram.blocks().to_vec(),
            connections: diagram.connections().to_vec(),
        }
    }

    pub fn restore_into(&self, diagram: &mut Diagram) {
        diagram.replace_contents(self.blocks.clone(), self.connections.clone());
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }
}

#[derive(Debug, Clone)]
pub struct History {
    snapshots: VecDeque<Snapshot>,
    cursor: usize,
    capacity: usize,
}

impl History {
    /// Starts a history whose only entry is `initial`. A capacity of zero is treated as one.
    pub fn new(capacity: usize, initial: Snapshot) -> Self {
        let capacity = capacity.max(1);
        let mut snapshots = VecDeque::with_capacity(capacity);
        snapshots.push_back(initial);
        Self { snapshots, cursor: 0, capacity }
    }

    /// Records `snapshot` as the newest state.
    ///
    /// Returns `false` when the snapshot equals the current entry and nothing was recorded.
    pub fn checkpoint(&mut self, snapshot: Snapshot) -> bool {
        if self.snapshots.get(self.cursor) == Some(&snapshot) {
            return false;
        }

        self.snapshots.truncate(self.cursor + 1);
        self.snapshots.push_back(snapshot);
        while self.snapshots.len() > self.capacity {
            self.snapshots.pop_front();
        }
        self.cursor = self.snapshots.len() - 1;
        true
    }

    pub fn undo(&mut self) -> Option<&Snapshot> {
        if !self.can_undo() {
            return None;
        }
        self.cursor -= 1;
        self.snapshots.get(self.cursor)
    }

    pub fn redo(&mut self) -> Option<&Snapshot> {
        if !self.can_redo() {
            return None;
        }
        self.cursor += 1;
        self.snapshots.get(self.cursor)
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.snapshots.len()
    }

    /// Drops every entry and starts over from `initial`.
    pub fn reset(&mut self, initial: Snapshot) {
        self.snapshots.clear();
        self.snapshots.push_back(initial);
        self.cursor = 0;
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }
}
