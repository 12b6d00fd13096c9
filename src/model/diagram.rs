// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Orbifold-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Orbifold and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::block::Block;
use super::connection::Connection;
use super::ids::{BlockId, ConnectionId};

/// Serialized form of a diagram, shared by files, the store and export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagramDocument {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub blocks: Vec<Block>,
    pub connections: Vec<Connection>,
}

impl DiagramDocument {
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}

/// Entries dropped while turning a document into a live diagram.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentRepair {
    pub duplicate_blocks: Vec<BlockId>,
    pub dropped_connections: Vec<ConnectionId>,
}

impl DocumentRepair {
    pub fn is_clean(&self) -> bool {
        self.duplicate_blocks.is_empty() && self.dropped_connections.is_empty()
    }
}

/// The live canvas: ordered blocks and connections plus descriptive metadata.
///
/// Every connection references two blocks that exist, no two blocks share an id, and no two
/// connections share an id or the same endpoint tuple.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagram {
    name: String,
    description: Option<String>,
    blocks: Vec<Block>,
    connections: Vec<Connection>,
}

impl Default for Diagram {
    fn default() -> Self {
        Self::new("Untitled Protocol")
    }
}

impl Diagram {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            blocks: Vec::new(),
            connections: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn set_description(&mut self, description: Option<String>) {
        self.description = description;
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn block(&self, block_id: &BlockId) -> Option<&Block> {
        self.blocks.iter().find(|block| block.id() == block_id)
    }

    pub fn contains_block(&self, block_id: &BlockId) -> bool {
        self.block(block_id).is_some()
    }

    pub fn connection(&self, connection_id: &ConnectionId) -> Option<&Connection> {
        self.connections.iter().find(|conn| conn.id() == connection_id)
    }

    pub fn connections_touching<'a>(
        &'a self,
        block_id: &'a BlockId,
    ) -> impl Iterator<Item = &'a Connection> + 'a {
        self.connections.iter().filter(move |conn| conn.touches(block_id))
    }

    pub(crate) fn block_mut(&mut self, block_id: &BlockId) -> Option<&mut Block> {
        self.blocks.iter_mut().find(|block| block.id() == block_id)
    }

    pub(crate) fn blocks_mut(&mut self) -> &mut Vec<Block> {
        &mut self.blocks
    }

    pub(crate) fn connections_mut(&mut self) -> &mut Vec<Connection> {
        &mut self.connections
    }

    /// Swaps in a previously captured block/connection set, keeping name and description.
    pub(crate) fn replace_contents(&mut self, blocks: Vec<Block>, connections: Vec<Connection>) {
        self.blocks = blocks;
        self.connections = connections;
    }

    /// Builds a diagram from a document, dropping entries that would break the diagram
    /// invariants: repeated block ids (first wins), connections to unknown blocks, repeated
    /// connection ids and repeated endpoint tuples.
    pub fn from_document(document: DiagramDocument) -> (Self, DocumentRepair) {
        let mut repair = DocumentRepair::default();

        let mut seen_blocks = HashSet::new();
        let mut blocks = Vec::with_capacity(document.blocks.len());
        for block in document.blocks {
            if seen_blocks.insert(block.id().clone()) {
                blocks.push(block);
            } else {
                repair.duplicate_blocks.push(block.id().clone());
            }
        }

        let mut seen_connections = HashSet::new();
        let mut connections: Vec<Connection> = Vec::with_capacity(document.connections.len());
        for conn in document.connections {
            let dangling = !seen_blocks.contains(conn.source_block_id())
                || !seen_blocks.contains(conn.target_block_id());
            let repeated = seen_connections.contains(conn.id())
                || connections.iter().any(|existing| existing.same_endpoints(&conn));
            if dangling || repeated {
                repair.dropped_connections.push(conn.id().clone());
                continue;
            }
            seen_connections.insert(conn.id().clone());
            connections.push(conn);
        }

        let diagram = Self {
            name: document.name,
            description: document.description,
            blocks,
            connections,
        };
        (diagram, repair)
    }

    pub fn to_document(&self) -> DiagramDocument {
        DiagramDocument {
            name: self.name.clone(),
            description: self.description.clone(),
            blocks: self.blocks.clone(),
            connections: self.connections.clone(),
        }
    }
}
