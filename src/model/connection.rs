// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Orbifold-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Orbifold and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use serde::{Deserialize, Serialize};

use super::ids::{BlockId, ConnectionId};
use crate::layout::Anchor;

/// A directed link between two block anchors.
///
/// Endpoints are weak references by id; the diagram guarantees both blocks exist.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection {
    id: ConnectionId,
    source_block_id: BlockId,
    target_block_id: BlockId,
    #[serde(rename = "sourcePoint")]
    source_anchor: Anchor,
    #[serde(rename = "targetPoint")]
    target_anchor: Anchor,
}

impl Connection {
    pub fn new(
        id: ConnectionId,
        source_block_id: BlockId,
        source_anchor: Anchor,
        target_block_id: BlockId,
        target_anchor: Anchor,
    ) -> Self {
        Self { id, source_block_id, target_block_id, source_anchor, target_anchor }
    }

    pub fn id(&self) -> &ConnectionId {
        &self.id
    }

    pub fn source_block_id(&self) -> &BlockId {
        &self.source_block_id
    }

    pub fn target_block_id(&self) -> &BlockId {
        &self.target_block_id
    }

    pub fn source_anchor(&self) -> Anchor {
        self.source_anchor
    }

    pub fn target_anchor(&self) -> Anchor {
        self.target_anchor
    }

    pub fn touches(&self, block_id: &BlockId) -> bool {
        &self.source_block_id == block_id || &self.target_block_id == block_id
    }

    pub fn is_self_loop(&self) -> bool {
        self.source_block_id == self.target_block_id
    }

    /// Whether both connections join the same anchors of the same blocks, ignoring ids.
    pub fn same_endpoints(&self, other: &Connection) -> bool {
        self.endpoints() == other.endpoints()
    }

    pub fn endpoints(&self) -> (&BlockId, Anchor, &BlockId, Anchor) {
        (&self.source_block_id, self.source_anchor, &self.target_block_id, self.target_anchor)
    }
}

#[cfg(test)]
mod tests {
    use super::Connection;
    use crate::layout::Anchor;
    use crate::model::{BlockId, ConnectionId};

    fn bid(value: &str) -> BlockId {
        BlockId::new(value).expect("block id")
    }

    #[test]
    fn connection_json_uses_point_keys() {
        let conn = Connection::new(
            ConnectionId::new("c1").expect("connection id"),
            bid("a"),
            Anchor::Right,
            bid("b"),
            Anchor::Left,
        );
        let json = serde_json::to_value(&conn).expect("serialize");
        assert_eq!(
            json,
            serde_json::json!({
                "id": "c1",
                "sourceBlockId": "a",
                "targetBlockId": "b",
                "sourcePoint": "right",
                "targetPoint": "left",
            })
        );
    }

    #[test]
    fn legacy_port_names_load_as_side_anchors() {
        let conn: Connection = serde_json::from_value(serde_json::json!({
            "id": "c1",
            "sourceBlockId": "a",
            "targetBlockId": "b",
            "sourcePoint": "output",
            "targetPoint": "input",
        }))
        .expect("deserialize");

        assert_eq!(conn.source_anchor(), Anchor::Right);
        assert_eq!(conn.target_anchor(), Anchor::Left);
    }

    #[test]
    fn endpoint_comparison_ignores_ids() {
        let first = Connection::new(
            ConnectionId::new("c1").expect("connection id"),
            bid("a"),
            Anchor::Right,
            bid("a"),
            Anchor::Left,
        );
        let second = Connection::new(
            ConnectionId::new("c2").expect("connection id"),
            bid("a"),
            Anchor::Right,
            bid("a"),
            Anchor::Left,
        );
        assert!(first.same_endpoints(&second));
        assert!(first.is_self_loop());
        assert!(first.touches(&bid("a")));
        assert!(!first.touches(&bid("b")));
    }
}
