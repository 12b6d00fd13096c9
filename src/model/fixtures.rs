// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Orbifold-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Orbifold and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use super::block::{Block, BlockKind};
use super::connection::Connection;
use super::diagram::Diagram;
use super::ids::{BlockId, ConnectionId};
use crate::layout::{Anchor, Point};

pub(crate) fn bid(value: &str) -> BlockId {
    BlockId::new(value).expect("block id")
}

pub(crate) fn cid(value: &str) -> ConnectionId {
    ConnectionId::new(value).expect("connection id")
}

/// `input -> groth16 -> output`, laid out left to right.
pub(crate) fn input_groth16_output() -> Diagram {
    let mut diagram = Diagram::new("Private Transfer");

    diagram.blocks_mut().extend([
        Block::new(bid("input"), BlockKind::Input, "Input", Point::new(0.0, 100.0)),
        Block::new(bid("groth16"), BlockKind::ZkPrimitive, "Groth16", Point::new(250.0, 100.0)),
        Block::new(bid("output"), BlockKind::Output, "Output", Point::new(500.0, 100.0)),
    ]);
    diagram.connections_mut().extend([
        Connection::new(cid("c1"), bid("input"), Anchor::Right, bid("groth16"), Anchor::Left),
        Connection::new(cid("c2"), bid("groth16"), Anchor::Right, bid("output"), Anchor::Left),
    ]);

    diagram
}

/// Two unconnected blocks: a verification step and a mechanism.
pub(crate) fn unconnected_pair() -> Diagram {
    let mut diagram = Diagram::new("Loose Ends");
    diagram.blocks_mut().extend([
        Block::new(bid("merkle"), BlockKind::Verification, "Merkle Proof", Point::new(0.0, 0.0)),
        Block::new(bid("auction"), BlockKind::Mechanism, "Auction Protocol", Point::new(0.0, 200.0)),
    ]);
    diagram
}
