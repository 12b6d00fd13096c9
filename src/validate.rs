// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Orbifold-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Orbifold and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Lightweight structural checks on a protocol diagram.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::model::{Block, BlockKind, Connection};

pub const LOOKS_GOOD: &str = "Protocol structure looks good!";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub valid: bool,
    pub issues: Vec<String>,
    #[serde(default)]
    pub suggestions: Vec<String>,
}

/// Reports advisory issues; an empty issue list means the diagram is valid.
pub fn validate(blocks: &[Block], connections: &[Connection]) -> ValidationReport {
    let mut issues = Vec::new();
    let has_kind = |kind: BlockKind| blocks.iter().any(|block| block.kind() == kind);

    if !has_kind(BlockKind::ZkPrimitive) && !has_kind(BlockKind::CryptoPrimitive) {
        issues.push("Protocol should contain at least one cryptographic primitive".to_owned());
    }
    if connections.is_empty() && blocks.len() > 1 {
        issues.push("Multiple blocks should be connected to show data flow".to_owned());
    }
    if !has_kind(BlockKind::Verification) {
        issues.push("Consider adding verification components for security".to_owned());
    }

    if blocks.len() > 1 {
        let connected = connections
            .iter()
            .flat_map(|conn| [conn.source_block_id(), conn.target_block_id()])
            .collect::<HashSet<_>>();
        let disconnected = blocks.iter().filter(|block| !connected.contains(block.id())).count();
        if disconnected > 0 {
            issues.push(format!("{disconnected} block(s) are not connected to the protocol flow"));
        }
    }

    let valid = issues.is_empty();
    let suggestions = if valid { vec![LOOKS_GOOD.to_owned()] } else { Vec::new() };
    ValidationReport { valid, issues, suggestions }
}
