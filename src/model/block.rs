// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Orbifold-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Orbifold and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

use super::ids::BlockId;
use super::palette::{BlockProperties, PaletteEntry, PropertyKey};
use crate::layout::{anchor_point, Anchor, Point, Rect};

/// The closed set of block categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BlockKind {
    #[serde(rename = "zk")]
    ZkPrimitive,
    #[serde(rename = "crypto")]
    CryptoPrimitive,
    #[serde(rename = "curve")]
    CurvePrimitive,
    #[serde(rename = "verification")]
    Verification,
    #[serde(rename = "mechanism")]
    Mechanism,
    #[serde(rename = "input")]
    Input,
    #[serde(rename = "output")]
    Output,
}

impl BlockKind {
    pub const ALL: [BlockKind; 7] = [
        BlockKind::ZkPrimitive,
        BlockKind::CryptoPrimitive,
        BlockKind::CurvePrimitive,
        BlockKind::Verification,
        BlockKind::Mechanism,
        BlockKind::Input,
        BlockKind::Output,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::ZkPrimitive => "zk",
            Self::CryptoPrimitive => "crypto",
            Self::CurvePrimitive => "curve",
            Self::Verification => "verification",
            Self::Mechanism => "mechanism",
            Self::Input => "input",
            Self::Output => "output",
        }
    }

    /// Palette section heading.
    pub fn category(self) -> &'static str {
        match self {
            Self::ZkPrimitive => "Zero-Knowledge",
            Self::CryptoPrimitive => "Cryptographic",
            Self::CurvePrimitive => "Elliptic Curves",
            Self::Verification => "Verification",
            Self::Mechanism => "Mechanism Design",
            Self::Input => "Inputs",
            Self::Output => "Outputs",
        }
    }

    /// Only inputs and outputs carry a user-chosen name.
    pub fn name_is_editable(self) -> bool {
        matches!(self, Self::Input | Self::Output)
    }
}

impl fmt::Display for BlockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown block type '{0}'")]
pub struct ParseBlockKindError(String);

impl FromStr for BlockKind {
    type Err = ParseBlockKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| ParseBlockKindError(s.to_owned()))
    }
}

/// A typed node on the canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    id: BlockId,
    #[serde(rename = "type")]
    kind: BlockKind,
    #[serde(rename = "name")]
    display_name: SmolStr,
    position: Point,
    #[serde(default, skip_serializing_if = "BlockProperties::is_empty")]
    properties: BlockProperties,
}

impl Block {
    pub fn new(
        id: BlockId,
        kind: BlockKind,
        display_name: impl Into<SmolStr>,
        position: Point,
    ) -> Self {
        Self {
            id,
            kind,
            display_name: display_name.into(),
            position,
            properties: BlockProperties::default(),
        }
    }

    pub fn id(&self) -> &BlockId {
        &self.id
    }

    pub fn kind(&self) -> BlockKind {
        self.kind
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn set_display_name(&mut self, display_name: impl Into<SmolStr>) {
        self.display_name = display_name.into();
    }

    pub fn position(&self) -> Point {
        self.position
    }

    pub fn set_position(&mut self, position: Point) {
        self.position = position;
    }

    pub fn properties(&self) -> &BlockProperties {
        &self.properties
    }

    pub fn properties_mut(&mut self) -> &mut BlockProperties {
        &mut self.properties
    }

    pub fn palette_entry(&self) -> Option<PaletteEntry> {
        PaletteEntry::for_block(self.kind, &self.display_name)
    }

    /// Override if present, otherwise the palette default.
    pub fn property(&self, key: &PropertyKey) -> Option<&str> {
        self.properties
            .get(key)
            .or_else(|| self.palette_entry().and_then(|entry| entry.default_property(key)))
    }

    /// Every property that has a value, overrides first in key order, then untouched defaults.
    pub fn effective_properties(&self) -> Vec<(PropertyKey, SmolStr)> {
        let mut out = self
            .properties
            .iter()
            .map(|(key, value)| (key.clone(), SmolStr::new(value)))
            .collect::<Vec<_>>();
        if let Some(entry) = self.palette_entry() {
            for (key, value) in entry.default_properties() {
                if self.properties.get(key).is_none() {
                    out.push((key.clone(), SmolStr::new_static(value)));
                }
            }
        }
        out
    }

    pub fn rect(&self) -> Rect {
        Rect::block_at(self.position)
    }

    pub fn anchor_point(&self, anchor: Anchor) -> Point {
        anchor_point(self.position, anchor)
    }
}
