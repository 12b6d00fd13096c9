// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Orbifold-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Orbifold and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

use crate::model::{BlockKind, PaletteEntry};

/// Transfer keys a drop payload may arrive under, highest priority first.
pub const PAYLOAD_KEYS: [&str; 3] =
    ["application/json", "text/plain", "application/x-orbifold-block"];

/// What a palette drag carries onto the canvas.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DropPayload {
    #[serde(rename = "type")]
    pub kind: BlockKind,
    #[serde(rename = "name")]
    pub display_name: SmolStr,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<SmolStr>,
}

impl DropPayload {
    pub fn from_entry(entry: PaletteEntry) -> Self {
        Self {
            kind: entry.kind(),
            display_name: SmolStr::new_static(entry.name()),
            category: Some(SmolStr::new_static(entry.category())),
        }
    }

    pub fn parse(raw: &str) -> Result<Self, PayloadError> {
        let payload: Self = serde_json::from_str(raw)?;
        if payload.display_name.trim().is_empty() {
            return Err(PayloadError::EmptyName);
        }
        Ok(payload)
    }

    pub fn to_json(&self) -> String {
        // A struct of strings and a unit enum always serializes.
        serde_json::to_string(self).unwrap_or_default()
    }

    /// The payload under every transfer key, as a drag source publishes it.
    pub fn to_transfer_entries(&self) -> Vec<(&'static str, String)> {
        let json = self.to_json();
        PAYLOAD_KEYS.iter().map(|key| (*key, json.clone())).collect()
    }
}

/// Reads a payload from drag-transfer entries.
///
/// Keys are tried in [`PAYLOAD_KEYS`] order; the first entry that parses wins. When entries exist
/// but none parse, the error of the highest-priority one is returned.
pub fn parse_drop_payload<'a, I>(entries: I) -> Result<DropPayload, PayloadError>
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let entries = entries.into_iter().collect::<Vec<_>>();
    let mut first_error = None;
    for key in PAYLOAD_KEYS {
        let Some((_, raw)) =
            entries.iter().find(|(candidate, raw)| *candidate == key && !raw.is_empty())
        else {
            continue;
        };
        match DropPayload::parse(raw) {
            Ok(payload) => return Ok(payload),
            Err(err) => {
                first_error.get_or_insert(err);
            }
        }
    }
    Err(first_error.unwrap_or(PayloadError::Missing))
}

#[derive(Debug, thiserror::Error)]
pub enum PayloadError {
    #[error("no drop payload under any known transfer key")]
    Missing,
    #[error("malformed drop payload: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("drop payload has an empty name")]
    EmptyName,
}
