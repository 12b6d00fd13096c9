// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Orbifold-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Orbifold and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{write_atomic, StoreError, WriteDurability};
use crate::model::{Block, Connection, Diagram, DiagramDocument};

#[cfg(test)]
mod tests;

/// A saved protocol: the diagram document plus store bookkeeping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProtocolRecord {
    pub id: u64,
    #[serde(flatten)]
    pub document: DiagramDocument,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Partial update; absent fields keep their stored value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProtocolPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blocks: Option<Vec<Block>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connections: Option<Vec<Connection>>,
}

impl ProtocolPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.blocks.is_none()
            && self.connections.is_none()
    }

    fn apply_to(self, document: &mut DiagramDocument) {
        if let Some(name) = self.name {
            document.name = name;
        }
        if let Some(description) = self.description {
            document.description = Some(description);
        }
        if let Some(blocks) = self.blocks {
            document.blocks = blocks;
        }
        if let Some(connections) = self.connections {
            document.connections = connections;
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoreFile {
    next_id: u64,
    protocols: Vec<ProtocolRecord>,
}

#[derive(Debug, Clone)]
struct State {
    next_id: u64,
    records: BTreeMap<u64, ProtocolRecord>,
}

impl Default for State {
    fn default() -> Self {
        Self { next_id: 1, records: BTreeMap::new() }
    }
}

/// Protocol records keyed by an auto-incrementing id that starts at 1.
///
/// A file-backed store rewrites its file on every mutation. A mutation whose write fails leaves
/// the in-memory records untouched.
#[derive(Debug, Clone, Default)]
pub struct ProtocolStore {
    path: Option<PathBuf>,
    durability: WriteDurability,
    state: State,
}

impl ProtocolStore {
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Opens the store backed by `path`, loading existing records when the file exists.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let state = match std::fs::read_to_string(&path) {
            Ok(raw) => load_state(&path, &raw)?,
            Err(err) if err.kind() == io::ErrorKind::NotFound => State::default(),
            Err(source) => return Err(StoreError::Io { path, source }),
        };
        tracing::info!(
            path = %path.display(),
            protocols = state.records.len(),
            "opened protocol store"
        );
        Ok(Self { path: Some(path), durability: WriteDurability::default(), state })
    }

    pub fn with_durability(mut self, durability: WriteDurability) -> Self {
        self.durability = durability;
        self
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn len(&self) -> usize {
        self.state.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.records.is_empty()
    }

    pub fn get(&self, id: u64) -> Option<&ProtocolRecord> {
        self.state.records.get(&id)
    }

    /// Every record in ascending id order.
    pub fn list(&self) -> Vec<ProtocolRecord> {
        self.state.records.values().cloned().collect()
    }

    pub fn create(&mut self, document: DiagramDocument) -> Result<ProtocolRecord, StoreError> {
        let mut next = self.state.clone();
        let id = next.next_id;
        next.next_id += 1;

        let now = Utc::now();
        let record = ProtocolRecord {
            id,
            document: repaired(document),
            created_at: now,
            updated_at: now,
        };
        next.records.insert(id, record.clone());

        self.commit(next)?;
        tracing::info!(id, name = %record.document.name, "created protocol");
        Ok(record)
    }

    pub fn update(&mut self, id: u64, patch: ProtocolPatch) -> Result<ProtocolRecord, StoreError> {
        let mut next = self.state.clone();
        let Some(record) = next.records.get_mut(&id) else {
            return Err(StoreError::NotFound { id });
        };

        let mut document = record.document.clone();
        patch.apply_to(&mut document);
        record.document = repaired(document);
        record.updated_at = Utc::now().max(record.created_at);
        let record = record.clone();

        self.commit(next)?;
        tracing::info!(id, "updated protocol");
        Ok(record)
    }

    /// Returns `false` when no record has `id`.
    pub fn delete(&mut self, id: u64) -> Result<bool, StoreError> {
        if !self.state.records.contains_key(&id) {
            return Ok(false);
        }
        let mut next = self.state.clone();
        next.records.remove(&id);

        self.commit(next)?;
        tracing::info!(id, "deleted protocol");
        Ok(true)
    }

    fn commit(&mut self, next: State) -> Result<(), StoreError> {
        if let Some(path) = &self.path {
            persist(path, &next, self.durability)?;
        }
        self.state = next;
        Ok(())
    }
}

fn repaired(document: DiagramDocument) -> DiagramDocument {
    let (diagram, repair) = Diagram::from_document(document);
    if !repair.is_clean() {
        tracing::debug!(
            duplicate_blocks = repair.duplicate_blocks.len(),
            dropped_connections = repair.dropped_connections.len(),
            "repaired stored protocol"
        );
    }
    diagram.to_document()
}

fn load_state(path: &Path, raw: &str) -> Result<State, StoreError> {
    let file: StoreFile = serde_json::from_str(raw)
        .map_err(|source| StoreError::Json { path: path.to_path_buf(), source })?;

    let mut records = BTreeMap::new();
    for record in file.protocols {
        if records.contains_key(&record.id) {
            tracing::warn!(id = record.id, "skipping duplicate protocol id in store file");
            continue;
        }
        records.insert(record.id, record);
    }
    let max_id = records.keys().next_back().copied().unwrap_or(0);
    Ok(State { next_id: file.next_id.max(max_id + 1).max(1), records })
}

fn persist(path: &Path, state: &State, durability: WriteDurability) -> Result<(), StoreError> {
    let file = StoreFile {
        next_id: state.next_id,
        protocols: state.records.values().cloned().collect(),
    };
    let mut json = serde_json::to_string_pretty(&file)
        .map_err(|source| StoreError::Json { path: path.to_path_buf(), source })?;
    json.push('\n');
    write_atomic(path, json.as_bytes(), durability)
}
