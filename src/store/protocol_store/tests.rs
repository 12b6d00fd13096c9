// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Orbifold-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Orbifold and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::env;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use rstest::{fixture, rstest};

use super::{ProtocolPatch, ProtocolStore};
use crate::layout::Point;
use crate::model::fixtures::{bid, input_groth16_output, unconnected_pair};
use crate::model::{Block, BlockKind, DiagramDocument};
use crate::store::{StoreError, WriteDurability};

static TEMP_DIR_COUNTER: AtomicUsize = AtomicUsize::new(0);

struct TempDir {
    path: std::path::PathBuf,
}

impl TempDir {
    fn new(prefix: &str) -> Self {
        let nanos = SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_nanos();
        let counter = TEMP_DIR_COUNTER.fetch_add(1, Ordering::Relaxed);
        let mut path = env::temp_dir();
        path.push(format!("orbifold-{prefix}-{}-{nanos}-{counter}", std::process::id()));
        std::fs::create_dir_all(&path).unwrap();
        Self { path }
    }

    fn path(&self) -> &std::path::Path {
        &self.path
    }
}

impl Drop for TempDir {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.path);
    }
}

#[fixture]
fn transfer() -> DiagramDocument {
    input_groth16_output().to_document()
}

#[rstest]
fn ids_start_at_one_and_increase(transfer: DiagramDocument) {
    let mut store = ProtocolStore::in_memory();

    let first = store.create(transfer.clone()).unwrap();
    let second = store.create(unconnected_pair().to_document()).unwrap();

    assert_eq!(first.id, 1);
    assert_eq!(second.id, 2);
    assert_eq!(first.created_at, first.updated_at);
    assert_eq!(store.get(1).map(|r| &r.document), Some(&transfer));
    assert_eq!(store.list().iter().map(|r| r.id).collect::<Vec<_>>(), vec![1, 2]);
}

#[rstest]
fn deleted_ids_are_not_reused(transfer: DiagramDocument) {
    let mut store = ProtocolStore::in_memory();
    store.create(transfer.clone()).unwrap();
    store.create(transfer.clone()).unwrap();

    assert!(store.delete(2).unwrap());
    assert!(!store.delete(2).unwrap());
    assert_eq!(store.create(transfer).unwrap().id, 3);
    assert_eq!(store.len(), 2);
}

#[rstest]
fn update_applies_only_present_fields(transfer: DiagramDocument) {
    let mut store = ProtocolStore::in_memory();
    let created = store.create(transfer.clone()).unwrap();

    let updated = store
        .update(
            created.id,
            ProtocolPatch {
                name: Some("Renamed".to_owned()),
                description: Some("shielded".to_owned()),
                ..ProtocolPatch::default()
            },
        )
        .unwrap();

    assert_eq!(updated.document.name, "Renamed");
    assert_eq!(updated.document.description.as_deref(), Some("shielded"));
    assert_eq!(updated.document.blocks, transfer.blocks);
    assert_eq!(updated.document.connections, transfer.connections);
    assert_eq!(updated.created_at, created.created_at);
    assert!(updated.updated_at >= created.updated_at);
}

#[test]
fn update_of_a_missing_record_is_not_found() {
    let mut store = ProtocolStore::in_memory();
    let err = store.update(7, ProtocolPatch::default()).unwrap_err();
    assert!(matches!(err, StoreError::NotFound { id: 7 }));
}

#[rstest]
fn replacing_blocks_drops_dangling_connections(transfer: DiagramDocument) {
    let mut store = ProtocolStore::in_memory();
    let created = store.create(transfer).unwrap();

    let only_input =
        vec![Block::new(bid("input"), BlockKind::Input, "Input", Point::new(0.0, 100.0))];
    let updated = store
        .update(created.id, ProtocolPatch { blocks: Some(only_input), ..ProtocolPatch::default() })
        .unwrap();

    assert_eq!(updated.document.blocks.len(), 1);
    assert!(updated.document.connections.is_empty());
}

#[rstest]
fn file_backed_store_survives_reopen(transfer: DiagramDocument) {
    let tmp = TempDir::new("store-reopen");
    let path = tmp.path().join("data").join("protocols.json");

    {
        let mut store = ProtocolStore::open(&path).unwrap().with_durability(WriteDurability::Durable);
        assert!(store.is_empty());
        store.create(transfer.clone()).unwrap();
        store.create(transfer.clone()).unwrap();
        store.delete(2).unwrap();
    }

    let mut reopened = ProtocolStore::open(&path).unwrap();
    assert_eq!(reopened.len(), 1);
    assert_eq!(reopened.get(1).map(|r| &r.document), Some(&transfer));
    assert_eq!(reopened.create(transfer).unwrap().id, 3);

    let leftovers = std::fs::read_dir(path.parent().unwrap())
        .unwrap()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_name().to_string_lossy().starts_with(".orbifold.tmp."))
        .count();
    assert_eq!(leftovers, 0);
}

#[rstest]
fn store_file_uses_camel_case_records(transfer: DiagramDocument) {
    let tmp = TempDir::new("store-format");
    let path = tmp.path().join("protocols.json");
    let mut store = ProtocolStore::open(&path).unwrap();
    store.create(transfer).unwrap();

    let raw = std::fs::read_to_string(&path).unwrap();
    let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(json["nextId"], 2);
    let record = &json["protocols"][0];
    assert_eq!(record["id"], 1);
    assert_eq!(record["name"], "Private Transfer");
    assert!(record["createdAt"].is_string());
    assert!(record["updatedAt"].is_string());
    assert_eq!(record["connections"][0]["sourceBlockId"], "input");
}

#[test]
fn malformed_store_file_is_a_json_error() {
    let tmp = TempDir::new("store-malformed");
    let path = tmp.path().join("protocols.json");
    std::fs::write(&path, "{ not json").unwrap();

    let err = ProtocolStore::open(&path).unwrap_err();
    assert!(matches!(err, StoreError::Json { .. }));
}

#[cfg(unix)]
#[rstest]
fn failed_write_leaves_records_untouched(transfer: DiagramDocument) {
    let tmp = TempDir::new("store-symlink");
    let target = tmp.path().join("real.json");
    std::fs::write(&target, "{\"nextId\":1,\"protocols\":[]}").unwrap();
    let link = tmp.path().join("protocols.json");
    std::os::unix::fs::symlink(&target, &link).unwrap();

    let mut store = ProtocolStore::open(&link).unwrap();
    let err = store.create(transfer).unwrap_err();

    assert!(matches!(err, StoreError::SymlinkRefused { .. }));
    assert!(store.is_empty());
}
