// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Orbifold-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Orbifold and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{TimeZone, Utc};

use orbifold::editor::{Editor, InteractionEvent, InteractionState};
use orbifold::layout::{Anchor, Point};
use orbifold::model::{BlockKind, DiagramDocument, PaletteEntry};
use orbifold::store::ProtocolStore;
use orbifold::validate::LOOKS_GOOD;

struct TempDir(PathBuf);

impl TempDir {
    fn new(label: &str) -> Self {
        let path = std::env::temp_dir().join(format!("orbifold-{label}-{}", uuid::Uuid::new_v4()));
        fs::create_dir_all(&path).expect("create temp dir");
        Self(path)
    }

    fn path(&self) -> &Path {
        &self.0
    }
}

impl Drop for TempDir {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.0);
    }
}

#[test]
fn removing_a_connected_block_cascades_and_undo_brings_both_back() {
    let mut editor = Editor::default();
    let a = editor.add_palette_block(PaletteEntry::Groth16, Point::new(100.0, 100.0));
    let b = editor.add_palette_block(PaletteEntry::RangeProof, Point::new(400.0, 100.0));

    editor.handle(InteractionEvent::AnchorClicked { block_id: a.clone(), anchor: Anchor::Right });
    editor.handle(InteractionEvent::AnchorClicked { block_id: b.clone(), anchor: Anchor::Left });
    assert_eq!(editor.interaction(), &InteractionState::Idle);

    let connection = editor.diagram().connections()[0].clone();
    let path = editor.connection_path(connection.id()).expect("route");
    assert_eq!(path.first(), Some(&Point::new(220.0, 125.0)));
    assert_eq!(path.last(), Some(&Point::new(400.0, 125.0)));
    assert!(path.iter().all(|point| point.y == 125.0));

    editor.handle(InteractionEvent::RemoveBlock { block_id: a.clone() });
    assert!(!editor.diagram().contains_block(&a));
    assert!(editor.diagram().connections().is_empty());

    editor.handle(InteractionEvent::Undo);
    assert!(editor.diagram().contains_block(&a));
    assert_eq!(editor.diagram().connections(), &[connection]);

    editor.handle(InteractionEvent::Redo);
    assert!(!editor.diagram().contains_block(&a));
    assert!(editor.diagram().connections().is_empty());
    assert!(editor.diagram().contains_block(&b));
}

#[test]
fn a_protocol_goes_from_canvas_to_export_to_store_and_back() {
    let dir = TempDir::new("scenario");
    let mut editor = Editor::default();
    editor.set_name("Private Transfer");

    let input = editor.add_palette_block(PaletteEntry::Input, Point::new(0.0, 100.0));
    let proof = editor.add_palette_block(PaletteEntry::Groth16, Point::new(250.0, 100.0));
    let output = editor.add_palette_block(PaletteEntry::Output, Point::new(500.0, 100.0));
    editor.add_connection(&input, Anchor::Right, &proof, Anchor::Left).expect("input link");
    editor.add_connection(&proof, Anchor::Right, &output, Anchor::Left).expect("output link");

    let report = editor.validate().expect("report");
    assert!(!report.valid);
    assert_eq!(report.issues, ["Consider adding verification components for security"]);

    let check = editor.add_palette_block(PaletteEntry::MerkleProof, Point::new(250.0, 300.0));
    editor.add_connection(&proof, Anchor::Bottom, &check, Anchor::Top).expect("check link");
    let report = editor.validate().expect("report");
    assert!(report.valid);
    assert_eq!(report.suggestions, [LOOKS_GOOD]);

    let now = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).single().expect("timestamp");
    let export_path = editor.export_to(dir.path(), now).expect("export");
    let file_name = export_path.file_name().and_then(|name| name.to_str());
    assert_eq!(file_name, Some("private_transfer_protocol.json"));
    let raw = fs::read_to_string(&export_path).expect("read export");
    let exported: serde_json::Value = serde_json::from_str(&raw).expect("json");
    assert_eq!(exported["version"], "1.0.0");
    assert_eq!(exported["exportedAt"], "2026-03-01T12:00:00.000Z");
    assert_eq!(exported["blocks"].as_array().map(Vec::len), Some(4));
    assert_eq!(exported["connections"][0]["sourcePoint"], "right");

    let store_path = dir.path().join("protocols.json");
    let id = {
        let mut store = ProtocolStore::open(&store_path).expect("open store");
        store.create(editor.document()).expect("create").id
    };

    let reopened = ProtocolStore::open(&store_path).expect("reopen store");
    let record = reopened.get(id).expect("record");
    let mut restored = Editor::default();
    let repair = restored.load(record.document.clone());
    assert!(repair.is_clean());
    assert_eq!(restored.document(), editor.document());
    assert!(!restored.can_undo());

    let kinds = restored.diagram().blocks().iter().map(|block| block.kind()).collect::<Vec<_>>();
    assert_eq!(
        kinds,
        [BlockKind::Input, BlockKind::ZkPrimitive, BlockKind::Output, BlockKind::Verification]
    );
}

#[test]
fn documents_with_dangling_links_are_repaired_on_load() {
    let raw = r#"{
        "name": "Broken",
        "blocks": [
            { "id": "a", "type": "input", "name": "Input", "position": { "x": 0, "y": 0 } }
        ],
        "connections": [
            {
                "id": "c1",
                "sourceBlockId": "a",
                "sourcePoint": "right",
                "targetBlockId": "ghost",
                "targetPoint": "left"
            }
        ]
    }"#;
    let document: DiagramDocument = serde_json::from_str(raw).expect("document");

    let mut editor = Editor::default();
    let repair = editor.load(document);

    assert_eq!(repair.dropped_connections.len(), 1);
    assert_eq!(editor.diagram().blocks().len(), 1);
    assert!(editor.diagram().connections().is_empty());
}
