// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Orbifold-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Orbifold and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! The editing controller.
//!
//! [`Editor`] owns the diagram, its undo history and the transient interaction state. Pointer and
//! command events go through [`Editor::handle`]; direct methods cover palette drops, property
//! edits, persistence hand-off and export.

pub mod payload;

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use smol_str::SmolStr;

use crate::config::EditorConfig;
use crate::export::{self, ExportDocument, ExportError};
use crate::history::{History, Snapshot};
use crate::layout::{
    resolve_placement, route_path_with_offset, route_preview, Anchor, Point, RoutePath,
    BLOCK_HEIGHT, BLOCK_WIDTH,
};
use crate::model::{
    Block, BlockId, BlockKind, Connection, ConnectionId, Diagram, DiagramDocument,
    DocumentRepair, ObjectRef, PaletteEntry, PropertyKey, ZK_CURVE_CHOICES,
};
use crate::ops::{apply_ops, ApplyError, BlockPatch, Delta, Op};
use crate::validate::{validate, ValidationReport};

pub use payload::{parse_drop_payload, DropPayload, PayloadError, PAYLOAD_KEYS};

/// Transient pointer interaction. Exactly one state is active at a time.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum InteractionState {
    #[default]
    Idle,
    Dragging(DragState),
    Connecting(ConnectOrigin),
}

#[derive(Debug, Clone, PartialEq)]
pub struct DragState {
    pub block_id: BlockId,
    pub pointer_origin: Point,
    pub block_origin: Point,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectOrigin {
    pub block_id: BlockId,
    pub anchor: Anchor,
}

#[derive(Debug, Clone, PartialEq)]
pub enum InteractionEvent {
    PointerDownOnBlock { block_id: BlockId, pointer: Point },
    PointerMove { pointer: Point },
    PointerUp { pointer: Point },
    AnchorClicked { block_id: BlockId, anchor: Anchor },
    CanvasClicked,
    ConnectionClicked { connection_id: ConnectionId },
    RemoveBlock { block_id: BlockId },
    RemoveConnection { connection_id: ConnectionId },
    Undo,
    Redo,
}

/// What an event did, for callers that refresh derived state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EventOutcome {
    pub diagram_changed: bool,
    pub checkpointed: bool,
}

impl EventOutcome {
    const NONE: Self = Self { diagram_changed: false, checkpointed: false };

    fn changed(checkpointed: bool) -> Self {
        Self { diagram_changed: true, checkpointed }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum EditorError {
    #[error("nothing to export: add some blocks to the protocol first")]
    NothingToExport,
    #[error("nothing to verify: add some blocks to the protocol first")]
    NothingToVerify,
    #[error("block {0} has a fixed name")]
    NameNotEditable(BlockId),
    #[error("block {0} has no curve setting")]
    NoCurveSetting(BlockId),
    #[error("unsupported curve '{0}'")]
    UnsupportedCurve(SmolStr),
    #[error(transparent)]
    Rejected(#[from] ApplyError),
    #[error(transparent)]
    Payload(#[from] PayloadError),
    #[error(transparent)]
    Export(#[from] ExportError),
}

#[derive(Debug, Clone)]
pub struct Editor {
    diagram: Diagram,
    history: History,
    interaction: InteractionState,
    selection: Option<ObjectRef>,
    pointer: Option<Point>,
    config: EditorConfig,
}

impl Default for Editor {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}

impl Editor {
    pub fn new(config: EditorConfig) -> Self {
        Self::with_diagram(Diagram::default(), config)
    }

    pub fn with_diagram(diagram: Diagram, config: EditorConfig) -> Self {
        let history = History::new(config.history_capacity, Snapshot::capture(&diagram));
        Self {
            diagram,
            history,
            interaction: InteractionState::Idle,
            selection: None,
            pointer: None,
            config,
        }
    }

    pub fn diagram(&self) -> &Diagram {
        &self.diagram
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn interaction(&self) -> &InteractionState {
        &self.interaction
    }

    pub fn selection(&self) -> Option<&ObjectRef> {
        self.selection.as_ref()
    }

    /// The selected block, read from the live diagram.
    pub fn selected_block(&self) -> Option<&Block> {
        self.selection.as_ref()?.as_block().and_then(|id| self.diagram.block(id))
    }

    pub fn selected_connection(&self) -> Option<&Connection> {
        self.selection.as_ref()?.as_connection().and_then(|id| self.diagram.connection(id))
    }

    pub fn pointer(&self) -> Option<Point> {
        self.pointer
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.diagram.set_name(name);
    }

    pub fn set_description(&mut self, description: Option<String>) {
        self.diagram.set_description(description);
    }

    pub fn handle(&mut self, event: InteractionEvent) -> EventOutcome {
        match event {
            InteractionEvent::PointerDownOnBlock { block_id, pointer } => {
                self.pointer = Some(pointer);
                self.begin_drag(block_id, pointer);
                EventOutcome::NONE
            }
            InteractionEvent::PointerMove { pointer } => {
                self.pointer = Some(pointer);
                self.drag_to(pointer)
            }
            InteractionEvent::PointerUp { pointer } => {
                self.pointer = Some(pointer);
                self.end_drag(pointer)
            }
            InteractionEvent::AnchorClicked { block_id, anchor } => {
                self.anchor_clicked(block_id, anchor)
            }
            InteractionEvent::CanvasClicked => {
                match self.interaction {
                    InteractionState::Connecting(_) => {
                        tracing::debug!("connection cancelled");
                        self.interaction = InteractionState::Idle;
                    }
                    InteractionState::Idle => self.selection = None,
                    InteractionState::Dragging(_) => {}
                }
                EventOutcome::NONE
            }
            InteractionEvent::ConnectionClicked { connection_id } => {
                if self.interaction == InteractionState::Idle {
                    self.select_connection(&connection_id);
                }
                EventOutcome::NONE
            }
            InteractionEvent::RemoveBlock { block_id } => {
                let removed = self.remove_block(&block_id);
                EventOutcome { diagram_changed: removed, checkpointed: removed }
            }
            InteractionEvent::RemoveConnection { connection_id } => {
                let removed = self.remove_connection(&connection_id);
                EventOutcome { diagram_changed: removed, checkpointed: removed }
            }
            InteractionEvent::Undo => EventOutcome {
                diagram_changed: self.undo(),
                checkpointed: false,
            },
            InteractionEvent::Redo => EventOutcome {
                diagram_changed: self.redo(),
                checkpointed: false,
            },
        }
    }

    fn begin_drag(&mut self, block_id: BlockId, pointer: Point) {
        if self.interaction != InteractionState::Idle {
            return;
        }
        let Some(block) = self.diagram.block(&block_id) else {
            tracing::debug!(%block_id, "pointer down on unknown block ignored");
            return;
        };
        self.interaction = InteractionState::Dragging(DragState {
            block_origin: block.position(),
            block_id,
            pointer_origin: pointer,
        });
    }

    fn drag_to(&mut self, pointer: Point) -> EventOutcome {
        let InteractionState::Dragging(drag) = &self.interaction else {
            return EventOutcome::NONE;
        };
        let position = Point::new(
            drag.block_origin.x + (pointer.x - drag.pointer_origin.x),
            drag.block_origin.y + (pointer.y - drag.pointer_origin.y),
        )
        .clamp_non_negative();
        let block_id = drag.block_id.clone();

        if self.move_block(&block_id, position) {
            EventOutcome::changed(false)
        } else {
            self.interaction = InteractionState::Idle;
            EventOutcome::NONE
        }
    }

    fn end_drag(&mut self, pointer: Point) -> EventOutcome {
        // A pending connection outlives pointer releases.
        if !matches!(self.interaction, InteractionState::Dragging(_)) {
            return EventOutcome::NONE;
        }
        let InteractionState::Dragging(drag) = std::mem::take(&mut self.interaction) else {
            return EventOutcome::NONE;
        };

        if drag.pointer_origin.distance_to(pointer) < self.config.drag_click_threshold {
            let moved = self
                .diagram
                .block(&drag.block_id)
                .is_some_and(|block| block.position() != drag.block_origin);
            if moved {
                self.move_block(&drag.block_id, drag.block_origin);
            }
            self.selection = Some(ObjectRef::Block(drag.block_id));
            return EventOutcome { diagram_changed: moved, checkpointed: false };
        }

        let position = Point::new(
            drag.block_origin.x + (pointer.x - drag.pointer_origin.x),
            drag.block_origin.y + (pointer.y - drag.pointer_origin.y),
        )
        .clamp_non_negative();
        if !self.move_block(&drag.block_id, position) {
            return EventOutcome::NONE;
        }
        let checkpointed = self.checkpoint();
        tracing::debug!(block_id = %drag.block_id, x = position.x, y = position.y, "block moved");
        EventOutcome::changed(checkpointed)
    }

    fn anchor_clicked(&mut self, block_id: BlockId, anchor: Anchor) -> EventOutcome {
        match std::mem::take(&mut self.interaction) {
            InteractionState::Idle => {
                if self.diagram.contains_block(&block_id) {
                    self.interaction =
                        InteractionState::Connecting(ConnectOrigin { block_id, anchor });
                } else {
                    tracing::debug!(%block_id, "anchor click on unknown block ignored");
                }
                EventOutcome::NONE
            }
            InteractionState::Connecting(origin) => {
                match self.add_connection(&origin.block_id, origin.anchor, &block_id, anchor) {
                    Ok(_) => EventOutcome::changed(true),
                    Err(err) => {
                        tracing::debug!(%err, "connection rejected");
                        EventOutcome::NONE
                    }
                }
            }
            dragging @ InteractionState::Dragging(_) => {
                self.interaction = dragging;
                EventOutcome::NONE
            }
        }
    }

    fn move_block(&mut self, block_id: &BlockId, position: Point) -> bool {
        let patch = BlockPatch::position(position);
        let ops = [Op::UpdateBlock { block_id: block_id.clone(), patch }];
        apply_ops(&mut self.diagram, &ops).is_ok()
    }

    fn checkpoint(&mut self) -> bool {
        self.history.checkpoint(Snapshot::capture(&self.diagram))
    }

    /// Applies ops, then drops interaction and selection state that points at removed objects.
    fn apply(&mut self, ops: &[Op]) -> Result<Delta, ApplyError> {
        let result = apply_ops(&mut self.diagram, ops)?;
        self.forget_removed(&result.delta);
        Ok(result.delta)
    }

    fn forget_removed(&mut self, delta: &Delta) {
        if self.selection.as_ref().is_some_and(|selected| delta.removes(selected)) {
            self.selection = None;
        }
        let interaction_block = match &self.interaction {
            InteractionState::Idle => None,
            InteractionState::Dragging(drag) => Some(&drag.block_id),
            InteractionState::Connecting(origin) => Some(&origin.block_id),
        };
        if interaction_block.is_some_and(|id| delta.removes(&ObjectRef::Block(id.clone()))) {
            self.interaction = InteractionState::Idle;
        }
    }

    /// Adds a block with a fresh id at exactly `position` and records a checkpoint.
    pub fn add_block(
        &mut self,
        kind: BlockKind,
        display_name: impl Into<SmolStr>,
        position: Point,
    ) -> BlockId {
        let block_id = BlockId::generate();
        let block = Block::new(block_id.clone(), kind, display_name, position);
        let ops = [Op::AddBlock { block }];
        match self.apply(&ops) {
            Ok(_) => {
                self.checkpoint();
                tracing::debug!(%block_id, %kind, "block added");
            }
            // Fresh ids never collide with existing blocks.
            Err(err) => tracing::warn!(%err, "block add failed"),
        }
        block_id
    }

    /// Adds a palette block as close to `requested` as free space allows.
    pub fn add_palette_block(&mut self, entry: PaletteEntry, requested: Point) -> BlockId {
        let position = self.resolve_position(requested);
        self.add_block(entry.kind(), entry.name(), position)
    }

    /// Drops a payload so the block is centred on `pointer`, then resolves collisions.
    pub fn drop_payload(&mut self, payload: &DropPayload, pointer: Point) -> BlockId {
        let requested =
            pointer.offset(-BLOCK_WIDTH / 2.0, -BLOCK_HEIGHT / 2.0).clamp_non_negative();
        let position = self.resolve_position(requested);
        self.add_block(payload.kind, payload.display_name.clone(), position)
    }

    /// Parses raw drag-transfer entries and drops the payload; malformed payloads are ignored.
    pub fn drop_transfer<'a, I>(
        &mut self,
        entries: I,
        pointer: Point,
    ) -> Result<BlockId, EditorError>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let payload = parse_drop_payload(entries).inspect_err(|err| {
            tracing::debug!(%err, "drop payload ignored");
        })?;
        Ok(self.drop_payload(&payload, pointer))
    }

    fn resolve_position(&self, requested: Point) -> Point {
        resolve_placement(requested, self.diagram.blocks(), &self.config.placement_options())
    }

    /// Merges `patch` into the block and records a checkpoint.
    pub fn update_block(
        &mut self,
        block_id: &BlockId,
        patch: BlockPatch,
    ) -> Result<(), EditorError> {
        let ops = [Op::UpdateBlock { block_id: block_id.clone(), patch }];
        self.apply(&ops).inspect_err(|err| tracing::debug!(%err, "block update ignored"))?;
        self.checkpoint();
        Ok(())
    }

    /// Renames an input or output block.
    pub fn rename_block(
        &mut self,
        block_id: &BlockId,
        display_name: impl Into<SmolStr>,
    ) -> Result<(), EditorError> {
        let kind = self.block_kind(block_id)?;
        if !kind.name_is_editable() {
            return Err(EditorError::NameNotEditable(block_id.clone()));
        }
        self.update_block(block_id, BlockPatch::display_name(display_name))
    }

    /// Overrides one property. Curves on zero-knowledge blocks must be a supported curve.
    pub fn set_block_property(
        &mut self,
        block_id: &BlockId,
        key: PropertyKey,
        value: impl Into<SmolStr>,
    ) -> Result<(), EditorError> {
        let value = value.into();
        let kind = self.block_kind(block_id)?;
        if kind == BlockKind::ZkPrimitive
            && key == PropertyKey::Curve
            && !ZK_CURVE_CHOICES.contains(&value.as_str())
        {
            return Err(EditorError::UnsupportedCurve(value));
        }
        let mut patch = BlockPatch::default();
        patch.properties.set(key, value);
        self.update_block(block_id, patch)
    }

    /// Advances a zero-knowledge block to the next supported curve and returns it.
    pub fn cycle_curve(&mut self, block_id: &BlockId) -> Result<SmolStr, EditorError> {
        let block = self
            .diagram
            .block(block_id)
            .ok_or_else(|| ApplyError::NotFound { object: ObjectRef::Block(block_id.clone()) })?;
        if block.kind() != BlockKind::ZkPrimitive {
            return Err(EditorError::NoCurveSetting(block_id.clone()));
        }
        let current = block.property(&PropertyKey::Curve).unwrap_or(ZK_CURVE_CHOICES[0]);
        let next = ZK_CURVE_CHOICES
            .iter()
            .position(|curve| *curve == current)
            .map_or(0, |idx| (idx + 1) % ZK_CURVE_CHOICES.len());
        let next = SmolStr::new_static(ZK_CURVE_CHOICES[next]);
        self.set_block_property(block_id, PropertyKey::Curve, next.clone())?;
        Ok(next)
    }

    fn block_kind(&self, block_id: &BlockId) -> Result<BlockKind, EditorError> {
        self.diagram.block(block_id).map(Block::kind).ok_or_else(|| {
            let object = ObjectRef::Block(block_id.clone());
            EditorError::Rejected(ApplyError::NotFound { object })
        })
    }

    /// Removes a block and its connections. Unknown ids are a no-op.
    pub fn remove_block(&mut self, block_id: &BlockId) -> bool {
        let ops = [Op::RemoveBlock { block_id: block_id.clone() }];
        match self.apply(&ops) {
            Ok(delta) => {
                self.checkpoint();
                tracing::debug!(%block_id, removed = delta.removed.len(), "block removed");
                true
            }
            Err(err) => {
                tracing::debug!(%err, "block removal ignored");
                false
            }
        }
    }

    /// Removes a connection. Unknown ids are a no-op.
    pub fn remove_connection(&mut self, connection_id: &ConnectionId) -> bool {
        let ops = [Op::RemoveConnection { connection_id: connection_id.clone() }];
        match self.apply(&ops) {
            Ok(_) => {
                self.checkpoint();
                true
            }
            Err(err) => {
                tracing::debug!(%err, "connection removal ignored");
                false
            }
        }
    }

    /// Connects two block anchors. Rejected when a block is missing or the exact link exists.
    pub fn add_connection(
        &mut self,
        source: &BlockId,
        source_anchor: Anchor,
        target: &BlockId,
        target_anchor: Anchor,
    ) -> Result<ConnectionId, EditorError> {
        let connection_id = ConnectionId::generate();
        let connection = Connection::new(
            connection_id.clone(),
            source.clone(),
            source_anchor,
            target.clone(),
            target_anchor,
        );
        self.apply(&[Op::AddConnection { connection }])?;
        self.checkpoint();
        tracing::debug!(%connection_id, %source, %target, "connection added");
        Ok(connection_id)
    }

    pub fn select_block(&mut self, block_id: &BlockId) -> bool {
        if !self.diagram.contains_block(block_id) {
            return false;
        }
        self.selection = Some(ObjectRef::Block(block_id.clone()));
        true
    }

    pub fn select_connection(&mut self, connection_id: &ConnectionId) -> bool {
        if self.diagram.connection(connection_id).is_none() {
            return false;
        }
        self.selection = Some(ObjectRef::Connection(connection_id.clone()));
        true
    }

    pub fn clear_selection(&mut self) {
        self.selection = None;
    }

    /// Removes whatever is selected.
    pub fn remove_selection(&mut self) -> bool {
        match self.selection.clone() {
            Some(ObjectRef::Block(block_id)) => self.remove_block(&block_id),
            Some(ObjectRef::Connection(connection_id)) => self.remove_connection(&connection_id),
            None => false,
        }
    }

    pub fn undo(&mut self) -> bool {
        let Some(snapshot) = self.history.undo() else {
            return false;
        };
        snapshot.restore_into(&mut self.diagram);
        self.after_restore();
        true
    }

    pub fn redo(&mut self) -> bool {
        let Some(snapshot) = self.history.redo() else {
            return false;
        };
        snapshot.restore_into(&mut self.diagram);
        self.after_restore();
        true
    }

    fn after_restore(&mut self) {
        self.selection = None;
        self.interaction = InteractionState::Idle;
    }

    /// Removes every block and connection as one undoable step.
    pub fn clear(&mut self) {
        if let Err(err) = self.apply(&[Op::Clear]) {
            tracing::warn!(%err, "clear failed");
            return;
        }
        self.selection = None;
        self.interaction = InteractionState::Idle;
        self.checkpoint();
    }

    /// Live route from the connection origin to the pointer while connecting.
    pub fn preview_path(&self) -> Option<RoutePath> {
        let InteractionState::Connecting(origin) = &self.interaction else {
            return None;
        };
        let pointer = self.pointer?;
        let block = self.diagram.block(&origin.block_id)?;
        Some(route_preview(
            block.anchor_point(origin.anchor),
            origin.anchor,
            pointer,
            self.config.route_offset,
        ))
    }

    pub fn connection_path(&self, connection_id: &ConnectionId) -> Option<RoutePath> {
        let connection = self.diagram.connection(connection_id)?;
        self.route(connection)
    }

    /// Every connection with its route, in diagram order.
    pub fn connection_paths(&self) -> Vec<(ConnectionId, RoutePath)> {
        self.diagram
            .connections()
            .iter()
            .filter_map(|conn| Some((conn.id().clone(), self.route(conn)?)))
            .collect()
    }

    fn route(&self, connection: &Connection) -> Option<RoutePath> {
        let source = self.diagram.block(connection.source_block_id())?;
        let target = self.diagram.block(connection.target_block_id())?;
        Some(route_path_with_offset(
            source.anchor_point(connection.source_anchor()),
            connection.source_anchor(),
            target.anchor_point(connection.target_anchor()),
            connection.target_anchor(),
            self.config.route_offset,
        ))
    }

    /// Replaces the diagram with `document` and starts a fresh history.
    pub fn load(&mut self, document: DiagramDocument) -> DocumentRepair {
        let (diagram, repair) = Diagram::from_document(document);
        if !repair.is_clean() {
            tracing::warn!(
                duplicate_blocks = repair.duplicate_blocks.len(),
                dropped_connections = repair.dropped_connections.len(),
                "document repaired on load"
            );
        }
        self.diagram = diagram;
        self.history.reset(Snapshot::capture(&self.diagram));
        self.selection = None;
        self.interaction = InteractionState::Idle;
        repair
    }

    pub fn document(&self) -> DiagramDocument {
        self.diagram.to_document()
    }

    pub fn validate(&self) -> Result<ValidationReport, EditorError> {
        if self.diagram.is_empty() {
            return Err(EditorError::NothingToVerify);
        }
        Ok(validate(self.diagram.blocks(), self.diagram.connections()))
    }

    pub fn export_document(&self, now: DateTime<Utc>) -> Result<ExportDocument, EditorError> {
        if self.diagram.is_empty() {
            return Err(EditorError::NothingToExport);
        }
        Ok(export::export_document(&self.diagram, now))
    }

    pub fn export_to(&self, dir: &Path, now: DateTime<Utc>) -> Result<PathBuf, EditorError> {
        if self.diagram.is_empty() {
            return Err(EditorError::NothingToExport);
        }
        Ok(export::write_export(&self.diagram, dir, now)?)
    }
}
