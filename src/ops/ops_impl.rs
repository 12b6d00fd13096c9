// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Orbifold-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Orbifold and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

/// Block/connection mutation helpers used by `apply_ops`.
/// Keeps `ops::mod` focused on public op types and orchestration.
fn apply_op(diagram: &mut Diagram, op: &Op, delta: &mut DeltaBuilder) -> Result<(), ApplyError> {
    match op {
        Op::AddBlock { block } => {
            let object = ObjectRef::Block(block.id().clone());
            if diagram.contains_block(block.id()) {
                return Err(ApplyError::AlreadyExists { object });
            }
            diagram.blocks_mut().push(block.clone());
            delta.record_added(object);
            Ok(())
        }
        Op::UpdateBlock { block_id, patch } => {
            let Some(existing) = diagram.block_mut(block_id) else {
                return Err(ApplyError::NotFound { object: ObjectRef::Block(block_id.clone()) });
            };

            if let Some(position) = patch.position {
                existing.set_position(position);
            }
            if let Some(display_name) = &patch.display_name {
                existing.set_display_name(display_name.clone());
            }
            existing.properties_mut().merge_from(&patch.properties);
            delta.record_updated(ObjectRef::Block(block_id.clone()));
            Ok(())
        }
        Op::RemoveBlock { block_id } => {
            let Some(index) = diagram.blocks().iter().position(|b| b.id() == block_id) else {
                return Err(ApplyError::NotFound { object: ObjectRef::Block(block_id.clone()) });
            };
            diagram.blocks_mut().remove(index);

            let cascaded = diagram
                .connections_touching(block_id)
                .map(|conn| conn.id().clone())
                .collect::<Vec<_>>();
            diagram.connections_mut().retain(|conn| !conn.touches(block_id));
            for connection_id in cascaded {
                delta.record_removed(ObjectRef::Connection(connection_id));
            }
            delta.record_removed(ObjectRef::Block(block_id.clone()));
            Ok(())
        }
        Op::AddConnection { connection } => {
            let object = ObjectRef::Connection(connection.id().clone());
            if diagram.connection(connection.id()).is_some() {
                return Err(ApplyError::AlreadyExists { object });
            }
            for block_id in [connection.source_block_id(), connection.target_block_id()] {
                if !diagram.contains_block(block_id) {
                    return Err(ApplyError::MissingBlock { block_id: block_id.clone() });
                }
            }
            if let Some(existing) = diagram
                .connections()
                .iter()
                .find(|existing| existing.same_endpoints(connection))
            {
                return Err(ApplyError::DuplicateConnection { existing: existing.id().clone() });
            }
            diagram.connections_mut().push(connection.clone());
            delta.record_added(object);
            Ok(())
        }
        Op::RemoveConnection { connection_id } => {
            let before = diagram.connections().len();
            diagram.connections_mut().retain(|conn| conn.id() != connection_id);
            if diagram.connections().len() == before {
                return Err(ApplyError::NotFound {
                    object: ObjectRef::Connection(connection_id.clone()),
                });
            }
            delta.record_removed(ObjectRef::Connection(connection_id.clone()));
            Ok(())
        }
        Op::Clear => {
            let connection_ids = diagram
                .connections()
                .iter()
                .map(|conn| conn.id().clone())
                .collect::<Vec<_>>();
            let block_ids = diagram
                .blocks()
                .iter()
                .map(|block| block.id().clone())
                .collect::<Vec<_>>();
            diagram.replace_contents(Vec::new(), Vec::new());
            for connection_id in connection_ids {
                delta.record_removed(ObjectRef::Connection(connection_id));
            }
            for block_id in block_ids {
                delta.record_removed(ObjectRef::Block(block_id));
            }
            Ok(())
        }
    }
}
