// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Orbifold-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Orbifold and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};

use orbifold::editor::{Editor, InteractionEvent};
use orbifold::layout::{Anchor, Point};
use orbifold::model::{BlockId, PaletteEntry};

// Benchmark identity (keep stable):
// - Group name in this file: `editor.scenario`.
// - Case IDs after the `/` must stay stable across refactors.

/// Drops `count` palette blocks in a row and chains them right-to-left anchor pairs.
fn chained_editor(count: usize) -> (Editor, Vec<BlockId>) {
    let mut editor = Editor::default();
    let ids = (0..count)
        .map(|idx| {
            let entry = PaletteEntry::ALL[idx % PaletteEntry::ALL.len()];
            editor.add_palette_block(entry, Point::new(idx as f64 * 200.0, 100.0))
        })
        .collect::<Vec<_>>();
    for pair in ids.windows(2) {
        editor
            .add_connection(&pair[0], Anchor::Right, &pair[1], Anchor::Left)
            .expect("connect");
    }
    (editor, ids)
}

fn benches_editor(c: &mut Criterion) {
    let mut group = c.benchmark_group("editor.scenario");

    group.bench_function("build_chain_20", |b| {
        b.iter(|| {
            let (editor, _) = chained_editor(black_box(20));
            black_box(editor.diagram().connections().len())
        })
    });

    let (template, ids) = chained_editor(20);
    group.bench_function("drag_block_60_moves", |b| {
        b.iter_batched(
            || template.clone(),
            |mut editor| {
                let start = Point::new(2060.0, 125.0);
                editor.handle(InteractionEvent::PointerDownOnBlock {
                    block_id: ids[10].clone(),
                    pointer: start,
                });
                for step in 1..=60 {
                    let pointer = start.offset(f64::from(step) * 2.0, f64::from(step));
                    editor.handle(InteractionEvent::PointerMove { pointer });
                }
                editor.handle(InteractionEvent::PointerUp { pointer: start.offset(120.0, 60.0) });
                black_box(editor.connection_paths().len())
            },
            BatchSize::SmallInput,
        )
    });

    group.bench_function("remove_middle_then_undo", |b| {
        b.iter_batched(
            || template.clone(),
            |mut editor| {
                editor.handle(InteractionEvent::RemoveBlock { block_id: ids[10].clone() });
                editor.handle(InteractionEvent::Undo);
                black_box(editor.diagram().connections().len())
            },
            BatchSize::SmallInput,
        )
    });

    group.bench_function("connection_paths_20", |b| {
        b.iter(|| black_box(template.connection_paths()))
    });

    group.finish();
}

criterion_group!(benches, benches_editor);
criterion_main!(benches);
