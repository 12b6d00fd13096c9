// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Orbifold-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Orbifold and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Footer and side-panel text.

use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};

use super::theme::TuiTheme;
use crate::editor::{Editor, InteractionState};
use crate::model::{Block, ObjectRef};

const NORMAL_KEYS: [(&str, &str); 10] = [
    ("Drop", "Enter"),
    ("Delete", "d"),
    ("Undo", "u"),
    ("Redo", "^r"),
    ("Export", "e"),
    ("Verify", "v"),
    ("Save", "s"),
    ("Rename", "r"),
    ("Curve", "c"),
    ("Quit", "q"),
];

fn push_entry(spans: &mut Vec<Span<'static>>, theme: &TuiTheme, label: &str, key: &str) {
    if !spans.is_empty() {
        spans.push(Span::styled(" | ", theme.label_style()));
    }
    spans.push(Span::styled(format!("{label}:"), theme.label_style()));
    spans.push(Span::styled(key.to_owned(), theme.key_style().add_modifier(Modifier::BOLD)));
}

/// Key hints, prefixed by what the pointer is currently doing.
pub(crate) fn help_line(editor: &Editor, theme: &TuiTheme) -> Line<'static> {
    let mut spans = Vec::new();
    match editor.interaction() {
        InteractionState::Connecting(origin) => {
            spans.push(Span::styled(
                format!("Connecting from {} ({})", origin.block_id, origin.anchor),
                theme.key_style(),
            ));
            push_entry(&mut spans, theme, "Target", "click anchor");
            push_entry(&mut spans, theme, "Cancel", "Esc");
            return Line::from(spans);
        }
        InteractionState::Dragging(drag) => {
            spans.push(Span::styled(format!("Moving {}", drag.block_id), theme.key_style()));
            return Line::from(spans);
        }
        InteractionState::Idle => {}
    }
    for (label, key) in NORMAL_KEYS {
        push_entry(&mut spans, theme, label, key);
    }
    Line::from(spans)
}

pub(crate) fn prompt_line(prefix: &str, buffer: &str, theme: &TuiTheme) -> Line<'static> {
    Line::from(vec![
        Span::styled(prefix.to_owned(), theme.key_style().add_modifier(Modifier::BOLD)),
        Span::raw(buffer.to_owned()),
    ])
}

pub(crate) fn toast_line(message: &str, is_error: bool, theme: &TuiTheme) -> Line<'static> {
    let style = if is_error { theme.error_style() } else { theme.label_style() };
    Line::from(Span::styled(message.to_owned(), style))
}

/// Inspector lines for the current selection.
pub(crate) fn properties_lines(editor: &Editor, theme: &TuiTheme) -> Vec<Line<'static>> {
    match editor.selection() {
        Some(ObjectRef::Block(_)) => {
            editor.selected_block().map_or_else(Vec::new, |block| block_lines(block, theme))
        }
        Some(ObjectRef::Connection(_)) => {
            let Some(conn) = editor.selected_connection() else {
                return Vec::new();
            };
            vec![
                Line::from(Span::styled("Connection", theme.key_style())),
                Line::from(format!("from {} ({})", conn.source_block_id(), conn.source_anchor())),
                Line::from(format!("to   {} ({})", conn.target_block_id(), conn.target_anchor())),
            ]
        }
        None => vec![Line::from(Span::styled(
            "Nothing selected",
            Style::default().add_modifier(Modifier::DIM),
        ))],
    }
}

fn block_lines(block: &Block, theme: &TuiTheme) -> Vec<Line<'static>> {
    let mut lines = vec![
        Line::from(Span::styled(
            block.display_name().to_owned(),
            theme.block_style(block.kind()).add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(block.kind().category().to_owned(), theme.label_style())),
    ];
    for (key, value) in block.effective_properties() {
        lines.push(Line::from(vec![
            Span::styled(format!("{}: ", key.label()), theme.label_style()),
            Span::raw(value.to_string()),
        ]));
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::{help_line, properties_lines};
    use crate::editor::{Editor, InteractionEvent};
    use crate::layout::{Anchor, Point};
    use crate::model::PaletteEntry;
    use crate::tui::theme::TuiTheme;

    fn text(line: &ratatui::text::Line<'_>) -> String {
        line.spans.iter().map(|span| span.content.as_ref()).collect()
    }

    #[test]
    fn help_line_switches_to_connection_hints() {
        let theme = TuiTheme::default();
        let mut editor = Editor::default();
        assert!(text(&help_line(&editor, &theme)).contains("Undo:u"));

        let block_id = editor.add_palette_block(PaletteEntry::Groth16, Point::ORIGIN);
        editor.handle(InteractionEvent::AnchorClicked { block_id, anchor: Anchor::Right });

        let line = text(&help_line(&editor, &theme));
        assert!(line.starts_with("Connecting from block_"));
        assert!(line.contains("Cancel:Esc"));
    }

    #[test]
    fn properties_show_effective_values() {
        let theme = TuiTheme::default();
        let mut editor = Editor::default();
        let block_id = editor.add_palette_block(PaletteEntry::Groth16, Point::ORIGIN);
        editor.select_block(&block_id);

        let lines = properties_lines(&editor, &theme).iter().map(text).collect::<Vec<_>>();
        assert_eq!(lines[0], "Groth16");
        assert_eq!(lines[1], "Zero-Knowledge");
        assert!(lines.iter().any(|line| line == "curve: BLS12-381"));
    }
}
