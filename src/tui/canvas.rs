// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Orbifold-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Orbifold and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Maps layout units to terminal cells and draws the diagram into a buffer.
//!
//! One column spans 8 layout units and one row spans 10, so a 120x50 block occupies a 15x5 cell
//! box. Anchors are drawn one cell outside the box edge they belong to.

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Style;

use super::theme::TuiTheme;
use crate::editor::{Editor, InteractionState};
use crate::layout::{distance_to_path, Anchor, Point, BLOCK_HEIGHT, BLOCK_WIDTH};
use crate::model::{Block, BlockId, ConnectionId, ObjectRef, PropertyKey};

pub(crate) const UNITS_PER_COL: f64 = 8.0;
pub(crate) const UNITS_PER_ROW: f64 = 10.0;

/// Pointer distance, in layout units, that still counts as a click on a connection.
const CONNECTION_HIT_UNITS: f64 = 8.0;

const BLOCK_COLS: i32 = (BLOCK_WIDTH / UNITS_PER_COL) as i32;
const BLOCK_ROWS: i32 = (BLOCK_HEIGHT / UNITS_PER_ROW) as i32;

/// Grid cell relative to the canvas origin. May lie outside the visible area.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct GridCell {
    pub(crate) col: i32,
    pub(crate) row: i32,
}

impl GridCell {
    pub(crate) const fn new(col: i32, row: i32) -> Self {
        Self { col, row }
    }

    fn shifted(self, dcol: i32, drow: i32) -> Self {
        Self::new(self.col + dcol, self.row + drow)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Hit {
    Anchor(BlockId, Anchor),
    Block(BlockId),
    Connection(ConnectionId),
    Canvas,
}

/// The visible window onto layout space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct CanvasView {
    /// Inner terminal area the canvas draws into.
    pub(crate) area: Rect,
    /// Layout point shown in the top-left cell.
    pub(crate) scroll: Point,
}

impl Default for CanvasView {
    fn default() -> Self {
        Self { area: Rect::default(), scroll: Point::ORIGIN }
    }
}

impl CanvasView {
    pub(crate) fn new(area: Rect) -> Self {
        Self { area, scroll: Point::ORIGIN }
    }

    pub(crate) fn grid_of(&self, point: Point) -> GridCell {
        GridCell::new(
            ((point.x - self.scroll.x) / UNITS_PER_COL).floor() as i32,
            ((point.y - self.scroll.y) / UNITS_PER_ROW).floor() as i32,
        )
    }

    /// Layout point at the centre of a grid cell.
    pub(crate) fn point_of(&self, cell: GridCell) -> Point {
        Point::new(
            self.scroll.x + (f64::from(cell.col) + 0.5) * UNITS_PER_COL,
            self.scroll.y + (f64::from(cell.row) + 0.5) * UNITS_PER_ROW,
        )
    }

    /// Grid cell under an absolute terminal position, if it is inside the canvas.
    pub(crate) fn cell_at(&self, column: u16, row: u16) -> Option<GridCell> {
        let inside = column >= self.area.x
            && column < self.area.right()
            && row >= self.area.y
            && row < self.area.bottom();
        inside.then(|| {
            GridCell::new(i32::from(column - self.area.x), i32::from(row - self.area.y))
        })
    }

    fn screen_of(&self, cell: GridCell) -> Option<(u16, u16)> {
        let col = u16::try_from(cell.col).ok()?;
        let row = u16::try_from(cell.row).ok()?;
        (col < self.area.width && row < self.area.height)
            .then(|| (self.area.x + col, self.area.y + row))
    }

    /// Layout point at the middle of the visible area.
    pub(crate) fn center_point(&self) -> Point {
        Point::new(
            self.scroll.x + f64::from(self.area.width) * UNITS_PER_COL / 2.0,
            self.scroll.y + f64::from(self.area.height) * UNITS_PER_ROW / 2.0,
        )
    }

    pub(crate) fn scroll_by(&mut self, dcols: i32, drows: i32) {
        self.scroll = Point::new(
            self.scroll.x + f64::from(dcols) * UNITS_PER_COL,
            self.scroll.y + f64::from(drows) * UNITS_PER_ROW,
        )
        .clamp_non_negative();
    }

    pub(crate) fn block_origin(&self, block: &Block) -> GridCell {
        self.grid_of(block.position())
    }

    pub(crate) fn anchor_cell(&self, block: &Block, anchor: Anchor) -> GridCell {
        let origin = self.block_origin(block);
        match anchor {
            Anchor::Left => origin.shifted(-1, BLOCK_ROWS / 2),
            Anchor::Right => origin.shifted(BLOCK_COLS, BLOCK_ROWS / 2),
            Anchor::Top => origin.shifted(BLOCK_COLS / 2, -1),
            Anchor::Bottom => origin.shifted(BLOCK_COLS / 2, BLOCK_ROWS),
        }
    }

    fn block_contains(&self, block: &Block, cell: GridCell) -> bool {
        let origin = self.block_origin(block);
        (origin.col..origin.col + BLOCK_COLS).contains(&cell.col)
            && (origin.row..origin.row + BLOCK_ROWS).contains(&cell.row)
    }

    /// What lies under `cell`. Later blocks are drawn on top, so they win.
    pub(crate) fn hit_test(&self, editor: &Editor, cell: GridCell) -> Hit {
        let blocks = editor.diagram().blocks();
        for block in blocks.iter().rev() {
            if let Some(anchor) =
                Anchor::ALL.into_iter().find(|anchor| self.anchor_cell(block, *anchor) == cell)
            {
                return Hit::Anchor(block.id().clone(), anchor);
            }
        }
        if let Some(block) = blocks.iter().rev().find(|block| self.block_contains(block, cell)) {
            return Hit::Block(block.id().clone());
        }

        let pointer = self.point_of(cell);
        editor
            .connection_paths()
            .into_iter()
            .filter_map(|(id, path)| Some((id, distance_to_path(&path, pointer)?)))
            .filter(|(_, distance)| *distance <= CONNECTION_HIT_UNITS)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map_or(Hit::Canvas, |(id, _)| Hit::Connection(id))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Heading {
    Left,
    Right,
    Up,
    Down,
}

impl Heading {
    fn between(from: GridCell, to: GridCell) -> Option<Self> {
        match (to.col.cmp(&from.col), to.row.cmp(&from.row)) {
            (std::cmp::Ordering::Greater, _) => Some(Self::Right),
            (std::cmp::Ordering::Less, _) => Some(Self::Left),
            (_, std::cmp::Ordering::Greater) => Some(Self::Down),
            (_, std::cmp::Ordering::Less) => Some(Self::Up),
            _ => None,
        }
    }

    fn arrow(self) -> char {
        match self {
            Self::Left => '◀',
            Self::Right => '▶',
            Self::Up => '▲',
            Self::Down => '▼',
        }
    }
}

fn corner(incoming: Heading, outgoing: Heading) -> char {
    use Heading::{Down, Left, Right, Up};
    match (incoming, outgoing) {
        (Right, Down) | (Up, Left) => '┐',
        (Right, Up) | (Down, Left) => '┘',
        (Left, Down) | (Up, Right) => '┌',
        (Left, Up) | (Down, Right) => '└',
        (Left | Right, _) => '─',
        (Up | Down, _) => '│',
    }
}

fn put(buf: &mut Buffer, view: &CanvasView, cell: GridCell, ch: char, style: Style) {
    if let Some(pos) = view.screen_of(cell) {
        if let Some(target) = buf.cell_mut(pos) {
            target.set_char(ch).set_style(style);
        }
    }
}

fn put_str(
    buf: &mut Buffer,
    view: &CanvasView,
    cell: GridCell,
    text: &str,
    width: usize,
    style: Style,
) {
    for (idx, ch) in text.chars().take(width).enumerate() {
        put(buf, view, cell.shifted(idx as i32, 0), ch, style);
    }
}

/// Draws an orthogonal polyline with box-drawing glyphs and an arrow at its end.
fn draw_path(buf: &mut Buffer, view: &CanvasView, path: &[Point], style: Style) {
    let mut cells = Vec::<GridCell>::with_capacity(path.len());
    for point in path {
        let cell = view.grid_of(*point);
        if cells.last() != Some(&cell) {
            cells.push(cell);
        }
    }

    for pair in cells.windows(2) {
        let (from, to) = (pair[0], pair[1]);
        // Rounding can skew an axis-aligned segment; run horizontal first, then vertical.
        let (c0, c1) = (from.col.min(to.col), from.col.max(to.col));
        for col in c0..=c1 {
            put(buf, view, GridCell::new(col, from.row), '─', style);
        }
        let (r0, r1) = (from.row.min(to.row), from.row.max(to.row));
        for row in r0..=r1 {
            put(buf, view, GridCell::new(to.col, row), '│', style);
        }
    }

    for triple in cells.windows(3) {
        let incoming = Heading::between(triple[0], triple[1]);
        let outgoing = Heading::between(triple[1], triple[2]);
        if let (Some(incoming), Some(outgoing)) = (incoming, outgoing) {
            put(buf, view, triple[1], corner(incoming, outgoing), style);
        }
    }

    if let [.., before, last] = cells.as_slice() {
        if let Some(heading) = Heading::between(*before, *last) {
            put(buf, view, *last, heading.arrow(), style);
        }
    }
}

fn draw_block(buf: &mut Buffer, view: &CanvasView, block: &Block, style: Style) {
    let origin = view.block_origin(block);
    let inner = (BLOCK_COLS - 2) as usize;

    for row in 0..BLOCK_ROWS {
        for col in 0..BLOCK_COLS {
            let first_row = row == 0;
            let last_row = row == BLOCK_ROWS - 1;
            let first_col = col == 0;
            let last_col = col == BLOCK_COLS - 1;
            let ch = match (first_row, last_row, first_col, last_col) {
                (true, _, true, _) => '┌',
                (true, _, _, true) => '┐',
                (_, true, true, _) => '└',
                (_, true, _, true) => '┘',
                (true, _, _, _) | (_, true, _, _) => '─',
                (_, _, true, _) | (_, _, _, true) => '│',
                _ => ' ',
            };
            put(buf, view, origin.shifted(col, row), ch, style);
        }
    }

    put_str(buf, view, origin.shifted(1, 1), block.display_name(), inner, style);
    let detail = block
        .property(&PropertyKey::Curve)
        .map(str::to_owned)
        .unwrap_or_else(|| block.kind().category().to_owned());
    put_str(buf, view, origin.shifted(1, 2), &detail, inner, style);
}

/// Renders connections, the connection preview, blocks and anchors, in that order.
pub(crate) fn render_canvas(
    buf: &mut Buffer,
    view: &CanvasView,
    editor: &Editor,
    theme: &TuiTheme,
) {
    let selection = editor.selection();

    for (connection_id, path) in editor.connection_paths() {
        let selected = selection == Some(&ObjectRef::Connection(connection_id));
        let style = if selected { theme.selection_style() } else { theme.connection_style() };
        draw_path(buf, view, &path, style);
    }
    if let Some(preview) = editor.preview_path() {
        draw_path(buf, view, &preview, theme.preview_style());
    }

    let connecting = match editor.interaction() {
        InteractionState::Connecting(origin) => Some((&origin.block_id, origin.anchor)),
        _ => None,
    };
    for block in editor.diagram().blocks() {
        let selected = selection == Some(&ObjectRef::Block(block.id().clone()));
        let style = if selected {
            theme.block_style(block.kind()).patch(theme.selection_style())
        } else {
            theme.block_style(block.kind())
        };
        draw_block(buf, view, block, style);

        for anchor in Anchor::ALL {
            let active = connecting == Some((block.id(), anchor));
            let glyph = if active { '●' } else { '○' };
            put(buf, view, view.anchor_cell(block, anchor), glyph, theme.anchor_style(active));
        }
    }
}
