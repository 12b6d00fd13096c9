// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Orbifold-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Orbifold and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Terminal editor.
//!
//! A palette on the left, the canvas on the right and a one-line footer. Mouse input is turned
//! into [`InteractionEvent`]s for the [`Editor`]; keys cover palette drops, history, export,
//! validation, saving and publishing to the protocol store.

use std::{
    error::Error,
    io,
    path::PathBuf,
    time::{Duration, Instant},
};

use chrono::Utc;
use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
        KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
};

use crate::editor::{DropPayload, Editor, EditorError, InteractionEvent};
use crate::layout::{Point, BLOCK_HEIGHT, BLOCK_WIDTH};
use crate::model::{search_palette, BlockId, ObjectRef, PaletteEntry};
use crate::server::SharedStore;
use crate::store::{write_atomic, ProtocolPatch, StoreError, WriteDurability};

mod canvas;
mod chrome;
mod theme;

use canvas::{render_canvas, CanvasView, GridCell, Hit};
use theme::TuiTheme;

const PALETTE_WIDTH: u16 = 30;
const TOAST_TTL: Duration = Duration::from_secs(3);
const DEFAULT_SAVE_FILE: &str = "protocol.json";

/// Where the terminal editor reads and writes outside the canvas.
#[derive(Debug, Clone, Default)]
pub struct TuiOptions {
    /// Document file for `s`. Defaults to `protocol.json` in the working directory.
    pub file: Option<PathBuf>,
    /// Directory `e` writes exports into.
    pub export_dir: PathBuf,
    /// Store that `p` publishes to, when the HTTP API runs alongside the editor.
    pub store: Option<SharedStore>,
}

/// Runs the interactive terminal editor until the user quits.
pub fn run(editor: Editor, options: TuiOptions) -> Result<(), Box<dyn Error>> {
    let theme = TuiTheme::from_env()?;
    let mut terminal = TerminalSession::new()?;
    let mut app = App::new(editor, options, theme);

    while !app.should_quit {
        terminal.draw(|frame| draw(frame, &mut app))?;

        if event::poll(Duration::from_millis(250))? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => app.handle_key(key),
                Event::Mouse(mouse) => app.handle_mouse(mouse),
                _ => {}
            }
        }
    }

    tracing::info!("terminal editor closed");
    Ok(())
}

#[derive(Debug, Clone)]
struct Toast {
    message: String,
    is_error: bool,
    expires_at: Instant,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Mode {
    Normal,
    Filter,
    Rename { block_id: BlockId, buffer: String },
}

struct App {
    editor: Editor,
    theme: TuiTheme,
    options: TuiOptions,
    published_id: Option<u64>,
    mode: Mode,
    palette_query: String,
    palette_results: Vec<PaletteEntry>,
    palette_state: ListState,
    palette_area: Rect,
    palette_drag: Option<PaletteEntry>,
    view: CanvasView,
    toast: Option<Toast>,
    should_quit: bool,
}

impl App {
    fn new(editor: Editor, options: TuiOptions, theme: TuiTheme) -> Self {
        let mut palette_state = ListState::default();
        palette_state.select(Some(0));
        Self {
            editor,
            theme,
            options,
            published_id: None,
            mode: Mode::Normal,
            palette_query: String::new(),
            palette_results: PaletteEntry::ALL.to_vec(),
            palette_state,
            palette_area: Rect::default(),
            palette_drag: None,
            view: CanvasView::default(),
            toast: None,
            should_quit: false,
        }
    }

    fn set_toast(&mut self, message: impl Into<String>) {
        self.toast = Some(Toast {
            message: message.into(),
            is_error: false,
            expires_at: Instant::now() + TOAST_TTL,
        });
    }

    fn set_error(&mut self, message: impl Into<String>) {
        self.set_toast(message);
        if let Some(toast) = &mut self.toast {
            toast.is_error = true;
        }
    }

    fn highlighted_entry(&self) -> Option<PaletteEntry> {
        self.palette_state.selected().and_then(|idx| self.palette_results.get(idx).copied())
    }

    fn move_palette_cursor(&mut self, delta: isize) {
        let len = self.palette_results.len();
        if len == 0 {
            self.palette_state.select(None);
            return;
        }
        let current = self.palette_state.selected().unwrap_or(0);
        let next = current.saturating_add_signed(delta).min(len - 1);
        self.palette_state.select(Some(next));
    }

    fn refresh_palette(&mut self) {
        self.palette_results = search_palette(&self.palette_query);
        self.palette_state.select((!self.palette_results.is_empty()).then_some(0));
    }

    fn handle_key(&mut self, key: KeyEvent) {
        match std::mem::replace(&mut self.mode, Mode::Normal) {
            Mode::Normal => self.handle_normal_key(key),
            Mode::Filter => self.handle_filter_key(key.code),
            Mode::Rename { block_id, buffer } => {
                self.handle_rename_key(key.code, block_id, buffer);
            }
        }
    }

    fn handle_normal_key(&mut self, key: KeyEvent) {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('r') if ctrl => {
                if !self.editor.handle(InteractionEvent::Redo).diagram_changed {
                    self.set_toast("Nothing to redo");
                }
            }
            KeyCode::Char('u') => {
                if !self.editor.handle(InteractionEvent::Undo).diagram_changed {
                    self.set_toast("Nothing to undo");
                }
            }
            KeyCode::Char('/') => self.mode = Mode::Filter,
            KeyCode::Up | KeyCode::Char('k') => self.move_palette_cursor(-1),
            KeyCode::Down | KeyCode::Char('j') => self.move_palette_cursor(1),
            KeyCode::Left => self.view.scroll_by(-4, 0),
            KeyCode::Right => self.view.scroll_by(4, 0),
            KeyCode::PageUp => self.view.scroll_by(0, -3),
            KeyCode::PageDown => self.view.scroll_by(0, 3),
            KeyCode::Enter => self.drop_highlighted_entry(),
            KeyCode::Esc => {
                self.editor.handle(InteractionEvent::CanvasClicked);
            }
            KeyCode::Char('d') | KeyCode::Delete | KeyCode::Backspace => {
                if !self.editor.remove_selection() {
                    self.set_toast("Nothing selected");
                }
            }
            KeyCode::Char('e') => self.export(),
            KeyCode::Char('v') => self.verify(),
            KeyCode::Char('s') => self.save(),
            KeyCode::Char('p') => self.publish(),
            KeyCode::Char('r') => self.begin_rename(),
            KeyCode::Char('c') => self.cycle_curve(),
            KeyCode::Char('X') => {
                self.editor.clear();
                self.set_toast("Canvas cleared");
            }
            _ => {}
        }
    }

    fn handle_filter_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Esc => {
                self.palette_query.clear();
                self.refresh_palette();
            }
            KeyCode::Enter => {}
            KeyCode::Backspace => {
                self.palette_query.pop();
                self.refresh_palette();
                self.mode = Mode::Filter;
            }
            KeyCode::Char(ch) => {
                self.palette_query.push(ch);
                self.refresh_palette();
                self.mode = Mode::Filter;
            }
            _ => self.mode = Mode::Filter,
        }
    }

    fn handle_rename_key(&mut self, code: KeyCode, block_id: BlockId, mut buffer: String) {
        match code {
            KeyCode::Esc => {}
            KeyCode::Enter => {
                let name = buffer.trim();
                if name.is_empty() {
                    self.set_error("Name cannot be empty");
                } else if let Err(err) = self.editor.rename_block(&block_id, name) {
                    self.set_error(err.to_string());
                }
            }
            KeyCode::Backspace => {
                buffer.pop();
                self.mode = Mode::Rename { block_id, buffer };
            }
            KeyCode::Char(ch) => {
                buffer.push(ch);
                self.mode = Mode::Rename { block_id, buffer };
            }
            _ => self.mode = Mode::Rename { block_id, buffer },
        }
    }

    fn drop_highlighted_entry(&mut self) {
        let Some(entry) = self.highlighted_entry() else {
            self.set_toast("No palette entry matches");
            return;
        };
        let requested = self
            .view
            .center_point()
            .offset(-BLOCK_WIDTH / 2.0, -BLOCK_HEIGHT / 2.0)
            .clamp_non_negative()
            .rounded();
        let block_id = self.editor.add_palette_block(entry, requested);
        self.editor.select_block(&block_id);
        self.set_toast(format!("Added {entry}"));
    }

    fn selected_block_id(&self) -> Option<BlockId> {
        match self.editor.selection() {
            Some(ObjectRef::Block(block_id)) => Some(block_id.clone()),
            _ => None,
        }
    }

    fn begin_rename(&mut self) {
        let Some(block) = self.editor.selected_block() else {
            self.set_toast("Select an input or output block to rename");
            return;
        };
        if !block.kind().name_is_editable() {
            let err = EditorError::NameNotEditable(block.id().clone());
            self.set_error(err.to_string());
            return;
        }
        self.mode = Mode::Rename {
            block_id: block.id().clone(),
            buffer: block.display_name().to_owned(),
        };
    }

    fn cycle_curve(&mut self) {
        let Some(block_id) = self.selected_block_id() else {
            self.set_toast("Select a zero-knowledge block first");
            return;
        };
        match self.editor.cycle_curve(&block_id) {
            Ok(curve) => self.set_toast(format!("Curve set to {curve}")),
            Err(err) => self.set_error(err.to_string()),
        }
    }

    fn export(&mut self) {
        match self.editor.export_to(&self.options.export_dir, Utc::now()) {
            Ok(path) => self.set_toast(format!("Exported {}", path.display())),
            Err(err) => self.set_error(err.to_string()),
        }
    }

    fn verify(&mut self) {
        match self.editor.validate() {
            Ok(report) if report.valid => {
                let message = report.suggestions.first().cloned().unwrap_or_default();
                self.set_toast(message);
            }
            Ok(report) => {
                let count = report.issues.len();
                let first = report.issues.first().cloned().unwrap_or_default();
                if count > 1 {
                    self.set_error(format!("{first} (+{} more)", count - 1));
                } else {
                    self.set_error(first);
                }
            }
            Err(err) => self.set_error(err.to_string()),
        }
    }

    fn save(&mut self) {
        let path =
            self.options.file.clone().unwrap_or_else(|| PathBuf::from(DEFAULT_SAVE_FILE));
        let result = serde_json::to_string_pretty(&self.editor.document())
            .map_err(|source| StoreError::Json { path: path.clone(), source })
            .and_then(|mut json| {
                json.push('\n');
                write_atomic(&path, json.as_bytes(), WriteDurability::BestEffort)
            });
        match result {
            Ok(()) => {
                tracing::info!(path = %path.display(), "saved diagram");
                self.set_toast(format!("Saved {}", path.display()));
                self.options.file = Some(path);
            }
            Err(err) => {
                tracing::warn!(%err, "save failed");
                self.set_error(err.to_string());
            }
        }
    }

    /// Creates the protocol on first publish and updates the same record afterwards.
    fn publish(&mut self) {
        let Some(store) = self.options.store.clone() else {
            self.set_toast("No protocol server running");
            return;
        };
        let document = self.editor.document();
        let mut store = store.blocking_lock();

        let result = match self.published_id {
            Some(id) => {
                let patch = ProtocolPatch {
                    name: Some(document.name.clone()),
                    description: document.description.clone(),
                    blocks: Some(document.blocks.clone()),
                    connections: Some(document.connections.clone()),
                };
                match store.update(id, patch) {
                    Err(StoreError::NotFound { .. }) => store.create(document),
                    other => other,
                }
            }
            None => store.create(document),
        };
        drop(store);

        match result {
            Ok(record) => {
                self.published_id = Some(record.id);
                self.set_toast(format!("Published protocol #{}", record.id));
            }
            Err(err) => self.set_error(err.to_string()),
        }
    }

    fn palette_entry_at(&self, row: u16) -> Option<PaletteEntry> {
        let inner_top = self.palette_area.y.saturating_add(1);
        if row < inner_top || row >= self.palette_area.bottom().saturating_sub(1) {
            return None;
        }
        let idx = usize::from(row - inner_top) + self.palette_state.offset();
        self.palette_results.get(idx).copied()
    }

    fn in_palette(&self, column: u16, row: u16) -> bool {
        self.palette_area.contains(Position::new(column, row))
    }

    fn canvas_pointer(&self, column: u16, row: u16) -> Option<(GridCell, Point)> {
        let cell = self.view.cell_at(column, row)?;
        Some((cell, self.view.point_of(cell)))
    }

    fn handle_mouse(&mut self, mouse: MouseEvent) {
        let (column, row) = (mouse.column, mouse.row);
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                if self.in_palette(column, row) {
                    if let Some(entry) = self.palette_entry_at(row) {
                        let idx = self.palette_results.iter().position(|e| *e == entry);
                        self.palette_state.select(idx);
                        self.palette_drag = Some(entry);
                    }
                    return;
                }
                let Some((cell, pointer)) = self.canvas_pointer(column, row) else {
                    return;
                };
                let event = match self.view.hit_test(&self.editor, cell) {
                    Hit::Anchor(block_id, anchor) => {
                        InteractionEvent::AnchorClicked { block_id, anchor }
                    }
                    Hit::Block(block_id) => {
                        InteractionEvent::PointerDownOnBlock { block_id, pointer }
                    }
                    Hit::Connection(connection_id) => {
                        InteractionEvent::ConnectionClicked { connection_id }
                    }
                    Hit::Canvas => InteractionEvent::CanvasClicked,
                };
                self.editor.handle(event);
            }
            MouseEventKind::Drag(MouseButton::Left) | MouseEventKind::Moved => {
                if self.palette_drag.is_some() {
                    return;
                }
                if let Some((_, pointer)) = self.canvas_pointer(column, row) {
                    self.editor.handle(InteractionEvent::PointerMove { pointer });
                }
            }
            MouseEventKind::Up(MouseButton::Left) => {
                if let Some(entry) = self.palette_drag.take() {
                    if let Some((_, pointer)) = self.canvas_pointer(column, row) {
                        self.drop_dragged_entry(entry, pointer);
                    }
                    return;
                }
                let pointer = self
                    .canvas_pointer(column, row)
                    .map(|(_, pointer)| pointer)
                    .or_else(|| self.editor.pointer());
                if let Some(pointer) = pointer {
                    self.editor.handle(InteractionEvent::PointerUp { pointer });
                }
            }
            MouseEventKind::ScrollDown => self.view.scroll_by(0, 2),
            MouseEventKind::ScrollUp => self.view.scroll_by(0, -2),
            _ => {}
        }
    }

    /// A palette drag publishes its payload under every transfer key, like a native drag source.
    fn drop_dragged_entry(&mut self, entry: PaletteEntry, pointer: Point) {
        let entries = DropPayload::from_entry(entry).to_transfer_entries();
        let borrowed = entries.iter().map(|(key, raw)| (*key, raw.as_str()));
        match self.editor.drop_transfer(borrowed, pointer) {
            Ok(block_id) => {
                self.editor.select_block(&block_id);
                self.set_toast(format!("Added {entry}"));
            }
            Err(err) => self.set_error(err.to_string()),
        }
    }

    fn status_line(&mut self) -> Line<'static> {
        match &self.mode {
            Mode::Filter => return chrome::prompt_line("/", &self.palette_query, &self.theme),
            Mode::Rename { buffer, .. } => {
                return chrome::prompt_line("Rename: ", buffer, &self.theme);
            }
            Mode::Normal => {}
        }
        match &self.toast {
            Some(toast) if toast.expires_at > Instant::now() => {
                chrome::toast_line(&toast.message, toast.is_error, &self.theme)
            }
            Some(_) => {
                self.toast = None;
                chrome::help_line(&self.editor, &self.theme)
            }
            None => chrome::help_line(&self.editor, &self.theme),
        }
    }
}

fn canvas_title(editor: &Editor) -> String {
    let diagram = editor.diagram();
    format!(
        " {} | {} blocks, {} connections ",
        diagram.name(),
        diagram.blocks().len(),
        diagram.connections().len()
    )
}

fn draw(frame: &mut Frame<'_>, app: &mut App) {
    let [main_area, status_area] =
        Layout::vertical([Constraint::Min(0), Constraint::Length(1)]).areas(frame.area());
    let [side_area, canvas_area] =
        Layout::horizontal([Constraint::Length(PALETTE_WIDTH), Constraint::Min(0)])
            .areas(main_area);
    let [palette_area, properties_area] =
        Layout::vertical([Constraint::Percentage(60), Constraint::Percentage(40)]).areas(side_area);
    app.palette_area = palette_area;

    let palette_title = if app.palette_query.is_empty() {
        " Palette ".to_owned()
    } else {
        format!(" Palette /{} ", app.palette_query)
    };
    let items = app
        .palette_results
        .iter()
        .map(|entry| {
            ListItem::new(Line::from(vec![
                Span::styled(entry.name(), app.theme.block_style(entry.kind())),
                Span::styled(format!("  {}", entry.category()), app.theme.label_style()),
            ]))
        })
        .collect::<Vec<_>>();
    let palette = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(palette_title)
                .border_style(app.theme.panel_border_style(app.mode == Mode::Filter)),
        )
        .highlight_style(app.theme.selection_style());
    frame.render_stateful_widget(palette, palette_area, &mut app.palette_state);

    let properties = Paragraph::new(chrome::properties_lines(&app.editor, &app.theme))
        .block(Block::default().borders(Borders::ALL).title(" Properties "))
        .wrap(Wrap { trim: true });
    frame.render_widget(properties, properties_area);

    let canvas_block = Block::default()
        .borders(Borders::ALL)
        .title(canvas_title(&app.editor))
        .border_style(app.theme.panel_border_style(app.mode == Mode::Normal));
    app.view.area = canvas_block.inner(canvas_area);
    frame.render_widget(canvas_block, canvas_area);
    render_canvas(frame.buffer_mut(), &app.view, &app.editor, &app.theme);

    let status = app.status_line();
    frame.render_widget(Paragraph::new(status).style(app.theme.base_style()), status_area);
}

struct TerminalSession {
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
}

impl TerminalSession {
    fn new() -> Result<Self, Box<dyn Error>> {
        enable_raw_mode()?;

        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture).map_err(|err| {
            teardown_terminal();
            err
        })?;

        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend).map_err(|err| {
            teardown_terminal();
            err
        })?;
        terminal.clear().map_err(|err| {
            teardown_terminal();
            err
        })?;

        Ok(Self { terminal })
    }

    fn draw(&mut self, draw_fn: impl FnOnce(&mut Frame<'_>)) -> io::Result<()> {
        self.terminal.draw(draw_fn)?;
        Ok(())
    }
}

impl Drop for TerminalSession {
    fn drop(&mut self) {
        let _ = self.terminal.show_cursor();
        teardown_terminal();
    }
}

fn teardown_terminal() {
    let _ = disable_raw_mode();
    let mut stdout = io::stdout();
    let _ = execute!(stdout, DisableMouseCapture, LeaveAlternateScreen);
}
