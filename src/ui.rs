//! Layout and drawing: board, queue, dragged piece, sidebar, overlays, line-clear flash.

use crate::board::{Board, EMPTY, LineScan};
use crate::game::{Cue, GameState};
use crate::modes::Mode;
use crate::modes::drag::{DragPhase, QueueLayout, SLOT_SPACING};
use crate::modes::gravity::GravityPhase;
use crate::modes::name_entry::NameEntry;
use crate::piece::{Piece, ScreenPos};
use crate::theme::Theme;
use ratatui::Frame;
use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Position, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use std::collections::HashSet;
use std::time::Instant;
use tachyonfx::{
    CellFilter, Duration as TfxDuration, Effect, EffectRenderer, Interpolation, fx, ref_count,
};

/// Terminal columns per board cell.
pub const CELL_WIDTH: u16 = 2;
const SIDEBAR_WIDTH: u16 = 28;
const SIDEBAR_MIN_HEIGHT: u16 = 26;
/// Board cells from the board's right edge to the end of the queue slots.
const QUEUE_PANEL_CELLS: u16 = 6;
/// Duration of the line-clear flash (TachyonFX) in ms.
const LINE_CLEAR_FLASH_MS: u32 = 350;

const SOLID: &str = "█";
const GHOST: &str = "░";
const PREVIEW: &str = "▒";

/// Maps between terminal cells and board cell units. The same values are
/// used to draw and to read mouse input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BoardGeometry {
    /// Board interior, one row per board row and `CELL_WIDTH` columns per cell.
    pub inner: Rect,
}

impl BoardGeometry {
    pub fn new(inner: Rect) -> Self {
        Self { inner }
    }

    /// Centre the board, queue panel and sidebar in `area`. Sizes past the
    /// terminal coordinate range saturate.
    pub fn layout(area: Rect, board: &Board, queue_len: usize) -> Self {
        let board_w = clamp_u16(board.cols()).saturating_mul(CELL_WIDTH);
        let board_h = clamp_u16(board.rows());
        let total_w = board_w
            .saturating_add(2 + QUEUE_PANEL_CELLS * CELL_WIDTH)
            .saturating_add(SIDEBAR_WIDTH);
        let queue_h = clamp_u16(queue_len).saturating_mul(SLOT_SPACING as u16);
        let total_h = board_h
            .saturating_add(2)
            .max(queue_h)
            .max(SIDEBAR_MIN_HEIGHT);
        let x = area.x.saturating_add(area.width.saturating_sub(total_w) / 2);
        let y = area.y.saturating_add(area.height.saturating_sub(total_h) / 2);
        Self::new(Rect {
            x: x.saturating_add(1),
            y: y.saturating_add(1),
            width: board_w,
            height: board_h,
        })
    }

    /// Board frame including the border.
    pub fn outer(&self) -> Rect {
        Rect {
            x: self.inner.x.saturating_sub(1),
            y: self.inner.y.saturating_sub(1),
            width: self.inner.width.saturating_add(2),
            height: self.inner.height.saturating_add(2),
        }
    }

    /// Where the sidebar starts (right of the queue panel).
    fn sidebar(&self) -> Rect {
        Rect {
            x: self
                .inner
                .right()
                .saturating_add(1 + QUEUE_PANEL_CELLS * CELL_WIDTH),
            y: self.outer().y,
            width: SIDEBAR_WIDTH,
            height: self.outer().height.max(SIDEBAR_MIN_HEIGHT),
        }
    }

    /// Centre of a terminal cell in board cell units.
    pub fn to_cells(&self, column: u16, row: u16) -> (f32, f32) {
        let x = (f32::from(column) - f32::from(self.inner.x) + 0.5) / f32::from(CELL_WIDTH);
        let y = f32::from(row) - f32::from(self.inner.y) + 0.5;
        (x, y)
    }

    /// Left terminal cell of a board position, if it is on the screen at all.
    pub fn to_screen(&self, x: f32, y: f32) -> Option<(u16, u16)> {
        let column = (f32::from(self.inner.x) + x * f32::from(CELL_WIDTH)).round();
        let row = (f32::from(self.inner.y) + y).round();
        let max = f32::from(u16::MAX - CELL_WIDTH);
        (column >= 0.0 && row >= 0.0 && column <= max && row <= max)
            .then_some((column as u16, row as u16))
    }
}

fn clamp_u16(n: usize) -> u16 {
    u16::try_from(n).unwrap_or(u16::MAX)
}

/// Everything the renderer reads.
pub struct View<'a> {
    pub state: &'a GameState,
    pub mode: &'a Mode,
    pub theme: &'a Theme,
    /// Latest cue worth showing.
    pub banner: Option<Cue>,
    /// Set while the player is typing a name.
    pub name_entry: Option<&'a NameEntry>,
}

/// TachyonFX flash over the lines of the latest clear.
#[derive(Default)]
pub struct Flash {
    effect: Option<Effect>,
    last_process: Option<Instant>,
}

impl Flash {
    pub fn start(&mut self, scan: &LineScan, geometry: BoardGeometry, theme: &Theme) {
        let inner = geometry.inner;
        let mut cells: HashSet<(u16, u16)> = HashSet::new();
        for &y in &scan.rows {
            for column in inner.x..inner.right() {
                cells.insert((column, inner.y + y as u16));
            }
        }
        for &x in &scan.cols {
            let left = inner.x + x as u16 * CELL_WIDTH;
            for row in inner.y..inner.bottom() {
                for column in left..left + CELL_WIDTH {
                    cells.insert((column, row));
                }
            }
        }
        let filter = CellFilter::PositionFn(ref_count(move |pos: Position| {
            cells.contains(&(pos.x, pos.y))
        }));
        let effect = fx::fade_from(
            theme.highlight,
            theme.highlight,
            (LINE_CLEAR_FLASH_MS, Interpolation::QuadOut),
        )
        .with_filter(filter)
        .with_area(inner);
        self.effect = Some(effect);
        self.last_process = None;
    }

    pub fn clear(&mut self) {
        self.effect = None;
        self.last_process = None;
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, now: Instant) {
        let Some(effect) = self.effect.as_mut() else {
            return;
        };
        let delta = self
            .last_process
            .map(|t| now.saturating_duration_since(t))
            .unwrap_or(std::time::Duration::ZERO);
        let delta_ms = delta.as_millis().min(u128::from(u32::MAX)) as u32;
        self.last_process = Some(now);
        frame.render_effect(effect, area, TfxDuration::from_millis(delta_ms));
        if effect.done() {
            self.clear();
        }
    }
}

/// Draw the current screen and return the geometry used, for mouse mapping.
pub fn draw(frame: &mut Frame, view: &View, flash: &mut Flash, now: Instant) -> BoardGeometry {
    let area = frame.area();
    let state = view.state;
    let geometry = BoardGeometry::layout(area, &state.board, state.queue_len());
    let theme = view.theme;

    frame.render_widget(
        Block::default().style(Style::default().bg(theme.bg).fg(theme.text)),
        area,
    );
    draw_board(frame, view, geometry);
    draw_queue(frame, view, geometry);
    draw_sidebar(frame, view, geometry);
    flash.render(frame, geometry.inner.intersection(area), now);

    if let Some(entry) = view.name_entry {
        draw_name_entry(frame, theme, entry, area);
    } else if state.game_over {
        draw_game_over(frame, view, geometry.outer().intersection(area));
    }
    geometry
}

/// Paint one board cell (`CELL_WIDTH` terminal columns) if it is on screen.
fn put_cell(buf: &mut Buffer, geometry: BoardGeometry, pos: ScreenPos, symbol: &str, style: Style) {
    let Some((column, row)) = geometry.to_screen(pos.x, pos.y) else {
        return;
    };
    for dx in 0..CELL_WIDTH {
        if let Some(cell) = buf.cell_mut((column + dx, row)) {
            cell.set_symbol(symbol).set_style(style);
        }
    }
}

/// Paint a piece whose local grid origin is at `origin`.
fn put_piece(buf: &mut Buffer, geometry: BoardGeometry, piece: &Piece, origin: ScreenPos, symbol: &str, style: Style) {
    for &(row, col) in piece.cells() {
        let pos = ScreenPos {
            x: origin.x + f32::from(col),
            y: origin.y + f32::from(row),
        };
        put_cell(buf, geometry, pos, symbol, style);
    }
}

/// Board cells only; pieces above the top row stay hidden.
fn put_on_board(buf: &mut Buffer, geometry: BoardGeometry, piece: &Piece, symbol: &str, style: Style) {
    for (x, y) in piece.board_cells().filter(|&(_, y)| y >= 0) {
        let pos = ScreenPos {
            x: x as f32,
            y: y as f32,
        };
        put_cell(buf, geometry, pos, symbol, style);
    }
}

fn draw_board(frame: &mut Frame, view: &View, geometry: BoardGeometry) {
    let theme = view.theme;
    let state = view.state;
    let title = format!(" Tetris Boom | {} ", view.mode.kind().name());
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.grid).bg(theme.bg))
        .title(Span::styled(title, Style::default().fg(theme.highlight)));
    frame.render_widget(block, geometry.outer().intersection(frame.area()));

    let buf = frame.buffer_mut();
    let board = &state.board;
    let empty = Style::default().fg(theme.grid).bg(theme.bg);
    for y in 0..board.rows() {
        let Some(row) = board.row(y) else {
            continue;
        };
        for (x, &id) in row.iter().enumerate() {
            let pos = ScreenPos {
                x: x as f32,
                y: y as f32,
            };
            match id {
                EMPTY => {
                    put_cell(buf, geometry, pos, " ", empty);
                    if let Some((column, line)) = geometry.to_screen(pos.x, pos.y) {
                        if let Some(cell) = buf.cell_mut((column + 1, line)) {
                            cell.set_symbol("·").set_style(empty);
                        }
                    }
                }
                id => {
                    let color = theme.block_color(id);
                    put_cell(buf, geometry, pos, SOLID, Style::default().fg(color).bg(theme.bg));
                }
            }
        }
    }

    if let Mode::Gravity(m) = view.mode {
        if m.phase() == GravityPhase::GameOver {
            return;
        }
        let piece = &state.current;
        let mut ghost = piece.clone();
        while board.is_valid_position(&ghost) {
            ghost.move_by(0, 1);
        }
        ghost.move_by(0, -1);
        let color = theme.block_color(piece.color);
        put_on_board(buf, geometry, &ghost, GHOST, Style::default().fg(color).bg(theme.bg));
        let style = if piece.special {
            Style::default().fg(theme.game_over).bg(theme.bg).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(color).bg(theme.bg)
        };
        put_on_board(buf, geometry, piece, SOLID, style);
    }
}

/// Queue slots; in drag mode the picked piece floats at its screen position
/// with a preview of where it would land.
fn draw_queue(frame: &mut Frame, view: &View, geometry: BoardGeometry) {
    let theme = view.theme;
    let state = view.state;
    let layout = QueueLayout::for_board(&state.board);
    let buf = frame.buffer_mut();

    if let Some((column, row)) = geometry.to_screen(layout.origin.x, layout.origin.y - 1.0) {
        let label = match view.mode {
            Mode::Gravity(_) => "Next",
            Mode::Drag(_) => "Pieces",
        };
        buf.set_string(column, row, label, Style::default().fg(theme.highlight));
    }

    let drag = match view.mode {
        Mode::Drag(m) => m.drag(),
        Mode::Gravity(_) => None,
    };
    if let Some(drag) = drag {
        if let Some(piece) = state.queue.get(drag.index) {
            let mut landing = piece.clone();
            (landing.x, landing.y) = drag.anchor;
            let style = if drag.fits {
                Style::default().fg(theme.highlight).bg(theme.bg)
            } else {
                Style::default().fg(theme.game_over).bg(theme.bg)
            };
            put_on_board(buf, geometry, &landing, PREVIEW, style);
        }
    }

    let mut floating = None;
    for (i, piece) in state.queue.iter().enumerate() {
        if piece.screen.is_some() {
            floating = Some(piece);
            continue;
        }
        let style = piece_style(theme, piece);
        put_piece(buf, geometry, piece, layout.slot(i), SOLID, style);
    }
    if let Some(piece) = floating {
        put_piece(buf, geometry, piece, piece.screen_pos(), SOLID, piece_style(theme, piece));
    }
}

fn piece_style(theme: &Theme, piece: &Piece) -> Style {
    let style = Style::default().fg(theme.block_color(piece.color)).bg(theme.bg);
    if piece.special {
        style.fg(theme.game_over).add_modifier(Modifier::BOLD)
    } else {
        style
    }
}

fn draw_sidebar(frame: &mut Frame, view: &View, geometry: BoardGeometry) {
    let theme = view.theme;
    let state = view.state;
    let ledger = &state.ledger;
    let area = geometry.sidebar().intersection(frame.area());
    let title_style = Style::default().fg(theme.highlight);
    let fg_style = Style::default().fg(theme.text);
    let dim_style = Style::default().fg(theme.inactive);
    let border_style = Style::default().fg(theme.grid).bg(theme.bg);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(6), // stats
            Constraint::Length(6), // leaderboard
            Constraint::Length(4), // banner + status
            Constraint::Min(6),    // controls
        ])
        .split(area);

    let best = ledger.highscore();
    let holder = ledger.highscore_player();
    let stats = vec![
        Line::from(vec![
            Span::styled("Score: ", title_style),
            Span::styled(ledger.score().to_string(), fg_style),
        ]),
        Line::from(vec![
            Span::styled("Best:  ", title_style),
            Span::styled(
                if holder.is_empty() {
                    best.to_string()
                } else {
                    format!("{best} ({holder})")
                },
                fg_style,
            ),
        ]),
        Line::from(vec![
            Span::styled("Player: ", title_style),
            Span::styled(ledger.player_name().to_string(), fg_style),
        ]),
        pace_line(view, title_style, dim_style),
    ];
    frame.render_widget(
        Paragraph::new(stats).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(border_style)
                .title(Span::styled(" Stats ", title_style)),
        ),
        chunks[0],
    );

    let mut board_lines: Vec<Line> = ledger
        .leaderboard()
        .iter()
        .enumerate()
        .map(|(i, e)| {
            Line::from(vec![
                Span::styled(format!("{}. ", i + 1), title_style),
                Span::styled(format!("{:<15} {}", e.name, e.score), fg_style),
            ])
        })
        .collect();
    if board_lines.is_empty() {
        board_lines.push(Line::from(Span::styled("no scores yet", dim_style)));
    }
    frame.render_widget(
        Paragraph::new(board_lines).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(border_style)
                .title(Span::styled(" Leaderboard ", title_style)),
        ),
        chunks[1],
    );

    let mut news = Vec::new();
    if let Some(cue) = view.banner {
        news.push(Line::from(Span::styled(
            cue.label(),
            Style::default().fg(theme.highlight).add_modifier(Modifier::BOLD),
        )));
    }
    if let Some(status) = state.status() {
        news.push(Line::from(Span::styled(status.to_string(), Style::default().fg(theme.game_over))));
    }
    frame.render_widget(
        Paragraph::new(news)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true }),
        chunks[2],
    );

    let controls: &[&str] = match view.mode {
        Mode::Gravity(_) => &[
            "←/→ h/l   move",
            "↑ k x     rotate",
            "z u       rotate back",
            "↓ j       soft drop",
            "space     hard drop",
            "m tab     block blast",
            "t theme  r restart  q quit",
        ],
        Mode::Drag(_) => &[
            "mouse     drag a piece",
            "          onto the board",
            "m tab     gravity mode",
            "t theme  r restart  q quit",
        ],
    };
    let lines: Vec<Line> = controls
        .iter()
        .map(|s| Line::from(Span::styled(*s, dim_style)))
        .collect();
    frame.render_widget(
        Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(border_style)
                .title(Span::styled(" Controls ", title_style)),
        ),
        chunks[3],
    );
}

/// Fall speed in gravity mode, pieces waiting in drag mode.
fn pace_line(view: &View, title_style: Style, dim_style: Style) -> Line<'static> {
    let (label, value) = match view.mode {
        Mode::Gravity(m) => {
            let rate = 1.0 / m.fall_interval();
            let suffix = if m.is_soft_dropping() { " (soft)" } else { "" };
            ("Speed: ", format!("{rate:.1} rows/s{suffix}"))
        }
        Mode::Drag(m) if m.phase() == DragPhase::GameOver => ("Pieces: ", "none fit".to_string()),
        Mode::Drag(_) => ("Pieces: ", view.state.queue.len().to_string()),
    };
    Line::from(vec![Span::styled(label, title_style), Span::styled(value, dim_style)])
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    Rect {
        x: area.x + area.width.saturating_sub(width) / 2,
        y: area.y + area.height.saturating_sub(height) / 2,
        width: width.min(area.width),
        height: height.min(area.height),
    }
}

fn draw_game_over(frame: &mut Frame, view: &View, area: Rect) {
    let theme = view.theme;
    let ledger = &view.state.ledger;
    let popup = centered(area, 22, 8);
    let mut lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            " Game Over ",
            Style::default().fg(theme.bg).bg(theme.game_over),
        )),
        Line::from(""),
        Line::from(Span::styled(
            format!("Score: {}", ledger.score()),
            Style::default().fg(theme.text),
        )),
    ];
    if ledger.high_score_announced() {
        lines.push(Line::from(Span::styled(
            "New record!",
            Style::default().fg(theme.highlight).add_modifier(Modifier::BOLD),
        )));
    }
    lines.push(Line::from(Span::styled(
        "R restart  Q quit",
        Style::default().fg(theme.text),
    )));
    frame.render_widget(Clear, popup);
    frame.render_widget(
        Paragraph::new(lines).alignment(Alignment::Center).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.game_over).bg(theme.bg))
                .style(Style::default().bg(theme.bg)),
        ),
        popup,
    );
}

fn draw_name_entry(frame: &mut Frame, theme: &Theme, entry: &NameEntry, area: Rect) {
    let popup = centered(area, 34, 8);
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            "Enter your name",
            Style::default().fg(theme.highlight).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled(
            format!("{}_", entry.text()),
            Style::default().fg(theme.text),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "Enter confirm  Esc skip",
            Style::default().fg(theme.inactive),
        )),
    ];
    frame.render_widget(Clear, popup);
    frame.render_widget(
        Paragraph::new(lines).alignment(Alignment::Center).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.grid).bg(theme.bg))
                .title(Span::styled(" Tetris Boom ", Style::default().fg(theme.highlight)))
                .style(Style::default().bg(theme.bg)),
        ),
        popup,
    );
}
