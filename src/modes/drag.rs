//! Drag mode: pick a queued piece, drag it over the board, drop it on a snapped anchor.

use super::gravity::GravitySettings;
use super::{Command, InputEvent, PlayMode, session_command};
use crate::ModeKind;
use crate::board::Board;
use crate::game::GameState;
use crate::piece::{Piece, ScreenPos};
use crate::shapes::bounds;

/// Queue slots sit this many cells to the right of the board's right edge.
pub const QUEUE_GAP: f32 = 2.0;
/// Vertical distance between queue slots, in cells.
pub const SLOT_SPACING: f32 = 5.0;

/// Where the queued pieces are shown, in board cell units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QueueLayout {
    pub origin: ScreenPos,
    pub spacing: f32,
}

impl QueueLayout {
    pub fn for_board(board: &Board) -> Self {
        Self {
            origin: ScreenPos {
                x: board.cols() as f32 + QUEUE_GAP,
                y: 0.0,
            },
            spacing: SLOT_SPACING,
        }
    }

    /// Local-grid origin of slot `index`.
    pub fn slot(&self, index: usize) -> ScreenPos {
        ScreenPos {
            x: self.origin.x,
            y: self.origin.y + index as f32 * self.spacing,
        }
    }

    /// Slot whose piece's occupied bounding box contains the point.
    pub fn hit_test(&self, queue: &[Piece], x: f32, y: f32) -> Option<usize> {
        queue.iter().enumerate().find_map(|(i, piece)| {
            let (min_r, min_c, max_r, max_c) = bounds(piece.cells())?;
            let slot = self.slot(i);
            let left = slot.x + f32::from(min_c);
            let top = slot.y + f32::from(min_r);
            let right = slot.x + f32::from(max_c) + 1.0;
            let bottom = slot.y + f32::from(max_r) + 1.0;
            (x >= left && x < right && y >= top && y < bottom).then_some(i)
        })
    }
}

/// Anchor a dragged piece would land on: the floating origin rounded to the
/// nearest cell, then shifted so the occupied cells stay on the board.
pub fn snap_anchor(board: &Board, piece: &Piece, pos: ScreenPos) -> (i32, i32) {
    let Some((min_r, min_c, max_r, max_c)) = bounds(piece.cells()) else {
        return (pos.x.round() as i32, pos.y.round() as i32);
    };
    let x_lo = -i32::from(min_c);
    let x_hi = board.cols() as i32 - 1 - i32::from(max_c);
    let y_lo = -i32::from(min_r);
    let y_hi = board.rows() as i32 - 1 - i32::from(max_r);
    // A shape wider than the board pins to the left/top edge.
    let x = (pos.x.round() as i32).min(x_hi).max(x_lo);
    let y = (pos.y.round() as i32).min(y_hi).max(y_lo);
    (x, y)
}

/// A piece in flight.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Drag {
    /// Queue slot the piece came from.
    pub index: usize,
    /// Piece origin minus pointer at pick-up.
    grab: ScreenPos,
    /// Snapped anchor under the current pointer.
    pub anchor: (i32, i32),
    /// Whether the piece can be dropped on `anchor`.
    pub fits: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DragPhase {
    Idle,
    Dragging(Drag),
    GameOver,
}

#[derive(Debug, Clone)]
pub struct DragMode {
    settings: GravitySettings,
    phase: DragPhase,
}

impl DragMode {
    pub fn new(settings: GravitySettings) -> Self {
        Self {
            settings,
            phase: DragPhase::Idle,
        }
    }

    pub fn settings(&self) -> GravitySettings {
        self.settings
    }

    pub fn phase(&self) -> DragPhase {
        self.phase
    }

    /// The drag in progress, for the ghost preview.
    pub fn drag(&self) -> Option<Drag> {
        match self.phase {
            DragPhase::Dragging(drag) => Some(drag),
            _ => None,
        }
    }

    fn pick_up(&mut self, state: &mut GameState, x: f32, y: f32) {
        let layout = QueueLayout::for_board(&state.board);
        let Some(index) = layout.hit_test(&state.queue, x, y) else {
            return;
        };
        let slot = layout.slot(index);
        let grab = ScreenPos {
            x: slot.x - x,
            y: slot.y - y,
        };
        let mut drag = Drag {
            index,
            grab,
            anchor: (0, 0),
            fits: false,
        };
        Self::follow(state, &mut drag, x, y);
        self.phase = DragPhase::Dragging(drag);
    }

    /// Move the floating piece with the pointer and re-snap.
    fn follow(state: &mut GameState, drag: &mut Drag, x: f32, y: f32) {
        let pos = ScreenPos {
            x: x + drag.grab.x,
            y: y + drag.grab.y,
        };
        let Some(piece) = state.queue.get_mut(drag.index) else {
            return;
        };
        piece.screen = Some(pos);
        let anchor = snap_anchor(&state.board, piece, pos);
        let mut candidate = piece.clone();
        candidate.x = anchor.0;
        candidate.y = anchor.1;
        drag.anchor = anchor;
        drag.fits = state.board.is_valid_position(&candidate);
    }

    fn drop_piece(&mut self, state: &mut GameState, mut drag: Drag, x: f32, y: f32) {
        self.phase = DragPhase::Idle;
        Self::follow(state, &mut drag, x, y);
        if !drag.fits {
            if let Some(piece) = state.queue.get_mut(drag.index) {
                piece.screen = None;
            }
            return;
        }
        let Some(mut piece) = state.take_queued(drag.index) else {
            return;
        };
        piece.x = drag.anchor.0;
        piece.y = drag.anchor.1;
        piece.screen = None;
        state.place(&piece);
        state.refill_queue();
    }
}

impl PlayMode for DragMode {
    /// Game over when no queued piece fits anywhere; fires once.
    fn on_tick(&mut self, state: &mut GameState, _dt: f64) {
        if self.phase == DragPhase::GameOver {
            return;
        }
        if state.game_over || !state.any_queued_piece_fits() {
            self.cancel(state);
            self.phase = DragPhase::GameOver;
            state.finish_game();
        }
    }

    fn on_input(&mut self, state: &mut GameState, event: InputEvent) -> Option<Command> {
        match (self.phase, event) {
            (DragPhase::GameOver, _) => return session_command(event),
            (DragPhase::Idle, InputEvent::PointerDown { x, y }) => self.pick_up(state, x, y),
            (DragPhase::Dragging(mut drag), InputEvent::PointerMove { x, y }) => {
                Self::follow(state, &mut drag, x, y);
                self.phase = DragPhase::Dragging(drag);
            }
            (DragPhase::Dragging(drag), InputEvent::PointerUp { x, y }) => {
                self.drop_piece(state, drag, x, y);
            }
            _ => return session_command(event),
        }
        None
    }

    fn is_over(&self) -> bool {
        self.phase == DragPhase::GameOver
    }

    fn reset(&mut self) {
        self.phase = DragPhase::Idle;
    }

    /// Put a dragged piece back in its slot, unplaced.
    fn cancel(&mut self, state: &mut GameState) {
        if let DragPhase::Dragging(drag) = self.phase {
            if let Some(piece) = state.queue.get_mut(drag.index) {
                piece.screen = None;
            }
            self.phase = DragPhase::Idle;
        }
    }

    fn kind(&self) -> ModeKind {
        ModeKind::Drag
    }
}
