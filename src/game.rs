//! Game state: board, active piece, upcoming queue, score ledger and the cue outbox.

use crate::{GameConfig, ModeKind};
use crate::board::{Board, BoardError, LineScan};
use crate::factory::{FactoryConfig, PieceFactory};
use crate::piece::Piece;
use crate::score::ScoreLedger;

/// Width of the spawn box every shape fits in.
const SPAWN_BOX: i32 = 4;

/// Named events for the audio/visual collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cue {
    PlaceBlock,
    /// 1 to 3 lines in one placement.
    LineClear1,
    /// 4 to 10 lines in one placement.
    LineClear2,
    /// More than 10 lines in one placement.
    EasterEgg,
    NewHighScore,
    Explosion,
    StopMusic,
    GameOver,
    ModeSwitch,
}

impl Cue {
    pub fn label(self) -> &'static str {
        match self {
            Self::PlaceBlock => "Placed",
            Self::LineClear1 => "Line clear!",
            Self::LineClear2 => "Mega clear!",
            Self::EasterEgg => "Unbelievable!",
            Self::NewHighScore => "New high score!",
            Self::Explosion => "Boom!",
            Self::StopMusic => "",
            Self::GameOver => "Game over",
            Self::ModeSwitch => "Mode switched",
        }
    }

    /// Cues worth a banner; the rest are too frequent or silent.
    pub fn is_banner(self) -> bool {
        !matches!(self, Self::PlaceBlock | Self::StopMusic)
    }
}

/// What committing a piece did to the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// Ordinary piece frozen; `lines` rows plus columns were cleared.
    Cleared { lines: usize },
    /// Bomb detonated; `cells` occupied squares were emptied.
    Exploded { cells: usize },
}

/// Shared session context for both play modes.
#[derive(Debug)]
pub struct GameState {
    pub board: Board,
    factory: PieceFactory,
    /// Falling piece in gravity mode.
    pub current: Piece,
    /// Upcoming pieces; the draggable slots in drag mode.
    pub queue: Vec<Piece>,
    queue_len: usize,
    /// Queued pieces get a random starting rotation (drag mode only).
    rotate_queued: bool,
    pub ledger: ScoreLedger,
    pub game_over: bool,
    /// Lines cleared by the latest placement, until the renderer takes them.
    last_clear: Option<LineScan>,
    cues: Vec<Cue>,
    /// One-line message for the sidebar (e.g. a failed leaderboard write).
    status: Option<String>,
}

impl GameState {
    pub fn new(config: &GameConfig, ledger: ScoreLedger) -> Result<Self, BoardError> {
        let board = Board::new(config.rows, config.cols)?;
        let mut factory = PieceFactory::new(&FactoryConfig {
            spawn_x: spawn_column(config.cols),
            bomb_chance: config.bomb_chance,
            seed: config.seed,
            ..FactoryConfig::default()
        });
        let current = factory.create_piece();
        let mut state = Self {
            board,
            factory,
            current,
            queue: Vec::new(),
            queue_len: config.queue_len.max(1),
            rotate_queued: config.mode == ModeKind::Drag,
            ledger,
            game_over: false,
            last_clear: None,
            cues: Vec::new(),
            status: None,
        };
        state.refill_queue();
        Ok(state)
    }

    /// Fresh session on the same board and leaderboard.
    pub fn reset(&mut self) {
        self.board.clear();
        self.ledger.reset();
        self.current = self.factory.create_piece();
        self.queue.clear();
        self.refill_queue();
        self.game_over = false;
        self.last_clear = None;
        self.status = None;
    }

    pub fn queue_len(&self) -> usize {
        self.queue_len
    }

    /// Top up the queue. Drag pieces start in a random rotation, gravity
    /// pieces in their canonical one.
    pub fn refill_queue(&mut self) {
        while self.queue.len() < self.queue_len {
            let piece = if self.rotate_queued {
                self.factory.create_queued_piece()
            } else {
                self.factory.create_piece()
            };
            self.queue.push(piece);
        }
    }

    /// Follow a mode switch. Leaving drag mode puts the queue back in
    /// canonical rotation so the preview matches what spawns.
    pub fn set_drag_queue(&mut self, drag: bool) {
        self.rotate_queued = drag;
        if !drag {
            for piece in &mut self.queue {
                piece.rotation = 0;
            }
        }
    }

    /// Remove a queued piece, or `None` if the index is out of range.
    pub fn take_queued(&mut self, index: usize) -> Option<Piece> {
        (index < self.queue.len()).then(|| self.queue.remove(index))
    }

    /// Make the head of the queue the active piece at the spawn point and
    /// refill. Returns whether it fits there.
    pub fn spawn_next(&mut self) -> bool {
        let next = match self.take_queued(0) {
            Some(piece) => piece,
            None => self.factory.create_piece(),
        };
        self.current = next;
        self.refill_queue();
        self.respawn_current()
    }

    /// Move the active piece back to the spawn point in its canonical
    /// rotation. Returns whether it fits there.
    pub fn respawn_current(&mut self) -> bool {
        let (x, y) = self.factory.spawn_point();
        self.current.x = x;
        self.current.y = y;
        self.current.rotation = 0;
        self.current.screen = None;
        self.board.is_valid_position(&self.current)
    }

    /// Commit a piece to the board. Bombs detonate instead of freezing and
    /// score nothing; ordinary pieces freeze, clear full lines and score.
    pub fn place(&mut self, piece: &Piece) -> Placement {
        if piece.special {
            let cells = self.board.explode_bomb(piece);
            self.cues.push(Cue::Explosion);
            self.cues.push(Cue::PlaceBlock);
            return Placement::Exploded { cells };
        }
        self.board.freeze(piece);
        let scan = self.board.scan_lines();
        let lines = self.board.break_lines();
        let cues = self.ledger.add_points(lines as u32);
        self.cues.extend(cues);
        if !scan.is_empty() {
            self.last_clear = Some(scan);
        }
        Placement::Cleared { lines }
    }

    /// True if at least one queued piece fits somewhere on the board.
    pub fn any_queued_piece_fits(&self) -> bool {
        self.queue
            .iter()
            .any(|piece| self.board.has_space_for_block(&mut piece.clone()))
    }

    /// End the session. Only the first call has effects: cues, leaderboard
    /// merge and save.
    pub fn finish_game(&mut self) {
        if self.game_over {
            return;
        }
        self.game_over = true;
        self.cues.push(Cue::StopMusic);
        self.cues.push(Cue::GameOver);
        self.save_leaderboard();
    }

    /// Merge the running score into the leaderboard and write it out. A
    /// failed write only sets the status line.
    pub fn save_leaderboard(&mut self) {
        if let Err(err) = self.ledger.update_leaderboard() {
            let target = self
                .ledger
                .store_path()
                .map(|p| format!(" to {}", p.display()))
                .unwrap_or_default();
            self.status = Some(format!("leaderboard not saved{target}: {err}"));
        }
    }

    pub fn push_cue(&mut self, cue: Cue) {
        self.cues.push(cue);
    }

    pub fn drain_cues(&mut self) -> Vec<Cue> {
        std::mem::take(&mut self.cues)
    }

    pub fn take_last_clear(&mut self) -> Option<LineScan> {
        self.last_clear.take()
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }
}

/// Left edge of a centred spawn box (3 on a 10-wide board).
fn spawn_column(cols: usize) -> i32 {
    ((cols as i32 - SPAWN_BOX) / 2).max(0)
}
