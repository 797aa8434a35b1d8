//! Gravity mode: the active piece falls on a timer; moves are applied then rolled back if illegal.

use super::{Command, InputEvent, PlayMode, session_command};
use crate::ModeKind;
use crate::game::GameState;

pub const DEFAULT_GRAVITY: f64 = 1.5;
pub const DEFAULT_SOFT_DROP: f64 = 5.0;

/// Fall speed. Also carried by drag mode so a switch back keeps it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GravitySettings {
    /// Rows per second.
    pub gravity: f64,
    /// Speed multiplier while soft drop is held.
    pub soft_drop: f64,
}

impl Default for GravitySettings {
    fn default() -> Self {
        Self {
            gravity: DEFAULT_GRAVITY,
            soft_drop: DEFAULT_SOFT_DROP,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GravityPhase {
    Falling,
    Locking,
    GameOver,
}

#[derive(Debug, Clone)]
pub struct GravityMode {
    settings: GravitySettings,
    phase: GravityPhase,
    /// Seconds since the last fall step.
    fall_timer: f64,
    soft_drop: bool,
}

impl GravityMode {
    pub fn new(settings: GravitySettings) -> Self {
        Self {
            settings,
            phase: GravityPhase::Falling,
            fall_timer: 0.0,
            soft_drop: false,
        }
    }

    pub fn settings(&self) -> GravitySettings {
        self.settings
    }

    pub fn phase(&self) -> GravityPhase {
        self.phase
    }

    pub fn is_soft_dropping(&self) -> bool {
        self.soft_drop
    }

    /// Seconds between fall steps at the current speed.
    pub fn fall_interval(&self) -> f64 {
        let multiplier = if self.soft_drop {
            self.settings.soft_drop
        } else {
            1.0
        };
        1.0 / (self.settings.gravity * multiplier).max(f64::EPSILON)
    }

    pub(super) fn end(&mut self, state: &mut GameState) {
        self.phase = GravityPhase::GameOver;
        self.soft_drop = false;
        state.finish_game();
    }

    fn try_move(state: &mut GameState, dx: i32, dy: i32) -> bool {
        state.current.move_by(dx, dy);
        if state.board.is_valid_position(&state.current) {
            return true;
        }
        state.current.move_by(-dx, -dy);
        false
    }

    fn try_rotate(state: &mut GameState, backwards: bool) {
        if backwards {
            state.current.undo_rotate();
        } else {
            state.current.rotate(1);
        }
        if state.board.is_valid_position(&state.current) {
            return;
        }
        if backwards {
            state.current.rotate(1);
        } else {
            state.current.undo_rotate();
        }
    }

    fn step_down(&mut self, state: &mut GameState) {
        if !Self::try_move(state, 0, 1) {
            self.phase = GravityPhase::Locking;
            self.lock(state);
        }
    }

    /// Commit the active piece and bring in the next one.
    fn lock(&mut self, state: &mut GameState) {
        let piece = state.current.clone();
        state.place(&piece);
        self.fall_timer = 0.0;
        if state.spawn_next() {
            self.phase = GravityPhase::Falling;
        } else {
            self.end(state);
        }
    }
}

impl PlayMode for GravityMode {
    fn on_tick(&mut self, state: &mut GameState, dt: f64) {
        if self.phase == GravityPhase::GameOver {
            return;
        }
        if state.game_over {
            self.phase = GravityPhase::GameOver;
            return;
        }
        self.fall_timer += dt.max(0.0);
        if self.fall_timer >= self.fall_interval() {
            self.fall_timer = 0.0;
            self.step_down(state);
        }
    }

    fn on_input(&mut self, state: &mut GameState, event: InputEvent) -> Option<Command> {
        if self.phase == GravityPhase::GameOver {
            return session_command(event);
        }
        match event {
            InputEvent::MoveLeft => {
                Self::try_move(state, -1, 0);
            }
            InputEvent::MoveRight => {
                Self::try_move(state, 1, 0);
            }
            InputEvent::Rotate => Self::try_rotate(state, false),
            InputEvent::RotateBack => Self::try_rotate(state, true),
            InputEvent::SoftDropStart => self.soft_drop = true,
            InputEvent::SoftDropStop => self.soft_drop = false,
            InputEvent::HardDrop => {
                while Self::try_move(state, 0, 1) {}
                self.phase = GravityPhase::Locking;
                self.lock(state);
            }
            _ => return session_command(event),
        }
        None
    }

    fn is_over(&self) -> bool {
        self.phase == GravityPhase::GameOver
    }

    fn reset(&mut self) {
        *self = Self::new(self.settings);
    }

    fn cancel(&mut self, _state: &mut GameState) {
        self.soft_drop = false;
        self.fall_timer = 0.0;
    }

    fn kind(&self) -> ModeKind {
        ModeKind::Gravity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::GameConfig;
    use crate::game::Cue;
    use crate::piece::Piece;
    use crate::score::ScoreLedger;
    use crate::shapes::ShapeId;

    fn state() -> GameState {
        let config = GameConfig {
            seed: Some(4),
            ..GameConfig::default()
        };
        let mut s = GameState::new(&config, ScoreLedger::in_memory(Vec::new())).unwrap();
        // I piece, vertical: column x + 1, rows y..y + 3.
        s.current = Piece::new(ShapeId::I, 3, 0, 1);
        s
    }

    fn mode() -> GravityMode {
        GravityMode::new(GravitySettings {
            gravity: 2.0,
            soft_drop: 4.0,
        })
    }

    #[test]
    fn falls_once_per_interval() {
        let mut s = state();
        let mut m = mode();
        m.on_tick(&mut s, 0.3);
        assert_eq!(s.current.y, 0);
        m.on_tick(&mut s, 0.3);
        assert_eq!(s.current.y, 1);
        // Timer restarts from zero, no carried remainder.
        m.on_tick(&mut s, 0.3);
        assert_eq!(s.current.y, 1);
    }

    #[test]
    fn soft_drop_speeds_up_fall() {
        let mut s = state();
        let mut m = mode();
        m.on_input(&mut s, InputEvent::SoftDropStart);
        assert!((m.fall_interval() - 0.125).abs() < 1e-9);
        m.on_tick(&mut s, 0.13);
        assert_eq!(s.current.y, 1);
        m.on_input(&mut s, InputEvent::SoftDropStop);
        assert!((m.fall_interval() - 0.5).abs() < 1e-9);
    }

    #[test]
    fn walls_roll_back_moves() {
        let mut s = state();
        let mut m = mode();
        for _ in 0..10 {
            m.on_input(&mut s, InputEvent::MoveLeft);
        }
        assert_eq!(s.current.x, -1);
        assert!(s.board.is_valid_position(&s.current));
        for _ in 0..20 {
            m.on_input(&mut s, InputEvent::MoveRight);
        }
        assert_eq!(s.current.x, 8);
    }

    #[test]
    fn blocked_rotation_is_undone() {
        let mut s = state();
        let mut m = mode();
        s.board.set(3, 1, 5);
        m.on_input(&mut s, InputEvent::Rotate);
        assert_eq!(s.current.rotation, 0);
        s.board.set(3, 1, 0);
        m.on_input(&mut s, InputEvent::Rotate);
        assert_eq!(s.current.rotation, 1);
        m.on_input(&mut s, InputEvent::RotateBack);
        assert_eq!(s.current.rotation, 0);
    }

    #[test]
    fn landing_locks_and_spawns() {
        let mut s = state();
        let mut m = mode();
        s.current.y = 16;
        let next = s.queue[0].shape;
        m.on_tick(&mut s, 0.5);
        assert_eq!(m.phase(), GravityPhase::Falling);
        for y in 16..20 {
            assert_eq!(s.board.get(4, y), Some(1));
        }
        assert_eq!(s.current.shape, next);
        assert_eq!((s.current.x, s.current.y), (3, 0));
        assert!(s.drain_cues().contains(&Cue::PlaceBlock));
    }

    #[test]
    fn hard_drop_locks_at_the_bottom() {
        let mut s = state();
        let mut m = mode();
        m.on_input(&mut s, InputEvent::HardDrop);
        for y in 16..20 {
            assert_eq!(s.board.get(4, y), Some(1));
        }
        assert_eq!(s.board.get(4, 15), Some(0));
    }

    #[test]
    fn hard_drop_clears_a_line() {
        let mut s = state();
        let mut m = mode();
        for x in (0..10).filter(|&x| x != 4) {
            s.board.set(x, 19, 2);
        }
        m.on_input(&mut s, InputEvent::HardDrop);
        assert_eq!(s.ledger.score(), 1);
        for y in 17..20 {
            assert_eq!(s.board.get(4, y), Some(1));
        }
        assert_eq!(s.board.get(0, 19), Some(0));
    }

    #[test]
    fn bomb_lock_detonates_and_respawns() {
        let mut s = state();
        let mut m = mode();
        for x in 0..10 {
            s.board.set(x, 19, 2);
            s.board.set(x, 18, 2);
        }
        s.board.set(4, 18, 0);
        s.board.set(4, 19, 0);
        s.current = Piece::bomb(ShapeId::Dot, 3, 16, 3);
        m.on_input(&mut s, InputEvent::HardDrop);
        assert_eq!(s.board.get(4, 19), Some(0));
        assert_eq!(s.board.get(3, 18), Some(0));
        assert_eq!(s.board.get(2, 18), Some(2));
        assert_eq!(s.ledger.score(), 0);
        assert_eq!(m.phase(), GravityPhase::Falling);
        assert_eq!((s.current.x, s.current.y), (3, 0));
        assert!(s.drain_cues().contains(&Cue::Explosion));
    }

    #[test]
    fn blocked_spawn_ends_the_game_once() {
        let mut s = state();
        let mut m = mode();
        // One hole per row, staggered so no row or column is full.
        for y in 1..20 {
            for x in (0..10).filter(|&x| x != y % 10) {
                s.board.set(x, y, 2);
            }
        }
        s.current = Piece::new(ShapeId::Dot, 3, 0, 1);
        m.on_input(&mut s, InputEvent::HardDrop);
        assert!(m.is_over());
        assert!(s.game_over);
        let cues = s.drain_cues();
        assert_eq!(cues.iter().filter(|&&c| c == Cue::GameOver).count(), 1);
        assert!(cues.contains(&Cue::StopMusic));

        m.on_tick(&mut s, 5.0);
        m.on_input(&mut s, InputEvent::MoveLeft);
        assert!(s.drain_cues().is_empty());
    }

    #[test]
    fn game_over_only_answers_session_commands() {
        let mut s = state();
        let mut m = mode();
        m.end(&mut s);
        let before = s.current.clone();
        assert_eq!(m.on_input(&mut s, InputEvent::MoveLeft), None);
        assert_eq!(m.on_input(&mut s, InputEvent::HardDrop), None);
        assert_eq!(s.current, before);
        assert_eq!(m.on_input(&mut s, InputEvent::Quit), Some(Command::Quit));
        assert_eq!(m.on_input(&mut s, InputEvent::Restart), Some(Command::Restart));
    }

    #[test]
    fn reset_returns_to_falling() {
        let mut s = state();
        let mut m = mode();
        m.on_input(&mut s, InputEvent::SoftDropStart);
        m.end(&mut s);
        m.reset();
        assert_eq!(m.phase(), GravityPhase::Falling);
        assert!(!m.is_soft_dropping());
        assert_eq!(m.settings(), mode().settings());
    }
}
