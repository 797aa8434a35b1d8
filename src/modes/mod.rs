//! Play modes: the shared contract, input events, and mode switching.

pub mod drag;
pub mod gravity;
pub mod name_entry;

use crate::ModeKind;
use crate::game::{Cue, GameState};
use drag::DragMode;
use gravity::{GravityMode, GravitySettings};

/// Discrete input for a play mode. Pointer coordinates are in board cell
/// units (column, row) relative to the board's top-left corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    MoveLeft,
    MoveRight,
    Rotate,
    RotateBack,
    SoftDropStart,
    SoftDropStop,
    HardDrop,
    PointerDown { x: f32, y: f32 },
    PointerMove { x: f32, y: f32 },
    PointerUp { x: f32, y: f32 },
    Quit,
    Restart,
    ToggleTheme,
    SwitchMode,
}

/// Request for the host loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Quit,
    Restart,
}

pub trait PlayMode {
    fn on_tick(&mut self, state: &mut GameState, dt: f64);
    fn on_input(&mut self, state: &mut GameState, event: InputEvent) -> Option<Command>;
    fn is_over(&self) -> bool;
    /// Back to the starting phase after a restart.
    fn reset(&mut self);
    /// Drop any in-flight interaction without touching the board.
    fn cancel(&mut self, state: &mut GameState);
    fn kind(&self) -> ModeKind;
}

/// Commands every mode honours, in play or after game over.
fn session_command(event: InputEvent) -> Option<Command> {
    match event {
        InputEvent::Quit => Some(Command::Quit),
        InputEvent::Restart => Some(Command::Restart),
        _ => None,
    }
}

/// The active mode.
#[derive(Debug, Clone)]
pub enum Mode {
    Gravity(GravityMode),
    Drag(DragMode),
}

impl Mode {
    pub fn new(kind: ModeKind, settings: GravitySettings) -> Self {
        match kind {
            ModeKind::Gravity => Self::Gravity(GravityMode::new(settings)),
            ModeKind::Drag => Self::Drag(DragMode::new(settings)),
        }
    }

    fn play(&self) -> &dyn PlayMode {
        match self {
            Self::Gravity(m) => m,
            Self::Drag(m) => m,
        }
    }

    fn play_mut(&mut self) -> &mut dyn PlayMode {
        match self {
            Self::Gravity(m) => m,
            Self::Drag(m) => m,
        }
    }

    pub fn kind(&self) -> ModeKind {
        self.play().kind()
    }

    pub fn is_over(&self) -> bool {
        self.play().is_over()
    }

    pub fn on_tick(&mut self, state: &mut GameState, dt: f64) {
        self.play_mut().on_tick(state, dt);
    }

    /// Mode switches are handled here; everything else goes to the active mode.
    pub fn on_input(&mut self, state: &mut GameState, event: InputEvent) -> Option<Command> {
        if event == InputEvent::SwitchMode {
            self.switch(state);
            return None;
        }
        self.play_mut().on_input(state, event)
    }

    pub fn reset(&mut self) {
        self.play_mut().reset();
    }

    fn settings(&self) -> GravitySettings {
        match self {
            Self::Gravity(m) => m.settings(),
            Self::Drag(m) => m.settings(),
        }
    }

    /// Swap gravity and drag on the same board and score. Entering gravity
    /// puts the active piece back at the spawn point; if it no longer fits
    /// the session ends. Ignored after game over.
    pub fn switch(&mut self, state: &mut GameState) {
        if state.game_over || self.is_over() {
            return;
        }
        self.play_mut().cancel(state);
        let settings = self.settings();
        state.push_cue(Cue::ModeSwitch);
        *self = match self.kind() {
            ModeKind::Gravity => {
                state.set_drag_queue(true);
                Self::Drag(DragMode::new(settings))
            }
            ModeKind::Drag => {
                state.set_drag_queue(false);
                let mut gravity = GravityMode::new(settings);
                if !state.respawn_current() {
                    gravity.end(state);
                }
                Self::Gravity(gravity)
            }
        };
    }
}
