//! App: terminal init, main loop, tick, key and mouse handling.

use crate::GameConfig;
use crate::game::{Cue, GameState};
use crate::input::{key_release_to_event, key_to_event, key_to_name_key, mouse_to_event};
use crate::modes::name_entry::{NameEntry, NameOutcome};
use crate::modes::{Command, InputEvent, Mode};
use crate::score::ScoreLedger;
use crate::theme::ThemeSet;
use crate::ui::{self, BoardGeometry, Flash, View};
use anyhow::Result;
use crossterm::event::{self, Event, KeyEvent, KeyEventKind};
use ratatui::DefaultTerminal;
use std::time::{Duration, Instant};

/// How long a cue banner stays in the sidebar.
const BANNER_MS: u64 = 1500;
/// Without key-release events, soft drop ends this long after the last Down press.
const SOFT_DROP_HOLD_MS: u64 = 500;
/// Render at ~60 FPS.
const FRAME_MS: u64 = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    NameEntry,
    Playing,
}

pub struct App {
    config: GameConfig,
    themes: ThemeSet,
    state: GameState,
    mode: Mode,
    screen: Screen,
    name_entry: NameEntry,
    /// Geometry of the last frame, for mouse mapping.
    geometry: BoardGeometry,
    flash: Flash,
    banner: Option<(Cue, Instant)>,
    last_tick: Instant,
    /// Last Down press while the terminal cannot report releases.
    soft_drop_pressed: Option<Instant>,
    reports_release: bool,
}

impl App {
    pub fn new(config: GameConfig, themes: ThemeSet, ledger: ScoreLedger) -> Result<Self> {
        let state = GameState::new(&config, ledger)?;
        let mode = Mode::new(config.mode, config.gravity_settings());
        let screen = if config.player.is_some() {
            Screen::Playing
        } else {
            Screen::NameEntry
        };
        Ok(Self {
            config,
            themes,
            state,
            mode,
            screen,
            name_entry: NameEntry::new(),
            geometry: BoardGeometry::default(),
            flash: Flash::default(),
            banner: None,
            last_tick: Instant::now(),
            soft_drop_pressed: None,
            reports_release: false,
        })
    }

    pub fn run(&mut self) -> Result<()> {
        use crossterm::{
            event::{
                DisableMouseCapture, EnableMouseCapture, KeyboardEnhancementFlags,
                PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
            },
            execute,
            terminal::{
                EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
                supports_keyboard_enhancement,
            },
        };

        enable_raw_mode()?;
        let mut stdout = std::io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;

        // Release events end soft drop; not every terminal has them.
        self.reports_release = supports_keyboard_enhancement().unwrap_or(false);
        let _ = execute!(
            stdout,
            PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
        );

        let mut terminal =
            ratatui::DefaultTerminal::new(ratatui::backend::CrosstermBackend::new(stdout))?;

        let result = self.run_loop(&mut terminal);
        self.state.save_leaderboard();

        // Restore
        let _ = execute!(std::io::stdout(), PopKeyboardEnhancementFlags);
        execute!(std::io::stdout(), DisableMouseCapture, LeaveAlternateScreen)?;
        disable_raw_mode()?;

        result
    }

    fn run_loop(&mut self, terminal: &mut DefaultTerminal) -> Result<()> {
        let tick_interval = Duration::from_secs_f64(1.0 / self.config.tick_rate.max(1.0));
        loop {
            let now = Instant::now();
            self.draw(terminal, now)?;

            let timeout = Duration::from_millis(FRAME_MS).saturating_sub(now.elapsed());
            if event::poll(timeout)? {
                while event::poll(Duration::ZERO)? {
                    if self.handle_event(event::read()?) {
                        return Ok(());
                    }
                }
            }

            if self.screen == Screen::Playing && self.last_tick.elapsed() >= tick_interval {
                self.tick();
            }
        }
    }

    fn draw(&mut self, terminal: &mut DefaultTerminal, now: Instant) -> Result<()> {
        let view = View {
            state: &self.state,
            mode: &self.mode,
            theme: self.themes.current(),
            banner: self.banner.map(|(cue, _)| cue),
            name_entry: (self.screen == Screen::NameEntry).then_some(&self.name_entry),
        };
        let flash = &mut self.flash;
        let mut geometry = self.geometry;
        terminal.draw(|f| {
            geometry = ui::draw(f, &view, flash, now);
        })?;
        self.geometry = geometry;
        Ok(())
    }

    /// Returns true when the app should exit.
    fn handle_event(&mut self, ev: Event) -> bool {
        match (self.screen, ev) {
            (Screen::NameEntry, Event::Key(key)) => {
                self.handle_name_key(key);
                false
            }
            (Screen::Playing, Event::Key(key)) => {
                let input = match key.kind {
                    KeyEventKind::Press | KeyEventKind::Repeat => key_to_event(key),
                    KeyEventKind::Release => key_release_to_event(key),
                };
                input.is_some_and(|input| self.apply_input(input))
            }
            (Screen::Playing, Event::Mouse(mouse)) => {
                mouse_to_event(mouse, &self.geometry).is_some_and(|input| self.apply_input(input))
            }
            _ => false,
        }
    }

    fn handle_name_key(&mut self, key: KeyEvent) {
        if key.kind == KeyEventKind::Release {
            return;
        }
        let Some(name_key) = key_to_name_key(key) else {
            return;
        };
        if let NameOutcome::Done(name) = self.name_entry.handle(name_key) {
            self.state.ledger.set_player_name(name);
            self.screen = Screen::Playing;
            self.last_tick = Instant::now();
        }
    }

    /// Returns true on quit.
    fn apply_input(&mut self, input: InputEvent) -> bool {
        match input {
            InputEvent::ToggleTheme => {
                self.themes.toggle();
                return false;
            }
            InputEvent::SoftDropStart if !self.reports_release => {
                self.soft_drop_pressed = Some(Instant::now());
            }
            _ => {}
        }
        match self.mode.on_input(&mut self.state, input) {
            Some(Command::Quit) => true,
            Some(Command::Restart) => {
                self.restart();
                false
            }
            None => {
                self.collect_cues();
                false
            }
        }
    }

    fn restart(&mut self) {
        self.state.reset();
        self.mode.reset();
        self.flash.clear();
        self.banner = None;
        self.soft_drop_pressed = None;
        self.last_tick = Instant::now();
    }

    fn tick(&mut self) {
        let now = Instant::now();
        let dt = now.duration_since(self.last_tick).as_secs_f64();
        self.last_tick = now;

        if let Some(pressed) = self.soft_drop_pressed {
            if now.duration_since(pressed) >= Duration::from_millis(SOFT_DROP_HOLD_MS) {
                self.soft_drop_pressed = None;
                self.mode.on_input(&mut self.state, InputEvent::SoftDropStop);
            }
        }

        self.mode.on_tick(&mut self.state, dt);
        self.collect_cues();

        if let Some((_, shown)) = self.banner {
            if now.duration_since(shown) >= Duration::from_millis(BANNER_MS) {
                self.banner = None;
            }
        }
    }

    /// Move cues to the banner and start the flash for a fresh clear.
    fn collect_cues(&mut self) {
        let now = Instant::now();
        for cue in self.state.drain_cues() {
            if cue.is_banner() {
                self.banner = Some((cue, now));
            }
        }
        if let Some(scan) = self.state.take_last_clear() {
            if !self.config.no_animation {
                self.flash.start(&scan, self.geometry, self.themes.current());
            }
        }
    }
}
