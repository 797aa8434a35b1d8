//! Tetris Boom: falling-block puzzle in the terminal, with a gravity mode and a
//! drag-and-drop block-blast mode sharing one board, score and leaderboard.

mod app;
mod board;
mod factory;
mod game;
mod highscores;
mod input;
mod modes;
mod piece;
mod score;
mod shapes;
mod theme;
mod ui;

use anyhow::Result;
use app::App;
use clap::builder::RangedU64ValueParser;
use clap::{Parser, ValueEnum};
use highscores::LeaderboardStore;
use modes::gravity::{DEFAULT_GRAVITY, DEFAULT_SOFT_DROP, GravitySettings};
use score::ScoreLedger;

/// Largest board side the CLI accepts.
const MAX_BOARD_SIDE: u64 = 100;
/// Largest queue the CLI accepts.
const MAX_QUEUE: u64 = 10;

/// Options derived from CLI that affect game behaviour (board size, speed, queue, bombs).
#[derive(Debug, Clone)]
pub struct GameConfig {
    pub mode: ModeKind,
    pub rows: usize,
    pub cols: usize,
    /// Rows per second in gravity mode.
    pub gravity: f64,
    pub soft_drop: f64,
    /// Game logic ticks per second.
    pub tick_rate: f64,
    pub queue_len: usize,
    /// Probability that a new piece is a bomb.
    pub bomb_chance: f64,
    pub seed: Option<u64>,
    /// Skips the name prompt when set.
    pub player: Option<String>,
    pub no_animation: bool,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            mode: ModeKind::Gravity,
            rows: 20,
            cols: 10,
            gravity: DEFAULT_GRAVITY,
            soft_drop: DEFAULT_SOFT_DROP,
            tick_rate: 30.0,
            queue_len: 3,
            bomb_chance: 0.05,
            seed: None,
            player: None,
            no_animation: false,
        }
    }
}

impl GameConfig {
    pub fn gravity_settings(&self) -> GravitySettings {
        GravitySettings {
            gravity: self.gravity,
            soft_drop: self.soft_drop,
        }
    }
}

impl From<&Args> for GameConfig {
    fn from(args: &Args) -> Self {
        Self {
            mode: args.mode,
            rows: args.rows,
            cols: args.cols,
            gravity: args.gravity,
            soft_drop: args.soft_drop,
            tick_rate: args.tick_rate,
            queue_len: args.queue,
            bomb_chance: args.bomb_chance,
            seed: args.seed,
            player: args.player.clone(),
            no_animation: args.no_animation,
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    let themes = theme::ThemeSet::load(args.theme.as_deref(), args.dark)
        .unwrap_or_else(|_| theme::ThemeSet::new(args.dark));
    let store = LeaderboardStore::new(
        args.leaderboard
            .clone()
            .unwrap_or_else(highscores::default_path),
    );
    let mut ledger = ScoreLedger::with_store(store);
    if let Some(name) = &args.player {
        ledger.set_player_name(name.as_str());
    }
    let config = GameConfig::from(&args);
    let mut app = App::new(config, themes, ledger)?;
    app.run()?;
    Ok(())
}

/// Falling-block puzzle in the terminal.
#[derive(Debug, Parser)]
#[command(
    name = "tetris-boom",
    version,
    about = "Falling-block puzzle in the terminal: classic gravity play or drag-and-drop block blast on the same board.",
    long_about = "Tetris Boom is a terminal puzzle game with two ways to play on one board.\n\n\
        Full rows AND full columns clear. Clearing N lines with one placement scores N² \
        points. Bomb pieces blow a hole in the stack instead of landing.\n\n\
        GRAVITY mode:\n  Left/Right h/l  Move    Up k x   Rotate    z u     Rotate back\n  Down j          Soft drop  Space/Enter  Hard drop\n\n\
        BLOCK BLAST mode:\n  Drag a piece from the queue with the mouse and drop it on the board.\n  The game ends when no queued piece fits anywhere.\n\n\
        ALWAYS:\n  m / Tab  Switch mode   t  Toggle theme   r  Restart   q / Esc  Quit\n\n\
        Use --theme to load a btop-style theme (theme[key]=\"#rrggbb\") for the dark palette."
)]
pub struct Args {
    /// Starting mode: gravity (falling pieces) or drag (block blast).
    #[arg(short, long, default_value = "gravity")]
    pub mode: ModeKind,

    /// Board height in cells (1-100).
    #[arg(long, default_value = "20", value_name = "ROWS",
        value_parser = RangedU64ValueParser::<usize>::new().range(1..=MAX_BOARD_SIDE))]
    pub rows: usize,

    /// Board width in cells (1-100).
    #[arg(long, default_value = "10", value_name = "COLS",
        value_parser = RangedU64ValueParser::<usize>::new().range(1..=MAX_BOARD_SIDE))]
    pub cols: usize,

    /// Fall speed in rows per second.
    #[arg(long, default_value = "1.5", value_name = "RATE")]
    pub gravity: f64,

    /// Speed multiplier while soft drop is held.
    #[arg(long, default_value = "5.0", value_name = "FACTOR")]
    pub soft_drop: f64,

    /// Game logic ticks per second.
    #[arg(long, default_value = "30.0", value_name = "RATE")]
    pub tick_rate: f64,

    /// Number of queued pieces (1-10).
    #[arg(long, default_value = "3", value_name = "N",
        value_parser = RangedU64ValueParser::<usize>::new().range(1..=MAX_QUEUE))]
    pub queue: usize,

    /// Probability (0..1) that a new piece is a bomb.
    #[arg(long, default_value = "0.05", value_name = "P")]
    pub bomb_chance: f64,

    /// Seed for the piece generator (reproducible games).
    #[arg(long, value_name = "SEED")]
    pub seed: Option<u64>,

    /// Player name; skips the name prompt.
    #[arg(short, long, value_name = "NAME")]
    pub player: Option<String>,

    /// Leaderboard file. Defaults to tetris-boom/leaderboard.json in the config directory.
    #[arg(long, value_name = "FILE")]
    pub leaderboard: Option<std::path::PathBuf>,

    /// Path to theme file (btop-style theme[key]=\"value\"), applied to the dark palette.
    #[arg(short, long, value_name = "FILE")]
    pub theme: Option<std::path::PathBuf>,

    /// Start with the dark palette.
    #[arg(long)]
    pub dark: bool,

    /// Disable the line-clear flash.
    #[arg(long)]
    pub no_animation: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ModeKind {
    #[default]
    #[value(alias = "tetris")]
    Gravity,

    #[value(alias = "blockblast", alias = "block-blast")]
    Drag,
}

impl ModeKind {
    pub fn name(self) -> &'static str {
        match self {
            Self::Gravity => "Gravity",
            Self::Drag => "Block Blast",
        }
    }
}
