//! Score ledger: quadratic line rewards, session high-score cue, top-3 leaderboard.

use crate::game::Cue;
use crate::highscores::{LeaderboardEntry, LeaderboardError, LeaderboardStore};
use std::path::Path;

/// Entries kept on the leaderboard.
pub const LEADERBOARD_SIZE: usize = 3;

pub const DEFAULT_PLAYER: &str = "Player";

/// Line-clear cue for a single placement.
pub fn clear_cue(lines: u32) -> Option<Cue> {
    match lines {
        0 => None,
        1..=3 => Some(Cue::LineClear1),
        4..=10 => Some(Cue::LineClear2),
        _ => Some(Cue::EasterEgg),
    }
}

#[derive(Debug, Clone)]
pub struct ScoreLedger {
    score: u64,
    player_name: String,
    leaderboard: Vec<LeaderboardEntry>,
    store: Option<LeaderboardStore>,
    /// Leaderboard best when the session started.
    session_best: u64,
    high_score_announced: bool,
}

impl ScoreLedger {
    /// Ledger backed by a file; the leaderboard is read once here.
    pub fn with_store(store: LeaderboardStore) -> Self {
        let entries = store.load();
        let mut ledger = Self::in_memory(entries);
        ledger.store = Some(store);
        ledger
    }

    /// Ledger with no persistence.
    pub fn in_memory(entries: Vec<LeaderboardEntry>) -> Self {
        let mut ledger = Self {
            score: 0,
            player_name: DEFAULT_PLAYER.to_string(),
            leaderboard: Vec::new(),
            store: None,
            session_best: 0,
            high_score_announced: false,
        };
        ledger.leaderboard = entries.into_iter().filter(|e| e.score > 0).collect();
        ledger.sort_and_truncate();
        ledger.session_best = ledger.highscore();
        ledger
    }

    pub fn set_player_name(&mut self, name: impl Into<String>) {
        self.player_name = name.into();
    }

    pub fn player_name(&self) -> &str {
        &self.player_name
    }

    /// Add `lines²` points for one placement and return the cues it triggers.
    pub fn add_points(&mut self, lines: u32) -> Vec<Cue> {
        let mut cues = vec![Cue::PlaceBlock];
        cues.extend(clear_cue(lines));
        self.score += u64::from(lines) * u64::from(lines);
        if self.check_new_high_score() {
            cues.push(Cue::NewHighScore);
        }
        cues
    }

    /// True exactly once per session: the first time the score passes the
    /// best score recorded before the session began.
    fn check_new_high_score(&mut self) -> bool {
        if self.high_score_announced || self.session_best == 0 || self.score <= self.session_best {
            return false;
        }
        self.high_score_announced = true;
        true
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    pub fn reset(&mut self) {
        self.score = 0;
        self.high_score_announced = false;
        self.session_best = self.highscore();
    }

    pub fn highscore(&self) -> u64 {
        self.leaderboard
            .iter()
            .map(|e| e.score)
            .filter(|&s| s > 0)
            .max()
            .unwrap_or(0)
    }

    /// Holder of the top leaderboard entry. Ties go to the earlier entry.
    pub fn highscore_player(&self) -> &str {
        self.leaderboard.first().map_or("", |e| e.name.as_str())
    }

    /// File the leaderboard is written to, if any.
    pub fn store_path(&self) -> Option<&Path> {
        self.store.as_ref().map(LeaderboardStore::path)
    }

    pub fn leaderboard(&self) -> &[LeaderboardEntry] {
        &self.leaderboard
    }

    pub fn high_score_announced(&self) -> bool {
        self.high_score_announced
    }

    /// Merge the current score into the leaderboard and persist it. Zero
    /// scores are ignored. The in-memory leaderboard is updated even when
    /// the write fails.
    pub fn update_leaderboard(&mut self) -> Result<(), LeaderboardError> {
        if self.score == 0 {
            return Ok(());
        }
        match self
            .leaderboard
            .iter_mut()
            .find(|e| e.name == self.player_name)
        {
            Some(entry) => entry.score = entry.score.max(self.score),
            None => self.leaderboard.push(LeaderboardEntry {
                name: self.player_name.clone(),
                score: self.score,
            }),
        }
        self.sort_and_truncate();
        match &self.store {
            Some(store) => store.save(&self.leaderboard),
            None => Ok(()),
        }
    }

    fn sort_and_truncate(&mut self) {
        self.leaderboard.sort_by(|a, b| b.score.cmp(&a.score));
        self.leaderboard.truncate(LEADERBOARD_SIZE);
    }
}
