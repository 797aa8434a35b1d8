//! Persist the leaderboard as JSON (XDG config or ~/.config/tetris-boom).

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

const DIRNAME: &str = "tetris-boom";
const FILENAME: &str = "leaderboard.json";

/// One leaderboard row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub name: String,
    pub score: u64,
}

#[derive(Debug, Error)]
pub enum LeaderboardError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Default leaderboard path (config dir / tetris-boom / leaderboard.json).
pub fn default_path() -> PathBuf {
    let base = match std::env::var("XDG_CONFIG_HOME") {
        Ok(xdg) if !xdg.is_empty() => PathBuf::from(xdg),
        _ => std::env::var("HOME")
            .map(|h| PathBuf::from(h).join(".config"))
            .unwrap_or_else(|_| PathBuf::from(".")),
    };
    base.join(DIRNAME).join(FILENAME)
}

/// File-backed leaderboard. Reads never fail; writes overwrite the whole file.
#[derive(Debug, Clone)]
pub struct LeaderboardStore {
    path: PathBuf,
}

impl LeaderboardStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Entries on disk. Missing or corrupt file ⇒ empty; entries with missing
    /// keys or a non-positive score are dropped.
    pub fn load(&self) -> Vec<LeaderboardEntry> {
        let Ok(content) = fs::read_to_string(&self.path) else {
            return Vec::new();
        };
        parse_entries(&content)
    }

    pub fn save(&self, entries: &[LeaderboardEntry]) -> Result<(), LeaderboardError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_string_pretty(entries)?;
        fs::write(&self.path, json)?;
        Ok(())
    }
}

fn parse_entries(content: &str) -> Vec<LeaderboardEntry> {
    let Ok(values) = serde_json::from_str::<Vec<serde_json::Value>>(content) else {
        return Vec::new();
    };
    values
        .into_iter()
        .filter_map(|v| serde_json::from_value::<LeaderboardEntry>(v).ok())
        .filter(|e| e.score > 0)
        .collect()
}
