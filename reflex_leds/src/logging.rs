use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::types::*;

#[derive(Debug, thiserror::Error)]
pub enum LogError {
    #[error("failed to write session log {path}: {source}")]
    Io { path: String, source: std::io::Error },
    #[error("session log is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// One resolved prompt.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct RoundLog {
    pub round: RoundId,
    pub mode: GameMode,
    pub target: Direction,
    pub started_ms: u64,
    pub resolved_ms: u64,
    pub outcome: RoundOutcome,
    pub correct_order: Vec<PlayerId>,
    pub window_after_ms: u64,
}

/// Diagnostic journal of every resolved round since the last reset.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct SessionLog {
    pub mode: GameMode,
    pub rounds: Vec<RoundLog>,
}

impl SessionLog {
    pub fn new(mode: GameMode) -> Self { Self { mode, rounds: Vec::new() } }

    pub fn push(&mut self, entry: RoundLog) { self.rounds.push(entry); }

    pub fn clear(&mut self, mode: GameMode) {
        self.mode = mode;
        self.rounds.clear();
    }

    pub fn to_json(&self) -> Result<String, LogError> { Ok(serde_json::to_string_pretty(self)?) }
    pub fn from_json(s: &str) -> Result<Self, LogError> { Ok(serde_json::from_str(s)?) }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), LogError> {
        let path = path.as_ref();
        fs::write(path, self.to_json()?).map_err(|source| LogError::Io { path: path.display().to_string(), source })
    }

    pub fn timeouts(&self) -> usize {
        self.rounds.iter().filter(|r| r.outcome == RoundOutcome::TimedOut).count()
    }
}
