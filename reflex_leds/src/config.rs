use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::types::GameMode;

pub const MAX_PLAYERS: usize = 4;
pub const BRIEF_PAUSE_MS: u64 = 200;
pub const SECONDARY_WINDOW_MS: u64 = 800;
pub const DROPOUT_THRESHOLD: u32 = 3;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io { path: String, source: std::io::Error },
    #[error("malformed config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("{mode} tuning must satisfy 0 < floor <= initial <= ceiling (got {min}/{initial}/{max})")]
    InvalidTuning { mode: GameMode, min: u64, initial: u64, max: u64 },
    #[error("max_players must be between 1 and 255")]
    InvalidPlayerCap,
}

/// Response window bounds and per-outcome adjustments for one mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModeTuning {
    pub initial_window_ms: u64,
    pub min_window_ms: u64,
    pub max_window_ms: u64,
    /// Subtracted on a successful round.
    pub correct_step_ms: u64,
    pub wrong_step_ms: u64,
    pub timeout_step_ms: u64,
}

impl ModeTuning {
    pub const COMPETITIVE: Self = Self {
        initial_window_ms: 1500,
        min_window_ms: 250,
        max_window_ms: 2500,
        correct_step_ms: 30,
        wrong_step_ms: 50,
        timeout_step_ms: 75,
    };

    pub const COOPERATIVE: Self = Self {
        initial_window_ms: 2000,
        min_window_ms: 600,
        max_window_ms: 3000,
        correct_step_ms: 50,
        wrong_step_ms: 0,
        timeout_step_ms: 100,
    };

    pub const POINTS: Self = Self {
        initial_window_ms: 1500,
        min_window_ms: 400,
        max_window_ms: 2500,
        correct_step_ms: 30,
        wrong_step_ms: 0,
        timeout_step_ms: 75,
    };

    fn validate(&self, mode: GameMode) -> Result<(), ConfigError> {
        if self.min_window_ms > 0
            && self.min_window_ms <= self.initial_window_ms && self.initial_window_ms <= self.max_window_ms {
            Ok(())
        } else {
            Err(ConfigError::InvalidTuning {
                mode,
                min: self.min_window_ms,
                initial: self.initial_window_ms,
                max: self.max_window_ms,
            })
        }
    }
}

/// Reaction model for a simulated player.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BotTuning {
    pub mean_ms: u64,
    pub jitter_ms: u64,
    pub wrong_pct: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub max_players: usize,
    pub brief_pause_ms: u64,
    pub secondary_window_ms: u64,
    pub dropout_threshold: u32,
    /// Fixed seed for prompt selection; entropy when absent.
    pub seed: Option<u64>,
    pub competitive: ModeTuning,
    pub cooperative: ModeTuning,
    pub points: ModeTuning,
    pub novice: BotTuning,
    pub skilled: BotTuning,
    pub master: BotTuning,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            max_players: MAX_PLAYERS,
            brief_pause_ms: BRIEF_PAUSE_MS,
            secondary_window_ms: SECONDARY_WINDOW_MS,
            dropout_threshold: DROPOUT_THRESHOLD,
            seed: None,
            competitive: ModeTuning::COMPETITIVE,
            cooperative: ModeTuning::COOPERATIVE,
            points: ModeTuning::POINTS,
            novice: BotTuning { mean_ms: 520, jitter_ms: 120, wrong_pct: 0.15 },
            skilled: BotTuning { mean_ms: 380, jitter_ms: 80, wrong_pct: 0.05 },
            master: BotTuning { mean_ms: 260, jitter_ms: 40, wrong_pct: 0.0 },
        }
    }
}

impl GameConfig {
    pub fn tuning(&self, mode: GameMode) -> ModeTuning {
        match mode {
            GameMode::Competitive => self.competitive,
            GameMode::Cooperative => self.cooperative,
            GameMode::Points => self.points,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_players == 0 || self.max_players > usize::from(u8::MAX) {
            return Err(ConfigError::InvalidPlayerCap);
        }
        self.competitive.validate(GameMode::Competitive)?;
        self.cooperative.validate(GameMode::Cooperative)?;
        self.points.validate(GameMode::Points)
    }

    pub fn from_json(s: &str) -> Result<Self, ConfigError> {
        let cfg: GameConfig = serde_json::from_str(s)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&content)
    }
}
