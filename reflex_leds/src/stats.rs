//! Read-only derivations over player counters, for display.

use serde::{Deserialize, Serialize};

use crate::player::Player;
use crate::types::PlayerId;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct PlayerStats {
    pub id: PlayerId,
    pub control_source: String,
    pub is_active: bool,
    pub correct: u32,
    pub wrong: u32,
    pub missed: u32,
    pub total_presses: u32,
    pub streak: u32,
    pub longest_streak: u32,
    pub score: u32,
    /// Correct / total presses, percent.
    pub accuracy_pct: Option<f64>,
    /// Correct / prompts issued, percent.
    pub prompt_ratio_pct: Option<f64>,
    pub average_ms: Option<f64>,
    pub fastest_ms: Option<u64>,
    pub slowest_ms: Option<u64>,
    pub median_ms: Option<u64>,
    pub p90_ms: Option<u64>,
}

pub fn accuracy(correct: u32, total: u32) -> Option<f64> {
    (total > 0).then(|| f64::from(correct) / f64::from(total) * 100.0)
}

pub fn average(times: &[u64]) -> Option<f64> {
    if times.is_empty() { return None; }
    Some(times.iter().sum::<u64>() as f64 / times.len() as f64)
}

/// Nearest-rank percentile, `pct` in `0..=100`.
pub fn percentile(times: &[u64], pct: f64) -> Option<u64> {
    if times.is_empty() { return None; }
    let mut sorted = times.to_vec();
    sorted.sort_unstable();
    let rank = ((pct.clamp(0.0, 100.0) / 100.0) * sorted.len() as f64).ceil() as usize;
    Some(sorted[rank.clamp(1, sorted.len()) - 1])
}

impl PlayerStats {
    pub fn from_player(p: &Player, total_prompts: u64) -> Self {
        let prompt_ratio_pct = (total_prompts > 0).then(|| f64::from(p.correct_count) / total_prompts as f64 * 100.0);
        Self {
            id: p.id,
            control_source: p.control_source.to_string(),
            is_active: p.is_active,
            correct: p.correct_count,
            wrong: p.wrong_count,
            missed: p.missed_count,
            total_presses: p.total_presses,
            streak: p.streak,
            longest_streak: p.longest_streak,
            score: p.score,
            accuracy_pct: accuracy(p.correct_count, p.total_presses),
            prompt_ratio_pct,
            average_ms: average(&p.reaction_times),
            fastest_ms: p.reaction_times.iter().min().copied(),
            slowest_ms: p.reaction_times.iter().max().copied(),
            median_ms: percentile(&p.reaction_times, 50.0),
            p90_ms: percentile(&p.reaction_times, 90.0),
        }
    }
}
