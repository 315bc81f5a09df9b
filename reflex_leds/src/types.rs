use core::fmt;
use core::str::FromStr;
use serde::{Deserialize, Serialize};

/// Dense, 1-based, assigned in join order.
pub type PlayerId = u8;

/// Monotonic identity of a drawn prompt within a session.
pub type RoundId = u64;

#[derive(Copy, Clone, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Direction { North, West, East, South }

impl Direction {
    pub const ALL: [Direction; 4] = [Direction::North, Direction::West, Direction::East, Direction::South];
}

#[derive(Copy, Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum GameMode {
    #[default]
    Competitive,
    Cooperative,
    Points,
}

#[derive(Copy, Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum RoundPhase {
    /// No players, or nothing scheduled.
    Idle,
    /// Target lit, deadline running.
    Prompting,
    /// Target hidden, late attempts still accepted (points mode only).
    Closing,
    /// Short pause before the next prompt.
    Resolving,
    /// Cooperative: every player dropped out; waiting for any press.
    AwaitingRejoin,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum RoundOutcome {
    /// Competitive: first correct press took the round.
    Claimed { winner: PlayerId, reaction_ms: u64 },
    /// Cooperative: every active player answered correctly.
    Cleared,
    /// Points: at least one correct respondent, with awards in order.
    Scored { awards: Vec<(PlayerId, u32)> },
    /// Points: everyone attempted, nobody was right.
    Exhausted,
    TimedOut,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Direction::North => "North",
            Direction::West => "West",
            Direction::East => "East",
            Direction::South => "South",
        };
        write!(f, "{}", s)
    }
}

impl fmt::Display for GameMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            GameMode::Competitive => "competitive",
            GameMode::Cooperative => "cooperative",
            GameMode::Points => "points",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for GameMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "competitive" => Ok(GameMode::Competitive),
            "cooperative" | "coop" => Ok(GameMode::Cooperative),
            "points" => Ok(GameMode::Points),
            _ => Err(format!(
                "Invalid game mode: '{}'. Must be 'competitive', 'cooperative', or 'points'",
                s
            )),
        }
    }
}
