use core::str::FromStr;

use rand::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::{BotTuning, GameConfig};
use crate::input::{ControlSource, RawInput};
use crate::state_machine::Session;
use crate::types::{Direction, RoundId, RoundPhase};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum BotProfile { Novice, Skilled, Master }

impl BotProfile {
    pub fn tuning(self, cfg: &GameConfig) -> BotTuning {
        match self {
            BotProfile::Novice => cfg.novice,
            BotProfile::Skilled => cfg.skilled,
            BotProfile::Master => cfg.master,
        }
    }
}

impl FromStr for BotProfile {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "novice" => Ok(BotProfile::Novice),
            "skilled" => Ok(BotProfile::Skilled),
            "master" => Ok(BotProfile::Master),
            _ => Err(format!("Invalid bot profile: '{}'", s)),
        }
    }
}

#[derive(Clone, Debug)]
struct Plan {
    round: RoundId,
    press_at_ms: u64,
    direction: Direction,
    done: bool,
}

/// Simulated player: watches the session like a person watching the LEDs
/// and answers each prompt after a sampled reaction time.
#[derive(Debug)]
pub struct Bot {
    rng: StdRng,
    profile: BotProfile,
    tuning: BotTuning,
    source: ControlSource,
    plan: Option<Plan>,
}

impl Bot {
    pub fn new(source: ControlSource, profile: BotProfile, cfg: &GameConfig, seed: u64) -> Self {
        Self { rng: StdRng::seed_from_u64(seed), profile, tuning: profile.tuning(cfg), source, plan: None }
    }

    pub fn source(&self) -> ControlSource { self.source }
    pub fn profile(&self) -> BotProfile { self.profile }

    /// Raw event to inject at `now_ms`, if the bot acts this frame.
    pub fn poll(&mut self, session: &Session, now_ms: u64) -> Option<RawInput> {
        if session.is_paused() {
            return None;
        }
        // not joined yet, or waiting for a rejoin press
        if session.players().find_by_source(self.source).is_none() || session.phase() == RoundPhase::AwaitingRejoin {
            return Some(self.source.raw_press(Direction::North));
        }
        let Some(round) = session.round() else {
            self.plan = None;
            return None;
        };
        if self.plan.as_ref().map(|p| p.round) != Some(round.id) {
            let reaction = self.sample_reaction_ms();
            let direction = self.decide_direction(round.target);
            self.plan = Some(Plan { round: round.id, press_at_ms: round.started_ms + reaction, direction, done: false });
        }
        let plan = self.plan.as_mut()?;
        if plan.done || now_ms < plan.press_at_ms {
            return None;
        }
        plan.done = true;
        Some(self.source.raw_press(plan.direction))
    }

    pub fn decide_direction(&mut self, target: Direction) -> Direction {
        let wrong_roll: f32 = self.rng.gen();
        if wrong_roll >= self.tuning.wrong_pct {
            return target;
        }
        let wrong: Vec<Direction> = Direction::ALL.into_iter().filter(|d| *d != target).collect();
        wrong[self.rng.gen_range(0..wrong.len())]
    }

    pub fn sample_reaction_ms(&mut self) -> u64 {
        // triangular noise around the mean
        let tri = self.rng.gen::<f32>() - self.rng.gen::<f32>();
        let jitter = (tri * self.tuning.jitter_ms as f32).round() as i64;
        (self.tuning.mean_ms as i64 + jitter).max(0) as u64
    }
}

/// Frame-stepped loop: bots act, then the session ticks. Returns the end time.
pub fn run_bots(session: &mut Session, bots: &mut [Bot], start_ms: u64, end_ms: u64, frame_ms: u64) -> u64 {
    let frame_ms = frame_ms.max(1);
    let mut now = start_ms;
    while now <= end_ms {
        for bot in bots.iter_mut() {
            if let Some(raw) = bot.poll(session, now) {
                session.handle_raw_input(&raw, now);
            }
        }
        session.tick(now);
        now += frame_ms;
    }
    now - frame_ms
}
