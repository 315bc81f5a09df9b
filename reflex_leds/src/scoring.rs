use core::fmt;
use std::collections::BTreeSet;

use tracing::info;

use crate::config::{GameConfig, ModeTuning};
use crate::player::PlayerRegistry;
use crate::types::{Direction, GameMode, PlayerId, RoundId, RoundOutcome};

/// Points for the 1st/2nd/3rd/4th correct respondent; later ones get the last entry.
pub const POINTS_LADDER: [u32; 4] = [4, 3, 2, 1];

pub fn points_for_place(place: usize) -> u32 {
    POINTS_LADDER.get(place).copied().unwrap_or(POINTS_LADDER[POINTS_LADDER.len() - 1])
}

/// Response window, always within the mode's `[min, max]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Difficulty {
    window_ms: u64,
    tuning: ModeTuning,
}

impl Difficulty {
    /// Unvalidated bounds are repaired: `min` is at least 1 ms and `max` never below `min`.
    pub fn new(mut tuning: ModeTuning) -> Self {
        tuning.min_window_ms = tuning.min_window_ms.max(1);
        tuning.max_window_ms = tuning.max_window_ms.max(tuning.min_window_ms);
        let window_ms = tuning.initial_window_ms.max(tuning.min_window_ms).min(tuning.max_window_ms);
        Self { window_ms, tuning }
    }

    pub fn window_ms(&self) -> u64 { self.window_ms }
    pub fn tuning(&self) -> &ModeTuning { &self.tuning }

    /// Shorter window after success.
    pub fn tighten(&mut self, step_ms: u64) {
        self.window_ms = self.window_ms.saturating_sub(step_ms).max(self.tuning.min_window_ms);
    }

    /// Longer window after a miss or wrong press.
    pub fn loosen(&mut self, step_ms: u64) {
        self.window_ms = self.window_ms.saturating_add(step_ms).min(self.tuning.max_window_ms);
    }
}

/// One displayed prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Round {
    pub id: RoundId,
    pub target: Direction,
    pub started_ms: u64,
    pub deadline_ms: u64,
    pub attempted: BTreeSet<PlayerId>,
    pub correct_order: Vec<PlayerId>,
}

impl Round {
    pub fn new(id: RoundId, target: Direction, started_ms: u64, deadline_ms: u64) -> Self {
        Self { id, target, started_ms, deadline_ms, attempted: BTreeSet::new(), correct_order: Vec::new() }
    }

    pub fn reaction_ms(&self, now_ms: u64) -> u64 { now_ms.saturating_sub(self.started_ms) }
}

/// Everything a policy may touch while judging a round.
pub struct PolicyCtx<'a> {
    pub players: &'a mut PlayerRegistry,
    pub difficulty: &'a mut Difficulty,
    pub round: &'a mut Round,
    pub now_ms: u64,
}

/// What the scheduler should do after a press.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PressEffect {
    Continue,
    /// Hide the target and open the secondary window.
    Close,
    Resolve,
}

/// Mode-specific rules. Chosen once per session; swapped only by a mode change.
pub trait ScoringPolicy: fmt::Debug + Send + Sync {
    fn mode(&self) -> GameMode;

    /// Judge a press by an active player against the live round.
    fn on_press(&self, ctx: &mut PolicyCtx<'_>, player: PlayerId, direction: Direction) -> PressEffect;

    /// The visible deadline expired without the round resolving.
    fn on_timeout(&self, ctx: &mut PolicyCtx<'_>) -> RoundOutcome;

    /// Finish a round whose resolution condition was met.
    fn resolve_round(&self, ctx: &mut PolicyCtx<'_>) -> RoundOutcome;
}

pub fn policy_for(mode: GameMode, cfg: &GameConfig) -> Box<dyn ScoringPolicy> {
    match mode {
        GameMode::Competitive => Box::new(Competitive),
        GameMode::Cooperative => Box::new(Cooperative { dropout_threshold: cfg.dropout_threshold }),
        GameMode::Points => Box::new(Points),
    }
}

/// First correct press takes the round.
#[derive(Debug, Clone, Copy)]
pub struct Competitive;

impl ScoringPolicy for Competitive {
    fn mode(&self) -> GameMode { GameMode::Competitive }

    fn on_press(&self, ctx: &mut PolicyCtx<'_>, player: PlayerId, direction: Direction) -> PressEffect {
        ctx.round.attempted.insert(player);
        if direction == ctx.round.target {
            ctx.players.record_press(player, true, ctx.round.reaction_ms(ctx.now_ms));
            ctx.round.correct_order.push(player);
            PressEffect::Resolve
        } else {
            ctx.players.record_press(player, false, 0);
            let step = ctx.difficulty.tuning().wrong_step_ms;
            ctx.difficulty.loosen(step);
            PressEffect::Continue
        }
    }

    fn on_timeout(&self, ctx: &mut PolicyCtx<'_>) -> RoundOutcome {
        for p in ctx.players.players_mut() {
            p.register_miss();
        }
        let step = ctx.difficulty.tuning().timeout_step_ms;
        ctx.difficulty.loosen(step);
        RoundOutcome::TimedOut
    }

    fn resolve_round(&self, ctx: &mut PolicyCtx<'_>) -> RoundOutcome {
        let Some(&winner) = ctx.round.correct_order.first() else {
            return RoundOutcome::Exhausted;
        };
        let step = ctx.difficulty.tuning().correct_step_ms;
        ctx.difficulty.tighten(step);
        let reaction_ms = ctx
            .players
            .get(winner)
            .and_then(|p| p.reaction_times.last().copied())
            .unwrap_or_else(|| ctx.round.reaction_ms(ctx.now_ms));
        RoundOutcome::Claimed { winner, reaction_ms }
    }
}

/// Round clears once every active player has answered correctly.
#[derive(Debug, Clone, Copy)]
pub struct Cooperative {
    pub dropout_threshold: u32,
}

impl Cooperative {
    fn everyone_in(players: &PlayerRegistry, round: &Round) -> bool {
        players
            .players()
            .iter()
            .filter(|p| p.is_active)
            .all(|p| round.correct_order.contains(&p.id))
    }
}

impl ScoringPolicy for Cooperative {
    fn mode(&self) -> GameMode { GameMode::Cooperative }

    fn on_press(&self, ctx: &mut PolicyCtx<'_>, player: PlayerId, direction: Direction) -> PressEffect {
        if ctx.round.correct_order.contains(&player) {
            return PressEffect::Continue;
        }
        ctx.round.attempted.insert(player);
        if direction == ctx.round.target {
            let reaction = ctx.round.reaction_ms(ctx.now_ms);
            ctx.players.record_press(player, true, reaction);
            ctx.round.correct_order.push(player);
            if Self::everyone_in(ctx.players, ctx.round) {
                return PressEffect::Resolve;
            }
        } else if let Some(p) = ctx.players.get_mut(player) {
            // logged only: no streak or window penalty
            p.register_wrong(false);
        }
        PressEffect::Continue
    }

    fn on_timeout(&self, ctx: &mut PolicyCtx<'_>) -> RoundOutcome {
        let answered = &ctx.round.correct_order;
        for p in ctx.players.players_mut() {
            if answered.contains(&p.id) {
                continue;
            }
            p.register_miss();
            if p.is_active {
                p.consecutive_misses += 1;
                if p.consecutive_misses >= self.dropout_threshold {
                    p.is_active = false;
                    info!(player = p.id, misses = p.consecutive_misses, "player dropped out");
                }
            }
        }
        let step = ctx.difficulty.tuning().timeout_step_ms;
        ctx.difficulty.loosen(step);
        RoundOutcome::TimedOut
    }

    fn resolve_round(&self, ctx: &mut PolicyCtx<'_>) -> RoundOutcome {
        let step = ctx.difficulty.tuning().correct_step_ms;
        ctx.difficulty.tighten(step);
        RoundOutcome::Cleared
    }
}

/// Descending awards for everyone who answers before the round closes.
#[derive(Debug, Clone, Copy)]
pub struct Points;

impl ScoringPolicy for Points {
    fn mode(&self) -> GameMode { GameMode::Points }

    fn on_press(&self, ctx: &mut PolicyCtx<'_>, player: PlayerId, direction: Direction) -> PressEffect {
        // first attempt is final
        if !ctx.round.attempted.insert(player) {
            return PressEffect::Continue;
        }
        let correct = direction == ctx.round.target;
        if correct {
            let award = points_for_place(ctx.round.correct_order.len());
            let reaction = ctx.round.reaction_ms(ctx.now_ms);
            ctx.players.record_press(player, true, reaction);
            if let Some(p) = ctx.players.get_mut(player) {
                p.score += award;
            }
            ctx.round.correct_order.push(player);
        } else {
            ctx.players.record_press(player, false, 0);
        }

        if ctx.round.attempted.len() >= ctx.players.len() {
            PressEffect::Resolve
        } else if correct && ctx.round.correct_order.len() == 1 {
            PressEffect::Close
        } else {
            PressEffect::Continue
        }
    }

    fn on_timeout(&self, ctx: &mut PolicyCtx<'_>) -> RoundOutcome {
        let attempted = &ctx.round.attempted;
        for p in ctx.players.players_mut() {
            if !attempted.contains(&p.id) {
                p.register_miss();
            }
        }
        let step = ctx.difficulty.tuning().timeout_step_ms;
        ctx.difficulty.loosen(step);
        RoundOutcome::TimedOut
    }

    fn resolve_round(&self, ctx: &mut PolicyCtx<'_>) -> RoundOutcome {
        if ctx.round.correct_order.is_empty() {
            return RoundOutcome::Exhausted;
        }
        let step = ctx.difficulty.tuning().correct_step_ms;
        ctx.difficulty.tighten(step);
        let awards = ctx
            .round
            .correct_order
            .iter()
            .enumerate()
            .map(|(place, id)| (*id, points_for_place(place)))
            .collect();
        RoundOutcome::Scored { awards }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::ControlSource;

    fn registry(n: u32) -> PlayerRegistry {
        let mut reg = PlayerRegistry::new(4);
        for pad in 0..n {
            reg.join(ControlSource::Gamepad(pad));
        }
        reg
    }

    #[test]
    fn ladder_floors_at_one() {
        assert_eq!(points_for_place(0), 4);
        assert_eq!(points_for_place(3), 1);
        assert_eq!(points_for_place(7), 1);
    }

    #[test]
    fn inverted_bounds_do_not_panic() {
        let tuning = ModeTuning { min_window_ms: 3000, ..ModeTuning::COMPETITIVE };
        let d = Difficulty::new(tuning);
        assert_eq!(d.window_ms(), 3000);
        assert_eq!(d.tuning().max_window_ms, 3000);

        let zero = Difficulty::new(ModeTuning { initial_window_ms: 0, min_window_ms: 0, max_window_ms: 0, ..ModeTuning::POINTS });
        assert_eq!(zero.window_ms(), 1);
    }

    #[test]
    fn difficulty_clamps_both_ways() {
        let mut d = Difficulty::new(ModeTuning::COMPETITIVE);
        for _ in 0..100 { d.tighten(30); }
        assert_eq!(d.window_ms(), 250);
        for _ in 0..100 { d.loosen(75); }
        assert_eq!(d.window_ms(), 2500);
    }

    #[test]
    fn competitive_wrong_press_loosens_less_than_timeout() {
        let mut reg = registry(2);
        let mut diff = Difficulty::new(ModeTuning::COMPETITIVE);
        let mut round = Round::new(1, Direction::East, 0, 1500);
        let mut ctx = PolicyCtx { players: &mut reg, difficulty: &mut diff, round: &mut round, now_ms: 100 };
        assert_eq!(Competitive.on_press(&mut ctx, 1, Direction::West), PressEffect::Continue);
        assert_eq!(ctx.difficulty.window_ms(), 1550);
        assert_eq!(Competitive.on_timeout(&mut ctx), RoundOutcome::TimedOut);
        assert_eq!(ctx.difficulty.window_ms(), 1625);
        assert!(reg.players().iter().all(|p| p.missed_count == 1 && p.streak == 0));
    }

    #[test]
    fn cooperative_wrong_press_is_free() {
        let mut reg = registry(2);
        reg.get_mut(1).unwrap().streak = 5;
        let mut diff = Difficulty::new(ModeTuning::COOPERATIVE);
        let mut round = Round::new(1, Direction::North, 0, 2000);
        let coop = Cooperative { dropout_threshold: 3 };
        let mut ctx = PolicyCtx { players: &mut reg, difficulty: &mut diff, round: &mut round, now_ms: 10 };
        assert_eq!(coop.on_press(&mut ctx, 1, Direction::South), PressEffect::Continue);
        assert_eq!(ctx.difficulty.window_ms(), 2000);
        let p = reg.get(1).unwrap();
        assert_eq!((p.streak, p.wrong_count), (5, 1));
    }

    #[test]
    fn cooperative_timeout_spares_those_who_answered() {
        let mut reg = registry(2);
        let mut diff = Difficulty::new(ModeTuning::COOPERATIVE);
        let mut round = Round::new(1, Direction::North, 0, 2000);
        let coop = Cooperative { dropout_threshold: 3 };
        let mut ctx = PolicyCtx { players: &mut reg, difficulty: &mut diff, round: &mut round, now_ms: 10 };
        coop.on_press(&mut ctx, 1, Direction::North);
        coop.on_timeout(&mut ctx);
        assert_eq!(reg.get(1).unwrap().missed_count, 0);
        assert_eq!(reg.get(2).unwrap().missed_count, 1);
        assert_eq!(reg.get(2).unwrap().consecutive_misses, 1);
    }

    #[test]
    fn points_timeout_charges_only_non_attempters() {
        let mut reg = registry(3);
        let mut diff = Difficulty::new(ModeTuning::POINTS);
        let mut round = Round::new(1, Direction::West, 0, 1500);
        let mut ctx = PolicyCtx { players: &mut reg, difficulty: &mut diff, round: &mut round, now_ms: 10 };
        Points.on_press(&mut ctx, 2, Direction::East);
        assert_eq!(Points.on_timeout(&mut ctx), RoundOutcome::TimedOut);
        let missed: Vec<u32> = reg.players().iter().map(|p| p.missed_count).collect();
        assert_eq!(missed, vec![1, 0, 1]);
    }

    #[test]
    fn points_second_attempt_ignored() {
        let mut reg = registry(3);
        let mut diff = Difficulty::new(ModeTuning::POINTS);
        let mut round = Round::new(1, Direction::West, 0, 1500);
        let mut ctx = PolicyCtx { players: &mut reg, difficulty: &mut diff, round: &mut round, now_ms: 10 };
        assert_eq!(Points.on_press(&mut ctx, 1, Direction::East), PressEffect::Continue);
        assert_eq!(Points.on_press(&mut ctx, 1, Direction::West), PressEffect::Continue);
        let p = reg.get(1).unwrap();
        assert_eq!((p.score, p.correct_count, p.total_presses), (0, 0, 1));
    }
}
