use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::GameConfig;
use crate::input::{normalize, ControlSource, InputAction, RawInput};
use crate::logging::{RoundLog, SessionLog};
use crate::player::{Player, PlayerRegistry};
use crate::rng::{DirectionSource, RandomDirections};
use crate::scoring::{policy_for, Difficulty, PolicyCtx, PressEffect, Round, ScoringPolicy};
use crate::stats::PlayerStats;
use crate::timer::{ScheduledTask, TaskKind, TaskQueue};
use crate::types::*;

/// Headline message for the UI layer.
#[derive(Copy, Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum Banner {
    JoinPrompt,
    Paused,
    RejoinPrompt,
    Clear,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct DisplayState {
    pub mode: GameMode,
    pub paused: bool,
    pub phase: RoundPhase,
    pub current_target: Option<Direction>,
    pub players: Vec<PlayerStats>,
    pub difficulty_window_ms: u64,
    pub total_prompts_issued: u64,
    pub active_elapsed_ms: u64,
    pub banner: Banner,
}

/// One game session: players, the live round, timers and the active scoring mode.
///
/// Driven by the host through discrete input events and a periodic `tick(now_ms)`.
/// All timestamps are host milliseconds; nothing here reads the clock itself.
#[derive(Debug)]
pub struct Session {
    config: GameConfig,
    mode: GameMode,
    policy: Box<dyn ScoringPolicy>,
    players: PlayerRegistry,
    difficulty: Difficulty,
    round: Option<Round>,
    phase: RoundPhase,
    tasks: TaskQueue,
    targets: Box<dyn DirectionSource>,
    total_prompts: u64,
    last_round_id: RoundId,
    paused: bool,
    active_elapsed_ms: u64,
    last_tick_ms: Option<u64>,
    log: SessionLog,
}

impl Session {
    pub fn new(config: GameConfig, mode: GameMode) -> Self {
        let targets = Box::new(RandomDirections::from_seed_opt(config.seed));
        Self::with_targets(config, mode, targets)
    }

    pub fn with_targets(config: GameConfig, mode: GameMode, targets: Box<dyn DirectionSource>) -> Self {
        Self {
            policy: policy_for(mode, &config),
            players: PlayerRegistry::new(config.max_players),
            difficulty: Difficulty::new(config.tuning(mode)),
            round: None,
            phase: RoundPhase::Idle,
            tasks: TaskQueue::new(),
            targets,
            total_prompts: 0,
            last_round_id: 0,
            paused: false,
            active_elapsed_ms: 0,
            last_tick_ms: None,
            log: SessionLog::new(mode),
            mode,
            config,
        }
    }

    // ---- commands ----

    /// Adds a player for `source`; a no-op when full or the binding is taken.
    pub fn join(&mut self, source: ControlSource, now_ms: u64) -> Option<PlayerId> {
        self.fire_due(now_ms);
        let id = self.players.join(source)?.id;
        info!(player = id, %source, mode = %self.mode, "player joined");
        self.kick(now_ms);
        Some(id)
    }

    pub fn handle_direction_input(&mut self, player: PlayerId, direction: Direction, now_ms: u64) {
        if self.paused || self.players.get(player).is_none() {
            return;
        }
        // a press after the deadline meets the timed-out round, not the live one
        self.fire_due(now_ms);
        if self.players.reactivate(player) {
            info!(player, "player rejoined");
            if self.phase == RoundPhase::AwaitingRejoin {
                self.start_prompt(now_ms);
                return;
            }
        }
        if !matches!(self.phase, RoundPhase::Prompting | RoundPhase::Closing) {
            return;
        }
        let Some(round) = self.round.as_mut() else { return };

        let mut ctx = PolicyCtx {
            players: &mut self.players,
            difficulty: &mut self.difficulty,
            round,
            now_ms,
        };
        let effect = self.policy.on_press(&mut ctx, player, direction);
        debug!(player, %direction, ?effect, window_ms = ctx.difficulty.window_ms(), "press judged");
        match effect {
            PressEffect::Continue => {}
            PressEffect::Close => self.close_visible(now_ms),
            PressEffect::Resolve => {
                let outcome = self.policy.resolve_round(&mut ctx);
                self.finish_round(outcome, now_ms);
            }
        }
    }

    /// Routes a raw device event: direction presses from unbound sources join.
    pub fn handle_raw_input(&mut self, raw: &RawInput, now_ms: u64) {
        match normalize(raw) {
            InputAction::Direction { source, direction } => match self.players.find_by_source(source) {
                Some(id) => self.handle_direction_input(id, direction, now_ms),
                None => {
                    self.join(source, now_ms);
                }
            },
            InputAction::TogglePause => self.toggle_pause(None, now_ms),
            InputAction::Reset => self.reset(now_ms),
            InputAction::Ignored => {}
        }
    }

    /// Pausing discards the live round; resuming always draws a fresh prompt.
    pub fn toggle_pause(&mut self, force: Option<bool>, now_ms: u64) {
        let paused = force.unwrap_or(!self.paused);
        if paused == self.paused {
            return;
        }
        self.fire_due(now_ms);
        self.accrue(now_ms);
        self.paused = paused;
        if paused {
            self.tasks.clear();
            if let Some(round) = self.round.take() {
                debug!(round = round.id, "round discarded by pause");
            }
            self.phase = RoundPhase::Idle;
            info!("paused");
        } else {
            info!("resumed");
            self.start_prompt(now_ms);
        }
    }

    pub fn reset(&mut self, now_ms: u64) {
        self.paused = false;
        self.tasks.clear();
        self.round = None;
        self.phase = RoundPhase::Idle;
        self.players.reset();
        self.difficulty = Difficulty::new(self.config.tuning(self.mode));
        self.total_prompts = 0;
        self.last_round_id = 0;
        self.active_elapsed_ms = 0;
        self.last_tick_ms = None;
        self.log.clear(self.mode);
        info!(mode = %self.mode, at_ms = now_ms, "session reset");
    }

    /// Swaps the scoring policy; always resets the session.
    pub fn set_mode(&mut self, mode: GameMode, now_ms: u64) {
        self.mode = mode;
        self.policy = policy_for(mode, &self.config);
        self.reset(now_ms);
    }

    /// Polling tick: accrues active time and fires due timers in order.
    pub fn tick(&mut self, now_ms: u64) {
        self.accrue(now_ms);
        self.fire_due(now_ms);
    }

    // ---- queries ----

    pub fn display_state(&self) -> DisplayState {
        let banner = if self.players.is_empty() {
            Banner::JoinPrompt
        } else if self.paused {
            Banner::Paused
        } else if self.phase == RoundPhase::AwaitingRejoin {
            Banner::RejoinPrompt
        } else {
            Banner::Clear
        };
        DisplayState {
            mode: self.mode,
            paused: self.paused,
            phase: self.phase,
            current_target: self.current_target(),
            players: self
                .players
                .players()
                .iter()
                .map(|p| PlayerStats::from_player(p, self.total_prompts))
                .collect(),
            difficulty_window_ms: self.difficulty.window_ms(),
            total_prompts_issued: self.total_prompts,
            active_elapsed_ms: self.active_elapsed_ms,
            banner,
        }
    }

    /// Lit target, if one is visible.
    pub fn current_target(&self) -> Option<Direction> {
        match (self.phase, &self.round) {
            (RoundPhase::Prompting, Some(r)) => Some(r.target),
            _ => None,
        }
    }

    pub fn mode(&self) -> GameMode { self.mode }
    pub fn phase(&self) -> RoundPhase { self.phase }
    pub fn is_paused(&self) -> bool { self.paused }
    pub fn round(&self) -> Option<&Round> { self.round.as_ref() }
    pub fn players(&self) -> &PlayerRegistry { &self.players }
    pub fn player(&self, id: PlayerId) -> Option<&Player> { self.players.get(id) }
    pub fn difficulty_window_ms(&self) -> u64 { self.difficulty.window_ms() }
    pub fn total_prompts_issued(&self) -> u64 { self.total_prompts }
    pub fn active_elapsed_ms(&self) -> u64 { self.active_elapsed_ms }
    pub fn pending_tasks(&self) -> &[ScheduledTask] { self.tasks.pending() }
    pub fn log(&self) -> &SessionLog { &self.log }
    pub fn config(&self) -> &GameConfig { &self.config }

    // ---- internals ----

    fn accrue(&mut self, now_ms: u64) {
        if let Some(last) = self.last_tick_ms {
            if !self.paused {
                self.active_elapsed_ms += now_ms.saturating_sub(last);
            }
        }
        self.last_tick_ms = Some(now_ms);
    }

    /// Starts a prompt right away if nothing is live.
    fn kick(&mut self, now_ms: u64) {
        if self.paused {
            return;
        }
        match self.phase {
            RoundPhase::Idle | RoundPhase::Resolving | RoundPhase::AwaitingRejoin => {
                self.tasks.cancel_round(self.last_round_id);
                self.start_prompt(now_ms);
            }
            RoundPhase::Prompting | RoundPhase::Closing => {}
        }
    }

    fn start_prompt(&mut self, now_ms: u64) {
        if self.paused {
            return;
        }
        if self.players.is_empty() {
            self.phase = RoundPhase::Idle;
            return;
        }
        if self.players.active_count() == 0 {
            self.phase = RoundPhase::AwaitingRejoin;
            return;
        }
        let target = self.targets.next_direction();
        self.total_prompts += 1;
        self.last_round_id += 1;
        let id = self.last_round_id;
        let window = self.difficulty.window_ms();
        self.round = Some(Round::new(id, target, now_ms, window));
        self.tasks.schedule(now_ms + window, TaskKind::Deadline, id);
        self.phase = RoundPhase::Prompting;
        debug!(round = id, %target, window_ms = window, "prompt drawn");
    }

    fn close_visible(&mut self, now_ms: u64) {
        let Some(id) = self.round.as_ref().map(|r| r.id) else { return };
        self.tasks.cancel_round(id);
        self.tasks.schedule(now_ms + self.config.secondary_window_ms, TaskKind::SecondaryWindow, id);
        self.phase = RoundPhase::Closing;
        debug!(round = id, "target hidden, late attempts open");
    }

    /// Fires every task due at or before `now_ms`, earliest first.
    fn fire_due(&mut self, now_ms: u64) {
        if self.paused {
            return;
        }
        while let Some(task) = self.tasks.pop_due(now_ms) {
            self.fire(task);
        }
    }

    fn fire(&mut self, task: ScheduledTask) {
        let live = self.round.as_ref().map(|r| r.id);
        match task.kind {
            TaskKind::Deadline if self.phase == RoundPhase::Prompting && live == Some(task.round) => {
                self.on_deadline_expired(task.due_ms);
            }
            TaskKind::SecondaryWindow if self.phase == RoundPhase::Closing && live == Some(task.round) => {
                self.settle(task.due_ms);
            }
            TaskKind::NextPrompt if self.phase == RoundPhase::Resolving && self.last_round_id == task.round => {
                self.start_prompt(task.due_ms);
            }
            _ => debug!(?task, phase = ?self.phase, "stale task dropped"),
        }
    }

    fn on_deadline_expired(&mut self, now_ms: u64) {
        let Some(round) = self.round.as_mut() else { return };
        let mut ctx = PolicyCtx {
            players: &mut self.players,
            difficulty: &mut self.difficulty,
            round,
            now_ms,
        };
        let outcome = self.policy.on_timeout(&mut ctx);
        self.finish_round(outcome, now_ms);
    }

    fn settle(&mut self, now_ms: u64) {
        let Some(round) = self.round.as_mut() else { return };
        let mut ctx = PolicyCtx {
            players: &mut self.players,
            difficulty: &mut self.difficulty,
            round,
            now_ms,
        };
        let outcome = self.policy.resolve_round(&mut ctx);
        self.finish_round(outcome, now_ms);
    }

    fn finish_round(&mut self, outcome: RoundOutcome, now_ms: u64) {
        let Some(round) = self.round.take() else { return };
        self.tasks.cancel_round(round.id);
        debug!(round = round.id, ?outcome, window_ms = self.difficulty.window_ms(), "round resolved");
        self.log.push(RoundLog {
            round: round.id,
            mode: self.mode,
            target: round.target,
            started_ms: round.started_ms,
            resolved_ms: now_ms,
            outcome,
            correct_order: round.correct_order,
            window_after_ms: self.difficulty.window_ms(),
        });

        if self.players.active_count() == 0 {
            self.phase = RoundPhase::AwaitingRejoin;
            info!("every player dropped out, waiting for a rejoin press");
            return;
        }
        self.phase = RoundPhase::Resolving;
        self.tasks.schedule(now_ms + self.config.brief_pause_ms, TaskKind::NextPrompt, round.id);
    }
}
