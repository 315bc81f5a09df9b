use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::input::{ControlSource, InputBinding};
use crate::types::PlayerId;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Player {
    pub id: PlayerId,
    pub control_source: ControlSource,
    pub is_active: bool,
    pub consecutive_misses: u32,
    pub reaction_times: Vec<u64>,
    pub correct_count: u32,
    pub wrong_count: u32,
    pub total_presses: u32,
    pub streak: u32,
    pub longest_streak: u32,
    pub missed_count: u32,
    pub score: u32,
}

impl Player {
    fn new(id: PlayerId, control_source: ControlSource) -> Self {
        Self {
            id,
            control_source,
            is_active: true,
            consecutive_misses: 0,
            reaction_times: Vec::new(),
            correct_count: 0,
            wrong_count: 0,
            total_presses: 0,
            streak: 0,
            longest_streak: 0,
            missed_count: 0,
            score: 0,
        }
    }

    pub fn register_hit(&mut self, reaction_ms: u64) {
        self.total_presses += 1;
        self.correct_count += 1;
        self.reaction_times.push(reaction_ms);
        self.consecutive_misses = 0;
        self.streak += 1;
        self.longest_streak = self.longest_streak.max(self.streak);
    }

    pub fn register_wrong(&mut self, breaks_streak: bool) {
        self.total_presses += 1;
        self.wrong_count += 1;
        if breaks_streak {
            self.streak = 0;
        }
    }

    pub fn register_miss(&mut self) {
        self.missed_count += 1;
        self.streak = 0;
    }
}

/// Owns players and their input bindings for one session.
#[derive(Clone, Debug)]
pub struct PlayerRegistry {
    players: Vec<Player>,
    assigned: BTreeSet<InputBinding>,
    max_players: usize,
}

impl PlayerRegistry {
    pub fn new(max_players: usize) -> Self {
        Self { players: Vec::with_capacity(max_players), assigned: BTreeSet::new(), max_players }
    }

    /// No-op (`None`) when full or when any of the source's bindings is already taken.
    pub fn join(&mut self, source: ControlSource) -> Option<&Player> {
        if self.players.len() >= self.max_players {
            return None;
        }
        let bindings = source.bindings();
        if bindings.iter().any(|b| self.assigned.contains(b)) {
            return None;
        }
        let id = PlayerId::try_from(self.players.len() + 1).ok()?;
        self.assigned.extend(bindings);
        self.players.push(Player::new(id, source));
        self.players.last()
    }

    pub fn record_press(&mut self, id: PlayerId, correct: bool, reaction_ms: u64) {
        if let Some(p) = self.get_mut(id) {
            if correct { p.register_hit(reaction_ms) } else { p.register_wrong(true) }
        }
    }

    /// Returns true if the player was inactive.
    pub fn reactivate(&mut self, id: PlayerId) -> bool {
        match self.get_mut(id) {
            Some(p) if !p.is_active => {
                p.is_active = true;
                p.consecutive_misses = 0;
                true
            }
            _ => false,
        }
    }

    pub fn reset(&mut self) {
        self.players.clear();
        self.assigned.clear();
    }

    pub fn get(&self, id: PlayerId) -> Option<&Player> {
        // ids are dense and 1-based
        self.players.get(usize::from(id).checked_sub(1)?)
    }

    pub fn get_mut(&mut self, id: PlayerId) -> Option<&mut Player> {
        self.players.get_mut(usize::from(id).checked_sub(1)?)
    }

    pub fn find_by_source(&self, source: ControlSource) -> Option<PlayerId> {
        self.players.iter().find(|p| p.control_source == source).map(|p| p.id)
    }

    pub fn players(&self) -> &[Player] { &self.players }
    pub fn players_mut(&mut self) -> impl Iterator<Item = &mut Player> { self.players.iter_mut() }
    pub fn len(&self) -> usize { self.players.len() }
    pub fn is_empty(&self) -> bool { self.players.is_empty() }
    pub fn active_count(&self) -> usize { self.players.iter().filter(|p| p.is_active).count() }
    pub fn assigned_inputs(&self) -> &BTreeSet<InputBinding> { &self.assigned }
}
