use serde::{Deserialize, Serialize};

use crate::types::RoundId;

pub type TaskId = u64;

#[derive(Copy, Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum TaskKind {
    /// Visible prompt ran out of time.
    Deadline,
    /// Late-attempt window after the first correct answer (points).
    SecondaryWindow,
    /// Brief pause between a resolved round and the next draw.
    NextPrompt,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ScheduledTask {
    pub id: TaskId,
    pub due_ms: u64,
    pub kind: TaskKind,
    /// Round the task belongs to; checked again when it fires.
    pub round: RoundId,
}

/// Deferred callbacks, cancellable by round.
#[derive(Debug, Default, Clone)]
pub struct TaskQueue {
    tasks: Vec<ScheduledTask>,
    next_id: TaskId,
}

impl TaskQueue {
    pub fn new() -> Self { Self::default() }

    pub fn schedule(&mut self, due_ms: u64, kind: TaskKind, round: RoundId) -> TaskId {
        self.next_id += 1;
        let id = self.next_id;
        self.tasks.push(ScheduledTask { id, due_ms, kind, round });
        id
    }

    pub fn cancel(&mut self, id: TaskId) -> bool {
        let before = self.tasks.len();
        self.tasks.retain(|t| t.id != id);
        self.tasks.len() != before
    }

    pub fn cancel_round(&mut self, round: RoundId) {
        self.tasks.retain(|t| t.round != round);
    }

    pub fn clear(&mut self) {
        self.tasks.clear();
        self.next_id = 0;
    }

    /// Earliest task due at or before `now_ms`; ties fire in scheduling order.
    pub fn pop_due(&mut self, now_ms: u64) -> Option<ScheduledTask> {
        let idx = self
            .tasks
            .iter()
            .enumerate()
            .filter(|(_, t)| t.due_ms <= now_ms)
            .min_by_key(|(_, t)| (t.due_ms, t.id))
            .map(|(i, _)| i)?;
        Some(self.tasks.remove(idx))
    }

    pub fn pending(&self) -> &[ScheduledTask] { &self.tasks }
    pub fn len(&self) -> usize { self.tasks.len() }
    pub fn is_empty(&self) -> bool { self.tasks.is_empty() }
}
