//! Cancellable one-shot tasks keyed by entity
//!
//! Delayed work (popup cleanup, staggered announcements, the game-over
//! hand-off) is queued here. Destroying an entity cancels everything that
//! refers to it, so nothing ever fires against a missing target.

/// Handle for a scheduled task
pub type TaskId = u64;

#[derive(Debug, Clone)]
struct Scheduled<T> {
    id: TaskId,
    entity: Option<u32>,
    due_ms: f64,
    task: T,
}

/// One-shot timer queue on the simulation clock
#[derive(Debug, Clone)]
pub struct Scheduler<T> {
    now_ms: f64,
    next_id: TaskId,
    pending: Vec<Scheduled<T>>,
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self {
            now_ms: 0.0,
            next_id: 1,
            pending: Vec::new(),
        }
    }
}

impl<T> Scheduler<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `task` to fire after `delay_ms`, optionally tied to an entity
    pub fn schedule(&mut self, entity: Option<u32>, delay_ms: f32, task: T) -> TaskId {
        let id = self.next_id;
        self.next_id += 1;
        self.pending.push(Scheduled {
            id,
            entity,
            due_ms: self.now_ms + delay_ms.max(0.0) as f64,
            task,
        });
        id
    }

    /// Cancel every task tied to an entity; returns how many were dropped
    pub fn cancel_entity(&mut self, entity: u32) -> usize {
        let before = self.pending.len();
        self.pending.retain(|s| s.entity != Some(entity));
        before - self.pending.len()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Advance the clock and return due tasks, earliest first
    /// (ties in scheduling order)
    pub fn advance(&mut self, dt_ms: f32) -> Vec<T> {
        self.now_ms += dt_ms as f64;
        let now = self.now_ms;

        let mut due: Vec<Scheduled<T>> = Vec::new();
        let mut i = 0;
        while i < self.pending.len() {
            if self.pending[i].due_ms <= now {
                due.push(self.pending.remove(i));
            } else {
                i += 1;
            }
        }
        due.sort_by(|a, b| a.due_ms.total_cmp(&b.due_ms).then(a.id.cmp(&b.id)));
        due.into_iter().map(|s| s.task).collect()
    }
}
