//! Per-field debounce timers for free-text search input.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{Instant, sleep_until};

use crate::domain::types::FieldName;

#[derive(Default)]
struct FieldTimer {
    /// Latest typed value, shown in the input immediately.
    staged: String,
    /// Set on every keystroke; a timer commits only if it is still current.
    generation: u64,
    pending: Option<JoinHandle<()>>,
}

/// Field timers plus a generation counter that survives `cancel_all`.
#[derive(Default)]
struct Timers {
    next_generation: u64,
    fields: HashMap<FieldName, FieldTimer>,
}

impl Timers {
    fn current(&mut self, field: &FieldName, generation: u64) -> Option<&mut FieldTimer> {
        self.fields
            .get_mut(field)
            .filter(|timer| timer.generation == generation)
    }
}

/// Turns rapid keystrokes into one commit per field after a quiet interval.
///
/// Each field owns its own timer, so typing in one field never delays
/// another. Clearing a field commits immediately.
pub struct Debouncer {
    delay: Duration,
    timers: Arc<Mutex<Timers>>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            timers: Arc::new(Mutex::new(Timers::default())),
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Stages `value` for `field` and schedules `commit` after the quiet
    /// interval, cancelling the field's previous timer.
    ///
    /// Must be called from within a tokio runtime.
    pub fn stage<F>(&self, field: FieldName, value: &str, commit: F)
    where
        F: FnOnce(FieldName, String) + Send + 'static,
    {
        let generation = {
            let mut timers = self.timers.lock();
            timers.next_generation += 1;
            let generation = timers.next_generation;
            let timer = timers.fields.entry(field.clone()).or_default();
            if let Some(pending) = timer.pending.take() {
                pending.abort();
            }
            timer.staged = value.to_string();
            timer.generation = generation;
            generation
        };

        if value.trim().is_empty() {
            commit(field, String::new());
            return;
        }

        let timers = Arc::clone(&self.timers);
        let deadline = Instant::now() + self.delay;
        let value = value.to_string();
        let task_field = field.clone();
        let handle = tokio::spawn(async move {
            sleep_until(deadline).await;
            let still_current = match timers.lock().current(&task_field, generation) {
                Some(timer) => {
                    timer.pending = None;
                    true
                }
                None => false,
            };
            if still_current {
                commit(task_field, value);
            }
        });

        match self.timers.lock().current(&field, generation) {
            Some(timer) => timer.pending = Some(handle),
            None => handle.abort(),
        }
    }

    /// Value currently shown in the input, committed or not.
    pub fn staged(&self, field: &FieldName) -> Option<String> {
        self.timers
            .lock()
            .fields
            .get(field)
            .map(|timer| timer.staged.clone())
    }

    pub fn pending_count(&self) -> usize {
        self.timers
            .lock()
            .fields
            .values()
            .filter(|timer| timer.pending.is_some())
            .count()
    }

    /// Cancels every pending timer and forgets staged values.
    pub fn cancel_all(&self) {
        let mut timers = self.timers.lock();
        for (_, timer) in timers.fields.drain() {
            if let Some(pending) = timer.pending {
                pending.abort();
            }
        }
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.cancel_all();
    }
}
