//! Interval schedulers for headless hosts.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::rc::Rc;
use std::time::Duration;

use bridge_traits::scheduler::{IntervalScheduler, TimerId};
use tokio::task::JoinHandle;
use tracing::trace;

// ============================================================================
// ManualScheduler
// ============================================================================

struct ManualTimer {
    period: Duration,
    tick: Rc<dyn Fn()>,
}

/// Scheduler whose timers only fire when [`ManualScheduler::tick`] is called.
#[derive(Default)]
pub struct ManualScheduler {
    next_id: Cell<u64>,
    timers: RefCell<BTreeMap<TimerId, ManualTimer>>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fire every active timer once, in creation order. Returns how many
    /// callbacks ran.
    pub fn tick(&self) -> usize {
        let callbacks: Vec<Rc<dyn Fn()>> = self
            .timers
            .borrow()
            .values()
            .map(|timer| timer.tick.clone())
            .collect();
        for callback in &callbacks {
            callback();
        }
        callbacks.len()
    }

    pub fn active_timers(&self) -> usize {
        self.timers.borrow().len()
    }

    pub fn period(&self, id: TimerId) -> Option<Duration> {
        self.timers.borrow().get(&id).map(|timer| timer.period)
    }
}

impl IntervalScheduler for ManualScheduler {
    fn set_interval(&self, period: Duration, tick: Rc<dyn Fn()>) -> TimerId {
        let id = TimerId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        self.timers
            .borrow_mut()
            .insert(id, ManualTimer { period, tick });
        trace!(timer = id.0, period_ms = period.as_millis() as u64, "manual timer set");
        id
    }

    fn clear_interval(&self, id: TimerId) {
        if self.timers.borrow_mut().remove(&id).is_some() {
            trace!(timer = id.0, "manual timer cleared");
        }
    }
}

impl std::fmt::Debug for ManualScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ManualScheduler")
            .field("active_timers", &self.active_timers())
            .finish()
    }
}

// ============================================================================
// LocalIntervalScheduler
// ============================================================================

/// Scheduler backed by `tokio::time::interval` on the current `LocalSet`.
///
/// Callbacks are `!Send`, so timers are spawned with
/// [`tokio::task::spawn_local`]; `set_interval` must be called from inside a
/// `LocalSet`.
#[derive(Default)]
pub struct LocalIntervalScheduler {
    next_id: Cell<u64>,
    tasks: RefCell<BTreeMap<TimerId, JoinHandle<()>>>,
}

impl LocalIntervalScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active_timers(&self) -> usize {
        self.tasks.borrow().len()
    }
}

impl IntervalScheduler for LocalIntervalScheduler {
    fn set_interval(&self, period: Duration, tick: Rc<dyn Fn()>) -> TimerId {
        let id = TimerId(self.next_id.get());
        self.next_id.set(id.0 + 1);

        let task = tokio::task::spawn_local(async move {
            let mut interval = tokio::time::interval(period);
            // First tick completes immediately; setInterval waits one period.
            interval.tick().await;
            loop {
                interval.tick().await;
                tick();
            }
        });
        self.tasks.borrow_mut().insert(id, task);
        id
    }

    fn clear_interval(&self, id: TimerId) {
        if let Some(task) = self.tasks.borrow_mut().remove(&id) {
            task.abort();
        }
    }
}

impl Drop for LocalIntervalScheduler {
    fn drop(&mut self) {
        for (_, task) in std::mem::take(&mut *self.tasks.borrow_mut()) {
            task.abort();
        }
    }
}

impl std::fmt::Debug for LocalIntervalScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalIntervalScheduler")
            .field("active_timers", &self.active_timers())
            .finish()
    }
}
