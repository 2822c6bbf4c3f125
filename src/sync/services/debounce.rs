//! Debounced deregistration timers keyed by container name.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use tokio::task::AbortHandle;
use tokio_util::task::TaskTracker;
use tracing::debug;

/// Pending-deregistration timers owned by one event processor.
///
/// Scheduling a name replaces and aborts any timer already pending for it.
/// Each timer carries a generation number so an expiring timer only removes
/// its own entry, never a replacement scheduled after it.
///
/// The table also serialises side effects per name: an expiring timer holds
/// the name's [`SerialGuard`] while its callback runs, and callers doing
/// other work for the same name take the guard through
/// [`DebounceTable::serialize`].
#[derive(Debug, Clone)]
pub struct DebounceTable {
    grace: Duration,
    state: Arc<Mutex<DebounceState>>,
}

#[derive(Debug, Default)]
struct DebounceState {
    next_generation: u64,
    pending: HashMap<String, PendingTimer>,
    serial: HashMap<String, Arc<AsyncMutex<()>>>,
}

#[derive(Debug)]
struct PendingTimer {
    generation: u64,
    handle: AbortHandle,
}

/// Exclusive hold on one name. Released on drop.
#[derive(Debug)]
#[must_use = "the name is released as soon as the guard is dropped"]
pub struct SerialGuard {
    table: DebounceTable,
    name: String,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for SerialGuard {
    fn drop(&mut self) {
        drop(self.guard.take());
        self.table.release_serial(&self.name);
    }
}

impl DebounceTable {
    /// Creates an empty table whose timers wait for `grace`.
    #[must_use]
    pub fn new(grace: Duration) -> Self {
        Self {
            grace,
            state: Arc::new(Mutex::new(DebounceState::default())),
        }
    }

    /// Returns the grace period.
    #[must_use]
    pub const fn grace(&self) -> Duration {
        self.grace
    }

    /// Starts a timer for `name`, replacing any pending one.
    ///
    /// When the timer expires it waits for the name's serial guard. If it is
    /// still the current timer at that point, its entry is removed and
    /// `on_expiry` runs on the tracker with the guard held.
    pub fn schedule<F, Fut>(&self, name: &str, tracker: &TaskTracker, on_expiry: F)
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let mut state = self.lock();
        state.next_generation = state.next_generation.wrapping_add(1);
        let generation = state.next_generation;

        let table = self.clone();
        let key = name.to_owned();
        let task = tracker.spawn(async move {
            tokio::time::sleep(table.grace).await;
            let _serial = table.serialize(&key).await;
            if table.take_if_current(&key, generation) {
                on_expiry().await;
            }
        });

        let timer = PendingTimer {
            generation,
            handle: task.abort_handle(),
        };
        if let Some(previous) = state.pending.insert(name.to_owned(), timer) {
            debug!(container = name, "replacing pending deregistration");
            previous.handle.abort();
        }
    }

    /// Returns the generation of the timer pending for `name`, if any.
    #[must_use]
    pub fn pending_generation(&self, name: &str) -> Option<u64> {
        self.lock().pending.get(name).map(|timer| timer.generation)
    }

    /// Cancels the timer for `name` only while it is still `generation`.
    ///
    /// A timer re-armed after `generation` was observed is left alone.
    /// Returns whether a timer was cancelled.
    #[must_use = "the return value reports whether a deregistration was cancelled"]
    pub fn cancel_if_current(&self, name: &str, generation: u64) -> bool {
        let mut state = self.lock();
        if state
            .pending
            .get(name)
            .is_none_or(|timer| timer.generation != generation)
        {
            return false;
        }
        state.pending.remove(name).is_some_and(|timer| {
            timer.handle.abort();
            true
        })
    }

    /// Cancels every pending timer and returns how many were aborted.
    ///
    /// Timers whose callback is already running are not affected.
    #[must_use = "the return value reports how many deregistrations were dropped"]
    pub fn cancel_all(&self) -> usize {
        let drained: Vec<PendingTimer> = self
            .lock()
            .pending
            .drain()
            .map(|(_, timer)| timer)
            .collect();
        for timer in &drained {
            timer.handle.abort();
        }
        drained.len()
    }

    /// Waits until no other holder works on `name`, then holds it.
    pub async fn serialize(&self, name: &str) -> SerialGuard {
        let gate = Arc::clone(self.lock().serial.entry(name.to_owned()).or_default());
        let guard = gate.lock_owned().await;
        SerialGuard {
            table: self.clone(),
            name: name.to_owned(),
            guard: Some(guard),
        }
    }

    /// Returns whether a timer is pending for `name`.
    #[must_use]
    pub fn is_pending(&self, name: &str) -> bool {
        self.lock().pending.contains_key(name)
    }

    /// Returns the number of pending timers.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.lock().pending.len()
    }

    fn take_if_current(&self, name: &str, generation: u64) -> bool {
        let mut state = self.lock();
        match state.pending.get(name) {
            Some(timer) if timer.generation == generation => {
                state.pending.remove(name);
                true
            }
            _ => false,
        }
    }

    // Drops the gate once no guard or waiter references it.
    fn release_serial(&self, name: &str) {
        let mut state = self.lock();
        if state
            .serial
            .get(name)
            .is_some_and(|gate| Arc::strong_count(gate) == 1)
        {
            state.serial.remove(name);
        }
    }

    fn lock(&self) -> MutexGuard<'_, DebounceState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
