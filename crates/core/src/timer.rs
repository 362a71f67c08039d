use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Generation of a reveal run. Strictly increasing per scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunId(pub u64);

impl RunId {
    pub fn next(self) -> Self {
        RunId(self.0 + 1)
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "run#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerHandle {
    run: RunId,
    due: u64,
    seq: u64,
}

impl TimerHandle {
    pub fn run(&self) -> RunId {
        self.run
    }

    pub fn due(&self) -> u64 {
        self.due
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fired<E> {
    pub handle: TimerHandle,
    pub event: E,
}

/// One-shot timers on a single millisecond clock. Timers due at the same
/// instant fire in the order they were scheduled.
#[derive(Debug, Clone)]
pub struct TimerQueue<E> {
    entries: BTreeMap<(u64, u64), (RunId, E)>,
    next_seq: u64,
}

impl<E> Default for TimerQueue<E> {
    fn default() -> Self {
        Self {
            entries: BTreeMap::new(),
            next_seq: 0,
        }
    }
}

impl<E> TimerQueue<E> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, run: RunId, due: u64, event: E) -> TimerHandle {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.entries.insert((due, seq), (run, event));
        TimerHandle { run, due, seq }
    }

    /// Returns false if the timer already fired or was cancelled.
    pub fn cancel(&mut self, handle: TimerHandle) -> bool {
        self.entries.remove(&(handle.due, handle.seq)).is_some()
    }

    /// Drops every pending timer of `run`; returns how many were dropped.
    pub fn cancel_run(&mut self, run: RunId) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, (owner, _)| *owner != run);
        before - self.entries.len()
    }

    pub fn pending_for(&self, run: RunId) -> usize {
        self.entries
            .values()
            .filter(|(owner, _)| *owner == run)
            .count()
    }

    pub fn next_due(&self) -> Option<u64> {
        self.entries.keys().next().map(|(due, _)| *due)
    }

    /// Removes and returns the earliest timer due at or before `now`.
    pub fn pop_due(&mut self, now: u64) -> Option<Fired<E>> {
        let (&(due, seq), _) = self.entries.iter().next()?;
        if due > now {
            return None;
        }
        let (run, event) = self.entries.remove(&(due, seq))?;
        Some(Fired {
            handle: TimerHandle { run, due, seq },
            event,
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
