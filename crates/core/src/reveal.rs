//! Slot-machine reveal of an already picked loadout.
//!
//! The scheduler owns no clock. Its owner feeds monotonic milliseconds into
//! [`RevealScheduler::start`] and [`RevealScheduler::advance_to`]; every timer
//! (the recurring churn tick, the staggered locks, the flash clears and the
//! final stop) is measured against that single time line.

use crate::{
    Catalog, EventBus, Loadout, RandomSource, RevealEvent, RevealTiming, RunId, Stratagem,
    TimerHandle, TimerQueue,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RevealPhase {
    Idle,
    Spinning,
    Done,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SlotState {
    pub locked: bool,
    /// Set for one flash window right after the slot locks.
    pub just_locked: bool,
    pub display: Option<Stratagem>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RevealTimer {
    Tick,
    Lock(usize),
    ClearFlash(usize),
    Finish,
}

pub struct RevealScheduler<R> {
    timing: RevealTiming,
    rng: R,
    run: RunId,
    phase: RevealPhase,
    now: u64,
    slots: Vec<SlotState>,
    result: Vec<Stratagem>,
    churn: Vec<Stratagem>,
    timers: TimerQueue<RevealTimer>,
    tick: Option<TimerHandle>,
}

impl<R: RandomSource> RevealScheduler<R> {
    pub fn new(timing: RevealTiming, rng: R) -> Self {
        Self {
            timing,
            rng,
            run: RunId::default(),
            phase: RevealPhase::Idle,
            now: 0,
            slots: Vec::new(),
            result: Vec::new(),
            churn: Vec::new(),
            timers: TimerQueue::new(),
            tick: None,
        }
    }

    /// Begins a new run at `now`, superseding any run still in flight. The
    /// churn draws from every stratagem in `catalog`.
    pub fn start(
        &mut self,
        loadout: &Loadout,
        catalog: &Catalog,
        now: u64,
        events: &mut EventBus,
    ) -> RunId {
        self.now = self.now.max(now);
        self.cancel_current(events);
        self.run = self.run.next();
        self.tick = None;
        self.result = loadout.as_slice().to_vec();
        self.slots = vec![SlotState::default(); self.result.len()];

        if self.result.is_empty() {
            self.phase = RevealPhase::Idle;
            self.churn.clear();
            debug!(run = %self.run, "nothing to reveal");
            return self.run;
        }

        self.phase = RevealPhase::Spinning;
        self.churn = catalog.stratagems().to_vec();
        let start = self.now;
        self.tick = Some(
            self.timers
                .schedule(self.run, start + self.timing.tick_ms.max(1), RevealTimer::Tick),
        );
        let mut last_lock = start;
        for slot in 0..self.result.len() {
            let due = start + self.timing.lock_offset(slot);
            self.timers.schedule(self.run, due, RevealTimer::Lock(slot));
            last_lock = last_lock.max(due);
        }
        self.timers
            .schedule(self.run, last_lock + self.timing.grace_ms, RevealTimer::Finish);

        debug!(run = %self.run, slots = self.result.len(), "reveal started");
        events.push(RevealEvent::RunStarted {
            run: self.run,
            slots: self.result.len(),
        });
        self.run
    }

    /// Fires every timer due at or before `now`, in time order. Time never
    /// moves backwards: an earlier `now` than already seen is a no-op.
    pub fn advance_to(&mut self, now: u64, events: &mut EventBus) {
        while let Some(fired) = self.timers.pop_due(now) {
            if fired.handle.run() != self.run {
                trace!(stale = %fired.handle.run(), run = %self.run, "dropped stale timer");
                continue;
            }
            self.now = self.now.max(fired.handle.due());
            self.fire(fired.event, events);
        }
        self.now = self.now.max(now);
    }

    fn fire(&mut self, timer: RevealTimer, events: &mut EventBus) {
        match timer {
            RevealTimer::Tick => {
                if self.phase != RevealPhase::Spinning {
                    return;
                }
                for slot in self.slots.iter_mut().filter(|slot| !slot.locked) {
                    slot.display = if self.churn.is_empty() {
                        None
                    } else {
                        let idx = self.rng.next_index(self.churn.len());
                        Some(self.churn[idx].clone())
                    };
                }
                let due = self.now + self.timing.tick_ms.max(1);
                self.tick = Some(self.timers.schedule(self.run, due, RevealTimer::Tick));
            }
            RevealTimer::Lock(index) => {
                let Some(slot) = self.slots.get_mut(index) else {
                    return;
                };
                let stratagem = self.result[index].clone();
                let id = stratagem.id.clone();
                slot.display = Some(stratagem);
                slot.locked = true;
                slot.just_locked = true;
                self.timers.schedule(
                    self.run,
                    self.now + self.timing.flash_ms,
                    RevealTimer::ClearFlash(index),
                );
                events.push(RevealEvent::SlotLocked {
                    run: self.run,
                    slot: index,
                    id,
                });
            }
            RevealTimer::ClearFlash(index) => {
                if let Some(slot) = self.slots.get_mut(index) {
                    slot.just_locked = false;
                    events.push(RevealEvent::SlotFlashCleared {
                        run: self.run,
                        slot: index,
                    });
                }
            }
            RevealTimer::Finish => {
                if let Some(handle) = self.tick.take() {
                    self.timers.cancel(handle);
                }
                self.phase = RevealPhase::Done;
                debug!(run = %self.run, "reveal finished");
                events.push(RevealEvent::RunFinished { run: self.run });
            }
        }
    }

    fn cancel_current(&mut self, events: &mut EventBus) {
        let dropped = self.timers.cancel_run(self.run);
        if dropped > 0 {
            debug!(run = %self.run, dropped, "reveal superseded");
            events.push(RevealEvent::RunCancelled { run: self.run });
        }
    }

    pub fn run_id(&self) -> RunId {
        self.run
    }

    pub fn phase(&self) -> RevealPhase {
        self.phase
    }

    pub fn spinning(&self) -> bool {
        self.phase == RevealPhase::Spinning
    }

    pub fn now(&self) -> u64 {
        self.now
    }

    pub fn timing(&self) -> &RevealTiming {
        &self.timing
    }

    pub fn slots(&self) -> &[SlotState] {
        &self.slots
    }

    pub fn display_slots(&self) -> Vec<Option<&Stratagem>> {
        self.slots.iter().map(|slot| slot.display.as_ref()).collect()
    }

    pub fn slot_locked(&self) -> Vec<bool> {
        self.slots.iter().map(|slot| slot.locked).collect()
    }

    pub fn slot_just_locked(&self) -> Vec<bool> {
        self.slots.iter().map(|slot| slot.just_locked).collect()
    }

    /// When the current run next needs [`advance_to`](Self::advance_to).
    pub fn next_deadline(&self) -> Option<u64> {
        self.timers.next_due()
    }

    /// True once the current run has no timers left, flash clears included.
    pub fn is_settled(&self) -> bool {
        self.timers.pending_for(self.run) == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Category, Direction, SequenceRng};

    fn catalog(count: usize) -> Catalog {
        let stratagems = (0..count)
            .map(|i| Stratagem {
                id: format!("s{i}"),
                name: format!("Stratagem {i}"),
                code: vec![Direction::Up],
                category: Category::Orbital,
                warbond: None,
                unlock_level: None,
            })
            .collect();
        Catalog::new(stratagems, Vec::new()).unwrap()
    }

    fn loadout_of(catalog: &Catalog, count: usize) -> Loadout {
        catalog.stratagems()[..count].iter().cloned().collect()
    }

    fn scheduler() -> RevealScheduler<SequenceRng> {
        RevealScheduler::new(RevealTiming::default(), SequenceRng::new(vec![0.5]))
    }

    #[test]
    fn churn_only_touches_unlocked_slots() {
        let catalog = catalog(8);
        let loadout = loadout_of(&catalog, 2);
        let mut reveal = scheduler();
        let mut events = EventBus::default();
        reveal.start(&loadout, &catalog, 0, &mut events);
        assert_eq!(reveal.display_slots(), vec![None, None]);

        reveal.advance_to(80, &mut events);
        // 0.5 * 8 = index 4
        assert_eq!(reveal.slots()[0].display.as_ref().map(|s| s.id.as_str()), Some("s4"));

        reveal.advance_to(1000, &mut events);
        assert_eq!(reveal.slot_locked(), vec![true, false]);
        reveal.advance_to(1080, &mut events);
        assert_eq!(reveal.slots()[0].display.as_ref().map(|s| s.id.as_str()), Some("s0"));
        assert_eq!(reveal.slots()[1].display.as_ref().map(|s| s.id.as_str()), Some("s4"));
    }

    #[test]
    fn finish_stops_the_tick() {
        let catalog = catalog(4);
        let loadout = loadout_of(&catalog, 1);
        let mut reveal = scheduler();
        let mut events = EventBus::default();
        reveal.start(&loadout, &catalog, 0, &mut events);
        reveal.advance_to(1199, &mut events);
        assert!(reveal.spinning());
        reveal.advance_to(1200, &mut events);
        assert_eq!(reveal.phase(), RevealPhase::Done);
        reveal.advance_to(1400, &mut events);
        assert!(reveal.is_settled());
        assert_eq!(reveal.next_deadline(), None);
    }

    #[test]
    fn empty_loadout_stays_idle_and_cancels_previous_run() {
        let catalog = catalog(4);
        let mut reveal = scheduler();
        let mut events = EventBus::default();
        let first = reveal.start(&loadout_of(&catalog, 3), &catalog, 0, &mut events);
        reveal.start(&Loadout::default(), &catalog, 500, &mut events);
        assert_eq!(reveal.phase(), RevealPhase::Idle);
        assert!(reveal.slots().is_empty());
        let drained: Vec<RevealEvent> = events.drain().collect();
        assert!(drained.contains(&RevealEvent::RunCancelled { run: first }));
        assert!(reveal.timers.is_empty());
    }
}
