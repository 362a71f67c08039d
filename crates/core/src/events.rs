use crate::RunId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum RevealEvent {
    RunStarted { run: RunId, slots: usize },
    RunCancelled { run: RunId },
    SlotLocked { run: RunId, slot: usize, id: String },
    SlotFlashCleared { run: RunId, slot: usize },
    RunFinished { run: RunId },
}

#[derive(Debug, Default)]
pub struct EventBus {
    queue: Vec<RevealEvent>,
}

impl EventBus {
    pub fn push(&mut self, event: RevealEvent) {
        self.queue.push(event);
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn drain(&mut self) -> impl Iterator<Item = RevealEvent> + '_ {
        self.queue.drain(..)
    }
}
