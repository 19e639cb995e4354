//=========================================================================
// View Events
//=========================================================================
//
// Lifecycle notifications broadcast by the director.
//
// Architecture:
//   ViewRecord ──emit──► EventHub ──► Sender<ViewEvent> (one per subscriber)
//                                          │
//                                          ▼
//                    Receiver<ViewEvent> → ViewEventCollector::collect_frame()
//
// With no subscribers, emitting is a no-op. Subscribers whose receiver was
// dropped are pruned on the next emit.
//
//=========================================================================

//=== External Dependencies ===============================================

use crossbeam_channel::{unbounded, Receiver, Sender, TryRecvError};
use log::{trace, warn};
use parking_lot::Mutex;

//=== Internal Dependencies ===============================================

use crate::core::scene::NodeId;

//=== ViewEvent ===========================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewEvent {
    /// A view finished preloading and is hidden under the view root.
    Preloaded { id: String, node: NodeId },

    /// A view is being torn down. `node` is still alive when this is sent.
    Disposed { id: String, node: NodeId },
}

impl ViewEvent {
    pub fn view_id(&self) -> &str {
        match self {
            ViewEvent::Preloaded { id, .. } | ViewEvent::Disposed { id, .. } => id,
        }
    }
}

//=== EventHub ============================================================

#[derive(Default)]
pub(crate) struct EventHub {
    subscribers: Mutex<Vec<Sender<ViewEvent>>>,
}

impl EventHub {
    pub(crate) fn subscribe(&self) -> Receiver<ViewEvent> {
        let (tx, rx) = unbounded();
        self.subscribers.lock().push(tx);
        rx
    }

    pub(crate) fn emit(&self, event: ViewEvent) {
        let mut subscribers = self.subscribers.lock();
        if subscribers.is_empty() {
            return;
        }
        trace!("Broadcasting {:?} to {} subscriber(s)", event, subscribers.len());
        subscribers.retain(|tx| tx.send(event.clone()).is_ok());
    }

    #[cfg(test)]
    pub(crate) fn subscriber_count(&self) -> usize {
        self.subscribers.lock().len()
    }
}

//=== CollectStatus =======================================================

/// Result of one collection pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectStatus {
    Continue,

    /// The director (and every sender) is gone. Events collected before
    /// the disconnect are still available.
    Disconnected,
}

//=== ViewEventCollector ==================================================

/// Drains view events once per frame with a bounded budget.
pub struct ViewEventCollector {
    receiver: Receiver<ViewEvent>,
    events: Vec<ViewEvent>,
    budget: usize,
}

impl ViewEventCollector {
    pub const DEFAULT_BUDGET: usize = 100;

    pub fn new(receiver: Receiver<ViewEvent>) -> Self {
        Self {
            receiver,
            events: Vec::with_capacity(8),
            budget: Self::DEFAULT_BUDGET,
        }
    }

    /// Caps the number of events drained per frame.
    pub fn with_budget(mut self, budget: usize) -> Self {
        self.budget = budget.max(1);
        self
    }

    /// Collects pending events, replacing last frame's batch.
    pub fn collect_frame(&mut self) -> CollectStatus {
        self.events.clear();

        while self.events.len() < self.budget {
            match self.receiver.try_recv() {
                Ok(event) => self.events.push(event),
                Err(TryRecvError::Empty) => return CollectStatus::Continue,
                Err(TryRecvError::Disconnected) => return CollectStatus::Disconnected,
            }
        }

        warn!("View event backlog: drained {} events this frame", self.events.len());
        CollectStatus::Continue
    }

    pub fn events(&self) -> &[ViewEvent] {
        &self.events
    }

    /// Takes this frame's events, leaving the buffer empty.
    pub fn take_events(&mut self) -> Vec<ViewEvent> {
        std::mem::take(&mut self.events)
    }
}

//=========================================================================
// Tests
//=========================================================================
