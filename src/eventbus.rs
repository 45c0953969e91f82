//! Delivery of published snapshots.
//!
//! Two delivery paths exist side by side:
//! - **push**: a motion callback and a button callback, invoked on whichever
//!   thread performed the read (the poller thread when polling in the
//!   background). Keep them short; they delay the next read.
//! - **pull**: bounded queues returned by `subscribe()`. The producer never
//!   blocks; when a queue is full the event is dropped and a warning logged.
//!   Queues whose receiver was dropped are pruned.
//!
//! Every consumer receives its own clone of the snapshot.

use crate::event::DecodeEvent;
use crate::snapshot::MotionState;
use crossbeam::channel::{self, Receiver, Sender, TrySendError};
use std::sync::Arc;
use tracing::warn;

/// Callback invoked with a published snapshot.
pub type StateCallback = Arc<dyn Fn(&MotionState) + Send + Sync>;

/// Which path produced a queued snapshot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StateKind {
    Motion,
    Buttons,
}

#[derive(Clone, Debug, PartialEq)]
pub struct StateEvent {
    pub kind: StateKind,
    pub state: MotionState,
}

#[derive(Default)]
pub struct Handlers {
    motion: Option<StateCallback>,
    buttons: Option<StateCallback>,
    queues: Vec<Sender<StateEvent>>,
}

impl Handlers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_motion(&mut self, callback: Option<StateCallback>) {
        self.motion = callback;
    }

    pub fn set_buttons(&mut self, callback: Option<StateCallback>) {
        self.buttons = callback;
    }

    /// Register a pull queue holding at most `capacity` undelivered events.
    pub fn subscribe(&mut self, capacity: usize) -> Receiver<StateEvent> {
        let (tx, rx) = channel::bounded(capacity.max(1));
        self.queues.push(tx);
        rx
    }

    /// Snapshot of the callbacks for `event`, so they can run without holding a lock.
    pub(crate) fn callback_for(&self, event: DecodeEvent) -> Option<StateCallback> {
        match event {
            DecodeEvent::Motion => self.motion.clone(),
            DecodeEvent::Buttons => self.buttons.clone(),
            _ => None,
        }
    }

    /// Push `state` into every live queue.
    pub(crate) fn enqueue(&mut self, event: DecodeEvent, state: &MotionState) {
        let kind = match event {
            DecodeEvent::Motion => StateKind::Motion,
            DecodeEvent::Buttons => StateKind::Buttons,
            _ => return,
        };
        self.queues.retain(|tx| {
            match tx.try_send(StateEvent {
                kind,
                state: state.clone(),
            }) {
                Ok(()) => true,
                Err(TrySendError::Full(_)) => {
                    warn!(?kind, "state queue full, dropping snapshot");
                    true
                }
                Err(TrySendError::Disconnected(_)) => false,
            }
        });
    }
}
