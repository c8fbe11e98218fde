//! # Command Queue
//!
//! Operations recorded against a backend that is not ready yet, replayed in
//! FIFO order exactly once when it becomes ready.
//!
//! Gets are never worth replaying: the caller already received the neutral
//! default. They may still be recorded (for diagnostics) and are skipped on
//! drain. A replayed operation whose target the backend lacks is dropped and
//! logged at `debug`; any other failure is logged at `warn`. Neither stops
//! the drain.

use std::collections::VecDeque;

use bridge_traits::media::{Method, Property, PropertyValue};
use tracing::{debug, warn};

use crate::error::Result;
use crate::handle::BackendHandle;

#[derive(Debug, Clone, PartialEq)]
pub enum PendingOperation {
    Get { property: Property },
    Set { property: Property, value: PropertyValue },
    Call { method: Method },
}

impl PendingOperation {
    pub fn set(property: Property, value: impl Into<PropertyValue>) -> Self {
        PendingOperation::Set {
            property,
            value: value.into(),
        }
    }

    pub fn call(method: Method) -> Self {
        PendingOperation::Call { method }
    }

    /// Short label for logs, e.g. `set volume` or `call play`.
    pub fn describe(&self) -> String {
        match self {
            PendingOperation::Get { property } => format!("get {}", property),
            PendingOperation::Set { property, .. } => format!("set {}", property),
            PendingOperation::Call { method } => format!("call {}", method),
        }
    }

    /// Apply to a ready handle. Gets do nothing.
    pub fn apply(&self, handle: &dyn BackendHandle) -> Result<()> {
        match self {
            PendingOperation::Get { .. } => Ok(()),
            PendingOperation::Set { property, value } => handle.set(*property, value.clone()),
            PendingOperation::Call { method } => handle.call(*method),
        }
    }
}

/// Counts from one drain.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DrainSummary {
    /// Sets and calls that reached the backend.
    pub replayed: usize,
    /// Gets skipped plus operations whose target was missing or failed.
    pub dropped: usize,
}

/// Per-handle FIFO of pending operations.
#[derive(Debug, Default)]
pub struct CommandQueue {
    pending: VecDeque<PendingOperation>,
    drained: bool,
}

impl CommandQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append to the tail. Returns `false`, dropping the operation, once the
    /// queue has been drained: by then the backend dispatches directly.
    pub fn enqueue(&mut self, op: PendingOperation) -> bool {
        if self.drained {
            debug!(operation = %op.describe(), "queue already drained; operation dropped");
            return false;
        }
        self.pending.push_back(op);
        true
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn is_drained(&self) -> bool {
        self.drained
    }

    pub fn pending(&self) -> impl Iterator<Item = &PendingOperation> {
        self.pending.iter()
    }

    /// Remove everything without replaying, e.g. on teardown.
    pub fn clear(&mut self) -> usize {
        let count = self.pending.len();
        self.pending.clear();
        count
    }

    /// Replay against a ready handle.
    pub fn drain(&mut self, handle: &dyn BackendHandle) -> DrainSummary {
        let renderer = handle.renderer_name();
        self.drain_with(&renderer, |op| op.apply(handle))
    }

    /// Replay through `apply`. Runs at most once per queue; later calls
    /// return an empty summary.
    pub fn drain_with<F>(&mut self, renderer: &str, mut apply: F) -> DrainSummary
    where
        F: FnMut(&PendingOperation) -> Result<()>,
    {
        let mut summary = DrainSummary::default();
        if self.drained {
            return summary;
        }
        self.drained = true;

        while let Some(op) = self.pending.pop_front() {
            if matches!(op, PendingOperation::Get { .. }) {
                summary.dropped += 1;
                continue;
            }
            match apply(&op) {
                Ok(()) => summary.replayed += 1,
                Err(err) if err.is_dispatch_miss() => {
                    debug!(
                        renderer = %renderer,
                        operation = %op.describe(),
                        reason = %err,
                        "queued operation dropped: backend lacks target"
                    );
                    summary.dropped += 1;
                }
                Err(err) => {
                    warn!(
                        renderer = %renderer,
                        operation = %op.describe(),
                        error = %err,
                        "queued operation failed"
                    );
                    summary.dropped += 1;
                }
            }
        }

        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PlaybackError;
    use crate::readiness::Readiness;
    use bridge_traits::media::CanPlayResponse;
    use mockall::{mock, predicate::eq, Sequence};

    mock! {
        Handle {}

        impl BackendHandle for Handle {
            fn renderer_name(&self) -> String;
            fn readiness(&self) -> Readiness;
            fn get(&self, property: Property) -> Result<PropertyValue>;
            fn set(&self, property: Property, value: PropertyValue) -> Result<()>;
            fn call(&self, method: Method) -> Result<()>;
            fn can_play_type(&self, mime: &str) -> CanPlayResponse;
            fn show(&self);
            fn hide(&self);
            fn set_size(&self, width: u32, height: u32) -> Result<()>;
        }
    }

    #[test]
    fn test_fifo_replay_exactly_once() {
        let mut handle = MockHandle::new();
        let mut seq = Sequence::new();
        handle
            .expect_renderer_name()
            .returning(|| "mock".to_string());
        handle
            .expect_set()
            .with(eq(Property::Volume), eq(PropertyValue::Number(0.5)))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(()));
        handle
            .expect_set()
            .with(eq(Property::Muted), eq(PropertyValue::Bool(true)))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(()));
        handle
            .expect_call()
            .with(eq(Method::Play))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));

        let mut queue = CommandQueue::new();
        queue.enqueue(PendingOperation::set(Property::Volume, 0.5));
        queue.enqueue(PendingOperation::set(Property::Muted, true));
        queue.enqueue(PendingOperation::call(Method::Play));

        let first = queue.drain(&handle);
        assert_eq!(first.replayed, 3);
        assert!(queue.is_drained());

        let second = queue.drain(&handle);
        assert_eq!(second, DrainSummary::default());
    }

    #[test]
    fn test_missing_target_is_dropped_and_drain_continues() {
        let mut handle = MockHandle::new();
        handle
            .expect_renderer_name()
            .returning(|| "mock".to_string());
        handle
            .expect_set()
            .with(eq(Property::Loop), eq(PropertyValue::Bool(true)))
            .times(1)
            .returning(|_, _| Err(PlaybackError::unsupported("mock", "set loop")));
        handle
            .expect_call()
            .with(eq(Method::Pause))
            .times(1)
            .returning(|_| Ok(()));

        let mut queue = CommandQueue::new();
        queue.enqueue(PendingOperation::set(Property::Loop, true));
        queue.enqueue(PendingOperation::Get {
            property: Property::Volume,
        });
        queue.enqueue(PendingOperation::call(Method::Pause));

        let summary = queue.drain(&handle);
        assert_eq!(summary.replayed, 1);
        assert_eq!(summary.dropped, 2);
    }

    #[test]
    fn test_draining_empty_queue_is_noop() {
        let mut queue = CommandQueue::new();
        let summary = queue.drain_with("none", |_| panic!("nothing to apply"));
        assert_eq!(summary, DrainSummary::default());
        assert!(!queue.enqueue(PendingOperation::call(Method::Play)));
        assert!(queue.is_empty());
    }
}
