//! Timer abstraction.
//!
//! Vendor SDKs expose playback position through request/response calls, so
//! `timeupdate` has to be polled. The host owns the event loop and therefore
//! the timers; the core only asks for repeating callbacks.

use std::rc::Rc;
use std::time::Duration;

/// Handle for a repeating timer created by an [`IntervalScheduler`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(pub u64);

/// Repeating timers on the host event loop (`setInterval`/`clearInterval`).
pub trait IntervalScheduler {
    /// Run `tick` every `period` until cleared.
    fn set_interval(&self, period: Duration, tick: Rc<dyn Fn()>) -> TimerId;

    /// Stop a timer. Unknown ids are ignored.
    fn clear_interval(&self, id: TimerId);
}
