//! # Event Normalizer
//!
//! Re-dispatches backend events on the facade's [`EventTarget`] using the
//! canonical vocabulary, stamped with the facade as target.
//!
//! ## Overview
//!
//! - Backends with a native event model bridge a fixed list of event names
//!   1:1 ([`EventNormalizer::forward_native`]).
//! - Backends without one announce [`READY_SEQUENCE`] once ready and get
//!   synthetic `timeupdate` events from a [`TimeupdatePoller`]. The poll starts
//!   on `play`-like transitions and stops on `pause`, `ended` and `hide`.
//! - Vendor failures become an `error` event with a message. Nothing here
//!   returns an error or panics.
//!
//! [`EventTarget`]: core_runtime::events::EventTarget

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use std::time::Duration;

use bridge_traits::media::NativeEvent;
use bridge_traits::scheduler::{IntervalScheduler, TimerId};
use bridge_traits::vendor::PlayerState;
use core_runtime::events::{EventOrigin, EventType, MediaEvent, WeakEventTarget};
use tracing::warn;

use crate::renderer::RendererContext;

/// Events synthesized when a backend without native events becomes ready.
pub const READY_SEQUENCE: [EventType; 4] = [
    EventType::RendererReady,
    EventType::LoadedData,
    EventType::LoadedMetadata,
    EventType::CanPlay,
];

/// Event names a native media node forwards unchanged.
pub const NATIVE_MEDIA_EVENTS: [&str; 22] = [
    "loadstart",
    "progress",
    "suspend",
    "abort",
    "error",
    "emptied",
    "stalled",
    "play",
    "pause",
    "loadedmetadata",
    "loadeddata",
    "waiting",
    "playing",
    "canplay",
    "canplaythrough",
    "seeking",
    "seeked",
    "timeupdate",
    "ended",
    "ratechange",
    "durationchange",
    "volumechange",
];

/// Pointer events forwarded from the vendor surface so controls can
/// show and hide.
pub const POINTER_EVENTS: [&str; 3] = ["click", "mouseover", "mouseout"];

/// Dispatcher bound to one facade and one renderer.
#[derive(Debug, Clone)]
pub struct EventNormalizer {
    origin: EventOrigin,
    target: WeakEventTarget,
}

impl EventNormalizer {
    pub fn new(origin: EventOrigin, target: WeakEventTarget) -> Self {
        Self { origin, target }
    }

    pub fn from_context(ctx: &RendererContext) -> Self {
        Self::new(ctx.origin(), ctx.events.clone())
    }

    pub fn origin(&self) -> &EventOrigin {
        &self.origin
    }

    /// Dispatch one event. Returns listeners reached; zero once the facade
    /// is gone.
    pub fn emit(&self, event_type: impl Into<EventType>) -> usize {
        let event = MediaEvent::new(event_type, self.origin.clone());
        self.target.dispatch_event(&event)
    }

    pub fn emit_all(&self, events: &[EventType]) -> usize {
        events.iter().map(|event| self.emit(event.clone())).sum()
    }

    /// Clone a raw native event onto the facade. The listener sees the
    /// facade origin, never the native node.
    pub fn forward_native(&self, native: &NativeEvent) -> usize {
        let mut event = MediaEvent::new(native.name.as_str(), self.origin.clone());
        event.message = native.message.clone();
        self.target.dispatch_event(&event)
    }

    pub fn announce_ready(&self) -> usize {
        self.emit_all(&READY_SEQUENCE)
    }

    /// Translate a vendor failure into the canonical `error` event.
    pub fn vendor_error(&self, message: &str) -> usize {
        warn!(
            element = %self.origin.element_id,
            renderer = ?self.origin.renderer,
            message = %message,
            "vendor error"
        );
        let event = MediaEvent::new(EventType::Error, self.origin.clone()).with_message(message);
        self.target.dispatch_event(&event)
    }

    /// What a vendor state change means for the facade.
    pub fn translate_state(state: PlayerState) -> StateTransition {
        use EventType::*;
        match state {
            PlayerState::Unstarted => StateTransition::new(vec![LoadedMetadata], true, false, PollChange::Keep),
            PlayerState::Ended => StateTransition::new(vec![Ended], false, true, PollChange::Stop),
            PlayerState::Playing => StateTransition::new(vec![Play, Playing], false, false, PollChange::Start),
            PlayerState::Paused => StateTransition::new(vec![Pause], true, false, PollChange::Stop),
            PlayerState::Buffering => StateTransition::new(vec![Progress], false, false, PollChange::Keep),
            PlayerState::Cued => StateTransition::new(
                vec![LoadedData, LoadedMetadata, CanPlay],
                true,
                false,
                PollChange::Keep,
            ),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollChange {
    Start,
    Stop,
    Keep,
}

/// Result of [`EventNormalizer::translate_state`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateTransition {
    pub events: Vec<EventType>,
    pub paused: bool,
    pub ended: bool,
    pub poll: PollChange,
}

impl StateTransition {
    fn new(events: Vec<EventType>, paused: bool, ended: bool, poll: PollChange) -> Self {
        Self {
            events,
            paused,
            ended,
            poll,
        }
    }
}

/// Periodic `timeupdate` for backends that only answer time queries.
pub struct TimeupdatePoller {
    scheduler: Rc<dyn IntervalScheduler>,
    period: Duration,
    normalizer: EventNormalizer,
    timer: RefCell<Option<TimerId>>,
}

impl TimeupdatePoller {
    pub fn new(
        scheduler: Rc<dyn IntervalScheduler>,
        period: Duration,
        normalizer: EventNormalizer,
    ) -> Self {
        Self {
            scheduler,
            period,
            normalizer,
            timer: RefCell::new(None),
        }
    }

    pub fn is_running(&self) -> bool {
        self.timer.borrow().is_some()
    }

    /// Start polling. Starting a running poller does nothing.
    pub fn start(&self) {
        if self.is_running() {
            return;
        }
        let normalizer = self.normalizer.clone();
        let tick: Rc<dyn Fn()> = Rc::new(move || {
            normalizer.emit(EventType::TimeUpdate);
        });
        let id = self.scheduler.set_interval(self.period, tick);
        *self.timer.borrow_mut() = Some(id);
    }

    /// Stop polling. Stopping an idle poller does nothing.
    pub fn stop(&self) {
        let timer = self.timer.borrow_mut().take();
        if let Some(id) = timer {
            self.scheduler.clear_interval(id);
        }
    }

    pub fn apply(&self, change: PollChange) {
        match change {
            PollChange::Start => self.start(),
            PollChange::Stop => self.stop(),
            PollChange::Keep => {}
        }
    }
}

impl Drop for TimeupdatePoller {
    fn drop(&mut self) {
        self.stop();
    }
}

impl fmt::Debug for TimeupdatePoller {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimeupdatePoller")
            .field("period", &self.period)
            .field("timer", &self.timer.borrow())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_runtime::events::EventTarget;
    use std::cell::Cell;

    #[derive(Default)]
    struct CountingScheduler {
        next: Cell<u64>,
        ticks: RefCell<Vec<(TimerId, Rc<dyn Fn()>)>>,
        cleared: RefCell<Vec<TimerId>>,
    }

    impl IntervalScheduler for CountingScheduler {
        fn set_interval(&self, _period: Duration, tick: Rc<dyn Fn()>) -> TimerId {
            self.next.set(self.next.get() + 1);
            let id = TimerId(self.next.get());
            self.ticks.borrow_mut().push((id, tick));
            id
        }

        fn clear_interval(&self, id: TimerId) {
            self.cleared.borrow_mut().push(id);
            self.ticks.borrow_mut().retain(|(existing, _)| *existing != id);
        }
    }

    fn recording_target() -> (EventTarget, Rc<RefCell<Vec<String>>>) {
        let target = EventTarget::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        for name in ["rendererready", "loadeddata", "loadedmetadata", "canplay", "timeupdate", "error", "click"] {
            let seen = seen.clone();
            target.add_event_listener(name, move |event| {
                seen.borrow_mut().push(event.name().to_string());
            });
        }
        (target, seen)
    }

    #[test]
    fn test_ready_sequence_order() {
        let (target, seen) = recording_target();
        let normalizer = EventNormalizer::new(EventOrigin::new("mejs_1"), target.downgrade());

        assert_eq!(normalizer.announce_ready(), 4);
        assert_eq!(
            *seen.borrow(),
            vec!["rendererready", "loadeddata", "loadedmetadata", "canplay"]
        );
    }

    #[test]
    fn test_native_event_is_retargeted() {
        let target = EventTarget::new();
        let origin = Rc::new(RefCell::new(None));
        let slot = origin.clone();
        target.add_event_listener("click", move |event| {
            *slot.borrow_mut() = Some(event.target().clone());
        });
        let normalizer = EventNormalizer::new(
            EventOrigin::new("mejs_2").with_renderer("html5"),
            target.downgrade(),
        );

        normalizer.forward_native(&NativeEvent::new("click"));
        let seen = origin.borrow().clone().unwrap();
        assert_eq!(seen.element_id, "mejs_2");
        assert_eq!(seen.renderer.as_deref(), Some("html5"));
    }

    #[test]
    fn test_vendor_error_carries_message() {
        let target = EventTarget::new();
        let message = Rc::new(RefCell::new(None));
        let slot = message.clone();
        target.add_event_listener("error", move |event| {
            *slot.borrow_mut() = event.message.clone();
        });

        let normalizer = EventNormalizer::new(EventOrigin::new("mejs_3"), target.downgrade());
        assert_eq!(normalizer.vendor_error("video not embeddable"), 1);
        assert_eq!(message.borrow().as_deref(), Some("video not embeddable"));
    }

    #[test]
    fn test_emit_after_facade_dropped() {
        let target = EventTarget::new();
        let normalizer = EventNormalizer::new(EventOrigin::new("mejs_4"), target.downgrade());
        drop(target);
        assert_eq!(normalizer.emit(EventType::Play), 0);
    }

    #[test]
    fn test_state_translation() {
        let playing = EventNormalizer::translate_state(PlayerState::Playing);
        assert_eq!(playing.events, vec![EventType::Play, EventType::Playing]);
        assert!(!playing.paused);
        assert_eq!(playing.poll, PollChange::Start);

        let paused = EventNormalizer::translate_state(PlayerState::Paused);
        assert_eq!(paused.events, vec![EventType::Pause]);
        assert!(paused.paused);
        assert_eq!(paused.poll, PollChange::Stop);

        let ended = EventNormalizer::translate_state(PlayerState::Ended);
        assert!(ended.ended);
        assert!(!ended.paused);

        let cued = EventNormalizer::translate_state(PlayerState::Cued);
        assert_eq!(cued.events.len(), 3);
        assert_eq!(
            EventNormalizer::translate_state(PlayerState::Buffering).events,
            vec![EventType::Progress]
        );
    }

    #[test]
    fn test_poller_start_stop_idempotent() {
        let (target, seen) = recording_target();
        let scheduler = Rc::new(CountingScheduler::default());
        let poller = TimeupdatePoller::new(
            scheduler.clone(),
            Duration::from_millis(250),
            EventNormalizer::new(EventOrigin::new("mejs_5"), target.downgrade()),
        );

        poller.start();
        poller.start();
        assert_eq!(scheduler.ticks.borrow().len(), 1);

        let tick = scheduler.ticks.borrow()[0].1.clone();
        tick();
        tick();
        assert_eq!(*seen.borrow(), vec!["timeupdate", "timeupdate"]);

        poller.stop();
        poller.stop();
        assert_eq!(scheduler.cleared.borrow().len(), 1);
        assert!(!poller.is_running());
    }
}
