//! # Media Event System
//!
//! Canonical event vocabulary plus the two delivery paths used by a media
//! element:
//!
//! - **[`EventTarget`]**: synchronous, in-process pub/sub. Listeners run on the
//!   host thread, inside the `dispatch_event` call, in registration order.
//!   This is what UI code (play button, volume slider, captions) binds to.
//! - **[`EventBus`]**: optional async fan-out over `tokio::sync::broadcast` for
//!   observers living on other tasks (analytics, remote control).
//!
//! ## Overview
//!
//! ```text
//! ┌──────────────┐ native  ┌────────────┐ MediaEvent ┌─────────────┐  Rc<dyn Fn>  ┌──────────┐
//! │ backend      ├────────>│ normalizer ├───────────>│ EventTarget ├─────────────>│ listener │
//! └──────────────┘         └────────────┘            └──────┬──────┘              └──────────┘
//!                                                           │ mirror (if attached)
//!                                                    ┌──────v──────┐  subscribe   ┌──────────┐
//!                                                    │  EventBus   ├─────────────>│ observer │
//!                                                    └─────────────┘              └──────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use core_runtime::events::{EventOrigin, EventTarget, EventType, MediaEvent};
//!
//! let target = EventTarget::new();
//! let id = target.add_event_listener("timeupdate", |event| {
//!     assert_eq!(event.event_type, EventType::TimeUpdate);
//! });
//!
//! let origin = EventOrigin::new("mejs_1");
//! assert_eq!(target.dispatch_event(&MediaEvent::new(EventType::TimeUpdate, origin)), 1);
//! assert!(target.remove_event_listener("timeupdate", id));
//! ```
//!
//! ## Re-entrancy
//!
//! Listeners may add or remove listeners, or dispatch further events, while
//! being called. The listener list is snapshotted before delivery, so changes
//! take effect from the next dispatch.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::{Rc, Weak};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

pub use tokio::sync::broadcast::error::{RecvError, SendError};
pub use tokio::sync::broadcast::Receiver;

/// Default buffer size for the event bus channel.
pub const DEFAULT_EVENT_BUFFER_SIZE: usize = 100;

// ============================================================================
// Event Vocabulary
// ============================================================================

/// Canonical media event names.
///
/// Anything outside the canonical list travels as [`EventType::Custom`], so a
/// backend can still forward vendor specific events (`click`, `mouseover`)
/// without widening this enum.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum EventType {
    LoadStart,
    Progress,
    Suspend,
    Abort,
    Error,
    Emptied,
    Stalled,
    Play,
    Pause,
    LoadedMetadata,
    LoadedData,
    Waiting,
    Playing,
    CanPlay,
    CanPlayThrough,
    Seeking,
    Seeked,
    TimeUpdate,
    Ended,
    RateChange,
    DurationChange,
    VolumeChange,
    RendererReady,
    Custom(String),
}

impl EventType {
    /// The canonical vocabulary, in the order UI collaborators document it.
    pub const CANONICAL: [EventType; 23] = [
        EventType::LoadStart,
        EventType::Progress,
        EventType::Suspend,
        EventType::Abort,
        EventType::Error,
        EventType::Emptied,
        EventType::Stalled,
        EventType::Play,
        EventType::Pause,
        EventType::LoadedMetadata,
        EventType::LoadedData,
        EventType::Waiting,
        EventType::Playing,
        EventType::CanPlay,
        EventType::CanPlayThrough,
        EventType::Seeking,
        EventType::Seeked,
        EventType::TimeUpdate,
        EventType::Ended,
        EventType::RateChange,
        EventType::DurationChange,
        EventType::VolumeChange,
        EventType::RendererReady,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            EventType::LoadStart => "loadstart",
            EventType::Progress => "progress",
            EventType::Suspend => "suspend",
            EventType::Abort => "abort",
            EventType::Error => "error",
            EventType::Emptied => "emptied",
            EventType::Stalled => "stalled",
            EventType::Play => "play",
            EventType::Pause => "pause",
            EventType::LoadedMetadata => "loadedmetadata",
            EventType::LoadedData => "loadeddata",
            EventType::Waiting => "waiting",
            EventType::Playing => "playing",
            EventType::CanPlay => "canplay",
            EventType::CanPlayThrough => "canplaythrough",
            EventType::Seeking => "seeking",
            EventType::Seeked => "seeked",
            EventType::TimeUpdate => "timeupdate",
            EventType::Ended => "ended",
            EventType::RateChange => "ratechange",
            EventType::DurationChange => "durationchange",
            EventType::VolumeChange => "volumechange",
            EventType::RendererReady => "rendererready",
            EventType::Custom(name) => name.as_str(),
        }
    }

    pub fn is_canonical(&self) -> bool {
        !matches!(self, EventType::Custom(_))
    }

    /// Map a raw name onto the vocabulary. Names are matched exactly;
    /// browsers emit lowercase event names.
    pub fn parse(name: &str) -> Self {
        Self::CANONICAL
            .iter()
            .find(|event| event.as_str() == name)
            .cloned()
            .unwrap_or_else(|| EventType::Custom(name.to_string()))
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for EventType {
    fn from(name: &str) -> Self {
        EventType::parse(name)
    }
}

impl From<String> for EventType {
    fn from(name: String) -> Self {
        EventType::parse(&name)
    }
}

impl From<EventType> for String {
    fn from(event: EventType) -> Self {
        event.as_str().to_string()
    }
}

/// The media element an event was dispatched on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventOrigin {
    /// Id of the facade element.
    pub element_id: String,
    /// Renderer active when the event was produced, if any.
    pub renderer: Option<String>,
}

impl EventOrigin {
    pub fn new(element_id: impl Into<String>) -> Self {
        Self {
            element_id: element_id.into(),
            renderer: None,
        }
    }

    pub fn with_renderer(mut self, renderer: impl Into<String>) -> Self {
        self.renderer = Some(renderer.into());
        self
    }
}

/// A normalized event as seen by facade listeners.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaEvent {
    #[serde(rename = "type")]
    pub event_type: EventType,
    pub target: EventOrigin,
    /// Human readable detail, set on `error` events.
    pub message: Option<String>,
    /// Unix milliseconds at creation.
    pub time_stamp: i64,
}

impl MediaEvent {
    pub fn new(event_type: impl Into<EventType>, target: EventOrigin) -> Self {
        Self {
            event_type: event_type.into(),
            target,
            message: None,
            time_stamp: Utc::now().timestamp_millis(),
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn name(&self) -> &str {
        self.event_type.as_str()
    }

    pub fn target(&self) -> &EventOrigin {
        &self.target
    }

    /// Alias of [`MediaEvent::target`], kept for DOM parity.
    pub fn src_element(&self) -> &EventOrigin {
        &self.target
    }

    pub fn is_error(&self) -> bool {
        self.event_type == EventType::Error
    }
}

// ============================================================================
// Event Target
// ============================================================================

/// Listener callback registered on an [`EventTarget`].
pub type Listener = Rc<dyn Fn(&MediaEvent)>;

/// Token returned by [`EventTarget::add_event_listener`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

#[derive(Default)]
struct ListenerRegistry {
    next_id: u64,
    listeners: HashMap<String, Vec<(ListenerId, Listener)>>,
    bus: Option<EventBus>,
}

/// Synchronous pub/sub used when the host offers no native event target.
///
/// Cloning yields another handle to the same listener registry.
#[derive(Clone, Default)]
pub struct EventTarget {
    inner: Rc<RefCell<ListenerRegistry>>,
}

impl EventTarget {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_event_listener<F>(&self, name: &str, callback: F) -> ListenerId
    where
        F: Fn(&MediaEvent) + 'static,
    {
        let mut inner = self.inner.borrow_mut();
        inner.next_id += 1;
        let id = ListenerId(inner.next_id);
        inner
            .listeners
            .entry(name.to_string())
            .or_default()
            .push((id, Rc::new(callback)));
        id
    }

    /// Returns `false` when `id` was not registered under `name`.
    pub fn remove_event_listener(&self, name: &str, id: ListenerId) -> bool {
        let mut inner = self.inner.borrow_mut();
        let Some(list) = inner.listeners.get_mut(name) else {
            return false;
        };
        let before = list.len();
        list.retain(|(existing, _)| *existing != id);
        let removed = list.len() != before;
        if list.is_empty() {
            inner.listeners.remove(name);
        }
        removed
    }

    /// Drop every listener for `name`, or every listener at all for `None`.
    /// Returns how many were removed.
    pub fn remove_all_listeners(&self, name: Option<&str>) -> usize {
        let mut inner = self.inner.borrow_mut();
        match name {
            Some(name) => inner.listeners.remove(name).map_or(0, |list| list.len()),
            None => inner.listeners.drain().map(|(_, list)| list.len()).sum(),
        }
    }

    pub fn listener_count(&self, name: &str) -> usize {
        self.inner
            .borrow()
            .listeners
            .get(name)
            .map_or(0, |list| list.len())
    }

    /// Deliver `event` to every listener registered for its name and mirror it
    /// to the attached bus. Returns the number of listeners called.
    pub fn dispatch_event(&self, event: &MediaEvent) -> usize {
        let (snapshot, bus) = {
            let inner = self.inner.borrow();
            let snapshot: Vec<Listener> = inner
                .listeners
                .get(event.name())
                .map(|list| list.iter().map(|(_, cb)| Rc::clone(cb)).collect())
                .unwrap_or_default();
            (snapshot, inner.bus.clone())
        };

        for callback in &snapshot {
            callback(event);
        }

        if let Some(bus) = bus {
            // No subscribers is not an error for a mirror.
            let _ = bus.emit(event.clone());
        }

        snapshot.len()
    }

    /// Mirror every future dispatch onto `bus`.
    pub fn attach_bus(&self, bus: EventBus) {
        self.inner.borrow_mut().bus = Some(bus);
    }

    pub fn detach_bus(&self) -> Option<EventBus> {
        self.inner.borrow_mut().bus.take()
    }

    /// Non-owning handle for backends, so a handle never keeps its facade's
    /// listeners alive.
    pub fn downgrade(&self) -> WeakEventTarget {
        WeakEventTarget {
            inner: Rc::downgrade(&self.inner),
        }
    }
}

impl fmt::Debug for EventTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        let mut names: Vec<_> = inner.listeners.keys().cloned().collect();
        names.sort();
        f.debug_struct("EventTarget")
            .field("events", &names)
            .field("has_bus", &inner.bus.is_some())
            .finish()
    }
}

/// Weak counterpart of [`EventTarget`].
#[derive(Clone, Default)]
pub struct WeakEventTarget {
    inner: Weak<RefCell<ListenerRegistry>>,
}

impl WeakEventTarget {
    pub fn upgrade(&self) -> Option<EventTarget> {
        self.inner.upgrade().map(|inner| EventTarget { inner })
    }

    /// Dispatch if the target is still alive; returns listeners called.
    pub fn dispatch_event(&self, event: &MediaEvent) -> usize {
        self.upgrade()
            .map_or(0, |target| target.dispatch_event(event))
    }
}

impl fmt::Debug for WeakEventTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeakEventTarget")
            .field("alive", &(self.inner.strong_count() > 0))
            .finish()
    }
}

// ============================================================================
// Event Bus
// ============================================================================

/// Async fan-out of media events.
///
/// Uses `tokio::sync::broadcast`: each subscriber gets every event emitted
/// after it subscribed; slow subscribers observe `RecvError::Lagged`.
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<MediaEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Returns the number of subscribers reached, or an error when there are
    /// none.
    pub fn emit(&self, event: MediaEvent) -> Result<usize, SendError<MediaEvent>> {
        self.sender.send(event)
    }

    pub fn subscribe(&self) -> Receiver<MediaEvent> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_BUFFER_SIZE)
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("subscriber_count", &self.subscriber_count())
            .finish()
    }
}

// ============================================================================
// Event Stream Wrapper
// ============================================================================

type EventFilter = Box<dyn Fn(&MediaEvent) -> bool + Send + Sync>;

/// `broadcast::Receiver` with an optional predicate.
pub struct EventStream {
    receiver: Receiver<MediaEvent>,
    filter: Option<EventFilter>,
}

impl EventStream {
    pub fn new(receiver: Receiver<MediaEvent>) -> Self {
        Self {
            receiver,
            filter: None,
        }
    }

    pub fn filter<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&MediaEvent) -> bool + Send + Sync + 'static,
    {
        self.filter = Some(Box::new(predicate));
        self
    }

    /// Keep only events of the given type.
    pub fn only(self, event_type: EventType) -> Self {
        self.filter(move |event| event.event_type == event_type)
    }

    fn accepts(&self, event: &MediaEvent) -> bool {
        self.filter.as_ref().map_or(true, |filter| filter(event))
    }

    /// Next event passing the filter.
    pub async fn recv(&mut self) -> Result<MediaEvent, RecvError> {
        loop {
            let event = self.receiver.recv().await?;
            if self.accepts(&event) {
                return Ok(event);
            }
        }
    }

    /// Non-blocking variant of [`EventStream::recv`]; `None` when nothing is
    /// queued.
    pub fn try_recv(&mut self) -> Option<Result<MediaEvent, RecvError>> {
        loop {
            match self.receiver.try_recv() {
                Ok(event) => {
                    if self.accepts(&event) {
                        return Some(Ok(event));
                    }
                }
                Err(broadcast::error::TryRecvError::Empty) => return None,
                Err(broadcast::error::TryRecvError::Lagged(n)) => {
                    return Some(Err(RecvError::Lagged(n)))
                }
                Err(broadcast::error::TryRecvError::Closed) => return Some(Err(RecvError::Closed)),
            }
        }
    }
}

impl fmt::Debug for EventStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventStream")
            .field("has_filter", &self.filter.is_some())
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
