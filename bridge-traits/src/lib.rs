//! # Host Bridge Traits
//!
//! Contracts between the media facade core and the environment hosting it.
//!
//! ## Overview
//!
//! The core never touches a DOM, an iframe or a plugin directly. Everything it
//! needs from the host is expressed as a trait here and implemented once per
//! environment (browser glue, headless test host, server-side renderer).
//!
//! ## Traits
//!
//! ### Native media
//! - [`NativeMediaHost`](media::NativeMediaHost) - `canPlayType` probe and node factory
//! - [`NativeMediaNode`](media::NativeMediaNode) - property/method access and raw events on one node
//!
//! ### Vendor players
//! - [`VendorHost`](vendor::VendorHost) - SDK script injection and player construction
//! - [`VendorPlayer`](vendor::VendorPlayer) - request/response control of a built player
//!
//! ### Utilities
//! - [`IntervalScheduler`](scheduler::IntervalScheduler) - repeating timers on the host loop
//! - [`LoggerSink`](logging::LoggerSink) - forward structured logs to host logging
//!
//! ## Threading
//!
//! Media hosts are single threaded: callbacks are `Rc<dyn Fn>` and nothing in
//! [`media`] or [`vendor`] is `Send`. Only [`LoggerSink`](logging::LoggerSink)
//! is `Send + Sync`, because it is fed from the global tracing subscriber.
//!
//! ## Error Handling
//!
//! Every trait returns [`BridgeError`](error::BridgeError). Hosts report a
//! missing member with `BridgeError::Unsupported` so the core can degrade
//! quietly instead of surfacing an error event.

pub mod error;
pub mod logging;
pub mod media;
pub mod scheduler;
pub mod vendor;

pub use error::BridgeError;

pub use logging::{LogEntry, LogLevel, LoggerSink, StderrLogger};
pub use media::{
    CanPlayResponse, MediaFeatures, Method, NativeEvent, NativeListener, NativeMediaHost,
    NativeMediaNode, Property, PropertyValue, TimeRanges,
};
pub use scheduler::{IntervalScheduler, TimerId};
pub use vendor::{
    PlayerRequest, PlayerState, ReadySignal, VendorEvent, VendorEventSink, VendorHost,
    VendorPlayer,
};
