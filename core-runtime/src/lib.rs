//! # Core Runtime Module
//!
//! Runtime infrastructure shared by the media facade crates:
//! - Logging and tracing setup
//! - Media element configuration
//! - Canonical media events, listener registry and async event bus
//!
//! ## Overview
//!
//! Nothing in here knows about renderers. `core-playback` builds on these
//! pieces; hosts use them directly to configure logging and to load options.

pub mod config;
pub mod error;
pub mod events;
pub mod logging;

pub use config::{MediaElementOptions, MediaElementOptionsBuilder};
pub use error::{Error, Result};
pub use events::{
    EventBus, EventOrigin, EventStream, EventTarget, EventType, ListenerId, MediaEvent,
    WeakEventTarget,
};
