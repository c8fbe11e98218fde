//! # Headless Bridge Implementations
//!
//! In-memory implementations of the bridge traits for hosts without a
//! browser: server-side rendering, CI, and the test suites of the core
//! crates.
//!
//! ## Overview
//!
//! - `ManualScheduler` - interval timers fired explicitly with `tick()`
//! - `LocalIntervalScheduler` - real timers on a tokio `LocalSet`
//! - `HeadlessMediaHost` / `HeadlessMediaNode` - scripted native media nodes
//! - `ScriptedVendorHost` / `ScriptedPlayer` - vendor SDKs whose script loads
//!   and player readiness are completed on demand
//!
//! ## Usage
//!
//! ```ignore
//! use bridge_headless::{ManualScheduler, ScriptedVendorHost};
//!
//! let host = Rc::new(ScriptedVendorHost::new());
//! // ... build a media element against `host` ...
//! host.finish_script("youtube");
//! let player = host.complete_next().unwrap();
//! player.push_state(PlayerState::Playing);
//! ```

mod media;
mod scheduler;
mod vendor;

pub use media::{HeadlessMediaHost, HeadlessMediaNode};
pub use scheduler::{LocalIntervalScheduler, ManualScheduler};
pub use vendor::{ScriptedPlayer, ScriptedVendorHost};
