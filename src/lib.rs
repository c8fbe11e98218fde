//! Workspace umbrella crate.
//!
//! Re-exports the media facade crates behind feature flags so host
//! applications can depend on `media-facade-workspace` and pick the pieces
//! they need (`playback` for the core, `headless` for the in-memory hosts)
//! without wiring each crate individually.

#[cfg(feature = "playback")]
pub use core_playback as playback;
#[cfg(feature = "playback")]
pub use core_runtime as runtime;

#[cfg(feature = "headless")]
pub use bridge_headless as headless;
