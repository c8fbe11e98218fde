//! # Playback Core
//!
//! Renderer abstraction and dispatch for the media facade.
//!
//! ## Overview
//!
//! This crate handles:
//! - Source type classification ([`sniffer`], [`source`])
//! - Renderer descriptors, registry and selection ([`renderer`], [`registry`])
//! - Backend handles and their readiness ([`handle`], [`readiness`])
//! - Queued operations for backends that are not ready yet ([`queue`])
//! - Shared vendor SDK loading ([`loader`])
//! - Canonical event re-dispatch ([`normalizer`])
//! - The uniform media object ([`facade`])
//! - Built-in html5, codec library, iframe and plugin renderers ([`renderers`])
//!
//! ## Threading
//!
//! Everything here runs on the host's UI thread. Shared state uses
//! `Rc`/`RefCell`; no borrow is held while user callbacks run.

pub mod error;
pub mod facade;
pub mod handle;
pub mod loader;
pub mod normalizer;
pub mod queue;
pub mod readiness;
pub mod registry;
pub mod renderer;
pub mod renderers;
pub mod sniffer;
pub mod source;

pub use error::{PlaybackError, Result, ERROR_CREATING_RENDERER, NO_RENDERER_FOUND};
pub use facade::{MediaElement, MediaElementBuilder};
pub use handle::{Accessor, AccessorTable, BackendHandle};
pub use loader::{LoaderState, SdkLoader};
pub use normalizer::{EventNormalizer, TimeupdatePoller, READY_SEQUENCE};
pub use queue::{CommandQueue, DrainSummary, PendingOperation};
pub use readiness::Readiness;
pub use registry::{RendererRegistry, Selection};
pub use renderer::{merge_options, FnRenderer, RendererContext, RendererDescriptor, RendererOptions};
pub use renderers::{BuiltinRenderers, RendererHost};
pub use sniffer::TypeSniffer;
pub use source::{MediaSource, SourceInput, SourceSpec};
