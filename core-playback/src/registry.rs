//! # Renderer Registry
//!
//! Ordered collection of [`RendererDescriptor`]s. Registration order is the
//! default selection priority.
//!
//! ## Selection
//!
//! [`RendererRegistry::select_renderer`] walks candidate renderers in order
//! and, for each, walks the sources in caller order. The first pair where the
//! renderer accepts the source type wins, so renderer priority dominates
//! source priority:
//!
//! ```rust
//! use core_playback::registry::RendererRegistry;
//! use core_playback::renderer::FnRenderer;
//! use core_playback::source::MediaSource;
//! use core_playback::PlaybackError;
//!
//! let mut registry = RendererRegistry::new();
//! for (name, types) in [("html5", &["video/mp4"][..]), ("flash_video", &["video/mp4", "video/flv"][..])] {
//!     registry.register(FnRenderer::for_types(name, types, |ctx, _, _| {
//!         Err(PlaybackError::creation(ctx.renderer, "doc example"))
//!     }));
//! }
//!
//! let sources = [MediaSource::new("a.flv", "video/flv"), MediaSource::new("a.mp4", "video/mp4")];
//! let picked = registry.select_renderer(&sources, None).unwrap();
//! assert_eq!(picked.renderer_name, "html5");
//! assert_eq!(picked.src, "a.mp4");
//! ```

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use tracing::{debug, warn};

use crate::error::{PlaybackError, Result};
use crate::renderer::RendererDescriptor;
use crate::source::MediaSource;

/// Outcome of a successful selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub renderer_name: String,
    pub src: String,
    /// Index of the chosen source in the list passed to selection.
    pub source_index: usize,
}

#[derive(Default)]
pub struct RendererRegistry {
    descriptors: HashMap<String, Rc<dyn RendererDescriptor>>,
    order: Vec<String>,
}

impl RendererRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<D>(&mut self, descriptor: D)
    where
        D: RendererDescriptor + 'static,
    {
        self.register_rc(Rc::new(descriptor));
    }

    /// Register a shared descriptor. Re-registering a name replaces the
    /// descriptor but keeps its original priority.
    pub fn register_rc(&mut self, descriptor: Rc<dyn RendererDescriptor>) {
        let name = descriptor.name().to_string();
        if self.descriptors.insert(name.clone(), descriptor).is_some() {
            warn!(renderer = %name, "renderer registered twice; keeping original priority");
        } else {
            debug!(renderer = %name, priority = self.order.len(), "renderer registered");
            self.order.push(name);
        }
    }

    /// Like [`register`](Self::register) but refuses duplicates.
    pub fn register_unique<D>(&mut self, descriptor: D) -> Result<()>
    where
        D: RendererDescriptor + 'static,
    {
        if self.contains(descriptor.name()) {
            return Err(PlaybackError::DuplicateRenderer(descriptor.name().to_string()));
        }
        self.register(descriptor);
        Ok(())
    }

    pub fn descriptor(&self, name: &str) -> Option<Rc<dyn RendererDescriptor>> {
        self.descriptors.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.descriptors.contains_key(name)
    }

    /// Registered names in priority order.
    pub fn order(&self) -> &[String] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Pick the first `(renderer, source)` pair that can play.
    ///
    /// `allowed` restricts and reorders the candidates; `None` or an empty
    /// list means every registered renderer in registration order. Unknown
    /// names in `allowed` are skipped.
    pub fn select_renderer(
        &self,
        sources: &[MediaSource],
        allowed: Option<&[String]>,
    ) -> Option<Selection> {
        let candidates = match allowed {
            Some(names) if !names.is_empty() => names,
            _ => self.order.as_slice(),
        };

        for name in candidates {
            let Some(descriptor) = self.descriptors.get(name) else {
                continue;
            };
            for (index, source) in sources.iter().enumerate() {
                if descriptor.can_play_type(&source.mime_type) {
                    return Some(Selection {
                        renderer_name: name.clone(),
                        src: source.src.clone(),
                        source_index: index,
                    });
                }
            }
        }

        None
    }
}

impl fmt::Debug for RendererRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RendererRegistry")
            .field("order", &self.order)
            .finish()
    }
}
