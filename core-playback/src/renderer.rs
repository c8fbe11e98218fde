//! # Renderer Descriptors
//!
//! A descriptor is the registered capability object for one backend kind:
//! a unique name, a `canPlayType` predicate, static default options and a
//! factory producing [`BackendHandle`]s.
//!
//! Descriptors are immutable once registered. The factory does not receive
//! the facade itself; it gets a [`RendererContext`] carrying what a backend
//! may use: the element id, a weak event target to dispatch normalized
//! events on, and the sizing/autoplay settings.

use std::fmt;
use std::rc::Rc;
use std::time::Duration;

use core_runtime::events::{EventOrigin, WeakEventTarget};
use serde_json::{Map, Value};

use crate::error::Result;
use crate::handle::BackendHandle;
use crate::source::MediaSource;

/// Renderer options: a JSON object merged from descriptor defaults and the
/// element options.
pub type RendererOptions = Map<String, Value>;

/// What a descriptor's factory gets to know about the requesting facade.
#[derive(Debug, Clone)]
pub struct RendererContext {
    pub element_id: String,
    /// Name of the renderer being created.
    pub renderer: String,
    pub events: WeakEventTarget,
    pub autoplay: bool,
    pub width: u32,
    pub height: u32,
    pub poll_interval: Duration,
}

impl RendererContext {
    /// Origin stamped on events this backend dispatches.
    pub fn origin(&self) -> EventOrigin {
        EventOrigin::new(self.element_id.clone()).with_renderer(self.renderer.clone())
    }
}

pub trait RendererDescriptor {
    /// Unique registry key, e.g. `html5` or `youtube_iframe`.
    fn name(&self) -> &str;

    fn can_play_type(&self, mime: &str) -> bool;

    /// Static defaults; lowest precedence when merging.
    fn default_options(&self) -> RendererOptions {
        Map::new()
    }

    fn create(
        &self,
        ctx: RendererContext,
        options: RendererOptions,
        sources: &[MediaSource],
    ) -> Result<Rc<dyn BackendHandle>>;
}

/// Overlay `overrides` on `defaults`, recursing into nested objects, then pin
/// `prefix` to the renderer name.
pub fn merge_options(
    defaults: &RendererOptions,
    overrides: &RendererOptions,
    renderer: &str,
) -> RendererOptions {
    let mut merged = defaults.clone();
    deep_merge(&mut merged, overrides);
    merged.insert("prefix".to_string(), Value::String(renderer.to_string()));
    merged
}

fn deep_merge(base: &mut RendererOptions, overlay: &RendererOptions) {
    for (key, value) in overlay {
        match (base.get_mut(key), value) {
            (Some(Value::Object(existing)), Value::Object(incoming)) => {
                deep_merge(existing, incoming);
            }
            _ => {
                base.insert(key.clone(), value.clone());
            }
        }
    }
}

type CanPlayFn = Box<dyn Fn(&str) -> bool>;
type FactoryFn =
    Box<dyn Fn(RendererContext, RendererOptions, &[MediaSource]) -> Result<Rc<dyn BackendHandle>>>;

/// Descriptor assembled from closures. Handy for host specific renderers
/// that do not warrant their own type.
pub struct FnRenderer {
    name: String,
    can_play: CanPlayFn,
    factory: FactoryFn,
    defaults: RendererOptions,
}

impl FnRenderer {
    pub fn new<C, F>(name: impl Into<String>, can_play: C, factory: F) -> Self
    where
        C: Fn(&str) -> bool + 'static,
        F: Fn(RendererContext, RendererOptions, &[MediaSource]) -> Result<Rc<dyn BackendHandle>>
            + 'static,
    {
        Self {
            name: name.into(),
            can_play: Box::new(can_play),
            factory: Box::new(factory),
            defaults: Map::new(),
        }
    }

    /// Descriptor accepting exactly the listed MIME types.
    pub fn for_types<F>(name: impl Into<String>, mime_types: &[&str], factory: F) -> Self
    where
        F: Fn(RendererContext, RendererOptions, &[MediaSource]) -> Result<Rc<dyn BackendHandle>>
            + 'static,
    {
        let accepted: Vec<String> = mime_types.iter().map(|t| t.to_string()).collect();
        Self::new(
            name,
            move |mime| accepted.iter().any(|t| t == mime),
            factory,
        )
    }

    pub fn with_defaults(mut self, defaults: RendererOptions) -> Self {
        self.defaults = defaults;
        self
    }
}

impl RendererDescriptor for FnRenderer {
    fn name(&self) -> &str {
        &self.name
    }

    fn can_play_type(&self, mime: &str) -> bool {
        (self.can_play)(mime)
    }

    fn default_options(&self) -> RendererOptions {
        self.defaults.clone()
    }

    fn create(
        &self,
        ctx: RendererContext,
        options: RendererOptions,
        sources: &[MediaSource],
    ) -> Result<Rc<dyn BackendHandle>> {
        (self.factory)(ctx, options, sources)
    }
}

impl fmt::Debug for FnRenderer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnRenderer")
            .field("name", &self.name)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PlaybackError;
    use serde_json::json;

    fn object(value: Value) -> RendererOptions {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn test_merge_prefers_overrides_and_recurses() {
        let defaults = object(json!({
            "prefix": "ignored",
            "youtube": { "controls": 0, "rel": 0 },
            "autoplay": false
        }));
        let overrides = object(json!({
            "youtube": { "rel": 1 },
            "autoplay": true
        }));

        let merged = merge_options(&defaults, &overrides, "youtube_iframe");
        assert_eq!(merged["prefix"], "youtube_iframe");
        assert_eq!(merged["youtube"], json!({ "controls": 0, "rel": 1 }));
        assert_eq!(merged["autoplay"], true);
    }

    #[test]
    fn test_fn_renderer_for_types() {
        let renderer = FnRenderer::for_types("custom", &["video/x-custom"], |ctx, _, _| {
            Err(PlaybackError::creation(ctx.renderer, "not in tests"))
        })
        .with_defaults(object(json!({ "custom": { "level": 3 } })));

        assert_eq!(renderer.name(), "custom");
        assert!(renderer.can_play_type("video/x-custom"));
        assert!(!renderer.can_play_type("video/mp4"));
        assert_eq!(renderer.default_options()["custom"]["level"], 3);
    }
}
