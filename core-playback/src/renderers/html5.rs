//! Native media node renderer.
//!
//! Ready as soon as the host hands out a node. Properties and methods pass
//! straight through; the node's own media and pointer events are bridged
//! onto the facade.

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use bridge_traits::media::{
    CanPlayResponse, Method, NativeEvent, NativeMediaHost, NativeMediaNode, Property,
    PropertyValue,
};
use core_runtime::events::EventType;
use tracing::debug;

use crate::error::{PlaybackError, Result};
use crate::handle::BackendHandle;
use crate::normalizer::{EventNormalizer, NATIVE_MEDIA_EVENTS, POINTER_EVENTS};
use crate::renderer::{RendererContext, RendererDescriptor, RendererOptions};
use crate::source::MediaSource;

pub const HTML5: &str = "html5";

pub struct Html5Renderer {
    host: Rc<dyn NativeMediaHost>,
}

impl Html5Renderer {
    pub fn new(host: Rc<dyn NativeMediaHost>) -> Self {
        Self { host }
    }
}

impl RendererDescriptor for Html5Renderer {
    fn name(&self) -> &str {
        HTML5
    }

    fn can_play_type(&self, mime: &str) -> bool {
        self.host.can_play_type(mime).is_playable()
    }

    fn create(
        &self,
        ctx: RendererContext,
        _options: RendererOptions,
        sources: &[MediaSource],
    ) -> Result<Rc<dyn BackendHandle>> {
        let node = self
            .host
            .create_node(&ctx.element_id)
            .map_err(|err| PlaybackError::creation(HTML5, err.to_string()))?;

        let backend = Html5Backend::new(node, EventNormalizer::from_context(&ctx));
        if let Some(source) = sources.first() {
            backend.set(Property::Src, PropertyValue::from(source.src.as_str()))?;
        }
        backend.normalizer.emit(EventType::RendererReady);
        Ok(Rc::new(backend))
    }
}

impl fmt::Debug for Html5Renderer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Html5Renderer").finish()
    }
}

pub struct Html5Backend {
    node: Rc<dyn NativeMediaNode>,
    normalizer: EventNormalizer,
    alive: Rc<Cell<bool>>,
}

impl Html5Backend {
    /// Wrap `node` and start bridging its events.
    pub fn new(node: Rc<dyn NativeMediaNode>, normalizer: EventNormalizer) -> Self {
        let alive = Rc::new(Cell::new(true));
        for name in NATIVE_MEDIA_EVENTS.iter().chain(POINTER_EVENTS.iter()) {
            let normalizer = normalizer.clone();
            let alive = alive.clone();
            node.add_listener(
                name,
                Rc::new(move |event: &NativeEvent| {
                    if alive.get() {
                        normalizer.forward_native(event);
                    }
                }),
            );
        }
        Self {
            node,
            normalizer,
            alive,
        }
    }

    fn is_alive(&self) -> bool {
        self.alive.get()
    }
}

impl BackendHandle for Html5Backend {
    fn renderer_name(&self) -> String {
        HTML5.to_string()
    }

    fn get(&self, property: Property) -> Result<PropertyValue> {
        if !self.is_alive() {
            return Ok(property.neutral_default());
        }
        Ok(self.node.get(property)?)
    }

    fn set(&self, property: Property, value: PropertyValue) -> Result<()> {
        if !self.is_alive() {
            return Ok(());
        }
        if !property.is_writable() {
            return Err(PlaybackError::ReadOnly(property.to_string()));
        }
        Ok(self.node.set(property, value)?)
    }

    fn call(&self, method: Method) -> Result<()> {
        if !self.is_alive() {
            return Ok(());
        }
        if method == Method::Stop {
            return Err(PlaybackError::unsupported(HTML5, "call stop"));
        }
        Ok(self.node.invoke(method)?)
    }

    fn supports(&self, method: Method) -> bool {
        method != Method::Stop
    }

    fn can_play_type(&self, mime: &str) -> CanPlayResponse {
        self.node.can_play_type(mime)
    }

    fn show(&self) {
        if self.is_alive() {
            self.node.set_visible(true);
        }
    }

    fn hide(&self) {
        if self.is_alive() {
            self.node.set_visible(false);
        }
    }

    fn set_size(&self, width: u32, height: u32) -> Result<()> {
        if !self.is_alive() {
            return Ok(());
        }
        Ok(self.node.set_size(width, height)?)
    }

    fn destroy(&self) {
        if self.alive.replace(false) {
            debug!(node = %self.node.id(), "native node removed");
            self.node.remove();
        }
    }
}

impl fmt::Debug for Html5Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Html5Backend")
            .field("node", &self.node.id())
            .field("alive", &self.alive.get())
            .finish()
    }
}
