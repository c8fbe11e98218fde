//! # Media Element Facade
//!
//! [`MediaElement`] is the object callers hold. It exposes one fixed
//! property/method/event surface and forwards everything to whichever
//! backend handle is active.
//!
//! ## Overview
//!
//! - [`set_src`](MediaElement::set_src) resolves source types, selects a
//!   renderer and activates it. Selection and construction failures become
//!   an `error` event; nothing is returned as `Err`.
//! - Handles are cached per renderer name. Switching away pauses and hides
//!   the old handle; switching back reuses it without rebuilding.
//! - Exactly one handle is active. Operations are never broadcast to cached
//!   handles.
//! - Sets and calls made before any handle exists are held in a facade level
//!   [`CommandQueue`] and replayed into the first handle activated.
//! - After [`destroy`](MediaElement::destroy) every call is a no-op.
//!
//! ## Usage
//!
//! ```rust,ignore
//! let media = MediaElement::builder(registry, sniffer)
//!     .with_options(options)
//!     .build()?;
//! media.add_event_listener("error", |event| eprintln!("{:?}", event.message));
//! media.set_src("https://www.youtube.com/watch?v=yyWWXSwtPP0");
//! media.set_volume(0.3);
//! media.play();
//! ```

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use bridge_traits::media::{CanPlayResponse, Method, Property, PropertyValue, TimeRanges};
use core_runtime::config::MediaElementOptions;
use core_runtime::events::{
    EventBus, EventOrigin, EventTarget, EventType, ListenerId, MediaEvent,
};
use futures::future::LocalBoxFuture;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{PlaybackError, Result};
use crate::handle::BackendHandle;
use crate::queue::{CommandQueue, PendingOperation};
use crate::readiness::Readiness;
use crate::registry::RendererRegistry;
use crate::renderer::{merge_options, RendererContext, RendererDescriptor};
use crate::sniffer::TypeSniffer;
use crate::source::{MediaSource, SourceSpec};

#[derive(Default)]
struct FacadeState {
    active: Option<Rc<dyn BackendHandle>>,
    active_name: Option<String>,
    handles: HashMap<String, Rc<dyn BackendHandle>>,
    /// Operations issued while no handle was active.
    pending: CommandQueue,
    sources: Vec<MediaSource>,
    destroyed: bool,
}

/// Uniform media object.
pub struct MediaElement {
    id: String,
    options: MediaElementOptions,
    registry: Rc<RendererRegistry>,
    sniffer: Rc<TypeSniffer>,
    events: EventTarget,
    state: RefCell<FacadeState>,
}

/// Builder for [`MediaElement`].
pub struct MediaElementBuilder {
    registry: Rc<RendererRegistry>,
    sniffer: Rc<TypeSniffer>,
    options: MediaElementOptions,
    id: Option<String>,
    bus: Option<EventBus>,
}

impl MediaElementBuilder {
    pub fn with_options(mut self, options: MediaElementOptions) -> Self {
        self.options = options;
        self
    }

    /// Element id; defaults to `mejs_` plus a random suffix.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Mirror every dispatched event onto `bus`.
    pub fn with_event_bus(mut self, bus: EventBus) -> Self {
        self.bus = Some(bus);
        self
    }

    pub fn build(self) -> Result<MediaElement> {
        self.options.validate()?;
        let id = match self.id {
            Some(id) if id.trim().is_empty() => {
                return Err(core_runtime::Error::Config(
                    "Media element id must not be empty".to_string(),
                )
                .into())
            }
            Some(id) => id,
            None => format!("mejs_{}", Uuid::new_v4().simple()),
        };

        let events = EventTarget::new();
        if let Some(bus) = self.bus {
            events.attach_bus(bus);
        }

        debug!(element = %id, renderers = self.registry.len(), "media element created");
        Ok(MediaElement {
            id,
            options: self.options,
            registry: self.registry,
            sniffer: self.sniffer,
            events,
            state: RefCell::new(FacadeState::default()),
        })
    }
}

impl MediaElement {
    pub fn builder(registry: Rc<RendererRegistry>, sniffer: Rc<TypeSniffer>) -> MediaElementBuilder {
        MediaElementBuilder {
            registry,
            sniffer,
            options: MediaElementOptions::default(),
            id: None,
            bus: None,
        }
    }

    /// Facade with default options.
    pub fn new(registry: Rc<RendererRegistry>, sniffer: Rc<TypeSniffer>) -> Result<Self> {
        Self::builder(registry, sniffer).build()
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn options(&self) -> &MediaElementOptions {
        &self.options
    }

    pub fn active_renderer_name(&self) -> Option<String> {
        self.state.borrow().active_name.clone()
    }

    /// Readiness of the active handle.
    pub fn readiness(&self) -> Option<Readiness> {
        self.active_handle().map(|handle| handle.readiness())
    }

    /// Sources from the last successful `set_src`, with resolved types.
    pub fn sources(&self) -> Vec<MediaSource> {
        self.state.borrow().sources.clone()
    }

    /// Number of renderers built so far.
    pub fn cached_renderers(&self) -> usize {
        self.state.borrow().handles.len()
    }

    pub fn is_destroyed(&self) -> bool {
        self.state.borrow().destroyed
    }

    fn active_handle(&self) -> Option<Rc<dyn BackendHandle>> {
        let state = self.state.borrow();
        if state.destroyed {
            return None;
        }
        state.active.clone()
    }

    fn origin(&self) -> EventOrigin {
        let origin = EventOrigin::new(self.id.clone());
        match self.active_renderer_name() {
            Some(renderer) => origin.with_renderer(renderer),
            None => origin,
        }
    }

    /// Turn an expected failure into the canonical `error` event.
    fn report(&self, err: &PlaybackError) {
        warn!(element = %self.id, error = %err, "media element error");
        let event =
            MediaEvent::new(EventType::Error, self.origin()).with_message(err.event_message());
        self.events.dispatch_event(&event);
    }

    /// Absorb the result of a forwarded operation: misses are logged, real
    /// failures become an `error` event.
    fn absorb(&self, operation: &str, result: Result<()>) -> bool {
        match result {
            Ok(()) => true,
            Err(err) if err.is_dispatch_miss() => {
                debug!(element = %self.id, operation, reason = %err, "operation skipped");
                false
            }
            Err(err) => {
                self.report(&err);
                false
            }
        }
    }

    // ========================================================================
    // Source selection
    // ========================================================================

    /// Resolve `spec`, pick a renderer and activate it. Returns `false` when
    /// an `error` event was dispatched instead.
    pub fn set_src(&self, spec: impl Into<SourceSpec>) -> bool {
        if self.is_destroyed() {
            return false;
        }

        let sources = spec.into().resolve(&self.sniffer);
        if sources.is_empty() {
            self.report(&PlaybackError::InvalidSource("empty source list".to_string()));
            return false;
        }

        let Some(selection) = self
            .registry
            .select_renderer(&sources, self.options.allowed_renderers())
        else {
            let types: Vec<&str> = sources.iter().map(|s| s.mime_type.as_str()).collect();
            debug!(element = %self.id, ?types, "no renderer accepts sources");
            self.report(&PlaybackError::NoRendererFound);
            return false;
        };

        debug!(
            element = %self.id,
            renderer = %selection.renderer_name,
            src = %core_runtime::logging::loggable_url(&selection.src),
            "renderer selected"
        );
        self.state.borrow_mut().sources = sources.clone();

        match self.switch_renderer(&selection.renderer_name, &sources) {
            Ok(()) => true,
            Err(err) => {
                self.report(&err);
                false
            }
        }
    }

    /// Activate renderer `name` for `sources`. Returns `false` when the
    /// renderer is unknown, outside the allow-list, or could not be built.
    pub fn change_renderer(&self, name: &str, sources: &[MediaSource]) -> bool {
        if self.is_destroyed() {
            return false;
        }
        match self.switch_renderer(name, sources) {
            Ok(()) => true,
            Err(err) => {
                debug!(element = %self.id, renderer = name, error = %err, "renderer change refused");
                false
            }
        }
    }

    fn switch_renderer(&self, name: &str, sources: &[MediaSource]) -> Result<()> {
        if let Some(allowed) = self.options.allowed_renderers() {
            if !allowed.iter().any(|allowed| allowed == name) {
                return Err(PlaybackError::UnknownRenderer(name.to_string()));
            }
        }
        let descriptor = self
            .registry
            .descriptor(name)
            .ok_or_else(|| PlaybackError::UnknownRenderer(name.to_string()))?;

        // The renderer gets the sources it can play, selected one first.
        let playable: Vec<MediaSource> = sources
            .iter()
            .filter(|source| descriptor.can_play_type(&source.mime_type))
            .cloned()
            .collect();
        let sources = if playable.is_empty() {
            sources.to_vec()
        } else {
            playable
        };

        let (active, previous, cached) = {
            let mut state = self.state.borrow_mut();
            // A handle whose construction failed is rebuilt, not reused.
            let before = state.handles.len();
            state
                .handles
                .retain(|_, handle| !handle.readiness().is_terminal());
            if state
                .active
                .as_ref()
                .is_some_and(|handle| handle.readiness().is_terminal())
            {
                state.active = None;
                state.active_name = None;
            }
            let pruned = before - state.handles.len();
            if pruned > 0 {
                debug!(element = %self.id, pruned, "destroyed handles dropped from cache");
            }
            (
                state.active.clone(),
                state.active_name.clone(),
                state.handles.get(name).cloned(),
            )
        };

        if let Some(active) = &active {
            if previous.as_deref() == Some(name) {
                self.quiesce(active.as_ref());
                active.show();
                self.point_at(active.as_ref(), &sources);
                debug!(element = %self.id, renderer = name, "renderer reused");
                return Ok(());
            }
            self.quiesce(active.as_ref());
            active.hide();
        }

        let handle = match cached {
            Some(handle) => {
                handle.show();
                self.point_at(handle.as_ref(), &sources);
                handle
            }
            None => match self.create_handle(descriptor.as_ref(), name, &sources) {
                Ok(handle) => {
                    handle.show();
                    self.state
                        .borrow_mut()
                        .handles
                        .insert(name.to_string(), handle.clone());
                    handle
                }
                Err(err) => {
                    let mut state = self.state.borrow_mut();
                    state.active = None;
                    state.active_name = None;
                    return Err(err);
                }
            },
        };

        let mut pending = {
            let mut state = self.state.borrow_mut();
            state.active = Some(handle.clone());
            state.active_name = Some(name.to_string());
            std::mem::take(&mut state.pending)
        };
        if !pending.is_empty() {
            pending.drain(handle.as_ref());
        }

        info!(
            element = %self.id,
            from = previous.as_deref().unwrap_or("none"),
            to = name,
            "renderer activated"
        );
        Ok(())
    }

    fn create_handle(
        &self,
        descriptor: &dyn RendererDescriptor,
        name: &str,
        sources: &[MediaSource],
    ) -> Result<Rc<dyn BackendHandle>> {
        let options = merge_options(
            &descriptor.default_options(),
            &self.options.to_json_map()?,
            name,
        );
        let ctx = RendererContext {
            element_id: self.id.clone(),
            renderer: name.to_string(),
            events: self.events.downgrade(),
            autoplay: self.options.autoplay,
            width: self.options.width,
            height: self.options.height,
            poll_interval: self.options.poll_interval(),
        };
        descriptor
            .create(ctx, options, sources)
            .map_err(|err| match err {
                PlaybackError::RendererCreation { .. } => err,
                other => PlaybackError::creation(name, other.to_string()),
            })
    }

    /// Pause, and stop where the backend has a stop.
    fn quiesce(&self, handle: &dyn BackendHandle) {
        self.absorb("call pause", handle.call(Method::Pause));
        if handle.supports(Method::Stop) {
            self.absorb("call stop", handle.call(Method::Stop));
        }
    }

    fn point_at(&self, handle: &dyn BackendHandle, sources: &[MediaSource]) {
        if let Some(source) = sources.first() {
            self.absorb(
                "set src",
                handle.set(Property::Src, PropertyValue::from(source.src.as_str())),
            );
        }
    }

    // ========================================================================
    // Properties
    // ========================================================================

    /// Read `property` from the active handle, or its neutral default.
    pub fn get(&self, property: Property) -> PropertyValue {
        let Some(handle) = self.active_handle() else {
            return property.neutral_default();
        };
        match handle.get(property) {
            Ok(value) => value,
            Err(err) => {
                debug!(element = %self.id, property = %property, reason = %err, "get answered with default");
                property.neutral_default()
            }
        }
    }

    /// Write `property`. Assigning `src` goes through [`set_src`](Self::set_src).
    pub fn set(&self, property: Property, value: impl Into<PropertyValue>) {
        if self.is_destroyed() {
            return;
        }
        let value = value.into();
        if property == Property::Src {
            match value.as_str() {
                Some(url) => {
                    self.set_src(url);
                }
                None => self.report(&PlaybackError::InvalidSource(format!("{:?}", value))),
            }
            return;
        }

        match self.active_handle() {
            Some(handle) => {
                self.absorb(&format!("set {}", property), handle.set(property, value));
            }
            None => {
                if !property.is_writable() {
                    debug!(element = %self.id, property = %property, "read-only property ignored");
                    return;
                }
                self.state
                    .borrow_mut()
                    .pending
                    .enqueue(PendingOperation::Set { property, value });
            }
        }
    }

    pub fn volume(&self) -> Option<f64> {
        self.get(Property::Volume).as_f64()
    }

    pub fn set_volume(&self, volume: f64) {
        self.set(Property::Volume, volume);
    }

    pub fn muted(&self) -> bool {
        self.get(Property::Muted).truthy()
    }

    pub fn set_muted(&self, muted: bool) {
        self.set(Property::Muted, muted);
    }

    pub fn current_time(&self) -> f64 {
        self.get(Property::CurrentTime).as_f64().unwrap_or_default()
    }

    pub fn set_current_time(&self, seconds: f64) {
        self.set(Property::CurrentTime, seconds);
    }

    pub fn duration(&self) -> f64 {
        self.get(Property::Duration).as_f64().unwrap_or_default()
    }

    pub fn paused(&self) -> bool {
        self.get(Property::Paused).as_bool().unwrap_or(true)
    }

    pub fn ended(&self) -> bool {
        self.get(Property::Ended).truthy()
    }

    pub fn src(&self) -> Option<String> {
        self.get(Property::Src).as_str().map(str::to_string)
    }

    pub fn buffered(&self) -> TimeRanges {
        self.get(Property::Buffered)
            .as_ranges()
            .cloned()
            .unwrap_or_default()
    }

    pub fn playback_rate(&self) -> Option<f64> {
        self.get(Property::PlaybackRate).as_f64()
    }

    pub fn set_playback_rate(&self, rate: f64) {
        self.set(Property::PlaybackRate, rate);
    }

    pub fn set_loop(&self, looping: bool) {
        self.set(Property::Loop, looping);
    }

    // ========================================================================
    // Methods
    // ========================================================================

    fn invoke(&self, method: Method) {
        if self.is_destroyed() {
            return;
        }
        match self.active_handle() {
            Some(handle) => {
                if method == Method::Stop && !handle.supports(Method::Stop) {
                    debug!(element = %self.id, "stop not supported by active renderer");
                    return;
                }
                self.absorb(&format!("call {}", method), handle.call(method));
            }
            None => {
                self.state
                    .borrow_mut()
                    .pending
                    .enqueue(PendingOperation::call(method));
            }
        }
    }

    pub fn play(&self) {
        self.invoke(Method::Play);
    }

    pub fn pause(&self) {
        self.invoke(Method::Pause);
    }

    pub fn load(&self) {
        self.invoke(Method::Load);
    }

    pub fn stop(&self) {
        self.invoke(Method::Stop);
    }

    /// Never queued. Without a ready handle the registry's descriptors
    /// answer, restricted to the allow-list.
    pub fn can_play_type(&self, mime: &str) -> CanPlayResponse {
        if let Some(handle) = self.active_handle() {
            if handle.readiness().is_ready() {
                return handle.can_play_type(mime);
            }
        }
        let candidates = self
            .options
            .allowed_renderers()
            .unwrap_or_else(|| self.registry.order());
        candidates
            .iter()
            .filter_map(|name| self.registry.descriptor(name))
            .any(|descriptor| descriptor.can_play_type(mime))
            .into()
    }

    pub fn set_size(&self, width: u32, height: u32) {
        match self.active_handle() {
            Some(handle) => {
                self.absorb("set size", handle.set_size(width, height));
            }
            None => debug!(element = %self.id, width, height, "resize before any renderer ignored"),
        }
    }

    /// Resolves once the active handle is ready.
    pub fn when_ready(&self) -> LocalBoxFuture<'static, Result<()>> {
        if self.is_destroyed() {
            return Box::pin(futures::future::ready(Err(PlaybackError::Cancelled)));
        }
        match self.active_handle() {
            Some(handle) => handle.when_ready(),
            None => Box::pin(futures::future::ready(Err(PlaybackError::NoRendererFound))),
        }
    }

    // ========================================================================
    // Events
    // ========================================================================

    pub fn add_event_listener<F>(&self, name: &str, callback: F) -> ListenerId
    where
        F: Fn(&MediaEvent) + 'static,
    {
        self.events.add_event_listener(name, callback)
    }

    pub fn remove_event_listener(&self, name: &str, id: ListenerId) -> bool {
        self.events.remove_event_listener(name, id)
    }

    /// Remove listeners for `name`, or all listeners when `None`.
    pub fn remove_all_listeners(&self, name: Option<&str>) -> usize {
        self.events.remove_all_listeners(name)
    }

    pub fn dispatch_event(&self, event: &MediaEvent) -> usize {
        if self.is_destroyed() {
            return 0;
        }
        self.events.dispatch_event(event)
    }

    /// Mirror every dispatched event onto `bus` for async observers.
    pub fn attach_event_bus(&self, bus: EventBus) {
        self.events.attach_bus(bus);
    }

    pub fn events(&self) -> &EventTarget {
        &self.events
    }

    // ========================================================================
    // Teardown
    // ========================================================================

    /// Destroy every cached handle, cancel pending constructions and drop
    /// all listeners. Later calls do nothing.
    pub fn destroy(&self) {
        let handles = {
            let mut state = self.state.borrow_mut();
            if state.destroyed {
                return;
            }
            state.destroyed = true;
            state.active = None;
            state.active_name = None;
            state.pending.clear();
            std::mem::take(&mut state.handles)
        };

        for (name, handle) in &handles {
            debug!(element = %self.id, renderer = %name, "destroying renderer");
            handle.destroy();
        }
        let listeners = self.events.remove_all_listeners(None);
        self.events.detach_bus();
        info!(
            element = %self.id,
            renderers = handles.len(),
            listeners,
            "media element destroyed"
        );
    }
}

impl fmt::Debug for MediaElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.borrow();
        let mut cached: Vec<_> = state.handles.keys().cloned().collect();
        cached.sort();
        f.debug_struct("MediaElement")
            .field("id", &self.id)
            .field("active", &state.active_name)
            .field("cached", &cached)
            .field("destroyed", &state.destroyed)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::FnRenderer;
    use mockall::mock;
    use mockall::predicate::eq;
    use std::cell::Cell;

    mock! {
        Handle {}

        impl BackendHandle for Handle {
            fn renderer_name(&self) -> String;
            fn readiness(&self) -> Readiness;
            fn get(&self, property: Property) -> Result<PropertyValue>;
            fn set(&self, property: Property, value: PropertyValue) -> Result<()>;
            fn call(&self, method: Method) -> Result<()>;
            fn supports(&self, method: Method) -> bool;
            fn can_play_type(&self, mime: &str) -> CanPlayResponse;
            fn show(&self);
            fn hide(&self);
            fn set_size(&self, width: u32, height: u32) -> Result<()>;
            fn destroy(&self);
        }
    }

    fn permissive(name: &'static str) -> MockHandle {
        let mut handle = MockHandle::new();
        handle.expect_renderer_name().returning(move || name.to_string());
        handle.expect_readiness().returning(|| Readiness::Ready);
        handle.expect_supports().returning(|_| false);
        handle.expect_call().returning(|_| Ok(()));
        handle.expect_set().returning(|_, _| Ok(()));
        handle.expect_show().returning(|| ());
        handle.expect_hide().returning(|| ());
        handle.expect_destroy().returning(|| ());
        handle
    }

    fn element(registry: RendererRegistry) -> MediaElement {
        MediaElement::builder(Rc::new(registry), Rc::new(TypeSniffer::new()))
            .with_id("mejs_unit")
            .build()
            .unwrap()
    }

    fn errors(media: &MediaElement) -> Rc<RefCell<Vec<String>>> {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        media.add_event_listener("error", move |event| {
            sink.borrow_mut().push(event.message.clone().unwrap_or_default());
        });
        seen
    }

    #[test]
    fn test_neutral_defaults_without_renderer() {
        let media = element(RendererRegistry::new());
        assert_eq!(media.get(Property::Volume), PropertyValue::Null);
        assert!(media.paused());
        assert_eq!(media.current_time(), 0.0);
        assert!(media.active_renderer_name().is_none());
    }

    #[test]
    fn test_no_renderer_found_event() {
        let media = element(RendererRegistry::new());
        let seen = errors(&media);

        assert!(!media.set_src("clip.wmv"));
        assert_eq!(*seen.borrow(), vec!["No renderer found"]);
        assert!(media.active_renderer_name().is_none());
    }

    #[test]
    fn test_creation_failure_event() {
        let mut registry = RendererRegistry::new();
        registry.register(FnRenderer::for_types("broken", &["video/mp4"], |ctx, _, _| {
            Err(PlaybackError::Internal(format!("{} exploded", ctx.renderer)))
        }));
        let media = element(registry);
        let seen = errors(&media);

        assert!(!media.set_src("clip.mp4"));
        assert_eq!(*seen.borrow(), vec!["Error creating renderer"]);
        assert!(media.active_renderer_name().is_none());
    }

    #[test]
    fn test_operations_before_renderer_are_replayed() {
        let mut registry = RendererRegistry::new();
        registry.register(FnRenderer::for_types("mock", &["video/mp4"], |_, _, _| {
            let mut handle = MockHandle::new();
            handle.expect_renderer_name().returning(|| "mock".to_string());
            handle.expect_supports().returning(|_| false);
            handle.expect_show().returning(|| ());
            handle
                .expect_set()
                .with(eq(Property::Volume), eq(PropertyValue::Number(0.4)))
                .times(1)
                .returning(|_, _| Ok(()));
            handle
                .expect_call()
                .with(eq(Method::Play))
                .times(1)
                .returning(|_| Ok(()));
            Ok(Rc::new(handle) as Rc<dyn BackendHandle>)
        }));
        let media = element(registry);

        media.set_volume(0.4);
        media.play();
        assert!(media.set_src("clip.mp4"));
        assert_eq!(media.active_renderer_name().as_deref(), Some("mock"));
    }

    #[test]
    fn test_switch_hides_previous_and_reuses_cache() {
        let builds = Rc::new(Cell::new(0));
        let mut registry = RendererRegistry::new();
        for (name, mime) in [("first", "video/mp4"), ("second", "video/webm")] {
            let builds = builds.clone();
            registry.register(FnRenderer::for_types(name, &[mime], move |ctx, _, _| {
                builds.set(builds.get() + 1);
                let renderer: &'static str = if ctx.renderer == "first" { "first" } else { "second" };
                Ok(Rc::new(permissive(renderer)) as Rc<dyn BackendHandle>)
            }));
        }
        let media = element(registry);

        assert!(media.set_src("a.mp4"));
        assert!(media.set_src("b.webm"));
        assert!(media.set_src("c.mp4"));
        assert_eq!(media.active_renderer_name().as_deref(), Some("first"));
        assert_eq!(builds.get(), 2);
        assert_eq!(media.cached_renderers(), 2);
    }

    #[test]
    fn test_unknown_renderer_has_no_side_effects() {
        let media = element(RendererRegistry::new());
        assert!(!media.change_renderer("missing", &[MediaSource::new("a.mp4", "video/mp4")]));
        assert!(media.active_renderer_name().is_none());
        assert_eq!(media.cached_renderers(), 0);
    }

    #[test]
    fn test_destroy_makes_calls_noops() {
        let mut registry = RendererRegistry::new();
        registry.register(FnRenderer::for_types("mock", &["video/mp4"], |_, _, _| {
            let mut handle = MockHandle::new();
            handle.expect_renderer_name().returning(|| "mock".to_string());
            handle.expect_supports().returning(|_| false);
            handle.expect_show().returning(|| ());
            handle.expect_destroy().times(1).returning(|| ());
            Ok(Rc::new(handle) as Rc<dyn BackendHandle>)
        }));
        let media = element(registry);
        let seen = errors(&media);

        assert!(media.set_src("a.mp4"));
        media.destroy();
        media.destroy();
        media.play();
        assert!(!media.set_src("a.mp4"));
        assert!(media.is_destroyed());
        assert!(seen.borrow().is_empty());
        assert_eq!(media.get(Property::Paused), PropertyValue::Bool(true));
    }

    #[test]
    fn test_can_play_type_without_handle_asks_descriptors() {
        let mut registry = RendererRegistry::new();
        registry.register(FnRenderer::for_types("mp4only", &["video/mp4"], |ctx, _, _| {
            Err(PlaybackError::creation(ctx.renderer, "unused"))
        }));
        let media = element(registry);
        assert_eq!(media.can_play_type("video/mp4"), CanPlayResponse::Maybe);
        assert_eq!(media.can_play_type("video/flv"), CanPlayResponse::No);
    }

    #[test]
    fn test_empty_id_rejected() {
        let result = MediaElement::builder(Rc::new(RendererRegistry::new()), Rc::new(TypeSniffer::new()))
            .with_id("  ")
            .build();
        assert!(result.is_err());
    }
}
