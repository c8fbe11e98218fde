//! In-memory native media nodes.
//!
//! A [`HeadlessMediaNode`] stores property values, records every method call
//! and lets tests raise raw events with [`HeadlessMediaNode::emit`].

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use bridge_traits::error::{BridgeError, Result};
use bridge_traits::media::{
    CanPlayResponse, Method, NativeEvent, NativeListener, NativeMediaHost, NativeMediaNode,
    Property, PropertyValue,
};
use tracing::debug;

// ============================================================================
// Host
// ============================================================================

/// Node factory answering `canPlayType` from a fixed MIME list.
pub struct HeadlessMediaHost {
    playable: Vec<String>,
    nodes: RefCell<Vec<Rc<HeadlessMediaNode>>>,
    refuse: Cell<bool>,
}

impl HeadlessMediaHost {
    /// A host that plays exactly the given MIME types (case-insensitive).
    pub fn new<I, S>(playable: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            playable: playable
                .into_iter()
                .map(|mime| mime.into().to_lowercase())
                .collect(),
            nodes: RefCell::new(Vec::new()),
            refuse: Cell::new(false),
        }
    }

    /// Make subsequent `create_node` calls fail.
    pub fn refuse_nodes(&self, refuse: bool) {
        self.refuse.set(refuse);
    }

    pub fn nodes(&self) -> Vec<Rc<HeadlessMediaNode>> {
        self.nodes.borrow().clone()
    }

    pub fn last_node(&self) -> Option<Rc<HeadlessMediaNode>> {
        self.nodes.borrow().last().cloned()
    }

    fn answer(&self, mime: &str) -> CanPlayResponse {
        let mime = mime.to_lowercase();
        let base = mime.split(';').next().unwrap_or_default().trim();
        CanPlayResponse::from(self.playable.iter().any(|known| known == base))
    }
}

impl NativeMediaHost for HeadlessMediaHost {
    fn can_play_type(&self, mime: &str) -> CanPlayResponse {
        self.answer(mime)
    }

    fn create_node(&self, element_id: &str) -> Result<Rc<dyn NativeMediaNode>> {
        if self.refuse.get() {
            return Err(BridgeError::NotAvailable("media tag".to_string()));
        }
        let node = Rc::new(HeadlessMediaNode::new(
            format!("{}_html5", element_id),
            self.playable.clone(),
        ));
        self.nodes.borrow_mut().push(node.clone());
        debug!(node = %node.id(), "headless media node created");
        Ok(node)
    }
}

impl std::fmt::Debug for HeadlessMediaHost {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HeadlessMediaHost")
            .field("playable", &self.playable)
            .field("nodes", &self.nodes.borrow().len())
            .finish()
    }
}

// ============================================================================
// Node
// ============================================================================

/// A media node with no decoder behind it.
pub struct HeadlessMediaNode {
    id: String,
    playable: Vec<String>,
    values: RefCell<HashMap<Property, PropertyValue>>,
    listeners: RefCell<HashMap<String, Vec<NativeListener>>>,
    calls: RefCell<Vec<Method>>,
    visible: Cell<bool>,
    size: Cell<Option<(u32, u32)>>,
    removed: Cell<bool>,
}

impl HeadlessMediaNode {
    pub fn new(id: impl Into<String>, playable: Vec<String>) -> Self {
        let mut values = HashMap::new();
        values.insert(Property::Volume, PropertyValue::Number(1.0));
        values.insert(Property::Muted, PropertyValue::Bool(false));
        values.insert(Property::Paused, PropertyValue::Bool(true));
        values.insert(Property::Ended, PropertyValue::Bool(false));
        values.insert(Property::CurrentTime, PropertyValue::Number(0.0));
        values.insert(Property::PlaybackRate, PropertyValue::Number(1.0));

        Self {
            id: id.into(),
            playable,
            values: RefCell::new(values),
            listeners: RefCell::new(HashMap::new()),
            calls: RefCell::new(Vec::new()),
            visible: Cell::new(true),
            size: Cell::new(None),
            removed: Cell::new(false),
        }
    }

    /// Raise a raw event on this node. Returns the number of listeners run.
    pub fn emit(&self, name: &str) -> usize {
        self.dispatch(NativeEvent::new(name))
    }

    pub fn emit_error(&self, message: &str) -> usize {
        self.dispatch(NativeEvent::new("error").with_message(message))
    }

    /// Store a value without any of the side effects of `set`.
    pub fn put(&self, property: Property, value: impl Into<PropertyValue>) {
        self.values.borrow_mut().insert(property, value.into());
    }

    pub fn value(&self, property: Property) -> PropertyValue {
        self.values
            .borrow()
            .get(&property)
            .cloned()
            .unwrap_or_else(|| property.neutral_default())
    }

    pub fn calls(&self) -> Vec<Method> {
        self.calls.borrow().clone()
    }

    pub fn listener_count(&self, event: &str) -> usize {
        self.listeners.borrow().get(event).map_or(0, Vec::len)
    }

    pub fn is_visible(&self) -> bool {
        self.visible.get()
    }

    pub fn size(&self) -> Option<(u32, u32)> {
        self.size.get()
    }

    pub fn is_removed(&self) -> bool {
        self.removed.get()
    }

    fn dispatch(&self, event: NativeEvent) -> usize {
        let listeners: Vec<NativeListener> = self
            .listeners
            .borrow()
            .get(&event.name)
            .cloned()
            .unwrap_or_default();
        for listener in &listeners {
            listener(&event);
        }
        listeners.len()
    }
}

impl NativeMediaNode for HeadlessMediaNode {
    fn id(&self) -> &str {
        &self.id
    }

    fn can_play_type(&self, mime: &str) -> CanPlayResponse {
        let mime = mime.to_lowercase();
        let base = mime.split(';').next().unwrap_or_default().trim();
        CanPlayResponse::from(self.playable.iter().any(|known| known == base))
    }

    fn get(&self, property: Property) -> Result<PropertyValue> {
        if property == Property::CurrentSrc {
            return Ok(self.value(Property::Src));
        }
        Ok(self.value(property))
    }

    fn set(&self, property: Property, value: PropertyValue) -> Result<()> {
        if !property.is_writable() {
            return Err(BridgeError::Unsupported(format!("{} is read-only", property)));
        }
        self.values.borrow_mut().insert(property, value);
        match property {
            Property::Volume | Property::Muted => {
                self.emit("volumechange");
            }
            Property::Src => {
                self.put(Property::Ended, false);
                self.emit("emptied");
            }
            Property::CurrentTime => {
                self.emit("seeking");
                self.emit("seeked");
                self.emit("timeupdate");
            }
            Property::PlaybackRate => {
                self.emit("ratechange");
            }
            _ => {}
        }
        Ok(())
    }

    fn invoke(&self, method: Method) -> Result<()> {
        self.calls.borrow_mut().push(method);
        match method {
            Method::Play => {
                self.put(Property::Paused, false);
                self.emit("play");
                self.emit("playing");
            }
            Method::Pause => {
                self.put(Property::Paused, true);
                self.emit("pause");
            }
            Method::Load => {
                self.emit("loadstart");
            }
            Method::Stop => {
                return Err(BridgeError::Unsupported("stop".to_string()));
            }
        }
        Ok(())
    }

    fn add_listener(&self, event: &str, listener: NativeListener) {
        self.listeners
            .borrow_mut()
            .entry(event.to_string())
            .or_default()
            .push(listener);
    }

    fn set_visible(&self, visible: bool) {
        self.visible.set(visible);
    }

    fn set_size(&self, width: u32, height: u32) -> Result<()> {
        self.size.set(Some((width, height)));
        Ok(())
    }

    fn remove(&self) {
        self.removed.set(true);
        self.listeners.borrow_mut().clear();
    }
}

impl std::fmt::Debug for HeadlessMediaNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HeadlessMediaNode")
            .field("id", &self.id)
            .field("visible", &self.visible.get())
            .field("removed", &self.removed.get())
            .finish()
    }
}
