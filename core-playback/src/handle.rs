//! # Backend Handles
//!
//! A backend handle is the per-renderer object a facade delegates to. It is
//! created by a [`RendererDescriptor`](crate::renderer::RendererDescriptor)
//! and owned by exactly one facade.
//!
//! ## Property dispatch
//!
//! Handles expose one `get`/`set` pair keyed by [`Property`] instead of a
//! `getX`/`setX` method per property. Implementations usually resolve the
//! key through an [`AccessorTable`], a map from property to function
//! pointers, so a property a backend does not track is a lookup miss
//! (`PlaybackError::Unsupported`) rather than a missing method.

use std::collections::HashMap;
use std::fmt;

use bridge_traits::media::{CanPlayResponse, Method, Property, PropertyValue};
use futures::future::LocalBoxFuture;

use crate::error::{PlaybackError, Result};
use crate::readiness::Readiness;

/// Uniform control surface of one backend.
///
/// All calls happen on the host thread. Implementations must not call back
/// into the owning facade synchronously from `get`.
pub trait BackendHandle {
    /// Name of the renderer that built this handle.
    fn renderer_name(&self) -> String;

    fn readiness(&self) -> Readiness {
        Readiness::Ready
    }

    /// Read a property. Before readiness this reports the neutral default.
    fn get(&self, property: Property) -> Result<PropertyValue>;

    /// Write a property. Before readiness this is queued.
    fn set(&self, property: Property, value: PropertyValue) -> Result<()>;

    /// Invoke a method. Before readiness this is queued.
    fn call(&self, method: Method) -> Result<()>;

    /// Whether `method` exists on this backend at all (e.g. `stop`).
    fn supports(&self, _method: Method) -> bool {
        true
    }

    fn can_play_type(&self, mime: &str) -> CanPlayResponse;

    fn show(&self);

    fn hide(&self);

    fn set_size(&self, width: u32, height: u32) -> Result<()>;

    /// Release vendor resources. Further calls are ignored.
    fn destroy(&self) {}

    /// Resolves once the handle is `Ready`; fails with `Cancelled` when it
    /// is destroyed first.
    fn when_ready(&self) -> LocalBoxFuture<'static, Result<()>> {
        Box::pin(futures::future::ready(Ok(())))
    }
}

pub type Getter<T> = fn(&T) -> Result<PropertyValue>;
pub type Setter<T> = fn(&T, PropertyValue) -> Result<()>;

/// Getter/setter pair for one property. Either side may be absent.
pub struct Accessor<T> {
    pub get: Option<Getter<T>>,
    pub set: Option<Setter<T>>,
}

impl<T> Clone for Accessor<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Accessor<T> {}

/// Property lookup table for a backend type `T`.
pub struct AccessorTable<T> {
    entries: HashMap<Property, Accessor<T>>,
}

impl<T> Default for AccessorTable<T> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }
}

impl<T> AccessorTable<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn read_only(mut self, property: Property, get: Getter<T>) -> Self {
        self.entries.insert(
            property,
            Accessor {
                get: Some(get),
                set: None,
            },
        );
        self
    }

    pub fn read_write(mut self, property: Property, get: Getter<T>, set: Setter<T>) -> Self {
        self.entries.insert(
            property,
            Accessor {
                get: Some(get),
                set: Some(set),
            },
        );
        self
    }

    pub fn write_only(mut self, property: Property, set: Setter<T>) -> Self {
        self.entries.insert(
            property,
            Accessor {
                get: None,
                set: Some(set),
            },
        );
        self
    }

    pub fn accessor(&self, property: Property) -> Option<Accessor<T>> {
        self.entries.get(&property).copied()
    }

    pub fn can_get(&self, property: Property) -> bool {
        self.accessor(property).map_or(false, |a| a.get.is_some())
    }

    pub fn can_set(&self, property: Property) -> bool {
        self.accessor(property).map_or(false, |a| a.set.is_some())
    }

    pub fn get(&self, target: &T, renderer: &str, property: Property) -> Result<PropertyValue> {
        match self.accessor(property).and_then(|a| a.get) {
            Some(get) => get(target),
            None => Err(PlaybackError::unsupported(
                renderer,
                format!("get {}", property),
            )),
        }
    }

    pub fn set(
        &self,
        target: &T,
        renderer: &str,
        property: Property,
        value: PropertyValue,
    ) -> Result<()> {
        match self.accessor(property).and_then(|a| a.set) {
            Some(set) => set(target, value),
            None if !property.is_writable() => Err(PlaybackError::ReadOnly(property.to_string())),
            None => Err(PlaybackError::unsupported(
                renderer,
                format!("set {}", property),
            )),
        }
    }
}

impl<T> fmt::Debug for AccessorTable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut properties: Vec<_> = self.entries.keys().copied().collect();
        properties.sort();
        f.debug_struct("AccessorTable")
            .field("properties", &properties)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    struct Knob {
        level: Cell<f64>,
    }

    fn table() -> AccessorTable<Knob> {
        AccessorTable::<Knob>::new()
            .read_write(
                Property::Volume,
                |k| Ok(PropertyValue::Number(k.level.get())),
                |k, v| {
                    k.level.set(v.as_f64().unwrap_or_default());
                    Ok(())
                },
            )
            .read_only(Property::Duration, |_| Ok(PropertyValue::Number(42.0)))
    }

    #[test]
    fn test_round_trip_through_table() {
        let knob = Knob {
            level: Cell::new(1.0),
        };
        let table = table();

        table
            .set(&knob, "test", Property::Volume, PropertyValue::Number(0.25))
            .unwrap();
        assert_eq!(
            table.get(&knob, "test", Property::Volume).unwrap(),
            PropertyValue::Number(0.25)
        );
        assert!(table.can_set(Property::Volume));
        assert!(!table.can_set(Property::Duration));
    }

    #[test]
    fn test_missing_entries() {
        let knob = Knob {
            level: Cell::new(1.0),
        };
        let table = table();

        let err = table.get(&knob, "test", Property::Loop).unwrap_err();
        assert!(err.is_dispatch_miss());
        assert_eq!(err.to_string(), "test does not support get loop");

        let err = table
            .set(&knob, "test", Property::Duration, PropertyValue::Number(1.0))
            .unwrap_err();
        assert!(matches!(err, PlaybackError::ReadOnly(_)));
    }
}
