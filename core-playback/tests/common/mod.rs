//! Shared harness: built-in renderers wired to the headless bridge.

#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;

use bridge_headless::{HeadlessMediaHost, ManualScheduler, ScriptedVendorHost};
use bridge_traits::media::MediaFeatures;
use core_playback::{BuiltinRenderers, MediaElement, RendererHost, RendererRegistry, TypeSniffer};
use core_runtime::config::MediaElementOptions;
use core_runtime::events::{EventType, MediaEvent};

pub struct Harness {
    pub registry: Rc<RendererRegistry>,
    pub sniffer: Rc<TypeSniffer>,
    pub media: Rc<HeadlessMediaHost>,
    pub vendors: Rc<ScriptedVendorHost>,
    pub scheduler: Rc<ManualScheduler>,
    pub builtins: BuiltinRenderers,
}

impl Harness {
    /// Built-ins over a host whose native stack plays `playable`.
    pub fn new(features: MediaFeatures, playable: &[&str]) -> Self {
        let media = Rc::new(HeadlessMediaHost::new(playable.iter().copied()));
        let vendors = Rc::new(ScriptedVendorHost::new());
        let scheduler = Rc::new(ManualScheduler::new());
        let host = RendererHost {
            features,
            media: media.clone(),
            vendors: vendors.clone(),
            scheduler: scheduler.clone(),
        };

        let mut registry = RendererRegistry::new();
        let mut sniffer = TypeSniffer::new();
        let builtins = BuiltinRenderers::install(&mut registry, &mut sniffer, &host);

        Self {
            registry: Rc::new(registry),
            sniffer: Rc::new(sniffer),
            media,
            vendors,
            scheduler,
            builtins,
        }
    }

    /// Browser with MSE and Flash that natively plays mp4 only.
    pub fn desktop() -> Self {
        Self::new(
            MediaFeatures {
                has_mse: true,
                has_flash: true,
                supports_media_tag: true,
            },
            &["video/mp4"],
        )
    }

    pub fn element(&self, id: &str, options: MediaElementOptions) -> MediaElement {
        MediaElement::builder(self.registry.clone(), self.sniffer.clone())
            .with_id(id)
            .with_options(options)
            .build()
            .unwrap()
    }
}

pub type Recorded = Rc<RefCell<Vec<MediaEvent>>>;

/// Record every canonical event dispatched on `media`.
pub fn record(media: &MediaElement) -> Recorded {
    let seen: Recorded = Rc::new(RefCell::new(Vec::new()));
    for event_type in EventType::CANONICAL.iter() {
        let sink = seen.clone();
        media.add_event_listener(event_type.as_str(), move |event| {
            sink.borrow_mut().push(event.clone());
        });
    }
    seen
}

pub fn names(seen: &Recorded) -> Vec<String> {
    seen.borrow().iter().map(|e| e.name().to_string()).collect()
}

pub fn errors(seen: &Recorded) -> Vec<String> {
    seen.borrow()
        .iter()
        .filter(|e| e.is_error())
        .map(|e| e.message.clone().unwrap_or_default())
        .collect()
}
