//! # Built-in Renderers
//!
//! `html5` over native media nodes, plus one vendor renderer per
//! [`VendorProfile`]. [`BuiltinRenderers::install`] registers them in
//! default priority order together with the URL sniffers that recognise
//! their sources.
//!
//! Renderers of the same vendor share one [`SdkLoader`]; the returned
//! [`BuiltinRenderers`] keeps those loaders so a host can reset them.

pub mod deferred;
pub mod html5;
pub mod vendor;

use std::collections::HashMap;
use std::rc::Rc;

use bridge_traits::media::{MediaFeatures, NativeMediaHost};
use bridge_traits::scheduler::IntervalScheduler;
use bridge_traits::vendor::VendorHost;
use tracing::debug;

use crate::loader::SdkLoader;
use crate::registry::RendererRegistry;
use crate::sniffer::TypeSniffer;

pub use deferred::DeferredBackend;
pub use html5::{Html5Backend, Html5Renderer, HTML5};
pub use vendor::{
    Bootstrap, EventModel, Requirement, VendorProfile, VendorRenderer, VENDOR_PROFILES,
};

/// Host services the built-in renderers are wired to.
#[derive(Clone)]
pub struct RendererHost {
    pub features: MediaFeatures,
    pub media: Rc<dyn NativeMediaHost>,
    pub vendors: Rc<dyn VendorHost>,
    pub scheduler: Rc<dyn IntervalScheduler>,
}

// ============================================================================
// Built-in sniffers
// ============================================================================

fn contains_any(url: &str, needles: &[&str]) -> bool {
    let url = url.to_lowercase();
    needles.iter().any(|needle| url.contains(needle))
}

fn sniff_hls(url: &str) -> Option<String> {
    contains_any(url, &["m3u8"]).then(|| "application/x-mpegURL".to_string())
}

fn sniff_dash(url: &str) -> Option<String> {
    contains_any(url, &["mpd"]).then(|| "application/dash+xml".to_string())
}

fn sniff_flv(url: &str) -> Option<String> {
    contains_any(url, &["flv"]).then(|| "video/flv".to_string())
}

fn sniff_youtube(url: &str) -> Option<String> {
    contains_any(url, &["www.youtube", "//youtu.be"]).then(|| "video/x-youtube".to_string())
}

fn sniff_vimeo(url: &str) -> Option<String> {
    contains_any(url, &["player.vimeo", "vimeo.com"]).then(|| "video/x-vimeo".to_string())
}

fn sniff_dailymotion(url: &str) -> Option<String> {
    contains_any(url, &["dailymotion.com", "dai.ly"]).then(|| "video/x-dailymotion".to_string())
}

fn sniff_facebook(url: &str) -> Option<String> {
    contains_any(url, &["www.facebook"]).then(|| "video/x-facebook".to_string())
}

fn sniff_soundcloud(url: &str) -> Option<String> {
    contains_any(url, &["soundcloud.com"]).then(|| "video/x-soundcloud".to_string())
}

fn sniff_flash(url: &str) -> Option<String> {
    let lower = url.to_lowercase();
    if lower.contains("rtmp") {
        if lower.contains(".mp3") {
            Some("audio/rtmp".to_string())
        } else {
            Some("video/rtmp".to_string())
        }
    } else if lower.contains(".oga") || lower.contains(".ogg") {
        Some("audio/ogg".to_string())
    } else {
        None
    }
}

const FLASH_SNIFFER: &str = "flash";

/// URL sniffers in registration order.
pub const BUILTIN_SNIFFERS: [(&str, fn(&str) -> Option<String>); 9] = [
    ("hls", sniff_hls),
    ("dash", sniff_dash),
    ("flv", sniff_flv),
    ("youtube", sniff_youtube),
    ("vimeo", sniff_vimeo),
    ("dailymotion", sniff_dailymotion),
    ("facebook", sniff_facebook),
    ("soundcloud", sniff_soundcloud),
    (FLASH_SNIFFER, sniff_flash),
];

// ============================================================================
// Installation
// ============================================================================

/// Loaders created by [`BuiltinRenderers::install`], keyed by vendor.
#[derive(Debug, Default)]
pub struct BuiltinRenderers {
    loaders: HashMap<String, SdkLoader>,
}

impl BuiltinRenderers {
    /// Register every built-in renderer and sniffer. The `flash` sniffer
    /// is only registered when the host has the Flash plugin.
    pub fn install(
        registry: &mut RendererRegistry,
        sniffer: &mut TypeSniffer,
        host: &RendererHost,
    ) -> Self {
        for (name, sniff) in BUILTIN_SNIFFERS {
            if name == FLASH_SNIFFER && !host.features.has_flash {
                continue;
            }
            sniffer.register_sniffer(name, sniff);
        }

        registry.register(Html5Renderer::new(host.media.clone()));

        let mut loaders: HashMap<String, SdkLoader> = HashMap::new();
        for profile in VENDOR_PROFILES.iter() {
            let loader = profile.shared_script().map(|(vendor, url)| {
                loaders
                    .entry(vendor.to_string())
                    .or_insert_with(|| SdkLoader::new(vendor, url, host.vendors.clone()))
                    .clone()
            });
            registry.register(VendorRenderer::new(
                profile,
                host.features,
                host.vendors.clone(),
                host.scheduler.clone(),
                loader,
            ));
        }

        debug!(
            renderers = registry.len(),
            sniffers = sniffer.len(),
            loaders = loaders.len(),
            "built-in renderers installed"
        );
        Self { loaders }
    }

    pub fn loader(&self, vendor: &str) -> Option<&SdkLoader> {
        self.loaders.get(vendor)
    }

    /// Reset every loader, discarding queued creations. Returns how many
    /// were discarded.
    pub fn teardown(&self) -> usize {
        self.loaders.values().map(SdkLoader::teardown).sum()
    }
}
