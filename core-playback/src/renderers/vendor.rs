//! Vendor backed renderers.
//!
//! Every third-party backend (iframe SDK, script-injected codec library,
//! Flash plugin) differs only in data: accepted MIME types, how it becomes
//! ready, whether it has its own event model, and how a media id is derived
//! from a URL. That data lives in a [`VendorProfile`]; one generic
//! [`VendorRenderer`] descriptor drives them all through a
//! [`DeferredBackend`].

use std::fmt;
use std::rc::Rc;

use bridge_traits::media::MediaFeatures;
use bridge_traits::scheduler::IntervalScheduler;
use bridge_traits::vendor::{PlayerRequest, VendorHost};
use serde_json::{json, Map, Value};
use tracing::debug;

use super::deferred::DeferredBackend;
use crate::error::{PlaybackError, Result};
use crate::handle::BackendHandle;
use crate::loader::SdkLoader;
use crate::renderer::{RendererContext, RendererDescriptor, RendererOptions};
use crate::source::MediaSource;

/// How a vendor player comes into existence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bootstrap {
    /// One SDK script shared by every element using the vendor; creations
    /// wait in the vendor's [`SdkLoader`] queue.
    SharedScript {
        vendor: &'static str,
        url: &'static str,
    },
    /// Each instance reports its own readiness (plugin callback).
    PerInstance,
}

/// Where the backend's playback events come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventModel {
    /// Vendor reports state codes only; `timeupdate` is polled.
    Polled,
    /// Vendor emits media events itself.
    Native,
}

/// Host capability a renderer needs before it will claim a type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    Always,
    Mse,
    Flash,
}

impl Requirement {
    pub fn is_met(&self, features: &MediaFeatures) -> bool {
        match self {
            Requirement::Always => true,
            Requirement::Mse => features.has_mse,
            Requirement::Flash => features.has_flash,
        }
    }
}

/// Static description of one vendor renderer.
pub struct VendorProfile {
    pub name: &'static str,
    pub mime_types: &'static [&'static str],
    pub bootstrap: Bootstrap,
    pub events: EventModel,
    pub requirement: Requirement,
    /// Vendor media id for a source URL.
    pub media_id: fn(&str) -> String,
    pub supports_stop: bool,
    pub defaults: fn() -> RendererOptions,
}

impl VendorProfile {
    pub fn accepts(&self, mime: &str) -> bool {
        self.mime_types.iter().any(|t| *t == mime)
    }

    pub fn shared_script(&self) -> Option<(&'static str, &'static str)> {
        match self.bootstrap {
            Bootstrap::SharedScript { vendor, url } => Some((vendor, url)),
            Bootstrap::PerInstance => None,
        }
    }
}

impl fmt::Debug for VendorProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VendorProfile")
            .field("name", &self.name)
            .field("bootstrap", &self.bootstrap)
            .field("events", &self.events)
            .field("requirement", &self.requirement)
            .finish()
    }
}

// ============================================================================
// Media id extraction
// ============================================================================

/// Path part of `url` without query string.
fn path_of(url: &str) -> &str {
    url.split('?').next().unwrap_or(url)
}

fn last_segment(url: &str) -> &str {
    let path = path_of(url);
    match path.rfind('/') {
        Some(index) => &path[index + 1..],
        None => path,
    }
}

/// `watch?v=ID` style URLs use the `v` parameter; `youtu.be/ID` and
/// `/v/ID` use the last path segment.
pub fn youtube_id(url: &str) -> String {
    if let Some((_, query)) = url.split_once('?') {
        let from_param = query
            .split('&')
            .filter_map(|pair| pair.split_once('='))
            .find(|(key, _)| *key == "v")
            .map(|(_, value)| value);
        if let Some(id) = from_param.filter(|id| !id.is_empty()) {
            return id.to_string();
        }
    }
    last_segment(url).to_string()
}

/// Leading digits of the last path segment; empty when there are none.
pub fn vimeo_id(url: &str) -> String {
    last_segment(url)
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect()
}

/// Last path segment up to the first `_` (`x4r5udv_title-slug`).
pub fn dailymotion_id(url: &str) -> String {
    let last = url.rsplit('/').next().unwrap_or(url);
    last.split('_').next().unwrap_or(last).to_string()
}

/// Vendors that take the full URL.
pub fn full_url(url: &str) -> String {
    url.to_string()
}

// ============================================================================
// Built-in profiles
// ============================================================================

fn section(key: &str, value: Value) -> RendererOptions {
    let mut options = Map::new();
    options.insert(key.to_string(), value);
    options
}

fn no_defaults() -> RendererOptions {
    Map::new()
}

fn hls_defaults() -> RendererOptions {
    section(
        "hls",
        json!({
            "autoStartLoad": true,
            "startPosition": -1,
            "capLevelToPlayerSize": false,
            "debug": false,
            "maxBufferLength": 30,
            "maxMaxBufferLength": 600,
            "maxBufferSize": 60_000_000,
            "maxBufferHole": 0.5,
            "maxSeekHole": 2,
            "liveSyncDurationCount": 3,
            "liveMaxLatencyDurationCount": 10,
            "enableWorker": true,
            "enableSoftwareAES": true,
            "manifestLoadingTimeOut": 10000,
            "manifestLoadingMaxRetry": 6,
            "levelLoadingTimeOut": 10000,
            "fragLoadingTimeOut": 20000,
            "fragLoadingMaxRetry": 6,
            "enableCEA708Captions": true
        }),
    )
}

fn dash_defaults() -> RendererOptions {
    section("dash", json!({}))
}

fn flv_defaults() -> RendererOptions {
    section(
        "flv",
        json!({
            "cors": true,
            "enableWorker": false,
            "enableStashBuffer": true,
            "isLive": false,
            "lazyLoad": true,
            "lazyLoadMaxDuration": 180,
            "deferLoadAfterSourceOpen": true,
            "statisticsInfoReportInterval": 600,
            "accurateSeek": false,
            "seekType": "range",
            "seekParamStart": "bstart",
            "seekParamEnd": "bend",
            "rangeLoadZeroStart": false
        }),
    )
}

fn youtube_defaults() -> RendererOptions {
    section(
        "youtube",
        json!({
            "controls": 0,
            "rel": 0,
            "disablekb": 1,
            "showinfo": 0,
            "modestbranding": 0,
            "html5": 1,
            "playsinline": 1
        }),
    )
}

fn facebook_defaults() -> RendererOptions {
    section(
        "facebook",
        json!({ "appId": "{your-app-id}", "xfbml": true, "version": "v2.6" }),
    )
}

fn flash_video_defaults() -> RendererOptions {
    let mut options = section("filename", json!("mediaelement-flash-video.swf"));
    options.insert("enablePseudoStreaming".into(), json!(false));
    options.insert("pseudoStreamingStartQueryParam".into(), json!("start"));
    options.insert("pseudoStreamingType".into(), json!("byte"));
    options
}

fn flash_hls_defaults() -> RendererOptions {
    section("filename", json!("mediaelement-flash-video-hls.swf"))
}

fn flash_mdash_defaults() -> RendererOptions {
    section("filename", json!("mediaelement-flash-video-mdash.swf"))
}

fn flash_audio_defaults() -> RendererOptions {
    section("filename", json!("mediaelement-flash-audio.swf"))
}

fn flash_audio_ogg_defaults() -> RendererOptions {
    section("filename", json!("mediaelement-flash-audio-ogg.swf"))
}

const HLS_TYPES: &[&str] = &[
    "application/x-mpegURL",
    "application/x-mpegurl",
    "vnd.apple.mpegURL",
    "audio/mpegURL",
    "audio/hls",
    "video/hls",
];

/// Vendor renderers in default priority order. `html5` precedes them all.
pub static VENDOR_PROFILES: [VendorProfile; 13] = [
    VendorProfile {
        name: "native_hls",
        mime_types: HLS_TYPES,
        bootstrap: Bootstrap::SharedScript {
            vendor: "hls",
            url: "https://cdn.jsdelivr.net/hls.js/latest/hls.min.js",
        },
        events: EventModel::Native,
        requirement: Requirement::Mse,
        media_id: full_url,
        supports_stop: false,
        defaults: hls_defaults,
    },
    VendorProfile {
        name: "native_mdash",
        mime_types: &["application/dash+xml"],
        bootstrap: Bootstrap::SharedScript {
            vendor: "dash",
            url: "https://cdn.dashjs.org/latest/dash.mediaplayer.min.js",
        },
        events: EventModel::Native,
        requirement: Requirement::Mse,
        media_id: full_url,
        supports_stop: false,
        defaults: dash_defaults,
    },
    VendorProfile {
        name: "native_flv",
        mime_types: &["video/x-flv", "video/flv"],
        bootstrap: Bootstrap::SharedScript {
            vendor: "flv",
            url: "https://cdnjs.cloudflare.com/ajax/libs/flv.js/1.1.0/flv.min.js",
        },
        events: EventModel::Native,
        requirement: Requirement::Mse,
        media_id: full_url,
        supports_stop: false,
        defaults: flv_defaults,
    },
    VendorProfile {
        name: "youtube_iframe",
        mime_types: &["video/youtube", "video/x-youtube"],
        bootstrap: Bootstrap::SharedScript {
            vendor: "youtube",
            url: "https://www.youtube.com/player_api",
        },
        events: EventModel::Polled,
        requirement: Requirement::Always,
        media_id: youtube_id,
        supports_stop: false,
        defaults: youtube_defaults,
    },
    VendorProfile {
        name: "vimeo_iframe",
        mime_types: &["video/vimeo", "video/x-vimeo"],
        bootstrap: Bootstrap::SharedScript {
            vendor: "vimeo",
            url: "https://player.vimeo.com/api/player.js",
        },
        events: EventModel::Native,
        requirement: Requirement::Always,
        media_id: vimeo_id,
        supports_stop: false,
        defaults: no_defaults,
    },
    VendorProfile {
        name: "dailymotion_iframe",
        mime_types: &["video/dailymotion", "video/x-dailymotion"],
        bootstrap: Bootstrap::SharedScript {
            vendor: "dailymotion",
            url: "https://api.dmcdn.net/all.js",
        },
        events: EventModel::Native,
        requirement: Requirement::Always,
        media_id: dailymotion_id,
        supports_stop: false,
        defaults: no_defaults,
    },
    VendorProfile {
        name: "facebook",
        mime_types: &["video/facebook", "video/x-facebook"],
        bootstrap: Bootstrap::SharedScript {
            vendor: "facebook",
            url: "https://connect.facebook.net/en_US/sdk.js",
        },
        events: EventModel::Polled,
        requirement: Requirement::Always,
        media_id: full_url,
        supports_stop: false,
        defaults: facebook_defaults,
    },
    VendorProfile {
        name: "soundcloud_iframe",
        mime_types: &["video/soundcloud", "video/x-soundcloud"],
        bootstrap: Bootstrap::SharedScript {
            vendor: "soundcloud",
            url: "https://w.soundcloud.com/player/api.js",
        },
        events: EventModel::Native,
        requirement: Requirement::Always,
        media_id: full_url,
        supports_stop: false,
        defaults: no_defaults,
    },
    VendorProfile {
        name: "flash_video",
        mime_types: &[
            "video/mp4",
            "video/flv",
            "video/rtmp",
            "audio/rtmp",
            "rtmp/mp4",
            "audio/mp4",
        ],
        bootstrap: Bootstrap::PerInstance,
        events: EventModel::Native,
        requirement: Requirement::Flash,
        media_id: full_url,
        supports_stop: true,
        defaults: flash_video_defaults,
    },
    VendorProfile {
        name: "flash_hls",
        mime_types: &[
            "audio/hls",
            "video/hls",
            "application/x-mpegURL",
            "application/x-mpegurl",
            "vnd.apple.mpegURL",
        ],
        bootstrap: Bootstrap::PerInstance,
        events: EventModel::Native,
        requirement: Requirement::Flash,
        media_id: full_url,
        supports_stop: true,
        defaults: flash_hls_defaults,
    },
    VendorProfile {
        name: "flash_mdash",
        mime_types: &["application/dash+xml"],
        bootstrap: Bootstrap::PerInstance,
        events: EventModel::Native,
        requirement: Requirement::Flash,
        media_id: full_url,
        supports_stop: true,
        defaults: flash_mdash_defaults,
    },
    VendorProfile {
        name: "flash_audio",
        mime_types: &["audio/mp3"],
        bootstrap: Bootstrap::PerInstance,
        events: EventModel::Native,
        requirement: Requirement::Flash,
        media_id: full_url,
        supports_stop: true,
        defaults: flash_audio_defaults,
    },
    VendorProfile {
        name: "flash_audio_ogg",
        mime_types: &["audio/ogg", "audio/oga", "audio/ogv"],
        bootstrap: Bootstrap::PerInstance,
        events: EventModel::Native,
        requirement: Requirement::Flash,
        media_id: full_url,
        supports_stop: true,
        defaults: flash_audio_ogg_defaults,
    },
];

pub fn profile(name: &str) -> Option<&'static VendorProfile> {
    VENDOR_PROFILES.iter().find(|profile| profile.name == name)
}

// ============================================================================
// Descriptor
// ============================================================================

/// Descriptor for one vendor profile.
pub struct VendorRenderer {
    profile: &'static VendorProfile,
    features: MediaFeatures,
    host: Rc<dyn VendorHost>,
    scheduler: Rc<dyn IntervalScheduler>,
    loader: Option<SdkLoader>,
}

impl VendorRenderer {
    /// `loader` must be given for [`Bootstrap::SharedScript`] profiles and is
    /// shared with every other renderer of the same vendor.
    pub fn new(
        profile: &'static VendorProfile,
        features: MediaFeatures,
        host: Rc<dyn VendorHost>,
        scheduler: Rc<dyn IntervalScheduler>,
        loader: Option<SdkLoader>,
    ) -> Self {
        Self {
            profile,
            features,
            host,
            scheduler,
            loader,
        }
    }

    pub fn profile(&self) -> &'static VendorProfile {
        self.profile
    }
}

impl RendererDescriptor for VendorRenderer {
    fn name(&self) -> &str {
        self.profile.name
    }

    fn can_play_type(&self, mime: &str) -> bool {
        self.profile.requirement.is_met(&self.features) && self.profile.accepts(mime)
    }

    fn default_options(&self) -> RendererOptions {
        (self.profile.defaults)()
    }

    fn create(
        &self,
        ctx: RendererContext,
        options: RendererOptions,
        sources: &[MediaSource],
    ) -> Result<Rc<dyn BackendHandle>> {
        let source = sources
            .first()
            .ok_or_else(|| PlaybackError::creation(self.profile.name, "no source to load"))?;

        let request = PlayerRequest {
            renderer: self.profile.name.to_string(),
            element_id: ctx.element_id.clone(),
            media_id: (self.profile.media_id)(&source.src),
            src: source.src.clone(),
            width: ctx.width,
            height: ctx.height,
            autoplay: ctx.autoplay,
            params: options,
        };
        debug!(
            renderer = self.profile.name,
            element = %ctx.element_id,
            media_id = %request.media_id,
            "requesting vendor player"
        );

        let backend = DeferredBackend::new(self.profile, ctx, self.scheduler.clone());
        backend
            .start(request, self.host.clone(), self.loader.as_ref())
            .map_err(|err| PlaybackError::creation(self.profile.name, err.to_string()))?;
        Ok(backend)
    }
}

impl fmt::Debug for VendorRenderer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VendorRenderer")
            .field("profile", &self.profile.name)
            .field("loader", &self.loader)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_youtube_ids() {
        assert_eq!(
            youtube_id("https://www.youtube.com/watch?feature=player_embedded&v=yyWWXSwtPP0"),
            "yyWWXSwtPP0"
        );
        assert_eq!(youtube_id("http://youtu.be/Djd6tPrxc08"), "Djd6tPrxc08");
        assert_eq!(youtube_id("http://www.youtube.com/v/VIDEO_ID?version=3"), "VIDEO_ID");
    }

    #[test]
    fn test_vimeo_and_dailymotion_ids() {
        assert_eq!(vimeo_id("https://player.vimeo.com/video/59777392"), "59777392");
        assert_eq!(vimeo_id("https://vimeo.com/59777392?autoplay=1"), "59777392");
        assert_eq!(vimeo_id("https://vimeo.com/channels"), "");
        assert_eq!(
            dailymotion_id("http://www.dailymotion.com/video/x4r5udv_some-title"),
            "x4r5udv"
        );
    }

    #[test]
    fn test_profiles_order_and_requirements() {
        let names: Vec<_> = VENDOR_PROFILES.iter().map(|p| p.name).collect();
        assert_eq!(names[0], "native_hls");
        assert_eq!(names[3], "youtube_iframe");
        assert_eq!(names[12], "flash_audio_ogg");

        let none = MediaFeatures::default();
        assert!(!profile("native_hls").unwrap().requirement.is_met(&none));
        assert!(!profile("flash_video").unwrap().requirement.is_met(&none));
        assert!(!profile("flash_hls").unwrap().requirement.is_met(&none));
        assert!(profile("youtube_iframe").unwrap().accepts("video/x-youtube"));
        assert!(profile("flash_video").unwrap().supports_stop);
        assert!(!profile("vimeo_iframe").unwrap().supports_stop);
    }

    #[test]
    fn test_youtube_player_vars() {
        let defaults = (profile("youtube_iframe").unwrap().defaults)();
        assert_eq!(defaults["youtube"]["controls"], 0);
        assert_eq!(defaults["youtube"]["playsinline"], 1);
    }
}
