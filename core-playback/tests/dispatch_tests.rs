//! End-to-end dispatch through the built-in renderers.
//!
//! Covers:
//! - Renderer selection across allow-lists and host capabilities
//! - Handle caching and reuse when switching renderers
//! - Exactly one active handle receiving operations
//! - Native events re-dispatched with the facade as target

mod common;

use bridge_traits::media::{MediaFeatures, Method, Property, PropertyValue};
use common::{errors, names, record, Harness};
use core_playback::{Readiness, SourceInput, ERROR_CREATING_RENDERER, NO_RENDERER_FOUND};
use core_runtime::config::MediaElementOptions;

fn options(renderers: &[&str]) -> MediaElementOptions {
    MediaElementOptions::builder()
        .renderers(renderers.iter().copied())
        .build()
        .unwrap()
}

// ============================================================================
// Selection
// ============================================================================

#[test]
fn test_flv_falls_through_to_plugin_renderer() {
    let harness = Harness::desktop();
    let media = harness.element("player1", options(&["html5", "flash_video"]));
    let seen = record(&media);

    assert!(media.set_src(vec![SourceInput::new("https://cdn.test/clip.flv")]));

    assert_eq!(media.active_renderer_name().as_deref(), Some("flash_video"));
    assert_eq!(media.sources()[0].mime_type, "video/flv");
    assert!(harness.media.nodes().is_empty());
    assert!(errors(&seen).is_empty());

    // Plugin players are built per instance, without a shared script.
    assert!(harness.vendors.scripts().is_empty());
    let requests = harness.vendors.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].renderer, "flash_video");
    assert_eq!(requests[0].media_id, "https://cdn.test/clip.flv");
    assert_eq!(requests[0].element_id, "player1");
}

#[test]
fn test_mp4_prefers_native_playback() {
    let harness = Harness::desktop();
    let media = harness.element("player1", MediaElementOptions::default());
    let seen = record(&media);

    assert!(media.set_src("https://cdn.test/clip.mp4"));

    assert_eq!(media.active_renderer_name().as_deref(), Some("html5"));
    assert_eq!(media.readiness(), Some(Readiness::Ready));
    let node = harness.media.last_node().unwrap();
    assert_eq!(
        node.value(Property::Src),
        PropertyValue::from("https://cdn.test/clip.mp4")
    );
    assert!(names(&seen).contains(&"rendererready".to_string()));
}

#[test]
fn test_hls_sniffed_to_codec_library_renderer() {
    let harness = Harness::desktop();
    let media = harness.element("player1", MediaElementOptions::default());

    assert!(media.set_src("https://cdn.test/live/index.m3u8"));

    assert_eq!(media.active_renderer_name().as_deref(), Some("native_hls"));
    assert_eq!(harness.vendors.script_count("hls"), 1);
    assert_eq!(media.readiness(), Some(Readiness::AwaitingExternalReady));
}

#[test]
fn test_hls_without_mse_reports_no_renderer() {
    let harness = Harness::new(MediaFeatures::default(), &["video/mp4"]);
    let media = harness.element("player1", options(&["html5", "native_hls"]));
    let seen = record(&media);

    assert!(!media.set_src("https://cdn.test/live/index.m3u8"));

    assert_eq!(errors(&seen), vec![NO_RENDERER_FOUND.to_string()]);
    assert!(media.active_renderer_name().is_none());
    assert!(harness.vendors.scripts().is_empty());
}

#[test]
fn test_hls_without_mse_or_flash_reports_no_renderer() {
    let harness = Harness::new(MediaFeatures::default(), &["video/mp4"]);
    let media = harness.element("player1", MediaElementOptions::default());
    let seen = record(&media);

    assert!(!media.set_src("https://cdn.test/movie.m3u8"));

    assert_eq!(errors(&seen), vec![NO_RENDERER_FOUND.to_string()]);
    assert!(media.active_renderer_name().is_none());
    assert!(harness.vendors.requests().is_empty());
}

#[test]
fn test_ogg_is_audio_only_on_flash_hosts() {
    let bare = Harness::new(MediaFeatures::default(), &["video/mp4"]);
    assert_eq!(bare.sniffer.classify("https://cdn.test/movie.ogg", None), "video/ogg");
    assert!(!bare.sniffer.sniffer_names().contains(&"flash"));

    let desktop = Harness::desktop();
    assert_eq!(desktop.sniffer.classify("https://cdn.test/movie.ogg", None), "audio/ogg");
    assert_eq!(
        desktop.sniffer.classify("rtmp://cdn.test/app/clip", None),
        "video/rtmp"
    );
}

#[test]
fn test_empty_source_list_reports_no_renderer() {
    let harness = Harness::desktop();
    let media = harness.element("player1", MediaElementOptions::default());
    let seen = record(&media);

    assert!(!media.set_src(vec![SourceInput::new("  ")]));
    assert_eq!(errors(&seen), vec![NO_RENDERER_FOUND.to_string()]);
}

#[test]
fn test_refused_native_node_reports_creation_error() {
    let harness = Harness::desktop();
    harness.media.refuse_nodes(true);
    let media = harness.element("player1", options(&["html5"]));
    let seen = record(&media);

    assert!(!media.set_src("https://cdn.test/clip.mp4"));

    assert_eq!(errors(&seen), vec![ERROR_CREATING_RENDERER.to_string()]);
    assert!(media.active_renderer_name().is_none());
    assert_eq!(media.cached_renderers(), 0);
}

#[test]
fn test_explicit_type_overrides_sniffing() {
    let harness = Harness::desktop();
    let media = harness.element("player1", MediaElementOptions::default());

    let source = SourceInput::new("https://cdn.test/stream").with_type("video/mp4; codecs=\"avc1\"");
    assert!(media.set_src(vec![source]));
    assert_eq!(media.active_renderer_name().as_deref(), Some("html5"));
}

// ============================================================================
// Switching and caching
// ============================================================================

#[test]
fn test_switching_back_reuses_cached_handle() {
    let harness = Harness::desktop();
    let media = harness.element("player1", MediaElementOptions::default());

    media.set_src("https://cdn.test/clip.mp4");
    media.play();
    media.set_src("https://www.youtube.com/watch?v=yyWWXSwtPP0");
    assert_eq!(media.active_renderer_name().as_deref(), Some("youtube_iframe"));

    let node = harness.media.last_node().unwrap();
    assert!(!node.is_visible());
    assert_eq!(node.calls(), vec![Method::Play, Method::Pause]);

    media.set_src("https://cdn.test/other.mp4");

    assert_eq!(media.active_renderer_name().as_deref(), Some("html5"));
    assert_eq!(media.cached_renderers(), 2);
    assert_eq!(harness.media.nodes().len(), 1);
    assert_eq!(harness.vendors.script_count("youtube"), 1);
    assert!(node.is_visible());
    assert_eq!(
        node.value(Property::Src),
        PropertyValue::from("https://cdn.test/other.mp4")
    );
}

#[test]
fn test_operations_reach_only_the_active_handle() {
    let harness = Harness::desktop();
    let media = harness.element("player1", options(&["html5", "flash_video"]));

    media.set_src("https://cdn.test/clip.flv");
    let player = harness.vendors.complete_next().unwrap();
    media.set_src("https://cdn.test/clip.mp4");
    let node = harness.media.last_node().unwrap();

    media.set_volume(0.25);
    media.play();

    assert_eq!(node.value(Property::Volume), PropertyValue::Number(0.25));
    assert_eq!(node.calls().last(), Some(&Method::Play));
    assert_eq!(media.volume(), Some(0.25));
    assert_eq!(player.calls(), vec!["pause", "stop", "pause"]);
    assert!(!player.is_visible());
}

#[test]
fn test_change_renderer_outside_allow_list_is_refused() {
    let harness = Harness::desktop();
    let media = harness.element("player1", options(&["html5"]));
    let seen = record(&media);

    media.set_src("https://cdn.test/clip.mp4");
    let sources = media.sources();
    assert!(!media.change_renderer("youtube_iframe", &sources));
    assert!(!media.change_renderer("no_such_renderer", &sources));

    assert_eq!(media.active_renderer_name().as_deref(), Some("html5"));
    assert!(errors(&seen).is_empty());
    assert!(harness.vendors.requests().is_empty());
}

// ============================================================================
// Stop and pre-renderer operations
// ============================================================================

#[test]
fn test_stop_only_reaches_plugin_players() {
    let harness = Harness::desktop();
    let media = harness.element("player1", options(&["html5", "flash_video"]));

    media.set_src("https://cdn.test/clip.mp4");
    media.stop();
    let node = harness.media.last_node().unwrap();
    assert!(node.calls().is_empty());

    media.set_src("https://cdn.test/clip.flv");
    let player = harness.vendors.complete_next().unwrap();
    media.stop();
    assert_eq!(player.calls().last().map(String::as_str), Some("stop"));
}

#[test]
fn test_operations_before_any_renderer_are_replayed() {
    let harness = Harness::desktop();
    let media = harness.element("player1", MediaElementOptions::default());

    assert_eq!(media.get(Property::Paused), PropertyValue::Bool(true));
    assert!(media.volume().is_none());
    media.set_muted(true);
    media.play();

    media.set_src("https://cdn.test/clip.mp4");
    let node = harness.media.last_node().unwrap();
    assert_eq!(node.value(Property::Muted), PropertyValue::Bool(true));
    assert_eq!(node.calls(), vec![Method::Play]);
    assert!(!media.paused());
}

// ============================================================================
// Events
// ============================================================================

#[test]
fn test_native_event_arrives_once_with_facade_target() {
    let harness = Harness::desktop();
    let media = harness.element("player1", MediaElementOptions::default());
    media.set_src("https://cdn.test/clip.mp4");
    let seen = record(&media);

    let node = harness.media.last_node().unwrap();
    node.emit("timeupdate");

    let events = seen.borrow();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].name(), "timeupdate");
    assert_eq!(events[0].target().element_id, "player1");
    assert_eq!(events[0].target().renderer.as_deref(), Some("html5"));
}

#[test]
fn test_node_error_is_forwarded_with_message() {
    let harness = Harness::desktop();
    let media = harness.element("player1", MediaElementOptions::default());
    media.set_src("https://cdn.test/clip.mp4");
    let seen = record(&media);

    harness.media.last_node().unwrap().emit_error("MEDIA_ERR_DECODE");
    assert_eq!(errors(&seen), vec!["MEDIA_ERR_DECODE".to_string()]);
}

#[test]
fn test_destroy_silences_everything() {
    let harness = Harness::desktop();
    let media = harness.element("player1", MediaElementOptions::default());
    let seen = record(&media);
    media.set_src("https://cdn.test/clip.mp4");
    let node = harness.media.last_node().unwrap();
    seen.borrow_mut().clear();

    media.destroy();
    media.destroy();
    media.play();
    media.set_volume(0.1);

    assert!(node.is_removed());
    assert_eq!(node.emit("timeupdate"), 0);
    assert!(node.calls().is_empty());
    assert!(seen.borrow().is_empty());
    assert!(!media.set_src("https://cdn.test/clip.mp4"));
    assert_eq!(media.get(Property::Duration), PropertyValue::Number(0.0));
}

#[test]
fn test_can_play_type_before_any_renderer() {
    let harness = Harness::desktop();
    let media = harness.element("player1", options(&["html5", "youtube_iframe"]));

    assert!(media.can_play_type("video/mp4").is_playable());
    assert!(media.can_play_type("video/x-youtube").is_playable());
    assert!(!media.can_play_type("video/x-vimeo").is_playable());
}
