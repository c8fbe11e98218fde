//! Headless media element walkthrough
//!
//! Drives one media element through native playback, a vendor player that
//! becomes ready later, and teardown, with structured logging enabled.
//!
//! Run with:
//! ```bash
//! cargo run -p core-playback --example headless_demo
//!
//! # JSON logs, everything from the playback core
//! cargo run -p core-playback --example headless_demo -- json "core_playback=trace"
//! ```

use std::env;
use std::rc::Rc;

use bridge_headless::{HeadlessMediaHost, ManualScheduler, ScriptedVendorHost};
use bridge_traits::logging::LogLevel;
use bridge_traits::media::MediaFeatures;
use bridge_traits::vendor::PlayerState;
use core_playback::{BuiltinRenderers, MediaElement, RendererHost, RendererRegistry, TypeSniffer};
use core_runtime::config::MediaElementOptions;
use core_runtime::logging::{init_logging, LogFormat, LoggingConfig};
use tracing::info;

fn main() {
    let args: Vec<String> = env::args().collect();
    let format = match args.get(1).map(String::as_str) {
        Some("json") => LogFormat::Json,
        Some("compact") => LogFormat::Compact,
        Some("pretty") => LogFormat::Pretty,
        _ => LogFormat::default(),
    };

    let mut config = LoggingConfig::default()
        .with_format(format)
        .with_level(LogLevel::Debug);
    if let Some(filter) = args.get(2) {
        config = config.with_filter(filter.clone());
    }
    init_logging(config).expect("Failed to initialize logging");

    // Host: MSE available, no Flash, native stack plays mp4 and webm.
    let media_host = Rc::new(HeadlessMediaHost::new(["video/mp4", "video/webm"]));
    let vendors = Rc::new(ScriptedVendorHost::new());
    let scheduler = Rc::new(ManualScheduler::new());
    let host = RendererHost {
        features: MediaFeatures {
            has_mse: true,
            has_flash: false,
            supports_media_tag: true,
        },
        media: media_host.clone(),
        vendors: vendors.clone(),
        scheduler: scheduler.clone(),
    };

    let mut registry = RendererRegistry::new();
    let mut sniffer = TypeSniffer::new();
    let _builtins = BuiltinRenderers::install(&mut registry, &mut sniffer, &host);

    let options = MediaElementOptions::builder()
        .autoplay(false)
        .poll_interval_ms(250)
        .build()
        .expect("Invalid options");
    let media = MediaElement::builder(Rc::new(registry), Rc::new(sniffer))
        .with_options(options)
        .build()
        .expect("Failed to build media element");

    for name in ["rendererready", "canplay", "play", "timeupdate", "volumechange", "error"] {
        media.add_event_listener(name, |event| {
            info!(
                event = event.name(),
                renderer = ?event.target().renderer,
                message = ?event.message,
                "media event"
            );
        });
    }

    info!("=== Native playback ===");
    media.set_src("https://cdn.example.com/trailer.mp4");
    media.set_volume(0.8);
    media.play();
    info!(paused = media.paused(), volume = ?media.volume(), "html5 state");

    info!("=== Vendor player ===");
    media.set_src("https://www.youtube.com/watch?v=yyWWXSwtPP0");
    media.set_volume(0.3);
    info!(readiness = ?media.readiness(), volume = ?media.volume(), "before sdk load");

    vendors.finish_script("youtube");
    if let Some(player) = vendors.complete_next() {
        player.set_progress(12.0, 240.0, 0.25);
        player.push_state(PlayerState::Playing);
        scheduler.tick();
    }
    info!(
        readiness = ?media.readiness(),
        volume = ?media.volume(),
        buffered_end = ?media.buffered().end(0),
        "after vendor ready"
    );

    info!("=== Unplayable source ===");
    media.set_src("https://cdn.example.com/clip.wmv?token=secret");

    media.destroy();
    info!(cached_nodes = media_host.nodes().len(), "demo complete");
}
