//! Scripted vendor SDKs.
//!
//! [`ScriptedVendorHost`] never loads anything by itself. Script loads and
//! player readiness are completed explicitly, which lets callers exercise
//! every interleaving of "operation issued" and "vendor became ready".

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use bridge_traits::error::{BridgeError, Result};
use bridge_traits::vendor::{
    PlayerRequest, PlayerState, ReadySignal, VendorEvent, VendorEventSink, VendorHost,
    VendorPlayer,
};
use tracing::debug;

// ============================================================================
// Host
// ============================================================================

#[derive(Default)]
pub struct ScriptedVendorHost {
    scripts: RefCell<Vec<(String, String)>>,
    on_load: RefCell<HashMap<String, Vec<Box<dyn FnOnce()>>>>,
    pending: RefCell<Vec<(PlayerRequest, ReadySignal)>>,
    requests: RefCell<Vec<PlayerRequest>>,
    refuse_scripts: Cell<bool>,
    refuse_players: Cell<bool>,
}

impl ScriptedVendorHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// `(vendor, url)` of every injected script, in injection order.
    pub fn scripts(&self) -> Vec<(String, String)> {
        self.scripts.borrow().clone()
    }

    pub fn script_count(&self, vendor: &str) -> usize {
        self.scripts
            .borrow()
            .iter()
            .filter(|(name, _)| name == vendor)
            .count()
    }

    /// Run the `on_load` callbacks registered for `vendor`. Returns how many ran.
    pub fn finish_script(&self, vendor: &str) -> usize {
        let callbacks = self
            .on_load
            .borrow_mut()
            .remove(vendor)
            .unwrap_or_default();
        let count = callbacks.len();
        for callback in callbacks {
            callback();
        }
        debug!(vendor, callbacks = count, "scripted sdk loaded");
        count
    }

    /// Every player request received so far, settled or not.
    pub fn requests(&self) -> Vec<PlayerRequest> {
        self.requests.borrow().clone()
    }

    pub fn pending_players(&self) -> usize {
        self.pending.borrow().len()
    }

    /// Build and resolve the oldest pending player.
    pub fn complete_next(&self) -> Option<Rc<ScriptedPlayer>> {
        let (request, ready) = self.take_next()?;
        let player = Rc::new(ScriptedPlayer::new(&request));
        ready.resolve(player.clone());
        Some(player)
    }

    /// Reject the oldest pending player.
    pub fn fail_next(&self, message: &str) -> bool {
        match self.take_next() {
            Some((_, ready)) => ready.reject(BridgeError::OperationFailed(message.to_string())),
            None => false,
        }
    }

    pub fn refuse_scripts(&self, refuse: bool) {
        self.refuse_scripts.set(refuse);
    }

    /// Make `create_player` fail synchronously.
    pub fn refuse_players(&self, refuse: bool) {
        self.refuse_players.set(refuse);
    }

    fn take_next(&self) -> Option<(PlayerRequest, ReadySignal)> {
        let mut pending = self.pending.borrow_mut();
        if pending.is_empty() {
            None
        } else {
            Some(pending.remove(0))
        }
    }
}

impl VendorHost for ScriptedVendorHost {
    fn inject_script(&self, vendor: &str, url: &str, on_load: Box<dyn FnOnce()>) -> Result<()> {
        if self.refuse_scripts.get() {
            return Err(BridgeError::NotAvailable(format!("script {}", url)));
        }
        self.scripts
            .borrow_mut()
            .push((vendor.to_string(), url.to_string()));
        self.on_load
            .borrow_mut()
            .entry(vendor.to_string())
            .or_default()
            .push(on_load);
        Ok(())
    }

    fn create_player(&self, request: PlayerRequest, ready: ReadySignal) -> Result<()> {
        if self.refuse_players.get() {
            return Err(BridgeError::OperationFailed(format!(
                "cannot build {}",
                request.renderer
            )));
        }
        self.requests.borrow_mut().push(request.clone());
        self.pending.borrow_mut().push((request, ready));
        Ok(())
    }
}

impl std::fmt::Debug for ScriptedVendorHost {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScriptedVendorHost")
            .field("scripts", &self.scripts.borrow().len())
            .field("pending_players", &self.pending_players())
            .finish()
    }
}

// ============================================================================
// Player
// ============================================================================

/// A vendor player whose state is plain fields.
pub struct ScriptedPlayer {
    request: PlayerRequest,
    volume: Cell<f64>,
    muted: Cell<bool>,
    time: Cell<f64>,
    duration: Cell<f64>,
    fraction: Cell<f64>,
    rate: Cell<f64>,
    looping: Cell<bool>,
    url: RefCell<String>,
    calls: RefCell<Vec<String>>,
    sink: RefCell<Option<VendorEventSink>>,
    visible: Cell<bool>,
    size: Cell<Option<(u32, u32)>>,
    destroyed: Cell<bool>,
}

impl ScriptedPlayer {
    pub fn new(request: &PlayerRequest) -> Self {
        Self {
            request: request.clone(),
            volume: Cell::new(1.0),
            muted: Cell::new(false),
            time: Cell::new(0.0),
            duration: Cell::new(0.0),
            fraction: Cell::new(0.0),
            rate: Cell::new(1.0),
            looping: Cell::new(false),
            url: RefCell::new(request.src.clone()),
            calls: RefCell::new(Vec::new()),
            sink: RefCell::new(None),
            visible: Cell::new(true),
            size: Cell::new(None),
            destroyed: Cell::new(false),
        }
    }

    pub fn request(&self) -> &PlayerRequest {
        &self.request
    }

    /// Method names called on this player, e.g. `["setVolume", "play"]`.
    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    /// Deliver an event to the subscribed sink. Returns false with no sink.
    pub fn push(&self, event: VendorEvent) -> bool {
        let sink = self.sink.borrow().clone();
        match sink {
            Some(sink) => {
                sink(event);
                true
            }
            None => false,
        }
    }

    pub fn push_state(&self, state: PlayerState) -> bool {
        self.push(VendorEvent::StateChange(state))
    }

    pub fn push_native(&self, name: &str) -> bool {
        self.push(VendorEvent::Native {
            name: name.to_string(),
            message: None,
        })
    }

    pub fn set_progress(&self, time: f64, duration: f64, fraction: f64) {
        self.time.set(time);
        self.duration.set(duration);
        self.fraction.set(fraction);
    }

    pub fn volume_level(&self) -> f64 {
        self.volume.get()
    }

    pub fn is_looping(&self) -> bool {
        self.looping.get()
    }

    pub fn is_visible(&self) -> bool {
        self.visible.get()
    }

    pub fn size(&self) -> Option<(u32, u32)> {
        self.size.get()
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed.get()
    }

    fn record(&self, call: &str) {
        self.calls.borrow_mut().push(call.to_string());
    }
}

impl VendorPlayer for ScriptedPlayer {
    fn play(&self) -> Result<()> {
        self.record("play");
        Ok(())
    }

    fn pause(&self) -> Result<()> {
        self.record("pause");
        Ok(())
    }

    fn load(&self, media_id: &str, autoplay: bool) -> Result<()> {
        self.record(if autoplay { "loadVideoById" } else { "cueVideoById" });
        *self.url.borrow_mut() = media_id.to_string();
        self.time.set(0.0);
        Ok(())
    }

    fn seek_to(&self, seconds: f64) -> Result<()> {
        self.record("seekTo");
        self.time.set(seconds);
        Ok(())
    }

    fn set_volume(&self, volume: f64) -> Result<()> {
        self.record("setVolume");
        self.volume.set(volume);
        Ok(())
    }

    fn volume(&self) -> Result<f64> {
        Ok(self.volume.get())
    }

    fn set_muted(&self, muted: bool) -> Result<()> {
        self.record(if muted { "mute" } else { "unMute" });
        self.muted.set(muted);
        Ok(())
    }

    fn is_muted(&self) -> Result<bool> {
        Ok(self.muted.get())
    }

    fn current_time(&self) -> Result<f64> {
        Ok(self.time.get())
    }

    fn duration(&self) -> Result<f64> {
        Ok(self.duration.get())
    }

    fn loaded_fraction(&self) -> Result<f64> {
        Ok(self.fraction.get())
    }

    fn media_url(&self) -> Result<String> {
        Ok(self.url.borrow().clone())
    }

    fn playback_rate(&self) -> Result<f64> {
        Ok(self.rate.get())
    }

    fn set_playback_rate(&self, rate: f64) -> Result<()> {
        self.record("setPlaybackRate");
        self.rate.set(rate);
        Ok(())
    }

    fn set_loop(&self, looping: bool) -> Result<()> {
        self.record("setLoop");
        self.looping.set(looping);
        Ok(())
    }

    fn stop(&self) -> Result<()> {
        self.record("stop");
        self.time.set(0.0);
        Ok(())
    }

    fn set_size(&self, width: u32, height: u32) -> Result<()> {
        self.size.set(Some((width, height)));
        Ok(())
    }

    fn set_visible(&self, visible: bool) -> Result<()> {
        self.visible.set(visible);
        Ok(())
    }

    fn subscribe(&self, sink: VendorEventSink) {
        *self.sink.borrow_mut() = Some(sink);
    }

    fn destroy(&self) -> Result<()> {
        self.record("destroy");
        self.destroyed.set(true);
        self.sink.borrow_mut().take();
        Ok(())
    }
}

impl std::fmt::Debug for ScriptedPlayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScriptedPlayer")
            .field("renderer", &self.request.renderer)
            .field("media_id", &self.request.media_id)
            .field("destroyed", &self.destroyed.get())
            .finish()
    }
}
