//! Vendor player contracts.
//!
//! Third-party players (iframe SDKs, script-injected codec libraries, the
//! Flash plugin) are reached through a [`VendorHost`]. The host injects SDK
//! scripts, builds player objects and reports their readiness through a
//! one-shot [`ReadySignal`]. Once ready, a player is driven through the
//! request/response [`VendorPlayer`] trait and pushes state changes back via
//! a [`VendorEventSink`].

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{BridgeError, Result};

/// Player state codes reported by iframe SDKs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlayerState {
    Unstarted,
    Ended,
    Playing,
    Paused,
    Buffering,
    Cued,
}

impl PlayerState {
    /// Decode the numeric state used by the YouTube-style SDKs.
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            -1 => Some(PlayerState::Unstarted),
            0 => Some(PlayerState::Ended),
            1 => Some(PlayerState::Playing),
            2 => Some(PlayerState::Paused),
            3 => Some(PlayerState::Buffering),
            5 => Some(PlayerState::Cued),
            _ => None,
        }
    }

    pub fn code(&self) -> i32 {
        match self {
            PlayerState::Unstarted => -1,
            PlayerState::Ended => 0,
            PlayerState::Playing => 1,
            PlayerState::Paused => 2,
            PlayerState::Buffering => 3,
            PlayerState::Cued => 5,
        }
    }
}

/// Push notification from a vendor player.
#[derive(Debug, Clone, PartialEq)]
pub enum VendorEvent {
    /// SDK state machine moved (iframe players without an event model).
    StateChange(PlayerState),
    /// An event the vendor already names in the media vocabulary
    /// (plugin based players forward these verbatim).
    Native {
        name: String,
        message: Option<String>,
    },
    /// Asynchronous runtime failure.
    Error { message: String },
}

pub type VendorEventSink = Rc<dyn Fn(VendorEvent)>;

/// A constructed vendor player.
///
/// Optional capabilities default to [`BridgeError::Unsupported`] so the
/// caller can tell a missing member apart from a failing one.
pub trait VendorPlayer {
    fn play(&self) -> Result<()>;

    fn pause(&self) -> Result<()>;

    /// Point the player at a new media id, starting playback if `autoplay`.
    fn load(&self, media_id: &str, autoplay: bool) -> Result<()>;

    fn seek_to(&self, seconds: f64) -> Result<()>;

    fn set_volume(&self, volume: f64) -> Result<()>;

    fn volume(&self) -> Result<f64>;

    fn set_muted(&self, muted: bool) -> Result<()>;

    fn is_muted(&self) -> Result<bool>;

    fn current_time(&self) -> Result<f64>;

    fn duration(&self) -> Result<f64>;

    /// Fraction of the media downloaded, `0.0..=1.0`.
    fn loaded_fraction(&self) -> Result<f64>;

    fn media_url(&self) -> Result<String>;

    fn playback_rate(&self) -> Result<f64> {
        Err(BridgeError::Unsupported("playbackRate".to_string()))
    }

    fn set_playback_rate(&self, _rate: f64) -> Result<()> {
        Err(BridgeError::Unsupported("playbackRate".to_string()))
    }

    fn set_loop(&self, _looping: bool) -> Result<()> {
        Err(BridgeError::Unsupported("loop".to_string()))
    }

    fn stop(&self) -> Result<()> {
        Err(BridgeError::Unsupported("stop".to_string()))
    }

    fn set_size(&self, width: u32, height: u32) -> Result<()>;

    fn set_visible(&self, _visible: bool) -> Result<()> {
        Ok(())
    }

    /// Register the single sink that receives this player's events.
    fn subscribe(&self, sink: VendorEventSink);

    fn destroy(&self) -> Result<()> {
        Ok(())
    }
}

/// Everything a host needs to build one vendor player.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerRequest {
    /// Renderer name, e.g. `youtube_iframe`.
    pub renderer: String,
    /// Id of the wrapper element the player is mounted next to.
    pub element_id: String,
    /// Vendor specific media id extracted from `src`.
    pub media_id: String,
    pub src: String,
    pub width: u32,
    pub height: u32,
    pub autoplay: bool,
    /// Renderer options (`youtube`, `hls`, `flv` sections and so on).
    #[serde(default)]
    pub params: Map<String, Value>,
}

type ReadyCallback = Box<dyn FnOnce(Result<Rc<dyn VendorPlayer>>)>;

/// One-shot readiness promise handed to the host with each player request.
///
/// Clones share the same slot; the first `resolve`/`reject` wins and later
/// calls report `false`.
#[derive(Clone)]
pub struct ReadySignal {
    slot: Rc<RefCell<Option<ReadyCallback>>>,
}

impl ReadySignal {
    pub fn new(callback: impl FnOnce(Result<Rc<dyn VendorPlayer>>) + 'static) -> Self {
        Self {
            slot: Rc::new(RefCell::new(Some(Box::new(callback)))),
        }
    }

    pub fn resolve(&self, player: Rc<dyn VendorPlayer>) -> bool {
        self.settle(Ok(player))
    }

    pub fn reject(&self, error: BridgeError) -> bool {
        self.settle(Err(error))
    }

    pub fn is_settled(&self) -> bool {
        self.slot.borrow().is_none()
    }

    fn settle(&self, outcome: Result<Rc<dyn VendorPlayer>>) -> bool {
        // Release the borrow before running the callback; it may re-enter.
        let callback = self.slot.borrow_mut().take();
        match callback {
            Some(callback) => {
                callback(outcome);
                true
            }
            None => false,
        }
    }
}

impl fmt::Debug for ReadySignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReadySignal")
            .field("settled", &self.is_settled())
            .finish()
    }
}

/// Host side of the vendor integration.
pub trait VendorHost {
    /// Insert the vendor SDK script. `on_load` must run once the script has
    /// executed; it may never run if the network fails.
    fn inject_script(&self, vendor: &str, url: &str, on_load: Box<dyn FnOnce()>) -> Result<()>;

    /// Build a player. The host settles `ready` when the vendor reports the
    /// player usable, or rejects it on failure.
    fn create_player(&self, request: PlayerRequest, ready: ReadySignal) -> Result<()>;
}
