//! Media element vocabulary and native media node contracts.
//!
//! Every backend, whether it wraps a native `<video>`/`<audio>` node or a
//! vendor iframe player, is driven through the closed [`Property`] and
//! [`Method`] vocabularies defined here. Hosts that own a real media node
//! implement [`NativeMediaHost`] and [`NativeMediaNode`].

use std::fmt;
use std::rc::Rc;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{BridgeError, Result};

/// Tracked media properties.
///
/// The wire name (see [`Property::as_str`]) matches the HTML media element
/// attribute so that configuration and logs read the same as browser code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Property {
    Volume,
    Src,
    CurrentTime,
    Muted,
    Duration,
    Paused,
    Ended,
    Error,
    CurrentSrc,
    NetworkState,
    Preload,
    Buffered,
    ReadyState,
    Seeking,
    DefaultPlaybackRate,
    PlaybackRate,
    Autoplay,
    Loop,
    Controls,
}

impl Property {
    pub const ALL: [Property; 19] = [
        Property::Volume,
        Property::Src,
        Property::CurrentTime,
        Property::Muted,
        Property::Duration,
        Property::Paused,
        Property::Ended,
        Property::Error,
        Property::CurrentSrc,
        Property::NetworkState,
        Property::Preload,
        Property::Buffered,
        Property::ReadyState,
        Property::Seeking,
        Property::DefaultPlaybackRate,
        Property::PlaybackRate,
        Property::Autoplay,
        Property::Loop,
        Property::Controls,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Property::Volume => "volume",
            Property::Src => "src",
            Property::CurrentTime => "currentTime",
            Property::Muted => "muted",
            Property::Duration => "duration",
            Property::Paused => "paused",
            Property::Ended => "ended",
            Property::Error => "error",
            Property::CurrentSrc => "currentSrc",
            Property::NetworkState => "networkState",
            Property::Preload => "preload",
            Property::Buffered => "buffered",
            Property::ReadyState => "readyState",
            Property::Seeking => "seeking",
            Property::DefaultPlaybackRate => "defaultPlaybackRate",
            Property::PlaybackRate => "playbackRate",
            Property::Autoplay => "autoplay",
            Property::Loop => "loop",
            Property::Controls => "controls",
        }
    }

    /// Whether callers may assign this property.
    pub fn is_writable(&self) -> bool {
        matches!(
            self,
            Property::Volume
                | Property::Src
                | Property::CurrentTime
                | Property::Muted
                | Property::Preload
                | Property::DefaultPlaybackRate
                | Property::PlaybackRate
                | Property::Autoplay
                | Property::Loop
                | Property::Controls
        )
    }

    /// Value reported while no backend is able to answer.
    pub fn neutral_default(&self) -> PropertyValue {
        match self {
            Property::Paused => PropertyValue::Bool(true),
            Property::Ended => PropertyValue::Bool(false),
            Property::CurrentTime | Property::Duration => PropertyValue::Number(0.0),
            _ => PropertyValue::Null,
        }
    }
}

impl fmt::Display for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Property {
    type Err = BridgeError;

    fn from_str(s: &str) -> Result<Self> {
        Property::ALL
            .iter()
            .copied()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| BridgeError::Unsupported(format!("unknown property '{}'", s)))
    }
}

/// Actions that can be invoked on a media backend.
///
/// `canPlayType` is deliberately absent: it returns a value and is never
/// queued, so it has a dedicated entry point on every handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Play,
    Pause,
    Load,
    Stop,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Play => "play",
            Method::Pause => "pause",
            Method::Load => "load",
            Method::Stop => "stop",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Method {
    type Err = BridgeError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "play" => Ok(Method::Play),
            "pause" => Ok(Method::Pause),
            "load" => Ok(Method::Load),
            "stop" => Ok(Method::Stop),
            other => Err(BridgeError::Unsupported(format!("unknown method '{}'", other))),
        }
    }
}

/// Buffered/played/seekable ranges, in seconds.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TimeRanges {
    ranges: Vec<(f64, f64)>,
}

impl TimeRanges {
    pub fn new(ranges: Vec<(f64, f64)>) -> Self {
        Self { ranges }
    }

    /// A single range starting at `start`.
    pub fn single(start: f64, end: f64) -> Self {
        Self {
            ranges: vec![(start, end)],
        }
    }

    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    pub fn start(&self, index: usize) -> Option<f64> {
        self.ranges.get(index).map(|(start, _)| *start)
    }

    pub fn end(&self, index: usize) -> Option<f64> {
        self.ranges.get(index).map(|(_, end)| *end)
    }
}

/// Dynamically typed property value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    #[default]
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
    Ranges(TimeRanges),
}

impl PropertyValue {
    pub fn is_null(&self) -> bool {
        matches!(self, PropertyValue::Null)
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            PropertyValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            PropertyValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropertyValue::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_ranges(&self) -> Option<&TimeRanges> {
        match self {
            PropertyValue::Ranges(r) => Some(r),
            _ => None,
        }
    }

    /// Loose truthiness, used when a boolean is expected but the caller
    /// passed something else (e.g. `muted = 1`).
    pub fn truthy(&self) -> bool {
        match self {
            PropertyValue::Null => false,
            PropertyValue::Bool(b) => *b,
            PropertyValue::Number(n) => *n != 0.0 && !n.is_nan(),
            PropertyValue::Text(s) => !s.is_empty(),
            PropertyValue::Ranges(r) => !r.is_empty(),
        }
    }
}

impl From<f64> for PropertyValue {
    fn from(value: f64) -> Self {
        PropertyValue::Number(value)
    }
}

impl From<bool> for PropertyValue {
    fn from(value: bool) -> Self {
        PropertyValue::Bool(value)
    }
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        PropertyValue::Text(value.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(value: String) -> Self {
        PropertyValue::Text(value)
    }
}

impl From<TimeRanges> for PropertyValue {
    fn from(value: TimeRanges) -> Self {
        PropertyValue::Ranges(value)
    }
}

impl<T: Into<PropertyValue>> From<Option<T>> for PropertyValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(PropertyValue::Null)
    }
}

/// Answer to `canPlayType`, mirroring the HTML tri-state string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CanPlayResponse {
    #[default]
    No,
    Maybe,
    Probably,
}

impl CanPlayResponse {
    pub fn as_str(&self) -> &'static str {
        match self {
            CanPlayResponse::No => "",
            CanPlayResponse::Maybe => "maybe",
            CanPlayResponse::Probably => "probably",
        }
    }

    pub fn is_playable(&self) -> bool {
        !matches!(self, CanPlayResponse::No)
    }
}

impl From<bool> for CanPlayResponse {
    fn from(playable: bool) -> Self {
        if playable {
            CanPlayResponse::Maybe
        } else {
            CanPlayResponse::No
        }
    }
}

/// Optional browser capabilities probed once by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaFeatures {
    /// Media Source Extensions are available.
    pub has_mse: bool,
    /// A Flash plugin is installed.
    pub has_flash: bool,
    /// The host can create native media nodes at all.
    pub supports_media_tag: bool,
}

/// Raw event raised by a host object.
#[derive(Debug, Clone, PartialEq)]
pub struct NativeEvent {
    pub name: String,
    pub message: Option<String>,
}

impl NativeEvent {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            message: None,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

pub type NativeListener = Rc<dyn Fn(&NativeEvent)>;

/// A native media node (`<video>`/`<audio>`) owned by the host.
///
/// Host objects live on the UI thread, so none of these contracts require
/// `Send`.
pub trait NativeMediaNode {
    fn id(&self) -> &str;

    fn can_play_type(&self, mime: &str) -> CanPlayResponse;

    fn get(&self, property: Property) -> Result<PropertyValue>;

    fn set(&self, property: Property, value: PropertyValue) -> Result<()>;

    fn invoke(&self, method: Method) -> Result<()>;

    /// Subscribe to a raw event by name.
    fn add_listener(&self, event: &str, listener: NativeListener);

    fn set_visible(&self, visible: bool);

    fn set_size(&self, width: u32, height: u32) -> Result<()>;

    /// Detach the node from the host document.
    fn remove(&self) {}
}

/// Factory for native media nodes.
pub trait NativeMediaHost {
    /// Ask the host media stack directly, without creating a node.
    fn can_play_type(&self, mime: &str) -> CanPlayResponse;

    fn create_node(&self, element_id: &str) -> Result<Rc<dyn NativeMediaNode>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_property_names_round_trip() {
        for property in Property::ALL {
            let parsed: Property = property.as_str().parse().unwrap();
            assert_eq!(parsed, property);
        }
        assert!("volumes".parse::<Property>().unwrap_err().is_unsupported());
    }

    #[test]
    fn test_neutral_defaults() {
        assert_eq!(Property::Paused.neutral_default(), PropertyValue::Bool(true));
        assert_eq!(Property::Ended.neutral_default(), PropertyValue::Bool(false));
        assert_eq!(Property::CurrentTime.neutral_default(), PropertyValue::Number(0.0));
        assert!(Property::Volume.neutral_default().is_null());
        assert!(Property::Buffered.neutral_default().is_null());
    }

    #[test]
    fn test_read_only_properties() {
        assert!(Property::Volume.is_writable());
        assert!(!Property::Duration.is_writable());
        assert!(!Property::Buffered.is_writable());
    }

    #[test]
    fn test_property_value_json_shape() {
        let value: PropertyValue = serde_json::from_str("0.5").unwrap();
        assert_eq!(value, PropertyValue::Number(0.5));
        let value: PropertyValue = serde_json::from_str("null").unwrap();
        assert!(value.is_null());
        let value: PropertyValue = serde_json::from_str("\"a.mp4\"").unwrap();
        assert_eq!(value.as_str(), Some("a.mp4"));
    }

    #[test]
    fn test_time_ranges() {
        let ranges = TimeRanges::single(0.0, 12.5);
        assert_eq!(ranges.len(), 1);
        assert_eq!(ranges.end(0), Some(12.5));
        assert_eq!(ranges.start(1), None);
    }

    #[test]
    fn test_can_play_response() {
        assert_eq!(CanPlayResponse::No.as_str(), "");
        assert!(CanPlayResponse::from(true).is_playable());
        assert!(!CanPlayResponse::from(false).is_playable());
    }
}
