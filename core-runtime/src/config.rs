//! # Media Element Configuration
//!
//! Options a host passes when building a media element.
//!
//! ## Overview
//!
//! [`MediaElementOptions`] is plain serde data so it can come straight from
//! a player config file or a `data-` attribute. Use
//! [`MediaElementOptions::builder`] in code, or
//! [`MediaElementOptions::from_json`] when loading. Both validate fail-fast.
//!
//! ## Usage
//!
//! ```rust
//! use core_runtime::config::MediaElementOptions;
//!
//! let options = MediaElementOptions::builder()
//!     .renderer("youtube_iframe")
//!     .renderer("html5")
//!     .autoplay(true)
//!     .build()
//!     .expect("valid options");
//! assert_eq!(options.renderers, vec!["youtube_iframe", "html5"]);
//!
//! let loaded = MediaElementOptions::from_json(r#"{ "renderers": ["html5"], "pollIntervalMs": 500 }"#)
//!     .expect("valid json");
//! assert_eq!(loaded.poll_interval_ms, 500);
//! ```
//!
//! Keys not known to this struct are kept in [`MediaElementOptions::extra`]
//! and handed to renderers unchanged, e.g. a `youtube` section with player
//! vars.

use std::collections::HashSet;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Error, Result};

pub const DEFAULT_FAKE_NODE_NAME: &str = "mediaelementwrapper";
pub const DEFAULT_PLUGIN_PATH: &str = "build/";
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 250;
pub const MAX_POLL_INTERVAL_MS: u64 = 10_000;
pub const DEFAULT_WIDTH: u32 = 640;
pub const DEFAULT_HEIGHT: u32 = 360;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MediaElementOptions {
    /// Renderer allow-list in preference order. Empty means every registered
    /// renderer in registration order.
    pub renderers: Vec<String>,

    /// Tag name of the wrapper node standing in for the media element.
    pub fake_node_name: String,

    /// Where plugin assets (the Flash shim) are served from.
    pub plugin_path: String,

    pub autoplay: bool,

    /// Interval for synthetic `timeupdate` events on polled backends.
    pub poll_interval_ms: u64,

    pub width: u32,

    pub height: u32,

    /// Renderer specific sections, passed through untouched.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for MediaElementOptions {
    fn default() -> Self {
        Self {
            renderers: Vec::new(),
            fake_node_name: DEFAULT_FAKE_NODE_NAME.to_string(),
            plugin_path: DEFAULT_PLUGIN_PATH.to_string(),
            autoplay: false,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            extra: Map::new(),
        }
    }
}

impl MediaElementOptions {
    pub fn builder() -> MediaElementOptionsBuilder {
        MediaElementOptionsBuilder::default()
    }

    /// Parse and validate options from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        let options: Self = serde_json::from_str(json)
            .map_err(|e| Error::Config(format!("Invalid media element options: {}", e)))?;
        options.validate()?;
        Ok(options)
    }

    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for name in &self.renderers {
            if name.trim().is_empty() {
                return Err(Error::Config(
                    "Renderer allow-list contains an empty name".to_string(),
                ));
            }
            if !seen.insert(name.as_str()) {
                return Err(Error::Config(format!(
                    "Renderer '{}' is listed more than once",
                    name
                )));
            }
        }

        if !(1..=MAX_POLL_INTERVAL_MS).contains(&self.poll_interval_ms) {
            return Err(Error::Config(format!(
                "pollIntervalMs must be between 1 and {} (got {})",
                MAX_POLL_INTERVAL_MS, self.poll_interval_ms
            )));
        }

        if self.plugin_path.trim().is_empty() {
            return Err(Error::Config("pluginPath must not be empty".to_string()));
        }

        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// The allow-list, or `None` when every renderer is allowed.
    pub fn allowed_renderers(&self) -> Option<&[String]> {
        if self.renderers.is_empty() {
            None
        } else {
            Some(&self.renderers)
        }
    }

    /// Options as a JSON object, the shape renderers merge their defaults into.
    pub fn to_json_map(&self) -> Result<Map<String, Value>> {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(_) => Err(Error::Internal(
                "media element options did not serialize to an object".to_string(),
            )),
            Err(e) => Err(Error::Internal(format!(
                "Failed to serialize media element options: {}",
                e
            ))),
        }
    }
}

/// Builder for [`MediaElementOptions`].
#[derive(Debug, Default)]
pub struct MediaElementOptionsBuilder {
    options: MediaElementOptions,
}

impl MediaElementOptionsBuilder {
    /// Replace the allow-list.
    pub fn renderers<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options.renderers = names.into_iter().map(Into::into).collect();
        self
    }

    /// Append one renderer to the allow-list.
    pub fn renderer(mut self, name: impl Into<String>) -> Self {
        self.options.renderers.push(name.into());
        self
    }

    pub fn fake_node_name(mut self, name: impl Into<String>) -> Self {
        self.options.fake_node_name = name.into();
        self
    }

    pub fn plugin_path(mut self, path: impl Into<String>) -> Self {
        self.options.plugin_path = path.into();
        self
    }

    pub fn autoplay(mut self, autoplay: bool) -> Self {
        self.options.autoplay = autoplay;
        self
    }

    pub fn poll_interval_ms(mut self, interval_ms: u64) -> Self {
        self.options.poll_interval_ms = interval_ms;
        self
    }

    pub fn size(mut self, width: u32, height: u32) -> Self {
        self.options.width = width;
        self.options.height = height;
        self
    }

    /// Add a renderer specific section, e.g. `("youtube", json!({...}))`.
    pub fn extra(mut self, key: impl Into<String>, value: Value) -> Self {
        self.options.extra.insert(key.into(), value);
        self
    }

    pub fn build(self) -> Result<MediaElementOptions> {
        self.options.validate()?;
        Ok(self.options)
    }
}
