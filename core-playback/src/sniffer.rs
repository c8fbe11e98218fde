//! # Type Sniffer
//!
//! Classifies a media URL (or an explicit `type` attribute) into a canonical
//! MIME token such as `video/mp4`, `application/x-mpegURL` or
//! `video/x-youtube`.
//!
//! ## Overview
//!
//! Classification order:
//!
//! 1. An explicit type wins; parameters after `;` are stripped
//!    (`video/mp4; codecs="avc1"` becomes `video/mp4`).
//! 2. Registered sniffers run in registration order; the first `Some` wins.
//! 3. Otherwise the extension decides: `video/` for known video extensions,
//!    `audio/` for everything else, followed by the normalized extension.
//!
//! ```rust
//! use core_playback::sniffer::TypeSniffer;
//!
//! let mut sniffer = TypeSniffer::new();
//! sniffer.register_sniffer("hls", |url| {
//!     url.contains("m3u8").then(|| "application/x-mpegURL".to_string())
//! });
//!
//! assert_eq!(sniffer.classify("live.m3u8", None), "application/x-mpegURL");
//! assert_eq!(sniffer.classify("clip.m4v?t=3", None), "video/mp4");
//! assert_eq!(sniffer.classify("song.mp3", None), "audio/mp3");
//! assert_eq!(sniffer.classify("x", Some("video/webm; codecs=vp8")), "video/webm");
//! ```

use std::fmt;

use tracing::trace;

/// A sniffing function: `Some(mime)` when it recognises the URL.
pub type SniffFn = Box<dyn Fn(&str) -> Option<String>>;

/// Extensions treated as video by the fallback guess. Matched as substrings,
/// case-insensitively.
const VIDEO_EXTENSIONS: [&str; 10] = [
    "mp4", "m4v", "ogg", "ogv", "webm", "webmv", "flv", "wmv", "mpeg", "mov",
];

/// Ordered list of sniffing functions.
#[derive(Default)]
pub struct TypeSniffer {
    sniffers: Vec<(String, SniffFn)>,
}

impl TypeSniffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a sniffer. Earlier sniffers take priority.
    pub fn register_sniffer<F>(&mut self, name: impl Into<String>, sniff: F)
    where
        F: Fn(&str) -> Option<String> + 'static,
    {
        self.sniffers.push((name.into(), Box::new(sniff)));
    }

    pub fn sniffer_names(&self) -> Vec<&str> {
        self.sniffers.iter().map(|(name, _)| name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.sniffers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sniffers.is_empty()
    }

    /// Canonical type for `url`, honouring an `explicit_type` whose bare
    /// MIME is not blank.
    pub fn classify(&self, url: &str, explicit_type: Option<&str>) -> String {
        match explicit_type.map(mime_from_type).filter(|t| !t.is_empty()) {
            Some(explicit) => explicit.to_string(),
            None => self.sniff(url),
        }
    }

    /// Type from the URL alone.
    pub fn sniff(&self, url: &str) -> String {
        for (name, sniff) in &self.sniffers {
            if let Some(mime) = sniff(url) {
                trace!(sniffer = %name, mime = %mime, "sniffer matched");
                return mime;
            }
        }
        guess_from_extension(url)
    }
}

impl fmt::Debug for TypeSniffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeSniffer")
            .field("sniffers", &self.sniffer_names())
            .finish()
    }
}

/// Bare MIME type of a `type` attribute.
pub fn mime_from_type(media_type: &str) -> &str {
    match media_type.find(';') {
        Some(idx) => media_type[..idx].trim(),
        None => media_type.trim(),
    }
}

/// Extension of a URL, ignoring the query string. Empty when there is none.
pub fn extension(url: &str) -> &str {
    let path = url.split('?').next().unwrap_or(url);
    match path.rfind('.') {
        Some(idx) => &path[idx + 1..],
        None => "",
    }
}

/// Collapse extension aliases onto one canonical extension.
pub fn normalize_extension(ext: &str) -> &str {
    match ext {
        "mp4" | "m4v" => "mp4",
        "webm" | "webma" | "webmv" => "webm",
        "ogg" | "oga" | "ogv" => "ogg",
        other => other,
    }
}

fn guess_from_extension(url: &str) -> String {
    let ext = extension(url);
    let lower = ext.to_ascii_lowercase();
    let kind = if VIDEO_EXTENSIONS.iter().any(|video| lower.contains(video)) {
        "video"
    } else {
        "audio"
    };
    format!("{}/{}", kind, normalize_extension(ext))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mime_from_type_strips_parameters() {
        assert_eq!(mime_from_type("video/mp4; codecs=\"avc1.42E01E\""), "video/mp4");
        assert_eq!(mime_from_type("audio/ogg"), "audio/ogg");
    }

    #[test]
    fn test_extension_ignores_query() {
        assert_eq!(extension("http://a.test/v/clip.webm?x=1.2"), "webm");
        assert_eq!(extension("noext"), "");
        assert_eq!(extension("dir/file.tar.ogv"), "ogv");
    }

    #[test]
    fn test_normalize_extension() {
        assert_eq!(normalize_extension("m4v"), "mp4");
        assert_eq!(normalize_extension("webma"), "webm");
        assert_eq!(normalize_extension("oga"), "ogg");
        assert_eq!(normalize_extension("mp3"), "mp3");
    }

    #[test]
    fn test_fallback_guess() {
        let sniffer = TypeSniffer::new();
        assert_eq!(sniffer.sniff("movie.mp4"), "video/mp4");
        assert_eq!(sniffer.sniff("movie.ogv"), "video/ogg");
        assert_eq!(sniffer.sniff("sound.oga"), "audio/ogg");
        assert_eq!(sniffer.sniff("movie.MOV"), "video/MOV");
        assert_eq!(sniffer.sniff("track.wav"), "audio/wav");
    }

    #[test]
    fn test_first_registered_sniffer_wins() {
        let mut sniffer = TypeSniffer::new();
        sniffer.register_sniffer("first", |url| {
            url.contains("stream").then(|| "application/x-first".to_string())
        });
        sniffer.register_sniffer("second", |_| Some("application/x-second".to_string()));

        assert_eq!(sniffer.sniff("stream.mp4"), "application/x-first");
        assert_eq!(sniffer.sniff("plain.mp4"), "application/x-second");
        assert_eq!(sniffer.sniffer_names(), vec!["first", "second"]);
    }

    #[test]
    fn test_blank_explicit_type_falls_back_to_sniffing() {
        let sniffer = TypeSniffer::new();
        assert_eq!(sniffer.classify("a.webm", Some("  ")), "video/webm");
        assert_eq!(sniffer.classify("a.webm", Some("video/x-custom")), "video/x-custom");
        assert_eq!(sniffer.classify("a.webm", Some("; codecs=\"vp8\"")), "video/webm");
        assert_eq!(sniffer.classify("a.webm", Some("audio/webm; codecs=opus")), "audio/webm");
    }
}
