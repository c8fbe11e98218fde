//! Media source lists.
//!
//! Callers hand the facade either a bare URL or a list of `{src, type?}`
//! entries, mirroring `<video src>` and nested `<source>` elements. Before
//! selection every entry gets a resolved, non-empty type.

use serde::{Deserialize, Serialize};

use crate::sniffer::TypeSniffer;

/// A source with its resolved type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MediaSource {
    pub src: String,
    #[serde(rename = "type")]
    pub mime_type: String,
}

impl MediaSource {
    pub fn new(src: impl Into<String>, mime_type: impl Into<String>) -> Self {
        Self {
            src: src.into(),
            mime_type: mime_type.into(),
        }
    }
}

/// A source as written by the caller; `type` may be missing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceInput {
    pub src: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
}

impl SourceInput {
    pub fn new(src: impl Into<String>) -> Self {
        Self {
            src: src.into(),
            mime_type: None,
        }
    }

    pub fn with_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }
}

/// Input accepted by `MediaElement::set_src`.
///
/// Deserializes from either a JSON string or an array of source objects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SourceSpec {
    Url(String),
    List(Vec<SourceInput>),
}

impl SourceSpec {
    /// Resolve every entry's type. Entries with a blank `src` are dropped, so
    /// the result may be empty.
    pub fn resolve(&self, sniffer: &TypeSniffer) -> Vec<MediaSource> {
        let inputs: Vec<(&str, Option<&str>)> = match self {
            SourceSpec::Url(url) => vec![(url.as_str(), None)],
            SourceSpec::List(list) => list
                .iter()
                .map(|input| (input.src.as_str(), input.mime_type.as_deref()))
                .collect(),
        };

        inputs
            .into_iter()
            .map(|(src, mime_type)| (src.trim(), mime_type))
            .filter(|(src, _)| !src.is_empty())
            .map(|(src, mime_type)| MediaSource::new(src, sniffer.classify(src, mime_type)))
            .collect()
    }
}

impl From<&str> for SourceSpec {
    fn from(url: &str) -> Self {
        SourceSpec::Url(url.to_string())
    }
}

impl From<String> for SourceSpec {
    fn from(url: String) -> Self {
        SourceSpec::Url(url)
    }
}

impl From<Vec<SourceInput>> for SourceSpec {
    fn from(list: Vec<SourceInput>) -> Self {
        SourceSpec::List(list)
    }
}

impl From<Vec<MediaSource>> for SourceSpec {
    fn from(list: Vec<MediaSource>) -> Self {
        SourceSpec::List(
            list.into_iter()
                .map(|source| SourceInput::new(source.src).with_type(source.mime_type))
                .collect(),
        )
    }
}
