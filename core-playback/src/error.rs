//! # Playback Error Types
//!
//! Errors raised by the renderer layer. Expected runtime failures never leave
//! the facade as `Err`; the facade turns them into an `error` event. These
//! types surface directly only for misuse (registry, builders) and from
//! backend handles to the facade.

use thiserror::Error;

/// Message of the `error` event raised when selection fails.
pub const NO_RENDERER_FOUND: &str = "No renderer found";

/// Message of the `error` event raised when a descriptor cannot build a handle.
pub const ERROR_CREATING_RENDERER: &str = "Error creating renderer";

#[derive(Error, Debug)]
pub enum PlaybackError {
    // ========================================================================
    // Selection Errors
    // ========================================================================
    /// No registered renderer accepts any of the sources.
    #[error("No renderer found")]
    NoRendererFound,

    /// A renderer name is not registered, or is outside the allow-list.
    #[error("Unknown renderer: {0}")]
    UnknownRenderer(String),

    /// Invalid source input (empty list, blank URL).
    #[error("Invalid source: {0}")]
    InvalidSource(String),

    // ========================================================================
    // Construction Errors
    // ========================================================================
    /// A descriptor failed to build its backend handle.
    #[error("Error creating renderer {renderer}: {message}")]
    RendererCreation { renderer: String, message: String },

    /// A name was registered twice with `register_unique`.
    #[error("Renderer already registered: {0}")]
    DuplicateRenderer(String),

    /// Readiness moved along an edge the state machine does not allow.
    #[error("Invalid readiness transition from {from} to {to}")]
    InvalidTransition { from: String, to: String },

    // ========================================================================
    // Dispatch Errors
    // ========================================================================
    /// The backend does not implement this property or method.
    #[error("{renderer} does not support {operation}")]
    Unsupported { renderer: String, operation: String },

    /// The backend is still waiting for its vendor.
    #[error("{0} is not ready")]
    NotReady(String),

    /// The property is read-only.
    #[error("Property {0} is read-only")]
    ReadOnly(String),

    /// A value of the wrong shape was assigned to a property.
    #[error("Invalid value for {property}: {value}")]
    InvalidValue { property: String, value: String },

    // ========================================================================
    // Lifecycle Errors
    // ========================================================================
    /// A pending construction was cancelled by teardown.
    #[error("Construction cancelled")]
    Cancelled,

    // ========================================================================
    // Generic Errors
    // ========================================================================
    #[error("Bridge error: {0}")]
    Bridge(#[from] bridge_traits::BridgeError),

    #[error("Runtime error: {0}")]
    Runtime(#[from] core_runtime::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl PlaybackError {
    pub fn unsupported(renderer: impl Into<String>, operation: impl Into<String>) -> Self {
        PlaybackError::Unsupported {
            renderer: renderer.into(),
            operation: operation.into(),
        }
    }

    pub fn creation(renderer: impl Into<String>, message: impl Into<String>) -> Self {
        PlaybackError::RendererCreation {
            renderer: renderer.into(),
            message: message.into(),
        }
    }

    /// Returns `true` when no renderer could be chosen for the input.
    pub fn is_selection_failure(&self) -> bool {
        matches!(
            self,
            PlaybackError::NoRendererFound
                | PlaybackError::UnknownRenderer(_)
                | PlaybackError::InvalidSource(_)
        )
    }

    /// Returns `true` when an operation missed its target and should be
    /// dropped quietly rather than reported.
    pub fn is_dispatch_miss(&self) -> bool {
        match self {
            PlaybackError::Unsupported { .. } | PlaybackError::ReadOnly(_) => true,
            PlaybackError::Bridge(err) => err.is_unsupported(),
            _ => false,
        }
    }

    /// Message used for the canonical `error` event.
    pub fn event_message(&self) -> String {
        match self {
            PlaybackError::NoRendererFound
            | PlaybackError::UnknownRenderer(_)
            | PlaybackError::InvalidSource(_) => NO_RENDERER_FOUND.to_string(),
            PlaybackError::RendererCreation { .. } => ERROR_CREATING_RENDERER.to_string(),
            other => other.to_string(),
        }
    }
}

/// Result type for playback operations.
pub type Result<T> = std::result::Result<T, PlaybackError>;

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_traits::BridgeError;

    #[test]
    fn test_selection_failures_map_to_canonical_message() {
        assert!(PlaybackError::NoRendererFound.is_selection_failure());
        assert_eq!(PlaybackError::NoRendererFound.event_message(), "No renderer found");
        assert_eq!(
            PlaybackError::UnknownRenderer("x".into()).event_message(),
            "No renderer found"
        );
        assert_eq!(
            PlaybackError::creation("youtube_iframe", "host refused").event_message(),
            "Error creating renderer"
        );
    }

    #[test]
    fn test_dispatch_miss() {
        assert!(PlaybackError::unsupported("html5", "stop").is_dispatch_miss());
        assert!(PlaybackError::from(BridgeError::Unsupported("loop".into())).is_dispatch_miss());
        assert!(!PlaybackError::from(BridgeError::OperationFailed("x".into())).is_dispatch_miss());
        assert!(!PlaybackError::Cancelled.is_dispatch_miss());
    }

    #[test]
    fn test_other_errors_use_display_message() {
        let err = PlaybackError::InvalidValue {
            property: "volume".into(),
            value: "Text(\"loud\")".into(),
        };
        assert_eq!(err.event_message(), "Invalid value for volume: Text(\"loud\")");
        assert!(!err.is_dispatch_miss());
    }
}
