//! Backend readiness state machine.
//!
//! ```text
//! Constructing ──> AwaitingExternalReady ──> Ready
//!      │                    │                  │
//!      └────────────────────┴──────────────────┴──> Destroyed
//! ```
//!
//! `Constructing` may also jump straight to `Ready` for backends whose vendor
//! object is available synchronously. `Destroyed` is terminal.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{PlaybackError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Readiness {
    /// Handle stub returned, vendor work not started.
    Constructing,
    /// Waiting on a script load, iframe handshake or plugin callback.
    AwaitingExternalReady,
    /// Vendor object available; operations dispatch directly.
    Ready,
    /// Terminal.
    Destroyed,
}

impl Readiness {
    pub fn is_ready(&self) -> bool {
        matches!(self, Readiness::Ready)
    }

    pub fn is_pending(&self) -> bool {
        matches!(
            self,
            Readiness::Constructing | Readiness::AwaitingExternalReady
        )
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Readiness::Destroyed)
    }

    pub fn can_transition(&self, next: Readiness) -> bool {
        use Readiness::*;
        matches!(
            (self, next),
            (Constructing, AwaitingExternalReady)
                | (Constructing, Ready)
                | (AwaitingExternalReady, Ready)
                | (Constructing, Destroyed)
                | (AwaitingExternalReady, Destroyed)
                | (Ready, Destroyed)
        )
    }

    /// Move to `next`, or fail with `InvalidTransition`.
    pub fn transition(&mut self, next: Readiness) -> Result<()> {
        if !self.can_transition(next) {
            return Err(PlaybackError::InvalidTransition {
                from: self.to_string(),
                to: next.to_string(),
            });
        }
        *self = next;
        Ok(())
    }
}

impl fmt::Display for Readiness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Readiness::Constructing => "Constructing",
            Readiness::AwaitingExternalReady => "AwaitingExternalReady",
            Readiness::Ready => "Ready",
            Readiness::Destroyed => "Destroyed",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_happy_path() {
        let mut state = Readiness::Constructing;
        state.transition(Readiness::AwaitingExternalReady).unwrap();
        assert!(state.is_pending());
        state.transition(Readiness::Ready).unwrap();
        assert!(state.is_ready());
        state.transition(Readiness::Destroyed).unwrap();
        assert!(state.is_terminal());
    }

    #[test]
    fn test_destroyed_is_terminal() {
        let mut state = Readiness::Destroyed;
        for next in [
            Readiness::Constructing,
            Readiness::AwaitingExternalReady,
            Readiness::Ready,
            Readiness::Destroyed,
        ] {
            assert!(state.transition(next).is_err());
        }
        assert_eq!(state, Readiness::Destroyed);
    }

    #[test]
    fn test_no_backwards_edges() {
        let mut state = Readiness::Ready;
        let err = state.transition(Readiness::AwaitingExternalReady).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid readiness transition from Ready to AwaitingExternalReady"
        );
    }
}
