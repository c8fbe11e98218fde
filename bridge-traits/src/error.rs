use thiserror::Error;

#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("Bridge capability not available: {0}")]
    NotAvailable(String),

    #[error("Bridge operation failed: {0}")]
    OperationFailed(String),

    #[error("Operation not supported by host object: {0}")]
    Unsupported(String),
}

impl BridgeError {
    /// True when the host object simply lacks the requested member.
    pub fn is_unsupported(&self) -> bool {
        matches!(self, BridgeError::Unsupported(_))
    }
}

pub type Result<T> = std::result::Result<T, BridgeError>;
