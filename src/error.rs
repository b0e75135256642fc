//! Error types for the control engine
//!
//! Everything here is local and recoverable: a rejected call leaves the
//! engine exactly as it was.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ControlError {
    #[error("control not found: {0}")]
    NotFound(String),

    #[error("unknown control: {0}")]
    UnknownControl(String),

    #[error("value {value} out of range for '{identifier}' (expected 0-127)")]
    OutOfRange { identifier: String, value: i32 },

    #[error("duplicate CC address {address} ('{identifier}')")]
    DuplicateAddress { address: u8, identifier: String },

    #[error("duplicate control identifier: {0}")]
    DuplicateIdentifier(String),

    #[error("invalid control '{identifier}': {reason}")]
    InvalidControl { identifier: String, reason: String },

    #[error("invalid MIDI channel {0} (expected 1-16)")]
    InvalidChannel(i32),
}

pub type Result<T> = std::result::Result<T, ControlError>;
