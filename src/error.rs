//! Error types
//!
//! Only capacity exhaustion is fatal to a tick. Unknown ids and malformed
//! messages are recovered where they happen and never reach these types
//! outside of the decode path.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that abort a simulation tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SimError {
    /// A fixed-capacity store is full. The configured capacity is too small
    /// for the session and continuing would desynchronize peers.
    #[error("{store} capacity exhausted ({capacity} rows)")]
    CapacityExhausted {
        store: &'static str,
        capacity: usize,
    },

    /// An explicit id was already present in the store
    #[error("{store} id {id} already exists")]
    DuplicateId { store: &'static str, id: u32 },
}

/// Errors while encoding or decoding wire messages
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// Text was not a valid message object
    #[error("malformed message: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Errors reported by a transport
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The transport has no live connection
    #[error("transport is not connected")]
    Disconnected,
}

/// Errors while loading parameters
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid parameters JSON: {0}")]
    Parse(#[from] serde_json::Error),

    /// Parameter value outside its valid range
    #[error("invalid parameter {name}: {reason}")]
    Invalid {
        name: &'static str,
        reason: String,
    },
}
