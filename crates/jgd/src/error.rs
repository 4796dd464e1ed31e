//
// error.rs
//
// Copyright (C) 2024 jgd contributors
//
//

use thiserror::Error;

/// The error kinds a session can encounter, per the design's error model:
/// none of these ever abort the host process, they only change what the
/// caller logs and whether the transport latches to disconnected.
#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to connect to '{address}': {source}")]
    Connect {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error("no renderer address was given and none could be discovered")]
    NoAddress,

    #[error("transport I/O failed: {0}")]
    Transport(#[source] std::io::Error),

    #[error("malformed address '{0}'")]
    BadAddress(String),

    #[error("malformed message: {0}")]
    BadMessage(String),

    #[error("metrics request timed out waiting for a response")]
    MetricsTimeout,

    #[error("{0}")]
    State(String),
}

pub type Result<T> = std::result::Result<T, Error>;
