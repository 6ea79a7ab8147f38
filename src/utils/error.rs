//! The `error` module defines the error types used within `formrelay`.
//!
//! Each stage of the pipeline has its own enum so callers can decide
//! explicitly which failures are fatal and which are logged and dropped.

use std::io;

use thiserror::Error;

/// Failures talking to a concrete store backend.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("mongodb: {0}")]
    Mongo(#[from] mongodb::error::Error),

    #[error("sled: {0}")]
    Sled(#[from] sled::Error),

    #[error("serialization: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("unsupported datastore uri '{0}' (expected mongodb://, mongodb+srv:// or sled://)")]
    UnsupportedUri(String),
}

/// Raised by the connector once its retry budget is spent.
#[derive(Debug, Error)]
pub enum ConnectError {
    #[error("cannot connect to datastore after {attempts} attempts: {last_error}")]
    Exhausted { attempts: u32, last_error: StoreError },
}

/// Outcome of a failed `MessageWriter::save`. Never surfaced to relay clients.
#[derive(Debug, Error)]
pub enum WriteError {
    #[error(transparent)]
    Connect(#[from] ConnectError),

    #[error("insert failed: {0}")]
    Insert(#[from] StoreError),
}

/// Reasons a relay payload cannot be turned into a message record.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PayloadError {
    #[error("payload is not valid utf-8")]
    NotUtf8,

    #[error("pair '{0}' has no '=' delimiter")]
    MissingDelimiter(String),

    #[error("required field '{0}' is missing")]
    MissingField(&'static str),
}

/// Failures of the relay listener itself (not of a single connection).
#[derive(Debug, Error)]
pub enum RelayError {
    #[error("cannot bind relay on {addr}: {source}")]
    Bind { addr: String, source: io::Error },
}

/// Failures forwarding a submission from the ingress to the relay.
#[derive(Debug, Error)]
pub enum ForwardError {
    #[error("connect to relay at {addr} timed out")]
    Timeout { addr: String },

    #[error("relay at {addr} unreachable: {source}")]
    Connect { addr: String, source: io::Error },

    #[error("sending to relay failed: {0}")]
    Send(#[from] io::Error),
}

/// Startup failures of the `formrelay` services.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("configuration: {0}")]
    Config(#[from] config::ConfigError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Connect(#[from] ConnectError),

    #[error(transparent)]
    Relay(#[from] RelayError),

    #[error("io: {0}")]
    Io(#[from] io::Error),

    #[error("{0} exited unexpectedly")]
    ServiceExited(&'static str),
}
