//! Error types used across `gps_transport`.
//!
//! Errors are grouped by when they can happen:
//! - `ConfigurationError`: while building a connection. Fatal, never retried.
//! - `ServiceError`: reported by a pub/sub client for a single call.
//! - `TransportError`: a failed publish/pull/ack/deadline call (or an
//!   outbound encoding failure). Retry policy belongs to the caller.
//! - `DecodingError`: a pulled message could not be turned into an envelope.
//! - `LogicError`: the caller broke an invariant (programming error).
//!
//! `Error` is what the sender, receiver and transport facade return.

use thiserror::Error;

/// Cause reported by a codec.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("the given GPS DSN \"{dsn}\" is invalid: {source}")]
    InvalidDsn {
        dsn: String,
        #[source]
        source: url::ParseError,
    },

    #[error("the GPS key is not valid base64: {0}")]
    InvalidKeyEncoding(#[from] base64::DecodeError),

    #[error("the GPS key is not valid UTF-8: {0}")]
    InvalidKeyText(#[from] std::string::FromUtf8Error),

    #[error("error when decoding Google Pub/Sub key: {0}")]
    InvalidCredentials(#[source] serde_json::Error),

    #[error("the Google Pub/Sub key is incomplete: {0}")]
    IncompleteCredentials(String),

    #[error("error when creating Google Pub/Sub client: {0}")]
    Client(#[source] ServiceError),

    #[error("failed to load transport options: {0}")]
    Options(#[from] config::ConfigError),
}

/// Failure reported by a pub/sub client for one call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    #[error("{resource} not found: {name}")]
    NotFound { resource: &'static str, name: String },

    #[error("{resource} already exists: {name}")]
    AlreadyExists { resource: &'static str, name: String },

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("unauthenticated: {0}")]
    Unauthenticated(String),

    #[error("service unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("publish failed: {0}")]
    Publish(#[source] ServiceError),

    #[error("publish returned no message id")]
    MissingMessageId,

    #[error("pull failed: {0}")]
    Pull(#[source] ServiceError),

    #[error("acknowledge failed: {0}")]
    Acknowledge(#[source] ServiceError),

    #[error("modify ack deadline failed: {0}")]
    ModifyAckDeadline(#[source] ServiceError),

    #[error("failed to encode envelope: {0}")]
    Encoding(#[source] BoxError),
}

#[derive(Debug, Error)]
pub enum DecodingError {
    #[error("message body is not valid: {0}")]
    Body(#[source] BoxError),

    #[error("header \"{name}\" has an invalid value \"{value}\"")]
    InvalidHeader { name: String, value: String },
}

#[derive(Debug, Error)]
pub enum LogicError {
    #[error("no received-message stamp found on the envelope")]
    MissingReceivedStamp,
}

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Decoding(#[from] DecodingError),

    #[error(transparent)]
    Logic(#[from] LogicError),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
