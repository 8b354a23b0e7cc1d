//! Error types for the Horde AJAX client.
//!
//! # Design
//! Two families of failure live here and they are deliberately kept apart.
//! `ApiError` covers everything the adapter itself can get wrong: missing
//! configuration, a body that does not fit the wrapper, undecodable JSON, or a
//! transport-level status the adapter refuses to reinterpret. `ServerError`
//! and `UnknownServerError` are *values*: the server answered with HTTP 200 but
//! reported an application failure inside the envelope. Those travel in
//! `ResponseBody`, not in `Err`.

use std::fmt;

use thiserror::Error;

use crate::types::{ResponseMessage, ResponseMessages};

/// Text carried by [`UnknownServerError`].
pub const UNKNOWN_SERVER_ERROR: &str = "Unknown server-side error occurred";

/// Errors raised by the adapter while building requests or decoding responses.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Base URL or token was omitted and no host configuration was available.
    #[error("invalid initialization without required global context")]
    MissingHostContext,

    /// Configuration was resolved but is unusable.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// The body is too short to hold the configured wrapper.
    #[error(
        "response of {len} characters cannot hold a {prefix_len}+{suffix_len} character wrapper"
    )]
    MalformedEnvelope {
        len: usize,
        prefix_len: usize,
        suffix_len: usize,
    },

    /// The unwrapped body is not valid JSON.
    #[error("deserialization failed: {0}")]
    Deserialization(#[from] serde_json::Error),

    /// A request field could not be rendered as JSON text.
    #[error("serialization failed: {0}")]
    Serialization(#[source] serde_json::Error),

    /// The transport returned a non-2xx status; the body is left untouched.
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },
}

/// Failure of a full round trip driven through a [`crate::Transport`].
#[derive(Debug, Error)]
pub enum RequestError<E> {
    /// The transport failed; its error is passed through unchanged.
    #[error("transport failed: {0}")]
    Transport(E),

    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Application-level error reported by the server in its `msgs` list.
///
/// Carries the first message as the primary text and its `type` as the
/// classification; any further messages are kept, in server order, as
/// secondary messages.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ServerError {
    message: Option<String>,
    kind: Option<String>,
    additional_messages: ResponseMessages,
}

impl ServerError {
    pub fn new(
        message: Option<String>,
        kind: Option<String>,
        additional_messages: ResponseMessages,
    ) -> Self {
        Self {
            message,
            kind,
            additional_messages,
        }
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// Horde's error classification, e.g. `horde.error`.
    pub fn kind(&self) -> Option<&str> {
        self.kind.as_deref()
    }

    pub fn additional_messages(&self) -> &[ResponseMessage] {
        &self.additional_messages
    }
}

impl fmt::Display for ServerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.message, &self.kind) {
            (Some(message), Some(kind)) => write!(f, "{message} ({kind})"),
            (Some(message), None) => write!(f, "{message}"),
            (None, Some(kind)) => write!(f, "server reported an error ({kind})"),
            (None, None) => write!(f, "server reported an error"),
        }
    }
}

impl std::error::Error for ServerError {}

/// The envelope matched neither the success nor the known-failure shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Error)]
#[error("{}", UNKNOWN_SERVER_ERROR)]
pub struct UnknownServerError;

/// Failure side of [`crate::ResponseBody::into_result`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResponseError {
    #[error(transparent)]
    Server(#[from] ServerError),

    #[error(transparent)]
    Unknown(#[from] UnknownServerError),
}
