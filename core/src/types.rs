//! Data shapes exchanged with the Horde AJAX endpoint.
//!
//! # Design
//! `ResponseMessage` mirrors one entry of the server's `msgs` list. The
//! outcome of a call is a `ResponseBody`: the server conflates transport
//! success with application failure inside a single HTTP 200, so the decoded
//! envelope, not the status line, decides which variant the caller gets.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{ResponseError, ServerError, UnknownServerError};
use crate::http::{HttpMethod, Headers};
use crate::params::{QueryParams, QUERY_SEPARATOR};

/// One diagnostic reported by the server.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ResponseMessage {
    pub message: String,
    #[serde(rename = "type")]
    pub kind: String,
}

impl ResponseMessage {
    pub fn new(message: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind: kind.into(),
        }
    }
}

/// Server messages in emission order.
pub type ResponseMessages = Vec<ResponseMessage>;

/// Body data attached to an outgoing request.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestData {
    /// A plain structured object. Sent as a URL-encoded form; nested objects
    /// and arrays are rendered as JSON text first.
    Fields(Map<String, Value>),
    /// Pre-encoded text, sent as is.
    Text(String),
    /// Opaque bytes (blob, buffer or stream contents), sent as is.
    Binary(Vec<u8>),
}

impl From<Map<String, Value>> for RequestData {
    fn from(fields: Map<String, Value>) -> Self {
        RequestData::Fields(fields)
    }
}

/// A call against the AJAX endpoint, before URL resolution and
/// authentication.
#[derive(Debug, Clone, PartialEq)]
pub struct AjaxRequest {
    pub method: HttpMethod,
    /// Absolute URL, or `./`-relative to the client's base URL.
    pub url: String,
    pub separator: char,
    pub params: QueryParams,
    pub data: Option<RequestData>,
    pub headers: Headers,
}

impl AjaxRequest {
    pub fn new(method: HttpMethod, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            separator: QUERY_SEPARATOR,
            params: Vec::new(),
            data: None,
            headers: Vec::new(),
        }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, url)
    }

    pub fn post(url: impl Into<String>) -> Self {
        Self::new(HttpMethod::Post, url)
    }

    pub fn separator(mut self, separator: char) -> Self {
        self.separator = separator;
        self
    }

    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.push((key.into(), value.into()));
        self
    }

    pub fn data(mut self, data: impl Into<RequestData>) -> Self {
        self.data = Some(data.into());
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

/// Interpreted result of a call.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    /// The envelope's `response` object, `success` flag included.
    Success(Map<String, Value>),
    /// The server reported an error through its `msgs` list.
    Failure(ServerError),
    /// The envelope matched no known shape.
    Unknown(UnknownServerError),
}

impl ResponseBody {
    pub fn is_success(&self) -> bool {
        matches!(self, ResponseBody::Success(_))
    }

    pub fn into_result(self) -> Result<Map<String, Value>, ResponseError> {
        match self {
            ResponseBody::Success(data) => Ok(data),
            ResponseBody::Failure(err) => Err(err.into()),
            ResponseBody::Unknown(err) => Err(err.into()),
        }
    }
}

/// Response handed back by [`crate::HordeClient::request`]. The raw body
/// text has been consumed; only the interpreted body remains.
#[derive(Debug, Clone, PartialEq)]
pub struct HordeResponse {
    pub status: u16,
    pub headers: Headers,
    pub body: ResponseBody,
}
