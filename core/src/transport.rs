//! The seam where the host plugs in its HTTP client.
//!
//! The core never opens a socket. A host that wants the client to drive the
//! full round trip implements `Transport`; a host that prefers to keep control
//! calls `HordeClient::build_request` and `HordeClient::parse_response`
//! around its own I/O instead.

use async_trait::async_trait;

use crate::http::{HttpRequest, HttpResponse};

#[async_trait]
pub trait Transport: Send + Sync {
    type Error: Send;

    /// Execute `request` and return the response with its body read as text.
    ///
    /// Non-2xx statuses must be returned as responses, not errors; the client
    /// reports them as [`crate::ApiError::Http`].
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, Self::Error>;
}
