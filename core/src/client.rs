//! Request shaping and response interpretation for the Horde AJAX endpoint.
//!
//! # Design
//! `HordeClient` holds only immutable configuration and carries no state
//! between calls. `build_request` turns an `AjaxRequest` into a plain
//! `HttpRequest` (URL anchored at the base URL, token appended, form body
//! encoded, default headers filled in); `parse_response` turns the host's
//! `HttpResponse` into a `HordeResponse`. `request` chains the two around a
//! `Transport` for hosts that want the client to drive the round trip.

use std::time::Duration;

use tracing::debug;

use crate::config::{ClientConfig, ConfigProvider, DEFAULT_TIMEOUT};
use crate::envelope::WrapperFormat;
use crate::error::{ApiError, RequestError};
use crate::http::{set_header_if_absent, HttpRequest, HttpResponse};
use crate::params::{append_token, build_query_string, encode_form_fields};
use crate::transport::Transport;
use crate::types::{AjaxRequest, HordeResponse, RequestData, ResponseBody};

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Client for one Horde installation's AJAX endpoint.
#[derive(Debug, Clone)]
pub struct HordeClient {
    base_url: String,
    token: String,
    timeout: Duration,
    wrapper: WrapperFormat,
    charset: Option<String>,
}

impl HordeClient {
    /// Standalone client with explicit base URL and token.
    ///
    /// The values are taken as given; an empty base URL is not rejected.
    /// Use [`HordeClient::from_config`] to have them validated.
    pub fn new(base_url: &str, token: &str) -> Self {
        Self {
            base_url: base_url.to_string(),
            token: token.to_string(),
            timeout: DEFAULT_TIMEOUT,
            wrapper: WrapperFormat::default(),
            charset: None,
        }
    }

    /// Build a client, taking omitted values from the host configuration.
    pub fn from_config(
        config: ClientConfig,
        provider: Option<&dyn ConfigProvider>,
    ) -> Result<Self, ApiError> {
        let resolved = config.resolve(provider)?;
        Ok(Self {
            base_url: resolved.base_url,
            token: resolved.token,
            timeout: resolved.timeout,
            wrapper: WrapperFormat::default(),
            charset: None,
        })
    }

    pub fn with_wrapper(mut self, wrapper: WrapperFormat) -> Self {
        self.wrapper = wrapper;
        self
    }

    /// Document character set advertised in form content types.
    pub fn with_charset(mut self, charset: impl Into<String>) -> Self {
        self.charset = Some(charset.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn wrapper(&self) -> WrapperFormat {
        self.wrapper
    }

    /// Anchor a `./`-relative URL at the base URL. Other URLs are returned
    /// unchanged.
    pub fn resolve_url(&self, url: &str) -> String {
        match url.strip_prefix("./") {
            Some(rest) if self.base_url.ends_with('/') => format!("{}{rest}", self.base_url),
            Some(rest) => format!("{}/{rest}", self.base_url),
            None => url.to_string(),
        }
    }

    /// Append this client's token to a query string.
    pub fn authenticate_params(&self, params: &str) -> String {
        append_token(params, &self.token)
    }

    pub fn build_request(&self, request: &AjaxRequest) -> Result<HttpRequest, ApiError> {
        let url = self.resolve_url(&request.url);
        let query = build_query_string(&request.params, request.separator);
        let mut query = self.authenticate_params(&query);
        if url.contains('?') && query.starts_with('?') {
            query.replace_range(..1, "&");
        }

        let mut headers = request.headers.clone();
        let body = match &request.data {
            None => None,
            Some(RequestData::Fields(fields)) => {
                set_header_if_absent(&mut headers, "accept", "application/json");
                let content_type = match &self.charset {
                    Some(charset) => format!("{FORM_CONTENT_TYPE}; charset={charset}"),
                    None => FORM_CONTENT_TYPE.to_string(),
                };
                set_header_if_absent(&mut headers, "content-type", content_type);
                Some(encode_form_fields(fields)?.into_bytes())
            }
            Some(RequestData::Text(text)) => Some(text.clone().into_bytes()),
            Some(RequestData::Binary(bytes)) => Some(bytes.clone()),
        };

        debug!(method = request.method.as_str(), url = %url, "built horde request");
        Ok(HttpRequest {
            method: request.method,
            url: format!("{url}{query}"),
            headers,
            body,
            timeout: self.timeout,
        })
    }

    /// Interpret a response from the AJAX endpoint.
    ///
    /// Non-2xx statuses are returned as [`ApiError::Http`] untouched. For 2xx
    /// the body is unwrapped and classified; server-side failures end up in
    /// [`HordeResponse::body`], not in `Err`.
    pub fn parse_response(&self, response: HttpResponse) -> Result<HordeResponse, ApiError> {
        if !response.is_success() {
            return Err(ApiError::Http {
                status: response.status,
                body: response.body,
            });
        }

        let envelope = self.wrapper.decode(&response.body)?;
        let body = ResponseBody::from_envelope(envelope);
        debug!(status = response.status, success = body.is_success(), "parsed horde response");
        Ok(HordeResponse {
            status: response.status,
            headers: response.headers,
            body,
        })
    }

    /// Build `request`, execute it through `transport` and parse the result.
    pub async fn request<T>(
        &self,
        transport: &T,
        request: &AjaxRequest,
    ) -> Result<HordeResponse, RequestError<T::Error>>
    where
        T: Transport + ?Sized,
    {
        let http_request = self.build_request(request)?;
        let response = transport
            .execute(http_request)
            .await
            .map_err(RequestError::Transport)?;
        Ok(self.parse_response(response)?)
    }
}
