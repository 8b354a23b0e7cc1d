//! Client adapter for Horde's AJAX endpoint.
//!
//! # Overview
//! Horde answers AJAX calls with a JSON envelope framed as `/*-secure-...*/`
//! and reports application failures inside an HTTP 200. This crate shapes
//! requests the way the endpoint expects (relative URLs anchored at the AJAX
//! base URL, session token in the query string, form-encoded bodies with
//! nested values as JSON text) and turns responses into a `ResponseBody`
//! that is either the success payload, a typed `ServerError`, or an
//! `UnknownServerError`.
//!
//! # Design
//! - Host-does-IO: `HordeClient::build_request` produces a plain
//!   `HttpRequest`, `HordeClient::parse_response` consumes a plain
//!   `HttpResponse`. `HordeClient::request` drives both through a
//!   host-supplied `Transport`.
//! - `HordeClient` holds only immutable configuration; omitted base URL or
//!   token are read from an injected `ConfigProvider`.
//! - Server-side failures are values in `ResponseBody`; `ApiError` is
//!   reserved for configuration, decoding and transport-status problems.

pub mod client;
pub mod config;
pub mod envelope;
pub mod error;
pub mod http;
pub mod params;
pub mod transport;
pub mod types;

pub use client::HordeClient;
pub use config::{ClientConfig, ConfigProvider, HostConfig};
pub use envelope::WrapperFormat;
pub use error::{ApiError, RequestError, ResponseError, ServerError, UnknownServerError};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use transport::Transport;
pub use types::{
    AjaxRequest, HordeResponse, RequestData, ResponseBody, ResponseMessage, ResponseMessages,
};
