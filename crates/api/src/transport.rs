//! Transport abstraction between services and the HTTP client.

use async_trait::async_trait;
use reqwest::{Method, StatusCode};
use url::Url;

use crate::error::TransportError;

/// A file part sent as `multipart/form-data`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultipartFile {
    /// Form field name the server reads the file from.
    pub field: String,
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RequestBody {
    #[default]
    Empty,
    /// `application/x-www-form-urlencoded` fields.
    Form(Vec<(String, String)>),
    Multipart(MultipartFile),
}

/// A fully resolved outbound request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminRequest {
    pub method: Method,
    pub url: Url,
    pub body: RequestBody,
}

impl AdminRequest {
    pub fn get(url: Url) -> Self {
        Self {
            method: Method::GET,
            url,
            body: RequestBody::Empty,
        }
    }

    pub fn post(url: Url, body: RequestBody) -> Self {
        Self {
            method: Method::POST,
            url,
            body,
        }
    }

    pub fn delete(url: Url) -> Self {
        Self {
            method: Method::DELETE,
            url,
            body: RequestBody::Empty,
        }
    }
}

/// Raw response: status, declared content type and body bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminResponse {
    pub status: StatusCode,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

impl AdminResponse {
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }
}

/// Sends admin requests. Implemented by [`crate::DaClient`] over HTTP.
///
/// Implementations return `Ok` for every response that carries a status
/// code, including non-2xx ones; `Err` is reserved for exchanges that never
/// produced a response.
#[async_trait]
pub trait AdminTransport: Send + Sync {
    async fn execute(&self, request: AdminRequest) -> Result<AdminResponse, TransportError>;
}
