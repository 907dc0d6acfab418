//! DA admin API client utilities.
//!
//! This crate provides everything needed to talk to the content admin API
//! (`admin.da.live`) and the preview/publish pipeline (`admin.hlx.page`):
//!
//! - [`DaConfig`]: explicit configuration (token, base URLs, timeouts)
//! - [`Endpoints`]: URL construction for every route
//! - [`AdminTransport`]: the seam services call through, implemented by
//!   [`DaClient`] over `reqwest`
//! - [`retry_with_backoff`]: exponential backoff gated on [`Transient`]
//!   error classification
//!
//! # Example
//!
//! ```ignore
//! use da_api::{AdminRequest, DaClient, DaConfig, Endpoints, RetryPolicy, fetch_body};
//! use da_types::ResourceLocation;
//!
//! let config = DaConfig::from_env()?;
//! let client = DaClient::new(&config)?;
//! let endpoints = Endpoints::new(&config);
//! let location = ResourceLocation::new("acme", "site", "index.html");
//! let body = fetch_body(&client, "get source", RetryPolicy::default(), AdminRequest::get(endpoints.source(&location)?)).await?;
//! ```

mod client;
mod config;
mod endpoints;
mod error;
mod executor;
mod retry;
mod transport;

pub use client::DaClient;
pub use config::{ConfigError, DaConfig, validate_base_url};
pub use endpoints::Endpoints;
pub use error::{DaError, TransportError, TransportErrorKind};
pub use executor::{fetch_body, send_checked};
pub use retry::{RetryPolicy, Transient, retry_with_backoff};
pub use transport::{AdminRequest, AdminResponse, AdminTransport, MultipartFile, RequestBody};
