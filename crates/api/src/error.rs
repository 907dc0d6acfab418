//! Error types for admin API calls.
//!
//! Transport failures carry a [`TransportErrorKind`] derived from the
//! structure of the underlying `reqwest` error (its predicates and the
//! `std::io::ErrorKind` found in its source chain). Retry decisions are made
//! on that kind, never on message text.

use std::error::Error as StdError;
use std::fmt;
use std::io;

use da_util::PathError;
use da_util::http::{status_error_message, truncate_response_preview};
use thiserror::Error;

use crate::retry::Transient;
use crate::transport::AdminResponse;

/// Classification of a failed HTTP exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransportErrorKind {
    /// The request or connection timed out.
    Timeout,
    /// TLS negotiation failed.
    Tls,
    /// The peer reset or aborted an established connection.
    ConnectionReset,
    /// The connection could not be established (refused, unreachable, DNS).
    Connect,
    /// Any other failure while sending the request or reading the response.
    Network,
    /// The response body could not be decoded.
    Decode,
    /// Request construction failures and anything unclassified.
    Other,
}

impl TransportErrorKind {
    /// Whether a retry has a reasonable chance of succeeding.
    pub fn is_transient(self) -> bool {
        matches!(
            self,
            TransportErrorKind::Timeout
                | TransportErrorKind::Tls
                | TransportErrorKind::ConnectionReset
                | TransportErrorKind::Connect
                | TransportErrorKind::Network
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TransportErrorKind::Timeout => "timeout",
            TransportErrorKind::Tls => "tls",
            TransportErrorKind::ConnectionReset => "connection_reset",
            TransportErrorKind::Connect => "connect",
            TransportErrorKind::Network => "network",
            TransportErrorKind::Decode => "decode",
            TransportErrorKind::Other => "other",
        }
    }

    /// Classify a `reqwest` error.
    ///
    /// The deepest `io::Error` in the source chain wins when present since it
    /// is the most specific signal; otherwise the reqwest predicates decide.
    pub fn from_reqwest(error: &reqwest::Error) -> Self {
        if error.is_timeout() {
            return TransportErrorKind::Timeout;
        }
        if let Some(kind) = innermost_io_error_kind(error) {
            match kind {
                io::ErrorKind::TimedOut => return TransportErrorKind::Timeout,
                io::ErrorKind::ConnectionReset
                | io::ErrorKind::ConnectionAborted
                | io::ErrorKind::BrokenPipe
                | io::ErrorKind::UnexpectedEof => return TransportErrorKind::ConnectionReset,
                io::ErrorKind::ConnectionRefused | io::ErrorKind::NotConnected | io::ErrorKind::AddrNotAvailable => {
                    return TransportErrorKind::Connect;
                }
                // rustls reports handshake failures as InvalidData through the connector.
                io::ErrorKind::InvalidData if error.is_connect() => return TransportErrorKind::Tls,
                _ => {}
            }
        }
        if error.is_connect() {
            TransportErrorKind::Connect
        } else if error.is_decode() {
            TransportErrorKind::Decode
        } else if error.is_request() || error.is_body() {
            TransportErrorKind::Network
        } else {
            TransportErrorKind::Other
        }
    }
}

impl fmt::Display for TransportErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn innermost_io_error_kind(error: &(dyn StdError + 'static)) -> Option<io::ErrorKind> {
    let mut found = None;
    let mut current = error.source();
    while let Some(source) = current {
        if let Some(io_error) = source.downcast_ref::<io::Error>() {
            found = Some(io_error.kind());
        }
        current = source.source();
    }
    found
}

/// A failed HTTP exchange, before any status code was received.
#[derive(Debug, Error)]
#[error("{kind} error: {message}")]
pub struct TransportError {
    kind: TransportErrorKind,
    message: String,
    #[source]
    source: Option<Box<dyn StdError + Send + Sync>>,
}

impl TransportError {
    pub fn new(kind: TransportErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    pub fn kind(&self) -> TransportErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(error: reqwest::Error) -> Self {
        let kind = TransportErrorKind::from_reqwest(&error);
        let message = da_util::redact_sensitive(&error.to_string());
        Self {
            kind,
            message,
            source: Some(Box::new(error)),
        }
    }
}

impl Transient for TransportError {
    fn is_transient(&self) -> bool {
        self.kind.is_transient()
    }
}

/// Errors surfaced by admin API operations.
#[derive(Debug, Error)]
pub enum DaError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("{operation} failed with HTTP {status}: {detail}")]
    Status { operation: String, status: u16, detail: String },

    #[error(transparent)]
    Path(#[from] PathError),

    #[error("could not build endpoint URL from '{base}': {reason}")]
    Url { base: String, reason: String },
}

impl DaError {
    /// Convert a non-2xx response into an error carrying its status code.
    pub fn from_status(operation: &str, response: &AdminResponse) -> Self {
        let status = response.status.as_u16();
        let body_preview = truncate_response_preview(&String::from_utf8_lossy(&response.body), 200);
        let detail = match status_error_message(status) {
            Some(hint) => format!("{hint}. body: {body_preview}"),
            None => body_preview,
        };
        DaError::Status {
            operation: operation.to_string(),
            status,
            detail,
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            DaError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn transport_kind(&self) -> Option<TransportErrorKind> {
        match self {
            DaError::Transport(error) => Some(error.kind()),
            _ => None,
        }
    }
}

impl Transient for DaError {
    fn is_transient(&self) -> bool {
        match self {
            DaError::Transport(error) => error.is_transient(),
            _ => false,
        }
    }
}
