//! Error types for the proxy
//!
//! Provides unified error handling using thiserror.

use thiserror::Error;

// == Proxy Error Enum ==
/// Unified error type for the proxy pipeline.
///
/// Every handled failure of a connection maps onto exactly one variant,
/// and each variant knows the HTTP status line it produces for the client.
#[derive(Error, Debug)]
pub enum ProxyError {
    /// Request line did not have the METHOD TARGET VERSION shape
    #[error("Malformed request line: {0}")]
    MalformedRequest(String),

    /// Method other than GET
    #[error("Method not implemented: {0}")]
    UnsupportedMethod(String),

    /// Target was not an absolute http:// URI
    #[error("Unsupported request target: {0}")]
    MalformedUri(String),

    /// DNS resolution failed or every candidate address refused
    #[error("Cannot reach origin server: {0}")]
    OriginConnect(String),

    /// Writing the request line to the origin failed
    #[error("Cannot write to origin server: {0}")]
    OriginWrite(String),

    /// Reading client headers or writing them to the origin failed
    #[error("Invalid request headers: {0}")]
    HeaderForward(String),

    /// The client went away before sending a complete request
    #[error("Client disconnected")]
    ClientGone,
}

impl ProxyError {
    // == Status Mapping ==
    /// HTTP status code and reason phrase for the error page.
    pub fn status(&self) -> (u16, &'static str) {
        match self {
            ProxyError::MalformedRequest(_) => (400, "Bad Request"),
            ProxyError::MalformedUri(_) => (400, "Bad Request"),
            ProxyError::HeaderForward(_) => (400, "Bad Request"),
            ProxyError::UnsupportedMethod(_) => (501, "Not Implemented"),
            ProxyError::OriginConnect(_) => (502, "Bad Gateway"),
            ProxyError::OriginWrite(_) => (502, "Bad Gateway"),
            ProxyError::ClientGone => (400, "Bad Request"),
        }
    }

    // == Response Policy ==
    /// Whether an error page should still be written to the client.
    ///
    /// A client that already disconnected cannot be answered.
    pub fn sends_response(&self) -> bool {
        !matches!(self, ProxyError::ClientGone)
    }
}

// == Result Type Alias ==
/// Convenience Result type for the proxy.
pub type Result<T> = std::result::Result<T, ProxyError>;
