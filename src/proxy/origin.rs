//! Origin Connector Module
//!
//! Resolves an origin server and establishes the outbound connection.

use tokio::net::{lookup_host, TcpStream};
use tracing::debug;

use crate::error::{ProxyError, Result};

// == Connect ==
/// Connects to `host:port`, trying every resolved address in order.
///
/// Resolution covers both address families; the first address that accepts
/// the connection wins. Fails only when resolution itself fails or every
/// candidate is refused or unreachable.
pub async fn connect(host: &str, port: u16) -> Result<TcpStream> {
    let addrs = lookup_host((host, port))
        .await
        .map_err(|e| ProxyError::OriginConnect(format!("{}:{}: {}", host, port, e)))?;

    let mut last_error = None;
    for addr in addrs {
        match TcpStream::connect(addr).await {
            Ok(stream) => {
                debug!(%addr, "connected to origin");
                return Ok(stream);
            }
            Err(e) => {
                debug!(%addr, error = %e, "origin candidate failed");
                last_error = Some(e);
            }
        }
    }

    Err(ProxyError::OriginConnect(match last_error {
        Some(e) => format!("{}:{}: {}", host, port, e),
        None => format!("{}:{}: no addresses resolved", host, port),
    }))
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;

    #[tokio::test]
    async fn test_connect_to_listening_socket() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        let stream = connect("127.0.0.1", port).await.unwrap();
        assert!(stream.peer_addr().is_ok());
    }

    #[tokio::test]
    async fn test_connect_refused() {
        // Bind then drop to find a port nothing listens on
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let result = connect("127.0.0.1", port).await;
        assert!(matches!(result, Err(ProxyError::OriginConnect(_))));
    }

    #[tokio::test]
    async fn test_connect_resolution_failure() {
        let result = connect("nonexistent.invalid", 80).await;
        assert!(matches!(result, Err(ProxyError::OriginConnect(_))));
    }
}
