//! Response Relay Module
//!
//! Streams the origin's response to the client unmodified, byte-for-byte,
//! capturing a copy for the cache while it stays within the object ceiling.

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tracing::debug;

/// Transfer chunk size.
pub const RELAY_CHUNK_BYTES: usize = 8 * 1024;

// == Relay Outcome ==
/// What happened while streaming one response.
#[derive(Debug)]
pub struct RelayOutcome {
    /// The complete response, when it was read to end-of-stream and never
    /// outgrew the capture limit; candidates for a cache insert.
    pub body: Option<Vec<u8>>,
    /// Bytes successfully read from the origin.
    pub bytes_relayed: usize,
    /// Whether the origin's response was consumed to end-of-stream.
    pub complete: bool,
}

// == Relay Response ==
/// Pumps bytes origin -> client until the origin closes.
///
/// Writes push every byte or fail; a client-side write failure truncates
/// the relay silently rather than failing the request, since response
/// headers are already on the wire at that point. An origin read error
/// likewise just stops the stream.
pub async fn relay_response<R, W>(origin: &mut R, client: &mut W, capture_limit: usize) -> RelayOutcome
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut chunk = [0u8; RELAY_CHUNK_BYTES];
    let mut captured: Option<Vec<u8>> = Some(Vec::new());
    let mut bytes_relayed = 0;
    let mut complete = false;

    loop {
        let n = match origin.read(&mut chunk).await {
            Ok(0) => {
                complete = true;
                break;
            }
            Ok(n) => n,
            Err(e) => {
                debug!(error = %e, "origin read failed mid-relay");
                break;
            }
        };
        bytes_relayed += n;

        if let Some(body) = captured.as_mut() {
            if body.len() + n > capture_limit {
                // Too large to cache; keep relaying without buffering
                captured = None;
            } else {
                body.extend_from_slice(&chunk[..n]);
            }
        }

        if let Err(e) = client.write_all(&chunk[..n]).await {
            debug!(error = %e, "client write failed, truncating relay");
            captured = None;
            break;
        }
    }

    RelayOutcome {
        body: if complete { captured } else { None },
        bytes_relayed,
        complete,
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncWriteExt;

    #[tokio::test]
    async fn test_relay_byte_identical() {
        let payload: Vec<u8> = (0..=255u8).cycle().take(20_000).collect();
        let mut origin = &payload[..];
        let mut client = Vec::new();

        let outcome = relay_response(&mut origin, &mut client, 100_000).await;

        assert_eq!(client, payload);
        assert_eq!(outcome.bytes_relayed, payload.len());
        assert!(outcome.complete);
        assert_eq!(outcome.body, Some(payload));
    }

    #[tokio::test]
    async fn test_relay_drops_capture_over_limit() {
        let payload = vec![b'x'; 5_000];
        let mut origin = &payload[..];
        let mut client = Vec::new();

        let outcome = relay_response(&mut origin, &mut client, 1_000).await;

        // The client still receives everything; only the capture is dropped
        assert_eq!(client, payload);
        assert!(outcome.complete);
        assert!(outcome.body.is_none());
    }

    #[tokio::test]
    async fn test_relay_truncates_on_client_disconnect() {
        let payload = vec![b'y'; 64 * 1024];
        let (mut origin_tx, mut origin_rx) = tokio::io::duplex(1024);
        let (mut client_tx, client_rx) = tokio::io::duplex(1024);

        // Client goes away immediately
        drop(client_rx);

        let writer = tokio::spawn(async move {
            let _ = origin_tx.write_all(&payload).await;
        });

        let outcome = relay_response(&mut origin_rx, &mut client_tx, 100_000).await;

        assert!(!outcome.complete);
        assert!(outcome.body.is_none());
        writer.abort();
    }
}
