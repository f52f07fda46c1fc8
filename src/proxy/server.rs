//! Connection Dispatcher Module
//!
//! Accept loop and per-connection worker. Every accepted connection gets a
//! detached worker task; the dispatcher never waits on one, so a slow
//! client or origin cannot stall the accept loop.

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use tokio::io::{AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, error, info, warn};

use crate::cache::ObjectCache;
use crate::config::Config;
use crate::error::{ProxyError, Result};
use crate::proxy::reader::LineReader;
use crate::proxy::response::send_error;
use crate::proxy::{headers, origin, relay, request};

// == Proxy State ==
/// State shared by all connection workers.
///
/// The object cache is the only cross-connection state; everything else a
/// worker touches lives for exactly one request-response cycle.
#[derive(Debug, Clone)]
pub struct ProxyState {
    /// Thread-safe object cache
    pub cache: Arc<ObjectCache>,
}

impl ProxyState {
    /// Creates a new ProxyState owning the given cache.
    pub fn new(cache: ObjectCache) -> Self {
        Self {
            cache: Arc::new(cache),
        }
    }

    /// Creates a new ProxyState from configuration.
    pub fn from_config(config: &Config) -> Self {
        Self::new(ObjectCache::new(
            config.max_cache_bytes,
            config.max_object_bytes,
        ))
    }
}

// == Accept Loop ==
/// Accepts connections forever, one detached worker per connection.
///
/// Interrupted accepts are retried; any other accept error is logged and
/// the loop keeps going. Nothing short of the listener disappearing ends
/// the loop, and workers are never joined.
pub async fn run(listener: TcpListener, state: ProxyState) {
    loop {
        match listener.accept().await {
            Ok((stream, peer)) => {
                debug!(%peer, "accepted connection");
                let state = state.clone();
                tokio::spawn(async move {
                    handle_client(stream, peer, state).await;
                });
            }
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => {
                error!(error = %e, "accept failed");
            }
        }
    }
}

// == Worker ==
/// Runs one request-response cycle and answers handled failures with an
/// error page. Both sockets close when the worker returns, on every path.
async fn handle_client(mut stream: TcpStream, peer: SocketAddr, state: ProxyState) {
    if let Err(err) = serve_request(&mut stream, peer, &state).await {
        warn!(%peer, error = %err, "request failed");
        if err.sends_response() {
            send_error(&mut stream, &err).await;
        }
    }
}

/// The per-request pipeline: request line, method gate, URI, cache lookup,
/// origin connect, header rewrite, relay, cache insert.
async fn serve_request(stream: &mut TcpStream, peer: SocketAddr, state: &ProxyState) -> Result<()> {
    let (read_half, mut write_half) = stream.split();
    let mut reader = LineReader::new(BufReader::new(read_half));

    let raw_line = match reader.read_line().await {
        Ok(Some(line)) => line,
        // Closed before sending anything; not worth an error page
        Ok(None) => return Ok(()),
        Err(e) if e.kind() == io::ErrorKind::InvalidData => {
            return Err(ProxyError::MalformedRequest(
                "request line too long".to_string(),
            ));
        }
        Err(_) => return Err(ProxyError::ClientGone),
    };

    let line = String::from_utf8_lossy(&raw_line);
    let req = request::parse_request_line(&line)?;

    if !req.method.eq_ignore_ascii_case("GET") {
        return Err(ProxyError::UnsupportedMethod(req.method));
    }

    let target = request::parse_uri(&req.target)?;
    info!(%peer, target = %req.target, "proxying GET");

    let key = target.cache_key();
    if let Some(bytes) = state.cache.get(&key).await {
        debug!(key = %key, size = bytes.len(), "serving from cache");
        // A vanished client just truncates the reply, as in a live relay
        let _ = write_half.write_all(&bytes).await;
        return Ok(());
    }

    let mut origin_stream = origin::connect(&target.host, target.port).await?;

    // Always downgrade to single-shot HTTP/1.0 toward the origin
    let outbound_line = format!("GET {} HTTP/1.0\r\n", target.path);
    origin_stream
        .write_all(outbound_line.as_bytes())
        .await
        .map_err(|e| ProxyError::OriginWrite(e.to_string()))?;

    headers::forward_request_headers(&mut reader, &mut origin_stream, &target).await?;

    let outcome = relay::relay_response(
        &mut origin_stream,
        &mut write_half,
        state.cache.max_object_bytes(),
    )
    .await;
    debug!(
        bytes = outcome.bytes_relayed,
        complete = outcome.complete,
        "relay finished"
    );

    if let Some(body) = outcome.body {
        state.cache.put(&key, body).await;
    }

    Ok(())
}
