//! Mini Proxy - a concurrent caching HTTP forward proxy
//!
//! Relays GET requests to origin servers, rewrites the connection-control
//! headers, and serves repeat requests from a bounded in-memory LRU cache.

use std::env;
use std::net::SocketAddr;
use std::process;

use tokio::net::TcpListener;
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use mini_proxy::proxy::server;
use mini_proxy::{Config, ProxyState};

/// Main entry point for the proxy.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Parse the listening port and cache limits
/// 3. Create the shared object cache
/// 4. Bind the listening socket (exit 1 on failure)
/// 5. Run the accept loop until SIGINT/SIGTERM
///
/// Note: the Rust runtime ignores SIGPIPE before main on Unix, so writing
/// to a peer that already closed surfaces as a BrokenPipe write error
/// inside a worker instead of killing the process.
#[tokio::main]
async fn main() {
    // Initialize tracing subscriber with env filter
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mini_proxy=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_args(env::args()).unwrap_or_else(|usage| {
        eprintln!("{}", usage);
        process::exit(1);
    });
    info!(
        "Configuration loaded: port={}, max_cache_bytes={}, max_object_bytes={}",
        config.listen_port, config.max_cache_bytes, config.max_object_bytes
    );

    let state = ProxyState::from_config(&config);
    info!("Object cache initialized");

    let addr = SocketAddr::from(([0, 0, 0, 0], config.listen_port));
    let listener = match TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            eprintln!("Error: cannot listen on port {}: {}", config.listen_port, e);
            process::exit(1);
        }
    };
    info!("Proxy listening on {}", addr);

    tokio::select! {
        _ = server::run(listener, state) => {}
        _ = shutdown_signal() => {}
    }

    info!("Proxy shutdown complete");
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }
}
