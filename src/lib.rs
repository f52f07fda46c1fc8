//! Mini Proxy - a concurrent caching HTTP forward proxy
//!
//! Relays GET requests to origin servers, rewrites the connection-control
//! headers, and serves repeat requests from a bounded in-memory LRU cache.

pub mod cache;
pub mod config;
pub mod error;
pub mod proxy;

pub use cache::ObjectCache;
pub use config::Config;
pub use error::{ProxyError, Result};
pub use proxy::ProxyState;
