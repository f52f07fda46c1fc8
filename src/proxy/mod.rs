//! Proxy Module
//!
//! The per-connection request pipeline: read and parse the request line,
//! rewrite headers toward the origin, and relay the response back.
//!
//! # Flow
//! 1. `server` accepts a connection and spawns a detached worker
//! 2. `reader` yields protocol lines from the client
//! 3. `request` parses the request line and absolute URI
//! 4. the cache answers repeat requests directly
//! 5. `origin` connects to the end server
//! 6. `headers` forwards the rewritten header block
//! 7. `relay` streams the response back byte-for-byte
//! 8. `response` formats error pages for every handled failure

pub mod headers;
pub mod origin;
pub mod reader;
pub mod relay;
pub mod request;
pub mod response;
pub mod server;

pub use reader::LineReader;
pub use request::{Origin, RequestLine};
pub use server::{run, ProxyState};
