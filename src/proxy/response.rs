//! Error Response Module
//!
//! Formats and sends the HTML error page for handled failures.

use tokio::io::{AsyncWrite, AsyncWriteExt};
use tracing::debug;

use crate::error::ProxyError;

// == Error Page ==
/// Renders a complete HTTP/1.0 error response.
///
/// The `Content-length` is the exact byte length of the HTML body, so the
/// client can delimit the page even though the connection closes after it.
pub fn error_page(status: u16, short_msg: &str, detail: &str) -> Vec<u8> {
    let body = format!(
        "<html><title>Proxy Error</title><body bgcolor=\"ffffff\">{} {}<br>{}</body></html>",
        status, short_msg, detail
    );
    let header = format!(
        "HTTP/1.0 {} {}\r\nContent-type: text/html\r\nConnection: close\r\nContent-length: {}\r\n\r\n",
        status,
        short_msg,
        body.len()
    );

    let mut page = header.into_bytes();
    page.extend_from_slice(body.as_bytes());
    page
}

// == Send Error ==
/// Writes the error page matching `err` to the client.
///
/// Best-effort: a client that already went away is simply dropped.
pub async fn send_error<W>(client: &mut W, err: &ProxyError)
where
    W: AsyncWrite + Unpin,
{
    let (status, short_msg) = err.status();
    let page = error_page(status, short_msg, &err.to_string());

    if let Err(e) = client.write_all(&page).await {
        debug!(error = %e, "failed to deliver error page");
    }
}
