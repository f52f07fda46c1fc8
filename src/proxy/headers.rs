//! Header Rewriter Module
//!
//! Streams the client's header block to the origin connection, dropping
//! the connection-control headers and re-emitting them with fixed values.

use tokio::io::{AsyncBufRead, AsyncWrite, AsyncWriteExt};

use crate::error::{ProxyError, Result};
use crate::proxy::reader::LineReader;
use crate::proxy::request::Origin;

// == Fixed Headers ==
/// User-Agent presented to every origin, replacing whatever the client sent.
pub const USER_AGENT_HEADER: &str =
    "User-Agent: Mozilla/5.0 (X11; Linux x86_64; rv:10.0.3) Gecko/20120305 Firefox/10.0.3\r\n";

/// Every proxied exchange is single-shot on both sides.
pub const CONNECTION_HEADER: &str = "Connection: close\r\n";
pub const PROXY_CONNECTION_HEADER: &str = "Proxy-Connection: close\r\n";

/// True for the blank line that terminates a header block.
fn is_end_of_headers(line: &[u8]) -> bool {
    line == b"\r\n" || line == b"\n"
}

/// Case-insensitive match of a header line against a field name prefix.
fn header_is(line: &[u8], name: &str) -> bool {
    line.len() >= name.len() && line[..name.len()].eq_ignore_ascii_case(name.as_bytes())
}

// == Forward Request Headers ==
/// Reads client header lines until the blank line and writes the rewritten
/// block to the origin.
///
/// `Host:` is forwarded verbatim and remembered; `User-Agent:`,
/// `Connection:`, and `Proxy-Connection:` are dropped; every other line is
/// forwarded untouched. A `Host` header is synthesized when the client sent
/// none, and the three fixed headers plus the terminating blank line always
/// close the block, so the origin sees each control header exactly once.
pub async fn forward_request_headers<R, W>(
    client: &mut LineReader<R>,
    origin: &mut W,
    target: &Origin,
) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let fail = |context: &str| ProxyError::HeaderForward(context.to_string());

    let mut saw_host = false;

    loop {
        let line = client
            .read_line()
            .await
            .map_err(|e| fail(&e.to_string()))?
            .ok_or_else(|| fail("unexpected end of header block"))?;

        // A header line must arrive complete
        if !line.ends_with(b"\n") {
            return Err(fail("truncated header line"));
        }
        if is_end_of_headers(&line) {
            break;
        }

        if header_is(&line, "Host:") {
            saw_host = true;
            origin
                .write_all(&line)
                .await
                .map_err(|e| fail(&e.to_string()))?;
            continue;
        }

        // Dropped here, re-emitted with fixed values below
        if header_is(&line, "User-Agent:")
            || header_is(&line, "Connection:")
            || header_is(&line, "Proxy-Connection:")
        {
            continue;
        }

        origin
            .write_all(&line)
            .await
            .map_err(|e| fail(&e.to_string()))?;
    }

    let mut tail = String::new();
    if !saw_host {
        tail.push_str(&format!("Host: {}\r\n", target.host_header()));
    }
    tail.push_str(USER_AGENT_HEADER);
    tail.push_str(CONNECTION_HEADER);
    tail.push_str(PROXY_CONNECTION_HEADER);
    tail.push_str("\r\n");

    origin
        .write_all(tail.as_bytes())
        .await
        .map_err(|e| fail(&e.to_string()))?;

    Ok(())
}
