//! Request Parsing Module
//!
//! Parses the HTTP request line and the absolute-form request target.

use crate::error::{ProxyError, Result};

/// Upper bound on a single request-line token.
pub const MAX_TOKEN_BYTES: usize = 8 * 1024;

// == Request Line ==
/// The three components of an HTTP request line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestLine {
    pub method: String,
    pub target: String,
    pub version: String,
}

/// Parses `METHOD SP TARGET SP VERSION` from one request line.
///
/// Requires exactly three whitespace-separated tokens, each within
/// [`MAX_TOKEN_BYTES`].
pub fn parse_request_line(line: &str) -> Result<RequestLine> {
    let mut tokens = line.split_whitespace();

    let (Some(method), Some(target), Some(version), None) =
        (tokens.next(), tokens.next(), tokens.next(), tokens.next())
    else {
        return Err(ProxyError::MalformedRequest(line.trim_end().to_string()));
    };

    if method.len() > MAX_TOKEN_BYTES || target.len() > MAX_TOKEN_BYTES || version.len() > MAX_TOKEN_BYTES
    {
        return Err(ProxyError::MalformedRequest("token too long".to_string()));
    }

    Ok(RequestLine {
        method: method.to_string(),
        target: target.to_string(),
        version: version.to_string(),
    })
}

// == Origin ==
/// An origin server address plus request path, parsed from an
/// absolute-form `http://host[:port][/path]` target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Origin {
    pub host: String,
    pub port: u16,
    pub path: String,
}

impl Origin {
    /// Canonical identifier for the cache.
    ///
    /// The port is always explicit so `http://h/` and `http://h:80/`
    /// name the same object.
    pub fn cache_key(&self) -> String {
        format!("http://{}:{}{}", self.host, self.port, self.path)
    }

    /// Value for a synthesized `Host` header, omitting a default port.
    pub fn host_header(&self) -> String {
        if self.port == 80 {
            self.host.clone()
        } else {
            format!("{}:{}", self.host, self.port)
        }
    }
}

/// Parses an absolute-form http URI into host, port, and path.
///
/// Only the `http` scheme is accepted: a proxy always receives an absolute
/// target, so relative targets are rejected rather than guessed at.
/// The port, when present, must be digits only and lie in [1, 65535];
/// it defaults to 80. The path defaults to `/`.
pub fn parse_uri(target: &str) -> Result<Origin> {
    let malformed = || ProxyError::MalformedUri(target.to_string());

    let rest = target
        .get(..7)
        .filter(|scheme| scheme.eq_ignore_ascii_case("http://"))
        .map(|_| &target[7..])
        .ok_or_else(malformed)?;

    let (authority, path) = match rest.find('/') {
        Some(slash) => (&rest[..slash], rest[slash..].to_string()),
        None => (rest, "/".to_string()),
    };

    let (host, port) = match authority.split_once(':') {
        Some((host, port_str)) => {
            if port_str.is_empty() || !port_str.bytes().all(|b| b.is_ascii_digit()) {
                return Err(malformed());
            }
            let port: u16 = port_str.parse().map_err(|_| malformed())?;
            if port == 0 {
                return Err(malformed());
            }
            (host, port)
        }
        None => (authority, 80),
    };

    if host.is_empty() {
        return Err(malformed());
    }

    Ok(Origin {
        host: host.to_string(),
        port,
        path,
    })
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_line_three_tokens() {
        let req = parse_request_line("GET http://example.com/ HTTP/1.1\r\n").unwrap();
        assert_eq!(req.method, "GET");
        assert_eq!(req.target, "http://example.com/");
        assert_eq!(req.version, "HTTP/1.1");
    }

    #[test]
    fn test_request_line_wrong_token_count() {
        assert!(parse_request_line("GET\r\n").is_err());
        assert!(parse_request_line("GET http://x/\r\n").is_err());
        assert!(parse_request_line("GET http://x/ HTTP/1.1 extra\r\n").is_err());
        assert!(parse_request_line("\r\n").is_err());
    }

    #[test]
    fn test_request_line_token_too_long() {
        let line = format!("GET http://h/{} HTTP/1.1", "a".repeat(MAX_TOKEN_BYTES));
        assert!(parse_request_line(&line).is_err());
    }

    #[test]
    fn test_uri_with_path() {
        let origin = parse_uri("http://example.com/a/b").unwrap();
        assert_eq!(origin.host, "example.com");
        assert_eq!(origin.port, 80);
        assert_eq!(origin.path, "/a/b");
    }

    #[test]
    fn test_uri_port_no_path() {
        let origin = parse_uri("http://example.com:8080").unwrap();
        assert_eq!(origin.host, "example.com");
        assert_eq!(origin.port, 8080);
        assert_eq!(origin.path, "/");
    }

    #[test]
    fn test_uri_bare_host() {
        let origin = parse_uri("http://example.com").unwrap();
        assert_eq!(origin.port, 80);
        assert_eq!(origin.path, "/");
    }

    #[test]
    fn test_uri_scheme_case_insensitive() {
        assert!(parse_uri("HTTP://example.com/").is_ok());
    }

    #[test]
    fn test_uri_rejects_other_schemes() {
        assert!(parse_uri("ftp://x/y").is_err());
        assert!(parse_uri("https://example.com/").is_err());
    }

    #[test]
    fn test_uri_rejects_relative_targets() {
        assert!(parse_uri("example.com/a").is_err());
        assert!(parse_uri("/a/b").is_err());
    }

    #[test]
    fn test_uri_rejects_empty_host() {
        assert!(parse_uri("http://").is_err());
        assert!(parse_uri("http://:8080/").is_err());
        assert!(parse_uri("http:///path").is_err());
    }

    #[test]
    fn test_uri_rejects_bad_ports() {
        assert!(parse_uri("http://h:0/").is_err());
        assert!(parse_uri("http://h:65536/").is_err());
        assert!(parse_uri("http://h:80abc/").is_err());
        assert!(parse_uri("http://h:/path").is_err());
    }

    #[test]
    fn test_cache_key_is_canonical() {
        let implicit = parse_uri("http://example.com/a").unwrap();
        let explicit = parse_uri("http://example.com:80/a").unwrap();
        assert_eq!(implicit.cache_key(), explicit.cache_key());
        assert_eq!(implicit.cache_key(), "http://example.com:80/a");
    }

    #[test]
    fn test_host_header_omits_default_port() {
        assert_eq!(parse_uri("http://h/").unwrap().host_header(), "h");
        assert_eq!(parse_uri("http://h:8080/").unwrap().host_header(), "h:8080");
    }
}
