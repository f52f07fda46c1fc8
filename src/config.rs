//! Configuration Module
//!
//! Handles the command line and environment configuration of the proxy.

use std::env;

use crate::cache::{MAX_CACHE_BYTES, MAX_OBJECT_BYTES};

/// Proxy configuration parameters.
///
/// The listening port is a required positional argument; the cache limits
/// can be overridden via environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// TCP port the proxy listens on
    pub listen_port: u16,
    /// Total budget for cached object bytes
    pub max_cache_bytes: usize,
    /// Largest single object the cache will accept
    pub max_object_bytes: usize,
}

impl Config {
    /// Creates a Config from the process arguments and environment.
    ///
    /// Expects exactly one positional argument, the listening port.
    /// Returns a usage message when the argument count is wrong or the
    /// port does not parse.
    ///
    /// # Environment Variables
    /// - `MAX_CACHE_BYTES` - Total cache budget in bytes (default: 1 MiB)
    /// - `MAX_OBJECT_BYTES` - Per-object ceiling in bytes (default: 100 KiB)
    pub fn from_args<I>(mut args: I) -> Result<Self, String>
    where
        I: Iterator<Item = String>,
    {
        let program = args.next().unwrap_or_else(|| "mini_proxy".to_string());
        let usage = format!("Usage: {} <listen_port>", program);

        let port_arg = args.next().ok_or_else(|| usage.clone())?;
        if args.next().is_some() {
            return Err(usage);
        }

        let listen_port: u16 = port_arg.parse().map_err(|_| usage)?;

        Ok(Self {
            listen_port,
            max_cache_bytes: env::var("MAX_CACHE_BYTES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(MAX_CACHE_BYTES),
            max_object_bytes: env::var("MAX_OBJECT_BYTES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(MAX_OBJECT_BYTES),
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_port: 8080,
            max_cache_bytes: MAX_CACHE_BYTES,
            max_object_bytes: MAX_OBJECT_BYTES,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(v: &[&str]) -> impl Iterator<Item = String> {
        v.iter()
            .map(|s| s.to_string())
            .collect::<Vec<_>>()
            .into_iter()
    }

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.listen_port, 8080);
        assert_eq!(config.max_cache_bytes, MAX_CACHE_BYTES);
        assert_eq!(config.max_object_bytes, MAX_OBJECT_BYTES);
    }

    #[test]
    fn test_config_from_args() {
        let config = Config::from_args(args(&["mini_proxy", "15213"])).unwrap();
        assert_eq!(config.listen_port, 15213);
    }

    #[test]
    fn test_config_missing_port() {
        let err = Config::from_args(args(&["mini_proxy"])).unwrap_err();
        assert!(err.contains("Usage:"));
    }

    #[test]
    fn test_config_extra_argument() {
        let result = Config::from_args(args(&["mini_proxy", "8080", "extra"]));
        assert!(result.is_err());
    }

    #[test]
    fn test_config_bad_port() {
        assert!(Config::from_args(args(&["mini_proxy", "notaport"])).is_err());
        assert!(Config::from_args(args(&["mini_proxy", "99999"])).is_err());
    }
}
