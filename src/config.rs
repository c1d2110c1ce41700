//! Server configuration.
//!
//! Every field has a default, so a partial JSON document (or none at all) is
//! enough to build a [`ServerConfig`].

use std::time::Duration;

use serde::Deserialize;

use crate::http::ReaderConfig;

/// Environment variable that overrides [`ServerConfig::address`].
pub const ADDR_ENV: &str = "HTTPFROMTCP_ADDR";

/// Default listen address.
pub const DEFAULT_ADDR: &str = "127.0.0.1:42069";

/// Settings for [`Server`](crate::server::Server).
///
/// # Example JSON
///
/// ```json
/// {
///   "address": "0.0.0.0:8080",
///   "read_timeout_ms": 5000,
///   "reader": { "initial_capacity": 1024 }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind, e.g. `127.0.0.1:42069`.
    pub address: String,
    /// How long a connection may take to deliver a complete request.
    pub read_timeout_ms: Option<u64>,
    /// Read buffer tuning for each connection.
    pub reader: ReaderConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: DEFAULT_ADDR.to_owned(),
            read_timeout_ms: None,
            reader: ReaderConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Parses a JSON configuration document.
    ///
    /// # Errors
    ///
    /// Returns the [`serde_json::Error`] if the document is invalid.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Builds the default configuration, taking the address from
    /// `HTTPFROMTCP_ADDR` when it is set.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(addr) = std::env::var(ADDR_ENV) {
            config.address = addr;
        }
        config
    }

    /// Returns the per-connection read timeout, if any.
    pub fn read_timeout(&self) -> Option<Duration> {
        self.read_timeout_ms.map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_uses_defaults() {
        let config = ServerConfig::from_json("{}").unwrap();
        assert_eq!(config, ServerConfig::default());
        assert_eq!(config.address, DEFAULT_ADDR);
        assert_eq!(config.read_timeout(), None);
    }

    #[test]
    fn nested_reader_settings() {
        let config = ServerConfig::from_json(
            r#"{"address": "0.0.0.0:8080", "read_timeout_ms": 250, "reader": {"max_buffer_size": 4096}}"#,
        )
        .unwrap();
        assert_eq!(config.address, "0.0.0.0:8080");
        assert_eq!(config.read_timeout(), Some(Duration::from_millis(250)));
        assert_eq!(config.reader.max_buffer_size, 4096);
        assert_eq!(config.reader.initial_capacity, 8);
    }

    #[test]
    fn rejects_wrong_types() {
        assert!(ServerConfig::from_json(r#"{"read_timeout_ms": "soon"}"#).is_err());
    }
}
