//! Transport configuration for the HTTP gateway.
//!
//! Loaded from TOML:
//!
//! ```toml
//! endpoint = "https://ranger-admin.internal:6182"
//! username = "admin"
//! password = "..."
//! insecure = false      # skip TLS certificate verification
//! timeout_secs = 30     # omit for no client-side timeout
//! ```

use std::path::Path;
use std::time::Duration;

use base64::{engine::general_purpose::STANDARD, Engine};
use serde::Deserialize;

use ranger_contracts::error::{RangerError, RangerResult};

/// Where the Ranger Admin API lives and how to authenticate to it.
#[derive(Clone, Deserialize)]
pub struct GatewayConfig {
    /// Base URL of the Ranger Admin REST API, e.g. `http://ranger:6080`.
    pub endpoint: String,
    /// User with administrative privileges, used for basic auth.
    pub username: String,
    pub password: String,
    /// Disable TLS certificate verification (self-signed endpoints).
    #[serde(default)]
    pub insecure: bool,
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl std::fmt::Debug for GatewayConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayConfig")
            .field("endpoint", &self.endpoint)
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .field("insecure", &self.insecure)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl GatewayConfig {
    /// Build a configuration with TLS verification on and no timeout.
    pub fn new(
        endpoint: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> RangerResult<Self> {
        Self {
            endpoint: endpoint.into(),
            username: username.into(),
            password: password.into(),
            insecure: false,
            timeout_secs: None,
        }
        .validated()
    }

    /// Parse `s` as TOML gateway configuration.
    ///
    /// Returns `RangerError::ConfigError` if the TOML is malformed or a
    /// required value is empty.
    pub fn from_toml_str(s: &str) -> RangerResult<Self> {
        let config: GatewayConfig = toml::from_str(s).map_err(|e| RangerError::ConfigError {
            reason: format!("failed to parse gateway TOML: {}", e),
        })?;
        config.validated()
    }

    /// Read the file at `path` and parse it as TOML gateway configuration.
    pub fn from_file(path: &Path) -> RangerResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| RangerError::ConfigError {
            reason: format!("failed to read gateway config '{}': {}", path.display(), e),
        })?;
        Self::from_toml_str(&contents)
    }

    /// The `Authorization` header value: `Basic base64(username:password)`.
    pub fn authorization_header(&self) -> String {
        let credentials = format!("{}:{}", self.username, self.password);
        format!("Basic {}", STANDARD.encode(credentials))
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }

    fn validated(mut self) -> RangerResult<Self> {
        let missing = [
            ("endpoint", self.endpoint.trim().is_empty()),
            ("username", self.username.is_empty()),
            ("password", self.password.is_empty()),
        ];
        if let Some((field, _)) = missing.iter().find(|(_, empty)| *empty) {
            return Err(RangerError::ConfigError {
                reason: format!("gateway configuration requires a non-empty '{field}'"),
            });
        }
        self.endpoint = self.endpoint.trim().trim_end_matches('/').to_string();
        Ok(self)
    }
}
