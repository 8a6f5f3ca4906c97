//! Connection parameters for a single run

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default connect timeout in milliseconds
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;

/// Credentials and settings for one remote command run
///
/// Immutable once a run starts; each run owns its own copy.
#[derive(Clone, Serialize, Deserialize)]
pub struct ConnectionParams {
    /// Host address
    pub host: String,
    /// SSH port (default 22)
    #[serde(default = "default_port")]
    pub port: u16,
    /// SSH user
    pub user: String,
    /// Password for authentication
    pub password: String,
    /// Remote path of the elevation binary
    pub sudo_path: Option<String>,
    /// Remote path of the no-hang-up wrapper binary
    pub nohup_path: Option<String>,
    /// Whether formatted commands run elevated
    #[serde(default)]
    pub sudo: bool,
    /// Connect timeout in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_port() -> u16 {
    22
}

fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT_MS
}

impl ConnectionParams {
    /// Create parameters with the default port and timeout
    pub fn new(
        host: impl Into<String>,
        user: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            port: default_port(),
            user: user.into(),
            password: password.into(),
            sudo_path: None,
            nohup_path: None,
            sudo: false,
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }

    /// Set a custom port
    #[must_use]
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Override the connect timeout
    #[must_use]
    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Request elevation, optionally with an explicit binary path
    #[must_use]
    pub fn with_sudo(mut self, sudo_path: Option<String>) -> Self {
        self.sudo = true;
        self.sudo_path = sudo_path;
        self
    }

    /// Set the no-hang-up wrapper path
    #[must_use]
    pub fn with_nohup_path(mut self, nohup_path: impl Into<String>) -> Self {
        self.nohup_path = Some(nohup_path.into());
        self
    }

    /// Connect timeout as a [`Duration`]
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

// Manual Debug so the password never lands in logs.
impl std::fmt::Debug for ConnectionParams {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionParams")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("sudo_path", &self.sudo_path)
            .field("nohup_path", &self.nohup_path)
            .field("sudo", &self.sudo)
            .field("timeout_ms", &self.timeout_ms)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let params = ConnectionParams::new("host.example", "ops", "secret");

        assert_eq!(params.port, 22);
        assert_eq!(params.timeout_ms, DEFAULT_TIMEOUT_MS);
        assert_eq!(params.timeout(), Duration::from_millis(10_000));
        assert!(!params.sudo);
    }

    #[test]
    fn builder_overrides() {
        let params = ConnectionParams::new("host.example", "ops", "secret")
            .with_port(2222)
            .with_timeout_ms(500)
            .with_sudo(Some("/usr/bin/sudo".to_string()))
            .with_nohup_path("/usr/bin/nohup");

        assert_eq!(params.port, 2222);
        assert_eq!(params.timeout_ms, 500);
        assert!(params.sudo);
        assert_eq!(params.sudo_path.as_deref(), Some("/usr/bin/sudo"));
        assert_eq!(params.nohup_path.as_deref(), Some("/usr/bin/nohup"));
    }

    #[test]
    fn debug_redacts_password() {
        let params = ConnectionParams::new("host.example", "ops", "hunter2");
        let rendered = format!("{params:?}");

        assert!(!rendered.contains("hunter2"));
        assert!(rendered.contains("<redacted>"));
    }
}
