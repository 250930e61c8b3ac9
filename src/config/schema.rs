/// Configuration schema for the license server
use std::fmt;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use serde::{Deserialize, Serialize};

use crate::error::{LicenseError, LicenseResult};

/// Main configuration structure
#[derive(Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    /// HMAC shared secret used to sign and verify licenses
    pub secret: String,

    /// Value callers must send in `X-API-Key` to generate licenses
    pub api_key: String,

    /// Listen port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Listen address
    #[serde(default = "default_bind")]
    pub bind: IpAddr,
}

fn default_port() -> u16 {
    3000
}

fn default_bind() -> IpAddr {
    IpAddr::V4(Ipv4Addr::UNSPECIFIED)
}

// Secrets never reach logs.
impl fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServerConfig")
            .field("secret", &"<redacted>")
            .field("api_key", &"<redacted>")
            .field("port", &self.port)
            .field("bind", &self.bind)
            .finish()
    }
}

impl ServerConfig {
    pub fn new(secret: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            api_key: api_key.into(),
            port: default_port(),
            bind: default_bind(),
        }
    }

    /// Socket address to listen on
    pub fn listen_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind, self.port)
    }

    /// Replace file values with those given on the command line
    pub fn apply_overrides(
        &mut self,
        secret: Option<String>,
        api_key: Option<String>,
        port: Option<u16>,
        bind: Option<IpAddr>,
    ) {
        if let Some(secret) = secret {
            self.secret = secret;
        }
        if let Some(api_key) = api_key {
            self.api_key = api_key;
        }
        if let Some(port) = port {
            self.port = port;
        }
        if let Some(bind) = bind {
            self.bind = bind;
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> LicenseResult<()> {
        if self.secret.is_empty() {
            return Err(LicenseError::Config("secret cannot be empty".to_string()));
        }

        if self.api_key.is_empty() {
            return Err(LicenseError::Config("api_key cannot be empty".to_string()));
        }

        Ok(())
    }
}
