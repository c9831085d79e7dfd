//! Gateway configuration
//!
//! Layered: built-in defaults, then an optional `slotswap.toml` in the
//! working directory, then `SLOTSWAP_*` environment variables.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::PathBuf;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:5000";
pub const DEFAULT_CORS_ORIGIN: &str = "http://localhost:5173";

#[derive(Debug, Clone, Deserialize)]
pub struct GatewayConfig {
    pub bind_addr: SocketAddr,
    /// HS256 secret shared with the token issuer
    pub jwt_secret: String,
    pub cors_origin: String,
    /// Where the engine state is restored from and saved to on shutdown
    #[serde(default)]
    pub snapshot_path: Option<PathBuf>,
}

impl GatewayConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let config: GatewayConfig = Config::builder()
            .set_default("bind_addr", DEFAULT_BIND_ADDR)?
            .set_default("cors_origin", DEFAULT_CORS_ORIGIN)?
            .add_source(File::with_name("slotswap").required(false))
            .add_source(Environment::with_prefix("SLOTSWAP"))
            .build()?
            .try_deserialize()?;

        if config.jwt_secret.trim().is_empty() {
            return Err(ConfigError::Message("jwt_secret must not be empty".into()));
        }
        Ok(config)
    }

    /// Configuration for in-process use (tests, embedding)
    pub fn with_secret(secret: impl Into<String>) -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 0)),
            jwt_secret: secret.into(),
            cors_origin: DEFAULT_CORS_ORIGIN.to_string(),
            snapshot_path: None,
        }
    }
}
