//! Configuration for the stats API server

use persistence::DatabaseConfig;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig { host: "127.0.0.1".to_string(), port: 3001 },
            database: DatabaseConfig::default(),
        }
    }
}

impl ApiConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        let mut config = Self::default();

        if let Ok(host) = std::env::var("STATS_API_HOST") {
            config.server.host = host;
        }

        if let Ok(port) = std::env::var("STATS_API_PORT") {
            config.server.port = port
                .parse()
                .map_err(|_| anyhow::anyhow!("Invalid STATS_API_PORT: {}", port))?;
        }

        config.database = DatabaseConfig::from_env()?;
        Ok(config)
    }

    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        let addr = format!("{}:{}", self.server.host, self.server.port);
        addr.parse().map_err(|_| anyhow::anyhow!("Invalid listen address: {}", addr))
    }
}
