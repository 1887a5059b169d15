use std::env;
use std::net::{IpAddr, SocketAddr};
use tracing::warn;
use super::ConfigError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
}

impl AppConfig {
    pub const DEFAULT_HOST: &'static str = "0.0.0.0";
    pub const DEFAULT_PORT: u16 = 3000;

    /// Reads `APP_HOST` and `PORT` (or `APP_PORT`). Unparseable ports fall
    /// back to the default with a warning.
    pub fn from_env() -> Self {
        let host = env::var("APP_HOST").unwrap_or_else(|_| Self::DEFAULT_HOST.to_string());
        let port = env::var("PORT")
            .or_else(|_| env::var("APP_PORT"))
            .ok()
            .and_then(|s| match s.parse() {
                Ok(port) => Some(port),
                Err(_) => {
                    warn!("Invalid port value {:?}, using default {}", s, Self::DEFAULT_PORT);
                    None
                }
            })
            .unwrap_or(Self::DEFAULT_PORT);
        AppConfig { host, port }
    }

    pub fn from_test_env() -> Self {
        AppConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.socket_addr().map(|_| ())
    }

    /// Listen address. The host must be a literal IP.
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        let ip: IpAddr = self.host.parse().map_err(|e| {
            ConfigError::InvalidValue(format!("APP_HOST {:?}: {}", self.host, e))
        })?;
        Ok(SocketAddr::new(ip, self.port))
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            host: Self::DEFAULT_HOST.to_string(),
            port: Self::DEFAULT_PORT,
        }
    }
}
