//! Configuration management for the chat relay
//!
//! Settings are layered: built-in defaults, then an optional `config.toml`,
//! then environment variables prefixed with `CHAT_RELAY_`.

use config::{Config, Environment, File};
use serde::Deserialize;

/// Default config file name, resolved relative to the working directory
pub const DEFAULT_CONFIG_PATH: &str = "config";

const ENV_PREFIX: &str = "CHAT_RELAY";

/// Complete server configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// IP address the listener binds to
    /// Environment: CHAT_RELAY_BIND_ADDRESS
    pub bind_address: String,

    /// TCP port clients connect to
    /// Environment: CHAT_RELAY_PORT
    pub port: u16,

    /// Lines buffered per session before deliveries to it are dropped
    pub outbound_queue_capacity: usize,

    /// Requests buffered in front of the router control loop
    pub router_queue_capacity: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0".to_string(),
            port: 6666,
            outbound_queue_capacity: 64,
            router_queue_capacity: 256,
        }
    }
}

impl ServerConfig {
    /// Load configuration from `config.toml` with environment overrides
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_from(DEFAULT_CONFIG_PATH)
    }

    /// Load configuration from the given file (extension optional).
    ///
    /// A missing file is not an error; defaults and environment still apply.
    pub fn load_from(path: &str) -> Result<Self, config::ConfigError> {
        let defaults = Self::default();

        let settings = Config::builder()
            .set_default("bind_address", defaults.bind_address)?
            .set_default("port", i64::from(defaults.port))?
            .set_default("outbound_queue_capacity", defaults.outbound_queue_capacity as i64)?
            .set_default("router_queue_capacity", defaults.router_queue_capacity as i64)?
            .add_source(File::with_name(path).required(false))
            .add_source(Environment::with_prefix(ENV_PREFIX))
            .build()?;

        let config: ServerConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Validation for all configuration values
    pub fn validate(&self) -> Result<(), config::ConfigError> {
        if self.bind_address.trim().is_empty() {
            return Err(config::ConfigError::Message(
                "bind_address cannot be empty".into(),
            ));
        }

        if self.port == 0 {
            return Err(config::ConfigError::Message("port cannot be 0".into()));
        }

        // tokio channels panic on a zero capacity
        if self.outbound_queue_capacity == 0 {
            return Err(config::ConfigError::Message(
                "outbound_queue_capacity must be greater than 0".into(),
            ));
        }

        if self.router_queue_capacity == 0 {
            return Err(config::ConfigError::Message(
                "router_queue_capacity must be greater than 0".into(),
            ));
        }

        Ok(())
    }

    /// Bind address and port as a socket address string
    pub fn listen_address(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }
}
