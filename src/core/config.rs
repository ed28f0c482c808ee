//! Service configuration.
//!
//! This module provides the typed configuration of the inference service:
//! filesystem paths of the model artifact and its optional metadata
//! sidecar, and the address the HTTP server binds to. Values come from
//! defaults overridden by environment variables.

use crate::core::constants::{
    DEFAULT_HOST, DEFAULT_MODEL_INFO_PATH, DEFAULT_MODEL_PATH, DEFAULT_PORT,
};
use crate::core::errors::{ClassifierError, ClassifierResult};
use std::net::SocketAddr;
use std::path::PathBuf;

/// Configuration of the inference service.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Path of the serialized model artifact.
    pub model_path: PathBuf,

    /// Path of the optional model-metadata sidecar.
    pub model_info_path: PathBuf,

    /// Host to bind to.
    pub host: String,

    /// Port to bind to.
    pub port: u16,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from(DEFAULT_MODEL_PATH),
            model_info_path: PathBuf::from(DEFAULT_MODEL_INFO_PATH),
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
        }
    }
}

impl ServiceConfig {
    /// Builds the configuration from the process environment.
    ///
    /// Recognized variables: `MODEL_PATH`, `MODEL_INFO_PATH`, `HOST`, and
    /// `PORT`. Unset variables fall back to the defaults.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if `PORT` is set but is not a valid port
    /// number.
    pub fn from_env() -> ClassifierResult<Self> {
        let mut config = Self::default();

        if let Ok(path) = std::env::var("MODEL_PATH") {
            config.model_path = PathBuf::from(path);
        }
        if let Ok(path) = std::env::var("MODEL_INFO_PATH") {
            config.model_info_path = PathBuf::from(path);
        }
        if let Ok(host) = std::env::var("HOST") {
            config.host = host;
        }
        if let Ok(port) = std::env::var("PORT") {
            config.port = port.parse().map_err(|_| {
                ClassifierError::config_error(format!("invalid PORT value '{port}'"))
            })?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the model path or host is empty.
    pub fn validate(&self) -> ClassifierResult<()> {
        if self.model_path.as_os_str().is_empty() {
            return Err(ClassifierError::config_error("model path must not be empty"));
        }
        if self.host.is_empty() {
            return Err(ClassifierError::config_error("host must not be empty"));
        }
        Ok(())
    }

    /// Returns the socket address the HTTP server binds to.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the host/port pair does not parse as a
    /// socket address.
    pub fn socket_addr(&self) -> ClassifierResult<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| ClassifierError::config_error(format!("invalid bind address: {e}")))
    }
}
