//! Environment-backed configuration.
//!
//! Every setting has a default. Override with `RERANK_*` environment variables.
//! Without `RERANK_MODEL_PATH` the server runs the deterministic stub encoder.

pub mod error;


pub use error::ConfigError;

use std::env;
use std::net::IpAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::constants::{
    DEFAULT_BATCH_SIZE, DEFAULT_ENCODE_TIMEOUT, DEFAULT_LOAD_TIMEOUT, DEFAULT_MAX_SEQ_LEN,
    DEFAULT_MODIFIERS,
};
use crate::embedding::EncoderConfig;
use crate::pipeline::PipelineConfig;

/// Server configuration loaded from environment variables.
///
/// Use [`Config::from_env`] to read `RERANK_*` overrides on top of defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port. Default: `5056`.
    pub port: u16,

    /// IP address to bind to. Default: `127.0.0.1`.
    pub bind_addr: IpAddr,

    /// Directory holding the dual encoder artifacts. `None` selects stub mode.
    pub model_path: Option<PathBuf>,

    /// Base URL to fetch missing artifacts from into `model_path`.
    pub model_url: Option<String>,

    /// Modifier phrases (`|`-separated in the environment).
    pub modifiers: Vec<String>,

    /// Responses per encoder call. Default: `64`.
    pub batch_size: usize,

    pub load_timeout: Duration,

    pub encode_timeout: Duration,

    /// Max tokens per encoder sequence. Default: `512`.
    pub max_seq_len: usize,

    /// Never probe for a GPU.
    pub force_cpu: bool,

    /// Load the model before accepting traffic.
    pub warm_up: bool,

    /// Answer with the canonical text when ranking is impossible. Default: `true`.
    pub fallback_to_canonical: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 5056,
            bind_addr: IpAddr::V4(std::net::Ipv4Addr::new(127, 0, 0, 1)),
            model_path: None,
            model_url: None,
            modifiers: DEFAULT_MODIFIERS.iter().map(|m| m.to_string()).collect(),
            batch_size: DEFAULT_BATCH_SIZE,
            load_timeout: DEFAULT_LOAD_TIMEOUT,
            encode_timeout: DEFAULT_ENCODE_TIMEOUT,
            max_seq_len: DEFAULT_MAX_SEQ_LEN,
            force_cpu: false,
            warm_up: false,
            fallback_to_canonical: true,
        }
    }
}

impl Config {
    const ENV_PORT: &'static str = "RERANK_PORT";
    const ENV_BIND_ADDR: &'static str = "RERANK_BIND_ADDR";
    const ENV_MODEL_PATH: &'static str = "RERANK_MODEL_PATH";
    const ENV_MODEL_URL: &'static str = "RERANK_MODEL_URL";
    const ENV_MODIFIERS: &'static str = "RERANK_MODIFIERS";
    const ENV_BATCH_SIZE: &'static str = "RERANK_BATCH_SIZE";
    const ENV_LOAD_TIMEOUT: &'static str = "RERANK_LOAD_TIMEOUT_SECS";
    const ENV_ENCODE_TIMEOUT: &'static str = "RERANK_ENCODE_TIMEOUT_SECS";
    const ENV_MAX_SEQ_LEN: &'static str = "RERANK_MAX_SEQ_LEN";
    const ENV_FORCE_CPU: &'static str = "RERANK_FORCE_CPU";
    const ENV_WARM_UP: &'static str = "RERANK_WARM_UP";
    const ENV_FALLBACK: &'static str = "RERANK_FALLBACK_TO_CANONICAL";

    /// Separates entries of `RERANK_MODIFIERS`.
    pub const MODIFIER_LIST_SEPARATOR: char = '|';

    /// Loads configuration from environment variables (falling back to defaults).
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let port = Self::parse_port_from_env(defaults.port)?;
        let bind_addr = Self::parse_bind_addr_from_env(defaults.bind_addr)?;
        let model_path = Self::parse_optional_string_from_env(Self::ENV_MODEL_PATH).map(PathBuf::from);
        let model_url = Self::parse_optional_string_from_env(Self::ENV_MODEL_URL);
        let modifiers = Self::parse_modifiers_from_env(defaults.modifiers);
        let batch_size = Self::parse_from_env(Self::ENV_BATCH_SIZE, defaults.batch_size)?;
        let load_timeout = Self::parse_secs_from_env(Self::ENV_LOAD_TIMEOUT, defaults.load_timeout)?;
        let encode_timeout =
            Self::parse_secs_from_env(Self::ENV_ENCODE_TIMEOUT, defaults.encode_timeout)?;
        let max_seq_len = Self::parse_from_env(Self::ENV_MAX_SEQ_LEN, defaults.max_seq_len)?;
        let force_cpu = Self::parse_bool_from_env(Self::ENV_FORCE_CPU, defaults.force_cpu)?;
        let warm_up = Self::parse_bool_from_env(Self::ENV_WARM_UP, defaults.warm_up)?;
        let fallback_to_canonical =
            Self::parse_bool_from_env(Self::ENV_FALLBACK, defaults.fallback_to_canonical)?;

        Ok(Self {
            port,
            bind_addr,
            model_path,
            model_url,
            modifiers,
            batch_size,
            load_timeout,
            encode_timeout,
            max_seq_len,
            force_cpu,
            warm_up,
            fallback_to_canonical,
        })
    }

    /// Validates paths and basic invariants (does not create directories).
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.batch_size == 0 {
            return Err(ConfigError::InvalidValue {
                name: Self::ENV_BATCH_SIZE,
                value: "0".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }

        if self.max_seq_len == 0 {
            return Err(ConfigError::InvalidValue {
                name: Self::ENV_MAX_SEQ_LEN,
                value: "0".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }

        for (name, timeout) in [
            (Self::ENV_LOAD_TIMEOUT, self.load_timeout),
            (Self::ENV_ENCODE_TIMEOUT, self.encode_timeout),
        ] {
            if timeout.is_zero() {
                return Err(ConfigError::InvalidValue {
                    name,
                    value: "0".to_string(),
                    reason: "timeout must be non-zero".to_string(),
                });
            }
        }

        match (&self.model_path, &self.model_url) {
            (None, Some(_)) => {
                return Err(ConfigError::MissingEnvVar {
                    name: Self::ENV_MODEL_PATH,
                });
            }
            // Missing files are fetched from the URL on first use.
            (Some(path), Some(_)) => {
                if path.exists() && !path.is_dir() {
                    return Err(ConfigError::NotADirectory { path: path.clone() });
                }
            }
            (Some(path), None) => {
                if !path.exists() {
                    return Err(ConfigError::PathNotFound { path: path.clone() });
                }
                if !path.is_dir() {
                    return Err(ConfigError::NotADirectory { path: path.clone() });
                }
            }
            (None, None) => {}
        }

        Ok(())
    }

    /// `true` when no model is configured and the stub encoder will be used.
    pub fn is_stub(&self) -> bool {
        self.model_path.is_none()
    }

    pub fn encoder_config(&self) -> EncoderConfig {
        let Some(model_path) = &self.model_path else {
            return EncoderConfig::stub();
        };

        let config = EncoderConfig::new(model_path)
            .with_max_seq_len(self.max_seq_len)
            .with_force_cpu(self.force_cpu);
        match &self.model_url {
            Some(url) => config.with_model_url(url),
            None => config,
        }
    }

    pub fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig::default()
            .with_modifiers(self.modifiers.iter().cloned())
            .with_batch_size(self.batch_size)
            .with_load_timeout(self.load_timeout)
            .with_encode_timeout(self.encode_timeout)
    }

    /// Returns `"{bind_addr}:{port}"` (useful for logging/binding).
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.bind_addr, self.port)
    }

    fn parse_port_from_env(default: u16) -> Result<u16, ConfigError> {
        match env::var(Self::ENV_PORT) {
            Ok(value) => {
                let port: u16 = value.parse().map_err(|e| ConfigError::PortParseError {
                    value: value.clone(),
                    source: e,
                })?;

                if port == 0 {
                    return Err(ConfigError::InvalidPort { value });
                }

                Ok(port)
            }
            Err(_) => Ok(default),
        }
    }

    fn parse_bind_addr_from_env(default: IpAddr) -> Result<IpAddr, ConfigError> {
        match env::var(Self::ENV_BIND_ADDR) {
            Ok(value) => value
                .parse()
                .map_err(|e| ConfigError::InvalidBindAddr { value, source: e }),
            Err(_) => Ok(default),
        }
    }

    fn parse_optional_string_from_env(var_name: &str) -> Option<String> {
        env::var(var_name)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    fn parse_modifiers_from_env(default: Vec<String>) -> Vec<String> {
        match env::var(Self::ENV_MODIFIERS) {
            Ok(value) => value
                .split(Self::MODIFIER_LIST_SEPARATOR)
                .map(str::trim)
                .filter(|m| !m.is_empty())
                .map(str::to_string)
                .collect(),
            Err(_) => default,
        }
    }

    fn parse_from_env<T>(var_name: &'static str, default: T) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        match env::var(var_name) {
            Ok(value) => value
                .trim()
                .parse()
                .map_err(|e: T::Err| ConfigError::InvalidValue {
                    name: var_name,
                    value: value.clone(),
                    reason: e.to_string(),
                }),
            Err(_) => Ok(default),
        }
    }

    fn parse_secs_from_env(var_name: &'static str, default: Duration) -> Result<Duration, ConfigError> {
        Self::parse_from_env(var_name, default.as_secs()).map(Duration::from_secs)
    }

    fn parse_bool_from_env(var_name: &'static str, default: bool) -> Result<bool, ConfigError> {
        let Ok(value) = env::var(var_name) else {
            return Ok(default);
        };

        match value.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            _ => Err(ConfigError::InvalidValue {
                name: var_name,
                value,
                reason: "expected a boolean (true/false, 1/0, yes/no, on/off)".to_string(),
            }),
        }
    }
}
