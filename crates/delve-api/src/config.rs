//! Server configuration.
//!
//! Settings come from an optional YAML file, then `HOST`, `PORT` and
//! `RNG_SEED` from the environment override what the file says.

use std::net::SocketAddr;
use std::path::Path;

use delve_combat::domain::rules::CombatRules;
use serde::Deserialize;

use crate::error::AppError;

/// Environment variable naming the config file.
pub const CONFIG_PATH_VAR: &str = "DELVE_CONFIG";

/// Config file read when `DELVE_CONFIG` is unset. Missing is fine.
pub const DEFAULT_CONFIG_PATH: &str = "delve.yaml";

/// Everything the server needs at startup.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct AppConfig {
    /// Bind address.
    pub host: String,
    /// Bind port.
    pub port: u16,
    /// Fixed seed for the dice. Entropy when absent.
    pub rng_seed: Option<u64>,
    /// Rules every new session runs under.
    pub combat: CombatRules,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_owned(),
            port: 3000,
            rng_seed: None,
            combat: CombatRules::default(),
        }
    }
}

impl AppConfig {
    /// Parses a YAML document. Absent keys keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if the document is malformed.
    pub fn from_yaml(source: &str) -> Result<Self, AppError> {
        if source.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(source).map_err(|e| AppError::Config(format!("invalid config: {e}")))
    }

    /// Loads the config file and applies environment overrides.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if an explicitly named file cannot be read,
    /// the file is malformed, or an override does not parse.
    pub fn load() -> Result<Self, AppError> {
        let config = match std::env::var(CONFIG_PATH_VAR) {
            Ok(path) => Self::from_file(Path::new(&path))?,
            Err(_) if Path::new(DEFAULT_CONFIG_PATH).exists() => {
                Self::from_file(Path::new(DEFAULT_CONFIG_PATH))?
            }
            Err(_) => Self::default(),
        };
        config.with_overrides(|key| std::env::var(key).ok())
    }

    fn from_file(path: &Path) -> Result<Self, AppError> {
        let source = std::fs::read_to_string(path)
            .map_err(|e| AppError::Config(format!("cannot read {}: {e}", path.display())))?;
        Self::from_yaml(&source)
    }

    /// Applies `HOST`, `PORT` and `RNG_SEED` as returned by `lookup`.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if `PORT` or `RNG_SEED` is not a number.
    pub fn with_overrides(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, AppError> {
        if let Some(host) = lookup("HOST") {
            self.host = host;
        }
        if let Some(port) = lookup("PORT") {
            self.port = port
                .parse()
                .map_err(|e| AppError::Config(format!("PORT must be a valid u16: {e}")))?;
        }
        if let Some(seed) = lookup("RNG_SEED") {
            self.rng_seed = Some(
                seed.parse()
                    .map_err(|e| AppError::Config(format!("RNG_SEED must be a valid u64: {e}")))?,
            );
        }
        Ok(self)
    }

    /// The address to bind.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if host and port do not form an address.
    pub fn socket_addr(&self) -> Result<SocketAddr, AppError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| AppError::Config(format!("invalid HOST:PORT combination: {e}")))
    }
}
