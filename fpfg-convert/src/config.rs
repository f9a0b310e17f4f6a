use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::builtins::{load_builtin_table, BuiltinLoadError};
use crate::extract::ExtractOptions;
use crate::fortigate::{FortiGateConfig, DEFAULT_PORT, DEFAULT_VDOM};

pub const HOST_ENV: &str = "FPFG_HOST";
pub const TOKEN_ENV: &str = "FPFG_TOKEN";

/// Settings file contents. Every key is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub fortigate: FortiGateSection,
    pub extract: ExtractSection,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FortiGateSection {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub token: Option<String>,
    pub vdom: Option<String>,
    pub verify_tls: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExtractSection {
    pub host_address_fallback: Option<bool>,
    pub use_builtins: Option<bool>,
    pub include_policy_objects: Option<bool>,
    pub builtins_file: Option<PathBuf>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: String,
        source: toml::de::Error,
    },
    #[error("no FortiGate host given (use --host, FPFG_HOST or [fortigate].host)")]
    MissingHost,
    #[error("no API token given (use --token, FPFG_TOKEN or [fortigate].token)")]
    MissingToken,
    #[error(transparent)]
    Builtins(#[from] BuiltinLoadError),
}

/// Connection settings given on the command line.
#[derive(Debug, Clone, Default)]
pub struct ConnectionOverrides {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub token: Option<String>,
    pub vdom: Option<String>,
    pub verify_tls: bool,
}

/// Extraction switches given on the command line. Flags only ever enable
/// their behavior; an unset flag defers to the file.
#[derive(Debug, Clone, Default)]
pub struct ExtractOverrides {
    pub host_address_fallback: bool,
    pub no_builtins: bool,
    pub include_policy_objects: bool,
    pub builtins_file: Option<PathBuf>,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        toml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    /// Load `path` if given, otherwise use defaults.
    pub fn load_optional(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    /// Connection settings with CLI > environment > file > default
    /// precedence. `env` looks up environment variables.
    pub fn fortigate(
        &self,
        cli: &ConnectionOverrides,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<FortiGateConfig, ConfigError> {
        let file = &self.fortigate;
        let host = non_empty(cli.host.clone())
            .or_else(|| non_empty(env(HOST_ENV)))
            .or_else(|| non_empty(file.host.clone()))
            .ok_or(ConfigError::MissingHost)?;
        let token = non_empty(cli.token.clone())
            .or_else(|| non_empty(env(TOKEN_ENV)))
            .or_else(|| non_empty(file.token.clone()))
            .ok_or(ConfigError::MissingToken)?;

        Ok(FortiGateConfig {
            host,
            port: cli.port.or(file.port).unwrap_or(DEFAULT_PORT),
            token,
            vdom: non_empty(cli.vdom.clone())
                .or_else(|| non_empty(file.vdom.clone()))
                .unwrap_or_else(|| DEFAULT_VDOM.to_string()),
            verify_tls: cli.verify_tls || file.verify_tls.unwrap_or(false),
        })
    }

    /// Extraction policies, loading a replacement built-in table if one is
    /// named.
    pub fn extract_options(&self, cli: &ExtractOverrides) -> Result<ExtractOptions, ConfigError> {
        let file = &self.extract;
        let builtins = match cli.builtins_file.as_ref().or(file.builtins_file.as_ref()) {
            Some(path) => Some(load_builtin_table(path)?),
            None => None,
        };
        Ok(ExtractOptions {
            host_address_fallback: cli.host_address_fallback
                || file.host_address_fallback.unwrap_or(false),
            use_builtins: !cli.no_builtins && file.use_builtins.unwrap_or(true),
            include_policy_objects: cli.include_policy_objects
                || file.include_policy_objects.unwrap_or(false),
            builtins,
        })
    }
}

/// Read an environment variable, treating unset and non-UTF-8 alike.
pub fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
