//! Application configuration.
//!
//! Values come from the environment (a `.env` file is loaded first by the
//! binary). CLI flags override them.
//!
//! | Variable                | Default | Meaning                        |
//! |-------------------------|---------|--------------------------------|
//! | `REMESAS_PORT`          | `3000`  | HTTP server port               |
//! | `REMESAS_MAX_UPLOAD_MB` | `50`    | Maximum upload size            |
//! | `REMESAS_SHEET`         | (none)  | Worksheet to read              |

use std::env;
use std::str::FromStr;

use crate::error::ConfigError;

/// Default HTTP port.
pub const DEFAULT_PORT: u16 = 3000;

/// Default upload limit in megabytes.
pub const DEFAULT_MAX_UPLOAD_MB: usize = 50;

const PORT_VAR: &str = "REMESAS_PORT";
const MAX_UPLOAD_VAR: &str = "REMESAS_MAX_UPLOAD_MB";
const SHEET_VAR: &str = "REMESAS_SHEET";

/// Runtime configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// HTTP server port.
    pub port: u16,
    /// Maximum accepted upload, in bytes.
    pub max_upload_bytes: usize,
    /// Worksheet to read (first sheet when absent).
    pub sheet: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_MB * 1024 * 1024,
            sheet: None,
        }
    }
}

impl Config {
    /// Read configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Read configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let port = parse_var(&lookup, PORT_VAR)?.unwrap_or(defaults.port);
        let max_upload_bytes = match parse_var::<usize, _>(&lookup, MAX_UPLOAD_VAR)? {
            Some(mb) => mb
                .checked_mul(1024 * 1024)
                .ok_or_else(|| ConfigError::InvalidValue {
                    key: MAX_UPLOAD_VAR,
                    value: mb.to_string(),
                    message: "upload limit too large".to_string(),
                })?,
            None => defaults.max_upload_bytes,
        };
        let sheet = lookup(SHEET_VAR)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        Ok(Self {
            port,
            max_upload_bytes,
            sheet,
        })
    }

    /// Override the port.
    pub fn with_port(mut self, port: Option<u16>) -> Self {
        if let Some(port) = port {
            self.port = port;
        }
        self
    }
}

fn parse_var<T, F>(lookup: &F, key: &'static str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) if raw.trim().is_empty() => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|e: T::Err| ConfigError::InvalidValue {
                key,
                value: raw.clone(),
                message: e.to_string(),
            }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.port, 3000);
        assert_eq!(config.max_upload_bytes, 50 * 1024 * 1024);
    }

    #[test]
    fn test_values_from_env() {
        let config = Config::from_lookup(lookup(&[
            ("REMESAS_PORT", "8080"),
            ("REMESAS_MAX_UPLOAD_MB", " 5 "),
            ("REMESAS_SHEET", "Envios"),
        ]))
        .unwrap();

        assert_eq!(config.port, 8080);
        assert_eq!(config.max_upload_bytes, 5 * 1024 * 1024);
        assert_eq!(config.sheet.as_deref(), Some("Envios"));
    }

    #[test]
    fn test_blank_values_use_defaults() {
        let config =
            Config::from_lookup(lookup(&[("REMESAS_PORT", ""), ("REMESAS_SHEET", "  ")])).unwrap();
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.sheet, None);
    }

    #[test]
    fn test_invalid_port() {
        let err = Config::from_lookup(lookup(&[("REMESAS_PORT", "tres mil")])).unwrap_err();
        assert!(err.to_string().contains("REMESAS_PORT"));
    }

    #[test]
    fn test_upload_limit_overflow() {
        let err = Config::from_lookup(lookup(&[(
            "REMESAS_MAX_UPLOAD_MB",
            &usize::MAX.to_string(),
        )]))
        .unwrap_err();
        assert!(err.to_string().contains("REMESAS_MAX_UPLOAD_MB"));
    }

    #[test]
    fn test_port_override() {
        let config = Config::default().with_port(Some(9000));
        assert_eq!(config.port, 9000);
        assert_eq!(Config::default().with_port(None).port, DEFAULT_PORT);
    }
}
