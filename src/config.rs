// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! This module defines environment variable names and default values used
//! throughout the application. Configuration is loaded from the environment
//! once at startup.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `3000` |
//! | `JWT_AUTH_ENABLED` | Require a bearer token on `/sse` (`true` to enable) | `false` |
//! | `REQUIRED_GROUPS` | Comma-separated groups, any of which admits a token | empty (no restriction) |
//! | `JWKS_URI` | JWKS endpoint for signature verification | `https://your-console-url/.well-known/jwks.json` |
//! | `JWKS_TIMEOUT_SECS` | Timeout of the startup JWKS request | `10` |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use url::Url;

use crate::auth::AuthorizationPolicy;
use crate::telemetry::LogFormat;

pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";
pub const JWT_AUTH_ENABLED_ENV: &str = "JWT_AUTH_ENABLED";
pub const REQUIRED_GROUPS_ENV: &str = "REQUIRED_GROUPS";
pub const JWKS_URI_ENV: &str = "JWKS_URI";
pub const JWKS_TIMEOUT_SECS_ENV: &str = "JWKS_TIMEOUT_SECS";
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_JWKS_URI: &str = "https://your-console-url/.well-known/jwks.json";
pub const DEFAULT_JWKS_TIMEOUT_SECS: u64 = 10;

/// Interval between heartbeat frames on an open stream.
pub const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(15);

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{name} must be {expected}, got {value:?}")]
    Invalid {
        name: &'static str,
        expected: &'static str,
        value: String,
    },
}

impl ConfigError {
    fn invalid(name: &'static str, expected: &'static str, value: &str) -> Self {
        ConfigError::Invalid {
            name,
            expected,
            value: value.to_string(),
        }
    }
}

/// Process configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: SocketAddr,
    pub auth_enabled: bool,
    pub required_groups: AuthorizationPolicy,
    pub jwks_uri: Url,
    pub jwks_timeout: Duration,
    pub log_format: LogFormat,
    pub heartbeat_interval: Duration,
}

impl Config {
    /// Load from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load using `lookup` to read variables.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = lookup(HOST_ENV).unwrap_or_else(|| DEFAULT_HOST.to_string());
        let ip: IpAddr = host
            .parse()
            .map_err(|_| ConfigError::invalid(HOST_ENV, "an IP address", &host))?;

        let port = match lookup(PORT_ENV) {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .map_err(|_| ConfigError::invalid(PORT_ENV, "a port number", &raw))?,
            None => DEFAULT_PORT,
        };

        let jwks_raw = lookup(JWKS_URI_ENV).unwrap_or_else(|| DEFAULT_JWKS_URI.to_string());
        let jwks_uri = Url::parse(&jwks_raw)
            .ok()
            .filter(|url| matches!(url.scheme(), "http" | "https"))
            .ok_or_else(|| ConfigError::invalid(JWKS_URI_ENV, "an http(s) URL", &jwks_raw))?;

        let jwks_timeout = match lookup(JWKS_TIMEOUT_SECS_ENV) {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs)
                .ok_or_else(|| {
                    ConfigError::invalid(JWKS_TIMEOUT_SECS_ENV, "a positive number of seconds", &raw)
                })?,
            None => Duration::from_secs(DEFAULT_JWKS_TIMEOUT_SECS),
        };

        let log_format = match lookup(LOG_FORMAT_ENV) {
            Some(raw) => raw
                .parse()
                .map_err(|_| ConfigError::invalid(LOG_FORMAT_ENV, "`json` or `pretty`", &raw))?,
            None => LogFormat::default(),
        };

        Ok(Self {
            bind_addr: SocketAddr::new(ip, port),
            auth_enabled: lookup(JWT_AUTH_ENABLED_ENV)
                .is_some_and(|raw| raw.trim().eq_ignore_ascii_case("true")),
            required_groups: AuthorizationPolicy::from_csv(
                &lookup(REQUIRED_GROUPS_ENV).unwrap_or_default(),
            ),
            jwks_uri,
            jwks_timeout,
            log_format,
            heartbeat_interval: HEARTBEAT_INTERVAL,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn defaults() {
        let config = load(&[]).unwrap();
        assert_eq!(config.bind_addr.port(), 3000);
        assert_eq!(config.bind_addr.ip().to_string(), "0.0.0.0");
        assert!(!config.auth_enabled);
        assert!(config.required_groups.is_open());
        assert_eq!(config.jwks_uri.as_str(), DEFAULT_JWKS_URI);
        assert_eq!(config.jwks_timeout, Duration::from_secs(10));
        assert_eq!(config.log_format, LogFormat::Pretty);
        assert_eq!(config.heartbeat_interval, Duration::from_secs(15));
    }

    #[test]
    fn auth_flag_only_accepts_true() {
        assert!(load(&[(JWT_AUTH_ENABLED_ENV, "true")]).unwrap().auth_enabled);
        assert!(load(&[(JWT_AUTH_ENABLED_ENV, "TRUE")]).unwrap().auth_enabled);
        assert!(!load(&[(JWT_AUTH_ENABLED_ENV, "1")]).unwrap().auth_enabled);
        assert!(!load(&[(JWT_AUTH_ENABLED_ENV, "")]).unwrap().auth_enabled);
    }

    #[test]
    fn empty_required_groups_is_open() {
        let config = load(&[(REQUIRED_GROUPS_ENV, "")]).unwrap();
        assert!(config.required_groups.is_open());
    }

    #[test]
    fn required_groups_are_parsed() {
        let config = load(&[(REQUIRED_GROUPS_ENV, "sre,ops")]).unwrap();
        assert_eq!(config.required_groups, AuthorizationPolicy::new(["sre", "ops"]));
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert!(load(&[(PORT_ENV, "http")]).is_err());
        assert!(load(&[(PORT_ENV, "70000")]).is_err());
        assert!(load(&[(JWKS_URI_ENV, "not a url")]).is_err());
        assert!(load(&[(JWKS_URI_ENV, "file:///etc/jwks.json")]).is_err());
        assert!(load(&[(JWKS_TIMEOUT_SECS_ENV, "0")]).is_err());
        assert!(load(&[(LOG_FORMAT_ENV, "xml")]).is_err());
        assert!(load(&[(HOST_ENV, "example.com")]).is_err());
    }

    #[test]
    fn custom_values() {
        let config = load(&[
            (HOST_ENV, "127.0.0.1"),
            (PORT_ENV, "8080"),
            (JWKS_URI_ENV, "http://localhost:9000/jwks"),
            (JWKS_TIMEOUT_SECS_ENV, "3"),
            (LOG_FORMAT_ENV, "json"),
        ])
        .unwrap();
        assert_eq!(config.bind_addr.to_string(), "127.0.0.1:8080");
        assert_eq!(config.jwks_uri.as_str(), "http://localhost:9000/jwks");
        assert_eq!(config.jwks_timeout, Duration::from_secs(3));
        assert_eq!(config.log_format, LogFormat::Json);
    }
}
