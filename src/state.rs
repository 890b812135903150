// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::auth::{AuthGate, KeyProvider};
use crate::config::{Config, HEARTBEAT_INTERVAL};
use crate::error::StartupError;
use crate::session::SessionRegistry;

#[derive(Clone)]
pub struct AppState {
    pub auth: AuthGate,
    pub sessions: SessionRegistry,
    pub heartbeat_interval: Duration,
    /// Cancelled on graceful shutdown; ends every open stream.
    pub shutdown: CancellationToken,
}

impl AppState {
    pub fn new(auth: AuthGate) -> Self {
        Self {
            auth,
            sessions: SessionRegistry::new(),
            heartbeat_interval: HEARTBEAT_INTERVAL,
            shutdown: CancellationToken::new(),
        }
    }

    pub fn with_heartbeat_interval(mut self, interval: Duration) -> Self {
        self.heartbeat_interval = interval;
        self
    }

    /// Build the state from configuration.
    ///
    /// With auth enabled the JWKS is fetched here; any failure is returned so
    /// the caller can abort before listening.
    pub async fn bootstrap(config: &Config) -> Result<Self, StartupError> {
        let auth = if config.auth_enabled {
            let keys = KeyProvider::fetch(config.jwks_uri.as_str(), config.jwks_timeout).await?;
            info!(
                required_groups = ?config.required_groups.required().collect::<Vec<_>>(),
                "JWT authentication enabled"
            );
            AuthGate::enabled(keys, config.required_groups.clone())
        } else {
            warn!("JWT authentication disabled; /sse accepts anonymous clients");
            AuthGate::disabled()
        };

        Ok(Self::new(auth).with_heartbeat_interval(config.heartbeat_interval))
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(AuthGate::disabled())
    }
}
