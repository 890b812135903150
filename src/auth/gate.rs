// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Admission decision for incoming connections.

use std::sync::Arc;

use tracing::{error, info, warn};

use super::claims::TokenClaims;
use super::error::AuthError;
use super::groups::{authorize, AuthorizationPolicy};
use super::jwks::KeyProvider;
use super::verifier::{bearer_token, TokenVerifier};

/// Composes key lookup, token verification and group authorization.
///
/// The variant is the one place where authentication is switched off; call
/// sites never check `JWT_AUTH_ENABLED` themselves.
#[derive(Debug, Clone)]
pub enum AuthGate {
    /// Every request is admitted with empty claims.
    Disabled,
    /// Requests must carry a valid bearer token that satisfies the policy.
    Enabled {
        keys: Arc<KeyProvider>,
        verifier: TokenVerifier,
        policy: Arc<AuthorizationPolicy>,
    },
}

impl AuthGate {
    pub fn disabled() -> Self {
        AuthGate::Disabled
    }

    pub fn enabled(keys: KeyProvider, policy: AuthorizationPolicy) -> Self {
        AuthGate::Enabled {
            keys: Arc::new(keys),
            verifier: TokenVerifier::new(),
            policy: Arc::new(policy),
        }
    }

    pub fn is_enabled(&self) -> bool {
        matches!(self, AuthGate::Enabled { .. })
    }

    /// Admit or reject a request given its raw `Authorization` header value.
    pub fn admit(&self, authorization: Option<&str>) -> Result<TokenClaims, AuthError> {
        let AuthGate::Enabled {
            keys,
            verifier,
            policy,
        } = self
        else {
            return Ok(TokenClaims::default());
        };

        let result = bearer_token(authorization)
            .and_then(|token| verifier.verify(token, keys.key()))
            .and_then(|claims| authorize(&claims, policy).map(|()| claims));

        match &result {
            Ok(claims) => info!(sub = claims.subject().unwrap_or("-"), "Authenticated client"),
            Err(e) if e.is_key_source() => {
                error!(error_code = e.error_code(), error = %e, "Signing key unavailable")
            }
            Err(e) => warn!(error_code = e.error_code(), error = %e, "Rejected client"),
        }
        result
    }
}
