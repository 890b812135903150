// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Axum extractor running the [`AuthGate`](super::AuthGate).
//!
//! Use the `Admitted` extractor in handlers that must only run for admitted
//! clients:
//!
//! ```rust,ignore
//! async fn my_handler(Admitted(claims): Admitted) -> impl IntoResponse {
//!     // claims is TokenClaims (empty when auth is disabled)
//! }
//! ```

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};

use super::{AuthError, TokenClaims};
use crate::state::AppState;

/// Claims of a client that passed the gate.
pub struct Admitted(pub TokenClaims);

impl FromRequestParts<AppState> for Admitted {
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        // A header that is not visible ASCII counts as absent.
        let authorization = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok());

        state.auth.admit(authorization).map(Admitted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{AuthGate, AuthorizationPolicy, KeyProvider};
    use crate::testutil::{self, PRIMARY};
    use axum::http::Request;

    fn enabled_state() -> AppState {
        AppState::new(AuthGate::enabled(
            KeyProvider::from_key(testutil::signing_key(&PRIMARY)),
            AuthorizationPolicy::from_csv("sre"),
        ))
    }

    fn parts(authorization: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri("/sse");
        if let Some(value) = authorization {
            builder = builder.header("Authorization", value);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[tokio::test]
    async fn requires_auth_header() {
        let mut parts = parts(None);
        let result = Admitted::from_request_parts(&mut parts, &enabled_state()).await;
        assert!(matches!(result, Err(AuthError::MalformedHeader)));
    }

    #[tokio::test]
    async fn succeeds_with_valid_jwt() {
        let token = testutil::mint(&PRIMARY, testutil::claims(&["sre"]));
        let mut parts = parts(Some(&format!("Bearer {token}")));

        let Admitted(claims) = Admitted::from_request_parts(&mut parts, &enabled_state())
            .await
            .unwrap();
        assert_eq!(claims.subject(), Some("user_123"));
    }

    #[tokio::test]
    async fn disabled_auth_admits_anonymous() {
        let mut parts = parts(None);
        let state = AppState::new(AuthGate::disabled());

        let Admitted(claims) = Admitted::from_request_parts(&mut parts, &state).await.unwrap();
        assert!(claims.is_empty());
    }
}
