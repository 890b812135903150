// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! JWKS (JSON Web Key Set) fetching.
//!
//! ## Policy
//!
//! - The key set is fetched exactly once, before the server starts listening
//! - The first key of the set is used; there is no fallback to later keys
//! - A failed fetch is fatal: the server never runs with auth enabled and no key
//!
//! ## Usage
//!
//! Build a [`KeyProvider`] with [`KeyProvider::fetch`] in startup and hand it to
//! the [`AuthGate`](super::AuthGate). Tests use [`KeyProvider::from_key`].

use std::time::Duration;

use jsonwebtoken::jwk::{AlgorithmParameters, EllipticCurve, Jwk, JwkSet, KeyAlgorithm};
use jsonwebtoken::{Algorithm, DecodingKey};
use tracing::info;

use super::error::AuthError;
use super::verifier::PINNED_ALGORITHM;

/// Default JWKS request timeout.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Public key material used to verify token signatures.
#[derive(Clone)]
pub struct SigningKey {
    decoding_key: DecodingKey,
    algorithm: Algorithm,
    key_id: Option<String>,
}

impl SigningKey {
    /// Build an ES256 key from base64url-encoded P-256 coordinates.
    pub fn es256_from_components(x: &str, y: &str) -> Result<Self, AuthError> {
        let decoding_key = DecodingKey::from_ec_components(x, y)
            .map_err(|e| AuthError::KeySourceUnavailable(format!("invalid EC key: {e}")))?;
        Ok(Self {
            decoding_key,
            algorithm: Algorithm::ES256,
            key_id: None,
        })
    }

    pub fn decoding_key(&self) -> &DecodingKey {
        &self.decoding_key
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    pub fn key_id(&self) -> Option<&str> {
        self.key_id.as_deref()
    }
}

impl std::fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SigningKey")
            .field("algorithm", &self.algorithm)
            .field("key_id", &self.key_id)
            .finish_non_exhaustive()
    }
}

/// Holder of the signing key fetched from the JWKS endpoint.
///
/// There is no cache expiry and no refresh: one provider serves the whole
/// process lifetime.
#[derive(Debug, Clone)]
pub struct KeyProvider {
    key: SigningKey,
}

impl KeyProvider {
    /// Wrap already-known key material.
    pub fn from_key(key: SigningKey) -> Self {
        Self { key }
    }

    /// Fetch the key set from `jwks_uri` and keep its first key.
    pub async fn fetch(jwks_uri: &str, timeout: Duration) -> Result<Self, AuthError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AuthError::KeySourceUnavailable(format!("HTTP client: {e}")))?;

        let jwks = fetch_jwks(&client, jwks_uri, timeout).await?;
        let jwk = jwks
            .keys
            .first()
            .ok_or_else(|| AuthError::KeySourceUnavailable("no signing keys found in JWKS".into()))?;

        let key = jwk_to_signing_key(jwk)?;
        info!(
            jwks_uri,
            key_count = jwks.keys.len(),
            kid = key.key_id().unwrap_or("-"),
            "Loaded signing key"
        );
        Ok(Self { key })
    }

    /// The signing key. Never changes after construction.
    pub fn key(&self) -> &SigningKey {
        &self.key
    }
}

/// Fetch JWKS from the endpoint.
async fn fetch_jwks(
    client: &reqwest::Client,
    jwks_uri: &str,
    timeout: Duration,
) -> Result<JwkSet, AuthError> {
    let map_err = |e: reqwest::Error| {
        if e.is_timeout() {
            AuthError::KeySourceTimeout(timeout)
        } else {
            AuthError::KeySourceUnavailable(e.to_string())
        }
    };

    let response = client.get(jwks_uri).send().await.map_err(map_err)?;

    if !response.status().is_success() {
        return Err(AuthError::KeySourceUnavailable(format!(
            "HTTP {} from JWKS endpoint",
            response.status()
        )));
    }

    response.json::<JwkSet>().await.map_err(map_err)
}

/// Convert a JWK to a SigningKey usable with the pinned algorithm.
fn jwk_to_signing_key(jwk: &Jwk) -> Result<SigningKey, AuthError> {
    if let Some(alg) = jwk.common.key_algorithm {
        if alg != KeyAlgorithm::ES256 {
            return Err(AuthError::KeySourceUnavailable(format!(
                "first JWKS key uses {alg:?}, expected {PINNED_ALGORITHM:?}"
            )));
        }
    }

    match &jwk.algorithm {
        AlgorithmParameters::EllipticCurve(ec) if ec.curve == EllipticCurve::P256 => {
            let mut key = SigningKey::es256_from_components(&ec.x, &ec.y)?;
            key.key_id = jwk.common.key_id.clone();
            Ok(key)
        }
        AlgorithmParameters::EllipticCurve(ec) => Err(AuthError::KeySourceUnavailable(format!(
            "first JWKS key is on curve {:?}, expected P-256",
            ec.curve
        ))),
        _ => Err(AuthError::KeySourceUnavailable(
            "first JWKS key is not an elliptic-curve key".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{self, PRIMARY};
    use wiremock::{
        matchers::{method, path},
        Mock, MockServer, ResponseTemplate,
    };

    async fn serve_jwks(body: serde_json::Value) -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/.well-known/jwks.json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&server)
            .await;
        server
    }

    fn jwks_uri(server: &MockServer) -> String {
        format!("{}/.well-known/jwks.json", server.uri())
    }

    #[tokio::test]
    async fn fetch_selects_first_key() {
        let server = serve_jwks(serde_json::json!({
            "keys": [testutil::jwk(&PRIMARY, "first"), testutil::jwk(&testutil::SECONDARY, "second")]
        }))
        .await;

        let provider = KeyProvider::fetch(&jwks_uri(&server), DEFAULT_FETCH_TIMEOUT)
            .await
            .unwrap();
        assert_eq!(provider.key().key_id(), Some("first"));
        assert_eq!(provider.key().algorithm(), Algorithm::ES256);
    }

    #[tokio::test]
    async fn empty_key_set_is_unavailable() {
        let server = serve_jwks(serde_json::json!({ "keys": [] })).await;

        let result = KeyProvider::fetch(&jwks_uri(&server), DEFAULT_FETCH_TIMEOUT).await;
        assert!(matches!(result, Err(AuthError::KeySourceUnavailable(_))));
    }

    #[tokio::test]
    async fn http_error_is_unavailable() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let result = KeyProvider::fetch(&jwks_uri(&server), DEFAULT_FETCH_TIMEOUT).await;
        assert!(matches!(result, Err(AuthError::KeySourceUnavailable(msg)) if msg.contains("503")));
    }

    #[tokio::test]
    async fn rsa_first_key_is_rejected() {
        let server = serve_jwks(serde_json::json!({
            "keys": [{
                "kty": "RSA",
                "kid": "rsa-1",
                "alg": "RS256",
                "n": "sXchDaQebHnPiGvyDOAT4saGEUetSyo9MKLOoWFsueri23bOdgWp4Dy1WlUzewbgBHod5pcM9H95GQRV3JDXboIRROSBigeC5yjU1hGzHHyXss8UDprecbAYxknTcQkhslANGRUZmdTOQ5qTRsLAt6BTYuyvVRdhS8exSZEy_c4gs_7svlJJQ4H9_NxsiIoLwAEk7-Q3UXERGYw_75IDrGA84-lA_-Ct4eTlXHBIY2EaV7t7LjJaynVJCpkv4LKjTTAumiGUIuQhrNhZLuF_RJLqHpM2kgWFLU7-VTdL1VbC2tejvcI2BlMkEpk1BzBZI0KQB0GaDWFLN-aEAw3vRw",
                "e": "AQAB"
            }]
        }))
        .await;

        let result = KeyProvider::fetch(&jwks_uri(&server), DEFAULT_FETCH_TIMEOUT).await;
        assert!(matches!(result, Err(AuthError::KeySourceUnavailable(_))));
    }

    #[tokio::test]
    async fn stalled_endpoint_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "keys": [] }))
                    .set_delay(Duration::from_secs(5)),
            )
            .mount(&server)
            .await;

        let result = KeyProvider::fetch(&jwks_uri(&server), Duration::from_millis(200)).await;
        assert!(matches!(result, Err(AuthError::KeySourceTimeout(_))));
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_unavailable() {
        let result =
            KeyProvider::fetch("http://127.0.0.1:9/.well-known/jwks.json", DEFAULT_FETCH_TIMEOUT)
                .await;
        assert!(matches!(result, Err(AuthError::KeySourceUnavailable(_))));
    }

    #[test]
    fn injected_key_is_returned_as_is() {
        let provider = KeyProvider::from_key(testutil::signing_key(&PRIMARY));
        assert_eq!(provider.key().algorithm(), Algorithm::ES256);
        assert_eq!(provider.key().key_id(), None);
    }
}
