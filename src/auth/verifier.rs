// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Bearer token verification.
//!
//! Checks run in a fixed order and stop at the first failure:
//!
//! 1. header decodes and names the pinned algorithm (ES256)
//! 2. payload is a claim object
//! 3. `exp` / `nbf` are satisfied
//! 4. signature validates against the [`SigningKey`]
//!
//! Time checks run before the signature check so an expired token is reported
//! as expired whoever signed it.

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, decode_header, Algorithm, Validation};
use serde_json::{Map, Value};

use super::claims::TokenClaims;
use super::error::AuthError;
use super::jwks::SigningKey;

/// The only algorithm accepted. There is no negotiation with the token header.
pub const PINNED_ALGORITHM: Algorithm = Algorithm::ES256;

/// Extract the credential from a `Bearer <token>` Authorization value.
pub fn bearer_token(header: Option<&str>) -> Result<&str, AuthError> {
    let token = header
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .ok_or(AuthError::MalformedHeader)?;

    if token.is_empty() {
        return Err(AuthError::MalformedHeader);
    }
    Ok(token)
}

/// Verifies ES256 tokens against a signing key.
#[derive(Debug, Clone)]
pub struct TokenVerifier {
    validation: Validation,
}

impl Default for TokenVerifier {
    fn default() -> Self {
        Self::new()
    }
}

impl TokenVerifier {
    pub fn new() -> Self {
        let mut validation = Validation::new(PINNED_ALGORITHM);
        // No clock tolerance: a token past its `exp` is rejected.
        validation.leeway = 0;
        validation.validate_nbf = true;
        validation.validate_aud = false;
        validation.required_spec_claims.clear();
        Self { validation }
    }

    /// Verify `token` and return its claims.
    pub fn verify(&self, token: &str, key: &SigningKey) -> Result<TokenClaims, AuthError> {
        let header = decode_header(token).map_err(|_| AuthError::MalformedToken)?;
        if header.alg != PINNED_ALGORITHM {
            return Err(AuthError::AlgorithmMismatch(format!("{:?}", header.alg)));
        }

        let unverified = jsonwebtoken::dangerous::insecure_decode::<Value>(token)
            .map_err(classify)?;
        let claims = TokenClaims::from_value(unverified.claims)?;
        check_validity_window(&claims, chrono::Utc::now().timestamp())?;

        let verified = decode::<Map<String, Value>>(token, key.decoding_key(), &self.validation)
            .map_err(classify)?;

        Ok(TokenClaims::new(verified.claims))
    }
}

/// Check `exp` and `nbf` against `now` (Unix seconds).
fn check_validity_window(claims: &TokenClaims, now: i64) -> Result<(), AuthError> {
    if let Some(exp) = numeric_claim(claims, "exp")? {
        if exp < now {
            return Err(AuthError::Expired);
        }
    }
    if let Some(nbf) = numeric_claim(claims, "nbf")? {
        if nbf > now {
            return Err(AuthError::NotYetValid);
        }
    }
    Ok(())
}

/// Time claims must be whole seconds, matching what the signature decode accepts.
fn numeric_claim(claims: &TokenClaims, name: &str) -> Result<Option<i64>, AuthError> {
    match claims.get(name) {
        None => Ok(None),
        Some(value) => value.as_i64().map(Some).ok_or_else(|| {
            AuthError::MalformedClaims(format!("'{name}' is not an integer timestamp"))
        }),
    }
}

fn classify(e: jsonwebtoken::errors::Error) -> AuthError {
    match e.kind() {
        ErrorKind::InvalidSignature => AuthError::InvalidSignature,
        ErrorKind::ExpiredSignature => AuthError::Expired,
        ErrorKind::ImmatureSignature => AuthError::NotYetValid,
        ErrorKind::InvalidAlgorithm => AuthError::AlgorithmMismatch("header".to_string()),
        ErrorKind::Json(_) | ErrorKind::MissingRequiredClaim(_) => {
            AuthError::MalformedClaims(e.to_string())
        }
        _ => AuthError::MalformedToken,
    }
}
