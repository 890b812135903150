// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authentication errors.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Reason shown for every token verification failure.
///
/// Signature, expiry and algorithm problems are deliberately reported with the
/// same text so a caller cannot tell which check rejected a forged token.
pub const INVALID_TOKEN_MESSAGE: &str = "Invalid or expired token";

/// Authentication and authorization failures.
///
/// The variant is kept for logs (see [`AuthError::error_code`]); the HTTP
/// response only carries [`AuthError::public_message`].
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// JWKS endpoint unreachable, rejected the request, or returned no usable key
    #[error("JWKS endpoint unavailable: {0}")]
    KeySourceUnavailable(String),
    /// JWKS request exceeded the configured timeout
    #[error("JWKS endpoint did not answer within {0:?}")]
    KeySourceTimeout(std::time::Duration),
    /// No `Bearer <token>` credential in the Authorization header
    #[error("Authorization header is missing or not a bearer credential")]
    MalformedHeader,
    /// Token is not a structurally valid JWT
    #[error("Token is malformed")]
    MalformedToken,
    /// Token signature is invalid
    #[error("Token signature is invalid")]
    InvalidSignature,
    /// Token was signed with an algorithm other than the pinned one
    #[error("Token algorithm {0} is not accepted")]
    AlgorithmMismatch(String),
    /// Token has expired
    #[error("Token has expired")]
    Expired,
    /// Token is not yet valid
    #[error("Token is not yet valid")]
    NotYetValid,
    /// Payload is not a claim object
    #[error("Token claims are malformed: {0}")]
    MalformedClaims(String),
    /// Policy requires groups but the token has no usable `groups` claim
    #[error("Token has no 'groups' claim")]
    MissingGroupsClaim,
    /// None of the token's groups is in the required set
    #[error("Token groups do not intersect the required groups")]
    InsufficientGroups,
}

#[derive(Serialize)]
struct AuthErrorBody {
    message: &'static str,
}

impl AuthError {
    /// Get the error code for this error.
    pub fn error_code(&self) -> &'static str {
        match self {
            AuthError::KeySourceUnavailable(_) => "key_source_unavailable",
            AuthError::KeySourceTimeout(_) => "key_source_timeout",
            AuthError::MalformedHeader => "malformed_header",
            AuthError::MalformedToken => "malformed_token",
            AuthError::InvalidSignature => "invalid_signature",
            AuthError::AlgorithmMismatch(_) => "algorithm_mismatch",
            AuthError::Expired => "token_expired",
            AuthError::NotYetValid => "token_not_yet_valid",
            AuthError::MalformedClaims(_) => "malformed_claims",
            AuthError::MissingGroupsClaim => "missing_groups_claim",
            AuthError::InsufficientGroups => "insufficient_groups",
        }
    }

    /// Message sent to the client.
    pub fn public_message(&self) -> &'static str {
        match self {
            AuthError::MalformedHeader => "Missing or malformed token",
            AuthError::MissingGroupsClaim => "Missing 'groups' claim",
            AuthError::InsufficientGroups => "User does not belong to any required group",
            AuthError::KeySourceUnavailable(_)
            | AuthError::KeySourceTimeout(_)
            | AuthError::MalformedToken
            | AuthError::InvalidSignature
            | AuthError::AlgorithmMismatch(_)
            | AuthError::Expired
            | AuthError::NotYetValid
            | AuthError::MalformedClaims(_) => INVALID_TOKEN_MESSAGE,
        }
    }

    /// Whether this error can only happen while loading keys at startup.
    pub fn is_key_source(&self) -> bool {
        matches!(
            self,
            AuthError::KeySourceUnavailable(_) | AuthError::KeySourceTimeout(_)
        )
    }

    /// Get the HTTP status code for this error.
    ///
    /// Every admission failure is a 401, whatever the internal kind.
    pub fn status_code(&self) -> StatusCode {
        StatusCode::UNAUTHORIZED
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(AuthErrorBody {
            message: self.public_message(),
        });
        (status, body).into_response()
    }
}
