// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Session Module
//!
//! Live SSE sessions, keyed by a server-issued session id.
//!
//! A session is registered when an admitted client opens `GET /sse`, looked up
//! by every `POST /messages?sessionId=..`, and removed when its stream is
//! dropped.

pub mod registry;
pub mod transport;

use axum::{
    http::{header::CONTENT_TYPE, StatusCode},
    response::{IntoResponse, Response},
};

pub use registry::{SessionGuard, SessionRegistry};
pub use transport::{SessionState, SessionTransport};

/// Body returned for an unknown or missing session id.
pub const SESSION_NOT_FOUND_MESSAGE: &str = "No transport found for sessionId";

/// Session routing errors.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// No live session with this id (stale, forged or missing)
    #[error("No session with id {0:?}")]
    NotFound(String),
    /// Session stream has closed
    #[error("Session stream is closed")]
    Closed,
    /// Session outbound buffer is full
    #[error("Session outbound buffer is full")]
    Backpressure,
}

impl SessionError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            SessionError::NotFound(_) => StatusCode::BAD_REQUEST,
            SessionError::Closed | SessionError::Backpressure => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl IntoResponse for SessionError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = match self {
            SessionError::NotFound(_) => SESSION_NOT_FOUND_MESSAGE.to_string(),
            other => other.to_string(),
        };
        (
            status,
            [(CONTENT_TYPE, "text/plain; charset=utf-8")],
            body,
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    #[tokio::test]
    async fn not_found_is_plain_text_400() {
        let response = SessionError::NotFound("bogus".into()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            response.headers()[CONTENT_TYPE],
            "text/plain; charset=utf-8"
        );

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(body, SESSION_NOT_FOUND_MESSAGE);
    }

    #[test]
    fn delivery_failures_are_503() {
        assert_eq!(SessionError::Closed.status_code(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(SessionError::Backpressure.status_code(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
