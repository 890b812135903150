// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! `POST /messages?sessionId=..`: follow-up messages for an open session.

use axum::{
    body::Bytes,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};
use utoipa::IntoParams;

use crate::{error::ApiError, session::SessionError, state::AppState};

#[derive(Debug, Deserialize, IntoParams)]
pub struct MessageQuery {
    /// Id returned when the stream was opened
    #[serde(rename = "sessionId")]
    pub session_id: Option<String>,
}

/// Reasons a message is not accepted.
#[derive(Debug, thiserror::Error)]
pub enum MessageError {
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error("Invalid JSON message: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

impl IntoResponse for MessageError {
    fn into_response(self) -> Response {
        match self {
            MessageError::Session(e) => e.into_response(),
            e @ MessageError::InvalidJson(_) => ApiError::bad_request(e.to_string()).into_response(),
        }
    }
}

/// Deliver a JSON message to the session's stream.
///
/// The session is resolved before the body is parsed, so an unknown id is a
/// 400 whatever the payload.
#[utoipa::path(
    post,
    path = "/messages",
    params(MessageQuery),
    request_body(content = String, description = "JSON-RPC message", content_type = "application/json"),
    tag = "Streaming",
    responses(
        (status = 202, description = "Message queued on the session stream"),
        (status = 400, description = "Unknown sessionId or invalid JSON"),
        (status = 503, description = "Session stream is closed or saturated")
    )
)]
pub async fn post_message(
    State(state): State<AppState>,
    Query(query): Query<MessageQuery>,
    body: Bytes,
) -> Result<impl IntoResponse, MessageError> {
    let session_id = query.session_id.unwrap_or_default();
    let transport = state
        .sessions
        .lookup(&session_id)
        .inspect_err(|_| debug!(%session_id, "Message for unknown session"))?;

    let message: Value = serde_json::from_slice(&body)?;

    transport
        .deliver(message)
        .inspect_err(|e| warn!(%session_id, error = %e, "Message not delivered"))?;

    Ok((StatusCode::ACCEPTED, "Accepted"))
}
