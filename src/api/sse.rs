// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! `GET /sse`: admitted clients get a long-lived event stream.

use std::convert::Infallible;
use std::time::Duration;

use axum::{
    extract::{FromRequestParts, State},
    http::{header::ACCEPT, request::Parts, HeaderName},
    response::{
        sse::{Event, Sse},
        IntoResponse, Response,
    },
};
use futures::Stream;
use serde_json::{json, Value};
use tokio::sync::mpsc;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::{
    auth::Admitted,
    error::ApiError,
    session::{SessionGuard, SessionTransport},
    state::AppState,
};

/// Response header carrying the id of the new session.
pub const SESSION_ID_HEADER: HeaderName = HeaderName::from_static("mcp-session-id");

/// Messages a session may have queued before delivery fails with 503.
pub const OUTBOUND_BUFFER: usize = 64;

pub const CONNECTED_MESSAGE: &str = "Connected to MCP SSE server";

/// Rejects requests whose `Accept` header does not list `text/event-stream`.
pub struct AcceptsEventStream;

impl<S: Send + Sync> FromRequestParts<S> for AcceptsEventStream {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let accepted = parts
            .headers
            .get_all(ACCEPT)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .flat_map(|value| value.split(','))
            .filter_map(|media| media.split(';').next())
            .any(|media| media.trim().eq_ignore_ascii_case("text/event-stream"));

        if accepted {
            Ok(AcceptsEventStream)
        } else {
            Err(ApiError::not_acceptable())
        }
    }
}

/// Open an SSE session.
///
/// Extractors run in order: the `Accept` check (406) precedes admission (401).
#[utoipa::path(
    get,
    path = "/sse",
    tag = "Streaming",
    responses(
        (status = 200, description = "Event stream opened (text/event-stream)"),
        (status = 401, description = "Missing, invalid or unauthorized token"),
        (status = 405, description = "Method is not GET"),
        (status = 406, description = "Accept header does not allow text/event-stream")
    )
)]
pub async fn connect(
    State(state): State<AppState>,
    _accept: AcceptsEventStream,
    Admitted(claims): Admitted,
) -> Response {
    let (transport, outbound) = SessionTransport::channel(OUTBOUND_BUFFER);
    let session_id = state.sessions.create(transport.clone());
    let guard = state.sessions.guard(session_id.clone());
    transport.activate();

    info!(
        %session_id,
        sub = claims.subject().unwrap_or("-"),
        "SSE connection established"
    );

    let stream = event_stream(
        guard,
        outbound,
        state.heartbeat_interval,
        state.shutdown.clone(),
    );
    ([(SESSION_ID_HEADER, session_id)], Sse::new(stream)).into_response()
}

/// Rejects every method other than GET on `/sse`.
pub async fn method_not_allowed() -> ApiError {
    ApiError::method_not_allowed()
}

/// Stream for one session: a connected notice, then queued messages and
/// heartbeats until the client goes away or the server shuts down.
///
/// The guard lives inside the stream, so dropping the stream unregisters the
/// session and stops the heartbeat at once.
fn event_stream(
    guard: SessionGuard,
    mut outbound: mpsc::Receiver<Value>,
    heartbeat: Duration,
    shutdown: CancellationToken,
) -> impl Stream<Item = Result<Event, Infallible>> {
    async_stream::stream! {
        yield Ok(data(&json!({
            "message": CONNECTED_MESSAGE,
            "sessionId": guard.session_id(),
        })));

        let mut ticker = interval_at(Instant::now() + heartbeat, heartbeat);
        // A stalled consumer gets one ping when it resumes, not a burst.
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            let payload = tokio::select! {
                _ = shutdown.cancelled() => None,
                _ = ticker.tick() => Some(json!({ "ping": chrono::Utc::now().to_rfc3339() })),
                message = outbound.recv() => message,
            };
            match payload {
                Some(payload) => yield Ok(data(&payload)),
                None => break,
            }
        }
    }
}

fn data(payload: &Value) -> Event {
    Event::default().data(payload.to_string())
}
