// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::CorsLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::state::AppState;

pub mod health;
pub mod messages;
pub mod sse;

pub fn router(state: AppState) -> Router {
    let routes = Router::new()
        .route(
            "/sse",
            // HEAD would otherwise be served by the GET handler.
            get(sse::connect)
                .head(sse::method_not_allowed)
                .fallback(sse::method_not_allowed),
        )
        .route("/messages", post(messages::post_message))
        .route("/health", get(health::health))
        .route("/health/live", get(health::liveness))
        .with_state(state);

    Router::new()
        .merge(routes)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(CorsLayer::permissive())
}

#[derive(OpenApi)]
#[openapi(
    paths(
        sse::connect,
        messages::post_message,
        health::health,
        health::liveness
    ),
    components(
        schemas(
            health::ReadyResponse,
            health::HealthChecks,
            health::HealthResponse
        )
    ),
    tags(
        (name = "Streaming", description = "SSE sessions and follow-up messages"),
        (name = "Health", description = "Liveness and status")
    )
)]
struct ApiDoc;
