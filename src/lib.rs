// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! MCP SSE Gateway - JWT-gated Server-Sent Events endpoint
//!
//! Clients open `GET /sse` with a bearer token. The token is verified against
//! a key fetched from a JWKS endpoint at startup and checked against a
//! required-group policy; admitted clients get a session id and a stream.
//! Follow-up messages are posted to `/messages?sessionId=..`.
//!
//! ## Modules
//!
//! - `api` - HTTP handlers (Axum)
//! - `auth` - JWKS key loading, token verification, group authorization
//! - `session` - Registry of live SSE sessions
//! - `config` - Environment configuration
//! - `telemetry` - Logging setup

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod session;
pub mod state;
pub mod telemetry;

#[cfg(test)]
mod testutil;
