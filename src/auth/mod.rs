// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authentication Module
//!
//! JWT admission for the SSE endpoint.
//!
//! ## Auth Flow
//!
//! 1. At startup the server fetches the JWKS once and keeps its first key
//! 2. Client opens `GET /sse` with `Authorization: Bearer <JWT>`
//! 3. Server:
//!    - Verifies the ES256 signature and `exp` / `nbf`
//!    - Checks the `groups` claim against `REQUIRED_GROUPS` (any-of)
//!    - Logs `sub` and opens the stream
//!
//! ## Security
//!
//! - Only ES256 is accepted; the token header cannot select the algorithm
//! - No clock skew tolerance
//! - Verification failures share one public message

pub mod claims;
pub mod error;
pub mod extractor;
pub mod gate;
pub mod groups;
pub mod jwks;
pub mod verifier;

pub use claims::TokenClaims;
pub use error::AuthError;
pub use extractor::Admitted;
pub use gate::AuthGate;
pub use groups::{authorize, AuthorizationPolicy};
pub use jwks::{KeyProvider, SigningKey};
pub use verifier::{bearer_token, TokenVerifier, PINNED_ALGORITHM};
