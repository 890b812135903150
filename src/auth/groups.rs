// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Group-based authorization.
//!
//! ## Policy
//!
//! - Empty required set: every verified token is authorized, with or without a
//!   `groups` claim
//! - Non-empty required set: the token's `groups` must share at least one
//!   entry with it (any-of, not all-of)

use std::collections::BTreeSet;

use super::claims::TokenClaims;
use super::error::AuthError;

/// Required group names, fixed at startup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthorizationPolicy {
    required: BTreeSet<String>,
}

impl AuthorizationPolicy {
    /// A policy with no restriction.
    pub fn open() -> Self {
        Self::default()
    }

    pub fn new<I, S>(groups: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            required: groups.into_iter().map(Into::into).collect(),
        }
    }

    /// Parse a comma-separated list such as `REQUIRED_GROUPS`.
    ///
    /// Entries are trimmed and blank entries dropped, so `""` and `" , "` are
    /// both the open policy.
    pub fn from_csv(raw: &str) -> Self {
        Self::new(
            raw.split(',')
                .map(str::trim)
                .filter(|group| !group.is_empty()),
        )
    }

    pub fn is_open(&self) -> bool {
        self.required.is_empty()
    }

    pub fn required(&self) -> impl Iterator<Item = &str> {
        self.required.iter().map(String::as_str)
    }

    /// Check if any of `groups` is required.
    pub fn matches_any(&self, groups: &[&str]) -> bool {
        groups.iter().any(|group| self.required.contains(*group))
    }
}

/// Decide whether `claims` satisfy `policy`.
pub fn authorize(claims: &TokenClaims, policy: &AuthorizationPolicy) -> Result<(), AuthError> {
    if policy.is_open() {
        return Ok(());
    }

    let groups = claims.groups().ok_or(AuthError::MissingGroupsClaim)?;
    if !policy.matches_any(&groups) {
        tracing::debug!(
            ?groups,
            required = ?policy.required,
            "Token groups do not intersect required groups"
        );
        return Err(AuthError::InsufficientGroups);
    }
    Ok(())
}
