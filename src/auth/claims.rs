// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Claims extracted from a verified JWT.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::error::AuthError;

/// Claim mapping of a verified token.
///
/// Standard claims (`sub`, `exp`) and the custom `groups` claim are read
/// through accessors; everything else is kept verbatim for logging.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TokenClaims(Map<String, Value>);

impl TokenClaims {
    pub fn new(claims: Map<String, Value>) -> Self {
        Self(claims)
    }

    /// Accept a decoded payload, rejecting anything that is not a JSON object.
    pub fn from_value(payload: Value) -> Result<Self, AuthError> {
        match payload {
            Value::Object(map) => Ok(Self(map)),
            other => Err(AuthError::MalformedClaims(format!(
                "expected a claim object, got {}",
                json_type(&other)
            ))),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    /// Subject (`sub`), used for logging only.
    pub fn subject(&self) -> Option<&str> {
        self.0.get("sub").and_then(Value::as_str)
    }

    /// The `groups` claim, or `None` if it is absent or not a list of strings.
    pub fn groups(&self) -> Option<Vec<&str>> {
        self.0
            .get("groups")?
            .as_array()?
            .iter()
            .map(Value::as_str)
            .collect()
    }

    /// Expiration (`exp`) as a Unix timestamp.
    pub fn expires_at(&self) -> Option<i64> {
        self.0.get("exp").and_then(Value::as_i64)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
