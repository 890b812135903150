// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Session id -> transport map.
//!
//! The runtime is multi-threaded, so every operation takes the lock; none
//! holds it across an await point.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, info};
use uuid::Uuid;

use super::{SessionError, SessionTransport};

/// Registry of live sessions.
#[derive(Clone, Default)]
pub struct SessionRegistry {
    sessions: Arc<RwLock<HashMap<String, SessionTransport>>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `transport` under a fresh id and return the id.
    ///
    /// Ids are random UUIDs; uniqueness comes from the generator, existing
    /// entries are not consulted.
    pub fn create(&self, transport: SessionTransport) -> String {
        let session_id = Uuid::new_v4().to_string();
        self.sessions.write().insert(session_id.clone(), transport);
        debug!(%session_id, "Session registered");
        session_id
    }

    /// Find the transport of a live session.
    pub fn lookup(&self, session_id: &str) -> Result<SessionTransport, SessionError> {
        self.sessions
            .read()
            .get(session_id)
            .cloned()
            .ok_or_else(|| SessionError::NotFound(session_id.to_string()))
    }

    /// Remove a session and close its transport.
    ///
    /// Removing an unknown id does nothing and returns `None`.
    pub fn remove(&self, session_id: &str) -> Option<SessionTransport> {
        let removed = self.sessions.write().remove(session_id);
        if let Some(transport) = &removed {
            transport.close();
            info!(%session_id, "SSE connection closed");
        }
        removed
    }

    /// Guard that removes `session_id` when dropped.
    pub fn guard(&self, session_id: impl Into<String>) -> SessionGuard {
        SessionGuard {
            registry: self.clone(),
            session_id: session_id.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.sessions.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.read().is_empty()
    }
}

impl std::fmt::Debug for SessionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionRegistry")
            .field("session_count", &self.len())
            .finish()
    }
}

/// Removes its session from the registry on drop.
///
/// Owned by the SSE stream, so a client disconnect or server shutdown
/// unregisters the session in the same step that ends the stream.
#[derive(Debug)]
pub struct SessionGuard {
    registry: SessionRegistry,
    session_id: String,
}

impl SessionGuard {
    pub fn session_id(&self) -> &str {
        &self.session_id
    }
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        self.registry.remove(&self.session_id);
    }
}
