// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Handle to one open SSE stream.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde_json::Value;
use tokio::sync::mpsc;

use super::SessionError;

/// Lifecycle of a session. `Closed` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Registered, stream not yet started
    Created,
    /// Stream is open
    Active,
    /// Stream dropped
    Closed,
}

struct Inner {
    sender: mpsc::Sender<Value>,
    state: Mutex<SessionState>,
    opened_at: DateTime<Utc>,
}

/// Cloneable handle used to push messages onto a session's stream.
#[derive(Clone)]
pub struct SessionTransport {
    inner: Arc<Inner>,
}

impl SessionTransport {
    /// Create a transport and the receiving end the stream reads from.
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<Value>) {
        let (sender, receiver) = mpsc::channel(capacity);
        let transport = Self {
            inner: Arc::new(Inner {
                sender,
                state: Mutex::new(SessionState::Created),
                opened_at: Utc::now(),
            }),
        };
        (transport, receiver)
    }

    pub fn state(&self) -> SessionState {
        *self.inner.state.lock()
    }

    pub fn opened_at(&self) -> DateTime<Utc> {
        self.inner.opened_at
    }

    /// `Created` -> `Active`. Returns false for any other starting state.
    pub fn activate(&self) -> bool {
        let mut state = self.inner.state.lock();
        if *state == SessionState::Created {
            *state = SessionState::Active;
            true
        } else {
            false
        }
    }

    /// Move to `Closed`. Returns false if it already was.
    pub fn close(&self) -> bool {
        let mut state = self.inner.state.lock();
        let was_open = *state != SessionState::Closed;
        *state = SessionState::Closed;
        was_open
    }

    /// Queue a message for the stream without waiting.
    pub fn deliver(&self, message: Value) -> Result<(), SessionError> {
        if self.state() == SessionState::Closed {
            return Err(SessionError::Closed);
        }
        self.inner.sender.try_send(message).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => SessionError::Backpressure,
            mpsc::error::TrySendError::Closed(_) => SessionError::Closed,
        })
    }
}

impl std::fmt::Debug for SessionTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionTransport")
            .field("state", &self.state())
            .field("opened_at", &self.inner.opened_at)
            .finish()
    }
}
