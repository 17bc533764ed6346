//! # Session State
//!
//! Holds the signed-in operator and their tokens for the lifetime of the
//! process. Commands ask it for the current user instead of reading any
//! global auth store.
//!
//! ```text
//! sign_in ──► SessionContext { user, tokens } ──► require_user(now)
//!                     │                                  │
//!                  refresh                     Unauthenticated / SessionExpired
//!                     │
//!                  sign_out ──► empty
//! ```

use std::sync::{Arc, Mutex};

use chrono::Utc;
use counterbook_core::{CoreResult, SessionContext, SessionUser};

#[derive(Debug, Clone, Default)]
pub struct SessionState {
    session: Arc<Mutex<SessionContext>>,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Executes a function with read access to the session.
    pub fn with_session<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&SessionContext) -> R,
    {
        let session = self.session.lock().unwrap_or_else(|e| e.into_inner());
        f(&session)
    }

    /// Executes a function with write access to the session.
    pub fn with_session_mut<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut SessionContext) -> R,
    {
        let mut session = self.session.lock().unwrap_or_else(|e| e.into_inner());
        f(&mut session)
    }

    /// The current user, if the session is valid right now.
    pub fn require_user(&self) -> CoreResult<SessionUser> {
        self.with_session(|s| s.require_user(Utc::now()).cloned())
    }
}
