//! # Session Commands
//!
//! Commands the login screen and the token refresher call. Tokens come from
//! the external auth backend; these commands only store and clear them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use ts_rs::TS;

use crate::error::ApiError;
use crate::state::SessionState;
use counterbook_core::{AuthTokens, SessionContext, SessionUser};

/// What the UI learns about the session. Tokens stay in the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct SessionInfo {
    pub authenticated: bool,
    pub user: Option<SessionUser>,
    #[ts(as = "Option<String>")]
    pub expires_at: Option<DateTime<Utc>>,
}

impl SessionInfo {
    fn from_context(session: &SessionContext, now: DateTime<Utc>) -> Self {
        SessionInfo {
            authenticated: session.is_authenticated(now),
            user: session.user().cloned(),
            expires_at: session.tokens.as_ref().and_then(|t| t.expires_at),
        }
    }
}

pub fn get_session(session: &SessionState) -> SessionInfo {
    debug!("get_session command");
    session.with_session(|s| SessionInfo::from_context(s, Utc::now()))
}

/// Stores the user and tokens returned by a successful login.
pub fn sign_in(session: &SessionState, user: SessionUser, tokens: AuthTokens) -> SessionInfo {
    debug!(username = %user.username, "sign_in command");
    info!(user_id = %user.id, "User signed in");

    session.with_session_mut(|s| {
        s.sign_in(user, tokens);
        SessionInfo::from_context(s, Utc::now())
    })
}

pub fn sign_out(session: &SessionState) -> SessionInfo {
    debug!("sign_out command");

    session.with_session_mut(|s| {
        if let Some(user) = s.user() {
            info!(user_id = %user.id, "User signed out");
        }
        s.sign_out();
        SessionInfo::from_context(s, Utc::now())
    })
}

/// Swaps in refreshed tokens for the signed-in user.
///
/// ## Returns
/// * `Err(ApiError)` with code `UNAUTHORIZED` when nobody is signed in
pub fn refresh_session(session: &SessionState, tokens: AuthTokens) -> Result<SessionInfo, ApiError> {
    debug!("refresh_session command");

    session.with_session_mut(|s| {
        s.refresh(tokens)?;
        Ok(SessionInfo::from_context(s, Utc::now()))
    })
}
