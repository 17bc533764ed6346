//! # Session Context
//!
//! Who is signed in and which backend tokens they hold.
//!
//! The context is an ordinary value passed to whoever needs it; the admin
//! app keeps one behind a mutex. Tokens are issued by the external auth
//! backend, Counterbook only stores them and checks their expiry.
//!
//! ## Lifecycle
//! ```text
//! ┌───────────────┐  sign_in(user, tokens)  ┌────────────────┐
//! │  Signed out   │ ───────────────────────►│   Signed in    │◄──┐
//! │ user = None   │                         │ user = Some    │   │ refresh(tokens)
//! │ tokens = None │◄─────────────────────── │ tokens = Some  │───┘
//! └───────────────┘       sign_out()        └────────────────┘
//!                                                  │
//!                                   now >= expires_at
//!                                                  ▼
//!                                  access_token(now) = SessionExpired
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};

/// The signed-in operator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct SessionUser {
    pub id: String,
    pub username: String,
    pub display_name: String,
}

/// Tokens handed out by the auth backend at login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct AuthTokens {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// `None` means the token does not expire.
    #[serde(default)]
    #[ts(as = "Option<String>")]
    pub expires_at: Option<DateTime<Utc>>,
}

impl AuthTokens {
    /// Whether the access token is past its expiry at `now`.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|exp| exp <= now)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct SessionContext {
    pub user: Option<SessionUser>,
    /// Tokens are never sent back to the UI.
    #[serde(skip)]
    #[ts(skip)]
    pub tokens: Option<AuthTokens>,
}

impl SessionContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores the user and tokens, replacing any previous session.
    pub fn sign_in(&mut self, user: SessionUser, tokens: AuthTokens) {
        self.user = Some(user);
        self.tokens = Some(tokens);
    }

    /// Clears user and tokens. Signing out twice is a no-op.
    pub fn sign_out(&mut self) {
        self.user = None;
        self.tokens = None;
    }

    /// Swaps in freshly issued tokens for the current user.
    pub fn refresh(&mut self, tokens: AuthTokens) -> CoreResult<()> {
        if self.user.is_none() {
            return Err(CoreError::Unauthenticated);
        }
        self.tokens = Some(tokens);
        Ok(())
    }

    pub fn user(&self) -> Option<&SessionUser> {
        self.user.as_ref()
    }

    /// Signed in with a token that has not expired at `now`.
    pub fn is_authenticated(&self, now: DateTime<Utc>) -> bool {
        self.access_token(now).is_ok()
    }

    /// The access token to attach to backend calls.
    pub fn access_token(&self, now: DateTime<Utc>) -> CoreResult<&str> {
        let tokens = match (&self.user, &self.tokens) {
            (Some(_), Some(tokens)) => tokens,
            _ => return Err(CoreError::Unauthenticated),
        };
        if tokens.is_expired(now) {
            return Err(CoreError::SessionExpired);
        }
        Ok(&tokens.access_token)
    }

    /// The signed-in user, provided the session is still valid at `now`.
    pub fn require_user(&self, now: DateTime<Utc>) -> CoreResult<&SessionUser> {
        self.access_token(now)?;
        self.user.as_ref().ok_or(CoreError::Unauthenticated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn admin() -> SessionUser {
        SessionUser {
            id: "u-1".to_string(),
            username: "admin01".to_string(),
            display_name: "Admin".to_string(),
        }
    }

    fn tokens(expires_at: Option<DateTime<Utc>>) -> AuthTokens {
        AuthTokens {
            access_token: "access-1".to_string(),
            refresh_token: Some("refresh-1".to_string()),
            expires_at,
        }
    }

    #[test]
    fn test_signed_out_by_default() {
        let session = SessionContext::new();
        let now = Utc::now();
        assert!(!session.is_authenticated(now));
        assert!(matches!(
            session.access_token(now),
            Err(CoreError::Unauthenticated)
        ));
    }

    #[test]
    fn test_sign_in_and_out() {
        let now = Utc::now();
        let mut session = SessionContext::new();
        session.sign_in(admin(), tokens(None));

        assert!(session.is_authenticated(now));
        assert_eq!(session.access_token(now).unwrap(), "access-1");
        assert_eq!(session.require_user(now).unwrap().username, "admin01");

        session.sign_out();
        assert!(session.user().is_none());
        assert!(!session.is_authenticated(now));
        session.sign_out();
    }

    #[test]
    fn test_expiry() {
        let now = Utc::now();
        let mut session = SessionContext::new();
        session.sign_in(admin(), tokens(Some(now + Duration::minutes(5))));
        assert!(session.is_authenticated(now));

        let later = now + Duration::minutes(5);
        assert!(matches!(
            session.access_token(later),
            Err(CoreError::SessionExpired)
        ));
        assert!(session.require_user(later).is_err());
    }

    #[test]
    fn test_refresh_requires_user() {
        let now = Utc::now();
        let mut session = SessionContext::new();
        assert!(matches!(
            session.refresh(tokens(None)),
            Err(CoreError::Unauthenticated)
        ));

        session.sign_in(admin(), tokens(Some(now - Duration::seconds(1))));
        assert!(!session.is_authenticated(now));

        let fresh = AuthTokens {
            access_token: "access-2".to_string(),
            ..tokens(Some(now + Duration::hours(1)))
        };
        session.refresh(fresh).unwrap();
        assert_eq!(session.access_token(now).unwrap(), "access-2");
    }

    #[test]
    fn test_tokens_not_serialized() {
        let mut session = SessionContext::new();
        session.sign_in(admin(), tokens(None));
        let json = serde_json::to_value(&session).unwrap();
        assert_eq!(json["user"]["displayName"], "Admin");
        assert!(json.get("tokens").is_none());
    }
}
