//! In-memory session state.
//!
//! DESIGN
//! ======
//! `Session` starts pending (`loading = true`) and is rehydrated once from
//! the cookie store by `restore`. After that it is only replaced wholesale
//! by `commit` (login) or reset by `clear` (logout, purged credential).
//! `commit` never touches the cookie store; the auth gateway persists the
//! token first and commits second.

use serde::{Deserialize, Serialize};

use crate::cookie_store::CookieStore;

/// Minimal identity marker for the signed-in user.
///
/// The backend may include a richer `user` object in the login response;
/// absent that, only `loggedIn` is known.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionUser {
    #[serde(default = "logged_in_default")]
    pub logged_in: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

fn logged_in_default() -> bool {
    true
}

impl SessionUser {
    /// The `{loggedIn: true}` marker used when no profile is available.
    #[must_use]
    pub fn logged_in() -> Self {
        Self { logged_in: true, name: None, email: None, role: None }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Session {
    #[serde(skip)]
    token: Option<String>,
    user: Option<SessionUser>,
    loading: bool,
}

impl Default for Session {
    fn default() -> Self {
        Self::pending()
    }
}

impl Session {
    /// Session before `restore` has run. Route decisions are suspended.
    #[must_use]
    pub fn pending() -> Self {
        Self { token: None, user: None, loading: true }
    }

    #[must_use]
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    #[must_use]
    pub fn user(&self) -> Option<&SessionUser> {
        self.user.as_ref()
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    /// Rehydrate from the persisted session cookie.
    ///
    /// Only the first call has an effect; later calls return the current
    /// state unchanged.
    pub fn restore(&mut self, store: &dyn CookieStore) -> &Self {
        if !self.loading {
            tracing::debug!("session already restored");
            return self;
        }

        match store.session_token() {
            Some(token) => {
                self.token = Some(token);
                self.user = Some(SessionUser::logged_in());
            }
            None => {
                self.token = None;
                self.user = None;
            }
        }
        self.loading = false;
        tracing::debug!(authenticated = self.is_authenticated(), "session restored");
        self
    }

    /// Replace the session with a freshly authenticated one.
    pub fn commit(&mut self, token: String, user: SessionUser) {
        *self = Self { token: Some(token), user: Some(user), loading: false };
    }

    /// Reset to the unauthenticated shape.
    pub fn clear(&mut self) {
        *self = Self { token: None, user: None, loading: false };
    }
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
