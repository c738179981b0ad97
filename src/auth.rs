//! Auth gateway: login, logout, signup, and guarded navigation.
//!
//! DESIGN
//! ======
//! `AuthGateway` is the single owner of the in-memory [`Session`]. Consumers
//! get snapshots via [`AuthGateway::session`] and never mutate it directly.
//!
//! Ordering on login is persist-then-commit: the cookie store is written
//! before the session is replaced. Logout deletes the cookie and clears the
//! session locally without a network round-trip.

use std::sync::{PoisonError, RwLock, RwLockWriteGuard};

use reqwest::Method;
use serde::Serialize;
use serde_json::Value;

use crate::cookie_store::{SESSION_COOKIE, SESSION_TTL_DAYS};
use crate::error::{ApiError, AuthError, ValidationError};
use crate::guard::{self, GuardDecision, Route};
use crate::pipeline::{ApiClient, Payload};
use crate::session::{Session, SessionUser};

pub const MIN_PASSWORD_LEN: usize = 6;
pub const SIGNUP_SUCCESS_MESSAGE: &str = "Signup successful!";
pub const SIGNUP_FALLBACK_MESSAGE: &str = "Something went wrong!";

/// Response fields that may carry the token, in priority order.
const TOKEN_FIELDS: [&str; 4] = ["token", "accessToken", "authToken", "jwt"];

#[derive(Clone, Serialize, PartialEq, Eq)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials").field("email", &self.email).finish_non_exhaustive()
    }
}

impl Credentials {
    #[must_use]
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self { email: email.into(), password: password.into() }
    }

    /// Normalized copy ready to send.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] for a malformed email or empty password.
    pub fn validated(&self) -> Result<Self, ValidationError> {
        let email = normalize_email(&self.email).ok_or(ValidationError::InvalidEmail)?;
        if self.password.is_empty() {
            return Err(ValidationError::Required("password"));
        }
        Ok(Self { email, password: self.password.clone() })
    }
}

#[derive(Clone, Serialize, PartialEq, Eq)]
pub struct SignupRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for SignupRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignupRequest")
            .field("name", &self.name)
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

impl SignupRequest {
    /// # Errors
    ///
    /// Returns a [`ValidationError`] for a blank name, malformed email, or
    /// a password shorter than [`MIN_PASSWORD_LEN`].
    pub fn validated(&self) -> Result<Self, ValidationError> {
        let name = match &self.name {
            Some(name) if name.trim().is_empty() => return Err(ValidationError::Required("name")),
            Some(name) => Some(name.trim().to_owned()),
            None => None,
        };
        let email = normalize_email(&self.email).ok_or(ValidationError::InvalidEmail)?;
        if self.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(ValidationError::PasswordTooShort(MIN_PASSWORD_LEN));
        }
        Ok(Self { name, email, password: self.password.clone() })
    }
}

#[must_use]
pub fn normalize_email(email: &str) -> Option<String> {
    let normalized = email.trim().to_ascii_lowercase();
    let (local, domain) = normalized.split_once('@')?;
    if local.is_empty() || domain.is_empty() || domain.contains('@') {
        return None;
    }
    Some(normalized)
}

/// First non-empty token field in a login response body.
#[must_use]
pub fn extract_token(body: &Value) -> Option<String> {
    TOKEN_FIELDS
        .iter()
        .find_map(|field| body.get(*field).and_then(Value::as_str).filter(|t| !t.is_empty()))
        .map(ToOwned::to_owned)
}

fn extract_user(body: &Value) -> SessionUser {
    body.get("user")
        .filter(|user| user.is_object())
        .and_then(|user| serde_json::from_value(user.clone()).ok())
        .unwrap_or_else(SessionUser::logged_in)
}

#[derive(Debug)]
pub struct AuthGateway {
    api: ApiClient,
    session: RwLock<Session>,
}

impl AuthGateway {
    /// New gateway with a pending session. Call [`AuthGateway::restore`]
    /// before the first navigation.
    #[must_use]
    pub fn new(api: ApiClient) -> Self {
        Self { api, session: RwLock::new(Session::pending()) }
    }

    #[must_use]
    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    /// Snapshot of the current session.
    #[must_use]
    pub fn session(&self) -> Session {
        self.session.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    fn session_mut(&self) -> RwLockWriteGuard<'_, Session> {
        self.session.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Rehydrate the session from the cookie store (first call only).
    pub fn restore(&self) -> Session {
        self.session_mut().restore(self.api.store().as_ref()).clone()
    }

    /// Authenticate against `POST /login`.
    ///
    /// On success the token is persisted for [`SESSION_TTL_DAYS`] and then
    /// committed to the session. Navigation afterwards is the caller's job.
    ///
    /// # Errors
    ///
    /// - [`AuthError::Validation`] before any request is sent
    /// - [`AuthError::Api`] for transport failures and non-2xx statuses
    /// - [`AuthError::MissingToken`] for a 2xx response without a token
    pub async fn login(&self, credentials: &Credentials) -> Result<SessionUser, AuthError> {
        let credentials = credentials.validated()?;
        let body = serde_json::to_value(&credentials).map_err(ApiError::from)?;
        let body = self.api.request(Method::POST, "/login", &[], Payload::Json(body)).await?;

        let Some(token) = extract_token(&body) else {
            tracing::warn!(email = %credentials.email, "login response missing token");
            return Err(AuthError::MissingToken);
        };
        let user = extract_user(&body);

        self.api.store().write(SESSION_COOKIE, &token, SESSION_TTL_DAYS);
        self.session_mut().commit(token, user.clone());
        tracing::info!(email = %credentials.email, "login succeeded");
        Ok(user)
    }

    /// End the local session. Idempotent; no network call.
    pub fn logout(&self) {
        self.api.store().delete(SESSION_COOKIE);
        self.session_mut().clear();
        tracing::info!("logged out");
    }

    /// Create an account via `POST /signup`, returning the server's message.
    ///
    /// # Errors
    ///
    /// Validation failures, transport failures and non-2xx statuses.
    pub async fn signup(&self, request: &SignupRequest) -> Result<String, ApiError> {
        let request = request.validated()?;
        let body = serde_json::to_value(&request)?;
        let response = self.api.send(Method::POST, "/signup", &[], Payload::Json(body)).await?;
        let message = response.message().unwrap_or(SIGNUP_SUCCESS_MESSAGE).to_owned();
        response.into_result()?;
        tracing::info!(email = %request.email, "signup succeeded");
        Ok(message)
    }

    /// Clear the in-memory session if the pipeline purged the stored token.
    fn reconcile(&self) {
        let mut session = self.session_mut();
        if session.is_authenticated() && self.api.store().session_token().is_none() {
            session.clear();
            tracing::info!("stored credential gone; session cleared");
        }
    }

    /// Decide whether `target` may render for the current session.
    pub fn navigate(&self, target: Route) -> GuardDecision {
        self.reconcile();
        guard::decide(&self.session(), target)
    }
}

#[cfg(test)]
#[path = "auth_test.rs"]
mod tests;
