//! Error taxonomy shared by the request pipeline and the auth gateway.
//!
//! ERROR HANDLING
//! ==============
//! No failure is fatal. Transport and protocol failures surface to callers as
//! a single human-readable message via [`ApiError::user_message`]; callers
//! retry the user action. Authorization failures have already purged the
//! stored credential by the time the caller sees them.

use reqwest::StatusCode;

/// Failure categories surfaced to the UI layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Network unreachable, timeout, or non-2xx status other than 401/403.
    Transport,
    /// A 2xx response that is missing an expected field.
    Protocol,
    /// 401 or 403: the stored credential is no longer trusted.
    Authorization,
    /// Client-side form constraints; never reaches the network.
    Validation,
}

/// Client-side form validation failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("please enter a valid email address")]
    InvalidEmail,
    #[error("{0} is required")]
    Required(&'static str),
    #[error("password must be at least {0} characters")]
    PasswordTooShort(usize),
    #[error("rating must be between 0 and 5")]
    RatingOutOfRange,
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("request timed out")]
    Timeout,
    #[error("http request failed: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("server returned HTTP {status}: {message}")]
    Status { status: u16, message: String },
    #[error("not authorized (HTTP {status}): {message}")]
    Unauthorized { status: u16, message: String },
    #[error("missing expected field `{0}`")]
    MissingField(&'static str),
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

impl From<reqwest::Error> for ApiError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() { Self::Timeout } else { Self::Transport(error) }
    }
}

impl ApiError {
    /// Map a non-success HTTP status plus the server's message into an error.
    #[must_use]
    pub fn from_status(status: StatusCode, message: String) -> Self {
        if is_authorization_failure(status) {
            Self::Unauthorized { status: status.as_u16(), message }
        } else {
            Self::Status { status: status.as_u16(), message }
        }
    }

    #[must_use]
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::Timeout | Self::Transport(_) | Self::Status { .. } => FailureKind::Transport,
            Self::MissingField(_) | Self::InvalidJson(_) => FailureKind::Protocol,
            Self::Unauthorized { .. } => FailureKind::Authorization,
            Self::Validation(_) => FailureKind::Validation,
        }
    }

    /// Human-readable message for display.
    ///
    /// Uses the server-provided `message` when the response carried one,
    /// the validation text for client-side failures, and `fallback`
    /// otherwise.
    #[must_use]
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            Self::Status { message, .. } | Self::Unauthorized { message, .. } if !message.trim().is_empty() => {
                message.clone()
            }
            Self::Validation(err) => err.to_string(),
            _ => fallback.to_owned(),
        }
    }
}

/// Login failures. Always reported as values, never panics.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("login response did not include a token")]
    MissingToken,
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Api(#[from] ApiError),
}

pub const LOGIN_FALLBACK_MESSAGE: &str = "Login failed";

impl AuthError {
    #[must_use]
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::MissingToken => FailureKind::Protocol,
            Self::Validation(_) => FailureKind::Validation,
            Self::Api(err) => err.kind(),
        }
    }

    /// Message for the login form: server text when available, else a generic fallback.
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::MissingToken => format!("{LOGIN_FALLBACK_MESSAGE}: no token in response"),
            Self::Validation(err) => err.to_string(),
            Self::Api(err) => err.user_message(LOGIN_FALLBACK_MESSAGE),
        }
    }
}

/// 401 and 403 both mean the presented credential should not be retried.
#[must_use]
pub fn is_authorization_failure(status: StatusCode) -> bool {
    status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN
}

#[cfg(test)]
#[path = "error_test.rs"]
mod tests;
