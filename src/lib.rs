//! # searchkaro-admin
//!
//! Client core for the Searchkaro administrative dashboard.
//!
//! The backend is an external REST API. This crate owns everything on the
//! client side of it: the persisted session cookie, the in-memory session,
//! login/logout, the route guard, the authenticated request pipeline, and
//! typed calls for every dashboard screen (categories, locations, ratings,
//! legal policies, reports, search, password recovery) plus the timed
//! logout prompt.
//!
//! SYSTEM CONTEXT
//! ==============
//! `cookie_store` is the only shared mutable resource. `pipeline` reads it
//! to attach bearer credentials and purges it on 401/403. `auth` writes it
//! on login and deletes it on logout, then updates `session`. `guard` is a
//! pure function of `session`.

pub mod auth;
pub mod config;
pub mod cookie_store;
pub mod countdown;
pub mod dashboard;
pub mod error;
pub mod guard;
pub mod pipeline;
pub mod recovery;
pub mod resources;
pub mod session;

#[cfg(test)]
mod test_support;

pub use auth::{AuthGateway, Credentials, SignupRequest};
pub use countdown::{CountdownOutcome, DEFAULT_COUNTDOWN_SECS, LogoutCountdown};
pub use config::ClientConfig;
pub use cookie_store::{CookieStore, FileCookieStore, MemoryCookieStore, SESSION_COOKIE, SESSION_TTL_DAYS};
pub use error::{ApiError, AuthError, FailureKind, ValidationError};
pub use guard::{GuardDecision, Route};
pub use pipeline::ApiClient;
pub use session::{Session, SessionUser};
