//! Route table and the navigation gate.
//!
//! `decide` is a pure function of the session: pending while restoring,
//! redirect to login when unauthenticated, otherwise render. The attempted
//! destination is not preserved across the redirect.

use crate::session::Session;

/// Dashboard screens.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Route {
    Login,
    Signup,
    ForgotPassword,
    Dashboard,
    Search,
    Categories,
    Reports,
    LegalPolicy,
    Location,
    Rating,
}

impl Route {
    pub const ALL: [Route; 10] = [
        Route::Login,
        Route::Signup,
        Route::ForgotPassword,
        Route::Dashboard,
        Route::Search,
        Route::Categories,
        Route::Reports,
        Route::LegalPolicy,
        Route::Location,
        Route::Rating,
    ];

    #[must_use]
    pub fn path(self) -> &'static str {
        match self {
            Route::Login => "/login",
            Route::Signup => "/signup",
            Route::ForgotPassword => "/forgot-password",
            Route::Dashboard => "/dashboard",
            Route::Search => "/search",
            Route::Categories => "/categories",
            Route::Reports => "/reports",
            Route::LegalPolicy => "/legal-policy",
            Route::Location => "/location",
            Route::Rating => "/rating",
        }
    }

    /// Resolve a path. `/` and unknown paths land on the login screen.
    #[must_use]
    pub fn from_path(path: &str) -> Route {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let trimmed = path.trim_end_matches('/');
        Route::ALL
            .into_iter()
            .find(|route| route.path() == trimmed)
            .unwrap_or(Route::Login)
    }

    /// Screens reachable without a session.
    #[must_use]
    pub fn is_public(self) -> bool {
        matches!(self, Route::Login | Route::Signup | Route::ForgotPassword)
    }
}

/// Outcome of a navigation attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GuardDecision {
    /// Session restore has not finished; show a neutral placeholder.
    Pending,
    /// Navigate elsewhere instead of the requested screen.
    Redirect(Route),
    /// Render the requested screen unchanged.
    Render(Route),
}

#[must_use]
pub fn decide(session: &Session, target: Route) -> GuardDecision {
    if target.is_public() {
        return GuardDecision::Render(target);
    }
    if session.is_loading() {
        return GuardDecision::Pending;
    }
    if session.is_authenticated() {
        GuardDecision::Render(target)
    } else {
        GuardDecision::Redirect(Route::Login)
    }
}

#[cfg(test)]
#[path = "guard_test.rs"]
mod tests;
