use super::*;
use crate::cookie_store::MemoryCookieStore;
use crate::session::SessionUser;

fn restored_without_cookie() -> Session {
    let mut session = Session::pending();
    session.restore(&MemoryCookieStore::new());
    session
}

#[test]
fn pending_session_never_redirects() {
    let session = Session::pending();
    for route in Route::ALL.into_iter().filter(|r| !r.is_public()) {
        assert_eq!(decide(&session, route), GuardDecision::Pending, "{route:?}");
    }
}

#[test]
fn unauthenticated_redirects_to_login() {
    let session = restored_without_cookie();
    assert_eq!(decide(&session, Route::Categories), GuardDecision::Redirect(Route::Login));
    assert_eq!(decide(&session, Route::Dashboard), GuardDecision::Redirect(Route::Login));
}

#[test]
fn authenticated_renders_target() {
    let mut session = Session::pending();
    session.commit("abc123".to_owned(), SessionUser::logged_in());
    for route in Route::ALL {
        assert_eq!(decide(&session, route), GuardDecision::Render(route));
    }
}

#[test]
fn public_routes_always_render() {
    let pending = Session::pending();
    let anonymous = restored_without_cookie();
    for route in [Route::Login, Route::Signup, Route::ForgotPassword] {
        assert_eq!(decide(&pending, route), GuardDecision::Render(route));
        assert_eq!(decide(&anonymous, route), GuardDecision::Render(route));
    }
}

#[test]
fn from_path_resolves_known_routes() {
    for route in Route::ALL {
        assert_eq!(Route::from_path(route.path()), route);
    }
    assert_eq!(Route::from_path("/categories/"), Route::Categories);
    assert_eq!(Route::from_path("/search?q=shoes"), Route::Search);
}

#[test]
fn from_path_defaults_to_login() {
    assert_eq!(Route::from_path("/"), Route::Login);
    assert_eq!(Route::from_path(""), Route::Login);
    assert_eq!(Route::from_path("/nope"), Route::Login);
}
