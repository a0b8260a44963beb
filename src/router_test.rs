use super::*;
use crate::storage::MemoryStore;

fn logged_out() -> Arc<Session> {
    Arc::new(Session::open(MemoryStore::new()))
}

fn logged_in(token: &str) -> Arc<Session> {
    Arc::new(Session::open(MemoryStore::with_token(token)))
}

// =============================================================================
// guard
// =============================================================================

#[test]
fn guard_redirects_protected_route_without_token() {
    let route = Route::view("/tareas", View::Tasks).protected();
    assert_eq!(guard(&route, None), GuardDecision::Redirect(LOGIN_PATH));
}

#[test]
fn guard_allows_protected_route_with_token() {
    let route = Route::view("/tareas", View::Tasks).protected();
    assert_eq!(guard(&route, Some("tok")), GuardDecision::Proceed);
}

#[test]
fn guard_allows_unflagged_route_without_token() {
    let route = Route::view("/register", View::Register);
    assert!(!route.requires_auth);
    assert_eq!(guard(&route, None), GuardDecision::Proceed);
}

#[test]
fn guard_holds_for_every_default_route() {
    for route in default_routes() {
        let expected = if route.requires_auth { GuardDecision::Redirect(LOGIN_PATH) } else { GuardDecision::Proceed };
        assert_eq!(guard(&route, None), expected, "route {}", route.path);
        assert_eq!(guard(&route, Some("tok")), GuardDecision::Proceed, "route {}", route.path);
    }
}

// =============================================================================
// route table
// =============================================================================

#[test]
fn default_routes_protect_tasks_and_calendar_only() {
    let protected: Vec<_> = default_routes().into_iter().filter(|r| r.requires_auth).map(|r| r.path).collect();
    assert_eq!(protected, vec!["/tareas", "/calendario"]);
}

#[test]
fn normalize_path_strips_query_fragment_and_trailing_slash() {
    assert_eq!(normalize_path("/tareas/"), "/tareas");
    assert_eq!(normalize_path("/tareas?filtro=hoy"), "/tareas");
    assert_eq!(normalize_path("/tareas#top"), "/tareas");
    assert_eq!(normalize_path(""), "/");
    assert_eq!(normalize_path("///"), "/");
}

// =============================================================================
// resolve / navigate
// =============================================================================

#[test]
fn protected_route_without_session_lands_on_login() {
    let mut router = Router::with_default_routes(logged_out());

    let resolved = router.navigate("/tareas").unwrap();

    assert_eq!(resolved.path, LOGIN_PATH);
    assert_eq!(resolved.view, View::Login);
    assert!(resolved.guard_redirected);
    assert_eq!(resolved.requested, "/tareas");
    assert_eq!(router.current(), Some(LOGIN_PATH));
}

#[test]
fn protected_route_with_session_resolves_to_target() {
    let mut router = Router::with_default_routes(logged_in("tok"));

    let resolved = router.navigate("/calendario").unwrap();

    assert_eq!(resolved.path, "/calendario");
    assert_eq!(resolved.view, View::Calendar);
    assert!(!resolved.guard_redirected);
}

#[test]
fn public_routes_resolve_without_session() {
    let router = Router::with_default_routes(logged_out());
    assert_eq!(router.resolve("/login").unwrap().view, View::Login);
    assert_eq!(router.resolve("/register").unwrap().view, View::Register);
}

#[test]
fn root_redirects_to_login_without_guard_flag() {
    let router = Router::with_default_routes(logged_in("tok"));
    let resolved = router.resolve("/").unwrap();
    assert_eq!(resolved.path, LOGIN_PATH);
    assert!(!resolved.guard_redirected);
}

#[test]
fn unknown_path_is_not_found_and_history_untouched() {
    let mut router = Router::with_default_routes(logged_out());
    router.navigate("/login").unwrap();

    let err = router.navigate("/nope").unwrap_err();

    assert_eq!(err, RouteError::NotFound("/nope".into()));
    assert_eq!(router.current(), Some(LOGIN_PATH));
}

#[test]
fn redirect_loop_is_reported() {
    let routes = vec![Route::redirect("/a", "/b"), Route::redirect("/b", "/a")];
    let router = Router::new(routes, logged_out());
    assert_eq!(router.resolve("/a").unwrap_err(), RouteError::RedirectLoop("/a".into()));
}

#[test]
fn protected_login_route_loops_instead_of_rendering() {
    let routes = vec![Route::view(LOGIN_PATH, View::Login).protected()];
    let router = Router::new(routes, logged_out());
    assert!(matches!(router.resolve(LOGIN_PATH), Err(RouteError::RedirectLoop(_))));
}

#[test]
fn guard_reads_session_on_every_navigation() {
    let session = logged_out();
    let mut router = Router::with_default_routes(Arc::clone(&session));

    assert_eq!(router.navigate("/tareas").unwrap().path, LOGIN_PATH);
    session.login("tok123").unwrap();
    assert_eq!(router.navigate("/tareas").unwrap().path, "/tareas");
    session.logout().unwrap();
    assert_eq!(router.navigate("/tareas").unwrap().path, LOGIN_PATH);
}

// =============================================================================
// history
// =============================================================================

#[test]
fn redirect_replaces_requested_entry() {
    let mut router = Router::with_default_routes(logged_out());
    router.navigate("/register").unwrap();
    router.navigate("/tareas").unwrap();

    assert_eq!(router.current(), Some(LOGIN_PATH));
    assert_eq!(router.back().unwrap().map(|r| r.path), Some("/register"));
    assert_eq!(router.forward().unwrap().map(|r| r.path), Some(LOGIN_PATH));
}

#[test]
fn back_re_evaluates_guard_after_logout() {
    let session = logged_in("tok");
    let mut router = Router::with_default_routes(Arc::clone(&session));
    router.navigate("/tareas").unwrap();
    router.navigate("/register").unwrap();

    session.logout().unwrap();
    let resolved = router.back().unwrap().unwrap();

    assert_eq!(resolved.path, LOGIN_PATH);
    assert!(resolved.guard_redirected);
    assert_eq!(router.current(), Some(LOGIN_PATH));
}

#[test]
fn forward_re_evaluates_guard_after_logout() {
    let session = logged_in("tok");
    let mut router = Router::with_default_routes(Arc::clone(&session));
    router.navigate("/register").unwrap();
    router.navigate("/calendario").unwrap();
    router.back().unwrap();

    session.logout().unwrap();
    let resolved = router.forward().unwrap().unwrap();

    assert_eq!(resolved.path, LOGIN_PATH);
}

#[test]
fn back_and_forward_at_edges_return_none() {
    let mut router = Router::with_default_routes(logged_out());
    assert_eq!(router.back().unwrap(), None);
    assert_eq!(router.forward().unwrap(), None);

    router.navigate("/login").unwrap();
    assert_eq!(router.back().unwrap(), None);
    assert_eq!(router.forward().unwrap(), None);
}

#[test]
fn navigate_discards_forward_history() {
    let mut router = Router::with_default_routes(logged_out());
    router.navigate("/login").unwrap();
    router.navigate("/register").unwrap();
    router.back().unwrap();

    router.navigate("/login").unwrap();

    assert!(!router.can_go_forward());
    assert!(router.can_go_back());
}

#[test]
fn replace_swaps_current_entry() {
    let mut router = Router::with_default_routes(logged_out());
    router.navigate("/login").unwrap();
    router.navigate("/register").unwrap();

    router.replace("/login").unwrap();

    assert_eq!(router.current(), Some(LOGIN_PATH));
    assert_eq!(router.back().unwrap().map(|r| r.path), Some(LOGIN_PATH));
    assert!(!router.can_go_back());
}

#[test]
fn replace_on_empty_history_pushes() {
    let mut router = Router::with_default_routes(logged_out());
    router.replace("/register").unwrap();
    assert_eq!(router.current(), Some("/register"));
}
