//! Route table and navigation guard.
//!
//! SYSTEM CONTEXT
//! ==============
//! Views never check authentication themselves. Every navigation (push,
//! replace, back, forward) goes through [`Router`], which follows static
//! redirects and then runs [`guard`] against the current session token.
//!
//! DESIGN
//! ======
//! A guard redirect replaces the navigation: the requested route is never
//! recorded in history, so stepping back can never land on a protected view
//! without a fresh guard check.

#[cfg(test)]
#[path = "router_test.rs"]
mod tests;

use std::sync::Arc;

use crate::session::Session;

/// Path of the login view; target of guard redirects.
pub const LOGIN_PATH: &str = "/login";

/// Upper bound on redirect hops in a single navigation.
const MAX_REDIRECTS: usize = 8;

// =============================================================================
// ROUTE TABLE
// =============================================================================

/// Views a route can render.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum View {
    Login,
    Register,
    Tasks,
    Calendar,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RouteTarget {
    View(View),
    Redirect(&'static str),
}

/// Immutable route descriptor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Route {
    pub path: &'static str,
    pub target: RouteTarget,
    pub requires_auth: bool,
}

impl Route {
    /// Public route rendering `view`.
    #[must_use]
    pub const fn view(path: &'static str, view: View) -> Self {
        Self { path, target: RouteTarget::View(view), requires_auth: false }
    }

    /// Static redirect from `path` to `to`.
    #[must_use]
    pub const fn redirect(path: &'static str, to: &'static str) -> Self {
        Self { path, target: RouteTarget::Redirect(to), requires_auth: false }
    }

    /// Mark the route as requiring an authenticated session.
    #[must_use]
    pub const fn protected(mut self) -> Self {
        self.requires_auth = true;
        self
    }
}

/// The application's route table.
#[must_use]
pub fn default_routes() -> Vec<Route> {
    vec![
        Route::redirect("/", LOGIN_PATH),
        Route::view(LOGIN_PATH, View::Login),
        Route::view("/register", View::Register),
        Route::view("/tareas", View::Tasks).protected(),
        Route::view("/calendario", View::Calendar).protected(),
    ]
}

// =============================================================================
// GUARD
// =============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GuardDecision {
    Proceed,
    Redirect(&'static str),
}

/// Decide whether navigation to `route` may proceed with the given token.
#[must_use]
pub fn guard(route: &Route, token: Option<&str>) -> GuardDecision {
    if route.requires_auth && token.is_none() {
        GuardDecision::Redirect(LOGIN_PATH)
    } else {
        GuardDecision::Proceed
    }
}

// =============================================================================
// ROUTER
// =============================================================================

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RouteError {
    #[error("no route matches {0}")]
    NotFound(String),
    #[error("too many redirects while resolving {0}")]
    RedirectLoop(String),
}

/// Outcome of one navigation attempt.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Resolved {
    /// Path as the caller requested it.
    pub requested: String,
    /// Path of the route that actually rendered.
    pub path: &'static str,
    pub view: View,
    /// True when the guard sent the navigation to the login view.
    pub guard_redirected: bool,
}

/// Navigation state: a route table, a session, and a history stack.
#[derive(Debug)]
pub struct Router {
    routes: Vec<Route>,
    session: Arc<Session>,
    history: Vec<&'static str>,
    cursor: usize,
}

impl Router {
    #[must_use]
    pub fn new(routes: Vec<Route>, session: Arc<Session>) -> Self {
        Self { routes, session, history: Vec::new(), cursor: 0 }
    }

    #[must_use]
    pub fn with_default_routes(session: Arc<Session>) -> Self {
        Self::new(default_routes(), session)
    }

    #[must_use]
    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    /// Path of the entry currently displayed.
    #[must_use]
    pub fn current(&self) -> Option<&'static str> {
        self.history.get(self.cursor).copied()
    }

    #[must_use]
    pub fn can_go_back(&self) -> bool {
        !self.history.is_empty() && self.cursor > 0
    }

    #[must_use]
    pub fn can_go_forward(&self) -> bool {
        self.cursor + 1 < self.history.len()
    }

    /// Push navigation. Forward history past the cursor is discarded.
    ///
    /// # Errors
    ///
    /// Returns [`RouteError`] if the path matches no route or redirects loop;
    /// history is unchanged in that case.
    pub fn navigate(&mut self, path: &str) -> Result<Resolved, RouteError> {
        let resolved = self.resolve(path)?;
        self.history.truncate(self.cursor + 1);
        self.history.push(resolved.path);
        self.cursor = self.history.len() - 1;
        Ok(resolved)
    }

    /// Replace the current history entry.
    ///
    /// # Errors
    ///
    /// Same as [`Router::navigate`].
    pub fn replace(&mut self, path: &str) -> Result<Resolved, RouteError> {
        let resolved = self.resolve(path)?;
        match self.history.get_mut(self.cursor) {
            Some(entry) => *entry = resolved.path,
            None => self.history.push(resolved.path),
        }
        Ok(resolved)
    }

    /// Step back one entry, re-running the guard on it.
    ///
    /// Returns `Ok(None)` at the start of history.
    ///
    /// # Errors
    ///
    /// Same as [`Router::navigate`].
    pub fn back(&mut self) -> Result<Option<Resolved>, RouteError> {
        if !self.can_go_back() {
            return Ok(None);
        }
        self.traverse(self.cursor - 1).map(Some)
    }

    /// Step forward one entry, re-running the guard on it.
    ///
    /// Returns `Ok(None)` at the end of history.
    ///
    /// # Errors
    ///
    /// Same as [`Router::navigate`].
    pub fn forward(&mut self) -> Result<Option<Resolved>, RouteError> {
        if !self.can_go_forward() {
            return Ok(None);
        }
        self.traverse(self.cursor + 1).map(Some)
    }

    fn traverse(&mut self, index: usize) -> Result<Resolved, RouteError> {
        let target = self.history[index];
        let resolved = self.resolve(target)?;
        self.history[index] = resolved.path;
        self.cursor = index;
        Ok(resolved)
    }

    /// Resolve `requested` to a view without touching history.
    ///
    /// # Errors
    ///
    /// Returns [`RouteError::NotFound`] for unknown paths and
    /// [`RouteError::RedirectLoop`] when redirects do not settle.
    pub fn resolve(&self, requested: &str) -> Result<Resolved, RouteError> {
        let token = self.session.token();
        let mut path = normalize_path(requested).to_owned();
        let mut guard_redirected = false;

        for _ in 0..MAX_REDIRECTS {
            let route = self.find(&path).ok_or_else(|| RouteError::NotFound(path.clone()))?;
            match route.target {
                RouteTarget::Redirect(to) => path = to.to_owned(),
                RouteTarget::View(view) => match guard(route, token.as_deref()) {
                    GuardDecision::Proceed => {
                        tracing::debug!(requested, path = route.path, "navigation resolved");
                        return Ok(Resolved { requested: requested.to_owned(), path: route.path, view, guard_redirected });
                    }
                    GuardDecision::Redirect(to) => {
                        tracing::info!(requested, redirect = to, "unauthenticated navigation redirected");
                        guard_redirected = true;
                        path = to.to_owned();
                    }
                },
            }
        }

        Err(RouteError::RedirectLoop(requested.to_owned()))
    }

    fn find(&self, path: &str) -> Option<&Route> {
        self.routes.iter().find(|r| r.path == path)
    }
}

/// Strip query string, fragment and trailing slashes from a path.
pub(crate) fn normalize_path(raw: &str) -> &str {
    let end = raw.find(['?', '#']).unwrap_or(raw.len());
    let path = raw[..end].trim();
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() { "/" } else { trimmed }
}
