//! Application root: session, router and API client wired together.
//!
//! SYSTEM CONTEXT
//! ==============
//! The binary and the end-to-end tests both drive the client through [`App`].
//! It owns one shared [`Session`] and hands it to the router and the API
//! client as an explicit dependency.

#[cfg(test)]
#[path = "app_test.rs"]
mod tests;

use std::sync::Arc;

use crate::config::ClientConfig;
use crate::net::api::{ApiClient, ApiError};
use crate::net::types::{LoginResponse, RegisterRequest};
use crate::router::{Resolved, RouteError, Router, View};
use crate::session::{Session, SessionError};
use crate::storage::{FileStore, TokenStore};
use crate::views;

/// Path of the protected task list.
pub const TASKS_PATH: &str = "/tareas";

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Route(#[from] RouteError),
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error("login required")]
    LoginRequired,
}

/// A rendered navigation result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Screen {
    pub resolved: Resolved,
    pub body: String,
}

#[derive(Debug)]
pub struct App {
    session: Arc<Session>,
    router: Router,
    api: ApiClient,
}

impl App {
    /// Build the app from config, with the session backed by the configured file.
    #[must_use]
    pub fn from_config(config: &ClientConfig) -> Self {
        Self::with_store(&config.api_url, FileStore::new(&config.storage_path))
    }

    /// Build the app around an arbitrary token store.
    #[must_use]
    pub fn with_store(api_url: &str, store: impl TokenStore + 'static) -> Self {
        let session = Arc::new(Session::open(store));
        let router = Router::with_default_routes(Arc::clone(&session));
        let api = ApiClient::new(api_url, Arc::clone(&session));
        Self { session, router, api }
    }

    #[must_use]
    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    #[must_use]
    pub fn router(&self) -> &Router {
        &self.router
    }

    #[must_use]
    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    /// Authenticate against the API and store the returned token.
    ///
    /// # Errors
    ///
    /// Propagates API failures (the session is untouched) and storage failures.
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, AppError> {
        let response = self.api.login(email, password).await?;
        self.session.login(&response.token)?;
        tracing::info!(user = %response.user.email, "logged in");
        Ok(response)
    }

    /// # Errors
    ///
    /// Propagates API failures such as an already registered email.
    pub async fn register(&self, request: &RegisterRequest) -> Result<(), AppError> {
        self.api.register(request).await?;
        tracing::info!(email = %request.email, "registered");
        Ok(())
    }

    /// # Errors
    ///
    /// Returns [`AppError::Session`] if the stored token cannot be removed.
    pub fn logout(&self) -> Result<(), AppError> {
        self.session.logout()?;
        Ok(())
    }

    /// Navigate to `path` and render whatever view the router lands on.
    ///
    /// # Errors
    ///
    /// Returns routing errors for unknown paths and API errors while fetching
    /// data for protected views.
    pub async fn open(&mut self, path: &str) -> Result<Screen, AppError> {
        let resolved = self.router.navigate(path)?;
        self.render(resolved).await
    }

    /// # Errors
    ///
    /// Same as [`App::open`].
    pub async fn back(&mut self) -> Result<Option<Screen>, AppError> {
        match self.router.back()? {
            Some(resolved) => Ok(Some(self.render(resolved).await?)),
            None => Ok(None),
        }
    }

    /// # Errors
    ///
    /// Same as [`App::open`].
    pub async fn forward(&mut self) -> Result<Option<Screen>, AppError> {
        match self.router.forward()? {
            Some(resolved) => Ok(Some(self.render(resolved).await?)),
            None => Ok(None),
        }
    }

    /// Navigate to the task list and fail if the guard turns the navigation away.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::LoginRequired`] when no session is present.
    pub fn require_auth(&mut self) -> Result<Resolved, AppError> {
        let resolved = self.router.navigate(TASKS_PATH)?;
        if resolved.guard_redirected {
            return Err(AppError::LoginRequired);
        }
        Ok(resolved)
    }

    async fn render(&self, resolved: Resolved) -> Result<Screen, AppError> {
        let body = match resolved.view {
            View::Tasks => views::tasks::render(&self.api.list_tasks().await?),
            View::Calendar => views::calendar::render(&self.api.list_tasks().await?),
            view @ (View::Login | View::Register) => views::hint(view).to_owned(),
        };
        Ok(Screen { resolved, body })
    }
}
