//! REST client for the tareas API.
//!
//! SYSTEM CONTEXT
//! ==============
//! Every outbound request passes through [`ApiClient::send`], which stamps
//! JSON content negotiation headers and, when the session holds a token, the
//! bearer `Authorization` header. Callers never attach auth headers by hand.
//!
//! ERROR HANDLING
//! ==============
//! `send` is a transparent decorator: transport failures come back as
//! [`ApiError::Http`] and HTTP error statuses come back as ordinary responses.
//! The typed endpoint helpers below it turn non-2xx statuses into
//! [`ApiError::Status`].

#[cfg(test)]
#[path = "api_test.rs"]
mod tests;

use std::sync::Arc;

use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue, InvalidHeaderValue};
use reqwest::{Method, Request, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::types::{ErrorBody, LoginRequest, LoginResponse, Message, NewTask, RegisterRequest, Task, TaskPatch};
use crate::session::Session;

pub const JSON_MEDIA_TYPE: &str = "application/json";

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("invalid header value: {0}")]
    InvalidHeader(#[from] InvalidHeaderValue),
    #[error("server returned {status}: {message}")]
    Status { status: u16, message: String },
    #[error("response decode failed: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("response contained no rows")]
    EmptyResponse,
}

impl ApiError {
    /// True when the server rejected the credentials (missing or expired token).
    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Status { status: 401 | 422, .. })
    }
}

/// Set JSON headers and, iff `token` is present, the bearer header.
///
/// # Errors
///
/// Returns [`ApiError::InvalidHeader`] if the token contains bytes that are
/// not legal in a header value.
pub fn apply_headers(headers: &mut HeaderMap, token: Option<&str>) -> Result<(), ApiError> {
    headers.insert(CONTENT_TYPE, HeaderValue::from_static(JSON_MEDIA_TYPE));
    headers.insert(ACCEPT, HeaderValue::from_static(JSON_MEDIA_TYPE));
    match token {
        Some(token) => {
            let mut value = HeaderValue::from_str(&format!("Bearer {token}"))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }
        None => {
            headers.remove(AUTHORIZATION);
        }
    }
    Ok(())
}

/// `<base>/api`, with trailing slashes on `base` dropped.
pub(crate) fn api_root(base_url: &str) -> String {
    format!("{}/api", base_url.trim_end_matches('/'))
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    api_root: String,
    session: Arc<Session>,
}

impl ApiClient {
    #[must_use]
    pub fn new(base_url: &str, session: Arc<Session>) -> Self {
        Self::with_http(reqwest::Client::new(), base_url, session)
    }

    #[must_use]
    pub fn with_http(http: reqwest::Client, base_url: &str, session: Arc<Session>) -> Self {
        Self { http, api_root: api_root(base_url), session }
    }

    /// Absolute URL for an API path such as `/tareas`.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.api_root)
    }

    /// Start a request against an API path. Headers are applied by [`ApiClient::send`].
    #[must_use]
    pub fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http.request(method, self.url(path))
    }

    /// Stamp the current session's headers onto `request`.
    ///
    /// # Errors
    ///
    /// See [`apply_headers`].
    pub fn prepare(&self, mut request: Request) -> Result<Request, ApiError> {
        let token = self.session.token();
        apply_headers(request.headers_mut(), token.as_deref())?;
        Ok(request)
    }

    /// Send `request` with session headers applied. Error statuses are not intercepted.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Http`] on transport failure and
    /// [`ApiError::InvalidHeader`] for a token that cannot be sent.
    pub async fn send(&self, request: Request) -> Result<Response, ApiError> {
        let request = self.prepare(request)?;
        tracing::debug!(
            method = %request.method(),
            url = %request.url(),
            authenticated = request.headers().contains_key(AUTHORIZATION),
            "api request"
        );
        let response = self.http.execute(request).await?;
        tracing::debug!(status = response.status().as_u16(), "api response");
        Ok(response)
    }

    async fn execute(&self, builder: RequestBuilder) -> Result<Response, ApiError> {
        let response = self.send(builder.build()?).await?;
        expect_success(response).await
    }

    // =========================================================================
    // ENDPOINTS
    // =========================================================================

    /// `GET /api` health message.
    pub async fn ping(&self) -> Result<String, ApiError> {
        let response = self.execute(self.request(Method::GET, "")).await?;
        let body: Message = decode(response).await?;
        Ok(body.message)
    }

    /// `POST /api/login`. Does not touch the session; callers decide whether to store the token.
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, ApiError> {
        let body = LoginRequest { email: email.to_owned(), password: password.to_owned() };
        let response = self.execute(self.request(Method::POST, "/login").json(&body)).await?;
        decode(response).await
    }

    /// `POST /api/register`.
    pub async fn register(&self, request: &RegisterRequest) -> Result<(), ApiError> {
        self.execute(self.request(Method::POST, "/register").json(request)).await?;
        Ok(())
    }

    /// `GET /api/tareas` for the authenticated user.
    pub async fn list_tasks(&self) -> Result<Vec<Task>, ApiError> {
        let response = self.execute(self.request(Method::GET, "/tareas")).await?;
        decode(response).await
    }

    /// `POST /api/tareas`, returning the created row.
    pub async fn create_task(&self, task: &NewTask) -> Result<Task, ApiError> {
        let response = self.execute(self.request(Method::POST, "/tareas").json(task)).await?;
        first_row(decode(response).await?)
    }

    /// `PUT /api/tareas/{id}`, returning the updated row.
    pub async fn update_task(&self, id: i64, patch: &TaskPatch) -> Result<Task, ApiError> {
        let path = format!("/tareas/{id}");
        let response = self.execute(self.request(Method::PUT, &path).json(patch)).await?;
        first_row(decode(response).await?)
    }

    /// `DELETE /api/tareas/{id}`.
    pub async fn delete_task(&self, id: i64) -> Result<(), ApiError> {
        let path = format!("/tareas/{id}");
        self.execute(self.request(Method::DELETE, &path)).await?;
        Ok(())
    }
}

async fn expect_success(response: Response) -> Result<Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await?;
    let message = error_message(status, &body);
    tracing::warn!(status = status.as_u16(), %message, "api call rejected");
    Err(ApiError::Status { status: status.as_u16(), message })
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    let bytes = response.bytes().await?;
    Ok(serde_json::from_slice(&bytes)?)
}

/// Human-readable message for an error response body.
pub(crate) fn error_message(status: StatusCode, body: &str) -> String {
    if let Ok(parsed) = serde_json::from_str::<ErrorBody>(body) {
        return parsed.error;
    }
    let trimmed = body.trim();
    if trimmed.is_empty() {
        status.canonical_reason().unwrap_or("request failed").to_owned()
    } else {
        trimmed.to_owned()
    }
}

/// First task from a body that is either a row array or a single row.
pub(crate) fn first_row(value: Value) -> Result<Task, ApiError> {
    let rows: Vec<Task> = match value {
        Value::Array(_) => serde_json::from_value(value)?,
        other => vec![serde_json::from_value(other)?],
    };
    rows.into_iter().next().ok_or(ApiError::EmptyResponse)
}
