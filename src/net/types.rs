//! Wire types for the tareas REST API.
//!
//! DESIGN
//! ======
//! The API speaks Spanish field names (`titulo`, `fecha_limite`, ...). Rust
//! fields use English names and map to the wire through `serde(rename)`.

#[cfg(test)]
#[path = "types_test.rs"]
mod tests;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

/// Task priority as stored by the API.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Baja,
    #[default]
    Media,
    Alta,
}

impl Priority {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Baja => "baja",
            Self::Media => "media",
            Self::Alta => "alta",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("unknown priority `{0}` (expected baja, media or alta)")]
pub struct ParsePriorityError(String);

impl FromStr for Priority {
    type Err = ParsePriorityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "baja" | "low" => Ok(Self::Baja),
            "media" | "medium" => Ok(Self::Media),
            "alta" | "high" => Ok(Self::Alta),
            _ => Err(ParsePriorityError(s.to_owned())),
        }
    }
}

/// User identifier. The API stores ids as integers or as opaque strings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum UserId {
    Int(i64),
    Text(String),
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(id) => write!(f, "{id}"),
            Self::Text(id) => f.write_str(id),
        }
    }
}

/// A task row as returned by `GET /api/tareas`.
///
/// Rows are written by other clients too, so `prioridad` and `completada` may
/// arrive as `null` or, for priority, as an unknown label. Both decode to the
/// default instead of failing the whole list.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: i64,
    #[serde(rename = "titulo")]
    pub title: String,
    #[serde(rename = "descripcion", default)]
    pub description: Option<String>,
    #[serde(rename = "prioridad", default, deserialize_with = "lenient_priority")]
    pub priority: Priority,
    /// Due date as sent by the API (`YYYY-MM-DD`, possibly with a time suffix).
    #[serde(rename = "fecha_limite", default)]
    pub due_date: Option<String>,
    #[serde(rename = "completada", default, deserialize_with = "null_as_default")]
    pub completed: bool,
    #[serde(rename = "usuario_id", default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<UserId>,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn lenient_priority<'de, D>(deserializer: D) -> Result<Priority, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(raw) = Option::<String>::deserialize(deserializer)? else {
        return Ok(Priority::default());
    };
    match raw.parse() {
        Ok(priority) => Ok(priority),
        Err(e) => {
            tracing::debug!(error = %e, "priority falls back to default");
            Ok(Priority::default())
        }
    }
}

/// Body of `POST /api/tareas`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct NewTask {
    #[serde(rename = "titulo")]
    pub title: String,
    #[serde(rename = "descripcion", skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "prioridad", skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(rename = "fecha_limite", skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
}

/// Body of `PUT /api/tareas/{id}`; only set fields are sent.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct TaskPatch {
    #[serde(rename = "titulo", skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(rename = "descripcion", skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "prioridad", skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(rename = "fecha_limite", skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    #[serde(rename = "completada", skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
}

impl TaskPatch {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RegisterRequest {
    #[serde(rename = "nombre")]
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Authenticated user returned alongside a login token.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct User {
    pub id: UserId,
    #[serde(rename = "nombre")]
    pub name: String,
    pub email: String,
    #[serde(rename = "rol", default)]
    pub role: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct LoginResponse {
    #[serde(rename = "mensaje", default)]
    pub message: Option<String>,
    pub token: String,
    #[serde(rename = "usuario")]
    pub user: User,
}

/// `{"mensaje": ...}` acknowledgement body.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct Message {
    #[serde(rename = "mensaje")]
    pub message: String,
}

/// Error body sent with non-success statuses. Token failures use `msg`.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(alias = "msg")]
    pub error: String,
}
