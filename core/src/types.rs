//! Domain DTOs for the todo API.
//!
//! # Design
//! Only the two fields the probe actually sends (`todo`, `done`) are typed.
//! Everything else the server returns, including its `id`, lands in a
//! passthrough map so unfamiliar fields never break parsing. The mock-server
//! crate defines its own schema; integration tests catch drift between them.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ApiError;

/// Request payload for both creating and replacing a todo.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TodoRequest {
    pub todo: String,
    pub done: bool,
}

impl TodoRequest {
    pub fn new(todo: impl Into<String>, done: bool) -> Self {
        Self {
            todo: todo.into(),
            done,
        }
    }
}

/// A todo as returned by the server.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TodoResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub todo: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub done: Option<bool>,
    /// Server-assigned fields (`id`, timestamps, ...), kept verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TodoResponse {
    /// The server-assigned id, or `MissingField("id")` when the body has none.
    pub fn id(&self) -> Result<TodoId, ApiError> {
        self.extra
            .get("id")
            .map(TodoId::from_json)
            .ok_or(ApiError::MissingField("id"))
    }
}

/// Opaque server id, spliced into URLs exactly as the server rendered it.
///
/// Strings are taken verbatim; any other JSON value uses its compact JSON
/// text, so the integer `7` becomes `"7"`. No shape validation is done.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TodoId(String);

impl TodoId {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::String(s) => Self(s.clone()),
            other => Self(other.to_string()),
        }
    }

    /// Read `id` from a decoded body without looking at any other field.
    pub fn from_body(body: &Value) -> Result<Self, ApiError> {
        body.get("id")
            .map(Self::from_json)
            .ok_or(ApiError::MissingField("id"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TodoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
