//! Stateless HTTP request builder and response parser for the todo API.
//!
//! # Design
//! `TodoClient` holds only a `base_url` and a `StatusPolicy`, and carries no
//! mutable state between calls. Each operation has a `build_*` method that
//! produces an `HttpRequest`; responses go through `parse_json`, which
//! applies the status policy before decoding the body. The caller executes
//! the actual HTTP round-trip.

use serde::Deserialize;
use serde_json::Value;

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{TodoId, TodoRequest, TodoResponse};

/// How non-2xx responses are treated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StatusPolicy {
    /// Never inspect the status; decode whatever body came back.
    #[default]
    Lenient,
    /// Fail on any non-2xx status before decoding the body.
    Strict,
}

/// Synchronous, stateless client for the todo API.
#[derive(Debug, Clone)]
pub struct TodoClient {
    base_url: String,
    policy: StatusPolicy,
}

impl TodoClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            policy: StatusPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: StatusPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn build_list_todos(&self) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            path: format!("{}/todos", self.base_url),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn build_get_todo(&self, id: &TodoId) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            path: format!("{}/todos/{id}", self.base_url),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn build_create_todo(&self, input: &TodoRequest) -> Result<HttpRequest, ApiError> {
        Ok(HttpRequest {
            method: HttpMethod::Post,
            path: format!("{}/todos", self.base_url),
            headers: json_headers(),
            body: Some(to_body(input)?),
        })
    }

    pub fn build_update_todo(&self, id: &TodoId, input: &TodoRequest) -> Result<HttpRequest, ApiError> {
        Ok(HttpRequest {
            method: HttpMethod::Put,
            path: format!("{}/todos/{id}", self.base_url),
            headers: json_headers(),
            body: Some(to_body(input)?),
        })
    }

    pub fn build_delete_todo(&self, id: &TodoId) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Delete,
            path: format!("{}/todos/{id}", self.base_url),
            headers: Vec::new(),
            body: None,
        }
    }

    /// Decode the body as arbitrary JSON after applying the status policy.
    pub fn parse_json(&self, response: &HttpResponse) -> Result<Value, ApiError> {
        self.check_status(response)?;
        serde_json::from_str(&response.body).map_err(|e| ApiError::DeserializationError(e.to_string()))
    }

    /// Interpret an already-decoded body as a single todo.
    pub fn parse_todo(&self, body: &Value) -> Result<TodoResponse, ApiError> {
        TodoResponse::deserialize(body).map_err(|e| ApiError::DeserializationError(e.to_string()))
    }

    /// Only the status policy applies; the delete body is never read.
    pub fn parse_delete_todo(&self, response: &HttpResponse) -> Result<(), ApiError> {
        self.check_status(response)
    }

    fn check_status(&self, response: &HttpResponse) -> Result<(), ApiError> {
        match self.policy {
            StatusPolicy::Lenient => Ok(()),
            StatusPolicy::Strict => check_status(response),
        }
    }
}

fn json_headers() -> Vec<(String, String)> {
    vec![("content-type".to_string(), "application/json".to_string())]
}

fn to_body(input: &TodoRequest) -> Result<String, ApiError> {
    serde_json::to_string(input).map_err(|e| ApiError::SerializationError(e.to_string()))
}

/// Map non-success status codes to the appropriate `ApiError` variant.
fn check_status(response: &HttpResponse) -> Result<(), ApiError> {
    if response.is_success() {
        return Ok(());
    }
    if response.status == 404 {
        return Err(ApiError::NotFound);
    }
    Err(ApiError::HttpError {
        status: response.status,
        body: response.body.clone(),
    })
}
