//! Synchronous client core and smoke probe for the todo service.
//!
//! # Overview
//! Builds `HttpRequest` values and parses `HttpResponse` values without
//! touching the network (host-does-IO pattern). `ProbeRunner` strings the
//! seven fixed CRUD calls together over any `Transport`.
//!
//! # Design
//! - `TodoClient` is stateless: it holds only `base_url` and a status policy.
//! - Request building and response parsing are separate, so the I/O boundary
//!   is explicit and the whole probe runs against a scripted fake in tests.
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.

pub mod client;
pub mod error;
pub mod http;
pub mod probe;
pub mod transport;
pub mod types;

pub use client::{StatusPolicy, TodoClient};
pub use error::ApiError;
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use probe::{ProbeError, ProbeOutcome, ProbeReport, ProbeRunner, Step, StepRecord};
pub use transport::{Transport, TransportError};
pub use types::{TodoId, TodoRequest, TodoResponse};

/// Where the todo service listens unless told otherwise.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8001";
