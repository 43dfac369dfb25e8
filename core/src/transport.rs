//! The seam between request building and the network.
//!
//! The core never opens sockets. Anything that can turn an `HttpRequest`
//! into an `HttpResponse` implements `Transport`: the `ureq` agent in the
//! probe binary, or a scripted fake in tests.

use crate::http::{HttpRequest, HttpResponse};

/// Failures below the HTTP layer. Any status code, including 4xx/5xx, is a
/// successful round-trip and must come back as an `HttpResponse`.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The target host could not be reached at all.
    #[error("connection failed: {0}")]
    Connect(String),

    /// Everything else: timeouts, protocol errors, unreadable bodies.
    #[error("{0}")]
    Other(String),
}

impl TransportError {
    pub fn is_connect(&self) -> bool {
        matches!(self, TransportError::Connect(_))
    }
}

/// Executes one HTTP round-trip, blocking until it finishes.
pub trait Transport {
    fn execute(&mut self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}

impl<T: Transport + ?Sized> Transport for &mut T {
    fn execute(&mut self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        (**self).execute(request)
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn execute(&mut self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        (**self).execute(request)
    }
}
