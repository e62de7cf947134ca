//! Mock HTTP transport for deterministic testing.
//!
//! Returns pre-configured replies without touching the network.

use async_trait::async_trait;
use serde_json::{Value, json};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};

use crate::error::{GameError, Result};
use crate::transport::{HttpRequest, HttpResponse, HttpTransport};

/// A queued reply from the mock transport.
#[derive(Debug, Clone)]
pub enum MockReply {
    /// The server answered with this status and body.
    Response(HttpResponse),
    /// No response was received.
    Error { message: String, body: Option<Value> },
}

/// A transport that replays queued replies in order and records every request.
///
/// # Example
/// ```
/// use gamekit_core::mock::MockTransport;
/// let transport = MockTransport::new()
///     .with_response(200, serde_json::json!({"ok": true}));
/// ```
#[derive(Clone, Default)]
pub struct MockTransport {
    replies: Arc<Mutex<VecDeque<MockReply>>>,
    requests: Arc<Mutex<Vec<HttpRequest>>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a response with the given status and body.
    pub fn with_response(self, status: u16, body: Value) -> Self {
        self.queue(MockReply::Response(HttpResponse::new(status, body)));
        self
    }

    /// Queue a transport failure.
    pub fn with_error(self, message: &str) -> Self {
        self.queue(MockReply::Error {
            message: message.to_string(),
            body: None,
        });
        self
    }

    /// Queue a transport failure carrying a response body.
    pub fn with_error_body(self, message: &str, body: Value) -> Self {
        self.queue(MockReply::Error {
            message: message.to_string(),
            body: Some(body),
        });
        self
    }

    pub fn queue(&self, reply: MockReply) {
        self.replies
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(reply);
    }

    /// All requests received so far, in order.
    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Pop the next reply; an empty queue answers `200 {"ok": true}`.
    fn next_reply(&self) -> MockReply {
        self.replies
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
            .unwrap_or_else(|| MockReply::Response(HttpResponse::new(200, json!({"ok": true}))))
    }
}

#[async_trait]
impl HttpTransport for MockTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request);

        match self.next_reply() {
            MockReply::Response(response) => Ok(response),
            MockReply::Error { message, body } => Err(GameError::Transport { message, body }),
        }
    }
}
