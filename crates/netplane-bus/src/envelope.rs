// crates/netplane-bus/src/envelope.rs
// ============================================================================
// Module: Netplane Bus Envelopes
// Description: Request and response envelopes for service addresses.
// Purpose: Give every exposed action a uniform in/out wire shape.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! Every service address answers a uniform envelope: a [`Request`] carrying
//! `{action, params}` and a [`Response`] carrying `{service, action,
//! content}` on success or `{service, action, error}` on failure.
//! Invariants:
//! - A response carries `content` or `error`, never both.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

// ============================================================================
// SECTION: Request Envelope
// ============================================================================

/// Request envelope sent to a service address.
///
/// # Invariants
/// - `params` is a JSON object; actions without parameters use `{}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Request {
    /// Action name understood by the target service.
    pub action: String,
    /// Action parameters.
    #[serde(default)]
    pub params: Value,
}

impl Request {
    /// Creates a request envelope.
    #[must_use]
    pub fn new(action: impl Into<String>, params: Value) -> Self {
        Self {
            action: action.into(),
            params,
        }
    }

    /// Creates a parameterless request envelope.
    #[must_use]
    pub fn bare(action: impl Into<String>) -> Self {
        Self::new(action, Value::Object(serde_json::Map::new()))
    }
}

// ============================================================================
// SECTION: Response Envelope
// ============================================================================

/// Response envelope returned by a service address.
///
/// # Invariants
/// - Exactly one of `content` and `error` is populated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response {
    /// Name of the answering service.
    pub service: String,
    /// Echo of the requested action.
    pub action: String,
    /// Success payload.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<Value>,
    /// Failure description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Response {
    /// Creates a success response.
    #[must_use]
    pub fn content(service: impl Into<String>, action: impl Into<String>, content: Value) -> Self {
        Self {
            service: service.into(),
            action: action.into(),
            content: Some(content),
            error: None,
        }
    }

    /// Creates a failure response.
    #[must_use]
    pub fn error(service: impl Into<String>, action: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            action: action.into(),
            content: None,
            error: Some(error.into()),
        }
    }

    /// Returns true when the response carries an error.
    #[must_use]
    pub const fn is_error(&self) -> bool {
        self.error.is_some()
    }
}
