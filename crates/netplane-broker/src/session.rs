// crates/netplane-broker/src/session.rs
// ============================================================================
// Module: Netplane Broker Session
// Description: Connection lifecycle and RPC-style broker primitives.
// Purpose: Provide call/subscribe building blocks for discovery and tasks.
// Dependencies: netplane-core, rand, serde_json, tokio, crate::transport
// ============================================================================

//! ## Overview
//! [`BrokerSession`] owns one transport connection and provides the two
//! primitives everything else is built on: [`BrokerSession::call`] (send a
//! message, bind a fresh ephemeral reply address, resolve on the first reply)
//! and [`BrokerSession::subscribe`] (bind a durable handler to a topic).
//! Invariants:
//! - Every call binds a fresh reply address; two in-flight calls can never
//!   observe each other's replies.
//! - Calls are bounded by the configured timeout and resolve exactly once.
//! - `close` is safe after partial initialization failure.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;
use std::time::Duration;
use std::time::Instant;

use netplane_core::Capability;
use serde_json::Value;
use serde_json::json;
use thiserror::Error;
use tokio::task::JoinHandle;
use tokio::time::timeout;

use crate::telemetry::CallOutcome;
use crate::telemetry::NoopSessionEvents;
use crate::telemetry::SessionEvents;
use crate::transport::Transport;
use crate::transport::TransportError;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Well-known address answering authentication exchanges.
pub const AUTHENTICATION_ADDRESS: &str = "/client/authentication";

/// Well-known address answering capability discovery.
pub const CAPABILITIES_ADDRESS: &str = "/client/capabilities";

/// Default bound on a request/reply call.
const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(10);

// ============================================================================
// SECTION: Session Errors
// ============================================================================

/// Errors surfaced by the broker session.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Broker unreachable or misconfigured; fatal to the owning service.
    #[error("broker connection failed: {0}")]
    Connection(String),
    /// Credentials rejected; fatal to the owning service.
    #[error("authentication failed: {0}")]
    Auth(String),
    /// Transient broker send failure; reported, not retried.
    #[error("broker send failed: {0}")]
    Send(String),
    /// No reply arrived within the configured bound.
    #[error("broker call timed out after {0:?}")]
    Timeout(Duration),
    /// Operation requires an open connection.
    #[error("session is not connected")]
    NotConnected,
    /// Operation requires an authenticated identity.
    #[error("session is not authenticated")]
    NotAuthenticated,
    /// Reply body failed to decode.
    #[error("broker reply failed to decode: {0}")]
    Decode(String),
}

// ============================================================================
// SECTION: Identity
// ============================================================================

/// Broker-assigned identity returned by authentication.
///
/// # Invariants
/// - `name` is non-empty; an empty name is an authentication failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    /// Broker-assigned client name; stamps specification tokens.
    pub name: String,
    /// Broker-assigned client role; selects capability visibility.
    pub role: String,
}

// ============================================================================
// SECTION: Broker Session
// ============================================================================

/// Mutable session state guarded behind one lock.
#[derive(Debug, Default)]
struct SessionState {
    /// True after a successful connect.
    connected: bool,
    /// Identity assigned by authentication.
    identity: Option<Identity>,
}

/// One connection to the message broker plus the call/subscribe primitives.
///
/// # Invariants
/// - Reply addresses combine a per-session random tag with a monotonic
///   counter; no two calls ever share an address.
pub struct BrokerSession {
    /// Underlying transport.
    transport: Arc<dyn Transport>,
    /// Bound on request/reply calls.
    call_timeout: Duration,
    /// Telemetry hooks.
    events: Arc<dyn SessionEvents>,
    /// Connection and identity state.
    state: Mutex<SessionState>,
    /// Per-session random tag embedded in reply addresses.
    reply_tag: String,
    /// Monotonic reply-address counter.
    reply_seq: AtomicU64,
    /// Running subscription pumps, aborted on close.
    subscriptions: Mutex<Vec<JoinHandle<()>>>,
}

impl BrokerSession {
    /// Creates a session over the given transport with default settings.
    #[must_use]
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            call_timeout: DEFAULT_CALL_TIMEOUT,
            events: Arc::new(NoopSessionEvents),
            state: Mutex::new(SessionState::default()),
            reply_tag: format!("{:016x}", rand::random::<u64>()),
            reply_seq: AtomicU64::new(0),
            subscriptions: Mutex::new(Vec::new()),
        }
    }

    /// Sets the request/reply timeout.
    #[must_use]
    pub const fn with_call_timeout(mut self, call_timeout: Duration) -> Self {
        self.call_timeout = call_timeout;
        self
    }

    /// Installs telemetry hooks.
    #[must_use]
    pub fn with_events(mut self, events: Arc<dyn SessionEvents>) -> Self {
        self.events = events;
        self
    }

    /// Opens the broker connection.
    ///
    /// Fails fast on unset host/port before touching the transport.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Connection`] on bad parameters or a refused
    /// handshake.
    pub async fn connect(&self, host: &str, port: u16) -> Result<(), SessionError> {
        if host.is_empty() || port == 0 {
            return Err(SessionError::Connection("wrong broker parameters".to_string()));
        }
        self.transport
            .connect(host, port)
            .await
            .map_err(|err| SessionError::Connection(err.to_string()))?;
        if let Ok(mut state) = self.state.lock() {
            state.connected = true;
        }
        self.events.connected(host, port);
        Ok(())
    }

    /// Authenticates against the well-known authentication address.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Auth`] when the broker answers with an empty
    /// client name, and call errors otherwise.
    pub async fn authenticate(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Identity, SessionError> {
        let reply = self
            .call(AUTHENTICATION_ADDRESS, json!({ "username": username, "password": password }))
            .await?;
        let name = reply.get("name").and_then(Value::as_str).unwrap_or("").to_string();
        let role = reply.get("role").and_then(Value::as_str).unwrap_or("").to_string();
        if name.is_empty() {
            return Err(SessionError::Auth("broker returned an empty client name".to_string()));
        }
        let identity = Identity {
            name,
            role,
        };
        if let Ok(mut state) = self.state.lock() {
            state.identity = Some(identity.clone());
        }
        self.events.authenticated(&identity);
        Ok(identity)
    }

    /// Returns the authenticated identity, if any.
    #[must_use]
    pub fn identity(&self) -> Option<Identity> {
        self.state.lock().ok().and_then(|state| state.identity.clone())
    }

    /// Sends a request and resolves with the first reply on a fresh
    /// ephemeral reply address.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Send`] when the message cannot be handed to
    /// the broker and [`SessionError::Timeout`] when no reply arrives within
    /// the configured bound.
    pub async fn call(&self, destination: &str, payload: Value) -> Result<Value, SessionError> {
        self.ensure_connected()?;
        let reply_address = self.next_reply_address();
        let started = Instant::now();
        let mut replies = self
            .transport
            .bind(&reply_address)
            .await
            .map_err(|err| SessionError::Send(err.to_string()))?;
        if let Err(err) = self.transport.send(destination, Some(&reply_address), payload).await {
            self.events.call_resolved(destination, CallOutcome::SendFailed, started.elapsed());
            return Err(SessionError::Send(err.to_string()));
        }
        match timeout(self.call_timeout, replies.recv()).await {
            Ok(Some(delivery)) => {
                self.events.call_resolved(destination, CallOutcome::Reply, started.elapsed());
                Ok(delivery.body)
            }
            Ok(None) => {
                self.events.call_resolved(destination, CallOutcome::SendFailed, started.elapsed());
                Err(SessionError::Send("reply channel closed".to_string()))
            }
            Err(_) => {
                self.events.call_resolved(destination, CallOutcome::Timeout, started.elapsed());
                Err(SessionError::Timeout(self.call_timeout))
            }
        }
    }

    /// Binds a durable handler to a topic address.
    ///
    /// The handler runs once per inbound message until the session closes;
    /// the session owns the subscription's lifetime.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Send`] when the topic cannot be bound.
    pub async fn subscribe(
        &self,
        topic: &str,
        handler: impl Fn(Value) + Send + Sync + 'static,
    ) -> Result<(), SessionError> {
        self.ensure_connected()?;
        let mut deliveries = self
            .transport
            .bind(topic)
            .await
            .map_err(|err| SessionError::Send(err.to_string()))?;
        let pump = tokio::spawn(async move {
            while let Some(delivery) = deliveries.recv().await {
                handler(delivery.body);
            }
        });
        if let Ok(mut subscriptions) = self.subscriptions.lock() {
            subscriptions.push(pump);
        }
        Ok(())
    }

    /// Discovers every capability offered to the authenticated role.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::NotAuthenticated`] before authentication and
    /// call/decode errors otherwise.
    pub async fn discover_capabilities(&self) -> Result<Vec<Capability>, SessionError> {
        let identity = self.identity().ok_or(SessionError::NotAuthenticated)?;
        let reply =
            self.call(CAPABILITIES_ADDRESS, json!({ "client_role": identity.role })).await?;
        serde_json::from_value(reply).map_err(|err| SessionError::Decode(err.to_string()))
    }

    /// Releases the connection and stops every subscription pump.
    ///
    /// Safe to call after partial initialization failure and safe to call
    /// more than once.
    pub async fn close(&self) {
        if let Ok(mut subscriptions) = self.subscriptions.lock() {
            for pump in subscriptions.drain(..) {
                pump.abort();
            }
        }
        let _ = self.transport.close().await;
        if let Ok(mut state) = self.state.lock() {
            state.connected = false;
        }
        self.events.closed();
    }

    /// Fails with [`SessionError::NotConnected`] before a successful connect.
    fn ensure_connected(&self) -> Result<(), SessionError> {
        let connected = self.state.lock().map(|state| state.connected).unwrap_or(false);
        if connected {
            Ok(())
        } else {
            Err(SessionError::NotConnected)
        }
    }

    /// Returns the next ephemeral reply address.
    fn next_reply_address(&self) -> String {
        let seq = self.reply_seq.fetch_add(1, Ordering::Relaxed) + 1;
        format!("netplane/reply/{}-{seq}", self.reply_tag)
    }
}

impl From<TransportError> for SessionError {
    fn from(err: TransportError) -> Self {
        Self::Send(err.to_string())
    }
}
