// crates/netplane-broker/src/loopback.rs
// ============================================================================
// Module: Loopback Transport
// Description: In-process reference transport and broker-side responders.
// Purpose: Route addressed messages in memory for tests and demos.
// Dependencies: serde_json, tokio, crate::transport
// ============================================================================

//! ## Overview
//! [`LoopbackTransport`] is an in-memory address router implementing
//! [`Transport`]: sends are delivered to whichever consumer is bound to the
//! destination address, and unbound destinations discard silently, matching
//! broker semantics. [`LoopbackBroker`] adds the broker-side responders for
//! authentication and capability discovery so a full session handshake can
//! run without an external broker.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;

use netplane_core::Capability;
use serde_json::Value;
use serde_json::json;
use tokio::sync::mpsc;

use crate::transport::Delivery;
use crate::transport::Transport;
use crate::transport::TransportError;
use async_trait::async_trait;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Delivery queue depth for each bound address.
const BINDING_CAPACITY: usize = 64;

// ============================================================================
// SECTION: Loopback Transport
// ============================================================================

/// In-memory address router implementing [`Transport`].
///
/// # Invariants
/// - Per-address delivery order matches send order.
/// - Rebinding an address replaces the previous consumer.
#[derive(Debug, Default)]
pub struct LoopbackTransport {
    /// Consumers keyed by bound address.
    bindings: Mutex<BTreeMap<String, mpsc::Sender<Delivery>>>,
    /// True once `close` has run.
    closed: AtomicBool,
}

impl LoopbackTransport {
    /// Creates an empty loopback transport.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of consumer bindings currently held.
    #[must_use]
    pub fn binding_count(&self) -> usize {
        self.bindings.lock().map(|bindings| bindings.len()).unwrap_or(0)
    }
}

#[async_trait]
impl Transport for LoopbackTransport {
    async fn connect(&self, _host: &str, _port: u16) -> Result<(), TransportError> {
        if self.closed.load(Ordering::Acquire) {
            return Err(TransportError::Refused("transport is closed".to_string()));
        }
        Ok(())
    }

    async fn send(
        &self,
        to: &str,
        reply_to: Option<&str>,
        body: Value,
    ) -> Result<(), TransportError> {
        if self.closed.load(Ordering::Acquire) {
            return Err(TransportError::Closed);
        }
        let consumer = self.bindings.lock().ok().and_then(|bindings| bindings.get(to).cloned());
        let Some(consumer) = consumer else {
            // Unbound destination: the broker accepts and discards.
            return Ok(());
        };
        let delivery = Delivery {
            reply_to: reply_to.map(str::to_string),
            body,
        };
        if consumer.send(delivery).await.is_err()
            && let Ok(mut bindings) = self.bindings.lock()
        {
            // Consumer went away; prune the stale binding.
            bindings.remove(to);
        }
        Ok(())
    }

    async fn bind(&self, address: &str) -> Result<mpsc::Receiver<Delivery>, TransportError> {
        if self.closed.load(Ordering::Acquire) {
            return Err(TransportError::Closed);
        }
        let (sender, receiver) = mpsc::channel(BINDING_CAPACITY);
        if let Ok(mut bindings) = self.bindings.lock() {
            // One-shot reply addresses drop their receiver after the first
            // reply and never see another send; prune them here.
            bindings.retain(|_, consumer| !consumer.is_closed());
            bindings.insert(address.to_string(), sender);
        }
        Ok(receiver)
    }

    async fn close(&self) -> Result<(), TransportError> {
        self.closed.store(true, Ordering::Release);
        if let Ok(mut bindings) = self.bindings.lock() {
            bindings.clear();
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Loopback Broker
// ============================================================================

/// Credential record held by the loopback broker.
#[derive(Debug, Clone)]
struct Account {
    /// Expected password.
    password: String,
    /// Role assigned on successful authentication.
    role: String,
}

/// Broker-side responders for authentication and capability discovery.
///
/// # Invariants
/// - Failed authentication replies with an empty client name.
/// - Discovery replies contain only capabilities offered to the caller role.
#[derive(Debug, Default)]
pub struct LoopbackBroker {
    /// Accounts keyed by username.
    accounts: BTreeMap<String, Account>,
    /// Advertised capabilities.
    capabilities: Vec<Capability>,
}

impl LoopbackBroker {
    /// Creates a broker with no accounts and no capabilities.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an account.
    #[must_use]
    pub fn with_account(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
        role: impl Into<String>,
    ) -> Self {
        self.accounts.insert(username.into(), Account {
            password: password.into(),
            role: role.into(),
        });
        self
    }

    /// Advertises a capability.
    #[must_use]
    pub fn with_capability(mut self, capability: Capability) -> Self {
        self.capabilities.push(capability);
        self
    }

    /// Binds the authentication and discovery responders on the transport.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] when an address cannot be bound.
    pub async fn spawn(self, transport: Arc<LoopbackTransport>) -> Result<(), TransportError> {
        let mut auth_requests = transport.bind(crate::session::AUTHENTICATION_ADDRESS).await?;
        let mut discovery_requests = transport.bind(crate::session::CAPABILITIES_ADDRESS).await?;
        let accounts = self.accounts;
        let capabilities = self.capabilities;

        let auth_transport = Arc::clone(&transport);
        tokio::spawn(async move {
            while let Some(request) = auth_requests.recv().await {
                let Some(reply_to) = request.reply_to else {
                    continue;
                };
                let username =
                    request.body.get("username").and_then(Value::as_str).unwrap_or_default();
                let password =
                    request.body.get("password").and_then(Value::as_str).unwrap_or_default();
                let reply = match accounts.get(username) {
                    Some(account) if account.password == password => {
                        json!({ "name": username, "role": account.role })
                    }
                    _ => json!({ "name": "", "role": "" }),
                };
                let _ = auth_transport.send(&reply_to, None, reply).await;
            }
        });

        tokio::spawn(async move {
            while let Some(request) = discovery_requests.recv().await {
                let Some(reply_to) = request.reply_to else {
                    continue;
                };
                let role =
                    request.body.get("client_role").and_then(Value::as_str).unwrap_or_default();
                let offered: Vec<&Capability> =
                    capabilities.iter().filter(|capability| capability.role == role).collect();
                let _ = transport.send(&reply_to, None, json!(offered)).await;
            }
        });

        Ok(())
    }
}
