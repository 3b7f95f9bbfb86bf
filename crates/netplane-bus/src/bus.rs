// crates/netplane-bus/src/bus.rs
// ============================================================================
// Module: Netplane Dispatch Bus
// Description: In-process request/reply and publish/subscribe fabric.
// Purpose: Route envelopes between single-owner service actors.
// Dependencies: serde_json, tokio
// ============================================================================

//! ## Overview
//! [`Bus`] routes [`Request`] envelopes to registered service mailboxes and
//! fans publications out over broadcast topics. Each service owns its mutable
//! state on one task and drains its mailbox there, preserving single-writer
//! semantics; the bus itself holds only routing tables.
//! Invariants:
//! - `request` resolves exactly once, with an error response when the address
//!   is unknown or the service is gone.
//! - Handlers reply through a one-shot channel; a dropped reply surfaces as
//!   an error response, never a hang.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::Mutex;

use serde_json::Value;
use tokio::sync::broadcast;
use tokio::sync::mpsc;
use tokio::sync::oneshot;

use crate::envelope::Request;
use crate::envelope::Response;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Bounded mailbox depth for each registered service address.
const MAILBOX_CAPACITY: usize = 64;

/// Buffered publication depth for each broadcast topic.
const TOPIC_CAPACITY: usize = 32;

// ============================================================================
// SECTION: Bus Messages
// ============================================================================

/// One queued request awaiting a service's reply.
#[derive(Debug)]
pub struct BusRequest {
    /// Request envelope.
    pub request: Request,
    /// One-shot reply channel; must be resolved exactly once.
    pub reply: oneshot::Sender<Response>,
}

/// One publication fanned out on a broadcast topic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Publication {
    /// Name of the publishing service.
    pub service: String,
    /// Published payload.
    pub content: Value,
}

// ============================================================================
// SECTION: Dispatch Bus
// ============================================================================

/// Shared routing tables behind a cloneable bus handle.
#[derive(Debug, Default)]
struct BusInner {
    /// Service mailboxes keyed by address.
    services: Mutex<BTreeMap<String, mpsc::Sender<BusRequest>>>,
    /// Broadcast topics keyed by name.
    topics: Mutex<BTreeMap<String, broadcast::Sender<Publication>>>,
}

/// In-process dispatch bus connecting Netplane services.
///
/// # Invariants
/// - Cloning shares the routing tables; clones are cheap handles.
#[derive(Debug, Clone, Default)]
pub struct Bus {
    /// Shared routing state.
    inner: Arc<BusInner>,
}

impl Bus {
    /// Creates an empty bus.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a service mailbox for an address and returns its receiver.
    ///
    /// Re-registering an address replaces the previous mailbox; requests sent
    /// to the replaced mailbox resolve with an error response once the old
    /// receiver is dropped.
    #[must_use]
    pub fn serve(&self, address: &str) -> mpsc::Receiver<BusRequest> {
        let (sender, receiver) = mpsc::channel(MAILBOX_CAPACITY);
        if let Ok(mut services) = self.inner.services.lock() {
            services.insert(address.to_string(), sender);
        }
        receiver
    }

    /// Sends a request to a service address and awaits its single reply.
    ///
    /// Never hangs: unknown addresses, full or closed mailboxes, and dropped
    /// reply channels all resolve with an error response.
    pub async fn request(&self, address: &str, request: Request) -> Response {
        let action = request.action.clone();
        let sender = self
            .inner
            .services
            .lock()
            .ok()
            .and_then(|services| services.get(address).cloned());
        let Some(sender) = sender else {
            return Response::error(address, action, "unknown service address");
        };
        let (reply, answered) = oneshot::channel();
        let queued = BusRequest {
            request,
            reply,
        };
        if sender.send(queued).await.is_err() {
            return Response::error(address, action, "service unavailable");
        }
        match answered.await {
            Ok(response) => response,
            Err(_) => Response::error(address, action, "service dropped the request"),
        }
    }

    /// Publishes a payload on a broadcast topic.
    ///
    /// Fire-and-forget: publications without subscribers are discarded.
    pub fn publish(&self, topic: &str, service: impl Into<String>, content: Value) {
        let publication = Publication {
            service: service.into(),
            content,
        };
        let sender = self.topic_sender(topic);
        let _ = sender.send(publication);
    }

    /// Subscribes to a broadcast topic.
    #[must_use]
    pub fn subscribe(&self, topic: &str) -> broadcast::Receiver<Publication> {
        self.topic_sender(topic).subscribe()
    }

    /// Returns the broadcast sender for a topic, creating it on first use.
    fn topic_sender(&self, topic: &str) -> broadcast::Sender<Publication> {
        if let Ok(mut topics) = self.inner.topics.lock() {
            return topics
                .entry(topic.to_string())
                .or_insert_with(|| broadcast::channel(TOPIC_CAPACITY).0)
                .clone();
        }
        // Lock poisoning is unreachable with the short critical sections
        // above; fall back to a detached sender so publish stays total.
        broadcast::channel(TOPIC_CAPACITY).0
    }
}
