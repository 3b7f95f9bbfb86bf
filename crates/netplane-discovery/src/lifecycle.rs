// crates/netplane-discovery/src/lifecycle.rs
// ============================================================================
// Module: Specification Lifecycle
// Description: Issue, correlate, and interrupt active specifications.
// Purpose: Own the schema registry gating result admission.
// Dependencies: netplane-broker, netplane-core, serde_json, thiserror, tokio,
//               crate::telemetry
// ============================================================================

//! ## Overview
//! The lifecycle actor owns the active-specification registry (schema to
//! receipt) on one task and is the single authoritative admission gate:
//! a streamed result reaches the downstream sink iff its schema is registered
//! at the moment of delivery. Results arriving before registration completes
//! are dropped, never queued; results arriving after an interrupt removes the
//! schema are likewise dropped.
//! Invariants:
//! - A receipt with a non-empty error list is never registered.
//! - No two active entries share a schema.
//! - Interrupting an unknown schema fails without touching the broker.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use netplane_broker::BrokerSession;
use netplane_broker::SessionError;
use netplane_core::Capability;
use netplane_core::Interrupt;
use netplane_core::Measurement;
use netplane_core::Receipt;
use netplane_core::Schedule;
use netplane_core::SchemaId;
use netplane_core::Specification;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::sync::oneshot;

use crate::telemetry::DiscoveryEvents;
use crate::telemetry::NoopDiscoveryEvents;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Bounded mailbox depth for lifecycle commands.
const COMMAND_CAPACITY: usize = 64;

// ============================================================================
// SECTION: Lifecycle Errors
// ============================================================================

/// Errors surfaced by the specification lifecycle.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum LifecycleError {
    /// Broker exchange failed.
    #[error(transparent)]
    Session(#[from] SessionError),
    /// Interrupt requested for a schema that is not registered.
    #[error("schema {0} is not registered")]
    NotFound(SchemaId),
    /// Broker reply failed to decode as a receipt.
    #[error("receipt failed to decode: {0}")]
    Decode(String),
    /// The lifecycle actor is gone.
    #[error("specification lifecycle is closed")]
    Closed,
}

// ============================================================================
// SECTION: Lifecycle Commands
// ============================================================================

/// One queued lifecycle command.
enum LifecycleCommand {
    /// Issue a specification derived from a capability.
    Issue {
        /// Capability to instantiate.
        capability: Capability,
        /// Schedule window for the specification.
        window: Schedule,
        /// Reply channel resolved with the broker receipt.
        reply: oneshot::Sender<Result<Receipt, LifecycleError>>,
    },
    /// Interrupt an active specification by schema.
    Interrupt {
        /// Schema of the specification to cancel.
        schema: SchemaId,
        /// Reply channel resolved with the broker receipt.
        reply: oneshot::Sender<Result<Receipt, LifecycleError>>,
    },
    /// Report the currently registered schemas.
    ActiveSchemas {
        /// Reply channel resolved with the schema list.
        reply: oneshot::Sender<Vec<SchemaId>>,
    },
}

// ============================================================================
// SECTION: Lifecycle Handle
// ============================================================================

/// Cloneable handle to the lifecycle actor.
///
/// # Invariants
/// - Every command resolves exactly once; a dropped actor surfaces as
///   [`LifecycleError::Closed`], never a hang.
#[derive(Clone)]
pub struct LifecycleHandle {
    /// Command mailbox of the owning actor.
    commands: mpsc::Sender<LifecycleCommand>,
}

impl LifecycleHandle {
    /// Issues a specification and registers its accepted receipt.
    ///
    /// The receipt is returned even when it carries errors so the caller can
    /// inspect the rejection.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError`] on broker or decode failure.
    pub async fn issue(
        &self,
        capability: Capability,
        window: Schedule,
    ) -> Result<Receipt, LifecycleError> {
        let (reply, answered) = oneshot::channel();
        let command = LifecycleCommand::Issue {
            capability,
            window,
            reply,
        };
        if self.commands.send(command).await.is_err() {
            return Err(LifecycleError::Closed);
        }
        answered.await.map_err(|_| LifecycleError::Closed)?
    }

    /// Interrupts an active specification and removes it on success.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError::NotFound`] when the schema is not
    /// registered, and broker/decode errors otherwise.
    pub async fn interrupt(&self, schema: SchemaId) -> Result<Receipt, LifecycleError> {
        let (reply, answered) = oneshot::channel();
        let command = LifecycleCommand::Interrupt {
            schema,
            reply,
        };
        if self.commands.send(command).await.is_err() {
            return Err(LifecycleError::Closed);
        }
        answered.await.map_err(|_| LifecycleError::Closed)?
    }

    /// Returns the currently registered schemas.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError::Closed`] when the actor is gone.
    pub async fn active_schemas(&self) -> Result<Vec<SchemaId>, LifecycleError> {
        let (reply, answered) = oneshot::channel();
        let command = LifecycleCommand::ActiveSchemas {
            reply,
        };
        if self.commands.send(command).await.is_err() {
            return Err(LifecycleError::Closed);
        }
        answered.await.map_err(|_| LifecycleError::Closed)
    }
}

// ============================================================================
// SECTION: Lifecycle Actor
// ============================================================================

/// Single-owner actor state for the active-specification registry.
struct LifecycleActor {
    /// Session carrying issue/interrupt calls and result subscriptions.
    session: Arc<BrokerSession>,
    /// Active receipts keyed by schema.
    active: BTreeMap<SchemaId, Receipt>,
    /// Result topics already subscribed on the session.
    subscribed: BTreeSet<String>,
    /// Inbound results queued by topic subscriptions.
    deliveries: mpsc::UnboundedSender<Measurement>,
    /// Downstream sink for admitted results.
    sink: mpsc::Sender<Measurement>,
    /// Event hooks for admission outcomes.
    events: Arc<dyn DiscoveryEvents>,
}

/// Spawns the lifecycle actor and returns its handle.
///
/// Admitted results flow into `sink`; the caller owns the receiving end.
#[must_use]
pub fn spawn_lifecycle(
    session: Arc<BrokerSession>,
    sink: mpsc::Sender<Measurement>,
) -> LifecycleHandle {
    spawn_lifecycle_with_events(session, sink, Arc::new(NoopDiscoveryEvents))
}

/// Spawns the lifecycle actor with the given event hooks.
///
/// Admission and drop outcomes are reported through `events`.
#[must_use]
pub fn spawn_lifecycle_with_events(
    session: Arc<BrokerSession>,
    sink: mpsc::Sender<Measurement>,
    events: Arc<dyn DiscoveryEvents>,
) -> LifecycleHandle {
    let (commands, mut mailbox) = mpsc::channel(COMMAND_CAPACITY);
    let (deliveries, mut inbound) = mpsc::unbounded_channel();
    let mut actor = LifecycleActor {
        session,
        active: BTreeMap::new(),
        subscribed: BTreeSet::new(),
        deliveries,
        sink,
        events,
    };
    tokio::spawn(async move {
        loop {
            tokio::select! {
                command = mailbox.recv() => {
                    let Some(command) = command else {
                        break;
                    };
                    actor.handle(command).await;
                }
                result = inbound.recv() => {
                    let Some(result) = result else {
                        break;
                    };
                    actor.admit(result).await;
                }
            }
        }
    });
    LifecycleHandle {
        commands,
    }
}

impl LifecycleActor {
    /// Dispatches one queued command.
    async fn handle(&mut self, command: LifecycleCommand) {
        match command {
            LifecycleCommand::Issue {
                capability,
                window,
                reply,
            } => {
                let _ = reply.send(self.issue(capability, window).await);
            }
            LifecycleCommand::Interrupt {
                schema,
                reply,
            } => {
                let _ = reply.send(self.interrupt(schema).await);
            }
            LifecycleCommand::ActiveSchemas {
                reply,
            } => {
                let _ = reply.send(self.active.keys().cloned().collect());
            }
        }
    }

    /// Forwards a result downstream iff its schema is registered.
    async fn admit(&self, result: Measurement) {
        if !self.active.contains_key(&result.schema) {
            // Unknown schema: expected, not an error.
            self.events.result_dropped(&result.schema);
            return;
        }
        self.events.result_admitted(&result.schema);
        let _ = self.sink.send(result).await;
    }

    /// Builds, sends, and registers a specification.
    async fn issue(
        &mut self,
        capability: Capability,
        window: Schedule,
    ) -> Result<Receipt, LifecycleError> {
        let mut specification = Specification::from_capability(&capability, window);
        if let Some(identity) = self.session.identity() {
            specification.set_token(identity.name);
        }
        let destination = format!("{}/specifications", specification.endpoint);
        let payload = serde_json::to_value(&specification)
            .map_err(|err| LifecycleError::Decode(err.to_string()))?;
        let reply = self.session.call(&destination, payload).await?;
        let receipt: Receipt =
            serde_json::from_value(reply).map_err(|err| LifecycleError::Decode(err.to_string()))?;
        if receipt.is_accepted() {
            self.register(&receipt).await?;
        }
        Ok(receipt)
    }

    /// Registers an accepted receipt and binds its result topic.
    async fn register(&mut self, receipt: &Receipt) -> Result<(), LifecycleError> {
        self.active.insert(receipt.schema.clone(), receipt.clone());
        let topic = receipt.result_topic();
        if self.subscribed.contains(&topic) {
            return Ok(());
        }
        let deliveries = self.deliveries.clone();
        self.session
            .subscribe(&topic, move |body| {
                if let Ok(result) = serde_json::from_value::<Measurement>(body) {
                    let _ = deliveries.send(result);
                }
            })
            .await?;
        self.subscribed.insert(topic);
        Ok(())
    }

    /// Interrupts an active specification and removes it on success.
    async fn interrupt(&mut self, schema: SchemaId) -> Result<Receipt, LifecycleError> {
        let Some(stored) = self.active.get(&schema) else {
            return Err(LifecycleError::NotFound(schema));
        };
        let interrupt = Interrupt::from_receipt(stored, epoch_millis());
        let destination = format!("{}/specifications", interrupt.endpoint);
        let payload = serde_json::to_value(&interrupt)
            .map_err(|err| LifecycleError::Decode(err.to_string()))?;
        let reply = self.session.call(&destination, payload).await?;
        let receipt: Receipt =
            serde_json::from_value(reply).map_err(|err| LifecycleError::Decode(err.to_string()))?;
        if receipt.is_accepted() {
            self.active.remove(&schema);
        }
        Ok(receipt)
    }
}

/// Returns the current epoch time in milliseconds.
fn epoch_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .ok()
        .and_then(|elapsed| u64::try_from(elapsed.as_millis()).ok())
        .unwrap_or(0)
}
