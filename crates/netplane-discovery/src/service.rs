// crates/netplane-discovery/src/service.rs
// ============================================================================
// Module: Data Service Actor
// Description: Bus-facing surface for discovery and specification control.
// Purpose: Expose capabilities and task control; fan admitted results out.
// Dependencies: netplane-broker, netplane-bus, netplane-core, serde_json,
//               tokio, crate::lifecycle
// ============================================================================

//! ## Overview
//! The data service answers the discovery/task actions on the dispatch bus
//! (`get_service_info`, `get_capabilities`, `send_specification`,
//! `send_interrupt`) and owns the downstream leg of result correlation:
//! every admitted result is handed to storage and forwarded to the topology
//! side. Every request is answered exactly once; unrecognized actions reply
//! with an error envelope.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::str::FromStr;
use std::sync::Arc;

use netplane_broker::BrokerSession;
use netplane_bus::Bus;
use netplane_bus::BusRequest;
use netplane_bus::DATA_SERVICE;
use netplane_bus::Response;
use netplane_bus::StorageClient;
use netplane_core::Capability;
use netplane_core::Measurement;
use netplane_core::Schedule;
use netplane_core::SchemaId;
use serde_json::Value;
use serde_json::json;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::lifecycle::LifecycleHandle;

// ============================================================================
// SECTION: Data Service
// ============================================================================

/// Bus-facing data service actor.
struct DataService {
    /// Session answering live capability discovery.
    session: Arc<BrokerSession>,
    /// Lifecycle handle for issue/interrupt.
    lifecycle: LifecycleHandle,
    /// Storage delegate persisting admitted results.
    storage: StorageClient,
    /// Downstream consumer of admitted results.
    measurements: mpsc::Sender<Measurement>,
}

/// Spawns the data service on the bus.
///
/// `results` is the admitted-result stream produced by the lifecycle actor;
/// each result is persisted through storage and forwarded on
/// `measurements` for topology reconciliation.
#[must_use]
pub fn spawn_data_service(
    bus: &Bus,
    session: Arc<BrokerSession>,
    lifecycle: LifecycleHandle,
    storage: StorageClient,
    mut results: mpsc::Receiver<Measurement>,
    measurements: mpsc::Sender<Measurement>,
) -> JoinHandle<()> {
    let mut mailbox = bus.serve(DATA_SERVICE);
    let service = DataService {
        session,
        lifecycle,
        storage,
        measurements,
    };
    tokio::spawn(async move {
        loop {
            tokio::select! {
                queued = mailbox.recv() => {
                    let Some(BusRequest { request, reply }) = queued else {
                        break;
                    };
                    let response = service.answer(&request.action, request.params).await;
                    let _ = reply.send(response);
                }
                result = results.recv() => {
                    let Some(result) = result else {
                        break;
                    };
                    service.consume(result).await;
                }
            }
        }
    })
}

impl DataService {
    /// Answers one bus request.
    async fn answer(&self, action: &str, params: Value) -> Response {
        let outcome = match action {
            "get_service_info" => Ok(json!({
                "service": DATA_SERVICE,
                "info": "capability discovery and specification control",
            })),
            "get_capabilities" => self.get_capabilities().await,
            "send_specification" => self.send_specification(params).await,
            "send_interrupt" => self.send_interrupt(&params).await,
            _ => Err("unknown action".to_string()),
        };
        match outcome {
            Ok(content) => Response::content(DATA_SERVICE, action, content),
            Err(error) => Response::error(DATA_SERVICE, action, error),
        }
    }

    /// Persists and forwards one admitted result.
    async fn consume(&self, result: Measurement) {
        // Storage failures must not stall reconciliation.
        let _ = self.storage.add_result(&result).await;
        let _ = self.measurements.send(result).await;
    }

    /// Discovers the capabilities offered to the authenticated role.
    async fn get_capabilities(&self) -> Result<Value, String> {
        let capabilities =
            self.session.discover_capabilities().await.map_err(|err| err.to_string())?;
        serde_json::to_value(capabilities).map_err(|err| err.to_string())
    }

    /// Issues a specification from a capability and a window string.
    async fn send_specification(&self, params: Value) -> Result<Value, String> {
        let capability = params
            .get("capability")
            .cloned()
            .ok_or_else(|| "missing field: capability".to_string())?;
        let capability: Capability =
            serde_json::from_value(capability).map_err(|err| err.to_string())?;
        let when = params
            .get("when")
            .and_then(Value::as_str)
            .ok_or_else(|| "missing field: when".to_string())?;
        let window = Schedule::from_str(when).map_err(|err| err.to_string())?;
        let receipt =
            self.lifecycle.issue(capability, window).await.map_err(|err| err.to_string())?;
        serde_json::to_value(receipt).map_err(|err| err.to_string())
    }

    /// Interrupts an active specification by schema.
    async fn send_interrupt(&self, params: &Value) -> Result<Value, String> {
        let schema = params
            .get("schema")
            .and_then(Value::as_str)
            .ok_or_else(|| "missing field: schema".to_string())?;
        let receipt = self
            .lifecycle
            .interrupt(SchemaId::new(schema))
            .await
            .map_err(|err| err.to_string())?;
        serde_json::to_value(receipt).map_err(|err| err.to_string())
    }
}
