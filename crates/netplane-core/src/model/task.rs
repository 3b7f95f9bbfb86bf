// crates/netplane-core/src/model/task.rs
// ============================================================================
// Module: Netplane Task Messages
// Description: Specification, receipt, and interrupt message types.
// Purpose: Model the issue/acknowledge/cancel legs of the task lifecycle.
// Dependencies: serde, crate::model
// ============================================================================

//! ## Overview
//! A [`Specification`] is a concrete, time-bounded instantiation of a
//! capability. The broker acknowledges it with a [`Receipt`] whose schema
//! correlates all later results, and an [`Interrupt`] built from that receipt
//! cancels the task.
//! Invariants:
//! - A specification is sent once and never mutated afterwards.
//! - A receipt with a non-empty error list is never registered as active.
//! - An interrupt is single-use and derived from the stored receipt.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;

use crate::model::capability::Capability;
use crate::model::identifiers::AgentId;
use crate::model::identifiers::SchemaId;
use crate::model::schedule::Schedule;

// ============================================================================
// SECTION: Specification
// ============================================================================

/// Concrete, time-bounded instantiation of a capability.
///
/// # Invariants
/// - `parameters` binds a value to every parameter the capability declared.
/// - `when` is the wire form of the schedule window.
/// - Never mutated after send.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Specification {
    /// Capability name tag the task was derived from.
    pub name: String,
    /// Identifier of the executing agent.
    pub agent_id: AgentId,
    /// Address prefix the task is sent to (`<endpoint>/specifications`).
    pub endpoint: String,
    /// Parameter values keyed by the capability's declared names.
    pub parameters: BTreeMap<String, String>,
    /// Schedule window wire string (`"<start> ... <stop> / <periodMs>"`).
    pub when: String,
    /// Issuer token; stamped with the authenticated client name before send.
    pub token: String,
}

impl Specification {
    /// Builds a specification from a capability and a schedule window.
    ///
    /// Every declared parameter is bound to an empty value; callers bind
    /// concrete values with [`Specification::bind`] before sending.
    #[must_use]
    pub fn from_capability(capability: &Capability, window: Schedule) -> Self {
        let parameters = capability
            .parameters
            .iter()
            .map(|name| (name.clone(), String::new()))
            .collect();
        Self {
            name: capability.name.clone(),
            agent_id: capability.agent_id.clone(),
            endpoint: capability.endpoint.clone(),
            parameters,
            when: window.to_string(),
            token: String::new(),
        }
    }

    /// Binds a parameter value; unknown names are ignored.
    pub fn bind(&mut self, name: &str, value: impl Into<String>) {
        if let Some(slot) = self.parameters.get_mut(name) {
            *slot = value.into();
        }
    }

    /// Stamps the issuer token with the authenticated client name.
    pub fn set_token(&mut self, token: impl Into<String>) {
        self.token = token.into();
    }
}

// ============================================================================
// SECTION: Receipt
// ============================================================================

/// Broker acknowledgment of a specification.
///
/// # Invariants
/// - `schema` is globally unique across currently active tasks.
/// - An empty `errors` list means the specification was accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receipt {
    /// Globally unique task identifier correlating results and interrupts.
    pub schema: SchemaId,
    /// Address prefix the acknowledging agent serves.
    pub endpoint: String,
    /// Identifier of the acknowledging agent.
    pub agent_id: AgentId,
    /// Role of the client the results will be published to.
    pub client_role: String,
    /// Agent-reported errors; empty means accepted.
    #[serde(default)]
    pub errors: Vec<String>,
}

impl Receipt {
    /// Returns true when the receipt carries no errors.
    #[must_use]
    pub fn is_accepted(&self) -> bool {
        self.errors.is_empty()
    }

    /// Returns the result topic named by this receipt.
    #[must_use]
    pub fn result_topic(&self) -> String {
        format!("{}/results/{}", self.endpoint, self.client_role)
    }
}

// ============================================================================
// SECTION: Interrupt
// ============================================================================

/// Cancellation request for an active specification.
///
/// # Invariants
/// - Built from the stored receipt of the task it cancels.
/// - Single-use; sent once as a fire-and-forget request/reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interrupt {
    /// Schema of the task being cancelled.
    pub schema: SchemaId,
    /// Address prefix the interrupt is sent to (`<endpoint>/specifications`).
    pub endpoint: String,
    /// Identifier of the executing agent.
    pub agent_id: AgentId,
    /// Epoch-millisecond timestamp at which the interrupt was created.
    pub timestamp_millis: u64,
}

impl Interrupt {
    /// Builds an interrupt from the stored receipt of an active task.
    #[must_use]
    pub fn from_receipt(receipt: &Receipt, timestamp_millis: u64) -> Self {
        Self {
            schema: receipt.schema.clone(),
            endpoint: receipt.endpoint.clone(),
            agent_id: receipt.agent_id.clone(),
            timestamp_millis,
        }
    }
}
