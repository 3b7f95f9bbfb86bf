// crates/netplane-discovery/src/registry.rs
// ============================================================================
// Module: Capability Registry
// Description: Periodic capability rediscovery with a seen-agent diff.
// Purpose: Report only newly observed capabilities on each discovery tick.
// Dependencies: netplane-broker, netplane-core, tokio
// ============================================================================

//! ## Overview
//! [`CapabilityRegistry`] tracks which agents have already been seen so each
//! refresh reports only newly observed capabilities. The seen-set is cleared
//! on a fixed cadence; the clear must run before the refresh in the same tick
//! so known agents can be rediscovered and their specifications renewed.
//! The registry is externally driven; scheduling belongs to the owning
//! service.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use std::time::Instant;

use netplane_broker::BrokerSession;
use netplane_broker::SessionError;
use netplane_core::AgentId;
use netplane_core::Capability;

// ============================================================================
// SECTION: Capability Registry
// ============================================================================

/// Seen-agent map with a fixed rediscovery cadence.
///
/// # Invariants
/// - `refresh` returns a capability at most once per reset window per agent.
/// - `reset_if_stale` runs strictly before `refresh` within a tick.
pub struct CapabilityRegistry {
    /// Session used for discovery calls.
    session: Arc<BrokerSession>,
    /// Capability name tag the registry is interested in.
    tag: String,
    /// Last-seen capability per agent.
    known: BTreeMap<AgentId, Capability>,
    /// Instant of the last seen-set clear.
    last_reset: Instant,
}

impl CapabilityRegistry {
    /// Creates a registry filtering discovery replies by a name tag.
    #[must_use]
    pub fn new(session: Arc<BrokerSession>, tag: impl Into<String>) -> Self {
        Self {
            session,
            tag: tag.into(),
            known: BTreeMap::new(),
            last_reset: Instant::now(),
        }
    }

    /// Clears the seen-set when the reset cadence has elapsed.
    ///
    /// Returns true when a reset happened so the caller can decay dependent
    /// state (topology staleness) in the same tick.
    pub fn reset_if_stale(&mut self, now: Instant, reset_period: Duration) -> bool {
        if now.duration_since(self.last_reset) < reset_period {
            return false;
        }
        self.known.clear();
        self.last_reset = now;
        true
    }

    /// Discovers capabilities and returns only the newly observed ones.
    ///
    /// Replies are filtered by the registry's name tag before the diff;
    /// newly observed agents are inserted into the seen-set.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError`] when the discovery call fails.
    pub async fn refresh(&mut self) -> Result<Vec<Capability>, SessionError> {
        let discovered = self.session.discover_capabilities().await?;
        let mut fresh = Vec::new();
        for capability in discovered {
            if !capability.has_tag(&self.tag) {
                continue;
            }
            if self.known.contains_key(&capability.agent_id) {
                continue;
            }
            self.known.insert(capability.agent_id.clone(), capability.clone());
            fresh.push(capability);
        }
        Ok(fresh)
    }

    /// Returns the currently known capabilities.
    #[must_use]
    pub fn known(&self) -> Vec<Capability> {
        self.known.values().cloned().collect()
    }
}
