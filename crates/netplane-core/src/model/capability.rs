// crates/netplane-core/src/model/capability.rs
// ============================================================================
// Module: Netplane Capability
// Description: Advertised measurement/control function on a remote agent.
// Purpose: Carry discovery replies from the broker to the lifecycle layer.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! A [`Capability`] is an advertised, parameterized function a remote agent
//! can perform on request. Capabilities arrive in discovery replies and are
//! immutable; a newer discovery cycle supersedes older records wholesale.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

use crate::model::identifiers::AgentId;

// ============================================================================
// SECTION: Capability
// ============================================================================

/// Advertised measurement/control function on a remote agent.
///
/// # Invariants
/// - Immutable once received; discovery cycles replace, never mutate.
/// - `parameters` preserves the agent's declared ordering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capability {
    /// Capability name tag (e.g. `topology`, `routing`).
    pub name: String,
    /// Identifier of the advertising agent.
    pub agent_id: AgentId,
    /// Address prefix under which the agent accepts specifications.
    pub endpoint: String,
    /// Client role the capability is offered to.
    pub role: String,
    /// Ordered set of declared parameter names.
    pub parameters: Vec<String>,
}

impl Capability {
    /// Returns true when the capability carries the requested name tag.
    #[must_use]
    pub fn has_tag(&self, tag: &str) -> bool {
        self.name == tag
    }
}
