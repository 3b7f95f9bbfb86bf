// crates/netplane-core/src/model/identifiers.rs
// ============================================================================
// Module: Netplane Identifiers
// Description: Canonical opaque identifiers for agents, tasks, and topology.
// Purpose: Provide strongly typed, serializable identifiers with stable wire forms.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! This module defines the canonical identifiers used throughout Netplane.
//! Identifiers are opaque UTF-8 strings and serialize transparently on the
//! wire. No normalization is applied; agents own the shape of their
//! identifiers.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Identifier Types
// ============================================================================

/// Declares an opaque string identifier newtype with transparent serde.
macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        ///
        /// # Invariants
        /// - Opaque UTF-8 string; no normalization or validation is applied.
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Creates a new identifier from any string-like value.
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Returns the identifier as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_string())
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }
    };
}

string_id! {
    /// Agent identifier advertised alongside a capability (e.g. `R1-router`).
    AgentId
}

string_id! {
    /// Schema identifier correlating a receipt, its results, and interrupts.
    SchemaId
}

string_id! {
    /// Topology node identifier.
    NodeId
}

string_id! {
    /// Registered routing prefix identifier.
    PrefixId
}

string_id! {
    /// Provisioned route identifier.
    RouteId
}

// ============================================================================
// SECTION: Agent Identity Parsing
// ============================================================================

/// Sentinel node type used when an agent identifier carries no type segment.
pub const UNTYPED_NODE: &str = "untyped";

impl AgentId {
    /// Splits the agent identifier into a `(node name, node type)` pair.
    ///
    /// Agent identifiers follow the `<name>-<type>` convention; everything
    /// after the first separator is the type. Identifiers without a separator
    /// yield [`UNTYPED_NODE`] as the type.
    #[must_use]
    pub fn split_node_identity(&self) -> (&str, &str) {
        match self.0.split_once('-') {
            Some((name, kind)) if !kind.is_empty() => (name, kind),
            _ => (self.0.as_str(), UNTYPED_NODE),
        }
    }
}
