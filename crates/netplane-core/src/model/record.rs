// crates/netplane-core/src/model/record.rs
// ============================================================================
// Module: Netplane Measurement Record
// Description: Streamed result tied to an active specification.
// Purpose: Carry tabular agent results to correlation and reconciliation.
// Dependencies: serde, crate::model
// ============================================================================

//! ## Overview
//! A [`Measurement`] is one streamed result produced while a specification is
//! active. Results are tabular: an ordered column-name list and ordered rows
//! of string values. Columns are resolved by name, never by position.
//! Invariants:
//! - `schema` ties the record to exactly one active specification.
//! - Rows are read against `columns`; ragged rows yield missing cells.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

use crate::model::identifiers::AgentId;
use crate::model::identifiers::SchemaId;

// ============================================================================
// SECTION: Measurement
// ============================================================================

/// Streamed measurement/event tied to an active specification.
///
/// # Invariants
/// - Not persisted by the core; storage delegation is a service concern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Measurement {
    /// Identifier of the producing agent.
    pub agent_id: AgentId,
    /// Schema of the specification this result answers.
    pub schema: SchemaId,
    /// Ordered column names.
    pub columns: Vec<String>,
    /// Ordered rows of string values, aligned with `columns`.
    pub rows: Vec<Vec<String>>,
}

impl Measurement {
    /// Resolves a cell by column name within one row.
    ///
    /// Returns `None` when the column is not declared or the row is ragged.
    #[must_use]
    pub fn cell<'a>(&self, row: &'a [String], column: &str) -> Option<&'a str> {
        let index = self.columns.iter().position(|name| name == column)?;
        row.get(index).map(String::as_str)
    }
}
