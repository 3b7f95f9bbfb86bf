// crates/netplane-store-memory/src/lib.rs
// ============================================================================
// Module: Netplane Memory Store Library
// Description: In-memory implementation of the storage service contract.
// Purpose: Provide a storage backend for tests and single-process runs.
// Dependencies: netplane-bus, netplane-core, tokio
// ============================================================================

//! ## Overview
//! Storage is an external collaborator consumed over the dispatch bus; this
//! crate provides the in-memory reference implementation of that contract.
//! The store runs as a single-owner actor, answers every storage action
//! exactly once, and marks missing entities with `not found` errors the
//! typed client maps back to [`netplane_bus::StorageError::NotFound`].

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod store;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use store::spawn_memory_store;
