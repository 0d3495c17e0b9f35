//! # CareSync Store
//!
//! Local record store for the CareSync offline-first engine.
//!
//! This crate provides:
//! - The syncable record model (id, payload, timestamps, dirty/tombstone flags)
//! - Entity payloads for the two record kinds (residents and health records)
//! - A per-kind in-memory record store with soft deletes
//! - The application state container with cached unsynced-changes tracking
//!
//! All mutation is synchronous and single-writer: the store is mutated through
//! `&mut self` and callers are expected to serialize access (the engine wraps
//! the state in a lock).

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod entity;
mod error;
mod record;
mod state;
mod store;

pub use entity::{Gender, HealthRecord, Resident, Role, UserProfile};
pub use error::{StoreError, StoreResult};
pub use record::{EntityPayload, RecordId, SyncRecord, Timestamp};
pub use state::AppState;
pub use store::RecordStore;
