//! # CareSync Persist
//!
//! Durable persistence for the CareSync local store.
//!
//! The entire application state (both record collections, the user
//! descriptor, and the sync cursor) is serialized as one versioned JSON
//! snapshot. This crate provides:
//! - The [`Snapshot`] type and its schema version
//! - The [`SnapshotStore`] adapter trait (`load` at startup, explicit `save`
//!   after every mutation batch)
//! - An in-memory store for tests and a file-backed store with atomic
//!   replace-on-save and an exclusive process lock
//! - Forward-only schema migrations applied on load

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod backend;
mod error;
mod file;
mod memory;
mod migration;
mod snapshot;

pub use backend::SnapshotStore;
pub use error::{PersistError, PersistResult};
pub use file::FileSnapshotStore;
pub use memory::MemorySnapshotStore;
pub use migration::SnapshotMigrations;
pub use snapshot::{Snapshot, SCHEMA_VERSION};
