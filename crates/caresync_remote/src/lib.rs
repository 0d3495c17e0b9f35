//! # CareSync Remote
//!
//! The remote store adapter: the external reconciliation target the sync
//! engine pushes to and pulls from.
//!
//! The adapter exposes three logical operations per entity collection
//! (upsert-by-id, delete-by-id, changed-since) and is responsible for
//! assigning the authoritative `last_modified` stamp (its own clock) on
//! every write. The engine never defines a wire format; a production
//! implementation maps these operations onto whatever its document store
//! speaks.
//!
//! [`MemoryRemote`] is a complete in-memory implementation with a strictly
//! increasing server clock and fault injection, used by tests and local
//! integration environments.

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod collection;
mod error;
mod memory;

pub use collection::{ChangeSet, RemoteCollection, RemoteStore};
pub use error::{RemoteError, RemoteResult};
pub use memory::{MemoryCollection, MemoryRemote};
