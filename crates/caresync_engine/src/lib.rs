//! # CareSync Engine
//!
//! The sync orchestrator for CareSync.
//!
//! This crate provides:
//! - The sync state machine (idle → syncing → success/error)
//! - The push → pull → merge → commit protocol engine
//! - Pure last-writer-wins merge with tombstone purge
//! - Retry with exponential backoff
//! - The client facade that ties store, persistence, and remote together
//!
//! ## Protocol invariants
//!
//! - Within one cycle, push strictly precedes pull, pull precedes merge,
//!   and merge precedes commit: pull results must reflect the remote's
//!   post-push state for last-writer-wins to be correct.
//! - One cycle in flight at a time; a second start is rejected, not queued.
//! - A record's dirty flag clears immediately after its own successful
//!   push, never in a batch, so a mid-loop failure leaves unpushed records
//!   dirty for the next cycle.
//! - Every remote write is an idempotent upsert/delete by id, which makes
//!   a fresh cycle a safe retry after any failure.

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod client;
mod config;
mod error;
mod merge;
mod state;

pub use client::SyncClient;
pub use config::{RetryConfig, SyncConfig};
pub use error::{SyncError, SyncResult};
pub use merge::{last_writer_wins, MergeOutcome};
pub use state::{SyncEngine, SyncReport, SyncStats, SyncStatus};
