//! Forward-only snapshot schema migrations.
//!
//! Migrations rewrite the raw JSON value *before* it is deserialized into
//! the current [`Snapshot`](crate::Snapshot) type, so old snapshots never
//! need to round-trip through outdated Rust types. They are explicit,
//! forward-only (restore a backup to go back), and validated to be gapless.

use crate::error::{PersistError, PersistResult};
use crate::snapshot::SCHEMA_VERSION;
use serde_json::{json, Value};
use std::collections::BTreeMap;

/// A single migration step, rewriting a snapshot value in place.
///
/// The step receives a snapshot at the version just below its target and
/// must leave it consumable by the target version's schema.
pub type MigrationStep = fn(&mut Value) -> PersistResult<()>;

/// Registry of migration steps, keyed by the version each step migrates to.
#[derive(Debug)]
pub struct SnapshotMigrations {
    steps: BTreeMap<u32, MigrationStep>,
}

impl SnapshotMigrations {
    /// The standard registry with all shipped migrations.
    #[must_use]
    pub fn standard() -> Self {
        let mut migrations = Self::empty();
        // Registration of shipped steps cannot collide.
        let _ = migrations.register(2, migrate_v1_to_v2);
        migrations
    }

    /// An empty registry, for tests.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            steps: BTreeMap::new(),
        }
    }

    /// Registers a migration step targeting `target`.
    ///
    /// # Errors
    ///
    /// Returns an error if a step for `target` is already registered.
    pub fn register(&mut self, target: u32, step: MigrationStep) -> PersistResult<()> {
        if self.steps.contains_key(&target) {
            return Err(PersistError::migration_failed(
                target,
                "migration already registered",
            ));
        }
        self.steps.insert(target, step);
        Ok(())
    }

    /// Validates that the registered steps cover every version from 2 up to
    /// the current schema with no gaps.
    pub fn validate(&self) -> PersistResult<()> {
        for target in 2..=SCHEMA_VERSION {
            if !self.steps.contains_key(&target) {
                return Err(PersistError::migration_failed(
                    target,
                    "no migration step registered",
                ));
            }
        }
        Ok(())
    }

    /// Upgrades a raw snapshot value to the current schema version.
    ///
    /// Steps run in version order; each stamps the value with its target
    /// version so a failure leaves a well-formed intermediate behind.
    /// Returns the final version.
    ///
    /// # Errors
    ///
    /// Returns an error if the value carries no readable version, was
    /// written by a newer schema than this build, lacks a required step, or
    /// a step fails.
    pub fn upgrade(&self, value: &mut Value) -> PersistResult<u32> {
        let found = value
            .get("schema_version")
            .and_then(Value::as_u64)
            .ok_or_else(|| PersistError::invalid("missing schema_version"))?
            as u32;

        if found > SCHEMA_VERSION {
            return Err(PersistError::UnsupportedVersion {
                found,
                supported: SCHEMA_VERSION,
            });
        }

        for target in (found + 1)..=SCHEMA_VERSION {
            let step = self.steps.get(&target).ok_or_else(|| {
                PersistError::migration_failed(target, "no migration step registered")
            })?;
            step(value)?;
            value["schema_version"] = json!(target);
        }

        Ok(SCHEMA_VERSION)
    }
}

impl Default for SnapshotMigrations {
    fn default() -> Self {
        Self::standard()
    }
}

/// v1 → v2: user descriptors gain role tracking, and tombstones that were
/// already confirmed pushed (deleted and clean) are dropped instead of being
/// retained forever.
fn migrate_v1_to_v2(value: &mut Value) -> PersistResult<()> {
    if let Some(user) = value.get_mut("user").and_then(Value::as_object_mut) {
        user.entry("role").or_insert(json!("Viewer"));
        user.entry("assigned_area").or_insert(Value::Null);
    }

    for key in ["residents", "health_records"] {
        if let Some(records) = value.get_mut(key).and_then(Value::as_array_mut) {
            records.retain(|record| {
                let deleted = record
                    .get("is_deleted")
                    .and_then(Value::as_bool)
                    .unwrap_or(false);
                let dirty = record
                    .get("is_dirty")
                    .and_then(Value::as_bool)
                    .unwrap_or(false);
                !(deleted && !dirty)
            });
        }
    }

    Ok(())
}
