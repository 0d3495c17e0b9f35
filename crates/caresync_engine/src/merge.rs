//! Last-writer-wins merge.
//!
//! The merge is a pure, total function over two in-memory record sets; it
//! has no failure mode. Conflict resolution is keyed purely on
//! `last_modified`: there is no field-level merge.

use caresync_store::{EntityPayload, RecordId, SyncRecord};
use std::collections::HashMap;

/// The result of merging local and remote record sets.
#[derive(Debug, Clone)]
pub struct MergeOutcome<P> {
    /// The merged records, tombstones purged.
    pub records: Vec<SyncRecord<P>>,
    /// How many tombstones were purged.
    pub purged: u64,
}

/// Merges pulled remote records into the local set.
///
/// The map is seeded from the local set. A remote record replaces the local
/// entry iff no local entry with its id exists, or the remote's
/// `last_modified` is strictly greater; the local version wins ties. After
/// merging, every entry with `is_deleted = true` is dropped: tombstones are
/// purged once the cycle confirms round-trip completion, whether they
/// originated locally or remotely.
#[must_use]
pub fn last_writer_wins<P: EntityPayload>(
    local: Vec<SyncRecord<P>>,
    remote: Vec<SyncRecord<P>>,
) -> MergeOutcome<P> {
    let mut merged: HashMap<RecordId, SyncRecord<P>> =
        local.into_iter().map(|r| (r.id, r)).collect();

    for record in remote {
        match merged.get(&record.id) {
            Some(existing) if record.last_modified > existing.last_modified => {
                merged.insert(record.id, record);
            }
            None => {
                merged.insert(record.id, record);
            }
            Some(_) => {}
        }
    }

    let total = merged.len();
    let records: Vec<SyncRecord<P>> = merged
        .into_values()
        .filter(|r| !r.is_deleted)
        .collect();
    let purged = (total - records.len()) as u64;

    MergeOutcome { records, purged }
}

#[cfg(test)]
mod tests {
    use super::*;
    use caresync_store::{Gender, Resident, Timestamp};

    fn record(name: &str, stamp: u64) -> SyncRecord<Resident> {
        let mut record = SyncRecord::create(Resident {
            name: name.into(),
            date_of_birth: "1990-01-01".into(),
            gender: Gender::Other,
            address: "Zone 7".into(),
            contact: "0921".into(),
            added_by: "u1".into(),
        });
        record.created_at = Timestamp::from_millis(stamp);
        record.last_modified = Timestamp::from_millis(stamp);
        record.is_dirty = false;
        record
    }

    fn with_id(mut r: SyncRecord<Resident>, id: RecordId) -> SyncRecord<Resident> {
        r.id = id;
        r
    }

    #[test]
    fn remote_wins_when_strictly_newer() {
        let id = RecordId::new();
        let local = with_id(record("old", 50), id);
        let remote = with_id(record("new", 80), id);

        let outcome = last_writer_wins(vec![local], vec![remote]);
        assert_eq!(outcome.records.len(), 1);
        assert_eq!(outcome.records[0].payload.name, "new");
        assert_eq!(outcome.records[0].last_modified, Timestamp::from_millis(80));
    }

    #[test]
    fn local_wins_ties_and_newer() {
        let id = RecordId::new();

        let outcome = last_writer_wins(
            vec![with_id(record("local", 100), id)],
            vec![with_id(record("remote", 100), id)],
        );
        assert_eq!(outcome.records[0].payload.name, "local");

        let outcome = last_writer_wins(
            vec![with_id(record("local", 100), id)],
            vec![with_id(record("remote", 60), id)],
        );
        assert_eq!(outcome.records[0].payload.name, "local");
    }

    #[test]
    fn unknown_remote_records_are_added() {
        let outcome = last_writer_wins(vec![record("a", 10)], vec![record("b", 20)]);
        assert_eq!(outcome.records.len(), 2);
    }

    #[test]
    fn tombstones_are_purged_from_both_sides() {
        let mut local_tombstone = record("dead-local", 10);
        local_tombstone.is_deleted = true;

        let mut remote_tombstone = record("dead-remote", 20);
        remote_tombstone.is_deleted = true;

        let outcome = last_writer_wins(
            vec![local_tombstone, record("alive", 30)],
            vec![remote_tombstone],
        );

        assert_eq!(outcome.records.len(), 1);
        assert_eq!(outcome.records[0].payload.name, "alive");
        assert_eq!(outcome.purged, 2);
    }

    #[test]
    fn remote_tombstone_overrides_older_local_record() {
        let id = RecordId::new();
        let local = with_id(record("alive", 40), id);
        let mut remote = with_id(record("alive", 90), id);
        remote.is_deleted = true;

        let outcome = last_writer_wins(vec![local], vec![remote]);
        assert!(outcome.records.is_empty());
        assert_eq!(outcome.purged, 1);
    }

    #[test]
    fn empty_inputs() {
        let outcome = last_writer_wins::<Resident>(Vec::new(), Vec::new());
        assert!(outcome.records.is_empty());
        assert_eq!(outcome.purged, 0);
    }

    mod laws {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// The merge keeps the remote version iff it is strictly newer.
            #[test]
            fn lww_law(t1 in 0u64..10_000, t2 in 0u64..10_000) {
                let id = RecordId::new();
                let local = with_id(record("local", t1), id);
                let remote = with_id(record("remote", t2), id);

                let outcome = last_writer_wins(vec![local], vec![remote]);
                let winner = &outcome.records[0];

                if t2 > t1 {
                    prop_assert_eq!(&winner.payload.name, "remote");
                } else {
                    prop_assert_eq!(&winner.payload.name, "local");
                }
            }

            /// Merging the same remote set again does not change the result.
            #[test]
            fn merge_is_idempotent(stamps in proptest::collection::vec(0u64..10_000, 0..8)) {
                let remote: Vec<_> = stamps.iter().map(|&t| record("r", t)).collect();

                let once = last_writer_wins(Vec::new(), remote.clone());
                let twice = last_writer_wins(once.records.clone(), remote);

                let mut a: Vec<_> = once.records.iter().map(|r| r.id).collect();
                let mut b: Vec<_> = twice.records.iter().map(|r| r.id).collect();
                a.sort();
                b.sort();
                prop_assert_eq!(a, b);
            }

            /// No tombstone ever survives a merge.
            #[test]
            fn purge_is_total(deleted_flags in proptest::collection::vec(any::<bool>(), 0..8)) {
                let remote: Vec<_> = deleted_flags
                    .iter()
                    .enumerate()
                    .map(|(i, &dead)| {
                        let mut r = record("r", i as u64);
                        r.is_deleted = dead;
                        r
                    })
                    .collect();

                let outcome = last_writer_wins(Vec::new(), remote);
                prop_assert!(outcome.records.iter().all(|r| !r.is_deleted));
            }
        }
    }
}
