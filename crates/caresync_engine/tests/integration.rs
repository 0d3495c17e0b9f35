//! End-to-end sync cycles against the in-memory remote.

use caresync_engine::{SyncClient, SyncConfig, SyncError, SyncStatus};
use caresync_persist::{FileSnapshotStore, MemorySnapshotStore};
use caresync_remote::{MemoryRemote, RemoteStore};
use caresync_store::{
    Gender, HealthRecord, RecordId, Resident, SyncRecord, Timestamp, UserProfile,
};

fn resident(name: &str) -> Resident {
    Resident {
        name: name.into(),
        date_of_birth: "1988-11-02".into(),
        gender: Gender::Female,
        address: "Sitio Uno".into(),
        contact: "0917 555 0000".into(),
        added_by: "worker-1".into(),
    }
}

fn health_record(resident_id: RecordId) -> HealthRecord {
    HealthRecord {
        resident_id,
        visit_date: "2024-03-15".into(),
        reason: "fever".into(),
        diagnosis: "influenza".into(),
        intervention: "paracetamol, rest".into(),
        recorded_by: "worker-1".into(),
    }
}

fn signed_in_client() -> SyncClient<MemoryRemote, MemorySnapshotStore> {
    let client = SyncClient::open(
        MemoryRemote::new(),
        MemorySnapshotStore::new(),
        SyncConfig::new(),
    )
    .unwrap();
    client.set_user(UserProfile::field_worker("worker-1")).unwrap();
    client
}

#[test]
fn create_round_trip() {
    let client = signed_in_client();
    let id = client.add_resident(resident("Ana")).unwrap();
    assert!(client.has_unsynced_changes());

    let report = client.sync().unwrap();
    assert_eq!(report.pushed, 1);
    assert_eq!(client.status(), SyncStatus::Success);

    // The record reached the remote with a server-assigned stamp.
    let stored = client.remote().residents().get(id).unwrap();
    assert!(!stored.is_dirty);

    // The local copy is clean and matches the remote form.
    let local = &client.residents()[0];
    assert_eq!(local.id, id);
    assert!(!local.is_dirty);
    assert_eq!(local.last_modified, stored.last_modified);
    assert!(!client.has_unsynced_changes());
}

#[test]
fn delete_round_trip() {
    let client = signed_in_client();
    let id = client.add_resident(resident("Ana")).unwrap();
    client.sync().unwrap();

    client.delete_resident(id).unwrap();
    assert!(client.has_unsynced_changes());
    assert!(client.residents().is_empty());

    let report = client.sync().unwrap();
    assert_eq!(report.purged, 1);

    // Gone remotely, purged locally (not just hidden).
    assert!(client.remote().residents().get(id).is_none());
    assert!(client.with_state(|s| s.residents().is_empty()));
    assert!(!client.has_unsynced_changes());
}

#[test]
fn both_kinds_sync_in_one_cycle() {
    let client = signed_in_client();
    let resident_id = client.add_resident(resident("Ana")).unwrap();
    client.add_health_record(health_record(resident_id)).unwrap();

    let report = client.sync().unwrap();
    assert_eq!(report.pushed, 2);
    assert_eq!(client.remote().residents().len(), 1);
    assert_eq!(client.remote().health_records().len(), 1);
    assert!(!client.has_unsynced_changes());
}

#[test]
fn remote_wins_when_strictly_newer() {
    let client = signed_in_client();
    let id = RecordId::new();

    // Local clean record, last modified at t=50.
    let local = SyncRecord {
        id,
        payload: resident("stale"),
        created_at: Timestamp::from_millis(10),
        last_modified: Timestamp::from_millis(50),
        is_dirty: false,
        is_deleted: false,
    };
    {
        let state = client.shared_state();
        let mut state = state.write();
        state.residents_mut().replace_all(vec![local]);
        state.recompute_unsynced();
    }

    // Remote holds a newer version at t=80.
    let remote_version = SyncRecord {
        id,
        payload: resident("fresh"),
        created_at: Timestamp::from_millis(10),
        last_modified: Timestamp::from_millis(80),
        is_dirty: false,
        is_deleted: false,
    };
    client.remote().residents().insert_raw(remote_version);

    client.sync().unwrap();

    let merged = &client.residents()[0];
    assert_eq!(merged.payload.name, "fresh");
    assert_eq!(merged.last_modified, Timestamp::from_millis(80));
}

#[test]
fn local_wins_on_equal_stamps() {
    let client = signed_in_client();
    let id = RecordId::new();

    let make = |name: &str| SyncRecord {
        id,
        payload: resident(name),
        created_at: Timestamp::from_millis(10),
        last_modified: Timestamp::from_millis(100),
        is_dirty: false,
        is_deleted: false,
    };

    {
        let state = client.shared_state();
        let mut state = state.write();
        state.residents_mut().replace_all(vec![make("local")]);
        state.recompute_unsynced();
    }
    client.remote().residents().insert_raw(make("remote"));

    client.sync().unwrap();
    assert_eq!(client.residents()[0].payload.name, "local");
}

#[test]
fn back_to_back_cycles_are_idempotent() {
    let client = signed_in_client();
    let resident_id = client.add_resident(resident("Ana")).unwrap();
    client.add_health_record(health_record(resident_id)).unwrap();
    client.delete_resident(resident_id).unwrap();

    client.sync().unwrap();
    let (mut first_residents, mut first_health) =
        client.with_state(|s| (s.residents().to_vec(), s.health_records().to_vec()));

    let report = client.sync().unwrap();
    assert_eq!(report.pushed, 0);

    let (mut second_residents, mut second_health) =
        client.with_state(|s| (s.residents().to_vec(), s.health_records().to_vec()));

    first_residents.sort_by_key(|r| r.id);
    second_residents.sort_by_key(|r| r.id);
    first_health.sort_by_key(|r| r.id);
    second_health.sort_by_key(|r| r.id);
    assert_eq!(first_residents, second_residents);
    assert_eq!(first_health, second_health);
}

#[test]
fn tombstones_purge_regardless_of_origin() {
    let client = signed_in_client();

    // Local tombstone.
    let local_id = client.add_resident(resident("local-dead")).unwrap();
    client.delete_resident(local_id).unwrap();

    // Remote tombstone, as left by another device.
    let mut remote_dead = SyncRecord::create(resident("remote-dead"));
    remote_dead.is_deleted = true;
    let remote_dead = client.remote().residents().seed(remote_dead);

    let report = client.sync().unwrap();
    assert_eq!(report.purged, 2);

    client.with_state(|s| {
        assert!(s.residents().records().all(|r| !r.is_deleted));
        assert!(s.residents().is_empty());
    });
    assert!(client.remote().residents().get(local_id).is_none());
    // The remote tombstone stays on the remote; only the local view purges.
    assert!(client.remote().residents().get(remote_dead.id).unwrap().is_deleted);
}

#[test]
fn unauthenticated_cycle_makes_no_remote_calls() {
    let client = SyncClient::open(
        MemoryRemote::new(),
        MemorySnapshotStore::new(),
        SyncConfig::new(),
    )
    .unwrap();
    client.add_resident(resident("Ana")).unwrap();

    let result = client.sync();
    assert!(matches!(result, Err(SyncError::NotAuthenticated)));
    assert_eq!(client.status(), SyncStatus::Error);
    assert!(client.remote().residents().is_empty());
    assert!(client.has_unsynced_changes());
}

#[test]
fn second_cycle_pulls_only_newer_changes() {
    let client = signed_in_client();
    client.add_resident(resident("Ana")).unwrap();
    client.sync().unwrap();

    // Another device pushes after our cursor.
    client
        .remote()
        .residents()
        .seed(SyncRecord::create(resident("Ben")));

    let report = client.sync().unwrap();
    assert_eq!(report.pulled, 1);
    assert_eq!(client.residents().len(), 2);

    let report = client.sync().unwrap();
    assert_eq!(report.pulled, 0);
}

#[test]
fn dirty_flag_tracks_every_step() {
    let client = signed_in_client();
    assert!(!client.has_unsynced_changes());

    let id = client.add_resident(resident("Ana")).unwrap();
    assert!(client.has_unsynced_changes());

    client.sync().unwrap();
    assert!(!client.has_unsynced_changes());

    client.update_resident(id, |p| p.contact = "0998".into()).unwrap();
    assert!(client.has_unsynced_changes());

    client.sync().unwrap();
    assert!(!client.has_unsynced_changes());

    // The cached flag always agrees with a full scan.
    client.with_state(|s| {
        let scanned = s.residents().records().any(|r| r.is_dirty)
            || s.health_records().records().any(|r| r.is_dirty);
        assert_eq!(s.has_unsynced_changes(), scanned);
    });
}

#[test]
fn partial_failure_then_retry_converges() {
    let client = signed_in_client();
    client.add_resident(resident("Ana")).unwrap();
    client.add_resident(resident("Ben")).unwrap();

    client.remote().residents().fail_upsert_after(1);
    assert!(client.sync().is_err());
    assert_eq!(client.status(), SyncStatus::Error);
    assert!(client.has_unsynced_changes());

    // The cursor never moved, so a fresh cycle finishes the push and
    // converges; upserts are idempotent so nothing is duplicated.
    client.sync().unwrap();
    assert_eq!(client.remote().residents().len(), 2);
    assert_eq!(client.residents().len(), 2);
    assert!(!client.has_unsynced_changes());
}

#[test]
fn file_persistence_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("caresync.json");

    let id;
    {
        let client = SyncClient::open(
            MemoryRemote::new(),
            FileSnapshotStore::open(&path).unwrap(),
            SyncConfig::new(),
        )
        .unwrap();
        id = client.add_resident(resident("Ana")).unwrap();
        client.set_user(UserProfile::field_worker("worker-1")).unwrap();
    }

    // Restart offline: the dirty record and the session are still there.
    let last_sync;
    {
        let client = SyncClient::open(
            MemoryRemote::new(),
            FileSnapshotStore::open(&path).unwrap(),
            SyncConfig::new(),
        )
        .unwrap();
        assert!(client.has_unsynced_changes());
        assert_eq!(client.residents()[0].id, id);
        assert!(client.with_state(|s| s.user().is_some()));

        client.sync().unwrap();
        last_sync = client.last_sync().unwrap();
    }

    // Restart again: the committed cursor survives too.
    {
        let client = SyncClient::open(
            MemoryRemote::new(),
            FileSnapshotStore::open(&path).unwrap(),
            SyncConfig::new(),
        )
        .unwrap();
        assert_eq!(client.last_sync(), Some(last_sync));
        assert!(!client.has_unsynced_changes());
    }
}
