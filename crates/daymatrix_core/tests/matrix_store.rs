use chrono::{FixedOffset, TimeZone, Utc};
use daymatrix_core::{
    AutoCopyOutcome, DateKey, DayMatrix, FixedClock, MatrixStore, MemoryChannel,
    PersistenceGateway, Quadrant, ValidationError, DEFAULT_LOOKBACK_DAYS,
};

fn utc_clock(year: i32, month: u32, day: u32, hour: u32) -> FixedClock {
    let utc = FixedOffset::east_opt(0).unwrap();
    FixedClock::new(utc.with_ymd_and_hms(year, month, day, hour, 0, 0).unwrap())
}

fn open_store(channel: &MemoryChannel, clock: &FixedClock) -> MatrixStore<FixedClock> {
    MatrixStore::with_clock(
        PersistenceGateway::new().with_channel(channel.clone()),
        clock.clone(),
    )
}

fn key(raw: &str) -> DateKey {
    DateKey::parse(raw).unwrap()
}

#[test]
fn buy_milk_walkthrough() {
    let channel = MemoryChannel::new("cache");
    let clock = utc_clock(2024, 6, 1, 10);
    let mut store = open_store(&channel, &clock);
    let day = key("2024-06-01");

    store.add_task_named(day, "do-now", "Buy milk").unwrap();
    let snapshot = store.copy_snapshot(day);
    let mut expected = DayMatrix::new();
    expected.push(Quadrant::DoNow, "Buy milk");
    assert_eq!(snapshot, expected);

    let report = store.complete_task(day, Quadrant::DoNow, "Buy milk");
    assert!(report.removed);
    assert!(report.flush.all_saved());
    assert!(store.copy_snapshot(day).is_empty());

    let ledger = store.completed_this_month();
    assert_eq!(ledger.len(), 1);
    assert_eq!(ledger[0].task, "Buy milk");
    assert_eq!(
        ledger[0].completed_at,
        Utc.with_ymd_and_hms(2024, 6, 1, 10, 0, 0).unwrap()
    );
}

#[test]
fn add_trims_and_rejects_blank_or_unknown_input() {
    let channel = MemoryChannel::new("cache");
    let mut store = open_store(&channel, &utc_clock(2024, 6, 1, 10));
    let day = key("2024-06-01");

    store.add_task(day, Quadrant::Schedule, "  review PR  ").unwrap();
    assert_eq!(
        store.copy_snapshot(day).tasks(Quadrant::Schedule),
        ["review PR".to_string()]
    );

    let saves_before = channel.save_count();
    assert_eq!(
        store.add_task(day, Quadrant::Schedule, "   ").unwrap_err(),
        ValidationError::EmptyTask
    );
    assert!(matches!(
        store.add_task_named(day, "urgent", "x").unwrap_err(),
        ValidationError::UnknownQuadrant(_)
    ));
    assert_eq!(channel.save_count(), saves_before);
    assert_eq!(store.copy_snapshot(day).task_count(), 1);
}

#[test]
fn add_then_delete_restores_quadrant() {
    let channel = MemoryChannel::new("cache");
    let mut store = open_store(&channel, &utc_clock(2024, 6, 1, 10));
    let day = key("2024-06-01");
    store.add_task(day, Quadrant::Delegate, "book venue").unwrap();
    let before = store.copy_snapshot(day);

    store.add_task(day, Quadrant::Delegate, "order cake").unwrap();
    store.delete_task(day, Quadrant::Delegate, "order cake");
    assert_eq!(store.copy_snapshot(day), before);

    let noop = store.delete_task(day, Quadrant::Delegate, "never added");
    assert!(!noop.is_flushed());
}

#[test]
fn move_round_trip_and_idempotence_for_every_pair() {
    let channel = MemoryChannel::new("cache");
    let mut store = open_store(&channel, &utc_clock(2024, 6, 1, 10));
    let day = key("2024-06-01");

    for source in Quadrant::ALL {
        for target in Quadrant::ALL {
            if source == target {
                continue;
            }
            store.add_task(day, source, "task").unwrap();

            store.move_task(day, source, target, "task");
            store.move_task(day, source, target, "task");
            let moved = store.copy_snapshot(day);
            assert!(!moved.contains(source, "task"));
            assert_eq!(moved.tasks(target), ["task".to_string()]);

            store.move_task(day, target, source, "task");
            let restored = store.copy_snapshot(day);
            assert_eq!(restored.tasks(source), ["task".to_string()]);
            assert!(!restored.contains(target, "task"));

            store.delete_task(day, source, "task");
            assert!(store.copy_snapshot(day).is_empty());
        }
    }
}

#[test]
fn move_with_stale_source_still_inserts_into_target() {
    let channel = MemoryChannel::new("cache");
    let mut store = open_store(&channel, &utc_clock(2024, 6, 1, 10));
    let day = key("2024-06-04");

    let report = store.move_task(day, Quadrant::DoNow, Quadrant::Eliminate, "ghost");
    assert!(report.is_flushed());
    assert_eq!(
        store.copy_snapshot(day).tasks(Quadrant::Eliminate),
        ["ghost".to_string()]
    );
}

#[test]
fn pasted_snapshot_is_independent_of_source_day() {
    let channel = MemoryChannel::new("cache");
    let mut store = open_store(&channel, &utc_clock(2024, 6, 1, 10));
    let source = key("2024-06-01");
    let target = key("2024-06-02");

    store.add_task(source, Quadrant::DoNow, "pay rent").unwrap();
    store.add_task(target, Quadrant::Schedule, "overwritten").unwrap();
    let snapshot = store.copy_snapshot(source);
    store.paste_snapshot(target, &snapshot);
    assert_eq!(store.copy_snapshot(target), store.copy_snapshot(source));

    store.add_task(source, Quadrant::DoNow, "call bank").unwrap();
    store.delete_task(source, Quadrant::DoNow, "pay rent");
    assert_eq!(store.copy_snapshot(target), snapshot);
    assert!(!store.copy_snapshot(target).contains(Quadrant::Schedule, "overwritten"));
}

#[test]
fn auto_copy_prefers_nearest_day() {
    let channel = MemoryChannel::new("cache");
    let mut store = open_store(&channel, &utc_clock(2024, 6, 10, 10));
    let today = key("2024-06-10");

    store.add_task(key("2024-06-05"), Quadrant::DoNow, "five days ago").unwrap();
    store.add_task(key("2024-06-07"), Quadrant::Schedule, "three days ago").unwrap();
    // An empty record closer in time must be skipped.
    store.add_task(key("2024-06-09"), Quadrant::Delegate, "gone").unwrap();
    store.delete_task(key("2024-06-09"), Quadrant::Delegate, "gone");

    let report = store
        .auto_copy_from_recent(today, DEFAULT_LOOKBACK_DAYS)
        .unwrap();
    assert_eq!(report.source, key("2024-06-07"));
    assert_eq!(store.copy_snapshot(today), store.copy_snapshot(key("2024-06-07")));
}

#[test]
fn auto_copy_outcomes_leave_store_untouched() {
    let channel = MemoryChannel::new("cache");
    let mut store = open_store(&channel, &utc_clock(2024, 6, 10, 10));
    let today = key("2024-06-10");

    assert_eq!(
        store.auto_copy_from_recent(today, 7).unwrap_err(),
        AutoCopyOutcome::NoRecentTasks
    );
    assert!(store.day(today).is_none());

    store.add_task(key("2024-06-09"), Quadrant::DoNow, "yesterday").unwrap();
    store.add_task(today, Quadrant::Eliminate, "already here").unwrap();
    let before = store.copy_snapshot(today);
    assert_eq!(
        store.auto_copy_from_recent(today, 7).unwrap_err(),
        AutoCopyOutcome::AlreadyHasTasks
    );
    assert_eq!(store.copy_snapshot(today), before);
}

#[test]
fn ledger_entry_expires_when_month_rolls_over() {
    let channel = MemoryChannel::new("cache");
    let clock = utc_clock(2024, 6, 28, 18);
    let mut store = open_store(&channel, &clock);
    store.add_task(key("2024-06-28"), Quadrant::DoNow, "close books").unwrap();
    store.complete_task(key("2024-06-28"), Quadrant::DoNow, "close books");
    assert_eq!(store.completed_this_month().len(), 1);

    clock.set(
        FixedOffset::east_opt(0)
            .unwrap()
            .with_ymd_and_hms(2024, 7, 1, 0, 0, 0)
            .unwrap(),
    );
    assert!(store.completed_this_month().is_empty());

    let exported: serde_json::Value = serde_json::from_str(&store.export_document()).unwrap();
    assert_eq!(exported["completedThisMonth"], serde_json::json!([]));

    let reopened = open_store(&channel, &clock);
    assert!(reopened.completed_this_month().is_empty());
}

#[test]
fn malformed_import_leaves_state_unchanged() {
    let channel = MemoryChannel::new("cache");
    let mut store = open_store(&channel, &utc_clock(2024, 6, 1, 10));
    let day = key("2024-06-01");
    store.add_task(day, Quadrant::DoNow, "keep me").unwrap();
    store.complete_task(day, Quadrant::DoNow, "keep me");
    store.add_task(day, Quadrant::Schedule, "still here").unwrap();

    let before_day = store.copy_snapshot(day);
    let before_ledger = store.completed_this_month();
    let before_export = store.export_document();
    let saves_before = channel.save_count();

    for raw in ["{", "[1,2]", r#"{"06/01/2024": {}}"#] {
        let err = store.import_document(raw).unwrap_err();
        assert!(matches!(err, ValidationError::MalformedDocument(_)));
    }

    assert_eq!(store.copy_snapshot(day), before_day);
    assert_eq!(store.completed_this_month(), before_ledger);
    assert_eq!(store.export_document(), before_export);
    assert_eq!(channel.save_count(), saves_before);
}

#[test]
fn import_replaces_document_wholesale() {
    let channel = MemoryChannel::new("cache");
    let mut store = open_store(&channel, &utc_clock(2024, 6, 15, 10));
    store.add_task(key("2024-06-14"), Quadrant::DoNow, "local only").unwrap();

    let raw = r#"{
        "2024-06-15": {"do-now": [], "schedule": ["imported"], "delegate": [], "eliminate": []},
        "completedThisMonth": [
            {"task": "june", "completedDate": "2024-06-02T09:00:00.000Z"},
            {"task": "may", "completedDate": "2024-05-30T09:00:00.000Z"}
        ]
    }"#;
    let report = store.import_document(raw).unwrap();
    assert!(report.all_saved());

    assert!(store.day(key("2024-06-14")).is_none());
    assert_eq!(
        store.copy_snapshot(key("2024-06-15")).tasks(Quadrant::Schedule),
        ["imported".to_string()]
    );
    let ledger = store.completed_this_month();
    assert_eq!(ledger.len(), 1);
    assert_eq!(ledger[0].task, "june");
}

#[test]
fn mutations_survive_failed_flush() {
    let cache = MemoryChannel::new("cache");
    let file = MemoryChannel::new("file");
    file.set_fail_saves(true);
    let mut store = MatrixStore::with_clock(
        PersistenceGateway::new()
            .with_channel(cache.clone())
            .with_channel(file.clone()),
        utc_clock(2024, 6, 1, 10),
    );

    let report = store
        .add_task(key("2024-06-01"), Quadrant::DoNow, "write tests")
        .unwrap();
    assert_eq!(report.failed_channels(), ["file"]);
    assert_eq!(report.status_message(), "Saved to cache but not to file (channel unavailable: file rejects writes).");

    file.set_fail_saves(false);
    store
        .add_task(key("2024-06-01"), Quadrant::DoNow, "second")
        .unwrap();
    let persisted = file.body().expect("next flush reaches the file");
    assert!(persisted.contains("write tests"));
    assert!(persisted.contains("second"));
}
