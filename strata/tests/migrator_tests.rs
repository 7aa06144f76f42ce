mod common;

use common::{Broken, Calls, CountingBaseline, CountingSeeder, CreateTable, DropsColumn, v};
use strata::MIGRATIONS_TABLE;
use strata::prelude::*;

#[tokio::test]
async fn test_two_migrations_on_empty_store() {
    let adapter = common::memory_adapter().await;
    let registry = Registry::new()
        .register(CreateTable::new(v(1, 0, 0), "init", "things"))
        .register(CreateTable::new(v(1, 1, 0), "add_widgets_table", "widgets"));
    let migrator = Migrator::new(adapter.clone(), registry);

    let first = migrator.migrate().await.expect("First run should succeed");
    assert_eq!(
        first,
        RunResult {
            was_first_run: true,
            applied_versions: vec![v(1, 0, 0), v(1, 1, 0)],
            current_version: Some(v(1, 1, 0)),
            previous_version: None,
        }
    );

    let second = migrator.migrate().await.expect("Second run should succeed");
    assert_eq!(
        second,
        RunResult {
            was_first_run: false,
            applied_versions: vec![],
            current_version: Some(v(1, 1, 0)),
            previous_version: Some(v(1, 1, 0)),
        }
    );

    assert!(adapter.table_exists("widgets").await.unwrap());
}

#[tokio::test]
async fn test_records_follow_registry_order() {
    let adapter = common::memory_adapter().await;
    let registry = Registry::new()
        .register(CreateTable::new(v(0, 9, 0), "a", "a_things"))
        .register(CreateTable::new(v(1, 0, 0), "b", "b_things"))
        .register(CreateTable::new(v(1, 0, 1), "c", "c_things"));
    let migrator = Migrator::new(adapter, registry);
    migrator.migrate().await.unwrap();

    let applied = migrator.store().list_applied().await.unwrap();
    let names: Vec<&str> = applied.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["a", "b", "c"]);
    assert_eq!(applied[0].description.as_deref(), Some("Creates a test table"));
}

#[tokio::test]
async fn test_first_run_bootstraps_once_and_skips_covered_versions() {
    let adapter = common::memory_adapter().await;
    let baseline_calls = Calls::default();
    let init = CreateTable::new(v(1, 0, 0), "init", "things");
    let init_calls = init.calls.clone();
    let widgets = CreateTable::new(v(1, 1, 0), "add_widgets_table", "widgets");
    let widget_calls = widgets.calls.clone();

    let migrator = Migrator::new(adapter.clone(), Registry::new().register(init).register(widgets))
        .with_bootstrapper(CountingBaseline {
            calls: baseline_calls.clone(),
            covers: vec![v(1, 0, 0)],
        });

    assert!(migrator.is_first_run().await.unwrap());
    let result = migrator.migrate().await.unwrap();
    assert!(result.was_first_run);
    assert_eq!(result.applied_versions, vec![v(1, 0, 0), v(1, 1, 0)]);
    assert_eq!(baseline_calls.count(), 1);
    assert_eq!(init_calls.count(), 0, "covered migration must not run");
    assert_eq!(widget_calls.count(), 1);
    assert!(adapter.table_exists("baseline").await.unwrap());
    assert!(!adapter.table_exists("things").await.unwrap());

    migrator.migrate().await.unwrap();
    assert_eq!(baseline_calls.count(), 1);
    assert!(!migrator.is_first_run().await.unwrap());
}

#[tokio::test]
async fn test_seeder_runs_after_bootstrap_only_on_first_run() {
    let adapter = common::memory_adapter().await;
    let permissions = Calls::default();
    let roles = Calls::default();
    let migrator = Migrator::new(
        adapter,
        Registry::new().register(CreateTable::new(v(1, 0, 0), "init", "things")),
    )
    .with_seeder(CountingSeeder {
        permissions: permissions.clone(),
        roles: roles.clone(),
    });

    migrator.migrate().await.unwrap();
    migrator.migrate().await.unwrap();
    assert_eq!(permissions.count(), 1);
    assert_eq!(roles.count(), 1);
}

#[tokio::test]
async fn test_failure_stops_the_run_and_records_nothing_after() {
    let adapter = common::memory_adapter().await;
    let last = CreateTable::new(v(1, 2, 0), "after_broken", "late");
    let last_calls = last.calls.clone();
    let registry = Registry::new()
        .register(CreateTable::new(v(1, 0, 0), "init", "things"))
        .register(Broken { version: v(1, 1, 0) })
        .register(last);
    let migrator = Migrator::new(adapter.clone(), registry);

    let err = migrator.migrate().await.expect_err("Broken migration must fail");
    match &err {
        MigrationError::MigrationFailed { version, name, .. } => {
            assert_eq!(*version, v(1, 1, 0));
            assert_eq!(name, "broken");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(err.version(), Some(v(1, 1, 0)));
    assert_eq!(last_calls.count(), 0);

    let status = migrator.status().await.unwrap();
    assert_eq!(status.current_version, Some(v(1, 0, 0)));
    assert_eq!(status.pending_versions, vec![v(1, 1, 0), v(1, 2, 0)]);
    assert!(!adapter.table_exists("late").await.unwrap());
}

#[tokio::test]
async fn test_recording_twice_is_a_duplicate_version() {
    let adapter = common::memory_adapter().await;
    let migrator = Migrator::new(adapter, Registry::new());
    migrator.store().ensure_exists().await.unwrap();

    let init = CreateTable::new(v(1, 0, 0), "init", "things");
    migrator.store().record(&init).await.unwrap();
    let err = migrator
        .store()
        .record(&init)
        .await
        .expect_err("Second record must fail");
    assert!(matches!(
        err,
        MigrationError::DuplicateVersion { version } if version == v(1, 0, 0)
    ));
}

#[tokio::test]
async fn test_duplicate_registry_version_fails_when_recording() {
    let adapter = common::memory_adapter().await;
    let registry = Registry::new()
        .register(CreateTable::new(v(1, 0, 0), "init", "things"))
        .register(CreateTable::new(v(1, 0, 0), "init_again", "other_things"));
    assert!(registry.check().is_err());

    let migrator = Migrator::new(adapter, registry);
    let err = migrator.migrate().await.expect_err("Duplicate must be rejected");
    assert!(matches!(err, MigrationError::DuplicateVersion { .. }));

    let applied = migrator.store().list_applied().await.unwrap();
    assert_eq!(applied.len(), 1);
    assert_eq!(applied[0].name, "init");
}

#[tokio::test]
async fn test_unknown_recorded_version_is_rejected() {
    let adapter = common::memory_adapter().await;
    let newer = Migrator::new(
        adapter.clone(),
        Registry::new()
            .register(CreateTable::new(v(1, 0, 0), "init", "things"))
            .register(CreateTable::new(v(2, 0, 0), "future", "future_things")),
    );
    newer.migrate().await.unwrap();

    let older = Migrator::new(
        adapter,
        Registry::new().register(CreateTable::new(v(1, 0, 0), "init", "things")),
    );
    let err = older.migrate().await.expect_err("Older build must refuse");
    assert!(matches!(
        err,
        MigrationError::UnknownVersion { version } if version == v(2, 0, 0)
    ));
}

#[tokio::test]
async fn test_status_has_no_side_effects_beyond_the_store() {
    let adapter = common::memory_adapter().await;
    let registry = Registry::new()
        .register(CreateTable::new(v(1, 0, 0), "init", "things"))
        .register(CreateTable::new(v(1, 1, 0), "add_widgets_table", "widgets"));
    let migrator = Migrator::new(adapter.clone(), registry);

    let status = migrator.status().await.unwrap();
    assert_eq!(status.current_version, None);
    assert_eq!(status.target_version, Some(v(1, 1, 0)));
    assert_eq!(status.pending_versions, vec![v(1, 0, 0), v(1, 1, 0)]);
    assert!(status.applied.is_empty());
    assert!(!status.is_up_to_date());
    assert!(!adapter.table_exists("things").await.unwrap());
    assert!(adapter.table_exists(MIGRATIONS_TABLE).await.unwrap());

    migrator.migrate().await.unwrap();
    let status = migrator.status().await.unwrap();
    assert!(status.is_up_to_date());
    assert_eq!(status.current_version, Some(v(1, 1, 0)));
    assert_eq!(status.applied.len(), 2);
    assert_eq!(migrator.current_version().await.unwrap(), Some(v(1, 1, 0)));
    assert!(migrator.pending().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_refused_operation_is_reported_as_unsupported() {
    let adapter = common::memory_adapter().await;
    let registry = Registry::new()
        .register(CreateTable::new(v(1, 0, 0), "init", "widgets"))
        .register(DropsColumn { version: v(1, 1, 0) });
    let migrator = Migrator::new(adapter, registry);

    let err = migrator.migrate().await.expect_err("Drop column is refused");
    match err {
        MigrationError::UnsupportedOperation {
            version, dialect, ..
        } => {
            assert_eq!(version, v(1, 1, 0));
            assert_eq!(dialect, Dialect::Sqlite);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(migrator.current_version().await.unwrap(), Some(v(1, 0, 0)));
}

#[tokio::test]
async fn test_revert_last_runs_reverse_and_removes_record() {
    let adapter = common::memory_adapter().await;
    let registry = Registry::new()
        .register(CreateTable::new(v(1, 0, 0), "init", "things"))
        .register(CreateTable::new(v(1, 1, 0), "add_widgets_table", "widgets"));
    let migrator = Migrator::new(adapter.clone(), registry);
    migrator.migrate().await.unwrap();

    let reverted = migrator.revert_last().await.unwrap();
    assert_eq!(reverted, Some(v(1, 1, 0)));
    assert!(!adapter.table_exists("widgets").await.unwrap());
    assert_eq!(migrator.current_version().await.unwrap(), Some(v(1, 0, 0)));

    // The reverted version is pending again.
    let result = migrator.migrate().await.unwrap();
    assert_eq!(result.applied_versions, vec![v(1, 1, 0)]);
    assert!(adapter.table_exists("widgets").await.unwrap());
}

#[tokio::test]
async fn test_revert_last_refuses_irreversible_migrations() {
    let adapter = common::memory_adapter().await;
    let registry = Registry::new()
        .register(CreateTable::new(v(1, 0, 0), "init", "widgets"))
        .register(Broken { version: v(1, 1, 0) });
    let migrator = Migrator::new(adapter, registry);
    migrator.migrate().await.expect_err("Broken migration fails");

    // Record the broken one by hand so it is the latest entry.
    migrator.store().record(&Broken { version: v(1, 1, 0) }).await.unwrap();

    let err = migrator.revert_last().await.expect_err("No reverse action");
    assert!(matches!(
        err,
        MigrationError::Irreversible { version, .. } if version == v(1, 1, 0)
    ));
    assert_eq!(migrator.current_version().await.unwrap(), Some(v(1, 1, 0)));
}

#[tokio::test]
async fn test_revert_last_on_empty_store_is_none() {
    let adapter = common::memory_adapter().await;
    let migrator = Migrator::new(adapter, Registry::new());
    migrator.store().ensure_exists().await.unwrap();
    assert_eq!(migrator.revert_last().await.unwrap(), None);
}
