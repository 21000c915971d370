mod common;

use common::classified;
use tao_core::db::open_db_in_memory;
use tao_core::{
    export_snapshot, import_snapshot, CatalogSnapshot, Idea, IdeaRepository, ImportSummary,
    Record, RecordListQuery, RecordRepository, ServiceError, SqliteIdeaRepository,
    SqliteRecordRepository,
};

#[test]
fn export_then_import_into_empty_store_restores_everything() {
    let source = open_db_in_memory().unwrap();
    let records = SqliteRecordRepository::new(&source);
    let ideas = SqliteIdeaRepository::new(&source);
    records.create_record(&Record::new("Pending", "PS2")).unwrap();
    records.create_record(&classified("Ico")).unwrap();
    ideas.create_idea(&Idea::new("Fog town", "", "Dread")).unwrap();

    let json = export_snapshot(&records, &ideas)
        .unwrap()
        .to_json()
        .unwrap();

    let target = open_db_in_memory().unwrap();
    let target_records = SqliteRecordRepository::new(&target);
    let target_ideas = SqliteIdeaRepository::new(&target);
    let snapshot = CatalogSnapshot::from_json(&json).unwrap();
    let summary = import_snapshot(&target, &snapshot).unwrap();

    assert_eq!(
        summary,
        ImportSummary {
            records_created: 2,
            records_updated: 0,
            ideas: 1,
        }
    );
    assert_eq!(
        target_records.list_records(&RecordListQuery::default()).unwrap(),
        records.list_records(&RecordListQuery::default()).unwrap()
    );
    assert_eq!(target_ideas.list_ideas().unwrap(), ideas.list_ideas().unwrap());
}

#[test]
fn import_upserts_by_identity() {
    let conn = open_db_in_memory().unwrap();
    let records = SqliteRecordRepository::new(&conn);
    let mut existing = Record::new("Ico", "PS2");
    records.create_record(&existing).unwrap();

    existing.notes = "from backup".to_string();
    let incoming = Record::new("Rez", "Dreamcast");
    let snapshot = CatalogSnapshot {
        records: vec![existing.clone(), incoming.clone()],
        ideas: Vec::new(),
    };
    let summary = import_snapshot(&conn, &snapshot).unwrap();

    assert_eq!(summary.records_created, 1);
    assert_eq!(summary.records_updated, 1);
    let listed = records.list_records(&RecordListQuery::default()).unwrap();
    assert_eq!(listed, vec![existing, incoming]);
}

#[test]
fn invalid_snapshot_writes_nothing() {
    let conn = open_db_in_memory().unwrap();
    let records = SqliteRecordRepository::new(&conn);

    let mut broken = classified("Ico");
    broken.score = Some(42.0);
    let snapshot = CatalogSnapshot {
        records: vec![Record::new("Fine", "PC"), broken],
        ideas: Vec::new(),
    };

    let err = import_snapshot(&conn, &snapshot).unwrap_err();
    assert!(matches!(err, ServiceError::Validation(_)));
    assert!(records
        .list_records(&RecordListQuery::default())
        .unwrap()
        .is_empty());
}

#[test]
fn malformed_json_is_a_snapshot_error() {
    let err = CatalogSnapshot::from_json("{\"tao_inventory\": 3}").unwrap_err();
    assert!(matches!(err, ServiceError::Snapshot(_)));
}

#[test]
fn failed_write_rolls_back_the_whole_import() {
    let conn = open_db_in_memory().unwrap();
    let records = SqliteRecordRepository::new(&conn);
    let ideas = SqliteIdeaRepository::new(&conn);
    let mut existing = Record::new("Ico", "PS2");
    records.create_record(&existing).unwrap();
    conn.execute_batch(
        "CREATE TEMP TRIGGER reject_ideas BEFORE INSERT ON ideas
         BEGIN SELECT RAISE(ABORT, 'ideas table is locked'); END;",
    )
    .unwrap();

    let before = records.list_records(&RecordListQuery::default()).unwrap();
    existing.notes = "from backup".to_string();
    let snapshot = CatalogSnapshot {
        records: vec![existing, Record::new("Rez", "Dreamcast")],
        ideas: vec![Idea::new("Fog town", "", "Dread")],
    };

    let err = import_snapshot(&conn, &snapshot).unwrap_err();

    assert!(matches!(err, ServiceError::Repo(_)));
    assert_eq!(
        records.list_records(&RecordListQuery::default()).unwrap(),
        before
    );
    assert!(ideas.list_ideas().unwrap().is_empty());
    assert!(conn.is_autocommit());
}
