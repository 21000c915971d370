use tao_core::db::open_db_in_memory;
use tao_core::{
    Enrichment, Record, RecordListQuery, RecordRepository, RecordStatus, RepoError,
    SqliteRecordRepository, ValidationError,
};
use uuid::Uuid;

fn names(records: &[Record]) -> Vec<&str> {
    records.iter().map(|record| record.name.as_str()).collect()
}

#[test]
fn create_and_get_roundtrip() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteRecordRepository::new(&conn);

    let mut record = Record::new("Silent Hill 2", "PS2");
    record.notes = "director's cut".to_string();
    let id = repo.create_record(&record).unwrap();

    let loaded = repo.get_record(id).unwrap().unwrap();
    assert_eq!(loaded, record);
    assert!(!loaded.is_classified());
}

#[test]
fn get_unknown_record_returns_none() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteRecordRepository::new(&conn);

    assert!(repo.get_record(Uuid::new_v4()).unwrap().is_none());
}

#[test]
fn created_records_are_listed_newest_first() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteRecordRepository::new(&conn);

    for name in ["first", "second", "third"] {
        repo.create_record(&Record::new(name, "PC")).unwrap();
    }
    repo.append_record(&Record::new("tail", "PC")).unwrap();

    let listed = repo.list_records(&RecordListQuery::default()).unwrap();
    assert_eq!(names(&listed), vec!["third", "second", "first", "tail"]);
}

#[test]
fn pending_filter_matches_classification_rule() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteRecordRepository::new(&conn);

    let pending = Record::new("pending", "PC");
    let mut blank = Record::new("blank description", "PC");
    blank.description = Some(String::new());
    let mut done = Record::new("done", "PC");
    done.description = Some("Known.".to_string());
    for record in [&pending, &blank, &done] {
        repo.append_record(record).unwrap();
    }

    let listed = repo
        .list_records(&RecordListQuery {
            pending_only: true,
            ..RecordListQuery::default()
        })
        .unwrap();
    assert_eq!(names(&listed), vec!["pending", "blank description"]);
}

#[test]
fn list_supports_limit_and_offset() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteRecordRepository::new(&conn);
    for name in ["a", "b", "c", "d"] {
        repo.append_record(&Record::new(name, "PC")).unwrap();
    }

    let page = repo
        .list_records(&RecordListQuery {
            limit: Some(2),
            offset: 1,
            ..RecordListQuery::default()
        })
        .unwrap();
    assert_eq!(names(&page), vec!["b", "c"]);

    let rest = repo
        .list_records(&RecordListQuery {
            offset: 3,
            ..RecordListQuery::default()
        })
        .unwrap();
    assert_eq!(names(&rest), vec!["d"]);
}

#[test]
fn apply_enrichment_only_touches_enrichment_fields() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteRecordRepository::new(&conn);
    let mut record = Record::new("Shenmue", "Dreamcast");
    record.notes = "keep".to_string();
    record.status = RecordStatus::Finished;
    repo.create_record(&record).unwrap();

    let enrichment = Enrichment {
        category: "Adventure".to_string(),
        tags: vec!["Open World".to_string(), "Forklift".to_string()],
        description: "Ryo looks for sailors.".to_string(),
        score: 4.2,
    };
    repo.apply_enrichment(record.id, &enrichment).unwrap();

    let loaded = repo.get_record(record.id).unwrap().unwrap();
    record.apply_enrichment(&enrichment);
    assert_eq!(loaded, record);
}

#[test]
fn apply_enrichment_to_unknown_record_returns_not_found() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteRecordRepository::new(&conn);
    let id = Uuid::new_v4();

    let enrichment = Enrichment {
        category: "RPG".to_string(),
        tags: Vec::new(),
        description: "x".to_string(),
        score: 1.0,
    };
    let err = repo.apply_enrichment(id, &enrichment).unwrap_err();
    assert!(matches!(err, RepoError::NotFound(missing) if missing == id));
}

#[test]
fn apply_enrichment_rejects_out_of_range_score() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteRecordRepository::new(&conn);
    let record = Record::new("Rez", "PS2");
    repo.create_record(&record).unwrap();

    let enrichment = Enrichment {
        category: "Shooter".to_string(),
        tags: Vec::new(),
        description: "Trance.".to_string(),
        score: 9.0,
    };
    let err = repo.apply_enrichment(record.id, &enrichment).unwrap_err();
    assert!(matches!(
        err,
        RepoError::Validation(ValidationError::ScoreOutOfRange(_))
    ));
    assert!(!repo.get_record(record.id).unwrap().unwrap().is_classified());
}

#[test]
fn update_record_rewrites_user_fields() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteRecordRepository::new(&conn);
    let mut record = Record::new("Vagrant Story", "PS1");
    repo.create_record(&record).unwrap();

    record.status = RecordStatus::Playing;
    record.notes = "chapter 3".to_string();
    repo.update_record(&record).unwrap();

    assert_eq!(repo.get_record(record.id).unwrap().unwrap(), record);
}

#[test]
fn update_unknown_record_returns_not_found() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteRecordRepository::new(&conn);

    let record = Record::new("ghost", "PC");
    let err = repo.update_record(&record).unwrap_err();
    assert!(matches!(err, RepoError::NotFound(id) if id == record.id));
}

#[test]
fn create_rejects_blank_name() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteRecordRepository::new(&conn);

    let err = repo.create_record(&Record::new("   ", "PC")).unwrap_err();
    assert!(matches!(err, RepoError::Validation(ValidationError::EmptyName)));
}

#[test]
fn batch_create_keeps_input_order_in_front() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteRecordRepository::new(&conn);
    repo.create_record(&Record::new("older", "PC")).unwrap();

    let batch = vec![Record::new("a", "PC"), Record::new("b", "PC"), Record::new("c", "PC")];
    assert_eq!(repo.create_records(&batch).unwrap(), 3);

    let listed = repo.list_records(&RecordListQuery::default()).unwrap();
    assert_eq!(names(&listed), vec!["a", "b", "c", "older"]);
}

#[test]
fn batch_create_stores_nothing_when_one_insert_fails() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteRecordRepository::new(&conn);
    let existing = Record::new("Ico", "PS2");
    repo.create_record(&existing).unwrap();

    let batch = vec![Record::new("Rez", "PS2"), existing.clone(), Record::new("Okami", "PS2")];
    let err = repo.create_records(&batch).unwrap_err();

    assert!(matches!(err, RepoError::Db(_)));
    let listed = repo.list_records(&RecordListQuery::default()).unwrap();
    assert_eq!(listed, vec![existing]);
    assert!(conn.is_autocommit());
}

#[test]
fn duplicate_identity_is_rejected() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteRecordRepository::new(&conn);
    let record = Record::new("Ico", "PS2");
    repo.create_record(&record).unwrap();

    let err = repo.append_record(&record).unwrap_err();
    assert!(matches!(err, RepoError::Db(_)));
}

#[test]
fn corrupted_tags_surface_as_invalid_data() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteRecordRepository::new(&conn);
    let record = Record::new("Ico", "PS2");
    repo.create_record(&record).unwrap();
    conn.execute(
        "UPDATE records SET tags = 'not json' WHERE uuid = ?1;",
        [record.id.to_string()],
    )
    .unwrap();

    let err = repo.get_record(record.id).unwrap_err();
    assert!(matches!(err, RepoError::InvalidData(_)));
}
