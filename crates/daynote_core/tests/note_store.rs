use chrono::{DateTime, Local, NaiveDate};
use daynote_core::db::open_db_in_memory;
use daynote_core::{
    Note, NoteDraft, NoteId, NoteRepository, NoteService, NoteServiceError, NoteValidationError,
    RepoError, SqliteNoteRepository,
};
use rusqlite::Connection;

fn day(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

#[test]
fn add_and_list_by_day_matches_calendar_day_only() {
    let mut conn = open_db_in_memory().unwrap();
    let repo = SqliteNoteRepository::try_new(&mut conn).unwrap();
    let service = NoteService::new(repo);

    let first = service.add_note(day(2024, 6, 1), "  pick up keys ").unwrap();
    let second = service.add_note(day(2024, 6, 1), "call mom").unwrap();
    service.add_note(day(2024, 6, 2), "next day").unwrap();
    service.add_note(day(2023, 6, 1), "other year").unwrap();

    assert_eq!(first.description, "pick up keys");
    assert_eq!(first.date, day(2024, 6, 1).and_hms_opt(0, 0, 0).unwrap());
    assert!(second.id > first.id);

    let listed = service.list_notes_for_day(day(2024, 6, 1)).unwrap();
    assert_eq!(listed, vec![first, second]);
    assert!(service
        .list_notes_for_day(day(2024, 6, 3))
        .unwrap()
        .is_empty());
}

#[test]
fn add_rejects_blank_and_oversized_descriptions() {
    let mut conn = open_db_in_memory().unwrap();
    let repo = SqliteNoteRepository::try_new(&mut conn).unwrap();
    let service = NoteService::new(repo);

    let err = service.add_note(day(2024, 6, 1), "   ").unwrap_err();
    assert!(matches!(
        err,
        NoteServiceError::InvalidDescription(NoteValidationError::EmptyDescription)
    ));

    let long = "x".repeat(501);
    let err = service.add_note(day(2024, 6, 1), &long).unwrap_err();
    assert!(matches!(
        err,
        NoteServiceError::InvalidDescription(NoteValidationError::DescriptionTooLong { .. })
    ));
    assert!(service.list_notes().unwrap().is_empty());
}

#[test]
fn delete_is_noop_for_absent_id() {
    let mut conn = open_db_in_memory().unwrap();
    let repo = SqliteNoteRepository::try_new(&mut conn).unwrap();
    let service = NoteService::new(repo);
    let note = service.add_note(day(2024, 2, 29), "leap").unwrap();

    assert!(service.delete_note(note.id).unwrap());
    assert!(!service.delete_note(note.id).unwrap());
    assert!(!service.delete_note(NoteId(9_999)).unwrap());
    assert!(service.get_note(note.id).unwrap().is_none());
}

#[test]
fn ids_are_not_reused_after_delete() {
    let mut conn = open_db_in_memory().unwrap();
    let repo = SqliteNoteRepository::try_new(&mut conn).unwrap();
    let service = NoteService::new(repo);

    let first = service.add_note(day(2024, 1, 1), "one").unwrap();
    service.delete_note(first.id).unwrap();
    let second = service.add_note(day(2024, 1, 1), "two").unwrap();
    assert_ne!(first.id, second.id);
}

#[test]
fn relocate_keeps_id_and_description() {
    let mut conn = open_db_in_memory().unwrap();
    let repo = SqliteNoteRepository::try_new(&mut conn).unwrap();
    let mut service = NoteService::new(repo);
    let note = service.add_note(day(2024, 6, 1), "dentist").unwrap();

    let moved = service.relocate_note(note.id, day(2024, 7, 15)).unwrap();
    assert_eq!(moved.id, note.id);
    assert_eq!(moved.description, "dentist");
    assert_eq!(moved.anchor_day(), day(2024, 7, 15));

    assert!(service
        .list_notes_for_day(day(2024, 6, 1))
        .unwrap()
        .is_empty());
    assert_eq!(
        service.list_notes_for_day(day(2024, 7, 15)).unwrap(),
        vec![moved]
    );

    let err = service
        .relocate_note(NoteId(404), day(2024, 7, 15))
        .unwrap_err();
    assert!(matches!(err, NoteServiceError::NoteNotFound(NoteId(404))));
}

#[test]
fn delete_then_insert_with_same_id_acts_as_update() {
    let mut conn = open_db_in_memory().unwrap();
    let repo = SqliteNoteRepository::try_new(&mut conn).unwrap();
    let note = repo
        .add_note(&NoteDraft::new(day(2024, 3, 10), "gym"))
        .unwrap();

    assert!(repo.delete_note(note.id).unwrap());
    let updated = Note {
        date: day(2024, 3, 12).and_hms_opt(0, 0, 0).unwrap(),
        ..note.clone()
    };
    repo.insert_note(&updated).unwrap();

    assert_eq!(repo.get_note(note.id).unwrap(), Some(updated));
    assert_eq!(repo.list_notes().unwrap().len(), 1);
}

#[test]
fn insert_with_taken_id_conflicts() {
    let mut conn = open_db_in_memory().unwrap();
    let repo = SqliteNoteRepository::try_new(&mut conn).unwrap();
    let note = repo
        .add_note(&NoteDraft::new(day(2024, 3, 10), "gym"))
        .unwrap();

    let err = repo.insert_note(&note).unwrap_err();
    assert!(matches!(err, RepoError::Conflict(id) if id == note.id));
}

#[test]
fn export_then_import_into_fresh_store_preserves_ids() {
    let exported = {
        let mut conn = open_db_in_memory().unwrap();
        let repo = SqliteNoteRepository::try_new(&mut conn).unwrap();
        let service = NoteService::new(repo);
        service.add_note(day(2024, 6, 2), "second day").unwrap();
        service.add_note(day(2024, 6, 1), "first day").unwrap();
        service.export_json().unwrap()
    };

    let value: serde_json::Value = serde_json::from_str(&exported).unwrap();
    let notes = value["notes"].as_array().unwrap();
    assert_eq!(notes.len(), 2);
    assert_eq!(notes[0]["date"], "2024-06-01T00:00:00");
    assert_eq!(notes[0]["description"], "first day");
    assert_eq!(notes[0]["id"], 2);

    let mut conn = open_db_in_memory().unwrap();
    let repo = SqliteNoteRepository::try_new(&mut conn).unwrap();
    let mut service = NoteService::new(repo);
    assert_eq!(service.import_json(&exported).unwrap(), 2);

    let imported = service.list_notes_for_day(day(2024, 6, 1)).unwrap();
    assert_eq!(imported.len(), 1);
    assert_eq!(imported[0].id, NoteId(2));

    let follow_up = service.add_note(day(2024, 6, 3), "after import").unwrap();
    assert!(follow_up.id > NoteId(2));
}

#[test]
fn import_is_all_or_nothing() {
    let mut conn = open_db_in_memory().unwrap();
    let repo = SqliteNoteRepository::try_new(&mut conn).unwrap();
    let mut service = NoteService::new(repo);
    let existing = service.add_note(day(2024, 6, 1), "kept").unwrap();

    let document = format!(
        r#"{{"notes":[
            {{"id":50,"date":"2024-06-05T00:00:00","description":"new"}},
            {{"id":{},"date":"2024-06-06T00:00:00","description":"clash"}}
        ]}}"#,
        existing.id
    );
    let err = service.import_json(&document).unwrap_err();
    assert!(matches!(err, NoteServiceError::NoteConflict(id) if id == existing.id));
    assert_eq!(service.list_notes().unwrap(), vec![existing]);

    let err = service.import_json("{not json").unwrap_err();
    assert!(matches!(err, NoteServiceError::Serialization(_)));
}

#[test]
fn import_normalizes_dates_to_midnight() {
    let mut conn = open_db_in_memory().unwrap();
    let repo = SqliteNoteRepository::try_new(&mut conn).unwrap();
    let mut service = NoteService::new(repo);

    service
        .import_json(r#"{"notes":[{"id":7,"date":"2024-06-05T13:45:00","description":"lunch"}]}"#)
        .unwrap();
    let note = service.get_note(NoteId(7)).unwrap().unwrap();
    assert_eq!(note.date, day(2024, 6, 5).and_hms_opt(0, 0, 0).unwrap());
}

#[test]
fn repository_rejects_unmigrated_connection() {
    let mut conn = Connection::open_in_memory().unwrap();
    let err = SqliteNoteRepository::try_new(&mut conn).err().unwrap();
    assert!(matches!(
        err,
        RepoError::UninitializedConnection {
            actual_version: 0,
            ..
        }
    ));
}

#[test]
fn repository_stores_trimmed_descriptions() {
    let mut conn = open_db_in_memory().unwrap();
    let repo = SqliteNoteRepository::try_new(&mut conn).unwrap();

    let added = repo
        .add_note(&NoteDraft::new(day(2024, 3, 10), "  gym  "))
        .unwrap();
    assert_eq!(added.description, "gym");

    repo.insert_note(&Note {
        id: NoteId(40),
        date: day(2024, 3, 11).and_hms_opt(0, 0, 0).unwrap(),
        description: "\tstretch \n".to_string(),
    })
    .unwrap();

    let stored: Vec<String> = repo
        .list_notes()
        .unwrap()
        .into_iter()
        .map(|note| note.description)
        .collect();
    assert_eq!(stored, vec!["gym", "stretch"]);
}

#[test]
fn import_accepts_records_without_ids_and_utc_instants() {
    let mut conn = open_db_in_memory().unwrap();
    let repo = SqliteNoteRepository::try_new(&mut conn).unwrap();
    let mut service = NoteService::new(repo);
    let existing = service.add_note(day(2024, 5, 1), "already here").unwrap();

    let instant = "2024-06-01T00:00:00.000Z";
    let document = format!(
        r#"{{"notes":[
            {{"date":"{instant}","description":" from an old export "}},
            {{"id":90,"date":"2024-06-02T00:00:00","description":"keyed"}}
        ]}}"#
    );
    assert_eq!(service.import_json(&document).unwrap(), 2);

    let expected_day = DateTime::parse_from_rfc3339(instant)
        .unwrap()
        .with_timezone(&Local)
        .date_naive();
    let imported = service.list_notes_for_day(expected_day).unwrap();
    assert_eq!(imported.len(), 1);
    assert_eq!(imported[0].description, "from an old export");
    assert_eq!(imported[0].date, expected_day.and_hms_opt(0, 0, 0).unwrap());
    assert!(imported[0].id > existing.id);
    assert_ne!(imported[0].id, NoteId(90));

    let keyed = service.get_note(NoteId(90)).unwrap().unwrap();
    assert_eq!(keyed.description, "keyed");
}

#[test]
fn import_rejects_unparseable_dates() {
    let mut conn = open_db_in_memory().unwrap();
    let repo = SqliteNoteRepository::try_new(&mut conn).unwrap();
    let mut service = NoteService::new(repo);

    let err = service
        .import_json(r#"{"notes":[{"date":"next tuesday","description":"x"}]}"#)
        .unwrap_err();
    assert!(matches!(err, NoteServiceError::Serialization(_)));
    assert!(service.list_notes().unwrap().is_empty());
}
