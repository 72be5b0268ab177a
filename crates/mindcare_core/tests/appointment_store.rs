use chrono::{NaiveDate, NaiveTime};
use mindcare_core::db::open_db_in_memory;
use mindcare_core::{
    Appointment, AppointmentKind, AppointmentStore, AppointmentTemplate, GroupId, RepoError,
    SqliteAppointmentStore,
};

fn appointment(user_id: &str, day: u32, group_id: Option<&str>) -> Appointment {
    let template = AppointmentTemplate::new(
        user_id,
        "yoga",
        AppointmentKind::SelfCare,
        NaiveDate::from_ymd_opt(2024, 6, day).unwrap(),
    );
    Appointment::from_template(template, group_id.map(GroupId::new))
}

#[test]
fn create_and_get_roundtrip_preserves_all_fields() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteAppointmentStore::new(&conn);

    let mut created = appointment("user-1", 3, Some("weekly_2024-06-03_yoga_1"));
    created.start_time = Some(NaiveTime::from_hms_opt(7, 15, 0).unwrap());
    created.end_time = Some(NaiveTime::from_hms_opt(8, 0, 0).unwrap());
    created.reminder_minutes = Some(10);
    created.memo = Some("mat".to_string());
    let id = store.create_appointment(&created).unwrap();

    let loaded = store.get_appointment(id).unwrap().unwrap();
    assert_eq!(loaded, created);
}

#[test]
fn create_rejects_invalid_appointment() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteAppointmentStore::new(&conn);

    let mut invalid = appointment("user-1", 3, None);
    invalid.title = " ".to_string();
    let err = store.create_appointment(&invalid).unwrap_err();
    assert!(matches!(err, RepoError::Validation(_)));
}

#[test]
fn list_by_user_is_scoped_and_ordered_by_date() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteAppointmentStore::new(&conn);

    let late = appointment("user-1", 20, None);
    let early = appointment("user-1", 2, None);
    let other = appointment("user-2", 10, None);
    for item in [&late, &early, &other] {
        store.create_appointment(item).unwrap();
    }

    let listed = store.list_by_user("user-1").unwrap();
    let ids: Vec<_> = listed.iter().map(|a| a.id).collect();
    assert_eq!(ids, vec![early.id, late.id]);
}

#[test]
fn delete_by_id_is_idempotent() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteAppointmentStore::new(&conn);

    let item = appointment("user-1", 5, None);
    store.create_appointment(&item).unwrap();

    assert!(store.delete_by_id(item.id).unwrap());
    assert!(!store.delete_by_id(item.id).unwrap());
    assert!(!store.delete_by_id(uuid::Uuid::new_v4()).unwrap());

    assert!(store.get_appointment(item.id).unwrap().is_none());
    assert!(store.list_by_user("user-1").unwrap().is_empty());
}

#[test]
fn read_rejects_corrupted_rows() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteAppointmentStore::new(&conn);

    let item = appointment("user-1", 5, None);
    store.create_appointment(&item).unwrap();
    conn.execute(
        "UPDATE appointments SET date = 'not-a-date' WHERE id = ?1",
        [item.id.to_string()],
    )
    .unwrap();

    let err = store.list_by_user("user-1").unwrap_err();
    assert!(matches!(err, RepoError::InvalidData(message) if message.contains("appointments.date")));
}
