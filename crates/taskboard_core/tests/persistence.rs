use chrono::NaiveDate;
use taskboard_core::db::open_db_in_memory;
use taskboard_core::{
    KeyValueStore, MemoryKeyValueStore, PersistError, SqliteKeyValueStore, TaskPersistence,
    TaskRecord,
};
use uuid::Uuid;

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn sample_tasks() -> Vec<TaskRecord> {
    let mut gym = TaskRecord::new("Gym", day(2024, 1, 2), "gym").unwrap();
    gym.completed = true;
    vec![
        TaskRecord::new("Buy milk", day(2024, 1, 1), "shopping").unwrap(),
        gym,
        TaskRecord::new("Leap day", day(2024, 2, 29), "mystery").unwrap(),
    ]
}

#[test]
fn save_then_load_round_trips_in_memory() {
    let persistence = TaskPersistence::new(MemoryKeyValueStore::new());
    let tasks = sample_tasks();

    persistence.save_tasks(&tasks).unwrap();
    assert_eq!(persistence.try_load_tasks().unwrap(), tasks);
}

#[test]
fn save_then_load_round_trips_through_sqlite() {
    let conn = open_db_in_memory().unwrap();
    let kv = SqliteKeyValueStore::try_new(&conn).unwrap();
    let persistence = TaskPersistence::new(kv);
    let tasks = sample_tasks();

    persistence.save_tasks(&tasks).unwrap();
    persistence.save_preference(true).unwrap();

    assert_eq!(persistence.try_load_tasks().unwrap(), tasks);
    assert!(persistence.try_load_preference().unwrap());
}

#[test]
fn saved_payload_uses_storage_schema() {
    let persistence = TaskPersistence::new(MemoryKeyValueStore::new());
    let tasks = sample_tasks();
    persistence.save_tasks(&tasks).unwrap();

    let raw = persistence.backend().get("tasks").unwrap().unwrap();
    let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
    let first = &json.as_array().unwrap()[0];
    assert_eq!(first["text"], "Buy milk");
    assert_eq!(first["date"], "2024-01-01");
    assert_eq!(first["completed"], false);
    assert_eq!(first["type"], "shopping");
    assert_eq!(first["id"], tasks[0].id.to_string());
}

#[test]
fn invalid_json_loads_as_empty() {
    let store = MemoryKeyValueStore::with_entries([("tasks", "definitely not json")]);
    let persistence = TaskPersistence::new(store);

    assert!(matches!(
        persistence.try_load_tasks(),
        Err(PersistError::Malformed { .. })
    ));
    assert!(persistence.load_tasks().is_empty());
}

#[test]
fn undecodable_records_are_skipped() {
    let payload = serde_json::json!([
        { "text": "good", "date": "2024-01-01", "completed": false, "type": "work" },
        { "text": "bad date", "date": "next tuesday", "completed": false, "type": "work" },
        { "date": "2024-01-03" },
        { "text": "browser", "date": "2024-01-04T00:00:00.000Z", "completed": true, "type": "gym" }
    ]);
    let store = MemoryKeyValueStore::with_entries([("tasks", payload.to_string())]);
    let persistence = TaskPersistence::new(store);

    let tasks = persistence.try_load_tasks().unwrap();
    let texts: Vec<&str> = tasks.iter().map(|task| task.text.as_str()).collect();
    assert_eq!(texts, vec!["good", "browser"]);
    assert_eq!(tasks[1].date, day(2024, 1, 4));
    assert!(tasks[1].completed);
}

#[test]
fn duplicate_ids_are_rekeyed_on_load() {
    let id = Uuid::new_v4().to_string();
    let payload = serde_json::json!([
        { "id": id, "text": "one", "date": "2024-01-01", "completed": false, "type": "work" },
        { "id": id, "text": "two", "date": "2024-01-02", "completed": false, "type": "work" }
    ]);
    let store = MemoryKeyValueStore::with_entries([("tasks", payload.to_string())]);
    let tasks = TaskPersistence::new(store).try_load_tasks().unwrap();

    assert_eq!(tasks.len(), 2);
    assert_eq!(tasks[0].id.to_string(), id);
    assert_ne!(tasks[0].id, tasks[1].id);
}

#[test]
fn write_failure_is_typed_and_keeps_prior_value() {
    let store = MemoryKeyValueStore::new();
    let persistence = TaskPersistence::new(&store);
    persistence.save_tasks(&sample_tasks()).unwrap();

    store.set_simulate_write_error(true);
    let err = persistence.save_tasks(&[]).unwrap_err();
    assert!(matches!(err, PersistError::Store(_)));
    assert!(persistence.save_preference(true).is_err());

    assert_eq!(persistence.load_tasks().len(), 3);
    assert!(!persistence.load_preference());
}
