// Store operations emit canonical start/end boundaries

use roster_core::logging_facility::test_capture::init_test_capture;
use roster_core::NewPerson;
use roster_store::PersonStore;

#[test]
fn test_insert_logs_boundaries_with_person_id() {
    let capture = init_test_capture();
    let store = PersonStore::open_in_memory().unwrap();

    let id = store.insert(NewPerson::new("Ada", "Lovelace", 36)).unwrap();

    capture.assert_event_exists("store_open", "end");
    capture.assert_event_exists("person_insert", "start");
    capture.assert_event_exists("person_insert", "end");

    let with_id = capture.count_events(|e| {
        e.op.as_deref() == Some("person_insert")
            && e.event.as_deref() == Some("end")
            && e.fields.get("person_id") == Some(&id.to_string())
    });
    assert!(with_id >= 1);
}

#[test]
fn test_failed_insert_logs_error_code() {
    let capture = init_test_capture();
    let store = PersonStore::open_in_memory().unwrap();
    store.close().unwrap();

    store.insert(NewPerson::new("Ada", "Lovelace", 36)).unwrap_err();

    let errors = capture.count_events(|e| {
        e.op.as_deref() == Some("person_insert")
            && e.event.as_deref() == Some("end_error")
            && e.fields.get("err_code").map(String::as_str) == Some("ERR_STORE_CLOSED")
    });
    assert!(errors >= 1);
}
