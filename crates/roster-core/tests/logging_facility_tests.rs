// Logging facility boundary tests
// Verifies the canonical macros emit start/end/end_error with stable fields

use roster_core::logging_facility::test_capture::init_test_capture;
use roster_core::{log_op_end, log_op_error, log_op_start, ExError, ExErrorKind, RosterError};

#[test]
fn test_start_and_end_events_are_captured() {
    let capture = init_test_capture();

    log_op_start!("capture_boundary_op");
    log_op_end!("capture_boundary_op", duration_ms = 5);

    capture.assert_event_exists("capture_boundary_op", "start");
    capture.assert_event_exists("capture_boundary_op", "end");

    let end = capture
        .events()
        .into_iter()
        .find(|e| {
            e.op.as_deref() == Some("capture_boundary_op") && e.event.as_deref() == Some("end")
        })
        .unwrap();
    assert_eq!(end.fields.get("duration_ms").map(String::as_str), Some("5"));
    assert!(end.component.unwrap().contains("logging_facility_tests"));
}

#[test]
fn test_error_event_carries_code() {
    let capture = init_test_capture();

    log_op_error!(
        "capture_error_op",
        ExError::new(ExErrorKind::Persistence),
        duration_ms = 1
    );
    log_op_error!(
        "capture_domain_error_op",
        RosterError::StoreClosed,
        duration_ms = 0
    );

    let codes: Vec<String> = capture
        .events()
        .into_iter()
        .filter(|e| e.event.as_deref() == Some("end_error"))
        .filter_map(|e| e.fields.get("err_code").cloned())
        .collect();
    assert!(codes.contains(&"ERR_PERSISTENCE".to_string()));
    assert!(codes.contains(&"ERR_STORE_CLOSED".to_string()));
}

#[test]
fn test_extra_fields_are_recorded() {
    let capture = init_test_capture();

    log_op_start!("capture_fields_op", person_id = 42_i64);

    let count = capture.count_events(|e| {
        e.op.as_deref() == Some("capture_fields_op")
            && e.fields.get("person_id").map(String::as_str) == Some("42")
    });
    assert_eq!(count, 1);
}
