use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use adk_session::{
    normalize_state_delta, CreateSessionRequest, Event, PatchSessionStateDeltaRequest,
    SessionIdentity, StateMap, ValidationError,
};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use session_store::{SessionStore, SessionStoreError};
use time::OffsetDateTime;

const NOW: i64 = 1_771_027_200;

fn fixed_clock_store() -> SessionStore {
    SessionStore::with_clock(|| OffsetDateTime::from_unix_timestamp(NOW).expect("timestamp"))
}

fn adjustable_clock_store() -> (SessionStore, Arc<AtomicI64>) {
    let seconds = Arc::new(AtomicI64::new(NOW));
    let clock = Arc::clone(&seconds);
    let store = SessionStore::with_clock(move || {
        OffsetDateTime::from_unix_timestamp(clock.load(Ordering::SeqCst)).expect("timestamp")
    });
    (store, seconds)
}

fn identity(session_id: &str) -> SessionIdentity {
    SessionIdentity::new("weather", "user-1")
        .expect("identity")
        .with_session_id(session_id)
}

fn state(value: Value) -> StateMap {
    value.as_object().cloned().expect("state fixture must be an object")
}

fn create_request(value: Value) -> CreateSessionRequest {
    serde_json::from_value(value).expect("create request should decode")
}

#[test]
fn create_then_get_returns_validated_snapshot() {
    let mut store = fixed_clock_store();
    let created = store
        .create(
            &identity("session-1"),
            create_request(json!({
                "state": {"city": "Oslo"},
                "events": [{"author": "user", "text": "hi"}],
            })),
        )
        .expect("session should be created");

    let fetched = store
        .get(&identity("session-1"))
        .expect("session should exist");

    assert_eq!(created, fetched);
    assert_eq!(
        serde_json::to_value(&fetched).expect("serialize"),
        json!({
            "id": "session-1",
            "appName": "weather",
            "userId": "user-1",
            "lastUpdateTime": NOW,
            "events": [{"author": "user", "text": "hi"}],
            "state": {"city": "Oslo"},
        })
    );
}

#[test]
fn create_without_session_id_allocates_uuid() {
    let mut store = fixed_clock_store();
    let anonymous = SessionIdentity::new("weather", "user-1").expect("identity");

    let snapshot = store
        .create(&anonymous, CreateSessionRequest::default())
        .expect("session should be created");

    assert!(uuid::Uuid::parse_str(&snapshot.id).is_ok());
    assert_eq!(store.len(), 1);
}

#[test]
fn create_rejects_duplicate_session() {
    let mut store = fixed_clock_store();
    store
        .create(&identity("session-1"), CreateSessionRequest::default())
        .expect("first create succeeds");

    let error = store
        .create(&identity("session-1"), CreateSessionRequest::default())
        .expect_err("duplicate must fail");

    assert!(matches!(error, SessionStoreError::AlreadyExists { .. }));
}

#[test]
fn create_with_zero_clock_fails_validation_and_stores_nothing() {
    let mut store = SessionStore::with_clock(|| OffsetDateTime::UNIX_EPOCH);

    let error = store
        .create(&identity("session-1"), CreateSessionRequest::default())
        .expect_err("epoch timestamp must fail validation");

    assert!(matches!(
        error,
        SessionStoreError::Snapshot(ValidationError::ZeroUpdatedAt)
    ));
    assert!(store.is_empty());
}

#[test]
fn apply_delta_sets_deletes_and_keeps_keys() {
    let mut store = fixed_clock_store();
    store
        .create(
            &identity("session-1"),
            CreateSessionRequest {
                state: state(json!({"keep": 1, "replace": "old", "drop": true})),
                events: Vec::new(),
            },
        )
        .expect("session should be created");

    let delta = normalize_state_delta(state(json!({
        "replace": "new",
        "drop": {"$adk_state_update": "delete"},
        "missing": {"$adk_state_update": "delete"},
        "added": null,
    })))
    .expect("delta should normalize");

    let snapshot = store
        .apply_delta(&identity("session-1"), delta)
        .expect("delta should apply");

    assert_eq!(
        snapshot.state().cloned().map(Value::Object),
        Some(json!({"keep": 1, "replace": "new", "added": null}))
    );
}

#[test]
fn patch_request_flows_into_store() {
    let mut store = fixed_clock_store();
    store
        .create(
            &identity("session-1"),
            create_request(json!({"state": {"draft": "x"}})),
        )
        .expect("session should be created");

    let request: PatchSessionStateDeltaRequest = serde_json::from_value(json!({
        "stateDelta": {"draft": {"$adk_state_update": "delete"}},
    }))
    .expect("request should decode");
    let delta = request
        .normalize(&Default::default())
        .expect("delta should normalize");

    let snapshot = store
        .apply_delta(&identity("session-1"), delta)
        .expect("delta should apply");
    assert_eq!(snapshot.state().map(StateMap::len), Some(0));
}

#[test]
fn operations_require_a_session_id() {
    let mut store = fixed_clock_store();
    let anonymous = SessionIdentity::new("weather", "user-1").expect("identity");

    let error = store
        .apply_delta(&anonymous, Default::default())
        .expect_err("missing session id must fail");

    assert!(matches!(error, SessionStoreError::MissingSessionId { .. }));
    assert_eq!(
        error.to_string(),
        "session_id is required to patch session state"
    );
}

#[test]
fn get_unknown_session_is_not_found() {
    let store = fixed_clock_store();

    let error = store
        .get(&identity("missing"))
        .expect_err("unknown session must fail");

    assert!(matches!(
        error,
        SessionStoreError::NotFound { ref session_id, .. } if session_id == "missing"
    ));
}

#[test]
fn append_event_preserves_order() {
    let mut store = fixed_clock_store();
    store
        .create(&identity("session-1"), CreateSessionRequest::default())
        .expect("session should be created");

    store
        .append_event(&identity("session-1"), Event::new(json!({"n": 1})))
        .expect("append");
    let snapshot = store
        .append_event(&identity("session-1"), Event::new(json!({"n": 2})))
        .expect("append");

    assert_eq!(
        snapshot.events(),
        &[Event::new(json!({"n": 1})), Event::new(json!({"n": 2}))]
    );
}

#[test]
fn list_and_delete_are_scoped_to_user() {
    let mut store = fixed_clock_store();
    for session_id in ["b", "a"] {
        store
            .create(&identity(session_id), CreateSessionRequest::default())
            .expect("session should be created");
    }
    let other_user = SessionIdentity::new("weather", "user-2")
        .expect("identity")
        .with_session_id("c");
    store
        .create(&other_user, CreateSessionRequest::default())
        .expect("session should be created");

    let ids = store
        .list("weather", "user-1")
        .expect("list")
        .into_iter()
        .map(|snapshot| snapshot.id)
        .collect::<Vec<_>>();
    assert_eq!(ids, vec!["a".to_string(), "b".to_string()]);

    store.delete(&identity("a")).expect("delete");
    assert!(matches!(
        store.delete(&identity("a")),
        Err(SessionStoreError::NotFound { .. })
    ));
    assert_eq!(store.len(), 2);
}

#[test]
fn failed_writes_leave_session_untouched() {
    let (mut store, seconds) = adjustable_clock_store();
    let before = store
        .create(
            &identity("session-1"),
            create_request(json!({"state": {"k": 1}, "events": [{"n": 1}]})),
        )
        .expect("session should be created");

    seconds.store(0, Ordering::SeqCst);
    let delta = normalize_state_delta(state(json!({"k": {"$adk_state_update": "delete"}})))
        .expect("delta should normalize");
    let error = store
        .apply_delta(&identity("session-1"), delta)
        .expect_err("epoch timestamp must fail validation");
    assert!(matches!(
        error,
        SessionStoreError::Snapshot(ValidationError::ZeroUpdatedAt)
    ));
    let error = store
        .append_event(&identity("session-1"), Event::new(json!({"n": 2})))
        .expect_err("epoch timestamp must fail validation");
    assert!(matches!(
        error,
        SessionStoreError::Snapshot(ValidationError::ZeroUpdatedAt)
    ));

    seconds.store(NOW + 60, Ordering::SeqCst);
    let after = store
        .get(&identity("session-1"))
        .expect("session should still be readable");
    assert_eq!(after, before);
    assert_eq!(after.updated_at, NOW);
}
