//! Integration tests for the HTTP record API.
//!
//! Each test starts an in-process axum server that mimics the admin API.

use axum::{
    extract::{Path, State},
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    routing::{get, put},
    Json, Router,
};
use roster_client::{HttpRecordApi, RecordApi, Session, SessionState, ViewDriver};
use roster_engine::{presets, FetchOutcome, SubmitOutcome, ViewError};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};

const TOKEN: &str = "test-token";

#[derive(Clone, Default)]
struct MockState {
    users: Arc<Mutex<Vec<Value>>>,
    requests: Arc<Mutex<Vec<String>>>,
}

impl MockState {
    fn log(&self, line: String) {
        self.requests.lock().unwrap().push(line);
    }
}

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == format!("Bearer {TOKEN}"))
}

async fn list_users(State(state): State<MockState>, headers: HeaderMap) -> (StatusCode, Json<Value>) {
    state.log("GET /users".into());
    if !authorized(&headers) {
        return (StatusCode::UNAUTHORIZED, Json(json!({"message": "token expired"})));
    }
    let users = state.users.lock().unwrap().clone();
    (StatusCode::OK, Json(json!({"data": {"users": users}})))
}

async fn create_user(
    State(state): State<MockState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    state.log("POST /users".into());
    if !authorized(&headers) {
        return (StatusCode::UNAUTHORIZED, Json(json!({})));
    }
    if body["email"] == "taken@example.com" {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({"message": "Validation failed", "errors": {"email": ["is already taken"]}})),
        );
    }
    let mut user = body;
    user["_id"] = json!("u-new");
    user["createdAt"] = json!("2030-01-01T00:00:00Z");
    if let Some(fields) = user.as_object_mut() {
        fields.remove("password");
    }
    state.users.lock().unwrap().push(user.clone());
    (StatusCode::CREATED, Json(json!({"data": {"user": user}})))
}

async fn update_user(
    State(state): State<MockState>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    state.log(format!("PUT /users/{id}"));
    if !authorized(&headers) {
        return (StatusCode::UNAUTHORIZED, Json(json!({})));
    }
    (StatusCode::OK, Json(json!({"message": "updated", "fields": body})))
}

async fn spawn_server(state: MockState) -> String {
    let app = Router::new()
        .route("/api/users", get(list_users).post(create_user))
        .route("/api/users/{id}", put(update_user))
        .with_state(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}/api")
}

fn seeded() -> MockState {
    let state = MockState::default();
    *state.users.lock().unwrap() = vec![
        json!({"_id": "u1", "name": "Alice", "email": "alice@example.com", "role": "user", "status": "active", "createdAt": 1_700_000_000_000i64}),
        json!({"_id": "u2", "name": "Bob", "email": "bob@example.com", "role": "admin", "status": "inactive", "createdAt": 1_700_000_100_000i64}),
    ];
    state
}

fn api(base: &str, session: Session) -> HttpRecordApi {
    HttpRecordApi::with_client(reqwest::Client::new(), base, &presets::users(), session).unwrap()
}

#[tokio::test]
async fn fetch_normalizes_envelope() {
    let base = spawn_server(seeded()).await;
    let api = api(&base, Session::new(Some(TOKEN.into())));

    let records = api.fetch_all().await.unwrap();

    let ids: Vec<_> = records.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["u1", "u2"]);
    assert_eq!(records[1].created_at, Some(1_700_000_100_000));
    assert!(records[0].get("_id").is_none());
}

#[tokio::test]
async fn unauthorized_evicts_session() {
    let base = spawn_server(seeded()).await;
    let session = Session::new(Some("stale".into()));
    let mut signed_out = session.subscribe();
    let driver = ViewDriver::new(presets::users(), Arc::new(api(&base, session.clone()))).unwrap();

    let outcome = driver.refresh().await.unwrap();

    assert!(matches!(outcome, FetchOutcome::Failed(ViewError::Auth { .. })));
    assert!(!session.is_signed_in());
    assert!(signed_out.has_changed().unwrap());
    assert_eq!(*signed_out.borrow_and_update(), SessionState::SignedOut);
}

#[tokio::test]
async fn create_round_trip_places_record_first() {
    let state = seeded();
    let base = spawn_server(state.clone()).await;
    let driver = ViewDriver::new(
        presets::users(),
        Arc::new(api(&base, Session::new(Some(TOKEN.into())))),
    )
    .unwrap();
    driver.refresh().await.unwrap();

    driver.enter_add().await.unwrap();
    for (field, value) in [
        ("name", json!("Cara")),
        ("email", json!("cara@example.com")),
        ("password", json!("Str0ngPass")),
    ] {
        driver.set_draft_field(field, value).await.unwrap();
    }
    let outcome = driver.submit_current().await.unwrap();

    assert!(matches!(outcome, SubmitOutcome::Saved { .. }));
    let snapshot = driver.snapshot().await;
    assert_eq!(snapshot.record_ids()[0], "u-new");
    assert_eq!(snapshot.total_records, 3);
    assert!(snapshot.view_mode.is_list());
}

#[tokio::test]
async fn server_rejection_keeps_draft() {
    let state = seeded();
    let base = spawn_server(state.clone()).await;
    let driver = ViewDriver::new(
        presets::users(),
        Arc::new(api(&base, Session::new(Some(TOKEN.into())))),
    )
    .unwrap();
    driver.refresh().await.unwrap();

    driver.enter_add().await.unwrap();
    for (field, value) in [
        ("name", json!("Dup")),
        ("email", json!("taken@example.com")),
        ("password", json!("Str0ngPass")),
    ] {
        driver.set_draft_field(field, value).await.unwrap();
    }
    let outcome = driver.submit_current().await.unwrap();

    let SubmitOutcome::Failed(ViewError::Mutation { message, field_errors }) = outcome else {
        panic!("expected a mutation error");
    };
    assert_eq!(message, "Validation failed");
    assert_eq!(field_errors[0].field, "email");

    let snapshot = driver.snapshot().await;
    assert_eq!(snapshot.total_records, 2);
    assert!(!snapshot.view_mode.is_list());
    assert_eq!(
        snapshot.form_draft.and_then(|d| d.get("name").cloned()),
        Some(json!("Dup"))
    );
}

#[tokio::test]
async fn update_without_record_in_response_uses_payload() {
    let state = seeded();
    let base = spawn_server(state.clone()).await;
    let driver = ViewDriver::new(
        presets::users(),
        Arc::new(api(&base, Session::new(Some(TOKEN.into())))),
    )
    .unwrap();
    driver.refresh().await.unwrap();
    driver.set_bucket("active").await.unwrap();

    driver.enter_edit("u1").await.unwrap();
    driver
        .set_draft_field("status", json!("inactive"))
        .await
        .unwrap();
    let outcome = driver.submit_current().await.unwrap();

    assert!(matches!(outcome, SubmitOutcome::Saved { visible: false, .. }));
    assert!(driver.snapshot().await.page_items.iter().all(|row| row.is_placeholder()));
    assert!(state
        .requests
        .lock()
        .unwrap()
        .contains(&"PUT /users/u1".to_string()));
}

#[tokio::test]
async fn invalid_draft_sends_nothing() {
    let state = seeded();
    let base = spawn_server(state.clone()).await;
    let driver = ViewDriver::new(
        presets::users(),
        Arc::new(api(&base, Session::new(Some(TOKEN.into())))),
    )
    .unwrap();
    driver.refresh().await.unwrap();

    driver.enter_add().await.unwrap();
    driver
        .set_draft_field("email", json!("not-an-email"))
        .await
        .unwrap();
    let outcome = driver.submit_current().await.unwrap();

    assert!(matches!(outcome, SubmitOutcome::Failed(ViewError::Validation { .. })));
    let requests = state.requests.lock().unwrap().clone();
    assert_eq!(requests, vec!["GET /users".to_string()]);
}
