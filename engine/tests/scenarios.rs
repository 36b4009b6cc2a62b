//! End-to-end walk-throughs of a management screen
//!
//! Each test drives a `ListView` through the same commands a dashboard would
//! issue and checks the rendered snapshot.

use roster_engine::{
    normalize_collection, presets, FieldError, ListView, Mutation, Record, Submission,
    SubmitOutcome, ViewError, ViewMode,
};
use serde_json::json;

/// `n` users; index 0 is the newest. Even indices are active.
fn users(n: usize) -> Vec<Record> {
    (0..n)
        .map(|i| {
            Record::from_json(
                format!("u{}", i + 1),
                json!({
                    "name": format!("User {}", i + 1),
                    "email": format!("user{}@example.com", i + 1),
                    "role": "user",
                    "status": if i % 2 == 0 { "active" } else { "inactive" },
                }),
            )
            .with_created_at(1_000_000 - i as i64)
        })
        .collect()
}

fn users_view(records: Vec<Record>, page_size: usize) -> ListView {
    let mut view = ListView::new(presets::users().with_page_size(page_size)).unwrap();
    let ticket = view.begin_fetch().unwrap();
    view.complete_fetch(ticket, Ok(records));
    view
}

// ============================================================================
// Pagination
// ============================================================================

#[test]
fn twelve_records_page_size_five() {
    let records = users(12);
    let mut view = users_view(records.clone(), 5);

    let snapshot = view.snapshot();
    assert_eq!(snapshot.total_pages, 3);
    assert_eq!(snapshot.clamped_page, 1);

    view.go_to_page(2);
    let expected: Vec<&str> = records[5..10].iter().map(|r| r.id.as_str()).collect();
    assert_eq!(view.snapshot().record_ids(), expected);
}

#[test]
fn goto_page_out_of_range_clamps() {
    let mut view = users_view(users(12), 5);
    let total = view.total_pages();

    assert_eq!(view.go_to_page(total + 5), total);
    assert_eq!(view.snapshot().clamped_page, total);
    assert_eq!(view.go_to_page(0), 1);
}

#[test]
fn padded_last_page_has_placeholders() {
    let mut view = users_view(users(12), 5);
    view.go_to_page(3);
    let snapshot = view.snapshot();

    assert_eq!(snapshot.page_items.len(), 5);
    assert_eq!(snapshot.record_ids().len(), 2);
    assert_eq!(snapshot.page_items.iter().filter(|r| r.is_placeholder()).count(), 3);
}

// ============================================================================
// Search
// ============================================================================

#[test]
fn typing_quickly_recomputes_once() {
    let mut view = users_view(
        vec![
            Record::from_json("a", json!({"name": "Alice", "status": "active"})).with_created_at(3),
            Record::from_json("b", json!({"name": "Bob", "status": "active"})).with_created_at(2),
            Record::from_json("c", json!({"name": "Malik", "status": "active"})).with_created_at(1),
        ],
        10,
    );
    let before = view.recomputations();

    view.set_search_term("a", 0).unwrap();
    assert!(!view.poll_search(300));
    view.set_search_term("al", 300).unwrap();
    assert!(!view.poll_search(600));
    view.set_search_term("ali", 600).unwrap();
    assert!(view.snapshot().is_filtering);
    assert!(view.poll_search(1_100));

    assert_eq!(view.recomputations() - before, 1);
    let snapshot = view.snapshot();
    assert!(!snapshot.is_filtering);
    assert_eq!(snapshot.record_ids(), vec!["a", "c"]);
}

#[test]
fn search_resets_page_once_applied() {
    let mut view = users_view(users(30), 5);
    view.go_to_page(4);

    view.set_search_term("user", 0).unwrap();
    assert_eq!(view.current_page(), 4);

    view.flush_search();
    assert_eq!(view.current_page(), 1);
}

// ============================================================================
// Mutations
// ============================================================================

fn send(view: &mut ListView, draft: roster_engine::FormDraft) -> roster_engine::PendingSubmit {
    match view.submit(draft).unwrap() {
        Submission::Send(pending) => pending,
        Submission::Invalid(errors) => panic!("unexpected validation errors: {errors:?}"),
    }
}

#[test]
fn create_outside_filter_keeps_page() {
    let mut view = users_view(users(6), 5);
    view.set_bucket("active").unwrap();
    let before = view.snapshot();

    view.enter_add().unwrap();
    let draft = view
        .draft()
        .cloned()
        .unwrap()
        .with("name", "Ivy")
        .with("email", "ivy@example.com")
        .with("password", "Sup3rSecret")
        .with("status", "inactive");
    let pending = send(&mut view, draft);

    let created = Record::from_json(
        "u99",
        json!({"name": "Ivy", "email": "ivy@example.com", "status": "inactive"}),
    )
    .with_created_at(2_000_000);
    let outcome = view.complete_submit(pending.ticket, Ok(created));
    assert!(matches!(outcome, SubmitOutcome::Saved { visible: false, .. }));

    let after = view.snapshot();
    assert_eq!(after.page_items, before.page_items);
    assert_eq!(after.total_records, before.total_records + 1);
    assert_eq!(after.view_mode, ViewMode::List);
}

#[test]
fn update_out_of_active_bucket_on_page_two() {
    // Active users are u1, u3, ..., u11; u11 sits on page 2.
    let mut view = users_view(users(12), 5);
    view.set_bucket("active").unwrap();
    view.go_to_page(2);
    assert_eq!(view.snapshot().record_ids(), vec!["u11"]);

    view.enter_edit("u11").unwrap();
    let draft = view.draft().cloned().unwrap().with("status", "inactive");
    let pending = send(&mut view, draft);
    view.complete_submit(
        pending.ticket,
        Ok(Record::from_json("u11", json!({"status": "inactive"}))),
    );

    let snapshot = view.snapshot();
    assert!(!snapshot.record_ids().contains(&"u11"));
    assert_eq!(snapshot.total_pages, 1);
    assert_eq!(snapshot.clamped_page, 1);
}

#[test]
fn rejected_create_changes_nothing_but_error() {
    let mut view = users_view(users(4), 5);
    view.enter_add().unwrap();
    let draft = view
        .draft()
        .cloned()
        .unwrap()
        .with("name", "Dup")
        .with("email", "user1@example.com")
        .with("password", "Passw0rd1");
    let pending = send(&mut view, draft.clone());
    let ids_before = view.store().iter().map(|r| r.id.clone()).collect::<Vec<_>>();

    let rejection = ViewError::Mutation {
        message: "email already taken".into(),
        field_errors: vec![FieldError::new("email", "already taken")],
    };
    view.complete_submit(pending.ticket, Err(rejection.clone()));

    let ids_after = view.store().iter().map(|r| r.id.clone()).collect::<Vec<_>>();
    assert_eq!(ids_before, ids_after);
    assert_eq!(view.mode(), &ViewMode::Add);
    assert_eq!(view.draft(), Some(&draft));
    assert_eq!(view.snapshot().last_error, Some(rejection));
}

#[test]
fn edit_submits_update_without_blank_password() {
    let mut view = users_view(users(2), 5);
    view.enter_edit("u2").unwrap();
    let draft = view.draft().cloned().unwrap().with("name", "Renamed");
    let pending = send(&mut view, draft);

    let Mutation::Update { id, payload } = pending.mutation else {
        panic!("expected an update");
    };
    assert_eq!(id, "u2");
    assert_eq!(payload.get("name"), Some(&json!("Renamed")));
    assert!(!payload.contains_key("password"));
}

// ============================================================================
// Ingestion
// ============================================================================

#[test]
fn fetched_envelope_feeds_the_view() {
    let config = presets::users();
    let response = json!({
        "data": {
            "users": [
                {"_id": "u1", "name": "Alice", "status": "active", "createdAt": "2024-01-01T00:00:00Z"},
                {"_id": "u2", "name": "Bob", "status": "active", "createdAt": "2024-02-01T00:00:00Z"},
            ]
        }
    });
    let records = normalize_collection(response, &config.envelope).unwrap();

    let mut view = ListView::new(config).unwrap();
    let ticket = view.begin_fetch().unwrap();
    view.complete_fetch(ticket, Ok(records));

    assert_eq!(view.snapshot().record_ids(), vec!["u2", "u1"]);
}
