//! End-to-end tests over the HTTP surface with mock Ledger/Notifier

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use chrono::Duration;
use serde_json::{json, Value};
use timeclerk_config::{Config, RawConfig};
use timeclerk_ledger::{FieldsBuilder, MockLedger};
use timeclerk_notify::MockNotifier;
use timeclerk_util::{now, MemberNumber, RecordId};
use timeclerkd::AppState;
use tower::ServiceExt;

const SWEEP_KEY: &str = "sweep-key-for-tests";

struct Harness {
    ledger: Arc<MockLedger>,
    notifier: Arc<MockNotifier>,
    state: Arc<AppState>,
    app: Router,
}

fn config() -> Config {
    let raw: RawConfig = toml::from_str(
        r#"
        config_version = 1

        [ledger]
        base_id = "appTEST"

        [ledger.tables]
        members = "Members"
        activities = "Activities"
        logs = "ShiftLogs"

        [notify]
        account_sid = "ACtest"
        from_number = "+15550001111"

        [behavior]
        clock_out_link_base = "https://example.org/api/clock-out"
        remind_after_minutes = 120
        token_expires_days = 7
        "#,
    )
    .unwrap();
    Config::from_raw(raw)
}

fn harness() -> Harness {
    let ledger = Arc::new(MockLedger::new(now()));
    let notifier = Arc::new(MockNotifier::new());
    let state = Arc::new(AppState::new(
        ledger.clone(),
        notifier.clone(),
        &config(),
        SWEEP_KEY,
    ));
    let app = timeclerkd::router(state.clone());
    Harness {
        ledger,
        notifier,
        state,
        app,
    }
}

fn seed_member(h: &Harness, num: i64, name: &str, membership: &str) -> RecordId {
    h.ledger.insert(
        "Members",
        FieldsBuilder::new()
            .num("Member #", num)
            .str("Full Name", name)
            .str("Membership Type", membership)
            .str("Phone Number", "555-123-4567")
            .build(),
    )
}

fn seed_shift_activity(h: &Harness, name: &str, minutes: Option<i64>) -> RecordId {
    let mut builder = FieldsBuilder::new()
        .str("Name", name)
        .str("Mode", "Shift")
        .bool("Active?", true);
    if let Some(m) = minutes {
        builder = builder.num("AutoCloseMinutes", m);
    }
    h.ledger.insert("Activities", builder.build())
}

async fn get(h: &Harness, uri: &str) -> (StatusCode, Value) {
    let response = h
        .app
        .clone()
        .oneshot(Request::get(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

async fn get_html(h: &Harness, uri: &str) -> (StatusCode, String) {
    let response = h
        .app
        .clone()
        .oneshot(Request::get(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
}

async fn post_json(h: &Harness, uri: &str, body: Value) -> (StatusCode, Value) {
    let request = Request::post(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    let response = h.app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

async fn post_empty(h: &Harness, uri: &str) -> (StatusCode, Value) {
    let response = h
        .app
        .clone()
        .oneshot(Request::post(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

#[tokio::test]
async fn health_is_ok() {
    let h = harness();
    let (status, body) = get(&h, "/api/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn activities_are_active_only_and_sorted() {
    let h = harness();
    seed_shift_activity(&h, "Trail Work", None);
    seed_shift_activity(&h, "Front Desk", None);
    h.ledger.insert(
        "Activities",
        FieldsBuilder::new()
            .str("Name", "Retired")
            .str("Mode", "Shift")
            .bool("Active?", false)
            .build(),
    );

    let (status, body) = get(&h, "/api/activities").await;
    assert_eq!(status, StatusCode::OK);
    let names: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|a| a["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Front Desk", "Trail Work"]);
}

#[tokio::test]
async fn member_lookup_gates_on_eligibility() {
    let h = harness();
    seed_member(&h, 42, "Pat Jones", "AM");
    seed_member(&h, 7, "Lapsed Member", "EXPIRED");

    let (status, body) = get(&h, "/api/member?number=42").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Pat Jones");

    let (ineligible, _) = get(&h, "/api/member?number=7").await;
    let (missing, _) = get(&h, "/api/member?number=9999").await;
    assert_eq!(ineligible, StatusCode::NOT_FOUND);
    assert_eq!(missing, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn malformed_member_number_never_reaches_the_ledger() {
    let h = harness();
    for bad in ["", "12345", "42a", "-1"] {
        let (status, _) = get(&h, &format!("/api/member?number={bad}")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "number {bad:?}");
    }
    assert_eq!(h.ledger.call_count(), 0);
}

#[tokio::test]
async fn member_search_returns_matches() {
    let h = harness();
    seed_member(&h, 42, "Pat Jones", "AM");
    seed_member(&h, 43, "Pat Smith", "LM");
    seed_member(&h, 44, "Alex Chen", "AM");

    let (status, body) = get(&h, "/api/member-search?name=pat").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn attendance_check_in_round_trip() {
    let h = harness();
    seed_member(&h, 42, "Pat Jones", "AM");
    let activity = h.ledger.insert(
        "Activities",
        FieldsBuilder::new()
            .str("Name", "Monthly Meeting")
            .str("Mode", "Attendance")
            .bool("Active?", true)
            .num("AutoCloseMinutes", 45)
            .build(),
    );

    let (status, body) = post_json(
        &h,
        "/api/check-in",
        json!({ "member_number": "42", "activity_id": activity.as_str() }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "attendance_recorded");
    assert_eq!(body["minutes_credited"], 45);
}

#[tokio::test]
async fn repeat_shift_check_in_reports_already_open() {
    let h = harness();
    seed_member(&h, 42, "Pat Jones", "AM");
    let activity = seed_shift_activity(&h, "Trail Work", Some(240));
    let request = json!({ "member_number": "42", "activity_id": activity.as_str() });

    let (status, first) = post_json(&h, "/api/check-in", request.clone()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["status"], "shift_started");

    let (status, second) = post_json(&h, "/api/check-in", request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(second["status"], "already_open");
    assert_eq!(second["log_id"], first["log_id"]);
    assert_eq!(h.ledger.records("ShiftLogs").len(), 1);
}

#[tokio::test]
async fn check_in_cross_checks_member_id() {
    let h = harness();
    let member_id = seed_member(&h, 42, "Pat Jones", "AM");
    let activity = seed_shift_activity(&h, "Trail Work", None);

    let (status, body) = post_json(
        &h,
        "/api/check-in",
        json!({
            "member_id": member_id.as_str(),
            "member_number": "42",
            "activity_id": activity.as_str(),
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "shift_started");

    let (status, _) = post_json(
        &h,
        "/api/check-in",
        json!({
            "member_id": "recSOMEONEELSE",
            "member_number": "42",
            "activity_id": activity.as_str(),
        }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn check_in_with_unknown_activity_is_404() {
    let h = harness();
    seed_member(&h, 42, "Pat Jones", "AM");
    let (status, _) = post_json(
        &h,
        "/api/check-in",
        json!({ "member_number": "42", "activity_id": "recMISSING" }),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn misconfigured_activity_is_400() {
    let h = harness();
    seed_member(&h, 42, "Pat Jones", "AM");
    let no_mode = h.ledger.insert(
        "Activities",
        FieldsBuilder::new()
            .str("Name", "Mystery")
            .bool("Active?", true)
            .build(),
    );

    let (status, _) = post_json(
        &h,
        "/api/check-in",
        json!({ "member_number": "42", "activity_id": no_mode.as_str() }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn sign_out_round_trip() {
    let h = harness();
    seed_member(&h, 42, "Pat Jones", "AM");
    let activity = seed_shift_activity(&h, "Trail Work", None);
    post_json(
        &h,
        "/api/check-in",
        json!({ "member_number": "42", "activity_id": activity.as_str() }),
    )
    .await;

    let (status, body) = post_json(&h, "/api/sign-out", json!({ "member_number": "42" })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "signed_out");

    let (status, body) = post_json(&h, "/api/sign-out", json!({ "member_number": "42" })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "no_open_shift");
}

#[tokio::test]
async fn clock_out_link_is_one_shot_and_always_200() {
    let h = harness();
    seed_member(&h, 42, "Pat Jones", "AM");
    let activity = seed_shift_activity(&h, "Trail Work", None);
    post_json(
        &h,
        "/api/check-in",
        json!({ "member_number": "42", "activity_id": activity.as_str() }),
    )
    .await;
    let record = &h.ledger.records("ShiftLogs")[0];
    let token = record.str_field("ClockOutToken").unwrap().to_string();

    let (status, page) = get_html(&h, &format!("/api/clock-out?token={token}")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(page.contains("clocked out"));

    let (status, page) = get_html(&h, &format!("/api/clock-out?token={token}")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(page.contains("invalid, expired, or already used"));

    let (status, bogus) = get_html(&h, "/api/clock-out?token=bogus").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(bogus, page);
}

#[tokio::test]
async fn sweep_endpoints_require_the_key() {
    let h = harness();
    let (missing, _) = post_empty(&h, "/api/sweep/auto-close").await;
    let (wrong, _) = post_empty(&h, "/api/sweep/remind?key=wrong").await;
    assert_eq!(missing, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong, StatusCode::UNAUTHORIZED);
    assert_eq!(h.ledger.call_count(), 0);
}

#[tokio::test]
async fn auto_close_sweep_reports_counters() {
    let h = harness();
    let start = now() - Duration::minutes(300);
    h.ledger.insert(
        "ShiftLogs",
        FieldsBuilder::new()
            .num("MemNum", 42)
            .time("StartTime", start)
            .num("AutoCloseMaxMinutes", 240)
            .build(),
    );
    h.ledger.insert(
        "ShiftLogs",
        FieldsBuilder::new()
            .num("MemNum", 43)
            .time("StartTime", now() - Duration::minutes(10))
            .num("AutoCloseMaxMinutes", 240)
            .build(),
    );

    let (status, body) =
        post_empty(&h, &format!("/api/sweep/auto-close?key={SWEEP_KEY}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["checked"], 2);
    assert_eq!(body["auto_closed"], 1);
    assert_eq!(body["skipped_not_due_yet"], 1);
}

#[tokio::test]
async fn reminder_sweep_fires_once() {
    let h = harness();
    seed_member(&h, 42, "Pat Jones", "AM");
    h.ledger.insert(
        "ShiftLogs",
        FieldsBuilder::new()
            .num("MemNum", 42)
            .time("StartTime", now() - Duration::minutes(180))
            .str("ClockOutToken", "cafef00d")
            .build(),
    );

    let uri = format!("/api/sweep/remind?key={SWEEP_KEY}");
    let (status, body) = post_empty(&h, &uri).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["sent"], 1);
    assert_eq!(h.notifier.sent_count(), 1);
    assert!(h.notifier.sent()[0]
        .body
        .contains("https://example.org/api/clock-out?token=cafef00d"));

    let (_, again) = post_empty(&h, &uri).await;
    assert_eq!(again["sent"], 0);
    assert_eq!(h.notifier.sent_count(), 1);
}

#[tokio::test]
async fn concurrent_check_ins_open_at_most_one_shift() {
    let h = harness();
    seed_member(&h, 42, "Pat Jones", "AM");
    let activity = seed_shift_activity(&h, "Trail Work", None);

    let mut handles = Vec::new();
    for _ in 0..8 {
        let state = h.state.clone();
        let activity = activity.clone();
        handles.push(tokio::spawn(async move {
            let number = MemberNumber::parse("42").unwrap();
            state.engine.check_in(None, &number, &activity).await
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let open: Vec<_> = h
        .ledger
        .records("ShiftLogs")
        .into_iter()
        .filter(|r| r.is_empty_field("EndTime"))
        .collect();
    assert_eq!(open.len(), 1);
}
