//! HTTP routes for the kiosk and sweep callers

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::response::Html;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use timeclerk_core::{
    Activity, AutoCloseReport, CheckInOutcome, Member, ReminderReport, SignOutOutcome,
    TokenCloseOutcome,
};
use timeclerk_util::{MemberNumber, RecordId, TimeclerkError};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::error::ApiError;
use crate::state::AppState;

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/activities", get(list_activities))
        .route("/api/member", get(member_by_number))
        .route("/api/member-search", get(member_search))
        .route("/api/check-in", post(check_in))
        .route("/api/sign-out", post(sign_out))
        .route("/api/clock-out", get(clock_out))
        .route("/api/sweep/auto-close", post(sweep_auto_close))
        .route("/api/sweep/remind", post(sweep_remind))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

async fn list_activities(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Activity>>, ApiError> {
    let activities = state.engine.catalog().list_active().await?;
    Ok(Json(activities))
}

#[derive(Deserialize)]
struct MemberQuery {
    number: String,
}

async fn member_by_number(
    State(state): State<Arc<AppState>>,
    Query(query): Query<MemberQuery>,
) -> Result<Json<Member>, ApiError> {
    let number = MemberNumber::parse(&query.number)?;
    let member = state.engine.directory().resolve_eligible(&number).await?;
    Ok(Json(member))
}

#[derive(Deserialize)]
struct SearchQuery {
    name: String,
}

async fn member_search(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<Member>>, ApiError> {
    let members = state.engine.directory().search(&query.name).await?;
    Ok(Json(members))
}

#[derive(Deserialize)]
struct CheckInRequest {
    /// Record id from the kiosk's member lookup; cross-checked
    /// against the number when present.
    #[serde(default)]
    member_id: Option<String>,
    member_number: String,
    activity_id: String,
}

async fn check_in(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CheckInRequest>,
) -> Result<Json<CheckInOutcome>, ApiError> {
    let number = MemberNumber::parse(&request.member_number)?;
    let member_id = request.member_id.map(RecordId::new);
    let activity_id = RecordId::new(request.activity_id);
    let outcome = state
        .engine
        .check_in(member_id.as_ref(), &number, &activity_id)
        .await?;
    Ok(Json(outcome))
}

#[derive(Deserialize)]
struct SignOutRequest {
    member_number: String,
}

async fn sign_out(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SignOutRequest>,
) -> Result<Json<SignOutOutcome>, ApiError> {
    let number = MemberNumber::parse(&request.member_number)?;
    let outcome = state.engine.close_by_member_number(&number).await?;
    Ok(Json(outcome))
}

#[derive(Deserialize)]
struct ClockOutQuery {
    #[serde(default)]
    token: String,
}

/// Clock-out landing page for reminder links.
///
/// Always 200: a successful close confirms, and every failure mode
/// (unknown, expired, already used) renders the same generic page so
/// the link leaks nothing about log state.
async fn clock_out(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ClockOutQuery>,
) -> Result<Html<&'static str>, ApiError> {
    let outcome = state.engine.close_by_token(&query.token).await?;
    let page = match outcome {
        TokenCloseOutcome::ClockedOut { .. } => CLOCK_OUT_OK_PAGE,
        TokenCloseOutcome::InvalidOrExpired => CLOCK_OUT_FAIL_PAGE,
    };
    Ok(Html(page))
}

const CLOCK_OUT_OK_PAGE: &str = "<!doctype html>\
<html><head><title>Clocked out</title></head>\
<body><h1>You're clocked out</h1>\
<p>Thanks for volunteering! Your shift has been recorded.</p>\
</body></html>";

const CLOCK_OUT_FAIL_PAGE: &str = "<!doctype html>\
<html><head><title>Clock out</title></head>\
<body><h1>Link invalid, expired, or already used</h1>\
<p>If your shift is still open, please sign out at the kiosk.</p>\
</body></html>";

#[derive(Deserialize)]
struct SweepQuery {
    #[serde(default)]
    key: String,
}

fn check_sweep_key(state: &AppState, query: &SweepQuery) -> Result<(), ApiError> {
    if query.key.is_empty() || query.key != state.sweep_key {
        return Err(ApiError(TimeclerkError::Unauthorized));
    }
    Ok(())
}

async fn sweep_auto_close(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SweepQuery>,
) -> Result<Json<AutoCloseReport>, ApiError> {
    check_sweep_key(&state, &query)?;
    let report = state.engine.sweep_auto_close().await?;
    Ok(Json(report))
}

async fn sweep_remind(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SweepQuery>,
) -> Result<Json<ReminderReport>, ApiError> {
    check_sweep_key(&state, &query)?;
    let report = state.engine.sweep_reminders().await?;
    Ok(Json(report))
}
