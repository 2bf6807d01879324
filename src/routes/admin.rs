//! Admin endpoints: status transitions (single and bulk), reviewer
//! assignment, cascading delete, payments and the CSV export.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;

use crate::db::{self, payments, reviews, submissions, users, SubmissionStatus};
use crate::error::Result;
use crate::export;
use crate::state::AppState;

pub async fn list_submissions(
    State(state): State<AppState>,
) -> Result<Json<Vec<db::Submission>>> {
    let rows = submissions::list_submissions(&state.pool).await?;
    Ok(Json(rows))
}

pub async fn stats(State(state): State<AppState>) -> Result<Json<submissions::SubmissionStats>> {
    let stats = submissions::submission_stats(&state.pool).await?;
    Ok(Json(stats))
}

#[derive(Deserialize)]
pub struct StatusPayload {
    pub status: SubmissionStatus,
}

/// Notify the owner of each changed submission. Best-effort: a lookup or
/// dispatch failure is logged and never fails the status change it reports.
async fn dispatch_notifications(state: &AppState, changed: &[db::Submission]) {
    for submission in changed {
        match users::get_user(&state.pool, submission.user_id).await {
            Ok(user) => {
                state
                    .notifier
                    .submission_status_changed(&user, submission, submission.status);
            }
            Err(e) => {
                tracing::warn!(
                    submission_id = submission.id,
                    "skipping status notification, owner lookup failed: {}",
                    e
                );
            }
        }
    }
}

pub async fn update_submission_status(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<StatusPayload>,
) -> Result<Json<serde_json::Value>> {
    let changed = submissions::update_status(&state.pool, id, payload.status).await?;

    if let Some(ref submission) = changed {
        dispatch_notifications(&state, std::slice::from_ref(submission)).await;
    }

    Ok(Json(serde_json::json!({
        "changed": changed.is_some(),
        "status": payload.status,
    })))
}

#[derive(Deserialize)]
pub struct BulkStatusPayload {
    pub submission_ids: Vec<i64>,
    pub status: SubmissionStatus,
}

pub async fn bulk_update_submission_status(
    State(state): State<AppState>,
    Json(payload): Json<BulkStatusPayload>,
) -> Result<Json<serde_json::Value>> {
    let changed =
        submissions::bulk_update_status(&state.pool, &payload.submission_ids, payload.status)
            .await?;

    dispatch_notifications(&state, &changed).await;

    Ok(Json(serde_json::json!({
        "requested": payload.submission_ids.len(),
        "changed": changed.len(),
        "status": payload.status,
    })))
}

#[derive(Deserialize)]
pub struct AssignReviewersPayload {
    pub reviewer_ids: Vec<i64>,
}

pub async fn assign_reviewers(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<AssignReviewersPayload>,
) -> Result<Json<serde_json::Value>> {
    let outcome = reviews::assign_reviewers(&state.pool, id, &payload.reviewer_ids).await?;

    let message = if outcome.newly_assigned > 0 {
        format!("{} reviewer(s) assigned successfully", outcome.newly_assigned)
    } else {
        "no new reviewers assigned (already assigned)".to_string()
    };

    Ok(Json(serde_json::json!({
        "newly_assigned": outcome.newly_assigned,
        "already_assigned": outcome.already_assigned,
        "message": message,
    })))
}

pub async fn remove_reviewer(
    State(state): State<AppState>,
    Path((submission_id, reviewer_id)): Path<(i64, i64)>,
) -> Result<StatusCode> {
    reviews::remove_reviewer(&state.pool, submission_id, reviewer_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete_submission(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode> {
    let artifacts = submissions::delete_submission(&state.pool, id).await?;

    // Storage cleanup after the cascade committed; deletion is idempotent.
    for reference in &artifacts {
        state.files.delete(reference);
    }

    Ok(StatusCode::NO_CONTENT)
}

pub async fn export_submissions(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let rows = export::export_rows(&state.pool).await?;
    let csv = export::to_csv(&rows);

    let filename = format!(
        "submissions_{}.csv",
        chrono::Utc::now().format("%Y-%m-%d_%H%M%S")
    );

    Ok((
        [
            ("Content-Type", "text/csv; charset=utf-8".to_string()),
            (
                "Content-Disposition",
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        csv,
    ))
}

pub async fn verify_payment(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<db::Payment>> {
    let payment = payments::verify(&state.pool, id).await?;
    Ok(Json(payment))
}

pub async fn reject_payment(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<db::Payment>> {
    let payment = payments::reject(&state.pool, id).await?;
    Ok(Json(payment))
}

pub async fn list_reviewers(State(state): State<AppState>) -> Result<Json<Vec<db::User>>> {
    let rows = users::list_reviewers(&state.pool).await?;
    Ok(Json(rows))
}
