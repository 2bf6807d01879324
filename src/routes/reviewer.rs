//! Reviewer endpoints: assignment listing and score submission.

use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;

use crate::db::{self, reviews};
use crate::error::Result;
use crate::state::AppState;

pub async fn list_assignments(
    State(state): State<AppState>,
    Path(reviewer_id): Path<i64>,
) -> Result<Json<Vec<db::Review>>> {
    let rows = reviews::list_for_reviewer(&state.pool, reviewer_id).await?;
    Ok(Json(rows))
}

#[derive(Deserialize)]
pub struct SubmitReviewPayload {
    pub reviewer_id: i64,
    #[serde(flatten)]
    pub scores: reviews::ReviewScores,
    pub comments: String,
}

/// Record the five scores and comments on the reviewer's own review row.
/// Re-submission overwrites the previous scores.
pub async fn submit_review(
    State(state): State<AppState>,
    Path(review_id): Path<i64>,
    Json(payload): Json<SubmitReviewPayload>,
) -> Result<Json<db::Review>> {
    let review = reviews::submit_review(
        &state.pool,
        review_id,
        payload.reviewer_id,
        payload.scores,
        &payload.comments,
    )
    .await?;

    tracing::info!(
        review_id = review.id,
        submission_id = review.submission_id,
        reviewer_id = review.reviewer_id,
        "review scores recorded"
    );

    Ok(Json(review))
}
