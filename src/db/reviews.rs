//! Reviewer assignment and scoring.
//!
//! A reviewer assignment is a `reviews` row with all five scores NULL until
//! the reviewer submits. Invariants enforced here:
//!
//! - at most [`MAX_REVIEWERS`] assignments per submission, checked under a
//!   row lock on the submission so concurrent assignment batches cannot
//!   overshoot the cap
//! - at most one row per (submission, reviewer); duplicates in an
//!   assignment batch are skipped silently, never re-inserted
//! - an assignment with submitted scores cannot be removed
//!
//! Aggregate scores are never stored: they are recomputed from the review
//! rows on every read so a rescoring is reflected immediately.

use sqlx::PgPool;

use super::models::Review;
use crate::error::{Error, Result};

/// Cap on reviewer assignments per submission.
pub const MAX_REVIEWERS: usize = 5;

/// Scores a reviewer submits, all required and in [1,5].
#[derive(Debug, Clone, Copy, serde::Deserialize)]
pub struct ReviewScores {
    pub originality_score: i16,
    pub relevance_score: i16,
    pub clarity_score: i16,
    pub methodology_score: i16,
    pub overall_score: i16,
}

impl ReviewScores {
    pub fn validate(&self) -> Result<()> {
        for (field, value) in [
            ("originality_score", self.originality_score),
            ("relevance_score", self.relevance_score),
            ("clarity_score", self.clarity_score),
            ("methodology_score", self.methodology_score),
            ("overall_score", self.overall_score),
        ] {
            if !(1..=5).contains(&value) {
                return Err(Error::validation(
                    field,
                    format!("must be between 1 and 5 (got {})", value),
                ));
            }
        }
        Ok(())
    }
}

/// Outcome of an assignment batch. `newly_assigned == 0` is informational
/// (everything in the batch was already assigned), not an error.
#[derive(Debug, serde::Serialize)]
pub struct AssignmentOutcome {
    pub newly_assigned: usize,
    pub already_assigned: usize,
}

/// Assign a batch of reviewers to a submission.
///
/// The whole batch runs in one transaction holding a row lock on the
/// submission: either every genuinely new reviewer gets an assignment, or
/// (when the cap would be exceeded or an id is unknown) none do.
pub async fn assign_reviewers(
    pool: &PgPool,
    submission_id: i64,
    reviewer_ids: &[i64],
) -> Result<AssignmentOutcome> {
    if reviewer_ids.is_empty() || reviewer_ids.len() > MAX_REVIEWERS {
        return Err(Error::validation(
            "reviewer_ids",
            format!("must contain between 1 and {} reviewers", MAX_REVIEWERS),
        ));
    }

    let mut tx = pool.begin().await?;

    // Lock the submission so concurrent batches serialize on the cap check.
    let locked: Option<i64> =
        sqlx::query_scalar("SELECT id FROM submissions WHERE id = $1 FOR UPDATE")
            .bind(submission_id)
            .fetch_optional(&mut *tx)
            .await?;
    if locked.is_none() {
        return Err(Error::NotFound("submission"));
    }

    let existing: Vec<i64> =
        sqlx::query_scalar("SELECT reviewer_id FROM reviews WHERE submission_id = $1")
            .bind(submission_id)
            .fetch_all(&mut *tx)
            .await?;

    let mut new_ids: Vec<i64> = Vec::new();
    for &id in reviewer_ids {
        if !existing.contains(&id) && !new_ids.contains(&id) {
            new_ids.push(id);
        }
    }

    // Already-assigned ids are known users; only the new ones need checking.
    let known: Vec<i64> = sqlx::query_scalar("SELECT id FROM users WHERE id = ANY($1)")
        .bind(&new_ids)
        .fetch_all(&mut *tx)
        .await?;
    if new_ids.iter().any(|id| !known.contains(id)) {
        return Err(Error::NotFound("reviewer"));
    }

    if existing.len() + new_ids.len() > MAX_REVIEWERS {
        return Err(Error::Conflict(format!(
            "maximum {} reviewers per submission; currently assigned: {}",
            MAX_REVIEWERS,
            existing.len()
        )));
    }

    for reviewer_id in &new_ids {
        sqlx::query(
            "INSERT INTO reviews (submission_id, reviewer_id) VALUES ($1, $2)",
        )
        .bind(submission_id)
        .bind(reviewer_id)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;

    Ok(AssignmentOutcome {
        newly_assigned: new_ids.len(),
        already_assigned: reviewer_ids.len() - new_ids.len(),
    })
}

/// Remove a reviewer assignment. Refused once the reviewer has started
/// scoring (originality or overall score present). The guard and the
/// delete share a row lock so a score landing in between cannot slip a
/// scored review past the check.
pub async fn remove_reviewer(pool: &PgPool, submission_id: i64, reviewer_id: i64) -> Result<()> {
    let mut tx = pool.begin().await?;

    let review = sqlx::query_as::<_, Review>(
        "SELECT * FROM reviews WHERE submission_id = $1 AND reviewer_id = $2 FOR UPDATE",
    )
    .bind(submission_id)
    .bind(reviewer_id)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or(Error::NotFound("reviewer assignment"))?;

    if review.originality_score.is_some() || review.overall_score.is_some() {
        return Err(Error::Conflict(
            "cannot remove a reviewer who has already submitted a review".to_string(),
        ));
    }

    sqlx::query("DELETE FROM reviews WHERE id = $1")
        .bind(review.id)
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;

    Ok(())
}

/// Record a reviewer's scores on their own review row. Matching on both the
/// review id and the reviewer id means another reviewer (or an author)
/// cannot write to it. Re-submission overwrites; there is no scoring lock.
pub async fn submit_review(
    pool: &PgPool,
    review_id: i64,
    reviewer_id: i64,
    scores: ReviewScores,
    comments: &str,
) -> Result<Review> {
    scores.validate()?;
    if comments.trim().is_empty() {
        return Err(Error::validation("comments", "is required"));
    }

    let review = sqlx::query_as::<_, Review>(
        r#"
        UPDATE reviews SET
            originality_score = $3, relevance_score = $4, clarity_score = $5,
            methodology_score = $6, overall_score = $7, comments = $8,
            updated_at = NOW()
        WHERE id = $1 AND reviewer_id = $2
        RETURNING *
        "#,
    )
    .bind(review_id)
    .bind(reviewer_id)
    .bind(scores.originality_score)
    .bind(scores.relevance_score)
    .bind(scores.clarity_score)
    .bind(scores.methodology_score)
    .bind(scores.overall_score)
    .bind(comments)
    .fetch_optional(pool)
    .await?
    .ok_or(Error::NotFound("review"))?;

    Ok(review)
}

pub async fn list_for_submission(pool: &PgPool, submission_id: i64) -> Result<Vec<Review>> {
    let rows = sqlx::query_as::<_, Review>(
        "SELECT * FROM reviews WHERE submission_id = $1 ORDER BY id",
    )
    .bind(submission_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn list_for_reviewer(pool: &PgPool, reviewer_id: i64) -> Result<Vec<Review>> {
    let rows = sqlx::query_as::<_, Review>(
        "SELECT * FROM reviews WHERE reviewer_id = $1 ORDER BY id DESC",
    )
    .bind(reviewer_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Mean of one review's five scores, or `None` while unscored.
pub fn review_average(review: &Review) -> Option<f64> {
    let scores = [
        review.originality_score?,
        review.relevance_score?,
        review.clarity_score?,
        review.methodology_score?,
        review.overall_score?,
    ];
    let sum: i32 = scores.iter().map(|&s| s as i32).sum();
    Some(sum as f64 / scores.len() as f64)
}

/// Headline score for a submission: the mean of per-review averages over
/// reviews with a submitted overall score. `None` until at least one review
/// is in.
pub fn final_score(reviews: &[Review]) -> Option<f64> {
    let averages: Vec<f64> = reviews
        .iter()
        .filter(|r| r.overall_score.is_some())
        .filter_map(review_average)
        .collect();
    if averages.is_empty() {
        return None;
    }
    Some(averages.iter().sum::<f64>() / averages.len() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn review(scores: Option<[i16; 5]>) -> Review {
        let now = Utc::now();
        Review {
            id: 1,
            submission_id: 1,
            reviewer_id: 1,
            originality_score: scores.map(|s| s[0]),
            relevance_score: scores.map(|s| s[1]),
            clarity_score: scores.map(|s| s[2]),
            methodology_score: scores.map(|s| s[3]),
            overall_score: scores.map(|s| s[4]),
            comments: scores.map(|_| "ok".to_string()),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn scores_in_range_pass_validation() {
        let scores = ReviewScores {
            originality_score: 1,
            relevance_score: 3,
            clarity_score: 5,
            methodology_score: 2,
            overall_score: 4,
        };
        assert!(scores.validate().is_ok());
    }

    #[test]
    fn out_of_range_score_is_rejected() {
        let scores = ReviewScores {
            originality_score: 6,
            relevance_score: 3,
            clarity_score: 3,
            methodology_score: 3,
            overall_score: 3,
        };
        let err = scores.validate().unwrap_err();
        assert!(matches!(
            err,
            Error::Validation {
                field: "originality_score",
                ..
            }
        ));

        let scores = ReviewScores {
            originality_score: 3,
            relevance_score: 3,
            clarity_score: 3,
            methodology_score: 0,
            overall_score: 3,
        };
        assert!(scores.validate().is_err());
    }

    #[test]
    fn review_average_requires_all_scores() {
        assert_eq!(review_average(&review(None)), None);
        assert_eq!(review_average(&review(Some([3, 3, 3, 3, 3]))), Some(3.0));
        assert_eq!(review_average(&review(Some([1, 2, 3, 4, 5]))), Some(3.0));
        assert_eq!(review_average(&review(Some([4, 4, 5, 5, 5]))), Some(4.6));
    }

    #[test]
    fn final_score_ignores_unscored_reviews() {
        let reviews = vec![
            review(Some([5, 5, 5, 5, 5])),
            review(Some([3, 3, 3, 3, 3])),
            review(None),
        ];
        assert_eq!(final_score(&reviews), Some(4.0));
    }

    #[test]
    fn final_score_is_none_without_scored_reviews() {
        assert_eq!(final_score(&[]), None);
        assert_eq!(final_score(&[review(None), review(None)]), None);
    }
}
