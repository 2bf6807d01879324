//! Submission store and status state machine.
//!
//! Authors create and (while editable) resubmit submissions; admins move
//! them through the workflow and delete them. Status values live in
//! [`SubmissionStatus`]; the interesting transitions are:
//!
//! - create: status starts at `pending`, code minted in the insert transaction
//! - author edit from a revision_required_* state: forced to `under_review`
//! - admin status change (single or bulk): any of the six values, with
//!   changed rows reported back so notification dispatch happens exactly
//!   once per submission that actually changed

use sqlx::PgPool;

use super::codes::{self, ParticipantCategory};
use super::models::{Submission, SubmissionStatus};
use crate::error::{Error, Result};

/// Content fields captured at creation time. File fields carry references
/// already persisted by the file store; the database never sees bytes.
#[derive(Debug, Default, Clone)]
pub struct NewSubmission {
    pub participant_category: String,
    pub category_submission: String,
    pub paper_theme: Option<String>,
    pub paper_sub_theme: String,
    pub title: String,
    pub abstract_text: String,
    pub keywords: String,
    pub author_full_name: String,
    pub co_authors: [Option<String>; 5],
    pub co_author_institutes: [Option<String>; 5],
    pub institute_organization: String,
    pub mobile_number: String,
    pub corresponding_author_email: String,
    pub full_paper_file: Option<String>,
    pub layouting_file: Option<String>,
    pub editor_feedback_file: Option<String>,
}

/// Author edit. `None` file fields keep the stored artifact; `Some` replaces
/// it (the old reference is handed back for cleanup after commit).
#[derive(Debug, Default, Clone)]
pub struct SubmissionUpdate {
    pub paper_theme: Option<String>,
    pub paper_sub_theme: String,
    pub title: String,
    pub abstract_text: String,
    pub keywords: String,
    pub author_full_name: String,
    pub co_authors: [Option<String>; 5],
    pub co_author_institutes: [Option<String>; 5],
    pub institute_organization: String,
    pub mobile_number: String,
    pub corresponding_author_email: String,
    pub full_paper_file: Option<String>,
    pub layouting_file: Option<String>,
    pub editor_feedback_file: Option<String>,
}

fn require(field: &'static str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::validation(field, "is required"));
    }
    Ok(())
}

fn validate_content(
    title: &str,
    abstract_text: &str,
    keywords: &str,
    author_full_name: &str,
    institute_organization: &str,
    mobile_number: &str,
    corresponding_author_email: &str,
    paper_sub_theme: &str,
) -> Result<()> {
    require("title", title)?;
    require("abstract", abstract_text)?;
    require("keywords", keywords)?;
    require("author_full_name", author_full_name)?;
    require("institute_organization", institute_organization)?;
    require("mobile_number", mobile_number)?;
    require("corresponding_author_email", corresponding_author_email)?;
    if !corresponding_author_email.contains('@') {
        return Err(Error::validation(
            "corresponding_author_email",
            "must be a valid email address",
        ));
    }
    require("paper_sub_theme", paper_sub_theme)?;
    Ok(())
}

/// Create a submission: validate, then mint the code and insert the row in
/// one transaction. Validation runs before any code is generated, so a
/// rejected request never burns a sequence number.
pub async fn create_submission(
    pool: &PgPool,
    user_id: i64,
    new: &NewSubmission,
) -> Result<Submission> {
    let category = ParticipantCategory::parse(&new.participant_category)?;
    require("category_submission", &new.category_submission)?;
    validate_content(
        &new.title,
        &new.abstract_text,
        &new.keywords,
        &new.author_full_name,
        &new.institute_organization,
        &new.mobile_number,
        &new.corresponding_author_email,
        &new.paper_sub_theme,
    )?;

    let prefix = codes::code_prefix(category, &new.category_submission);

    let mut tx = pool.begin().await?;
    let code = codes::next_code(&mut *tx, &prefix).await?;

    let submission = sqlx::query_as::<_, Submission>(
        r#"
        INSERT INTO submissions (
            user_id, submission_code, participant_category, category_submission,
            paper_theme, paper_sub_theme, title, abstract, keywords,
            author_full_name,
            co_author_1, co_author_1_institute,
            co_author_2, co_author_2_institute,
            co_author_3, co_author_3_institute,
            co_author_4, co_author_4_institute,
            co_author_5, co_author_5_institute,
            institute_organization, mobile_number, corresponding_author_email,
            full_paper_file, layouting_file, editor_feedback_file, status
        )
        VALUES (
            $1, $2, $3, $4, $5, $6, $7, $8, $9, $10,
            $11, $12, $13, $14, $15, $16, $17, $18, $19, $20,
            $21, $22, $23, $24, $25, $26, 'pending'
        )
        RETURNING *
        "#,
    )
    .bind(user_id)
    .bind(&code)
    .bind(category.as_str())
    .bind(&new.category_submission)
    .bind(&new.paper_theme)
    .bind(&new.paper_sub_theme)
    .bind(&new.title)
    .bind(&new.abstract_text)
    .bind(&new.keywords)
    .bind(&new.author_full_name)
    .bind(&new.co_authors[0])
    .bind(&new.co_author_institutes[0])
    .bind(&new.co_authors[1])
    .bind(&new.co_author_institutes[1])
    .bind(&new.co_authors[2])
    .bind(&new.co_author_institutes[2])
    .bind(&new.co_authors[3])
    .bind(&new.co_author_institutes[3])
    .bind(&new.co_authors[4])
    .bind(&new.co_author_institutes[4])
    .bind(&new.institute_organization)
    .bind(&new.mobile_number)
    .bind(&new.corresponding_author_email)
    .bind(&new.full_paper_file)
    .bind(&new.layouting_file)
    .bind(&new.editor_feedback_file)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(submission)
}

pub async fn get_submission(pool: &PgPool, id: i64) -> Result<Option<Submission>> {
    let row = sqlx::query_as::<_, Submission>("SELECT * FROM submissions WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

/// All submissions, newest first. Legacy rows missing a participant
/// category are backfilled at read time from the owner's user category.
pub async fn list_submissions(pool: &PgPool) -> Result<Vec<Submission>> {
    let rows = sqlx::query_as::<_, Submission>(
        r#"
        SELECT s.id, s.user_id, s.submission_code,
               COALESCE(s.participant_category,
                        CASE u.category
                            WHEN 'Student' THEN 'student'
                            WHEN 'Professional' THEN 'professional'
                            WHEN 'International Delegate' THEN 'international'
                        END) AS participant_category,
               s.category_submission, s.paper_theme, s.paper_sub_theme,
               s.title, s.abstract, s.keywords, s.author_full_name,
               s.co_author_1, s.co_author_1_institute,
               s.co_author_2, s.co_author_2_institute,
               s.co_author_3, s.co_author_3_institute,
               s.co_author_4, s.co_author_4_institute,
               s.co_author_5, s.co_author_5_institute,
               s.institute_organization, s.mobile_number,
               s.corresponding_author_email,
               s.full_paper_file, s.layouting_file, s.editor_feedback_file,
               s.status, s.created_at, s.updated_at
        FROM submissions s
        JOIN users u ON u.id = s.user_id
        ORDER BY s.id DESC
        "#,
    )
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn list_user_submissions(pool: &PgPool, user_id: i64) -> Result<Vec<Submission>> {
    let rows = sqlx::query_as::<_, Submission>(
        "SELECT * FROM submissions WHERE user_id = $1 ORDER BY id DESC",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Result of an author edit: the updated row plus any file references that
/// were replaced and should be removed from storage after commit.
#[derive(Debug)]
pub struct EditOutcome {
    pub submission: Submission,
    pub replaced_files: Vec<String>,
}

/// Author edit/resubmit. Only allowed while the status is editable; a
/// resubmission from a revision_required_* state moves the submission back
/// to `under_review` in the same update.
pub async fn update_submission_content(
    pool: &PgPool,
    user_id: i64,
    submission_id: i64,
    update: &SubmissionUpdate,
) -> Result<EditOutcome> {
    validate_content(
        &update.title,
        &update.abstract_text,
        &update.keywords,
        &update.author_full_name,
        &update.institute_organization,
        &update.mobile_number,
        &update.corresponding_author_email,
        &update.paper_sub_theme,
    )?;

    let mut tx = pool.begin().await?;

    let current = sqlx::query_as::<_, Submission>(
        "SELECT * FROM submissions WHERE id = $1 AND user_id = $2 FOR UPDATE",
    )
    .bind(submission_id)
    .bind(user_id)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or(Error::NotFound("submission"))?;

    if !current.status.is_editable() {
        return Err(Error::Conflict(format!(
            "submission cannot be edited while its status is '{}'",
            current.status
        )));
    }

    let next_status = if current.status.is_revision_required() {
        SubmissionStatus::UnderReview
    } else {
        current.status
    };

    let mut replaced_files = Vec::new();
    if update.full_paper_file.is_some() {
        replaced_files.extend(current.full_paper_file.clone());
    }
    if update.layouting_file.is_some() {
        replaced_files.extend(current.layouting_file.clone());
    }
    if update.editor_feedback_file.is_some() {
        replaced_files.extend(current.editor_feedback_file.clone());
    }

    let submission = sqlx::query_as::<_, Submission>(
        r#"
        UPDATE submissions SET
            paper_theme = $2, paper_sub_theme = $3, title = $4, abstract = $5,
            keywords = $6, author_full_name = $7,
            co_author_1 = $8, co_author_1_institute = $9,
            co_author_2 = $10, co_author_2_institute = $11,
            co_author_3 = $12, co_author_3_institute = $13,
            co_author_4 = $14, co_author_4_institute = $15,
            co_author_5 = $16, co_author_5_institute = $17,
            institute_organization = $18, mobile_number = $19,
            corresponding_author_email = $20,
            full_paper_file = COALESCE($21, full_paper_file),
            layouting_file = COALESCE($22, layouting_file),
            editor_feedback_file = COALESCE($23, editor_feedback_file),
            status = $24,
            updated_at = NOW()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(submission_id)
    .bind(&update.paper_theme)
    .bind(&update.paper_sub_theme)
    .bind(&update.title)
    .bind(&update.abstract_text)
    .bind(&update.keywords)
    .bind(&update.author_full_name)
    .bind(&update.co_authors[0])
    .bind(&update.co_author_institutes[0])
    .bind(&update.co_authors[1])
    .bind(&update.co_author_institutes[1])
    .bind(&update.co_authors[2])
    .bind(&update.co_author_institutes[2])
    .bind(&update.co_authors[3])
    .bind(&update.co_author_institutes[3])
    .bind(&update.co_authors[4])
    .bind(&update.co_author_institutes[4])
    .bind(&update.institute_organization)
    .bind(&update.mobile_number)
    .bind(&update.corresponding_author_email)
    .bind(&update.full_paper_file)
    .bind(&update.layouting_file)
    .bind(&update.editor_feedback_file)
    .bind(next_status)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(EditOutcome {
        submission,
        replaced_files,
    })
}

/// Admin status change. Returns the updated row only when the status
/// actually changed; a no-op update returns `Ok(None)` and must not trigger
/// notifications.
pub async fn update_status(
    pool: &PgPool,
    submission_id: i64,
    new_status: SubmissionStatus,
) -> Result<Option<Submission>> {
    let changed = sqlx::query_as::<_, Submission>(
        r#"
        UPDATE submissions SET status = $2, updated_at = NOW()
        WHERE id = $1 AND status <> $2
        RETURNING *
        "#,
    )
    .bind(submission_id)
    .bind(new_status)
    .fetch_optional(pool)
    .await?;

    if changed.is_none() {
        // Distinguish "no change needed" from "no such submission".
        let exists: Option<i64> = sqlx::query_scalar("SELECT id FROM submissions WHERE id = $1")
            .bind(submission_id)
            .fetch_optional(pool)
            .await?;
        if exists.is_none() {
            return Err(Error::NotFound("submission"));
        }
    }

    Ok(changed)
}

/// Bulk admin status change. A single statement updates only the rows whose
/// status differs, and the changed rows are returned so the caller can
/// dispatch one notification per actually-changed submission. Re-running
/// the same bulk update therefore changes (and notifies) nothing.
pub async fn bulk_update_status(
    pool: &PgPool,
    submission_ids: &[i64],
    new_status: SubmissionStatus,
) -> Result<Vec<Submission>> {
    if submission_ids.is_empty() {
        return Err(Error::validation("submission_ids", "must not be empty"));
    }

    let changed = sqlx::query_as::<_, Submission>(
        r#"
        UPDATE submissions SET status = $2, updated_at = NOW()
        WHERE id = ANY($1) AND status <> $2
        RETURNING *
        "#,
    )
    .bind(submission_ids)
    .bind(new_status)
    .fetch_all(pool)
    .await?;

    Ok(changed)
}

/// Admin delete: reviews, payment and the submission row go in one
/// transaction so a failure cannot leave a partial cascade. File references
/// are returned for post-commit removal (storage deletion is idempotent and
/// best-effort).
pub async fn delete_submission(pool: &PgPool, submission_id: i64) -> Result<Vec<String>> {
    let mut tx = pool.begin().await?;

    let current = sqlx::query_as::<_, Submission>(
        "SELECT * FROM submissions WHERE id = $1 FOR UPDATE",
    )
    .bind(submission_id)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or(Error::NotFound("submission"))?;

    sqlx::query("DELETE FROM reviews WHERE submission_id = $1")
        .bind(submission_id)
        .execute(&mut *tx)
        .await?;
    sqlx::query("DELETE FROM payments WHERE submission_id = $1")
        .bind(submission_id)
        .execute(&mut *tx)
        .await?;
    sqlx::query("DELETE FROM submissions WHERE id = $1")
        .bind(submission_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    let artifacts = [
        current.full_paper_file,
        current.layouting_file,
        current.editor_feedback_file,
    ]
    .into_iter()
    .flatten()
    .collect();

    Ok(artifacts)
}

/// Dashboard counts for the admin overview.
#[derive(Debug, serde::Serialize)]
pub struct SubmissionStats {
    pub total: i64,
    pub pending: i64,
    pub under_review: i64,
    pub accepted: i64,
    pub rejected: i64,
}

pub async fn submission_stats(pool: &PgPool) -> Result<SubmissionStats> {
    let (total, pending, under_review, accepted, rejected): (i64, i64, i64, i64, i64) =
        sqlx::query_as(
            r#"
            SELECT COUNT(*),
                   COUNT(*) FILTER (WHERE status = 'pending'),
                   COUNT(*) FILTER (WHERE status = 'under_review'),
                   COUNT(*) FILTER (WHERE status = 'accepted'),
                   COUNT(*) FILTER (WHERE status = 'rejected')
            FROM submissions
            "#,
        )
        .fetch_one(pool)
        .await?;

    Ok(SubmissionStats {
        total,
        pending,
        under_review,
        accepted,
        rejected,
    })
}
