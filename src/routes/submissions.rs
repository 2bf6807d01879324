//! Author-facing submission endpoints: create, edit/resubmit, read.
//!
//! Create and edit arrive as multipart forms (metadata text fields plus
//! optional paper/layout/feedback files). Files are written to the file
//! store before the database transaction runs, so a failed insert can never
//! leave the database pointing at missing files. Authentication is handled
//! upstream; the author's user id arrives as a form field and ownership is
//! enforced against it.

use axum::extract::{Multipart, Path, State};
use axum::Json;
use std::collections::HashMap;

use crate::db::{self, reviews, submissions};
use crate::error::{Error, Result};
use crate::state::AppState;
use crate::storage::FileStore;

/// Logical bucket for each file field, keyed by the canonical field name.
fn bucket_for(field: &str) -> Option<(&'static str, &'static str)> {
    match field {
        "full_paper_file" => Some(("full_paper_file", "submissions/papers")),
        "layouting_file" => Some(("layouting_file", "submissions/layouting")),
        "editor_feedback_file" => Some(("editor_feedback_file", "submissions/feedback")),
        _ => None,
    }
}

struct SubmissionForm {
    text: HashMap<String, String>,
    files: HashMap<&'static str, String>,
}

impl SubmissionForm {
    fn text(&self, field: &str) -> String {
        self.text.get(field).cloned().unwrap_or_default()
    }

    fn optional(&self, field: &str) -> Option<String> {
        self.text
            .get(field)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
    }

    fn co_authors(&self) -> [Option<String>; 5] {
        std::array::from_fn(|i| self.optional(&format!("co_author_{}", i + 1)))
    }

    fn co_author_institutes(&self) -> [Option<String>; 5] {
        std::array::from_fn(|i| self.optional(&format!("co_author_{}_institute", i + 1)))
    }
}

/// Drain a multipart request, storing any file fields as they stream in.
async fn read_form(files: &FileStore, mut multipart: Multipart) -> Result<SubmissionForm> {
    let mut form = SubmissionForm {
        text: HashMap::new(),
        files: HashMap::new(),
    };

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| Error::validation("form", e.to_string()))?
    {
        let name = field.name().unwrap_or_default().to_string();

        if let Some((key, bucket)) = bucket_for(&name) {
            let filename = field.file_name().unwrap_or("upload").to_string();
            let bytes = field
                .bytes()
                .await
                .map_err(|e| Error::validation("form", e.to_string()))?;
            if bytes.is_empty() {
                continue;
            }
            let reference = files.store(bucket, &filename, &bytes).map_err(|e| {
                tracing::error!("file store failed for {}: {}", name, e);
                Error::validation("form", "failed to store uploaded file")
            })?;
            form.files.insert(key, reference);
        } else {
            let value = field
                .text()
                .await
                .map_err(|e| Error::validation("form", e.to_string()))?;
            form.text.insert(name, value);
        }
    }

    Ok(form)
}

fn author_id(form: &SubmissionForm) -> Result<i64> {
    form.text("user_id")
        .parse()
        .map_err(|_| Error::validation("user_id", "must be a numeric user id"))
}

pub async fn create_submission(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<db::Submission>> {
    let form = read_form(&state.files, multipart).await?;
    let user_id = author_id(&form)?;

    let new = submissions::NewSubmission {
        participant_category: form.text("participant_category"),
        category_submission: form.text("category_submission"),
        paper_theme: form.optional("paper_theme"),
        paper_sub_theme: form.text("paper_sub_theme"),
        title: form.text("title"),
        abstract_text: form.text("abstract"),
        keywords: form.text("keywords"),
        author_full_name: form.text("author_full_name"),
        co_authors: form.co_authors(),
        co_author_institutes: form.co_author_institutes(),
        institute_organization: form.text("institute_organization"),
        mobile_number: form.text("mobile_number"),
        corresponding_author_email: form.text("corresponding_author_email"),
        full_paper_file: form.files.get("full_paper_file").cloned(),
        layouting_file: form.files.get("layouting_file").cloned(),
        editor_feedback_file: form.files.get("editor_feedback_file").cloned(),
    };

    let submission = submissions::create_submission(&state.pool, user_id, &new).await?;
    tracing::info!(
        submission_id = submission.id,
        code = %submission.submission_code,
        "submission created"
    );
    Ok(Json(submission))
}

pub async fn update_submission(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    multipart: Multipart,
) -> Result<Json<db::Submission>> {
    let form = read_form(&state.files, multipart).await?;
    let user_id = author_id(&form)?;

    let update = submissions::SubmissionUpdate {
        paper_theme: form.optional("paper_theme"),
        paper_sub_theme: form.text("paper_sub_theme"),
        title: form.text("title"),
        abstract_text: form.text("abstract"),
        keywords: form.text("keywords"),
        author_full_name: form.text("author_full_name"),
        co_authors: form.co_authors(),
        co_author_institutes: form.co_author_institutes(),
        institute_organization: form.text("institute_organization"),
        mobile_number: form.text("mobile_number"),
        corresponding_author_email: form.text("corresponding_author_email"),
        full_paper_file: form.files.get("full_paper_file").cloned(),
        layouting_file: form.files.get("layouting_file").cloned(),
        editor_feedback_file: form.files.get("editor_feedback_file").cloned(),
    };

    let outcome =
        submissions::update_submission_content(&state.pool, user_id, id, &update).await?;

    // Replaced artifacts are removed only after the update committed.
    for reference in &outcome.replaced_files {
        state.files.delete(reference);
    }

    Ok(Json(outcome.submission))
}

pub async fn get_submission_detail(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<serde_json::Value>> {
    let submission = submissions::get_submission(&state.pool, id)
        .await?
        .ok_or(Error::NotFound("submission"))?;
    let submission_reviews = reviews::list_for_submission(&state.pool, id).await?;
    let final_score = reviews::final_score(&submission_reviews);

    Ok(Json(serde_json::json!({
        "submission": submission,
        "reviews": submission_reviews,
        "final_score": final_score,
    })))
}

pub async fn list_user_submissions(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> Result<Json<Vec<db::Submission>>> {
    let rows = submissions::list_user_submissions(&state.pool, user_id).await?;
    Ok(Json(rows))
}
