use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Submission workflow states. Stored as the `submission_status` Postgres
/// enum; wire value equals storage value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "submission_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum SubmissionStatus {
    Pending,
    UnderReview,
    RevisionRequiredPhase1,
    RevisionRequiredPhase2,
    Accepted,
    Rejected,
}

impl SubmissionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubmissionStatus::Pending => "pending",
            SubmissionStatus::UnderReview => "under_review",
            SubmissionStatus::RevisionRequiredPhase1 => "revision_required_phase1",
            SubmissionStatus::RevisionRequiredPhase2 => "revision_required_phase2",
            SubmissionStatus::Accepted => "accepted",
            SubmissionStatus::Rejected => "rejected",
        }
    }

    /// Authors may edit content only while the submission is pending or
    /// sent back for revision.
    pub fn is_editable(&self) -> bool {
        matches!(
            self,
            SubmissionStatus::Pending
                | SubmissionStatus::RevisionRequiredPhase1
                | SubmissionStatus::RevisionRequiredPhase2
        )
    }

    pub fn is_revision_required(&self) -> bool {
        matches!(
            self,
            SubmissionStatus::RevisionRequiredPhase1 | SubmissionStatus::RevisionRequiredPhase2
        )
    }
}

impl std::fmt::Display for SubmissionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Submission {
    pub id: i64,
    pub user_id: i64,
    pub submission_code: String,
    pub participant_category: Option<String>,
    pub category_submission: String,
    pub paper_theme: Option<String>,
    pub paper_sub_theme: String,
    pub title: String,
    #[sqlx(rename = "abstract")]
    #[serde(rename = "abstract")]
    pub abstract_text: String,
    pub keywords: String,
    pub author_full_name: String,
    pub co_author_1: Option<String>,
    pub co_author_1_institute: Option<String>,
    pub co_author_2: Option<String>,
    pub co_author_2_institute: Option<String>,
    pub co_author_3: Option<String>,
    pub co_author_3_institute: Option<String>,
    pub co_author_4: Option<String>,
    pub co_author_4_institute: Option<String>,
    pub co_author_5: Option<String>,
    pub co_author_5_institute: Option<String>,
    pub institute_organization: String,
    pub mobile_number: String,
    pub corresponding_author_email: String,
    pub full_paper_file: Option<String>,
    pub layouting_file: Option<String>,
    pub editor_feedback_file: Option<String>,
    pub status: SubmissionStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Review {
    pub id: i64,
    pub submission_id: i64,
    pub reviewer_id: i64,
    pub originality_score: Option<i16>,
    pub relevance_score: Option<i16>,
    pub clarity_score: Option<i16>,
    pub methodology_score: Option<i16>,
    pub overall_score: Option<i16>,
    pub comments: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Payment {
    pub id: i64,
    pub submission_id: i64,
    pub user_id: i64,
    pub amount: i64,
    pub proof_file: Option<String>,
    pub verified: bool,
    pub verified_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub whatsapp: Option<String>,
    pub role: String,
    pub category: Option<String>,
    pub created_at: DateTime<Utc>,
}
