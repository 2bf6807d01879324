//! Status-change notification boundary.
//!
//! The core invokes the notifier once per submission whose status actually
//! changed. Delivery is best-effort and asynchronous: implementations must
//! not block the caller, and failures are logged, never propagated into the
//! mutation that triggered them.

use crate::db::{Submission, SubmissionStatus, User};

pub trait Notifier: Send + Sync {
    /// Called after commit with the new status already applied. Exactly one
    /// call per changed submission per change event.
    fn submission_status_changed(
        &self,
        user: &User,
        submission: &Submission,
        new_status: SubmissionStatus,
    );
}

/// Author-facing message for a status change.
pub fn status_message(status: SubmissionStatus) -> &'static str {
    match status {
        SubmissionStatus::Pending => "Your submission is pending and will be reviewed shortly.",
        SubmissionStatus::UnderReview => "Your submission is now under review.",
        SubmissionStatus::RevisionRequiredPhase1 => {
            "Revision required (phase 1). Please revise according to the reviewer comments."
        }
        SubmissionStatus::RevisionRequiredPhase2 => {
            "Revision required (phase 2). Please make the additional revisions requested."
        }
        SubmissionStatus::Accepted => "Congratulations! Your submission has been accepted.",
        SubmissionStatus::Rejected => {
            "We are sorry, your submission could not be accepted this time."
        }
    }
}

/// Default notifier: records the dispatch in the log. Actual transport
/// (email, WhatsApp) is handled by an external delivery queue.
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn submission_status_changed(
        &self,
        user: &User,
        submission: &Submission,
        new_status: SubmissionStatus,
    ) {
        tracing::info!(
            user_id = user.id,
            submission_id = submission.id,
            code = %submission.submission_code,
            status = %new_status,
            "status notification queued: {}",
            status_message(new_status)
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_status_has_a_message() {
        for status in [
            SubmissionStatus::Pending,
            SubmissionStatus::UnderReview,
            SubmissionStatus::RevisionRequiredPhase1,
            SubmissionStatus::RevisionRequiredPhase2,
            SubmissionStatus::Accepted,
            SubmissionStatus::Rejected,
        ] {
            assert!(!status_message(status).is_empty());
        }
    }
}
