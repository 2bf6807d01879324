//! Submission code assignment.
//!
//! Every submission gets a human-readable code `<prefix>-NNN` where the
//! 4-letter prefix encodes the participant category and presentation type
//! (e.g. `SOIG-001` for a student oral presentation). Sequence numbers are
//! strictly increasing per prefix, starting at 001.
//!
//! Minting goes through a per-prefix row in `submission_code_counters`,
//! bumped with `INSERT .. ON CONFLICT .. DO UPDATE .. RETURNING` inside the
//! caller's transaction. The row lock taken by the upsert serializes
//! concurrent submitters sharing a prefix; other prefixes are unblocked. If
//! the surrounding transaction rolls back, the bump rolls back with it.

use sqlx::PgConnection;

use crate::error::{Error, Result};

/// Participant classification, first letter of the code prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParticipantCategory {
    Student,
    Professional,
    International,
}

impl ParticipantCategory {
    pub fn parse(value: &str) -> Result<Self> {
        match value {
            "student" => Ok(ParticipantCategory::Student),
            "professional" => Ok(ParticipantCategory::Professional),
            "international" => Ok(ParticipantCategory::International),
            other => Err(Error::validation(
                "participant_category",
                format!(
                    "must be one of student, professional, international (got '{}')",
                    other
                ),
            )),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ParticipantCategory::Student => "student",
            ParticipantCategory::Professional => "professional",
            ParticipantCategory::International => "international",
        }
    }

    fn letter(&self) -> char {
        match self {
            ParticipantCategory::Student => 'S',
            ParticipantCategory::Professional => 'P',
            ParticipantCategory::International => 'I',
        }
    }
}

/// Derive the 4-character code prefix from the submission classification.
/// Presentation types starting with "Oral" map to 'O', everything else
/// (posters, future types) to 'P'.
pub fn code_prefix(category: ParticipantCategory, category_submission: &str) -> String {
    let presentation = if category_submission.starts_with("Oral") {
        'O'
    } else {
        'P'
    };
    format!("{}{}IG", category.letter(), presentation)
}

pub fn format_code(prefix: &str, number: i32) -> String {
    format!("{}-{:03}", prefix, number)
}

/// Mint the next code for `prefix` on the given transaction connection.
/// Must run inside the transaction that inserts the submission row so that
/// a rollback releases the number.
pub async fn next_code(conn: &mut PgConnection, prefix: &str) -> Result<String> {
    let number: i32 = sqlx::query_scalar(
        r#"
        INSERT INTO submission_code_counters (prefix, last_number)
        VALUES ($1, 1)
        ON CONFLICT (prefix)
        DO UPDATE SET last_number = submission_code_counters.last_number + 1
        RETURNING last_number
        "#,
    )
    .bind(prefix)
    .fetch_one(conn)
    .await?;

    Ok(format_code(prefix, number))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefix_student_oral() {
        assert_eq!(
            code_prefix(ParticipantCategory::Student, "Oral Presentation"),
            "SOIG"
        );
    }

    #[test]
    fn prefix_professional_poster() {
        assert_eq!(
            code_prefix(ParticipantCategory::Professional, "Poster Presentation"),
            "PPIG"
        );
    }

    #[test]
    fn prefix_international_unknown_presentation_defaults_to_poster_letter() {
        assert_eq!(
            code_prefix(ParticipantCategory::International, "Lightning Talk"),
            "IPIG"
        );
    }

    #[test]
    fn parse_rejects_unknown_category() {
        assert!(ParticipantCategory::parse("alien").is_err());
        assert_eq!(
            ParticipantCategory::parse("student").unwrap(),
            ParticipantCategory::Student
        );
    }

    #[test]
    fn code_format_is_zero_padded() {
        assert_eq!(format_code("SOIG", 1), "SOIG-001");
        assert_eq!(format_code("SOIG", 42), "SOIG-042");
        assert_eq!(format_code("PPIG", 999), "PPIG-999");
    }

    #[test]
    fn code_matches_wire_format() {
        let re = regex::Regex::new(r"^[SPI][OP]IG-\d{3}$").unwrap();
        for (cat, pres) in [
            (ParticipantCategory::Student, "Oral Presentation"),
            (ParticipantCategory::Professional, "Poster Presentation"),
            (ParticipantCategory::International, "Oral Presentation"),
        ] {
            let code = format_code(&code_prefix(cat, pres), 7);
            assert!(re.is_match(&code), "bad code: {}", code);
        }
    }
}
