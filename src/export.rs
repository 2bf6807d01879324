//! CSV export of the submission read model (submission + owner + payment),
//! one flat row per submission, UTF-8 BOM prefixed for spreadsheet tools.

use sqlx::PgPool;

use crate::error::Result;

#[derive(Debug, sqlx::FromRow)]
pub struct ExportRow {
    pub id: i64,
    pub submission_code: String,
    pub title: String,
    pub author: String,
    pub email: String,
    pub phone: Option<String>,
    pub institute: String,
    pub sub_theme: String,
    pub status: String,
    pub payment_verified: bool,
    pub submitted_at: chrono::DateTime<chrono::Utc>,
}

pub async fn export_rows(pool: &PgPool) -> Result<Vec<ExportRow>> {
    let rows = sqlx::query_as::<_, ExportRow>(
        r#"
        SELECT s.id,
               s.submission_code,
               s.title,
               COALESCE(s.author_full_name, u.name) AS author,
               COALESCE(s.corresponding_author_email, u.email) AS email,
               u.whatsapp AS phone,
               s.institute_organization AS institute,
               s.paper_sub_theme AS sub_theme,
               s.status::TEXT AS status,
               COALESCE(p.verified, FALSE) AS payment_verified,
               s.created_at AS submitted_at
        FROM submissions s
        JOIN users u ON u.id = s.user_id
        LEFT JOIN payments p ON p.submission_id = s.id
        ORDER BY s.id
        "#,
    )
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

const HEADER: &str =
    "ID,Code,Title,Author,Email,Phone,Institute,Sub Theme,Status,Payment Status,Submitted At";

pub fn to_csv(rows: &[ExportRow]) -> String {
    // BOM so spreadsheet imports pick up UTF-8.
    let mut out = String::from("\u{feff}");
    out.push_str(HEADER);
    out.push('\n');

    for row in rows {
        let fields = [
            row.id.to_string(),
            row.submission_code.clone(),
            row.title.clone(),
            row.author.clone(),
            row.email.clone(),
            row.phone.clone().unwrap_or_else(|| "N/A".to_string()),
            row.institute.clone(),
            row.sub_theme.clone(),
            row.status.clone(),
            (if row.payment_verified { "Paid" } else { "Unpaid" }).to_string(),
            row.submitted_at.format("%Y-%m-%d %H:%M:%S").to_string(),
        ];
        let line: Vec<String> = fields.iter().map(|f| escape_field(f)).collect();
        out.push_str(&line.join(","));
        out.push('\n');
    }

    out
}

fn escape_field(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn row() -> ExportRow {
        ExportRow {
            id: 7,
            submission_code: "SOIG-007".to_string(),
            title: "Basin modelling, revisited".to_string(),
            author: "A. Author".to_string(),
            email: "a@example.org".to_string(),
            phone: None,
            institute: "Institute \"X\"".to_string(),
            sub_theme: "Geothermal".to_string(),
            status: "accepted".to_string(),
            payment_verified: true,
            submitted_at: Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap(),
        }
    }

    #[test]
    fn csv_quotes_commas_and_doubles_quotes() {
        let csv = to_csv(&[row()]);
        assert!(csv.starts_with('\u{feff}'));
        assert!(csv.contains("\"Basin modelling, revisited\""));
        assert!(csv.contains("\"Institute \"\"X\"\"\""));
        assert!(csv.contains("Paid"));
        assert!(csv.contains("N/A"));
        assert_eq!(csv.lines().count(), 2);
    }
}
