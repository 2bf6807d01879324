//! Shared test helpers for integration tests.

#![allow(dead_code)]

use simposio::db::submissions::NewSubmission;

/// Returns true if the test database URL is configured.
pub fn has_test_db() -> bool {
    std::env::var("TEST_DATABASE_URL").is_ok()
}

pub fn test_db_url() -> String {
    std::env::var("TEST_DATABASE_URL")
        .expect("TEST_DATABASE_URL must be set for integration tests")
}

/// Connect to the test database, apply migrations (sqlx skips versions
/// already applied) and truncate all tables for isolation.
pub async fn setup_test_db() -> sqlx::PgPool {
    let pool = sqlx::PgPool::connect(&test_db_url())
        .await
        .expect("failed to connect to test database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("migrations failed");

    sqlx::raw_sql(
        "TRUNCATE TABLE reviews, payments, submissions, submission_code_counters, users
         RESTART IDENTITY CASCADE",
    )
    .execute(&pool)
    .await
    .expect("failed to truncate tables");

    pool
}

pub async fn seed_user(pool: &sqlx::PgPool, name: &str, role: &str) -> i64 {
    let email = format!("{}@example.org", name.to_lowercase().replace(' ', "."));
    simposio::db::users::create_user(pool, name, &email, role, None)
        .await
        .expect("failed to seed user")
        .id
}

/// A valid submission payload for the given classification.
pub fn sample_submission(participant_category: &str, category_submission: &str) -> NewSubmission {
    NewSubmission {
        participant_category: participant_category.to_string(),
        category_submission: category_submission.to_string(),
        paper_theme: Some("Energy Transition".to_string()),
        paper_sub_theme: "Geothermal".to_string(),
        title: "Heat flow in volcanic arcs".to_string(),
        abstract_text: "We measure heat flow.".to_string(),
        keywords: "heat, flow, arcs".to_string(),
        author_full_name: "Ada Author".to_string(),
        co_authors: Default::default(),
        co_author_institutes: Default::default(),
        institute_organization: "Institute of Geology".to_string(),
        mobile_number: "+6281200000000".to_string(),
        corresponding_author_email: "ada@example.org".to_string(),
        full_paper_file: None,
        layouting_file: None,
        editor_feedback_file: None,
    }
}
