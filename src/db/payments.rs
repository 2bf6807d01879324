//! Payment tracking for accepted work. Simple CRUD: at most one active
//! proof per submission, verified by an admin.

use chrono::Utc;
use sqlx::PgPool;

use super::models::Payment;
use crate::error::{Error, Result};

/// Record (or replace) the payment proof for a submission. The previous
/// proof reference, if any, is returned so the caller can remove the stored
/// file after the new one is in place.
pub async fn upsert_proof(
    pool: &PgPool,
    submission_id: i64,
    user_id: i64,
    amount: i64,
    proof_file: &str,
) -> Result<(Payment, Option<String>)> {
    let previous: Option<String> = sqlx::query_scalar(
        "SELECT proof_file FROM payments WHERE submission_id = $1",
    )
    .bind(submission_id)
    .fetch_optional(pool)
    .await?
    .flatten();

    let payment = sqlx::query_as::<_, Payment>(
        r#"
        INSERT INTO payments (submission_id, user_id, amount, proof_file)
        VALUES ($1, $2, $3, $4)
        ON CONFLICT (submission_id)
        DO UPDATE SET amount = $3, proof_file = $4, verified = FALSE, verified_at = NULL
        RETURNING *
        "#,
    )
    .bind(submission_id)
    .bind(user_id)
    .bind(amount)
    .bind(proof_file)
    .fetch_one(pool)
    .await?;

    Ok((payment, previous))
}

pub async fn get_for_submission(pool: &PgPool, submission_id: i64) -> Result<Option<Payment>> {
    let row = sqlx::query_as::<_, Payment>("SELECT * FROM payments WHERE submission_id = $1")
        .bind(submission_id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

pub async fn verify(pool: &PgPool, payment_id: i64) -> Result<Payment> {
    let payment = sqlx::query_as::<_, Payment>(
        "UPDATE payments SET verified = TRUE, verified_at = $2 WHERE id = $1 RETURNING *",
    )
    .bind(payment_id)
    .bind(Utc::now())
    .fetch_optional(pool)
    .await?
    .ok_or(Error::NotFound("payment"))?;
    Ok(payment)
}

pub async fn reject(pool: &PgPool, payment_id: i64) -> Result<Payment> {
    let payment = sqlx::query_as::<_, Payment>(
        "UPDATE payments SET verified = FALSE, verified_at = NULL WHERE id = $1 RETURNING *",
    )
    .bind(payment_id)
    .fetch_optional(pool)
    .await?
    .ok_or(Error::NotFound("payment"))?;
    Ok(payment)
}
