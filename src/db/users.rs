//! Minimal user operations. Authentication and account management live
//! outside this service; the core only needs identity, role and category.

use sqlx::PgPool;

use super::models::User;
use crate::error::{Error, Result};

pub async fn get_user(pool: &PgPool, id: i64) -> Result<User> {
    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or(Error::NotFound("user"))?;
    Ok(user)
}

pub async fn create_user(
    pool: &PgPool,
    name: &str,
    email: &str,
    role: &str,
    category: Option<&str>,
) -> Result<User> {
    let user = sqlx::query_as::<_, User>(
        r#"
        INSERT INTO users (name, email, role, category)
        VALUES ($1, $2, $3, $4)
        RETURNING *
        "#,
    )
    .bind(name)
    .bind(email)
    .bind(role)
    .bind(category)
    .fetch_one(pool)
    .await?;
    Ok(user)
}

pub async fn list_reviewers(pool: &PgPool) -> Result<Vec<User>> {
    let rows = sqlx::query_as::<_, User>(
        "SELECT * FROM users WHERE LOWER(role) = 'reviewer' ORDER BY name",
    )
    .fetch_all(pool)
    .await?;
    Ok(rows)
}
