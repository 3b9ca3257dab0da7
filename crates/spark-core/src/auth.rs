//! Account lookup and the signed-in session.
//!
//! A session is a single row naming the current user. There are no passwords
//! or tokens: signing in only records which account the local data belongs to.

use chrono::Utc;
use sqlx::{Sqlite, Transaction};
use uuid::Uuid;

use crate::db::{fetch_first, DbPool};
use crate::error::CoreError;
use crate::models::User;

fn normalize_email(email: &str) -> Result<String, CoreError> {
    let email = email.trim().to_lowercase();
    if email.is_empty() || !email.contains('@') {
        return Err(CoreError::InvalidInput(format!(
            "'{}' is not a valid email address",
            email
        )));
    }
    Ok(email)
}

async fn start_session(tx: &mut Transaction<'_, Sqlite>, user_id: Uuid) -> Result<(), CoreError> {
    sqlx::query("DELETE FROM sessions")
        .execute(&mut **tx)
        .await?;
    sqlx::query("INSERT INTO sessions (id, user_id, created_at) VALUES ($1, $2, $3)")
        .bind(Uuid::now_v7())
        .bind(user_id)
        .bind(Utc::now())
        .execute(&mut **tx)
        .await?;
    Ok(())
}

async fn insert_user(
    tx: &mut Transaction<'_, Sqlite>,
    email: Option<String>,
) -> Result<User, CoreError> {
    let user = User {
        id: Uuid::now_v7(),
        is_anonymous: email.is_none(),
        email,
        created_at: Utc::now(),
    };
    sqlx::query("INSERT INTO users (id, email, is_anonymous, created_at) VALUES ($1, $2, $3, $4)")
        .bind(user.id)
        .bind(&user.email)
        .bind(user.is_anonymous)
        .bind(user.created_at)
        .execute(&mut **tx)
        .await?;
    Ok(user)
}

/// Creates an account for `email` and signs it in.
pub async fn sign_up(pool: &DbPool, email: &str) -> Result<User, CoreError> {
    let email = normalize_email(email)?;
    let mut tx = pool.begin().await?;

    let existing: Option<(Uuid,)> = fetch_first(
        &mut *tx,
        sqlx::query_as("SELECT id FROM users WHERE email = $1").bind(&email),
    )
    .await?;
    if existing.is_some() {
        return Err(CoreError::InvalidInput(format!(
            "An account for {} already exists",
            email
        )));
    }

    let user = insert_user(&mut tx, Some(email)).await?;
    start_session(&mut tx, user.id).await?;
    tx.commit().await?;

    tracing::info!(user_id = %user.id, "signed up");
    Ok(user)
}

/// Signs in the existing account for `email`.
pub async fn sign_in(pool: &DbPool, email: &str) -> Result<User, CoreError> {
    let email = normalize_email(email)?;
    let mut tx = pool.begin().await?;

    let user: User = fetch_first(
        &mut *tx,
        sqlx::query_as("SELECT * FROM users WHERE email = $1").bind(&email),
    )
    .await?
    .ok_or_else(|| CoreError::NotFound(format!("No account for {}", email)))?;

    start_session(&mut tx, user.id).await?;
    tx.commit().await?;

    tracing::info!(user_id = %user.id, "signed in");
    Ok(user)
}

/// Creates a fresh anonymous account and signs it in.
pub async fn sign_in_anonymously(pool: &DbPool) -> Result<User, CoreError> {
    let mut tx = pool.begin().await?;
    let user = insert_user(&mut tx, None).await?;
    start_session(&mut tx, user.id).await?;
    tx.commit().await?;

    tracing::info!(user_id = %user.id, "signed in anonymously");
    Ok(user)
}

pub async fn sign_out(pool: &DbPool) -> Result<(), CoreError> {
    sqlx::query("DELETE FROM sessions").execute(pool).await?;
    tracing::info!("signed out");
    Ok(())
}

/// The signed-in user, if any.
pub async fn current_user(pool: &DbPool) -> Result<Option<User>, CoreError> {
    fetch_first(
        pool,
        sqlx::query_as(
            r#"SELECT u.id, u.email, u.is_anonymous, u.created_at
            FROM sessions s JOIN users u ON u.id = s.user_id
            ORDER BY s.created_at DESC
            LIMIT 1"#,
        ),
    )
    .await
}
