use chrono::{DateTime, Utc};
use sqlx::PgExecutor;
use ulid::Ulid;

use crate::entities;
use crate::error::{Error, Result};

pub async fn create(
    executor: impl PgExecutor<'_>,
    now: DateTime<Utc>,
    username: &str,
    password_hash: &str,
) -> Result<entities::UserId> {
    let user_id = entities::UserId::from(Ulid::from_datetime(now.into()).to_string());

    let result = sqlx::query(
        r#"
            INSERT INTO users (id, username, password_hash, created_at)
            VALUES ($1, $2, $3, $4)
        "#,
    )
    .bind(user_id.as_str())
    .bind(username)
    .bind(password_hash)
    .bind(now)
    .execute(executor)
    .await?;

    if result.rows_affected() != 1 {
        return Err(Error::InvariantViolation(format!(
            "unexpected number of rows affected registering {}: {}",
            username,
            result.rows_affected()
        )));
    }

    Ok(user_id)
}
