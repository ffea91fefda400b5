use sqlx::PgExecutor;

use crate::entities;
use crate::error::Result;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserModel {
    pub id: String,
    pub username: String,
    pub password_hash: String,
}

impl UserModel {
    pub fn user_id(&self) -> entities::UserId {
        entities::UserId::from(self.id.clone())
    }
}

pub async fn get_by_username(
    executor: impl PgExecutor<'_>,
    username: &str,
) -> Result<Option<UserModel>> {
    let model = sqlx::query_as::<_, UserModel>(
        r#"
            SELECT
                id,
                username,
                password_hash
            FROM
                users
            WHERE
                username = $1
        "#,
    )
    .bind(username)
    .fetch_optional(executor)
    .await?;

    Ok(model)
}
