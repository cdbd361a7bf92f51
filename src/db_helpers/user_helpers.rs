use sqlx::SqlitePool;

use crate::{errors::RequestError, models::User};

/// Stores a new user. `password` must already be hashed.
pub async fn insert_user(
    pool: &SqlitePool,
    username: &str,
    password: &str,
) -> Result<User, RequestError> {
    let mut tx = pool.begin().await?;
    let user = sqlx::query_as::<_, User>(
        r#"
        INSERT INTO users (username, password)
        VALUES (?1, ?2)
        RETURNING id, username, password, created_at
        "#,
    )
    .bind(username)
    .bind(password)
    .fetch_one(&mut tx)
    .await?;
    tx.commit().await?;
    Ok(user)
}
