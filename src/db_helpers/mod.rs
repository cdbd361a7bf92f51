use sqlx::SqlitePool;

use crate::{errors::RequestError, models::User};

mod comment_helpers;
mod follow_helpers;
mod group_helpers;
mod post_helpers;
mod user_helpers;

pub use comment_helpers::*;
pub use follow_helpers::*;
pub use group_helpers::*;
pub use post_helpers::*;
pub use user_helpers::*;

// ----------------- Helper Functions -----------------

const USER_COLUMNS: &str = "id, username, password, created_at";

pub async fn get_user_by_username(
    pool: &SqlitePool,
    username: &str,
) -> Result<Option<User>, RequestError> {
    let query = format!("SELECT {} FROM users WHERE username = ?1", USER_COLUMNS);
    let result = sqlx::query_as::<_, User>(&query)
        .bind(username)
        .fetch_optional(pool)
        .await?;
    Ok(result)
}

pub async fn get_user_by_id(pool: &SqlitePool, id: i64) -> Result<Option<User>, RequestError> {
    let query = format!("SELECT {} FROM users WHERE id = ?1", USER_COLUMNS);
    let result = sqlx::query_as::<_, User>(&query)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(result)
}

/// Like `get_user_by_username`, but a missing user is a 404.
pub async fn get_author_or_404(pool: &SqlitePool, username: &str) -> Result<User, RequestError> {
    match get_user_by_username(pool, username).await? {
        Some(user) => Ok(user),
        None => Err(RequestError::NotFound),
    }
}
