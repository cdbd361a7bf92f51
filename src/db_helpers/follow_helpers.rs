use sqlx::SqlitePool;

use crate::{errors::RequestError, models::Follow};

/// Plain insert. A second call with the same pair fails with a UNIQUE
/// constraint violation; request handlers use `follow_author_in_db` instead.
pub async fn insert_follow(
    pool: &SqlitePool,
    user_id: i64,
    author_id: i64,
) -> Result<Follow, RequestError> {
    let follow = sqlx::query_as::<_, Follow>(
        r#"
        INSERT INTO follows (user_id, author_id)
        VALUES (?1, ?2)
        RETURNING id, user_id, author_id
        "#,
    )
    .bind(user_id)
    .bind(author_id)
    .fetch_one(pool)
    .await?;
    Ok(follow)
}

/// Get-or-create. Returns the relation and whether it was created now.
pub async fn follow_author_in_db(
    pool: &SqlitePool,
    user_id: i64,
    author_id: i64,
) -> Result<(Follow, bool), RequestError> {
    let mut tx = pool.begin().await?;
    let existing = sqlx::query_as::<_, Follow>(
        "SELECT id, user_id, author_id FROM follows WHERE user_id = ?1 AND author_id = ?2",
    )
    .bind(user_id)
    .bind(author_id)
    .fetch_optional(&mut tx)
    .await?;

    if let Some(follow) = existing {
        tx.commit().await?;
        return Ok((follow, false));
    }

    let inserted = sqlx::query_as::<_, Follow>(
        r#"
        INSERT INTO follows (user_id, author_id)
        VALUES (?1, ?2)
        ON CONFLICT (user_id, author_id) DO NOTHING
        RETURNING id, user_id, author_id
        "#,
    )
    .bind(user_id)
    .bind(author_id)
    .fetch_optional(&mut tx)
    .await?;
    tx.commit().await?;

    match inserted {
        Some(follow) => Ok((follow, true)),
        // Lost a race with a concurrent follow of the same pair.
        None => {
            let follow = get_follow_in_db(pool, user_id, author_id)
                .await?
                .ok_or(RequestError::ServerError)?;
            Ok((follow, false))
        }
    }
}

/// Returns whether a relation existed.
pub async fn unfollow_author_in_db(
    pool: &SqlitePool,
    user_id: i64,
    author_id: i64,
) -> Result<bool, RequestError> {
    let result = sqlx::query("DELETE FROM follows WHERE user_id = ?1 AND author_id = ?2")
        .bind(user_id)
        .bind(author_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn get_follow_in_db(
    pool: &SqlitePool,
    user_id: i64,
    author_id: i64,
) -> Result<Option<Follow>, RequestError> {
    let follow = sqlx::query_as::<_, Follow>(
        "SELECT id, user_id, author_id FROM follows WHERE user_id = ?1 AND author_id = ?2",
    )
    .bind(user_id)
    .bind(author_id)
    .fetch_optional(pool)
    .await?;
    Ok(follow)
}

pub async fn is_following_in_db(
    pool: &SqlitePool,
    user_id: Option<i64>,
    author_id: i64,
) -> Result<bool, RequestError> {
    match user_id {
        Some(user_id) => Ok(get_follow_in_db(pool, user_id, author_id).await?.is_some()),
        None => Ok(false),
    }
}

pub async fn count_follows_in_db(
    pool: &SqlitePool,
    user_id: i64,
    author_id: i64,
) -> Result<i64, RequestError> {
    let count = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM follows WHERE user_id = ?1 AND author_id = ?2",
    )
    .bind(user_id)
    .bind(author_id)
    .fetch_one(pool)
    .await?;
    Ok(count)
}
