use chrono::Utc;
use sqlx::SqlitePool;

use crate::{errors::RequestError, models::Comment};

pub async fn add_comment_to_post_in_db(
    pool: &SqlitePool,
    author_id: i64,
    post_id: i64,
    text: &str,
) -> Result<i64, RequestError> {
    let mut tx = pool.begin().await?;
    let id = sqlx::query_scalar::<_, i64>(
        r#"
        INSERT INTO comments (text, created, author_id, post_id)
        VALUES (?1, ?2, ?3, ?4)
        RETURNING id
        "#,
    )
    .bind(text)
    .bind(Utc::now())
    .bind(author_id)
    .bind(post_id)
    .fetch_one(&mut tx)
    .await?;
    tx.commit().await?;
    Ok(id)
}

/// Comments of a post in the order they were written.
pub async fn get_comments_for_post_in_db(
    pool: &SqlitePool,
    post_id: i64,
) -> Result<Vec<Comment>, RequestError> {
    let result = sqlx::query_as::<_, Comment>(
        r#"
        SELECT comments.id        AS "id",
               comments.text      AS "text",
               comments.created   AS "created",
               comments.post_id   AS "post_id",
               comments.author_id AS "author_id",
               users.username     AS "author_username"
        FROM   comments
            JOIN users
                ON users.id = comments.author_id
        WHERE  comments.post_id = ?1
        ORDER  BY comments.created, comments.id
        "#,
    )
    .bind(post_id)
    .fetch_all(pool)
    .await?;
    Ok(result)
}

pub async fn count_comments_in_db(pool: &SqlitePool, post_id: i64) -> Result<i64, RequestError> {
    let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM comments WHERE post_id = ?1")
        .bind(post_id)
        .fetch_one(pool)
        .await?;
    Ok(count)
}
