use chrono::Utc;
use sqlx::SqlitePool;

use crate::errors::RequestError;
use crate::models::Post;
use crate::pagination::{Page, Paginator};

const POST_QUERY: &str = r#"
            SELECT posts.id                 AS "id",
                   posts.text               AS "text",
                   posts.pub_date           AS "pub_date",
                   posts.author_id          AS "author_id",
                   users.username           AS "author_username",
                   posts.group_id           AS "group_id",
                   post_groups.title        AS "group_title",
                   post_groups.slug         AS "group_slug",
                   post_groups.description  AS "group_description",
                   posts.image              AS "image"
            FROM   posts
                JOIN users
                    ON users.id = posts.author_id
                LEFT JOIN post_groups
                    ON post_groups.id = posts.group_id
     "#;

// ?1 group, ?2 author, ?3 follower; a NULL disables that condition.
const FEED_FILTER: &str = r#"
            WHERE  ( posts.group_id = ?1
                    OR ?1 IS NULL )
                AND ( posts.author_id = ?2
                    OR ?2 IS NULL )
                AND ( ?3 IS NULL
                    OR posts.author_id IN (SELECT follows.author_id
                                           FROM   follows
                                           WHERE  follows.user_id = ?3) )
     "#;

/// Which posts a feed shows. The default filter matches every post.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PostFilter {
    pub group_id: Option<i64>,
    pub author_id: Option<i64>,
    /// Only posts by authors this user follows.
    pub followed_by: Option<i64>,
}

impl PostFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn group(group_id: i64) -> Self {
        Self {
            group_id: Some(group_id),
            ..Self::default()
        }
    }

    pub fn author(author_id: i64) -> Self {
        Self {
            author_id: Some(author_id),
            ..Self::default()
        }
    }

    pub fn followed_by(user_id: i64) -> Self {
        Self {
            followed_by: Some(user_id),
            ..Self::default()
        }
    }
}

pub async fn count_posts_in_db(pool: &SqlitePool, filter: PostFilter) -> Result<i64, RequestError> {
    let query = format!("SELECT COUNT(*) FROM posts {}", FEED_FILTER);
    let count = sqlx::query_scalar::<_, i64>(&query)
        .bind(filter.group_id)
        .bind(filter.author_id)
        .bind(filter.followed_by)
        .fetch_one(pool)
        .await?;
    Ok(count)
}

pub async fn list_posts_in_db(
    pool: &SqlitePool,
    filter: PostFilter,
    limit: i64,
    offset: i64,
) -> Result<Vec<Post>, RequestError> {
    let query = format!(
        "{} {} ORDER BY posts.pub_date DESC, posts.id DESC LIMIT ?4 OFFSET ?5",
        POST_QUERY, FEED_FILTER
    );
    let posts = sqlx::query_as::<_, Post>(&query)
        .bind(filter.group_id)
        .bind(filter.author_id)
        .bind(filter.followed_by)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await?;
    Ok(posts)
}

/// One page of a feed, newest first.
pub async fn get_feed_page_in_db(
    pool: &SqlitePool,
    filter: PostFilter,
    paginator: Paginator,
    requested_page: i64,
) -> Result<Page<Post>, RequestError> {
    let count = count_posts_in_db(pool, filter).await?;
    let window = paginator.window(count, requested_page);
    let posts = list_posts_in_db(pool, filter, window.limit, window.offset).await?;
    Ok(Page::new(posts, window))
}

pub async fn get_post_by_id_in_db(pool: &SqlitePool, id: i64) -> Result<Post, RequestError> {
    let query = format!("{} WHERE posts.id = ?1", POST_QUERY);
    let post = sqlx::query_as::<_, Post>(&query)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    match post {
        Some(post) => Ok(post),
        None => Err(RequestError::NotFound),
    }
}

pub async fn insert_post_in_db(
    pool: &SqlitePool,
    author_id: i64,
    text: &str,
    group_id: Option<i64>,
    image: Option<&str>,
) -> Result<i64, RequestError> {
    let mut tx = pool.begin().await?;
    let id = sqlx::query_scalar::<_, i64>(
        r#"
        INSERT INTO posts (text, pub_date, author_id, group_id, image)
        VALUES (?1, ?2, ?3, ?4, ?5)
        RETURNING id
        "#,
    )
    .bind(text)
    .bind(Utc::now())
    .bind(author_id)
    .bind(group_id)
    .bind(image)
    .fetch_one(&mut tx)
    .await?;
    tx.commit().await?;
    Ok(id)
}

/// Overwrites text, group and image. Only the author's own post is touched.
pub async fn update_post_in_db(
    pool: &SqlitePool,
    id: i64,
    author_id: i64,
    text: &str,
    group_id: Option<i64>,
    image: Option<&str>,
) -> Result<(), RequestError> {
    let mut tx = pool.begin().await?;
    let result = sqlx::query(
        r#"
        UPDATE posts SET text = ?1, group_id = ?2, image = ?3
        WHERE id = ?4 AND author_id = ?5
        "#,
    )
    .bind(text)
    .bind(group_id)
    .bind(image)
    .bind(id)
    .bind(author_id)
    .execute(&mut tx)
    .await?;

    if result.rows_affected() == 0 {
        return Err(RequestError::Forbidden);
    }

    tx.commit().await?;
    Ok(())
}

pub async fn delete_post_in_db(pool: &SqlitePool, id: i64) -> Result<(), RequestError> {
    let result = sqlx::query("DELETE FROM posts WHERE id = ?1")
        .bind(id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(RequestError::NotFound);
    }
    Ok(())
}
