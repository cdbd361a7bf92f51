use sqlx::SqlitePool;

use crate::{errors::RequestError, models::Group};

pub async fn insert_group(
    pool: &SqlitePool,
    title: &str,
    slug: &str,
    description: &str,
) -> Result<Group, RequestError> {
    let group = sqlx::query_as::<_, Group>(
        r#"
        INSERT INTO post_groups (title, slug, description)
        VALUES (?1, ?2, ?3)
        RETURNING id, title, slug, description
        "#,
    )
    .bind(title)
    .bind(slug)
    .bind(description)
    .fetch_one(pool)
    .await?;
    Ok(group)
}

pub async fn get_group_by_slug_in_db(pool: &SqlitePool, slug: &str) -> Result<Group, RequestError> {
    let group = sqlx::query_as::<_, Group>(
        "SELECT id, title, slug, description FROM post_groups WHERE slug = ?1",
    )
    .bind(slug)
    .fetch_optional(pool)
    .await?;
    match group {
        Some(group) => Ok(group),
        None => Err(RequestError::NotFound),
    }
}

pub async fn get_group_by_id_in_db(
    pool: &SqlitePool,
    id: i64,
) -> Result<Option<Group>, RequestError> {
    let group = sqlx::query_as::<_, Group>(
        "SELECT id, title, slug, description FROM post_groups WHERE id = ?1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(group)
}

/// Every group, alphabetically; these are the choices of the post form.
pub async fn list_groups_in_db(pool: &SqlitePool) -> Result<Vec<Group>, RequestError> {
    let groups = sqlx::query_as::<_, Group>(
        "SELECT id, title, slug, description FROM post_groups ORDER BY title, id",
    )
    .fetch_all(pool)
    .await?;
    Ok(groups)
}
