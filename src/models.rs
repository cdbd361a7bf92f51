use std::fmt;

use chrono::{DateTime, NaiveDateTime, Utc};

const POST_DISPLAY_CHARS: usize = 15;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub password: String,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Group {
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub description: String,
}

/// A post joined with its author's username and, when set, its group.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Post {
    pub id: i64,
    pub text: String,
    pub pub_date: DateTime<Utc>,
    pub author_id: i64,
    pub author_username: String,
    pub group_id: Option<i64>,
    pub group_title: Option<String>,
    pub group_slug: Option<String>,
    pub group_description: Option<String>,
    pub image: Option<String>,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Comment {
    pub id: i64,
    pub text: String,
    pub created: DateTime<Utc>,
    pub post_id: i64,
    pub author_id: i64,
    pub author_username: String,
}

#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Follow {
    pub id: i64,
    pub user_id: i64,
    pub author_id: i64,
}

impl Post {
    pub fn group(&self) -> Option<Group> {
        match (self.group_id, &self.group_title, &self.group_slug) {
            (Some(id), Some(title), Some(slug)) => Some(Group {
                id,
                title: title.clone(),
                slug: slug.clone(),
                description: self.group_description.clone().unwrap_or_default(),
            }),
            _ => None,
        }
    }
}

impl fmt::Display for Post {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let head: String = self.text.chars().take(POST_DISPLAY_CHARS).collect();
        f.write_str(&head)
    }
}

impl fmt::Display for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.title)
    }
}

impl fmt::Display for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.username)
    }
}
