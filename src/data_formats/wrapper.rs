use serde::{Deserialize, Serialize};

use crate::pagination::Page;

use super::response::{
    AuthorResponse, CommentResponse, FormResponse, GroupResponse, PostResponse,
};

pub type PostPage = Page<PostResponse>;

#[derive(Debug, Deserialize, Serialize)]
pub struct UserWrapper<T> {
    pub user: T,
}

// ----------------- Page Contexts -----------------

#[derive(Debug, Deserialize, Serialize)]
pub struct IndexContext {
    pub page_obj: PostPage,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct GroupContext {
    pub group: GroupResponse,
    pub page_obj: PostPage,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct ProfileContext {
    pub author: AuthorResponse,
    /// Whether the viewer follows `author`; always false for anonymous viewers.
    pub following: bool,
    pub page_obj: PostPage,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct FollowContext {
    pub page_obj: PostPage,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct PostDetailContext {
    pub post: PostResponse,
    pub author_posts_count: i64,
    pub comments: Vec<CommentResponse>,
    pub form: FormResponse,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct PostFormContext {
    pub form: FormResponse,
    pub is_edit: bool,
    #[serde(default)]
    pub post_id: Option<i64>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct LoginFormContext {
    pub form: FormResponse,
    pub next: Option<String>,
}

impl<T> UserWrapper<T> {
    pub fn wrap_with_user_data(request: T) -> UserWrapper<T> {
        UserWrapper { user: request }
    }
}
