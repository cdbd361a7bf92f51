use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{Comment, Group, Post, User};

#[derive(Deserialize, Serialize, Debug)]
pub struct UserResponse {
    pub username: String,
    pub token: String,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct AuthorResponse {
    pub id: i64,
    pub username: String,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct GroupResponse {
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub description: String,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct PostResponse {
    pub id: i64,
    pub text: String,
    pub pub_date: DateTime<Utc>,
    pub author: AuthorResponse,
    pub group: Option<GroupResponse>,
    pub image: Option<String>,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct CommentResponse {
    pub id: i64,
    pub text: String,
    pub created: DateTime<Utc>,
    pub author: AuthorResponse,
}

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Char,
    Choice,
    Image,
    Password,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Choice {
    pub value: i64,
    pub label: String,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct FormField {
    pub name: String,
    pub kind: FieldKind,
    pub required: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub choices: Vec<Choice>,
    #[serde(default)]
    pub initial: Option<serde_json::Value>,
}

/// What a template needs to draw a form.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct FormResponse {
    pub fields: Vec<FormField>,
}

impl UserResponse {
    pub fn new(User { username, .. }: User, token: String) -> Self {
        UserResponse { username, token }
    }
}

impl AuthorResponse {
    pub fn new(User { id, username, .. }: &User) -> Self {
        AuthorResponse {
            id: *id,
            username: username.clone(),
        }
    }
}

impl GroupResponse {
    pub fn new(
        Group {
            id,
            title,
            slug,
            description,
        }: Group,
    ) -> Self {
        GroupResponse {
            id,
            title,
            slug,
            description,
        }
    }
}

impl PostResponse {
    pub fn new(post: Post) -> Self {
        let group = post.group().map(GroupResponse::new);
        let Post {
            id,
            text,
            pub_date,
            author_id,
            author_username,
            image,
            ..
        } = post;
        PostResponse {
            id,
            text,
            pub_date,
            author: AuthorResponse {
                id: author_id,
                username: author_username,
            },
            group,
            image,
        }
    }
}

impl CommentResponse {
    pub fn new(
        Comment {
            id,
            text,
            created,
            author_id,
            author_username,
            ..
        }: Comment,
    ) -> Self {
        CommentResponse {
            id,
            text,
            created,
            author: AuthorResponse {
                id: author_id,
                username: author_username,
            },
        }
    }
}

impl FormField {
    fn new(name: &str, kind: FieldKind, required: bool) -> Self {
        FormField {
            name: name.to_owned(),
            kind,
            required,
            choices: vec![],
            initial: None,
        }
    }

    fn with_initial(mut self, initial: Option<serde_json::Value>) -> Self {
        self.initial = initial;
        self
    }
}

impl FormResponse {
    pub fn field(&self, name: &str) -> Option<&FormField> {
        self.fields.iter().find(|field| field.name == name)
    }

    /// The create/edit post form. `post` fills in initial values when editing.
    pub fn post_form(groups: Vec<Group>, post: Option<&Post>) -> Self {
        let mut group_field = FormField::new("group", FieldKind::Choice, false)
            .with_initial(post.and_then(|p| p.group_id).map(Into::into));
        group_field.choices = groups
            .into_iter()
            .map(|group| Choice {
                value: group.id,
                label: group.to_string(),
            })
            .collect();

        FormResponse {
            fields: vec![
                FormField::new("text", FieldKind::Char, true)
                    .with_initial(post.map(|p| p.text.clone().into())),
                group_field,
                FormField::new("image", FieldKind::Image, false)
                    .with_initial(post.and_then(|p| p.image.clone()).map(Into::into)),
            ],
        }
    }

    pub fn comment_form() -> Self {
        FormResponse {
            fields: vec![FormField::new("text", FieldKind::Char, true)],
        }
    }

    pub fn login_form() -> Self {
        FormResponse {
            fields: vec![
                FormField::new("username", FieldKind::Char, true),
                FormField::new("password", FieldKind::Password, true),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_post_form_lists_group_choices() {
        let groups = vec![Group {
            id: 3,
            title: "Первая группа".to_owned(),
            slug: "test-slug".to_owned(),
            description: "Описание группы".to_owned(),
        }];
        let form = FormResponse::post_form(groups, None);

        assert_eq!(form.field("text").unwrap().kind, FieldKind::Char);
        assert!(form.field("text").unwrap().required);
        let group = form.field("group").unwrap();
        assert_eq!(group.kind, FieldKind::Choice);
        assert!(!group.required);
        assert_eq!(
            group.choices,
            vec![Choice {
                value: 3,
                label: "Первая группа".to_owned()
            }]
        );
        assert!(form.field("image").is_some());
    }
}
