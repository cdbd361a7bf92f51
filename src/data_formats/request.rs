use serde::{Deserialize, Serialize};

// ----------------- User Request -----------------
#[derive(Deserialize, Serialize, Debug)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Deserialize, Serialize, Debug)]
pub struct SignupRequest {
    pub username: String,
    pub password: String,
}

// ----------------- Post Request -----------------
/// Body of both post creation and post editing.
#[derive(Deserialize, Serialize, Debug, Default, Clone)]
pub struct PostRequest {
    pub text: String,
    #[serde(default)]
    pub group: Option<i64>,
    #[serde(default)]
    pub image: Option<String>,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct CommentRequest {
    pub text: String,
}
