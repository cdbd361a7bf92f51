mod common;

use common::{assert_redirect, spawn_app};
use postboard::{LoginFormContext, UserResponse, UserWrapper};
use reqwest::StatusCode;
use serde_json::json;

#[tokio::test]
async fn signup_then_login_then_create_post() {
    let app = spawn_app().await;

    let response = app
        .post("/auth/signup/")
        .json(&json!({ "username": "writer", "password": "correct horse" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let signed_up: UserWrapper<UserResponse> = response.json().await.unwrap();
    assert_eq!(signed_up.user.username, "writer");

    let response = app
        .post("/auth/login/")
        .json(&json!({ "username": "writer", "password": "correct horse" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let logged_in: UserWrapper<UserResponse> = response.json().await.unwrap();

    let response = app
        .post("/create/")
        .header("Authorization", format!("Token {}", logged_in.user.token))
        .json(&json!({ "text": "Первый пост" }))
        .send()
        .await
        .unwrap();
    assert_redirect(&response, "/profile/writer/");
}

#[tokio::test]
async fn login_rejects_wrong_password_and_unknown_user() {
    let app = spawn_app().await;
    app.post("/auth/signup/")
        .json(&json!({ "username": "writer", "password": "correct horse" }))
        .send()
        .await
        .unwrap();

    for (username, password) in [("writer", "battery staple"), ("nobody", "correct horse")] {
        let response = app
            .post("/auth/login/")
            .json(&json!({ "username": username, "password": password }))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }
}

#[tokio::test]
async fn signup_rejects_taken_or_blank_username() {
    let app = spawn_app().await;
    app.create_user("writer").await;

    for username in ["writer", "  "] {
        let response = app
            .post("/auth/signup/")
            .json(&json!({ "username": username, "password": "pw" }))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY, "{:?}", username);
    }
}

#[tokio::test]
async fn login_page_echoes_next() {
    let app = spawn_app().await;
    let context: LoginFormContext = app
        .get("/auth/login/?next=/create/")
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(context.next.as_deref(), Some("/create/"));
    assert!(context.form.field("password").is_some());
}
