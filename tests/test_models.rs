mod common;

use common::spawn_app;
use postboard::{
    count_follows_in_db, follow_author_in_db, get_post_by_id_in_db, get_user_by_username,
    insert_follow, insert_user,
};

#[tokio::test]
async fn duplicate_follow_violates_unique_constraint() {
    let app = spawn_app().await;
    let user = app.create_user("user").await;
    let author = app.create_user("author").await;

    insert_follow(app.pool(), user.id(), author.id()).await.unwrap();
    assert_eq!(
        count_follows_in_db(app.pool(), user.id(), author.id())
            .await
            .unwrap(),
        1
    );

    let error = insert_follow(app.pool(), user.id(), author.id())
        .await
        .unwrap_err();
    assert!(error.is_unique_violation(), "{:?}", error);
}

#[tokio::test]
async fn follow_get_or_create_is_idempotent() {
    let app = spawn_app().await;
    let user = app.create_user("user").await;
    let author = app.create_user("author").await;

    let (first, created) = follow_author_in_db(app.pool(), user.id(), author.id())
        .await
        .unwrap();
    assert!(created);
    let (second, created) = follow_author_in_db(app.pool(), user.id(), author.id())
        .await
        .unwrap();
    assert!(!created);
    assert_eq!(first, second);
}

#[tokio::test]
async fn duplicate_username_violates_unique_constraint() {
    let app = spawn_app().await;
    insert_user(app.pool(), "auth", "hash").await.unwrap();
    let error = insert_user(app.pool(), "auth", "hash").await.unwrap_err();
    assert!(error.is_unique_violation());
}

#[tokio::test]
async fn post_display_uses_first_fifteen_chars() {
    let app = spawn_app().await;
    let user = app.create_user("auth").await;
    let post_id = app
        .create_post(&user, "Текст для поста в котором больше 15 символов.", None)
        .await;

    let post = get_post_by_id_in_db(app.pool(), post_id).await.unwrap();
    assert_eq!(post.to_string(), "Текст для поста");
    let author = get_user_by_username(app.pool(), "auth").await.unwrap().unwrap();
    assert_eq!(author.to_string(), "auth");
}

#[tokio::test]
async fn group_display_uses_title() {
    let app = spawn_app().await;
    let group = app.create_group("Тестовая группа", "Тестовый слаг").await;
    assert_eq!(group.to_string(), "Тестовая группа");
}
