mod common;

use common::{assert_redirect, spawn_app};
use postboard::{count_follows_in_db, get_follow_in_db, insert_follow, FollowContext, ProfileContext};
use reqwest::StatusCode;

#[tokio::test]
async fn authorized_client_can_follow() {
    let app = spawn_app().await;
    let user = app.create_user("Rocket Racoon").await;
    let author = app.create_user("Tanos").await;
    assert!(get_follow_in_db(app.pool(), user.id(), author.id())
        .await
        .unwrap()
        .is_none());

    let response = app.get_as(&user, "/profile/Tanos/follow/").send().await.unwrap();

    assert_redirect(&response, "/profile/Tanos/");
    assert!(get_follow_in_db(app.pool(), user.id(), author.id())
        .await
        .unwrap()
        .is_some());

    let context: ProfileContext = app
        .get_as(&user, "/profile/Tanos/")
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(context.following);
}

#[tokio::test]
async fn guest_cannot_follow() {
    let app = spawn_app().await;
    let user = app.create_user("Rocket Racoon").await;
    let author = app.create_user("Tanos").await;

    let response = app.get("/profile/Tanos/follow/").send().await.unwrap();

    assert_redirect(&response, "/auth/login/?next=/profile/Tanos/follow/");
    assert_eq!(
        count_follows_in_db(app.pool(), user.id(), author.id())
            .await
            .unwrap(),
        0
    );
}

#[tokio::test]
async fn guest_redirect_keeps_encoded_username() {
    let app = spawn_app().await;
    app.create_user("Rocket Racoon").await;

    let response = app.get("/profile/Rocket%20Racoon/unfollow/").send().await.unwrap();

    assert_redirect(
        &response,
        "/auth/login/?next=/profile/Rocket%20Racoon/unfollow/",
    );
}

#[tokio::test]
async fn following_twice_keeps_one_relation() {
    let app = spawn_app().await;
    let user = app.create_user("Rocket Racoon").await;
    let author = app.create_user("Tanos").await;

    for _ in 0..2 {
        let response = app.get_as(&user, "/profile/Tanos/follow/").send().await.unwrap();
        assert_redirect(&response, "/profile/Tanos/");
        assert_eq!(
            count_follows_in_db(app.pool(), user.id(), author.id())
                .await
                .unwrap(),
            1
        );
    }
}

#[tokio::test]
async fn authorized_client_can_unfollow() {
    let app = spawn_app().await;
    let user = app.create_user("Rocket Racoon").await;
    let author = app.create_user("Tanos").await;
    insert_follow(app.pool(), user.id(), author.id()).await.unwrap();

    let response = app.get_as(&user, "/profile/Tanos/unfollow/").send().await.unwrap();

    assert_redirect(&response, "/profile/Tanos/");
    assert_eq!(
        count_follows_in_db(app.pool(), user.id(), author.id())
            .await
            .unwrap(),
        0
    );

    // Unfollowing someone you do not follow is harmless.
    let response = app.get_as(&user, "/profile/Tanos/unfollow/").send().await.unwrap();
    assert_redirect(&response, "/profile/Tanos/");
}

#[tokio::test]
async fn user_cannot_follow_themselves() {
    let app = spawn_app().await;
    let user = app.create_user("Tanos").await;

    let response = app.get_as(&user, "/profile/Tanos/follow/").send().await.unwrap();

    assert_redirect(&response, "/profile/Tanos/");
    assert_eq!(
        count_follows_in_db(app.pool(), user.id(), user.id())
            .await
            .unwrap(),
        0
    );
}

#[tokio::test]
async fn new_post_appears_in_follower_feed() {
    let app = spawn_app().await;
    let user = app.create_user("Rocket Racoon").await;
    let author = app.create_user("Tanos").await;
    app.get_as(&user, "/profile/Tanos/follow/").send().await.unwrap();

    let author_post = app.create_post(&author, "Пост для ленты", None).await;
    app.create_post(&user, "Пост для главной", None).await;

    let context: FollowContext = app
        .get_as(&user, "/follow/")
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(context.page_obj.len(), 1);
    assert_eq!(context.page_obj.object_list[0].id, author_post);
}

#[tokio::test]
async fn new_post_is_absent_for_non_follower() {
    let app = spawn_app().await;
    let follower = app.create_user("Rocket Racoon").await;
    let bystander = app.create_user("Groot").await;
    let author = app.create_user("Tanos").await;
    app.get_as(&follower, "/profile/Tanos/follow/").send().await.unwrap();
    app.create_post(&author, "Пост для ленты", None).await;

    let context: FollowContext = app
        .get_as(&bystander, "/follow/")
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(context.page_obj.len(), 0);

    let context: FollowContext = app
        .get_as(&follower, "/follow/")
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(context.page_obj.len(), 1);
}

#[tokio::test]
async fn follow_feed_updates_after_unfollow() {
    let app = spawn_app().await;
    let user = app.create_user("Rocket Racoon").await;
    let author = app.create_user("Tanos").await;
    app.create_post(&author, "Пост", None).await;

    app.get_as(&user, "/profile/Tanos/follow/").send().await.unwrap();
    let body: FollowContext = app.get_as(&user, "/follow/").send().await.unwrap().json().await.unwrap();
    assert_eq!(body.page_obj.len(), 1);

    app.get_as(&user, "/profile/Tanos/unfollow/").send().await.unwrap();
    let response = app.get_as(&user, "/follow/").send().await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body: FollowContext = response.json().await.unwrap();
    assert!(body.page_obj.is_empty());
}
