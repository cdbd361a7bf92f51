#![allow(dead_code)]

use std::sync::Arc;

use postboard::{
    get_jwt_token, get_random_free_port, init_db, insert_group, insert_post_in_db, insert_user,
    make_router, with_context, AppConfig, AppContext, Group, User,
};
use reqwest::{redirect::Policy, Client, RequestBuilder, Response, StatusCode};

pub struct TestApp {
    pub address: String,
    pub context: Arc<AppContext>,
    pub client: Client,
}

pub async fn spawn_app() -> TestApp {
    spawn_app_with(AppConfig::for_tests()).await
}

pub async fn spawn_app_with(config: AppConfig) -> TestApp {
    let pool = init_db(&config.database_url).await.unwrap();
    let context = Arc::new(AppContext::new(pool, config));
    let (_, address) = get_random_free_port();
    let app = with_context(make_router(), context.clone());
    tokio::spawn(axum::Server::bind(&address).serve(app.into_make_service()));

    let client = Client::builder()
        .redirect(Policy::none())
        .build()
        .unwrap();
    TestApp {
        address: format!("http://{}", address),
        context,
        client,
    }
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }

    pub fn pool(&self) -> &sqlx::SqlitePool {
        &self.context.pool
    }

    pub async fn create_user(&self, username: &str) -> TestUser {
        let user = insert_user(self.pool(), username, "not-a-real-hash")
            .await
            .unwrap();
        let token = get_jwt_token(&self.context.config.jwt_secret, user.id).unwrap();
        TestUser { user, token }
    }

    pub async fn create_group(&self, title: &str, slug: &str) -> Group {
        insert_group(self.pool(), title, slug, "Описание группы")
            .await
            .unwrap()
    }

    pub async fn create_post(&self, author: &TestUser, text: &str, group: Option<&Group>) -> i64 {
        insert_post_in_db(self.pool(), author.user.id, text, group.map(|g| g.id), None)
            .await
            .unwrap()
    }

    pub fn get(&self, path: &str) -> RequestBuilder {
        self.client.get(self.url(path))
    }

    pub fn post(&self, path: &str) -> RequestBuilder {
        self.client.post(self.url(path))
    }

    pub fn get_as(&self, user: &TestUser, path: &str) -> RequestBuilder {
        self.get(path).header("Authorization", user.header())
    }

    pub fn post_as(&self, user: &TestUser, path: &str) -> RequestBuilder {
        self.post(path).header("Authorization", user.header())
    }
}

pub struct TestUser {
    pub user: User,
    pub token: String,
}

impl TestUser {
    pub fn id(&self) -> i64 {
        self.user.id
    }

    pub fn username(&self) -> &str {
        &self.user.username
    }

    pub fn header(&self) -> String {
        format!("Token {}", self.token)
    }
}

/// Asserts a 303 redirect to `expected`.
pub fn assert_redirect(response: &Response, expected: &str) {
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let location = response
        .headers()
        .get("location")
        .expect("redirect without Location")
        .to_str()
        .unwrap();
    assert_eq!(location, expected);
}
