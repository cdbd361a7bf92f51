mod authentication;
mod cache;
mod config;
mod data_formats;
mod db_helpers;
mod errors;
mod handlers;
mod models;
mod pagination;

use anyhow::Context;
pub use anyhow::Result;
pub use authentication::{get_jwt_token, AuthUser, LoginRequired, MaybeUser};
use axum::http::StatusCode;
use axum::{routing::*, Extension, Json, Router};
pub use cache::IndexCache;
pub use config::AppConfig;
pub use data_formats::*;
pub use db_helpers::*;
pub use errors::{login_redirect_url, RequestError, LOGIN_URL};
pub use models::{Comment, Follow, Group, Post, User};
pub use pagination::{parse_page_number, Page, PageWindow, Paginator};
use handlers::*;
use sqlx::{migrate::MigrateDatabase, sqlite::SqlitePoolOptions, Sqlite, SqlitePool};
use std::{
    net::{SocketAddr, TcpListener},
    sync::Arc,
};
use tower_http::trace::TraceLayer;
pub type JsonResponse<T> = (StatusCode, Json<T>);

/// Everything a handler needs besides the request itself.
pub struct AppContext {
    pub pool: SqlitePool,
    pub config: AppConfig,
    pub index_cache: IndexCache,
}

impl AppContext {
    pub fn new(pool: SqlitePool, config: AppConfig) -> Self {
        let index_cache = IndexCache::new(config.index_cache_ttl);
        Self {
            pool,
            config,
            index_cache,
        }
    }

    pub fn paginator(&self) -> Paginator {
        Paginator::new(self.config.page_size)
    }
}

pub async fn run_app(app: Router, config: AppConfig) -> Result<()> {
    let db = init_db(&config.database_url).await?;
    let address = config.bind_address;
    let context = Arc::new(AppContext::new(db, config));
    let app = with_context(app, context);
    tracing::info!(%address, "server started");
    axum::Server::bind(&address)
        .serve(app.into_make_service())
        .await?;
    Ok(())
}

/// Attaches the shared context and request tracing to a router.
pub fn with_context(app: Router, context: Arc<AppContext>) -> Router {
    app.layer(Extension(context))
        .layer(TraceLayer::new_for_http())
}

pub async fn init_db(db_url: &str) -> Result<SqlitePool> {
    let pool = if db_url.contains(":memory:") {
        // Every connection to an in-memory database sees its own empty
        // database, so the pool holds exactly one that never expires.
        SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect(db_url)
            .await?
    } else {
        if !Sqlite::database_exists(db_url).await.unwrap_or(false) {
            tracing::info!(db_url, "creating database");
            Sqlite::create_database(db_url)
                .await
                .with_context(|| format!("Failed to create database {}", db_url))?;
        } else {
            tracing::info!(db_url, "database already exists");
        }
        SqlitePool::connect(db_url).await?
    };
    tracing::info!("running migrations");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run migrations")?;
    tracing::info!("migrations completed");
    Ok(pool)
}

pub fn get_random_free_port() -> (u16, SocketAddr) {
    let listener = TcpListener::bind("localhost:0").unwrap();
    match listener.local_addr() {
        Ok(addr) => (addr.port(), addr),
        Err(_) => panic!("Could not get a free port"),
    }
}

pub fn make_router() -> Router {
    Router::new()
        .route("/check_health", get(alive))
        .route("/", get(index))
        .route("/group/:slug/", get(group_posts))
        .route("/profile/:username/", get(profile))
        .route("/profile/:username/follow/", get(profile_follow))
        .route("/profile/:username/unfollow/", get(profile_unfollow))
        .route("/follow/", get(follow_index))
        .route("/create/", get(post_create_form).post(post_create))
        .route("/posts/:post_id/", get(post_detail))
        .route("/posts/:post_id/edit/", get(post_edit_form).post(post_edit))
        .route("/posts/:post_id/comment/", post(add_comment))
        .route("/auth/signup/", post(signup))
        .route("/auth/login/", get(login_form).post(login))
        .fallback(not_found)
}
