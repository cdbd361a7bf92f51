use std::{net::SocketAddr, str::FromStr, time::Duration};

use anyhow::{Context, Result};

const DEFAULT_PAGE_SIZE: i64 = 10;
const DEFAULT_INDEX_CACHE_SECONDS: u64 = 20;
const DEFAULT_BIND_ADDRESS: &str = "127.0.0.1:3001";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt_secret: String,
    /// Entities per page, shared by every feed.
    pub page_size: i64,
    pub index_cache_ttl: Duration,
    pub bind_address: SocketAddr,
}

impl AppConfig {
    /// Reads the configuration from the process environment.
    /// Call `dotenvy::dotenv()` first if a `.env` file should be honoured.
    pub fn from_env() -> Result<Self> {
        let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
        let jwt_secret = std::env::var("JWT_SECRET").context("JWT_SECRET must be set")?;
        let page_size = parse_var("PAGE_SIZE", DEFAULT_PAGE_SIZE)?;
        if page_size < 1 {
            anyhow::bail!("PAGE_SIZE must be a positive integer, got {}", page_size);
        }
        let cache_seconds = parse_var("INDEX_CACHE_SECONDS", DEFAULT_INDEX_CACHE_SECONDS)?;
        let bind_address = match std::env::var("BIND_ADDRESS") {
            Ok(value) => value,
            Err(_) => DEFAULT_BIND_ADDRESS.to_owned(),
        };
        let bind_address = bind_address
            .parse()
            .with_context(|| format!("BIND_ADDRESS is not a socket address: {}", bind_address))?;

        Ok(Self {
            database_url,
            jwt_secret,
            page_size,
            index_cache_ttl: Duration::from_secs(cache_seconds),
            bind_address,
        })
    }

    /// Configuration used by the test suites: in-memory database and defaults.
    pub fn for_tests() -> Self {
        Self {
            database_url: "sqlite::memory:".to_owned(),
            jwt_secret: "test-secret".to_owned(),
            page_size: DEFAULT_PAGE_SIZE,
            index_cache_ttl: Duration::from_secs(DEFAULT_INDEX_CACHE_SECONDS),
            bind_address: ([127, 0, 0, 1], 0).into(),
        }
    }
}

fn parse_var<T>(name: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(name) {
        Ok(value) => value
            .trim()
            .parse()
            .with_context(|| format!("{} has an invalid value: {}", name, value)),
        Err(_) => Ok(default),
    }
}
