use postboard::{make_router, run_app, AppConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "postboard=debug,tower_http=debug".into()),
        )
        .init();

    let config = AppConfig::from_env()?;
    let router = make_router();
    if let Err(error) = run_app(router, config).await {
        tracing::error!(%error, "server stopped");
        return Err(error);
    }
    Ok(())
}
