use std::sync::Arc;

use futures::FutureExt;
use tracing::info;

use blog_api::{
    app,
    db::ConnectionCache,
    store::{postgres::PgStore, SharedStore},
    AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenv::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "blog_api=debug".into()),
        )
        .init();

    let database_url = std::env::var("DATABASE_URL")
        .unwrap_or_else(|_| "postgres://localhost:5432/blog".to_string());
    info!("Using database: {}", database_url);

    // The cache connects lazily on the first request and memoizes the handle
    // for the rest of the process lifetime.
    let cache = ConnectionCache::new(move || {
        let url = database_url.clone();
        async move {
            let store = PgStore::connect(&url).await?;
            Ok(Arc::new(store) as SharedStore)
        }
        .boxed()
    });

    let app_state = AppState {
        db: Arc::new(cache),
    };

    let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await?;
    info!("Server listening on {}", listener.local_addr()?);

    axum::serve(listener, app(app_state)).await?;

    Ok(())
}
