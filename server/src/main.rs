//! HBnB API server.
//!
//! Run from repo root: `cargo run -p hbnb-server`. Configuration comes from the
//! environment (and `.env`); without `DATABASE_URL` data lives in memory.

use hbnb::{
    app, ensure_database_exists, ensure_tables, AppConfig, AppState, HbnbFacade, Repositories, StorageBackend,
    TokenService,
};
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("hbnb=info,tower_http=info")),
        )
        .init();

    let config = AppConfig::from_env()?;

    let (repos, pool) = match &config.storage {
        StorageBackend::Memory => {
            tracing::info!("using in-memory storage");
            (Repositories::in_memory(), None)
        }
        StorageBackend::Postgres { database_url } => {
            ensure_database_exists(database_url).await?;
            let pool = sqlx::postgres::PgPoolOptions::new()
                .max_connections(config.max_connections)
                .connect(database_url)
                .await?;
            ensure_tables(&pool, &config.schema).await?;
            tracing::info!(schema = %config.schema, "using PostgreSQL storage");
            (Repositories::postgres(pool.clone(), &config.schema), Some(pool))
        }
    };

    let facade = HbnbFacade::new(repos);
    if let Some(seed) = &config.admin {
        facade.ensure_admin(seed.to_new_user()).await?;
    }

    let state = AppState::new(facade, TokenService::new(&config.jwt_secret, config.token_ttl), pool);
    let router = app(state, config.body_limit);

    let listener = TcpListener::bind(config.bind_addr).await?;
    tracing::info!("HBnB listening on http://{}", listener.local_addr()?);
    axum::serve(listener, router).await?;
    Ok(())
}
