use sea_orm::{ConnectOptions, Database};
use sea_orm_migration::MigratorTrait;
use series_catalog::{
    accounts::{self, UserRepository},
    catalog::{SeriesManager, SeriesRepository},
    config::Config,
    migration::Migrator,
    web,
};
use std::time::Duration;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::from_env()?;

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::new(&config.log_filter))
        .init();

    info!("Connecting to database: {}", config.database_url);

    let mut opt = ConnectOptions::new(config.database_url.clone());
    opt.max_connections(10)
        .min_connections(1)
        .connect_timeout(Duration::from_secs(10))
        .acquire_timeout(Duration::from_secs(10))
        .sqlx_logging(false);
    let db = Database::connect(opt).await?;
    Migrator::up(&db, None).await?;

    info!("Connected to database");

    let users = UserRepository::new(db);
    if config.seed_admin {
        accounts::ensure_admin(&users).await?;
    }

    let catalog = SeriesManager::new(SeriesRepository::seeded());
    let state = web::AppState::new(catalog, users, config.bounds);
    let app = web::app(state, &config);

    info!("Server starting on http://{}", config.bind_addr);

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    axum::serve(listener, app.into_make_service()).await?;

    Ok(())
}
