use anyhow::Context;
use trivia_api::db::{establish_connection, run_migrations};
use trivia_api::server::app::run_server;
use trivia_api::settings::Settings;
use trivia_api::telemetry::init_tracing;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let settings = Settings::load().context("Failed to load configuration")?;
    let pool = establish_connection(&settings.database)
        .await
        .with_context(|| {
            format!(
                "Cannot open database at {}",
                settings.database.path.display()
            )
        })?;

    tracing::info!("Running db migrations...");
    run_migrations(&pool)
        .await
        .context("Failed to run database migrations")?;

    run_server(pool, &settings.server).await
}
