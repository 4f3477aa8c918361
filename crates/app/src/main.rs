use migration::{Migrator, MigratorTrait};
use server::ServerConfig;

mod settings;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let settings = settings::Settings::new()?;

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "kgschool={level},server={level},engine={level}",
            level = settings.app.level
        ))
        .init();

    let db = connect(&settings.database_url()).await?;
    let engine = engine::Engine::builder().database(db).build().await?;

    let config = ServerConfig {
        bind: settings
            .server
            .bind
            .clone()
            .unwrap_or_else(|| "127.0.0.1".to_string()),
        port: settings.server.port,
        due_day: settings.billing.due_day.clamp(1, 28),
    };
    tracing::info!(due_day = config.due_day, "starting finance server");
    server::run(engine, config).await;

    Ok(())
}

async fn connect(
    url: &str,
) -> Result<sea_orm::DatabaseConnection, Box<dyn std::error::Error + Send + Sync>> {
    let database = sea_orm::Database::connect(url).await?;
    Migrator::up(&database, None).await?;
    Ok(database)
}
