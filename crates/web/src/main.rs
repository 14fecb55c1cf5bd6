use anyhow::Context;
use storage::Database;
use utoipa::OpenApi;

mod config;
mod error;
mod features;
mod routes;

use config::Config;

#[derive(OpenApi)]
#[openapi(
    paths(
        features::bestlist::handlers::get_bestlist,
        features::disciplines::handlers::list_disciplines,
    ),
    components(
        schemas(
            storage::dto::bestlist::BestlistResponse,
            storage::dto::bestlist::BestlistConfiguration,
            storage::dto::bestlist::BestlistEntry,
            storage::dto::bestlist::AthleteInfo,
            storage::dto::bestlist::ClubInfo,
            storage::dto::bestlist::EventInfo,
            storage::dto::bestlist::ResultInfo,
            storage::dto::discipline::DisciplineListResponse,
            storage::dto::discipline::DisciplineSummary,
        )
    ),
    tags(
        (name = "bestlist", description = "Ranked results of a discipline"),
        (name = "disciplines", description = "Disciplines with stored results"),
    )
)]
struct ApiDoc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .init();

    tracing::info!("Starting track insights API");

    let config = Config::from_env().context("Failed to load API configuration")?;
    tracing::info!("Configuration loaded successfully");

    tracing::info!(
        "Connecting to database at: {}",
        config
            .database_url
            .split('@')
            .next_back()
            .unwrap_or("unknown")
    );
    let db = Database::new(&config.database_url)
        .await
        .context("Failed to initialize database")?;
    tracing::info!("Database connection established");

    tracing::info!("Running database migrations");
    db.run_migrations()
        .await
        .context("Failed to run migrations")?;
    tracing::info!("Database migrations completed successfully");

    let bind_address = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("Failed to bind to {bind_address}"))?;

    tracing::info!("Starting server at http://{}", bind_address);
    tracing::info!(
        "Swagger UI available at http://{}/swagger-ui/",
        bind_address
    );

    axum::serve(listener, routes::app(db))
        .await
        .context("Server error")?;

    Ok(())
}
