use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api_rest::{AppState, router};
use hms_core::config::{database_path_from_env_value, outline_path_from_env_value};
use hms_core::{CodeStore, CoreConfig, ImportService, SqliteCodeStore};

/// Main entry point for the HMS application
///
/// Opens the classification database, optionally seeds it from an ICD-10 outline, and
/// serves the REST API.
///
/// # Environment Variables
/// - `HMS_REST_ADDR`: REST server address (default: "0.0.0.0:3000")
/// - `HMS_DATABASE_PATH`: SQLite database file (default: "hms.db")
/// - `ICD10_OUTLINE_PATH`: outline to import before serving (optional)
///
/// # Returns
/// * `Ok(())` - If the server starts and runs successfully
/// * `Err(anyhow::Error)` - If the database cannot be opened or the server fails
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("hms=info".parse()?)
                .add_directive("api_rest=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let rest_addr = std::env::var("HMS_REST_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());
    let database_path = database_path_from_env_value(std::env::var("HMS_DATABASE_PATH").ok());
    let outline_path = outline_path_from_env_value(std::env::var("ICD10_OUTLINE_PATH").ok());

    let cfg = CoreConfig::new(database_path)?;
    tracing::info!("++ Opening code database at {}", cfg.database_path().display());
    let store: Arc<dyn CodeStore> = Arc::new(SqliteCodeStore::open(cfg.database_path())?);

    if let Some(outline_path) = outline_path {
        let importer = ImportService::new(store.clone());
        let summary =
            tokio::task::spawn_blocking(move || importer.import_path(&outline_path)).await??;
        tracing::info!("++ Seeded ICD-10 codes: {}", summary);
    }

    tracing::info!("++ Starting HMS REST on {}", rest_addr);

    let app = router(AppState::new(&cfg, store));
    let listener = tokio::net::TcpListener::bind(&rest_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
