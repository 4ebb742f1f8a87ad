use anyhow::Result;
use dotenvy::dotenv;

pub mod ai;
pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod recipe;
mod system_info;
mod text_utils;


pub use api::{router as api_router, ApiConfig, AppState};
pub use config::Config;
pub use system_info::{build_info, get_system_info, BuildInfo};

const DB_MAX_CONNECTIONS: u32 = 5;

// ──────────────────────────────────────────────────────────────
// Main application setup
// ──────────────────────────────────────────────────────────────

pub async fn run() -> Result<()> {
    // Load .env file if it exists (for local development)
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    tracing::info!("Starting {}", get_system_info());

    let config = Config::from_env();

    let db_url = db::prepare_sqlite_url(&config.db_url);
    tracing::info!("Connecting to database at: {}", &db_url);
    let db = db::Database::open(&db_url, DB_MAX_CONNECTIONS).await?;
    tracing::info!("Database ready.");

    let generator = match &config.ai {
        Some(ai) => {
            tracing::info!(model = %ai.gpt_model, format = ?ai.format, "Recipe model configured");
            Some(ai::RecipeGenerator::from_config(ai))
        }
        None => {
            tracing::warn!("OPENAI_API_KEY not set, every recipe will be the fallback recipe");
            None
        }
    };

    let state = AppState {
        db,
        generator,
        fallback_on_failure: config.fallback_on_failure,
    };
    let app = api_router(
        state,
        ApiConfig {
            rate_limit_per_second: config.rate_limit_per_second,
        },
    );

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, "HTTP API listening");
    axum::serve(listener, app).await?;

    Ok(())
}
