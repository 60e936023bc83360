use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use refineon_basic::infrastructure::AppState;
use refineon_basic::{config, db, server};

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "refineon_basic=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = config::Config::from_env().expect("Invalid configuration");

    // Initialize database
    let db = db::init_db(&config.database_url)
        .await
        .expect("Failed to initialize database");

    let state = AppState::new(db, &config).expect("Failed to build application state");
    let app = server::build_router(state, &config.cors_allowed_origins);

    tracing::info!("Starting {}", config.app_name);

    if let Err(e) = server::serve(app, config.port).await {
        tracing::error!("{}", e);
        std::process::exit(1);
    }
}
