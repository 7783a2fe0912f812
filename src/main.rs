use std::net::SocketAddr;
use std::sync::Arc;

use practitioner_portal::config::{environment::Config, init_db};
use practitioner_portal::modules::task_schedule::scheduler::{parse_schedule, spawn_ingest_job};
use practitioner_portal::AppState;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "practitioner_portal=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env().expect("Failed to load environment configuration");
    tracing::info!(environment = ?config.environment, "configuration loaded");

    let db = init_db(&config).await.expect("Failed to connect to MySQL");
    tracing::info!("Connected to MySQL, migrations applied");

    let state = Arc::new(AppState::from_config(&config, db));

    match &state.ingest {
        Some(sync) => {
            let schedule = parse_schedule(&config.ingest_schedule).expect("Invalid INGEST_SCHEDULE");
            spawn_ingest_job(schedule, Arc::clone(sync));
            tracing::info!(schedule = %config.ingest_schedule, "contact sync scheduled");
        }
        None => tracing::info!("INGEST_API_URL not set, contact sync disabled"),
    }

    let app = practitioner_portal::create_app(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    tracing::info!("Server running on http://{}", addr);
    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .await
        .unwrap();
}
