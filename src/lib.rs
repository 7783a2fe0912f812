pub mod config;
pub mod modules;
pub mod services;

use axum::{extract::DefaultBodyLimit, middleware, routing::get, Json, Router};
use serde::Serialize;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, limit::RequestBodyLimitLayer, trace::TraceLayer};

use config::{Config, DbPool};
use modules::auth::{auth_routes, crud::UserCrud, FlowSettings, IdentityFlow};
use modules::practitioner::{crud::PractitionerCrud, practitioner_routes, PractitionerStore};
use modules::task_schedule::{crud::IngestCrud, task_schedule_routes, IngestSynchronizer};
use modules::users::{crud::DirectoryCrud, user_routes, DirectoryStore};
use services::ingest::IngestClient;
use services::jwt::JwtService;
use services::link_signer::LinkSigner;
use services::mailer::{LogMailer, Mailer, SendGridMailer};
use services::security::security_headers;

/// Largest accepted request body; sized for practitioner CSV uploads.
pub const MAX_BODY_BYTES: usize = 5 * 1024 * 1024;

pub struct AppState {
    pub identity: IdentityFlow,
    pub directory: Arc<dyn DirectoryStore>,
    pub practitioners: Arc<dyn PractitionerStore>,
    /// `None` when no CRM API is configured.
    pub ingest: Option<Arc<IngestSynchronizer>>,
    /// Makes the guard reject tokens of disabled or deleted users.
    pub guard_check_disabled: bool,
    pub auth_rate_limit_burst: u32,
    /// Keys the `/auth` limiter on `X-Forwarded-For` instead of the peer.
    pub trust_forwarded_for: bool,
}

impl AppState {
    /// Wires the MySQL-backed stores and outbound clients from `config`.
    pub fn from_config(config: &Config, db: DbPool) -> Self {
        let mailer: Arc<dyn Mailer> = match &config.sendgrid_api_key {
            Some(key) => Arc::new(SendGridMailer::new(key.clone(), config.mail_from.clone())),
            None => {
                tracing::warn!("SENDGRID_API_KEY not set, emails will only be logged");
                Arc::new(LogMailer)
            }
        };

        let identity = IdentityFlow::new(
            Arc::new(UserCrud::new(db.clone())),
            mailer,
            Arc::new(JwtService::new(
                config.access_jwt_secret.clone(),
                config.refresh_jwt_secret.clone(),
            )),
            LinkSigner::new(&config.link_signing_secret),
            FlowSettings {
                environment: config.environment,
                app_base_url: config.app_base_url.clone(),
                require_signed_link: config.require_signed_link,
            },
        );

        let ingest = config.ingest_api_url.as_ref().map(|url| {
            let client = IngestClient::new(url.clone(), config.ingest_api_key.clone().unwrap_or_default());
            Arc::new(IngestSynchronizer::new(
                Arc::new(client),
                Arc::new(IngestCrud::new(db.clone())),
            ))
        });

        Self {
            identity,
            directory: Arc::new(DirectoryCrud::new(db.clone())),
            practitioners: Arc::new(PractitionerCrud::new(db)),
            ingest,
            guard_check_disabled: config.guard_check_disabled,
            auth_rate_limit_burst: config.auth_rate_limit_burst,
            trust_forwarded_for: config.trust_forwarded_for,
        }
    }
}

pub fn create_app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .nest("/auth", auth_routes(&state))
        .nest("/users", user_routes(&state))
        .nest("/practitioner", practitioner_routes(&state))
        .nest("/task-schedule", task_schedule_routes(&state))
        .layer(middleware::from_fn(security_headers))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn root() -> &'static str {
    "Practitioner Portal API"
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}
