use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use serde::Serialize;
use sqlx::postgres::PgPoolOptions;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use maum_core::rulebook::RuleBook;

mod config;
mod dialogue;
mod error;
mod extract;
mod middleware;
mod routes;
mod session;
mod state;
mod upstream;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Maum Gateway API",
        version = "0.1.0",
        description = "Session and dialogue-routing gateway for PHQ-9 self-assessment conversations."
    ),
    paths(
        routes::health::health_check,
        routes::session::start,
        routes::session::reset,
        routes::dialogue::exchange,
        routes::summary::submit_edits,
    ),
    components(schemas(
        HealthResponse,
        routes::session::StartResponse,
        routes::session::ResetResponse,
        routes::dialogue::ChatRequest,
        routes::dialogue::ChatResponse,
        routes::summary::SubmitEditsRequest,
        routes::summary::SubmitEditsResponse,
        maum_core::error::ApiError,
        maum_core::summary::SummaryItem,
        maum_core::summary::EditedItem,
        maum_core::summary::EditedSummaryRecord,
    ))
)]
struct ApiDoc;

#[derive(Serialize, utoipa::ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub active_sessions: usize,
}

#[tokio::main]
async fn main() {
    // .env for local runs; deployments set the environment directly
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "maum_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    let config = config::Config::from_env();

    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let pool = PgPoolOptions::new()
        .max_connections(20)
        .connect(&database_url)
        .await
        .expect("Failed to connect to database");

    sqlx::migrate!("../migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    let sessions = Arc::new(session::SessionStore::new(config.session_ttl));
    session::spawn_sweeper(sessions.clone());

    let backend = Arc::new(upstream::HttpDialogueBackend::new(
        reqwest::Client::new(),
        &config.upstream_url,
    ));
    let dialogue = Arc::new(dialogue::DialogueService::new(
        sessions,
        backend,
        RuleBook::with_default_rules(),
        config.greeting.clone(),
        config.record_rule_replies,
    ));

    let app_state = state::AppState {
        db: pool,
        dialogue,
    };

    let app = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .merge(routes::health::router())
        .merge(routes::session::router())
        .merge(routes::dialogue::router())
        .merge(routes::summary::router())
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(middleware::cors::build_cors_layer()),
        )
        .with_state(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!(upstream = %config.upstream_url, "Maum gateway listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
