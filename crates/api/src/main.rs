use anyhow::Context;
use axum::{
    extract::State,
    http::HeaderValue,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use portfolio_core::domain::analysis::AnalysisResult;
use portfolio_core::domain::portfolio::parse_portfolio;
use portfolio_core::reference::ReferenceTable;
use portfolio_core::scoring::analyze_portfolio;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = portfolio_core::config::Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer())
        .init();

    let reference = match ReferenceTable::load(&settings.reference_table_path) {
        Ok(table) => table,
        Err(e) => {
            sentry_anyhow::capture_anyhow(&e);
            tracing::error!(error = %format!("{e:#}"), "reference table unavailable; refusing to start");
            return Err(e);
        }
    };

    let state = AppState {
        reference: Arc::new(reference),
    };
    let origin = settings.require_cors_allowed_origin()?;
    let app = router(state, cors_layer(origin)?);

    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(3000);
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));

    tracing::info!(%addr, %origin, "api listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

fn router(state: AppState, cors: CorsLayer) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/api/analyze_portfolio", post(analyze_portfolio_endpoint))
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

// Methods and headers are mirrored rather than wildcarded so credentials stay allowed.
fn cors_layer(origin: &str) -> anyhow::Result<CorsLayer> {
    let origin = HeaderValue::from_str(origin)
        .with_context(|| format!("invalid CORS origin: {origin}"))?;
    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list([origin]))
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true))
}

async fn healthz() -> &'static str {
    "ok"
}

#[derive(Debug, Clone)]
struct AppState {
    reference: Arc<ReferenceTable>,
}

#[derive(Debug, Deserialize)]
struct AnalyzeRequest {
    portfolio_str: String,
}

async fn analyze_portfolio_endpoint(
    State(state): State<AppState>,
    Json(req): Json<AnalyzeRequest>,
) -> Json<AnalysisResult> {
    let portfolio = parse_portfolio(&req.portfolio_str);
    let result = analyze_portfolio(&portfolio, &state.reference);

    tracing::debug!(
        holdings = portfolio.len(),
        risk_level = %result.risk_level,
        suggestions = result.suggested_stocks.len(),
        "analyzed portfolio"
    );

    Json(result)
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}

fn init_sentry(settings: &portfolio_core::config::Settings) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.sentry_dsn.as_deref()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}
