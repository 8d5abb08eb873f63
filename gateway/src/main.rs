use anyhow::Result;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use risk_gateway::{routes, AppState};
use risk_scoring::RiskScorer;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "risk_gateway=debug,info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let state = AppState::new(RiskScorer::default());

    let api_routes = Router::new()
        .route("/risk/location", post(routes::assess_location))
        .route("/risk/portfolio", post(routes::assess_portfolio))
        .route("/data/earthquakes", get(routes::get_earthquakes))
        .route("/data/wildfires", get(routes::get_wildfires))
        .route("/data/weather-alerts", get(routes::get_weather_alerts))
        .with_state(state);

    let app = Router::new()
        .route("/", get(routes::root))
        .route("/health", get(routes::health))
        .nest("/api/v1", api_routes)
        .layer(CorsLayer::permissive());

    let port = std::env::var("RISK_GATEWAY_PORT")
        .or_else(|_| std::env::var("PORT"))
        .unwrap_or_else(|_| "8000".to_string());
    let addr = format!("0.0.0.0:{}", port);

    tracing::info!("Disaster risk gateway starting on {}", addr);
    tracing::info!("   Hazard feeds: USGS, NASA FIRMS, NWS");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
