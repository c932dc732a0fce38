//! # Throttle API Server
//!
//! HTTP entry point for client administration and limit verification.

use actix_web::{App, HttpServer, web};
use tracing_actix_web::TracingLogger;

mod config;
mod handlers;
mod middleware;
mod state;
mod telemetry;

use config::AppConfig;
use state::AppState;
use telemetry::{TelemetryConfig, init_telemetry};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    init_telemetry(&TelemetryConfig::from_env());

    let config = AppConfig::from_env();

    tracing::info!(
        algorithm = %config.algorithm,
        "Starting Throttle API Server on {}:{}",
        config.host,
        config.port
    );

    let state = AppState::new(&config).await.map_err(|e| {
        tracing::error!(error = %e, "Startup failed");
        std::io::Error::other(e)
    })?;

    if let Some(counters) = state.local_counters.clone() {
        let every = config.counter_purge_interval;
        actix_rt::spawn(async move {
            let mut interval = actix_rt::time::interval(every);
            loop {
                interval.tick().await;
                let purged = counters.purge_expired();
                if purged > 0 {
                    tracing::debug!(purged, remaining = counters.len(), "Expired counters purged");
                }
            }
        });
    }

    HttpServer::new(move || {
        App::new()
            .wrap(TracingLogger::default())
            .app_data(web::Data::new(state.clone()))
            .configure(handlers::configure_routes)
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await
}
