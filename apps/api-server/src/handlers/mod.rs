//! HTTP handlers and route configuration.

mod clients;
mod health;

use actix_web::web;

/// Configure all application routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .route("/health", web::get().to(health::health_check))
            .service(
                web::scope("/clients")
                    .route("", web::post().to(clients::register))
                    .route("/{name}", web::get().to(clients::get))
                    .route("/{name}", web::put().to(clients::update))
                    .route("/{name}", web::delete().to(clients::delete))
                    .route("/{name}/verify", web::post().to(clients::verify)),
            ),
    );
}
