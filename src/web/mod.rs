//! HTTP surface.

pub mod admin;
pub mod auth;
pub mod error;
pub mod handlers;
pub mod session;

use crate::errors::{AppError, AppResult};
use crate::registry::AppRegistry;
use axum::Router;
use axum::middleware;
use axum::routing::get;
use std::time::Duration;
use tower_http::trace::TraceLayer;

const SESSION_PURGE_INTERVAL: Duration = Duration::from_secs(15 * 60);

pub fn router(registry: AppRegistry) -> Router {
    let admin_routes = Router::new()
        .route("/dashboard", get(admin::dashboard))
        .route("/reservations-new", get(admin::reservations_new))
        .route("/reservations-all", get(admin::reservations_all))
        .route(
            "/reservations-calendar",
            get(admin::reservations_calendar).post(admin::post_reservations_calendar),
        )
        .route(
            "/reservations/{src}/{id}/show",
            get(admin::show_reservation),
        )
        .route(
            "/reservations/{src}/{id}",
            axum::routing::post(admin::post_reservation),
        )
        .route(
            "/process-reservation/{src}/{id}",
            get(admin::process_reservation),
        )
        .route(
            "/delete-reservation/{src}/{id}",
            get(admin::delete_reservation),
        )
        .route_layer(middleware::from_fn(auth::require_admin));

    Router::new()
        .route("/", get(handlers::home))
        .route("/about", get(handlers::about))
        .route("/contact", get(handlers::contact))
        .route("/health", get(handlers::health))
        .route("/rooms/{id}", get(handlers::room))
        .route(
            "/search-availability",
            get(handlers::search_availability).post(handlers::post_search_availability),
        )
        .route(
            "/search-availability-json",
            axum::routing::post(handlers::availability_json),
        )
        .route("/choose-room/{id}", get(handlers::choose_room))
        .route("/book-room", get(handlers::book_room))
        .route(
            "/make-reservation",
            get(handlers::make_reservation).post(handlers::post_make_reservation),
        )
        .route("/reservation-summary", get(handlers::reservation_summary))
        .route(
            "/user/login",
            get(handlers::login).post(handlers::post_login),
        )
        .route("/user/logout", get(handlers::logout))
        .nest("/admin", admin_routes)
        .layer(middleware::from_fn_with_state(
            registry.clone(),
            session::session_layer,
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(registry)
}

/// Serve until Ctrl-C.
pub async fn serve(registry: AppRegistry, addr: &str) -> AppResult<()> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| AppError::Server(format!("cannot bind {}: {}", addr, e)))?;
    tracing::info!("hotelbook listening on {addr}");

    let sessions = registry.sessions();
    let purge = tokio::spawn(async move {
        let mut tick = tokio::time::interval(SESSION_PURGE_INTERVAL);
        loop {
            tick.tick().await;
            let n = sessions.purge_expired();
            if n > 0 {
                tracing::debug!(purged = n, "expired sessions removed");
            }
        }
    });

    let result = axum::serve(listener, router(registry))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| AppError::Server(e.to_string()));

    purge.abort();
    tracing::info!("hotelbook stopped");
    result
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("cannot listen for shutdown signal: {e}");
    }
}
