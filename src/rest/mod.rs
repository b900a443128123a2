// rest/mod.rs — Public REST API server.
//
// Axum HTTP server; all application endpoints live under /api.
//
// Endpoints:
//   POST /api/auth/register          (no auth)
//   POST /api/auth/login             (no auth)
//   POST /api/auth/logout
//   GET  /api/auth/me
//   GET  /api/auth/profile
//   PUT  /api/auth/profile
//   GET  /api/dreams
//   POST /api/dreams
//   PUT  /api/dreams/{id}
//   DELETE /api/dreams/{id}
//   GET  /api/dreams/public
//   POST /api/dreams/{id}/react
//   GET  /api/analytics
//   GET  /api/health                 (no auth)

pub mod auth;
pub mod routes;

use anyhow::Result;
use axum::{
    http::{header, HeaderValue, Method},
    middleware,
    routing::{get, post, put},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::{info, warn};

use crate::config::ServerConfig;
use crate::AppContext;

pub async fn start_rest_server(ctx: Arc<AppContext>) -> Result<()> {
    let bind = format!("{}:{}", ctx.config.bind_address, ctx.config.port);
    let addr: SocketAddr = bind.parse()?;

    let router = build_router(ctx);

    info!("REST API listening on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("REST API stopped");
    Ok(())
}

pub fn build_router(ctx: Arc<AppContext>) -> Router {
    let protected = Router::new()
        .route("/api/auth/logout", post(routes::auth::logout))
        .route("/api/auth/me", get(routes::auth::me))
        .route(
            "/api/auth/profile",
            get(routes::profile::get_profile).put(routes::profile::update_profile),
        )
        .route(
            "/api/dreams",
            get(routes::dreams::list_dreams).post(routes::dreams::create_dream),
        )
        .route("/api/dreams/public", get(routes::feed::public_dreams))
        .route(
            "/api/dreams/{id}",
            put(routes::dreams::update_dream).delete(routes::dreams::delete_dream),
        )
        .route("/api/dreams/{id}/react", post(routes::reactions::toggle))
        .route("/api/analytics", get(routes::analytics::get_analytics))
        .layer(middleware::from_fn_with_state(
            ctx.clone(),
            auth::require_auth,
        ));

    Router::new()
        // Health + auth entry points (no token required)
        .route("/api/health", get(routes::health::health))
        .route("/api/auth/register", post(routes::auth::register))
        .route("/api/auth/login", post(routes::auth::login))
        .merge(protected)
        .layer(cors_layer(&ctx.config))
        .with_state(ctx)
}

fn cors_layer(config: &ServerConfig) -> CorsLayer {
    let origins = &config.cors.allowed_origins;
    let allow_origin = if origins.iter().any(|o| o == "*") {
        AllowOrigin::any()
    } else {
        let parsed: Vec<HeaderValue> = origins
            .iter()
            .filter_map(|o| match o.parse::<HeaderValue>() {
                Ok(v) => Some(v),
                Err(_) => {
                    warn!(origin = %o, "ignoring unparsable CORS origin");
                    None
                }
            })
            .collect();
        AllowOrigin::list(parsed)
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
}

/// Resolves when a shutdown signal is received.
///
/// On Unix we listen for SIGTERM *and* Ctrl-C.
/// On other platforms we listen for Ctrl-C only.
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {}
                    _ = sigterm.recv() => {}
                }
            }
            Err(_) => {
                tokio::signal::ctrl_c().await.ok();
            }
        }
    }
    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c().await.ok();
    }
    info!("shutdown signal received — stopping REST server");
}
