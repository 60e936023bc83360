// Server module - router assembly and start-up

use axum::{http::HeaderValue, middleware, Router};
use std::net::{SocketAddr, TcpListener};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::api;
use crate::infrastructure::AppState;
use crate::middleware::{handle_exceptions, panic_response};

/// Build the API router around `state`.
///
/// Layer order, outermost first: CORS, tracing, exception chain, panic
/// capture. Panics therefore reach the chain like any other error.
pub fn build_router(state: AppState, cors_allowed_origins: &[String]) -> Router {
    let chain = state.exception_chain.clone();
    let api_router = api::api_router_with_state(state);

    Router::new()
        .nest("/api", api_router)
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(middleware::from_fn_with_state(chain, handle_exceptions))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(cors_allowed_origins))
}

// CORS configuration
fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| HeaderValue::from_str(origin).ok())
        .collect();

    let allow_origin = if origins.is_empty() {
        AllowOrigin::any()
    } else {
        AllowOrigin::list(origins)
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods(Any)
        .allow_headers(Any)
}

/// Find an available port starting from the preferred port on a specific IP
pub fn find_available_port_on_ip(preferred_port: u16, ip: &str) -> Option<u16> {
    // Try preferred port first
    if TcpListener::bind((ip, preferred_port)).is_ok() {
        return Some(preferred_port);
    }

    // Scan next 100 ports
    ((preferred_port + 1)..(preferred_port.saturating_add(100)))
        .find(|&port| TcpListener::bind((ip, port)).is_ok())
}

/// Serve `app` until the process stops.
pub async fn serve(app: Router, preferred_port: u16) -> Result<(), String> {
    let port = find_available_port_on_ip(preferred_port, "0.0.0.0")
        .ok_or_else(|| "Failed to find available port".to_string())?;
    if port != preferred_port {
        tracing::warn!("Port {} busy, using {}", preferred_port, port);
    }

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| format!("Failed to bind to {}: {}", addr, e))?;

    tracing::info!("HTTP server listening on {}", addr);

    axum::serve(listener, app)
        .await
        .map_err(|e| format!("HTTP server error: {}", e))
}
