pub mod error;
pub mod health;
pub mod shops;
pub mod webhooks;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use crate::infrastructure::AppState;
use crate::middleware::check_webhook;

pub use error::ApiError;

pub fn api_router_with_state(state: AppState) -> Router {
    // Webhooks sit behind the header guard; nothing else does
    let webhooks = Router::new()
        .route("/webhooks", post(webhooks::receive_webhook))
        .route_layer(middleware::from_fn_with_state(
            state.webhook_guard.clone(),
            check_webhook,
        ));

    Router::new()
        // Health check
        .route("/health", get(health::health_check))
        // Shops
        .route("/shops", get(shops::list_shops).post(shops::create_shop))
        .route("/shops/by-domain/:domain", get(shops::get_shop_by_domain))
        .route(
            "/shops/:id",
            get(shops::get_shop)
                .put(shops::update_shop)
                .delete(shops::delete_shop),
        )
        .merge(webhooks)
        .with_state(state)
}
