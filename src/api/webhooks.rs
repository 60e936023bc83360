use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};

use super::error::ApiError;
use crate::domain::RepositoryError;
use crate::infrastructure::AppState;

/// Stores an inbound webhook against the shop named in its headers.
///
/// Mounted behind `check_webhook`, so both headers are known to be present.
pub async fn receive_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: String,
) -> Result<impl IntoResponse, ApiError> {
    let domain = state.webhook_guard.shop_domain(&headers).unwrap_or_default();
    let topic = state.webhook_guard.topic(&headers).unwrap_or_default();

    let shop = state
        .shop_repo
        .find_by_domain(domain)
        .await?
        .ok_or_else(|| RepositoryError::not_found("shops"))?;

    let event = state.webhook_event_repo.record(shop.id, topic, body).await?;
    tracing::info!("Stored webhook {} for {}", topic, domain);

    Ok((StatusCode::OK, Json(event)))
}
