use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::json;

use super::error::ApiError;
use crate::domain::Attributes;
use crate::infrastructure::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct ListShopsQuery {
    /// When set, answer with one page instead of every shop
    pub page: Option<u64>,
    pub per_page: Option<u64>,
}

pub async fn list_shops(
    State(state): State<AppState>,
    Query(query): Query<ListShopsQuery>,
) -> Result<Response, ApiError> {
    let response = match query.page {
        Some(page) => Json(state.shop_repo.paginate(query.per_page, page).await?).into_response(),
        None => Json(state.shop_repo.list().await?).into_response(),
    };
    Ok(response)
}

pub async fn create_shop(
    State(state): State<AppState>,
    Json(payload): Json<Attributes>,
) -> Result<impl IntoResponse, ApiError> {
    let shop = state.shop_repo.create(payload).await?;
    Ok((StatusCode::CREATED, Json(shop)))
}

pub async fn get_shop(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.shop_repo.show(id).await?))
}

pub async fn get_shop_by_domain(
    State(state): State<AppState>,
    Path(domain): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.shop_repo.find_by_domain(&domain).await?))
}

pub async fn update_shop(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(payload): Json<Attributes>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.shop_repo.update(payload, id).await?))
}

pub async fn delete_shop(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ApiError> {
    let deleted = state.shop_repo.delete(id).await?;
    Ok(Json(json!({ "message": "Shop deleted", "deleted": deleted })))
}
