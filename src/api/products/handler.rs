//! Product API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;

use crate::auth::CurrentAdmin;
use crate::core::ServerState;
use crate::db::models::{
    PaginatedResponse, Pagination, Product, ProductCreate, ProductFilters, ProductUpdate,
};
use crate::utils::{AppError, AppResult};

/// GET /api/products - 分页 + 过滤的商品列表 (只返回在售商品)
pub async fn list(
    State(state): State<ServerState>,
    Query(pagination): Query<Pagination>,
    Query(filters): Query<ProductFilters>,
) -> AppResult<Json<PaginatedResponse<Product>>> {
    let page = state
        .products
        .list_products(pagination, &filters, true)
        .await?;
    Ok(Json(page))
}

/// GET /api/products/{id} - 商品详情
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<Product>> {
    let product = state.products.get_product(&id).await?;
    Ok(Json(product))
}

/// POST /api/products - 创建商品 (管理员)
pub async fn create(
    _admin: CurrentAdmin,
    State(state): State<ServerState>,
    Json(payload): Json<ProductCreate>,
) -> AppResult<(StatusCode, Json<Product>)> {
    let product = state.products.create_product(payload).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

/// PUT /api/products/{id} - 部分更新商品 (管理员)
pub async fn update(
    _admin: CurrentAdmin,
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<ProductUpdate>,
) -> AppResult<Json<Product>> {
    let product = state.products.update_product(&id, payload).await?;
    Ok(Json(product))
}

/// DELETE /api/products/{id} - 下架商品 (管理员，软删除)
pub async fn delete(
    _admin: CurrentAdmin,
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    state.products.delete_product(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
pub struct RateRequest {
    /// 可选，提供时必须与路径一致
    pub product_id: Option<String>,
    pub rating: f64,
}

/// POST /api/products/{id}/rate - 一次性评分折叠
///
/// 请求体里的 product_id 与路径不一致时拒绝
pub async fn rate(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<RateRequest>,
) -> AppResult<Json<Product>> {
    if let Some(body_id) = &payload.product_id {
        if body_id != &id {
            return Err(AppError::invalid(
                "Product id in body does not match path".to_string(),
            ));
        }
    }

    let product = state.products.rate_product(&id, payload.rating).await?;
    Ok(Json(product))
}
