//! Admin API Handlers

use axum::{Json, extract::State};
use serde::Serialize;

use crate::auth::CurrentAdmin;
use crate::core::ServerState;
use crate::services::OrderStats;
use crate::utils::AppResult;

/// 运营统计摘要
#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub orders: OrderStats,
    pub products_total: u64,
    pub products_active: u64,
    pub users_total: u64,
    pub pending_reviews: u64,
}

/// GET /api/admin/stats - 运营统计 (管理员)
pub async fn stats(
    _admin: CurrentAdmin,
    State(state): State<ServerState>,
) -> AppResult<Json<StatsResponse>> {
    let orders = state.orders.stats().await?;
    let products_total = state.products.repo().count(false).await?;
    let products_active = state.products.repo().count(true).await?;
    let users_total = state.auth.count_users().await?;
    let pending_reviews = state.reviews.count_pending().await?;

    Ok(Json(StatsResponse {
        orders,
        products_total,
        products_active,
        users_total,
        pending_reviews,
    }))
}
