//! Order API Handlers
//!
//! 订单的归属检查在这里完成：引擎只返回数据，不解析身份。

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;

use crate::auth::{CurrentAdmin, CurrentUser, OptionalUser};
use crate::core::ServerState;
use crate::db::models::{Order, OrderCreate, OrderStatusUpdate};
use crate::services::CheckoutResult;
use crate::utils::{AppError, AppResult};

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default = "default_limit")]
    pub limit: u64,
}

fn default_limit() -> u64 {
    50
}

/// POST /api/orders - 下单并走支付模拟
///
/// 登录用户的订单记到其名下，匿名结账 user_id 为空。
/// 请求体里的 user_id 一律被认证结果覆盖。
pub async fn create(
    OptionalUser(user): OptionalUser,
    State(state): State<ServerState>,
    Json(mut payload): Json<OrderCreate>,
) -> AppResult<(StatusCode, Json<CheckoutResult>)> {
    payload.user_id = user.map(|u| u.id);

    let result = state.orders.checkout(payload).await?;
    Ok((StatusCode::CREATED, Json(result)))
}

/// GET /api/orders/my - 当前用户的订单 (新到旧)
pub async fn my_orders(
    user: CurrentUser,
    State(state): State<ServerState>,
    Query(params): Query<ListQuery>,
) -> AppResult<Json<Vec<Order>>> {
    let orders = state
        .orders
        .get_orders_by_user(&user.id, params.limit.clamp(1, 200))
        .await?;
    Ok(Json(orders))
}

/// GET /api/orders/{id} - 订单详情，本人或管理员可见
pub async fn get_by_id(
    user: CurrentUser,
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<Order>> {
    let order = state.orders.get_order(&id).await?;

    if !user.is_admin && order.user_id.as_deref() != Some(user.id.as_str()) {
        return Err(AppError::forbidden("You can only view your own orders"));
    }

    Ok(Json(order))
}

/// GET /api/orders/admin/all - 全部订单 (管理员)
pub async fn all_orders(
    _admin: CurrentAdmin,
    State(state): State<ServerState>,
    Query(params): Query<ListQuery>,
) -> AppResult<Json<Vec<Order>>> {
    let orders = state
        .orders
        .get_all_orders(params.limit.clamp(1, 500))
        .await?;
    Ok(Json(orders))
}

/// PUT /api/orders/{id}/status - 更新订单/支付状态 (管理员)
///
/// 非法的枚举值在反序列化时就被拒绝 (422)
pub async fn update_status(
    _admin: CurrentAdmin,
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<OrderStatusUpdate>,
) -> AppResult<Json<Order>> {
    let order = state.orders.update_order_status(&id, payload).await?;
    Ok(Json(order))
}
