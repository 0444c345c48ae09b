//! Order API 模块
//!
//! | 路径 | 方法 | 说明 | 认证 |
//! |------|------|------|------|
//! | /api/orders | POST | 下单 + 支付模拟 | 可选 |
//! | /api/orders/my | GET | 当前用户的订单 | 必须 |
//! | /api/orders/{id} | GET | 订单详情 | 本人或管理员 |
//! | /api/orders/{id}/status | PUT | 更新状态 | 管理员 |
//! | /api/orders/admin/all | GET | 全部订单 | 管理员 |

mod handler;

use axum::{
    Router,
    routing::{get, post, put},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/orders", order_routes())
}

fn order_routes() -> Router<ServerState> {
    Router::new()
        .route("/", post(handler::create))
        .route("/my", get(handler::my_orders))
        .route("/admin/all", get(handler::all_orders))
        .route("/{id}", get(handler::get_by_id))
        .route("/{id}/status", put(handler::update_status))
}
