//! Product API 模块
//!
//! | 路径 | 方法 | 说明 | 认证 |
//! |------|------|------|------|
//! | /api/products | GET | 分页 + 过滤列表 | 无 |
//! | /api/products | POST | 创建商品 | 管理员 |
//! | /api/products/{id} | GET | 商品详情 | 无 |
//! | /api/products/{id} | PUT | 部分更新 | 管理员 |
//! | /api/products/{id} | DELETE | 下架 (软删除) | 管理员 |
//! | /api/products/{id}/rate | POST | 一次性评分 | 无 |

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/products", product_routes())
}

fn product_routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list).post(handler::create))
        .route(
            "/{id}",
            get(handler::get_by_id)
                .put(handler::update)
                .delete(handler::delete),
        )
        .route("/{id}/rate", post(handler::rate))
}
