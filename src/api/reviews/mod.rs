//! Review API 模块
//!
//! | 路径 | 方法 | 说明 | 认证 |
//! |------|------|------|------|
//! | /api/reviews/product/{product_id} | GET | 商品评价列表 | 无 |
//! | /api/reviews/product/{product_id} | POST | 提交评价 | 可选 |
//! | /api/reviews/{id} | PUT | 修改自己的评价 | 必须 |
//! | /api/reviews/{id} | DELETE | 删除自己的评价 | 必须 |
//! | /api/reviews/admin/pending | GET | 待审/全部评价 | 管理员 |
//! | /api/reviews/admin/{id}/moderate | POST | 审核裁决 | 管理员 |
//! | /api/reviews/admin/{id} | DELETE | 删除任意评价 | 管理员 |

mod handler;

use axum::{
    Router,
    routing::{get, post, put},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/reviews", review_routes())
}

fn review_routes() -> Router<ServerState> {
    Router::new()
        .route(
            "/product/{product_id}",
            get(handler::list_by_product).post(handler::create),
        )
        .route("/admin/pending", get(handler::pending))
        .route("/admin/{id}/moderate", post(handler::moderate))
        .route("/admin/{id}", axum::routing::delete(handler::admin_delete))
        .route("/{id}", put(handler::update).delete(handler::delete))
}
