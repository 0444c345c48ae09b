//! 选型计算器路由
//!
//! | 路径 | 方法 | 说明 | 认证 |
//! |------|------|------|------|
//! | /api/calculator/power-bank | POST | 充电宝选型 | 无 |
//! | /api/calculator/ups | POST | UPS 选型 | 无 |

mod handler;

use axum::{Router, routing::post};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/calculator", calculator_routes())
}

fn calculator_routes() -> Router<ServerState> {
    Router::new()
        .route("/power-bank", post(handler::power_bank))
        .route("/ups", post(handler::ups))
}
