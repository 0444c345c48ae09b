//! API 路由模块
//!
//! # 结构
//!
//! - [`health`] - 健康检查
//! - [`auth`] - 注册 / 登录 / 刷新
//! - [`products`] - 商品目录接口
//! - [`search`] - 商品搜索接口
//! - [`orders`] - 订单接口
//! - [`reviews`] - 评价与审核接口
//! - [`calculator`] - 选型计算器接口
//! - [`admin`] - 管理端统计接口

pub mod admin;
pub mod auth;
pub mod calculator;
pub mod health;
pub mod orders;
pub mod products;
pub mod reviews;
pub mod search;

use axum::Router;

use crate::core::ServerState;

// Re-export common types for handlers
pub use crate::utils::{AppResponse, AppResult};

/// 组装全部路由
pub fn create_router(state: ServerState) -> Router {
    Router::new()
        .merge(health::router())
        .merge(auth::router())
        .merge(products::router())
        .merge(search::router())
        .merge(orders::router())
        .merge(reviews::router())
        .merge(calculator::router())
        .merge(admin::router())
        .with_state(state)
}
