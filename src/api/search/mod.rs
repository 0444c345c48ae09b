//! 搜索路由
//!
//! | 路径 | 方法 | 说明 | 认证 |
//! |------|------|------|------|
//! | /api/search/products | GET | 名称/描述/电池类型子串搜索 | 无 |

use axum::{Json, Router, extract::Query, extract::State, routing::get};
use serde::Deserialize;

use crate::core::ServerState;
use crate::db::models::Product;
use crate::utils::AppResult;

pub fn router() -> Router<ServerState> {
    Router::new().route("/api/search/products", get(search_products))
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
    #[serde(default = "default_limit")]
    pub limit: u64,
}

fn default_limit() -> u64 {
    20
}

/// GET /api/search/products?q=&limit= - 子串搜索，空查询返回空列表
async fn search_products(
    State(state): State<ServerState>,
    Query(params): Query<SearchQuery>,
) -> AppResult<Json<Vec<Product>>> {
    let products = state
        .products
        .search_products(&params.q, params.limit)
        .await?;
    Ok(Json(products))
}
