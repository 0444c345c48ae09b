//! Review API Handlers
//!
//! 评价的归属检查借助服务返回的 user_id 字段在服务层完成，
//! handler 负责把当前身份传下去。

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;

use crate::auth::{CurrentAdmin, CurrentUser, OptionalUser};
use crate::core::ServerState;
use crate::db::models::{Review, ReviewCreate, ReviewUpdate};
use crate::utils::{AppError, AppResult};

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    /// 默认只返回已批准的评价
    #[serde(default = "default_true")]
    pub approved_only: bool,
    #[serde(default = "default_limit")]
    pub limit: u64,
}

fn default_true() -> bool {
    true
}

fn default_limit() -> u64 {
    50
}

/// GET /api/reviews/product/{product_id} - 商品评价列表
pub async fn list_by_product(
    State(state): State<ServerState>,
    Path(product_id): Path<String>,
    Query(params): Query<ListQuery>,
) -> AppResult<Json<Vec<Review>>> {
    let reviews = state
        .reviews
        .get_product_reviews(&product_id, params.approved_only, params.limit.clamp(1, 200))
        .await?;
    Ok(Json(reviews))
}

/// POST /api/reviews/product/{product_id} - 提交评价
///
/// 请求体里的 product_id 与路径不一致时拒绝。
/// 匿名提交时 user_name 用于展示。
pub async fn create(
    OptionalUser(user): OptionalUser,
    State(state): State<ServerState>,
    Path(product_id): Path<String>,
    Json(payload): Json<ReviewCreate>,
) -> AppResult<(StatusCode, Json<Review>)> {
    if payload.product_id != product_id {
        return Err(AppError::invalid(
            "Product id in body does not match path".to_string(),
        ));
    }

    let review = state
        .reviews
        .create_review(payload, user.map(|u| u.id))
        .await?;
    Ok((StatusCode::CREATED, Json(review)))
}

/// PUT /api/reviews/{id} - 修改自己的评价
pub async fn update(
    user: CurrentUser,
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<ReviewUpdate>,
) -> AppResult<Json<Review>> {
    let review = state.reviews.update_review(&id, payload, &user.id).await?;
    Ok(Json(review))
}

/// DELETE /api/reviews/{id} - 删除自己的评价
pub async fn delete(
    user: CurrentUser,
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    state
        .reviews
        .delete_review(&id, &user.id, user.is_admin)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
pub struct PendingQuery {
    /// true 时返回所有评价而不只是待审的
    #[serde(default)]
    pub all_reviews: bool,
    #[serde(default = "default_limit")]
    pub limit: u64,
}

/// GET /api/reviews/admin/pending - 待审评价列表 (管理员)
pub async fn pending(
    _admin: CurrentAdmin,
    State(state): State<ServerState>,
    Query(params): Query<PendingQuery>,
) -> AppResult<Json<Vec<Review>>> {
    let limit = params.limit.clamp(1, 500);
    let reviews = if params.all_reviews {
        state.reviews.get_all_reviews(limit).await?
    } else {
        state.reviews.get_pending_reviews(limit).await?
    };
    Ok(Json(reviews))
}

#[derive(Debug, Deserialize)]
pub struct ModerateRequest {
    pub is_approved: bool,
    pub moderator_comment: Option<String>,
}

/// POST /api/reviews/admin/{id}/moderate - 审核裁决 (管理员，可重复裁决)
pub async fn moderate(
    _admin: CurrentAdmin,
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<ModerateRequest>,
) -> AppResult<Json<Review>> {
    let review = state
        .reviews
        .moderate_review(&id, payload.is_approved, payload.moderator_comment)
        .await?;
    Ok(Json(review))
}

/// DELETE /api/reviews/admin/{id} - 删除任意评价 (管理员)
pub async fn admin_delete(
    admin: CurrentAdmin,
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    state.reviews.delete_review(&id, &admin.0.id, true).await?;
    Ok(StatusCode::NO_CONTENT)
}
