//! Auth API Handlers

use axum::{Json, extract::State, http::StatusCode};

use crate::core::ServerState;
use crate::db::models::UserCreate;
use crate::services::{AuthResponse, LoginRequest, RefreshRequest, RefreshResponse};
use crate::utils::AppResult;

/// POST /api/auth/register - 注册新用户
pub async fn register(
    State(state): State<ServerState>,
    Json(payload): Json<UserCreate>,
) -> AppResult<(StatusCode, Json<AuthResponse>)> {
    let response = state.auth.register(payload).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// POST /api/auth/login - 登录
pub async fn login(
    State(state): State<ServerState>,
    Json(payload): Json<LoginRequest>,
) -> AppResult<Json<AuthResponse>> {
    let response = state.auth.login(payload).await?;
    Ok(Json(response))
}

/// POST /api/auth/refresh - 用 refresh token 换新 access token
pub async fn refresh(
    State(state): State<ServerState>,
    Json(payload): Json<RefreshRequest>,
) -> AppResult<Json<RefreshResponse>> {
    let response = state.auth.refresh(payload).await?;
    Ok(Json(response))
}
