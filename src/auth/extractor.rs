//! JWT 认证提取器
//!
//! 受保护的 handler 通过参数声明 [`CurrentUser`] / [`CurrentAdmin`]
//! 即可自动完成令牌验证。可选认证 (匿名亦可访问) 使用 [`OptionalUser`]。

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::auth::jwt::{Claims, JwtService, TOKEN_TYPE_ACCESS};
use crate::core::ServerState;
use crate::utils::AppError;

/// 从 JWT 中提取的当前用户上下文
#[derive(Debug, Clone)]
pub struct CurrentUser {
    /// 用户 ID ("users:xxx")
    pub id: String,
    /// 用户邮箱
    pub email: String,
    /// 是否管理员
    pub is_admin: bool,
}

impl From<Claims> for CurrentUser {
    fn from(claims: Claims) -> Self {
        Self {
            id: claims.sub,
            email: claims.email,
            is_admin: claims.is_admin,
        }
    }
}

/// 已认证的管理员用户
#[derive(Debug, Clone)]
pub struct CurrentAdmin(pub CurrentUser);

/// 可选认证: 有有效令牌则 Some，无 Authorization 头则 None。
/// 携带无效令牌仍然报错，避免静默降级为匿名。
#[derive(Debug, Clone)]
pub struct OptionalUser(pub Option<CurrentUser>);

fn authenticate(parts: &mut Parts, state: &ServerState) -> Result<CurrentUser, AppError> {
    // Check if already extracted (from a previous extractor on this request)
    if let Some(user) = parts.extensions.get::<CurrentUser>() {
        return Ok(user.clone());
    }

    let auth_header = parts
        .headers
        .get(http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    let token = match auth_header {
        Some(header) => JwtService::extract_from_header(header)
            .ok_or_else(|| AppError::invalid_token("Invalid authorization header"))?,
        None => {
            tracing::warn!(uri = ?parts.uri, "Missing authorization header");
            return Err(AppError::Unauthorized);
        }
    };

    match state.jwt.validate_token(token, TOKEN_TYPE_ACCESS) {
        Ok(claims) => {
            let user = CurrentUser::from(claims);

            tracing::debug!(
                user_id = %user.id,
                email = %user.email,
                "User authenticated successfully"
            );

            // Store in extensions for potential reuse
            parts.extensions.insert(user.clone());

            Ok(user)
        }
        Err(e) => {
            tracing::warn!(error = %e, uri = ?parts.uri, "Authentication failed");

            match e {
                crate::auth::jwt::JwtError::ExpiredToken => Err(AppError::TokenExpired),
                _ => Err(AppError::invalid_token("Invalid token")),
            }
        }
    }
}

impl FromRequestParts<ServerState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &ServerState,
    ) -> Result<Self, Self::Rejection> {
        authenticate(parts, state)
    }
}

impl FromRequestParts<ServerState> for CurrentAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &ServerState,
    ) -> Result<Self, Self::Rejection> {
        let user = authenticate(parts, state)?;
        if !user.is_admin {
            tracing::warn!(user_id = %user.id, uri = ?parts.uri, "Admin access denied");
            return Err(AppError::forbidden("Admin access required"));
        }
        Ok(CurrentAdmin(user))
    }
}

impl FromRequestParts<ServerState> for OptionalUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &ServerState,
    ) -> Result<Self, Self::Rejection> {
        if parts.headers.get(http::header::AUTHORIZATION).is_none() {
            return Ok(OptionalUser(None));
        }
        Ok(OptionalUser(Some(authenticate(parts, state)?)))
    }
}
