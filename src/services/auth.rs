//! Auth Service - 注册、登录与令牌刷新
//!
//! 登录失败统一返回同一条错误消息并带固定延迟，
//! 避免通过响应差异枚举已注册邮箱。

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use surrealdb::Surreal;
use surrealdb::engine::local::Db;
use validator::Validate;

use crate::auth::{JwtService, TOKEN_TYPE_REFRESH};
use crate::db::models::{User, UserCreate, UserResponse};
use crate::db::repository::UserRepository;
use crate::utils::{AppError, AppResult};

/// 登录失败时的固定响应延迟
const FAILED_LOGIN_DELAY: Duration = Duration::from_millis(300);

/// 登录请求
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
}

/// 刷新请求
#[derive(Debug, Clone, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// 认证响应 - 用户信息 + 令牌对
#[derive(Debug, Clone, Serialize)]
pub struct AuthResponse {
    pub user: UserResponse,
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: &'static str,
}

/// 刷新响应 - 只重新签发 access token
#[derive(Debug, Clone, Serialize)]
pub struct RefreshResponse {
    pub access_token: String,
    pub token_type: &'static str,
}

/// 认证服务
#[derive(Debug, Clone)]
pub struct AuthService {
    users: UserRepository,
    jwt: Arc<JwtService>,
}

impl AuthService {
    pub fn new(db: Surreal<Db>, jwt: Arc<JwtService>) -> Self {
        Self {
            users: UserRepository::new(db),
            jwt,
        }
    }

    /// 注册新用户
    ///
    /// 邮箱重复返回 `Conflict`。注册路径不允许自授管理员，
    /// `is_admin` 一律落为 false。
    pub async fn register(&self, mut data: UserCreate) -> AppResult<AuthResponse> {
        data.validate()
            .map_err(|e| AppError::validation(e.to_string()))?;
        data.is_admin = false;

        if self.users.find_by_email(&data.email).await?.is_some() {
            return Err(AppError::conflict("Email already registered".to_string()));
        }

        let hashed = User::hash_password(&data.password)
            .map_err(|e| AppError::internal(format!("Password hashing failed: {e}")))?;

        let user = self.users.create(data, hashed).await?;

        tracing::info!(email = %user.email, "User registered");

        self.issue_tokens(user)
    }

    /// 登录
    ///
    /// 邮箱不存在和密码错误返回同一条错误，带固定延迟。
    pub async fn login(&self, data: LoginRequest) -> AppResult<AuthResponse> {
        data.validate()
            .map_err(|e| AppError::validation(e.to_string()))?;

        let user = match self.users.find_by_email(&data.email).await? {
            Some(u) => u,
            None => {
                tokio::time::sleep(FAILED_LOGIN_DELAY).await;
                return Err(AppError::invalid_credentials());
            }
        };

        let verified = user.verify_password(&data.password).unwrap_or(false);
        if !verified {
            tracing::warn!(email = %data.email, "Failed login attempt");
            tokio::time::sleep(FAILED_LOGIN_DELAY).await;
            return Err(AppError::invalid_credentials());
        }

        tracing::info!(email = %user.email, "User logged in");

        self.issue_tokens(user)
    }

    /// 用 refresh token 换新的 access token
    ///
    /// 校验令牌类型并确认用户仍然存在。
    pub async fn refresh(&self, data: RefreshRequest) -> AppResult<RefreshResponse> {
        let claims = self
            .jwt
            .validate_token(&data.refresh_token, TOKEN_TYPE_REFRESH)
            .map_err(|e| match e {
                crate::auth::JwtError::ExpiredToken => AppError::TokenExpired,
                _ => AppError::invalid_token("Invalid refresh token"),
            })?;

        let user = self
            .users
            .find_by_id(&claims.sub)
            .await?
            .ok_or_else(|| AppError::invalid_token("User no longer exists"))?;

        let access_token = self
            .jwt
            .generate_access_token(&claims.sub, &user.email, user.is_admin)
            .map_err(|e| AppError::internal(e.to_string()))?;

        Ok(RefreshResponse {
            access_token,
            token_type: "bearer",
        })
    }

    /// 用户总数 (管理端统计)
    pub async fn count_users(&self) -> AppResult<u64> {
        Ok(self.users.count().await?)
    }

    fn issue_tokens(&self, user: User) -> AppResult<AuthResponse> {
        let user_id = user
            .id
            .as_ref()
            .map(|t| t.to_string())
            .ok_or_else(|| AppError::internal("User record has no id".to_string()))?;

        let access_token = self
            .jwt
            .generate_access_token(&user_id, &user.email, user.is_admin)
            .map_err(|e| AppError::internal(e.to_string()))?;
        let refresh_token = self
            .jwt
            .generate_refresh_token(&user_id, &user.email, user.is_admin)
            .map_err(|e| AppError::internal(e.to_string()))?;

        Ok(AuthResponse {
            user: user.into(),
            access_token,
            refresh_token,
            token_type: "bearer",
        })
    }
}
