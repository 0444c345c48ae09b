//! JWT 令牌服务
//!
//! 处理 access/refresh 令牌的生成、验证和解析。

use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const TOKEN_TYPE_ACCESS: &str = "access";
pub const TOKEN_TYPE_REFRESH: &str = "refresh";

const DEFAULT_DEV_SECRET: &str = "powercore-dev-secret-change-in-production";

/// JWT 配置
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// JWT 密钥 (应至少 32 字节)
    pub secret: String,
    /// access token 过期时间 (分钟)
    pub access_minutes: i64,
    /// refresh token 过期时间 (天)
    pub refresh_days: i64,
    /// 令牌签发者
    pub issuer: String,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: std::env::var("JWT_SECRET").unwrap_or_else(|_| DEFAULT_DEV_SECRET.to_string()),
            access_minutes: std::env::var("JWT_ACCESS_MINUTES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(30),
            refresh_days: std::env::var("JWT_REFRESH_DAYS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(7),
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "powercore".to_string()),
        }
    }
}

impl JwtConfig {
    /// 密钥是否是未替换的开发默认值
    pub fn uses_default_secret(&self) -> bool {
        self.secret == DEFAULT_DEV_SECRET
    }
}

/// 存储在令牌中的 JWT Claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// 用户 ID (Subject)
    pub sub: String,
    /// 用户邮箱
    pub email: String,
    /// 是否管理员
    pub is_admin: bool,
    /// 令牌类型 (access | refresh)
    pub token_type: String,
    /// 过期时间戳
    pub exp: i64,
    /// 签发时间戳
    pub iat: i64,
    /// 签发者
    pub iss: String,
}

/// JWT 错误
#[derive(Error, Debug)]
pub enum JwtError {
    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Token expired")]
    ExpiredToken,

    #[error("Wrong token type: expected {expected}, got {actual}")]
    WrongTokenType { expected: String, actual: String },

    #[error("Token generation failed: {0}")]
    GenerationFailed(String),
}

/// JWT 认证服务
#[derive(Debug, Clone)]
pub struct JwtService {
    config: JwtConfig,
}

impl JwtService {
    pub fn new(config: JwtConfig) -> Self {
        Self { config }
    }

    /// 生成 access token
    pub fn generate_access_token(
        &self,
        user_id: &str,
        email: &str,
        is_admin: bool,
    ) -> Result<String, JwtError> {
        self.generate_token(
            user_id,
            email,
            is_admin,
            TOKEN_TYPE_ACCESS,
            Duration::minutes(self.config.access_minutes),
        )
    }

    /// 生成 refresh token
    pub fn generate_refresh_token(
        &self,
        user_id: &str,
        email: &str,
        is_admin: bool,
    ) -> Result<String, JwtError> {
        self.generate_token(
            user_id,
            email,
            is_admin,
            TOKEN_TYPE_REFRESH,
            Duration::days(self.config.refresh_days),
        )
    }

    fn generate_token(
        &self,
        user_id: &str,
        email: &str,
        is_admin: bool,
        token_type: &str,
        lifetime: Duration,
    ) -> Result<String, JwtError> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id.to_string(),
            email: email.to_string(),
            is_admin,
            token_type: token_type.to_string(),
            exp: (now + lifetime).timestamp(),
            iat: now.timestamp(),
            iss: self.config.issuer.clone(),
        };

        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.config.secret.as_bytes()),
        )
        .map_err(|e| JwtError::GenerationFailed(e.to_string()))
    }

    /// 验证令牌并检查类型 (access token 不能当 refresh token 用，反之亦然)
    pub fn validate_token(&self, token: &str, expected_type: &str) -> Result<Claims, JwtError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&self.config.issuer]);

        let data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.config.secret.as_bytes()),
            &validation,
        )
        .map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => JwtError::ExpiredToken,
            _ => JwtError::InvalidToken(e.to_string()),
        })?;

        if data.claims.token_type != expected_type {
            return Err(JwtError::WrongTokenType {
                expected: expected_type.to_string(),
                actual: data.claims.token_type,
            });
        }

        Ok(data.claims)
    }

    /// 从 `Authorization: Bearer <token>` 头中提取令牌
    pub fn extract_from_header(header: &str) -> Option<&str> {
        header.strip_prefix("Bearer ").map(str::trim)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_service() -> JwtService {
        JwtService::new(JwtConfig {
            secret: "test-secret-at-least-32-bytes-long!!".to_string(),
            access_minutes: 30,
            refresh_days: 7,
            issuer: "powercore-test".to_string(),
        })
    }

    #[test]
    fn test_access_token_roundtrip() {
        let service = test_service();
        let token = service
            .generate_access_token("users:abc", "user@example.com", false)
            .expect("Failed to generate test token");

        let claims = service
            .validate_token(&token, TOKEN_TYPE_ACCESS)
            .expect("Failed to validate test token");

        assert_eq!(claims.sub, "users:abc");
        assert_eq!(claims.email, "user@example.com");
        assert!(!claims.is_admin);
        assert_eq!(claims.token_type, TOKEN_TYPE_ACCESS);
    }

    #[test]
    fn test_refresh_token_rejected_as_access() {
        let service = test_service();
        let token = service
            .generate_refresh_token("users:abc", "user@example.com", true)
            .unwrap();

        let err = service.validate_token(&token, TOKEN_TYPE_ACCESS).unwrap_err();
        assert!(matches!(err, JwtError::WrongTokenType { .. }));
    }

    #[test]
    fn test_tampered_token_rejected() {
        let service = test_service();
        let token = service
            .generate_access_token("users:abc", "user@example.com", false)
            .unwrap();

        let other = JwtService::new(JwtConfig {
            secret: "another-secret-entirely-different!!!".to_string(),
            ..JwtConfig::default()
        });
        assert!(other.validate_token(&token, TOKEN_TYPE_ACCESS).is_err());
    }

    #[test]
    fn test_extract_from_header() {
        assert_eq!(
            JwtService::extract_from_header("Bearer abc.def.ghi"),
            Some("abc.def.ghi")
        );
        assert_eq!(JwtService::extract_from_header("Basic abc"), None);
    }
}
