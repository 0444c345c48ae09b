//! JWT 认证模块
//!
//! - [`JwtService`]: 令牌的生成与验证
//! - [`CurrentUser`] / [`CurrentAdmin`] / [`OptionalUser`]: axum 提取器

mod extractor;
mod jwt;

pub use extractor::{CurrentAdmin, CurrentUser, OptionalUser};
pub use jwt::{Claims, JwtConfig, JwtError, JwtService, TOKEN_TYPE_ACCESS, TOKEN_TYPE_REFRESH};
