//! 工具模块 - 通用工具函数和类型
//!
//! # 内容
//!
//! - [`AppError`] - 应用错误类型
//! - [`AppResponse`] - API 响应结构
//! - 日志等工具

pub mod error;
pub mod logger;

pub use error::{AppError, AppResult, ErrorBody, ErrorResponse};
pub use logger::init_logger;

/// API 响应结构 (成功路径)
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct AppResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> AppResponse<T> {
    /// 创建成功响应
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
        }
    }
}

/// Round to two decimal places, matching the precision kept for
/// aggregate ratings in stored documents.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::round2;

    #[test]
    fn test_round2() {
        assert_eq!(round2(4.333333), 4.33);
        assert_eq!(round2(4.5), 4.5);
        assert_eq!(round2(12.0 / 3.0), 4.0);
    }
}
