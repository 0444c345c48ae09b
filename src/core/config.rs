use std::path::PathBuf;

use crate::auth::JwtConfig;

/// 服务器配置 - 商城后端的所有配置项
///
/// # 环境变量
///
/// 所有配置项都可以通过环境变量覆盖：
///
/// | 环境变量 | 默认值 | 说明 |
/// |----------|--------|------|
/// | DATA_DIR | ./data | 数据目录 (数据库、日志) |
/// | HTTP_PORT | 8000 | HTTP 服务端口 |
/// | JWT_SECRET | (开发默认值) | JWT 签名密钥 |
/// | JWT_ACCESS_MINUTES | 30 | access token 有效期(分钟) |
/// | JWT_REFRESH_DAYS | 7 | refresh token 有效期(天) |
/// | CORS_ORIGINS | * | 允许的跨域来源，逗号分隔 |
/// | LOG_LEVEL | info | 日志级别 |
/// | ENVIRONMENT | development | 运行环境 |
/// | REQUEST_TIMEOUT_MS | 30000 | 请求超时(毫秒) |
///
/// # 示例
///
/// ```ignore
/// DATA_DIR=/var/lib/powercore HTTP_PORT=8080 cargo run
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// 数据目录，存储数据库和日志文件
    pub data_dir: String,
    /// HTTP API 服务端口
    pub http_port: u16,
    /// JWT 认证配置
    pub jwt: JwtConfig,
    /// 允许的跨域来源 ("*" 表示任意来源)
    pub cors_origins: Vec<String>,
    /// 日志级别 (trace | debug | info | warn | error)
    pub log_level: String,
    /// 运行环境: development | staging | production
    pub environment: String,
    /// 请求超时时间 (毫秒)
    pub request_timeout_ms: u64,
}

impl Config {
    /// 从环境变量加载配置
    ///
    /// 如果环境变量未设置，使用默认值
    pub fn from_env() -> Self {
        Self {
            data_dir: std::env::var("DATA_DIR").unwrap_or_else(|_| "./data".into()),
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8000),
            jwt: JwtConfig::default(),
            cors_origins: std::env::var("CORS_ORIGINS")
                .unwrap_or_else(|_| "*".into())
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
            request_timeout_ms: std::env::var("REQUEST_TIMEOUT_MS")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(30000),
        }
    }

    /// 数据库存储目录 (data_dir/database)
    pub fn database_dir(&self) -> PathBuf {
        PathBuf::from(&self.data_dir).join("database")
    }

    /// 日志目录 (data_dir/logs)
    pub fn log_dir(&self) -> PathBuf {
        PathBuf::from(&self.data_dir).join("logs")
    }

    /// 确保数据目录结构存在
    pub fn ensure_data_dir_structure(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(self.database_dir())?;
        std::fs::create_dir_all(self.log_dir())?;
        Ok(())
    }

    /// 是否允许任意跨域来源
    pub fn cors_allow_any(&self) -> bool {
        self.cors_origins.iter().any(|o| o == "*")
    }

    /// 是否生产环境
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// 是否开发环境
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
