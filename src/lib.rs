//! PowerCore - 便携电源设备商城后端
//!
//! # 架构概述
//!
//! - **商品目录** (`services/product`): CRUD、过滤分页、搜索、评分折叠
//! - **订单** (`services/order`): 行项目校验、配送费、支付模拟结算
//! - **评价** (`services/review`): 提交、审核、聚合评分重算
//! - **认证** (`auth`): JWT + Argon2 认证体系
//! - **HTTP API** (`api`): RESTful API 接口
//! - **数据库** (`db`): 嵌入式 SurrealDB 存储
//!
//! # 模块结构
//!
//! ```text
//! src/
//! ├── core/          # 配置、状态、服务器
//! ├── auth/          # JWT 认证、提取器
//! ├── services/      # 业务服务层
//! ├── api/           # HTTP 路由和处理器
//! ├── db/            # 模型与仓储
//! └── utils/         # 错误、日志、工具函数
//! ```

pub mod api;
pub mod auth;
pub mod core;
pub mod db;
pub mod services;
pub mod utils;

// Re-export 公共类型
pub use auth::{CurrentAdmin, CurrentUser, JwtService, OptionalUser};
pub use core::{Config, Server, ServerState};
pub use utils::{AppError, AppResponse, AppResult};

// Re-export logger functions
pub use utils::logger::init_logger;

/// 环境准备：加载 .env 并初始化日志
pub fn setup_environment() {
    dotenv::dotenv().ok();

    let config = Config::from_env();
    let log_dir = config.log_dir();
    utils::logger::init_logger(&config.log_level, log_dir.to_str());
}

pub fn print_banner() {
    println!(
        r#"
    ____                          ______
   / __ \____ _      _____  _____/ ____/___  ________
  / /_/ / __ \ | /| / / _ \/ ___/ /   / __ \/ ___/ _ \
 / ____/ /_/ / |/ |/ /  __/ /  / /___/ /_/ / /  /  __/
/_/    \____/|__/|__/\___/_/   \____/\____/_/   \___/
    "#
    );
}
