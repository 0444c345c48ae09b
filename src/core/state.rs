use std::sync::Arc;

use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use crate::auth::JwtService;
use crate::core::Config;
use crate::services::{
    AuthService, CalculatorService, OrderService, ProductService, ReviewService,
};
use crate::utils::AppError;

/// 服务器状态 - 持有所有服务的共享引用
///
/// ServerState 是商城后端的核心数据结构。所有服务在初始化时
/// 注入数据库句柄，handler 通过 `State<ServerState>` 访问。
/// 使用 Arc / Surreal 内部引用计数实现浅拷贝。
///
/// # 服务组件
///
/// | 字段 | 类型 | 说明 |
/// |------|------|------|
/// | config | Config | 配置项 (不可变) |
/// | db | Surreal<Db> | 嵌入式数据库 |
/// | jwt | Arc<JwtService> | JWT 认证服务 |
/// | products | ProductService | 商品目录服务 |
/// | orders | OrderService | 订单服务 (含支付模拟) |
/// | reviews | ReviewService | 评论与审核服务 |
/// | auth | AuthService | 注册 / 登录服务 |
#[derive(Clone, Debug)]
pub struct ServerState {
    /// 服务器配置
    pub config: Config,
    /// 嵌入式数据库 (SurrealDB)
    pub db: Surreal<Db>,
    /// JWT 认证服务 (Arc 共享所有权)
    pub jwt: Arc<JwtService>,
    /// 商品目录服务
    pub products: ProductService,
    /// 订单服务
    pub orders: OrderService,
    /// 评论服务
    pub reviews: ReviewService,
    /// 认证服务
    pub auth: AuthService,
    /// 选型计算服务
    pub calculator: CalculatorService,
}

impl ServerState {
    /// 初始化服务器状态
    ///
    /// 按顺序初始化：
    /// 1. 数据目录结构
    /// 2. 嵌入式数据库 (data_dir/database)
    /// 3. 各服务 (Product, Order, Review, Auth)
    pub async fn initialize(config: &Config) -> Result<Self, AppError> {
        config
            .ensure_data_dir_structure()
            .map_err(|e| AppError::internal(format!("Failed to create data directory: {e}")))?;

        if config.is_production() && config.jwt.uses_default_secret() {
            return Err(AppError::internal(
                "JWT_SECRET must be set in production".to_string(),
            ));
        }

        let db_dir = config.database_dir();
        let db = crate::db::connect(&db_dir.to_string_lossy()).await?;

        Ok(Self::with_db(config.clone(), db))
    }

    /// 基于已有数据库句柄构造状态
    ///
    /// 测试场景使用内存引擎时从这里进入
    pub fn with_db(config: Config, db: Surreal<Db>) -> Self {
        let jwt = Arc::new(JwtService::new(config.jwt.clone()));

        Self {
            products: ProductService::new(db.clone()),
            orders: OrderService::new(db.clone()),
            reviews: ReviewService::new(db.clone()),
            auth: AuthService::new(db.clone(), jwt.clone()),
            calculator: CalculatorService::new(db.clone()),
            config,
            db,
            jwt,
        }
    }
}
