//! Database Module
//!
//! Embedded SurrealDB storage: connection setup and table definitions.

pub mod models;
pub mod repository;

use surrealdb::Surreal;
use surrealdb::engine::local::{Db, RocksDb};

use crate::utils::AppError;

const NAMESPACE: &str = "powercore";
const DATABASE: &str = "powercore";

/// Open the embedded database and prepare indexes.
///
/// 连接是进程级别的：启动时建立一次，关闭时随进程回收；
/// 所有引擎通过构造参数接收这个句柄，不查询全局状态。
pub async fn connect(data_dir: &str) -> Result<Surreal<Db>, AppError> {
    let path = format!("{}/powercore.db", data_dir);
    let db = Surreal::new::<RocksDb>(path.as_str())
        .await
        .map_err(|e| AppError::database(format!("Failed to open database: {}", e)))?;

    db.use_ns(NAMESPACE)
        .use_db(DATABASE)
        .await
        .map_err(|e| AppError::database(format!("Failed to select namespace: {}", e)))?;

    define_tables(&db).await?;

    tracing::info!(path = %path, "Database connection established");
    Ok(db)
}

/// Index definitions - safe to re-run on every startup
pub async fn define_tables(db: &Surreal<Db>) -> Result<(), AppError> {
    db.query("DEFINE INDEX IF NOT EXISTS user_email ON TABLE users FIELDS email UNIQUE")
        .await
        .map_err(|e| AppError::database(format!("Failed to define indexes: {}", e)))?;
    Ok(())
}
