//! Repository Module
//!
//! Provides CRUD operations for SurrealDB tables.

// Auth
pub mod user;

// Catalog
pub mod product;

// Orders
pub mod order;

// Reviews
pub mod review;

// Re-exports
pub use order::OrderRepository;
pub use product::ProductRepository;
pub use review::ReviewRepository;
pub use user::UserRepository;

use surrealdb::Surreal;
use surrealdb::engine::local::Db;
use surrealdb::sql::Thing;
use thiserror::Error;

/// Repository error types
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Duplicate: {0}")]
    Duplicate(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl From<surrealdb::Error> for RepoError {
    fn from(err: surrealdb::Error) -> Self {
        RepoError::Database(err.to_string())
    }
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;

/// 全栈统一使用 "table:id" 字符串格式的 ID
///
/// 客户端可以提交纯 id 或 "table:id"，仓库层负责归一化。
pub fn strip_table_prefix<'a>(table: &str, id: &'a str) -> &'a str {
    id.strip_prefix(&format!("{}:", table)).unwrap_or(id)
}

pub fn make_thing(table: &str, id: &str) -> Thing {
    Thing::from((table.to_string(), strip_table_prefix(table, id).to_string()))
}

/// 归一化为 "table:id" 规范形态
///
/// 外键字段 (如评价的 product_id) 落库前必须先过这里，否则同一条
/// 记录会因 "products:xyz" / "xyz" 两种写法分裂成两个键。
pub fn canonical_id(table: &str, id: &str) -> String {
    make_thing(table, id).to_raw()
}

/// Row shape for `SELECT count() ... GROUP ALL` queries
#[derive(Debug, serde::Deserialize)]
pub(crate) struct CountRow {
    pub count: u64,
}

/// Base repository with database reference
#[derive(Debug, Clone)]
pub struct BaseRepository {
    db: Surreal<Db>,
}

impl BaseRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self { db }
    }

    pub fn db(&self) -> &Surreal<Db> {
        &self.db
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_table_prefix() {
        assert_eq!(strip_table_prefix("products", "products:abc"), "abc");
        assert_eq!(strip_table_prefix("products", "abc"), "abc");
        assert_eq!(strip_table_prefix("products", "orders:abc"), "orders:abc");
    }

    #[test]
    fn test_make_thing() {
        let t = make_thing("products", "products:abc");
        assert_eq!(t.tb, "products");
        assert_eq!(t.to_string(), "products:abc");
    }

    #[test]
    fn test_canonical_id_accepts_both_forms() {
        assert_eq!(canonical_id("products", "abc"), "products:abc");
        assert_eq!(canonical_id("products", "products:abc"), "products:abc");
    }
}
