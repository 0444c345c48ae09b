//! Product Model

use serde::{Deserialize, Serialize};
use surrealdb::sql::Thing;
use validator::Validate;

use super::serde_thing;

pub type ProductId = Thing;

/// Product model
///
/// `rating` 和 `rating_count` 是派生字段，只能由评价引擎的重算流程
/// (或一次性评分折叠) 写入，其他路径一律不得修改。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "serde_thing::option::serialize",
        deserialize_with = "serde_thing::option::deserialize",
        default
    )]
    pub id: Option<ProductId>,
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    pub image_url: Option<String>,
    /// 电池容量 (mAh)
    pub capacity: Option<i64>,
    /// 输出功率 (W)
    pub power: Option<i64>,
    /// 电池类型 (Li-Ion, Li-Po, ...)
    pub battery_type: Option<String>,
    pub brand: Option<String>,
    pub category: Option<String>,
    /// 重量 (kg)
    pub weight: Option<f64>,
    pub dimensions: Option<String>,
    #[serde(default)]
    pub stock: i64,
    #[serde(default = "default_true")]
    pub is_active: bool,
    /// 平均评分 (0-5)，派生字段
    #[serde(default)]
    pub rating: f64,
    /// 评分数量，派生字段
    #[serde(default)]
    pub rating_count: i64,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ProductCreate {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    pub description: Option<String>,
    #[validate(range(exclusive_min = 0.0))]
    pub price: f64,
    pub image_url: Option<String>,
    #[validate(range(min = 0))]
    pub capacity: Option<i64>,
    #[validate(range(min = 0))]
    pub power: Option<i64>,
    pub battery_type: Option<String>,
    pub brand: Option<String>,
    pub category: Option<String>,
    #[validate(range(min = 0.0))]
    pub weight: Option<f64>,
    pub dimensions: Option<String>,
    #[serde(default)]
    #[validate(range(min = 0))]
    pub stock: i64,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    #[validate(range(min = 0.0, max = 5.0))]
    pub rating: f64,
    #[serde(default)]
    #[validate(range(min = 0))]
    pub rating_count: i64,
}

/// 部分更新：只应用调用方提供的字段，缺省字段保持不变
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct ProductUpdate {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    pub description: Option<String>,
    #[validate(range(exclusive_min = 0.0))]
    pub price: Option<f64>,
    pub image_url: Option<String>,
    #[validate(range(min = 0))]
    pub capacity: Option<i64>,
    #[validate(range(min = 0))]
    pub power: Option<i64>,
    pub battery_type: Option<String>,
    pub brand: Option<String>,
    pub category: Option<String>,
    #[validate(range(min = 0.0))]
    pub weight: Option<f64>,
    pub dimensions: Option<String>,
    #[validate(range(min = 0))]
    pub stock: Option<i64>,
    pub is_active: Option<bool>,
}

/// 商品列表过滤条件
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductFilters {
    pub capacity_min: Option<i64>,
    pub capacity_max: Option<i64>,
    pub power_min: Option<i64>,
    pub power_max: Option<i64>,
    pub battery_type: Option<String>,
    pub price_min: Option<f64>,
    pub price_max: Option<f64>,
    pub brand: Option<String>,
    pub category: Option<String>,
}

impl ProductFilters {
    pub fn is_empty(&self) -> bool {
        self.capacity_min.is_none()
            && self.capacity_max.is_none()
            && self.power_min.is_none()
            && self.power_max.is_none()
            && self.battery_type.is_none()
            && self.price_min.is_none()
            && self.price_max.is_none()
            && self.brand.is_none()
            && self.category.is_none()
    }
}

/// 分页参数
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct Pagination {
    #[serde(default = "default_page")]
    pub page: u64,
    #[serde(default = "default_limit")]
    pub limit: u64,
}

fn default_page() -> u64 {
    1
}

fn default_limit() -> u64 {
    20
}

impl Default for Pagination {
    fn default() -> Self {
        Self { page: 1, limit: 20 }
    }
}

impl Pagination {
    /// Clamp to sane bounds before building queries
    pub fn normalized(self) -> Self {
        Self {
            page: self.page.max(1),
            limit: self.limit.clamp(1, 100),
        }
    }

    pub fn skip(&self) -> u64 {
        (self.page - 1) * self.limit
    }
}

/// 分页响应信封
#[derive(Debug, Serialize)]
pub struct PaginatedResponse<T> {
    pub page: u64,
    pub limit: u64,
    pub total: u64,
    pub pages: u64,
    pub items: Vec<T>,
}

impl<T> PaginatedResponse<T> {
    pub fn new(page: u64, limit: u64, total: u64, items: Vec<T>) -> Self {
        let pages = if total > 0 { total.div_ceil(limit) } else { 0 };
        Self {
            page,
            limit,
            total,
            pages,
            items,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pagination_skip() {
        let p = Pagination { page: 3, limit: 20 };
        assert_eq!(p.skip(), 40);
    }

    #[test]
    fn test_pagination_normalized_bounds() {
        let p = Pagination { page: 0, limit: 500 }.normalized();
        assert_eq!(p.page, 1);
        assert_eq!(p.limit, 100);
    }

    #[test]
    fn test_paginated_response_pages() {
        let r: PaginatedResponse<()> = PaginatedResponse::new(1, 20, 41, vec![]);
        assert_eq!(r.pages, 3);

        let empty: PaginatedResponse<()> = PaginatedResponse::new(1, 20, 0, vec![]);
        assert_eq!(empty.pages, 0);
    }
}
