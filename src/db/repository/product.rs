//! Product Repository

use chrono::Utc;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use super::{BaseRepository, CountRow, RepoError, RepoResult, make_thing, strip_table_prefix};
use crate::db::models::{Pagination, Product, ProductCreate, ProductFilters, ProductUpdate};
use crate::utils::round2;

pub(crate) const PRODUCT_TABLE: &str = "products";

/// 商品分类对应的关键词 (沿用目录数据的命名习惯：分类信息
/// 常常只体现在名称/描述里，所以按关键词匹配而不是精确等值)
fn category_keywords(category: &str) -> Option<&'static [&'static str]> {
    match category {
        "Power Bank" => Some(&["power bank", "powerbank"]),
        "UPS" => Some(&["ups", "back-ups", "безперебійн"]),
        "Solar" => Some(&["solar", "сонячн"]),
        "Car Starter" => Some(&["jump", "car", "авто", "стартер"]),
        "Power Station" => Some(&["powerhouse", "river", "station", "електростанц"]),
        "Wireless Stand" => Some(&["wireless stand", "бездротов"]),
        "Laptop Power Bank" => Some(&["laptop", "ноутбук"]),
        _ => None,
    }
}

// =============================================================================
// Product Repository
// =============================================================================

#[derive(Debug, Clone)]
pub struct ProductRepository {
    base: BaseRepository,
}

impl ProductRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Find product by id
    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<Product>> {
        let pure_id = strip_table_prefix(PRODUCT_TABLE, id);
        let product: Option<Product> = self.base.db().select((PRODUCT_TABLE, pure_id)).await?;
        Ok(product)
    }

    /// Find products with filters and pagination, returns (items, total)
    pub async fn find_paginated(
        &self,
        pagination: Pagination,
        filters: &ProductFilters,
        only_active: bool,
    ) -> RepoResult<(Vec<Product>, u64)> {
        let (where_clause, binds) = Self::build_filter_clause(filters, only_active);

        let count_query = format!(
            "SELECT count() AS count FROM {} {} GROUP ALL",
            PRODUCT_TABLE, where_clause
        );
        let mut query = self.base.db().query(&count_query);
        for (name, value) in &binds {
            query = query.bind((name.clone(), value.clone()));
        }
        let rows: Vec<CountRow> = query.await?.take(0)?;
        let total = rows.first().map(|r| r.count).unwrap_or(0);

        let select_query = format!(
            "SELECT * FROM {} {} ORDER BY created_at DESC LIMIT $limit START $start",
            PRODUCT_TABLE, where_clause
        );
        let mut query = self
            .base
            .db()
            .query(&select_query)
            .bind(("limit", pagination.limit as i64))
            .bind(("start", pagination.skip() as i64));
        for (name, value) in binds {
            query = query.bind((name, value));
        }
        let products: Vec<Product> = query.await?.take(0)?;

        Ok((products, total))
    }

    /// 名称/描述/电池类型的子串搜索 (大小写不敏感)
    pub async fn search(&self, search_query: &str, limit: u64) -> RepoResult<Vec<Product>> {
        let needle = search_query.trim().to_lowercase();
        if needle.is_empty() {
            return Ok(vec![]);
        }

        let products: Vec<Product> = self
            .base
            .db()
            .query(format!(
                "SELECT * FROM {} WHERE is_active = true AND ( \
                     string::contains(string::lowercase(name), $q) \
                     OR string::contains(string::lowercase(description ?? ''), $q) \
                     OR string::contains(string::lowercase(battery_type ?? ''), $q) \
                 ) ORDER BY created_at DESC LIMIT $limit",
                PRODUCT_TABLE
            ))
            .bind(("q", needle))
            .bind(("limit", limit as i64))
            .await?
            .take(0)?;

        Ok(products)
    }

    /// Create a new product
    pub async fn create(&self, data: ProductCreate) -> RepoResult<Product> {
        let now = Utc::now();
        let product = Product {
            id: None,
            name: data.name,
            description: data.description,
            price: data.price,
            image_url: data.image_url,
            capacity: data.capacity,
            power: data.power,
            battery_type: data.battery_type,
            brand: data.brand,
            category: data.category,
            weight: data.weight,
            dimensions: data.dimensions,
            stock: data.stock,
            is_active: data.is_active,
            rating: data.rating,
            rating_count: data.rating_count,
            created_at: now,
            updated_at: now,
        };

        let created: Option<Product> = self
            .base
            .db()
            .create(PRODUCT_TABLE)
            .content(product)
            .await?;

        created.ok_or_else(|| RepoError::Database("Failed to create product".to_string()))
    }

    /// Update a product (partial: only fields present in the payload)
    pub async fn update(&self, id: &str, data: ProductUpdate) -> RepoResult<Product> {
        let pure_id = strip_table_prefix(PRODUCT_TABLE, id);
        let thing = make_thing(PRODUCT_TABLE, pure_id);

        // Build dynamic SET clauses with proper type bindings
        let mut set_parts: Vec<&str> = Vec::new();
        if data.name.is_some() { set_parts.push("name = $name"); }
        if data.description.is_some() { set_parts.push("description = $description"); }
        if data.price.is_some() { set_parts.push("price = $price"); }
        if data.image_url.is_some() { set_parts.push("image_url = $image_url"); }
        if data.capacity.is_some() { set_parts.push("capacity = $capacity"); }
        if data.power.is_some() { set_parts.push("power = $power"); }
        if data.battery_type.is_some() { set_parts.push("battery_type = $battery_type"); }
        if data.brand.is_some() { set_parts.push("brand = $brand"); }
        if data.category.is_some() { set_parts.push("category = $category"); }
        if data.weight.is_some() { set_parts.push("weight = $weight"); }
        if data.dimensions.is_some() { set_parts.push("dimensions = $dimensions"); }
        if data.stock.is_some() { set_parts.push("stock = $stock"); }
        if data.is_active.is_some() { set_parts.push("is_active = $is_active"); }

        if set_parts.is_empty() {
            // No fields to update
            return self
                .find_by_id(pure_id)
                .await?
                .ok_or_else(|| RepoError::NotFound(format!("Product {}", id)));
        }
        set_parts.push("updated_at = time::now()");

        let query_str = format!("UPDATE $thing SET {} RETURN AFTER", set_parts.join(", "));

        let mut query = self.base.db().query(&query_str).bind(("thing", thing));
        if let Some(v) = data.name { query = query.bind(("name", v)); }
        if let Some(v) = data.description { query = query.bind(("description", v)); }
        if let Some(v) = data.price { query = query.bind(("price", v)); }
        if let Some(v) = data.image_url { query = query.bind(("image_url", v)); }
        if let Some(v) = data.capacity { query = query.bind(("capacity", v)); }
        if let Some(v) = data.power { query = query.bind(("power", v)); }
        if let Some(v) = data.battery_type { query = query.bind(("battery_type", v)); }
        if let Some(v) = data.brand { query = query.bind(("brand", v)); }
        if let Some(v) = data.category { query = query.bind(("category", v)); }
        if let Some(v) = data.weight { query = query.bind(("weight", v)); }
        if let Some(v) = data.dimensions { query = query.bind(("dimensions", v)); }
        if let Some(v) = data.stock { query = query.bind(("stock", v)); }
        if let Some(v) = data.is_active { query = query.bind(("is_active", v)); }

        let products: Vec<Product> = query.await?.take(0)?;
        products
            .into_iter()
            .next()
            .ok_or_else(|| RepoError::NotFound(format!("Product {}", id)))
    }

    /// Soft delete (is_active = false), the record itself is kept
    pub async fn soft_delete(&self, id: &str) -> RepoResult<()> {
        let thing = make_thing(PRODUCT_TABLE, id);
        let products: Vec<Product> = self
            .base
            .db()
            .query("UPDATE $thing SET is_active = false, updated_at = time::now() RETURN AFTER")
            .bind(("thing", thing))
            .await?
            .take(0)?;

        if products.is_empty() {
            return Err(RepoError::NotFound(format!("Product {}", id)));
        }
        Ok(())
    }

    /// 一次性评分折叠：new = (old*count + rating) / (count+1)
    ///
    /// 与评价驱动的重算写同样两个字段；同一商品只应使用其中一种机制。
    pub async fn fold_rating(&self, id: &str, rating: f64) -> RepoResult<Product> {
        let product = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Product {}", id)))?;

        let new_count = product.rating_count + 1;
        let new_rating =
            round2((product.rating * product.rating_count as f64 + rating) / new_count as f64);

        self.write_rating(id, new_rating, new_count).await?;

        self.find_by_id(id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Product {}", id)))
    }

    /// 写入派生评分字段 - 评分重算与折叠之外的路径不得调用
    pub async fn write_rating(&self, id: &str, rating: f64, rating_count: i64) -> RepoResult<()> {
        let thing = make_thing(PRODUCT_TABLE, id);
        let products: Vec<Product> = self
            .base
            .db()
            .query(
                "UPDATE $thing SET rating = $rating, rating_count = $rating_count, \
                 updated_at = time::now() RETURN AFTER",
            )
            .bind(("thing", thing))
            .bind(("rating", rating))
            .bind(("rating_count", rating_count))
            .await?
            .take(0)?;

        if products.is_empty() {
            return Err(RepoError::NotFound(format!("Product {}", id)));
        }
        Ok(())
    }

    /// 功率计算器用：容量区间内的充电宝类商品，按容量升序
    pub async fn find_power_banks_by_capacity(
        &self,
        min_capacity: i64,
        max_capacity: Option<i64>,
        limit: u64,
    ) -> RepoResult<Vec<Product>> {
        let categories = vec![
            "Power Bank".to_string(),
            "Solar Power Bank".to_string(),
            "Laptop Power Bank".to_string(),
        ];

        let mut query_str = String::from(
            "SELECT * FROM products WHERE category IN $categories \
             AND capacity >= $min_capacity AND is_active = true",
        );
        if max_capacity.is_some() {
            query_str.push_str(" AND capacity <= $max_capacity");
        }
        query_str.push_str(" ORDER BY capacity ASC LIMIT $limit");

        let mut query = self
            .base
            .db()
            .query(query_str)
            .bind(("categories", categories))
            .bind(("min_capacity", min_capacity))
            .bind(("limit", limit as i64));
        if let Some(max) = max_capacity {
            query = query.bind(("max_capacity", max));
        }

        let products: Vec<Product> = query.await?.take(0)?;
        Ok(products)
    }

    /// UPS 计算器用：满足最小功率的 UPS，按功率升序
    pub async fn find_ups_by_min_power(
        &self,
        min_power: i64,
        limit: u64,
    ) -> RepoResult<Vec<Product>> {
        let products: Vec<Product> = self
            .base
            .db()
            .query(
                "SELECT * FROM products WHERE category = 'UPS' \
                 AND power >= $min_power AND is_active = true \
                 ORDER BY power ASC LIMIT $limit",
            )
            .bind(("min_power", min_power))
            .bind(("limit", limit as i64))
            .await?
            .take(0)?;
        Ok(products)
    }

    /// Count products, optionally only active ones
    pub async fn count(&self, only_active: bool) -> RepoResult<u64> {
        let query_str = if only_active {
            "SELECT count() AS count FROM products WHERE is_active = true GROUP ALL"
        } else {
            "SELECT count() AS count FROM products GROUP ALL"
        };
        let rows: Vec<CountRow> = self.base.db().query(query_str).await?.take(0)?;
        Ok(rows.first().map(|r| r.count).unwrap_or(0))
    }

    /// 把过滤条件编译为 WHERE 子句和绑定参数
    fn build_filter_clause(
        filters: &ProductFilters,
        only_active: bool,
    ) -> (String, Vec<(String, surrealdb::sql::Value)>) {
        use surrealdb::sql::Value;

        let mut clauses: Vec<String> = Vec::new();
        let mut binds: Vec<(String, Value)> = Vec::new();

        if only_active {
            clauses.push("is_active = true".to_string());
        }
        if let Some(v) = filters.capacity_min {
            clauses.push("capacity >= $capacity_min".to_string());
            binds.push(("capacity_min".to_string(), Value::from(v)));
        }
        if let Some(v) = filters.capacity_max {
            clauses.push("capacity <= $capacity_max".to_string());
            binds.push(("capacity_max".to_string(), Value::from(v)));
        }
        if let Some(v) = filters.power_min {
            clauses.push("power >= $power_min".to_string());
            binds.push(("power_min".to_string(), Value::from(v)));
        }
        if let Some(v) = filters.power_max {
            clauses.push("power <= $power_max".to_string());
            binds.push(("power_max".to_string(), Value::from(v)));
        }
        if let Some(ref v) = filters.battery_type {
            clauses.push("battery_type = $battery_type".to_string());
            binds.push(("battery_type".to_string(), Value::from(v.clone())));
        }
        if let Some(v) = filters.price_min {
            clauses.push("price >= $price_min".to_string());
            binds.push(("price_min".to_string(), Value::from(v)));
        }
        if let Some(v) = filters.price_max {
            clauses.push("price <= $price_max".to_string());
            binds.push(("price_max".to_string(), Value::from(v)));
        }
        if let Some(ref v) = filters.brand {
            // 品牌按名称前缀匹配
            clauses.push(
                "string::starts_with(string::lowercase(name), $brand)".to_string(),
            );
            binds.push(("brand".to_string(), Value::from(v.to_lowercase())));
        }
        if let Some(ref v) = filters.category {
            if let Some(keywords) = category_keywords(v) {
                let alternatives: Vec<String> = keywords
                    .iter()
                    .map(|kw| {
                        format!(
                            "string::contains(string::lowercase(name), '{kw}') \
                             OR string::contains(string::lowercase(description ?? ''), '{kw}')"
                        )
                    })
                    .collect();
                clauses.push(format!("({})", alternatives.join(" OR ")));
            } else {
                clauses.push("category = $category".to_string());
                binds.push(("category".to_string(), Value::from(v.clone())));
            }
        }

        if clauses.is_empty() {
            (String::new(), binds)
        } else {
            (format!("WHERE {}", clauses.join(" AND ")), binds)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_clause_empty() {
        let (clause, binds) = ProductRepository::build_filter_clause(&ProductFilters::default(), false);
        assert!(clause.is_empty());
        assert!(binds.is_empty());
    }

    #[test]
    fn test_filter_clause_ranges() {
        let filters = ProductFilters {
            capacity_min: Some(10000),
            price_max: Some(2500.0),
            ..Default::default()
        };
        let (clause, binds) = ProductRepository::build_filter_clause(&filters, true);
        assert!(clause.starts_with("WHERE is_active = true"));
        assert!(clause.contains("capacity >= $capacity_min"));
        assert!(clause.contains("price <= $price_max"));
        assert_eq!(binds.len(), 2);
    }

    #[test]
    fn test_filter_clause_category_keywords() {
        let filters = ProductFilters {
            category: Some("UPS".to_string()),
            ..Default::default()
        };
        let (clause, _) = ProductRepository::build_filter_clause(&filters, true);
        assert!(clause.contains("'ups'"));
        assert!(clause.contains(" OR "));
    }
}
