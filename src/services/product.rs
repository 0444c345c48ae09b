//! Product Service - 商品目录操作

use surrealdb::Surreal;
use surrealdb::engine::local::Db;
use validator::Validate;

use crate::db::models::{
    PaginatedResponse, Pagination, Product, ProductCreate, ProductFilters, ProductUpdate,
};
use crate::db::repository::ProductRepository;
use crate::utils::{AppError, AppResult};

/// 商品目录服务
#[derive(Debug, Clone)]
pub struct ProductService {
    products: ProductRepository,
}

impl ProductService {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            products: ProductRepository::new(db),
        }
    }

    pub(crate) fn repo(&self) -> &ProductRepository {
        &self.products
    }

    /// 过滤 + 分页的商品列表
    pub async fn list_products(
        &self,
        pagination: Pagination,
        filters: &ProductFilters,
        only_active: bool,
    ) -> AppResult<PaginatedResponse<Product>> {
        let pagination = pagination.normalized();
        let (items, total) = self
            .products
            .find_paginated(pagination, filters, only_active)
            .await?;

        Ok(PaginatedResponse::new(
            pagination.page,
            pagination.limit,
            total,
            items,
        ))
    }

    /// 按 ID 查询商品 (含已下架，前端据 is_active 自行处理展示)
    pub async fn get_product(&self, id: &str) -> AppResult<Product> {
        self.products
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Product {id}")))
    }

    /// 子串搜索 (名称 / 描述 / 电池类型，大小写不敏感)
    pub async fn search_products(&self, query: &str, limit: u64) -> AppResult<Vec<Product>> {
        Ok(self.products.search(query, limit.clamp(1, 100)).await?)
    }

    /// 创建商品 (管理端)
    pub async fn create_product(&self, data: ProductCreate) -> AppResult<Product> {
        data.validate()
            .map_err(|e| AppError::validation(e.to_string()))?;
        Ok(self.products.create(data).await?)
    }

    /// 部分更新商品 (管理端)
    pub async fn update_product(&self, id: &str, data: ProductUpdate) -> AppResult<Product> {
        data.validate()
            .map_err(|e| AppError::validation(e.to_string()))?;
        Ok(self.products.update(id, data).await?)
    }

    /// 下架商品 (软删除，记录保留)
    pub async fn delete_product(&self, id: &str) -> AppResult<()> {
        Ok(self.products.soft_delete(id).await?)
    }

    /// 一次性评分折叠
    ///
    /// 与评价审核驱动的重算是两条独立的写入路径，
    /// 同一商品只应使用其中一种。
    pub async fn rate_product(&self, id: &str, rating: f64) -> AppResult<Product> {
        if !(1.0..=5.0).contains(&rating) {
            return Err(AppError::validation(
                "Rating must be between 1.0 and 5.0".to_string(),
            ));
        }
        Ok(self.products.fold_rating(id, rating).await?)
    }
}
