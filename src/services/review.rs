//! Review Service - 评价提交、审核与评分重算
//!
//! 商品的聚合评分由全量重算维护：遍历该商品所有已批准的评价求均值。
//! 任何改变批准集合的操作 (审核、修改、删除) 之后都会触发重算。
//! 重算失败只记录日志，不回滚也不使触发它的操作失败。

use surrealdb::Surreal;
use surrealdb::engine::local::Db;
use validator::Validate;

use crate::db::models::{Review, ReviewCreate, ReviewUpdate};
use crate::db::repository::{ProductRepository, ReviewRepository};
use crate::utils::{AppError, AppResult, round2};

/// 评论服务
#[derive(Debug, Clone)]
pub struct ReviewService {
    reviews: ReviewRepository,
    products: ProductRepository,
}

impl ReviewService {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            reviews: ReviewRepository::new(db.clone()),
            products: ProductRepository::new(db),
        }
    }

    /// 提交评价
    ///
    /// 新评价始终以待审状态落库 (`is_approved = false`)，
    /// 不立即影响商品评分。认证用户对同一商品只能评价一次，
    /// 匿名评价不受此限制，但必须带显示名称。
    pub async fn create_review(
        &self,
        data: ReviewCreate,
        user_id: Option<String>,
    ) -> AppResult<Review> {
        data.validate()
            .map_err(|e| AppError::validation(e.to_string()))?;

        if user_id.is_none()
            && data
                .user_name
                .as_deref()
                .is_none_or(|name| name.trim().is_empty())
        {
            return Err(AppError::validation(
                "Display name is required for anonymous reviews".to_string(),
            ));
        }

        self.products
            .find_by_id(&data.product_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Product {}", data.product_id)))?;

        if let Some(uid) = &user_id {
            if self
                .reviews
                .find_by_product_and_user(&data.product_id, uid)
                .await?
                .is_some()
            {
                return Err(AppError::validation(
                    "You have already reviewed this product".to_string(),
                ));
            }
        }

        let review = self.reviews.create(data, user_id).await?;

        // 新评价未批准，重算当下无可见效果，仍无条件执行以自愈历史漂移
        self.recompute_and_log(&review.product_id).await;

        Ok(review)
    }

    /// 查询商品的评价列表
    ///
    /// 公开接口只返回已批准的评价，管理端可以取全部
    pub async fn get_product_reviews(
        &self,
        product_id: &str,
        approved_only: bool,
        limit: u64,
    ) -> AppResult<Vec<Review>> {
        Ok(self
            .reviews
            .find_by_product(product_id, approved_only, limit)
            .await?)
    }

    /// 修改自己的评价
    ///
    /// 只有评价作者本人可以修改。修改后评分相关字段变动时重算商品评分。
    pub async fn update_review(
        &self,
        id: &str,
        data: ReviewUpdate,
        user_id: &str,
    ) -> AppResult<Review> {
        data.validate()
            .map_err(|e| AppError::validation(e.to_string()))?;

        let existing = self
            .reviews
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Review {id}")))?;

        if existing.user_id.as_deref() != Some(user_id) {
            return Err(AppError::forbidden("You can only edit your own reviews"));
        }

        let touches_rating = data.touches_rating();
        let updated = self.reviews.update(id, data).await?;

        if touches_rating {
            self.recompute_and_log(&updated.product_id).await;
        }

        Ok(updated)
    }

    /// 删除评价
    ///
    /// 作者本人或管理员可删。删除后重算商品评分。
    pub async fn delete_review(&self, id: &str, user_id: &str, is_admin: bool) -> AppResult<()> {
        let existing = self
            .reviews
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Review {id}")))?;

        if !is_admin && existing.user_id.as_deref() != Some(user_id) {
            return Err(AppError::forbidden("You can only delete your own reviews"));
        }

        self.reviews.delete(id).await?;
        self.recompute_and_log(&existing.product_id).await;

        Ok(())
    }

    /// 审核裁决 (管理端)
    ///
    /// 设置 `is_approved` 并标记 `is_moderated = true`。
    /// 重复裁决是幂等的；每次裁决后都重算商品评分。
    pub async fn moderate_review(
        &self,
        id: &str,
        approved: bool,
        moderator_comment: Option<String>,
    ) -> AppResult<Review> {
        let review = self.reviews.moderate(id, approved, moderator_comment).await?;

        tracing::info!(
            review_id = %id,
            approved = %approved,
            "Review moderated"
        );

        self.recompute_and_log(&review.product_id).await;

        Ok(review)
    }

    /// 按 ID 查询评价
    pub async fn get_review_by_id(&self, id: &str) -> AppResult<Review> {
        self.reviews
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Review {id}")))
    }

    /// 待审评价列表 (管理端)
    pub async fn get_pending_reviews(&self, limit: u64) -> AppResult<Vec<Review>> {
        Ok(self.reviews.find_pending(limit).await?)
    }

    /// 全部评价列表 (管理端)
    pub async fn get_all_reviews(&self, limit: u64) -> AppResult<Vec<Review>> {
        Ok(self.reviews.find_all(limit).await?)
    }

    /// 待审评价数量
    pub async fn count_pending(&self) -> AppResult<u64> {
        Ok(self.reviews.count_pending().await?)
    }

    /// 全量重算商品的聚合评分
    ///
    /// rating = 已批准评价的均值 (两位小数)，rating_count = 已批准数量。
    /// 没有已批准评价时写回 (0.0, 0)。同一输入重复执行结果不变。
    pub async fn recompute_product_rating(&self, product_id: &str) -> AppResult<(f64, i64)> {
        let approved = self.reviews.find_approved(product_id).await?;

        let (rating, count) = if approved.is_empty() {
            (0.0, 0)
        } else {
            let sum: f64 = approved.iter().map(|r| r.rating).sum();
            (round2(sum / approved.len() as f64), approved.len() as i64)
        };

        self.products
            .write_rating(product_id, rating, count)
            .await?;

        Ok((rating, count))
    }

    /// 重算的吞错边界：失败记日志，绝不向触发操作传播
    async fn recompute_and_log(&self, product_id: &str) {
        if let Err(e) = self.recompute_product_rating(product_id).await {
            tracing::error!(
                product_id = %product_id,
                error = %e,
                "Failed to recompute product rating"
            );
        }
    }
}
