//! Review Repository

use chrono::Utc;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use super::product::PRODUCT_TABLE;
use super::{
    BaseRepository, CountRow, RepoError, RepoResult, canonical_id, make_thing, strip_table_prefix,
};
use crate::db::models::{Review, ReviewCreate, ReviewUpdate};

const REVIEW_TABLE: &str = "reviews";

// =============================================================================
// Review Repository
// =============================================================================

#[derive(Debug, Clone)]
pub struct ReviewRepository {
    base: BaseRepository,
}

impl ReviewRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Create a new review - starts unapproved and unmoderated
    ///
    /// product_id 落库前归一化，保证同一商品的评价只有一个键
    pub async fn create(&self, data: ReviewCreate, user_id: Option<String>) -> RepoResult<Review> {
        let now = Utc::now();
        let review = Review {
            id: None,
            product_id: canonical_id(PRODUCT_TABLE, &data.product_id),
            user_id,
            user_name: data.user_name,
            rating: data.rating,
            comment: data.comment,
            is_approved: false,
            is_moderated: false,
            moderator_comment: None,
            created_at: now,
            updated_at: now,
        };

        let created: Option<Review> = self.base.db().create(REVIEW_TABLE).content(review).await?;
        created.ok_or_else(|| RepoError::Database("Failed to create review".to_string()))
    }

    /// Find review by id
    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<Review>> {
        let pure_id = strip_table_prefix(REVIEW_TABLE, id);
        let review: Option<Review> = self.base.db().select((REVIEW_TABLE, pure_id)).await?;
        Ok(review)
    }

    /// Find reviews for a product, newest first
    pub async fn find_by_product(
        &self,
        product_id: &str,
        approved_only: bool,
        limit: u64,
    ) -> RepoResult<Vec<Review>> {
        let mut query_str =
            String::from("SELECT * FROM reviews WHERE product_id = $product_id");
        if approved_only {
            query_str.push_str(" AND is_approved = true");
        }
        query_str.push_str(" ORDER BY created_at DESC LIMIT $limit");

        let reviews: Vec<Review> = self
            .base
            .db()
            .query(query_str)
            .bind(("product_id", canonical_id(PRODUCT_TABLE, product_id)))
            .bind(("limit", limit as i64))
            .await?
            .take(0)?;
        Ok(reviews)
    }

    /// 重算输入：商品当前全部已批准的评价 (全量扫描，不做增量)
    pub async fn find_approved(&self, product_id: &str) -> RepoResult<Vec<Review>> {
        let reviews: Vec<Review> = self
            .base
            .db()
            .query("SELECT * FROM reviews WHERE product_id = $product_id AND is_approved = true")
            .bind(("product_id", canonical_id(PRODUCT_TABLE, product_id)))
            .await?
            .take(0)?;
        Ok(reviews)
    }

    /// 一人一评约束的查询：匿名评价 (user_id 为 None) 不受此约束
    pub async fn find_by_product_and_user(
        &self,
        product_id: &str,
        user_id: &str,
    ) -> RepoResult<Option<Review>> {
        let reviews: Vec<Review> = self
            .base
            .db()
            .query(
                "SELECT * FROM reviews WHERE product_id = $product_id \
                 AND user_id = $user_id LIMIT 1",
            )
            .bind(("product_id", canonical_id(PRODUCT_TABLE, product_id)))
            .bind(("user_id", user_id.to_string()))
            .await?
            .take(0)?;
        Ok(reviews.into_iter().next())
    }

    /// Reviews awaiting moderation, newest first
    pub async fn find_pending(&self, limit: u64) -> RepoResult<Vec<Review>> {
        let reviews: Vec<Review> = self
            .base
            .db()
            .query(
                "SELECT * FROM reviews WHERE is_moderated = false \
                 ORDER BY created_at DESC LIMIT $limit",
            )
            .bind(("limit", limit as i64))
            .await?
            .take(0)?;
        Ok(reviews)
    }

    /// All reviews, newest first (admin)
    pub async fn find_all(&self, limit: u64) -> RepoResult<Vec<Review>> {
        let reviews: Vec<Review> = self
            .base
            .db()
            .query("SELECT * FROM reviews ORDER BY created_at DESC LIMIT $limit")
            .bind(("limit", limit as i64))
            .await?
            .take(0)?;
        Ok(reviews)
    }

    /// Update a review (partial: only fields present in the payload)
    pub async fn update(&self, id: &str, data: ReviewUpdate) -> RepoResult<Review> {
        let pure_id = strip_table_prefix(REVIEW_TABLE, id);
        let thing = make_thing(REVIEW_TABLE, pure_id);

        let mut set_parts: Vec<&str> = vec!["updated_at = time::now()"];
        if data.rating.is_some() { set_parts.push("rating = $rating"); }
        if data.comment.is_some() { set_parts.push("comment = $comment"); }
        if data.is_approved.is_some() { set_parts.push("is_approved = $is_approved"); }

        let query_str = format!("UPDATE $thing SET {} RETURN AFTER", set_parts.join(", "));
        let mut query = self.base.db().query(&query_str).bind(("thing", thing));
        if let Some(v) = data.rating { query = query.bind(("rating", v)); }
        if let Some(v) = data.comment { query = query.bind(("comment", v)); }
        if let Some(v) = data.is_approved { query = query.bind(("is_approved", v)); }

        let reviews: Vec<Review> = query.await?.take(0)?;
        reviews
            .into_iter()
            .next()
            .ok_or_else(|| RepoError::NotFound(format!("Review {}", id)))
    }

    /// 审核裁决：is_moderated 置为 true (可重复设置，幂等)
    pub async fn moderate(
        &self,
        id: &str,
        is_approved: bool,
        moderator_comment: Option<String>,
    ) -> RepoResult<Review> {
        let pure_id = strip_table_prefix(REVIEW_TABLE, id);
        let thing = make_thing(REVIEW_TABLE, pure_id);

        let reviews: Vec<Review> = self
            .base
            .db()
            .query(
                "UPDATE $thing SET is_moderated = true, is_approved = $is_approved, \
                 moderator_comment = $moderator_comment, updated_at = time::now() RETURN AFTER",
            )
            .bind(("thing", thing))
            .bind(("is_approved", is_approved))
            .bind(("moderator_comment", moderator_comment))
            .await?
            .take(0)?;

        reviews
            .into_iter()
            .next()
            .ok_or_else(|| RepoError::NotFound(format!("Review {}", id)))
    }

    /// Hard delete a review
    pub async fn delete(&self, id: &str) -> RepoResult<()> {
        let pure_id = strip_table_prefix(REVIEW_TABLE, id);
        let result: Option<Review> = self.base.db().delete((REVIEW_TABLE, pure_id)).await?;
        if result.is_none() {
            return Err(RepoError::NotFound(format!("Review {}", id)));
        }
        Ok(())
    }

    /// Count reviews awaiting moderation
    pub async fn count_pending(&self) -> RepoResult<u64> {
        let rows: Vec<CountRow> = self
            .base
            .db()
            .query("SELECT count() AS count FROM reviews WHERE is_moderated = false GROUP ALL")
            .await?
            .take(0)?;
        Ok(rows.first().map(|r| r.count).unwrap_or(0))
    }
}
