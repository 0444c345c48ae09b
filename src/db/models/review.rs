//! Review Model
//!
//! 评价只有在 `is_approved == true` 时才计入商品的聚合评分，
//! 与 `is_moderated` 无关。

use serde::{Deserialize, Serialize};
use surrealdb::sql::Thing;
use validator::Validate;

use super::serde_thing;

pub type ReviewId = Thing;

/// Review model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Review {
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "serde_thing::option::serialize",
        deserialize_with = "serde_thing::option::deserialize",
        default
    )]
    pub id: Option<ReviewId>,
    pub product_id: String,
    /// 评价用户，匿名评价时为 None
    pub user_id: Option<String>,
    /// 显示名称，匿名评价必填
    pub user_name: Option<String>,
    /// 评分 1.0-5.0
    pub rating: f64,
    pub comment: String,
    #[serde(default)]
    pub is_approved: bool,
    #[serde(default)]
    pub is_moderated: bool,
    pub moderator_comment: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ReviewCreate {
    #[validate(length(min = 1))]
    pub product_id: String,
    #[validate(range(min = 1.0, max = 5.0))]
    pub rating: f64,
    #[validate(length(min = 10, max = 2000))]
    pub comment: String,
    #[validate(length(max = 100))]
    pub user_name: Option<String>,
}

/// 部分更新：只应用调用方提供的字段
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct ReviewUpdate {
    #[validate(range(min = 1.0, max = 5.0))]
    pub rating: Option<f64>,
    #[validate(length(min = 10, max = 2000))]
    pub comment: Option<String>,
    pub is_approved: Option<bool>,
}

impl ReviewUpdate {
    /// 变更集是否会影响商品的聚合评分
    pub fn touches_rating(&self) -> bool {
        self.rating.is_some() || self.is_approved.is_some()
    }
}
