//! Order Model
//!
//! 订单是创建时的历史快照：行项目的名称与价格取下单当时的值，
//! 之后商品变更不会回写订单。

use serde::{Deserialize, Serialize};
use surrealdb::sql::Thing;
use validator::Validate;

use super::serde_thing;

pub type OrderId = Thing;

/// 订单状态 (与支付状态相互独立，无强制迁移图)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    New,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
}

/// 支付状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Paid,
    Failed,
    Refunded,
}

/// 订单行项目 - 下单时的商品快照
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItem {
    pub product_id: String,
    pub product_name: String,
    pub quantity: i64,
    /// 单价，取调用方在下单时提交的值 (不回读当前目录价格)
    pub price: f64,
}

impl OrderItem {
    pub fn total(&self) -> f64 {
        self.quantity as f64 * self.price
    }
}

/// 收货地址
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct OrderAddress {
    #[validate(length(min = 1))]
    pub street: String,
    #[validate(length(min = 1))]
    pub city: String,
    #[validate(length(min = 1))]
    pub postal_code: String,
    #[serde(default = "default_country")]
    pub country: String,
    #[validate(length(min = 10))]
    pub phone: String,
}

fn default_country() -> String {
    "Україна".to_string()
}

/// Order model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "serde_thing::option::serialize",
        deserialize_with = "serde_thing::option::deserialize",
        default
    )]
    pub id: Option<OrderId>,
    /// 下单用户，匿名结账时为 None
    pub user_id: Option<String>,
    pub items: Vec<OrderItem>,
    pub address: OrderAddress,
    pub email: String,
    pub notes: Option<String>,
    /// card | cash | online
    pub payment_method: String,
    /// courier | post | pickup
    pub delivery_method: String,
    pub delivery_cost: f64,
    pub payment_status: PaymentStatus,
    pub order_status: OrderStatus,
    /// total_amount == items_total + delivery_cost，恒成立
    pub total_amount: f64,
    pub items_total: f64,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

/// 下单请求的行项目
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct OrderItemInput {
    #[validate(length(min = 1))]
    pub product_id: String,
    #[validate(range(min = 1))]
    pub quantity: i64,
    #[validate(range(exclusive_min = 0.0))]
    pub price: f64,
}

/// 下单请求
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct OrderCreate {
    /// 由认证层填充，调用方提交的值会被覆盖
    #[serde(default)]
    pub user_id: Option<String>,
    #[validate(length(min = 1), nested)]
    pub items: Vec<OrderItemInput>,
    #[validate(nested)]
    pub address: OrderAddress,
    #[validate(email)]
    pub email: String,
    pub notes: Option<String>,
    #[serde(default = "default_payment_method")]
    pub payment_method: String,
    #[serde(default = "default_delivery_method")]
    pub delivery_method: String,
}

fn default_payment_method() -> String {
    "card".to_string()
}

fn default_delivery_method() -> String {
    "courier".to_string()
}

/// 状态更新请求 - 两个字段相互独立，只应用提供的字段
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrderStatusUpdate {
    pub order_status: Option<OrderStatus>,
    pub payment_status: Option<PaymentStatus>,
}
