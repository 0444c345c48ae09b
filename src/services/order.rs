//! Order Service - 下单、结算与状态管理
//!
//! 下单流程对每个行项目做快速失败校验 (存在性、库存、上架状态)，
//! 通过后以调用方提交的价格生成历史快照。库存数量在下单时只校验
//! 不扣减，扣减属于履约环节。

use surrealdb::Surreal;
use surrealdb::engine::local::Db;
use validator::Validate;

use crate::db::models::{
    Order, OrderCreate, OrderItem, OrderStatusUpdate, PaymentStatus,
};
use crate::db::repository::{OrderRepository, ProductRepository};
use crate::services::payment::{PaymentResult, PaymentService};
use crate::utils::{AppError, AppResult, round2};

/// 满额包邮阈值 (courier / post)
pub const FREE_DELIVERY_THRESHOLD: f64 = 2000.0;

const COST_COURIER: f64 = 150.0;
const COST_POST: f64 = 80.0;

/// 订单服务
#[derive(Debug, Clone)]
pub struct OrderService {
    orders: OrderRepository,
    products: ProductRepository,
    payment: PaymentService,
}

/// 结算结果 - 订单与支付回执
#[derive(Debug, Clone, serde::Serialize)]
pub struct CheckoutResult {
    pub order: Order,
    pub payment: PaymentResult,
}

impl OrderService {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            orders: OrderRepository::new(db.clone()),
            products: ProductRepository::new(db),
            payment: PaymentService::new(),
        }
    }

    /// 计算配送费
    ///
    /// | 条件 | 费用 |
    /// |------|------|
    /// | 小计 ≥ 2000 且 courier/post | 0 |
    /// | courier | 150 |
    /// | post | 80 |
    /// | pickup | 0 |
    /// | 未知方式 | 150 (按 courier 兜底) |
    pub fn delivery_cost(delivery_method: &str, items_total: f64) -> f64 {
        if items_total >= FREE_DELIVERY_THRESHOLD
            && matches!(delivery_method, "courier" | "post")
        {
            return 0.0;
        }

        match delivery_method {
            "courier" => COST_COURIER,
            "post" => COST_POST,
            "pickup" => 0.0,
            _ => COST_COURIER,
        }
    }

    /// 创建订单
    ///
    /// 对每个行项目按序校验，任一失败立即返回，不产生部分订单：
    /// 1. 商品存在
    /// 2. 库存充足 (只校验不扣减)
    /// 3. 商品在售
    ///
    /// 行项目价格取调用方提交的值，不回读目录当前价。
    pub async fn create_order(&self, data: OrderCreate) -> AppResult<Order> {
        data.validate()
            .map_err(|e| AppError::validation(e.to_string()))?;

        let mut items: Vec<OrderItem> = Vec::with_capacity(data.items.len());
        for input in &data.items {
            let product = self
                .products
                .find_by_id(&input.product_id)
                .await?
                .ok_or_else(|| AppError::not_found(format!("Product {}", input.product_id)))?;

            if product.stock < input.quantity {
                return Err(AppError::validation(format!(
                    "Insufficient stock for {}: available {}, requested {}",
                    product.name, product.stock, input.quantity
                )));
            }

            if !product.is_active {
                return Err(AppError::validation(format!(
                    "Product {} is not available",
                    product.name
                )));
            }

            // 快照里的 product_id 取目录记录自身的规范形态，
            // 不保留调用方可能提交的裸 id 写法
            items.push(OrderItem {
                product_id: product
                    .id
                    .as_ref()
                    .map(|t| t.to_raw())
                    .unwrap_or_else(|| input.product_id.clone()),
                product_name: product.name,
                quantity: input.quantity,
                price: input.price,
            });
        }

        let items_total = round2(items.iter().map(OrderItem::total).sum());
        let delivery_cost = Self::delivery_cost(&data.delivery_method, items_total);
        let total_amount = round2(items_total + delivery_cost);

        let now = chrono::Utc::now();
        let order = Order {
            id: None,
            user_id: data.user_id,
            items,
            address: data.address,
            email: data.email,
            notes: data.notes,
            payment_method: data.payment_method,
            delivery_method: data.delivery_method,
            delivery_cost,
            payment_status: PaymentStatus::Pending,
            order_status: crate::db::models::OrderStatus::New,
            total_amount,
            items_total,
            created_at: now,
            updated_at: now,
        };

        let created = self.orders.create(order).await?;

        tracing::info!(
            order_id = %created.id.as_ref().map(|t| t.to_raw()).unwrap_or_default(),
            total = %created.total_amount,
            "Order created"
        );

        Ok(created)
    }

    /// 结算：创建订单并走支付流程
    ///
    /// 支付成功后将订单标记为已支付。支付回执随订单一并返回。
    pub async fn checkout(&self, data: OrderCreate) -> AppResult<CheckoutResult> {
        let order = self.create_order(data).await?;
        let order_id = order
            .id
            .as_ref()
            .map(|t| t.to_raw())
            .ok_or_else(|| AppError::internal("Created order has no id".to_string()))?;

        let payment = self
            .payment
            .process(&order_id, order.total_amount, &order.payment_method)
            .await;

        let order = if payment.success {
            self.orders
                .update_status(
                    &order_id,
                    OrderStatusUpdate {
                        order_status: None,
                        payment_status: Some(PaymentStatus::Paid),
                    },
                )
                .await?
        } else {
            self.orders
                .update_status(
                    &order_id,
                    OrderStatusUpdate {
                        order_status: None,
                        payment_status: Some(PaymentStatus::Failed),
                    },
                )
                .await?
        };

        Ok(CheckoutResult { order, payment })
    }

    /// 按 ID 查询订单
    pub async fn get_order(&self, id: &str) -> AppResult<Order> {
        self.orders
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Order {id}")))
    }

    /// 查询用户的订单列表 (新到旧)
    pub async fn get_orders_by_user(&self, user_id: &str, limit: u64) -> AppResult<Vec<Order>> {
        Ok(self.orders.find_by_user(user_id, limit).await?)
    }

    /// 查询全部订单 (管理端)
    pub async fn get_all_orders(&self, limit: u64) -> AppResult<Vec<Order>> {
        Ok(self.orders.find_all(limit).await?)
    }

    /// 更新订单状态 / 支付状态
    ///
    /// 两个字段相互独立，只应用提供的字段。
    pub async fn update_order_status(
        &self,
        id: &str,
        update: OrderStatusUpdate,
    ) -> AppResult<Order> {
        if update.order_status.is_none() && update.payment_status.is_none() {
            return Err(AppError::invalid("No status fields provided".to_string()));
        }
        Ok(self.orders.update_status(id, update).await?)
    }

    /// 订单统计 (管理端)
    pub async fn stats(&self) -> AppResult<OrderStats> {
        use crate::db::models::OrderStatus;

        Ok(OrderStats {
            total_orders: self.orders.count().await?,
            new_orders: self.orders.count_by_status(OrderStatus::New).await?,
            paid_orders: self
                .orders
                .count_by_payment_status(PaymentStatus::Paid)
                .await?,
            total_revenue: round2(self.orders.paid_revenue().await?),
        })
    }
}

/// 订单统计摘要
#[derive(Debug, Clone, serde::Serialize)]
pub struct OrderStats {
    pub total_orders: u64,
    pub new_orders: u64,
    pub paid_orders: u64,
    /// 已支付订单的总额
    pub total_revenue: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delivery_cost_table() {
        assert_eq!(OrderService::delivery_cost("courier", 500.0), 150.0);
        assert_eq!(OrderService::delivery_cost("post", 500.0), 80.0);
        assert_eq!(OrderService::delivery_cost("pickup", 500.0), 0.0);
        assert_eq!(OrderService::delivery_cost("drone", 500.0), 150.0);
    }

    #[test]
    fn test_delivery_cost_free_threshold() {
        assert_eq!(OrderService::delivery_cost("courier", 2000.0), 0.0);
        assert_eq!(OrderService::delivery_cost("post", 2500.0), 0.0);
        // pickup 本来就免费，未知方式不参与包邮
        assert_eq!(OrderService::delivery_cost("pickup", 2500.0), 0.0);
        assert_eq!(OrderService::delivery_cost("drone", 2500.0), 150.0);
    }

    #[test]
    fn test_delivery_cost_just_below_threshold() {
        assert_eq!(OrderService::delivery_cost("courier", 1999.99), 150.0);
    }
}
