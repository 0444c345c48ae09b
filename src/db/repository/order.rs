//! Order Repository
//!
//! 订单一经创建不可删除，行项目列表不可变；只有状态字段可以更新。

use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use super::{BaseRepository, CountRow, RepoError, RepoResult, make_thing, strip_table_prefix};
use crate::db::models::{Order, OrderStatus, OrderStatusUpdate, PaymentStatus};

const ORDER_TABLE: &str = "orders";

// =============================================================================
// Order Repository
// =============================================================================

#[derive(Debug, Clone)]
pub struct OrderRepository {
    base: BaseRepository,
}

impl OrderRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Persist a fully computed order document
    pub async fn create(&self, order: Order) -> RepoResult<Order> {
        let created: Option<Order> = self.base.db().create(ORDER_TABLE).content(order).await?;
        created.ok_or_else(|| RepoError::Database("Failed to create order".to_string()))
    }

    /// Find order by id
    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<Order>> {
        let pure_id = strip_table_prefix(ORDER_TABLE, id);
        let order: Option<Order> = self.base.db().select((ORDER_TABLE, pure_id)).await?;
        Ok(order)
    }

    /// Find orders belonging to a user, newest first
    pub async fn find_by_user(&self, user_id: &str, limit: u64) -> RepoResult<Vec<Order>> {
        let orders: Vec<Order> = self
            .base
            .db()
            .query(
                "SELECT * FROM orders WHERE user_id = $user_id \
                 ORDER BY created_at DESC LIMIT $limit",
            )
            .bind(("user_id", user_id.to_string()))
            .bind(("limit", limit as i64))
            .await?
            .take(0)?;
        Ok(orders)
    }

    /// Find all orders, newest first (admin)
    pub async fn find_all(&self, limit: u64) -> RepoResult<Vec<Order>> {
        let orders: Vec<Order> = self
            .base
            .db()
            .query("SELECT * FROM orders ORDER BY created_at DESC LIMIT $limit")
            .bind(("limit", limit as i64))
            .await?
            .take(0)?;
        Ok(orders)
    }

    /// Apply whichever status fields are present, refreshing updated_at
    pub async fn update_status(&self, id: &str, update: OrderStatusUpdate) -> RepoResult<Order> {
        let pure_id = strip_table_prefix(ORDER_TABLE, id);
        let thing = make_thing(ORDER_TABLE, pure_id);

        let mut set_parts: Vec<&str> = vec!["updated_at = time::now()"];
        if update.order_status.is_some() {
            set_parts.push("order_status = $order_status");
        }
        if update.payment_status.is_some() {
            set_parts.push("payment_status = $payment_status");
        }

        let query_str = format!("UPDATE $thing SET {} RETURN AFTER", set_parts.join(", "));
        let mut query = self.base.db().query(&query_str).bind(("thing", thing));
        if let Some(v) = update.order_status {
            query = query.bind(("order_status", v));
        }
        if let Some(v) = update.payment_status {
            query = query.bind(("payment_status", v));
        }

        let orders: Vec<Order> = query.await?.take(0)?;
        orders
            .into_iter()
            .next()
            .ok_or_else(|| RepoError::NotFound(format!("Order {}", id)))
    }

    /// Count orders with a given order_status
    pub async fn count_by_status(&self, status: OrderStatus) -> RepoResult<u64> {
        let rows: Vec<CountRow> = self
            .base
            .db()
            .query("SELECT count() AS count FROM orders WHERE order_status = $status GROUP ALL")
            .bind(("status", status))
            .await?
            .take(0)?;
        Ok(rows.first().map(|r| r.count).unwrap_or(0))
    }

    /// Count orders with a given payment_status
    pub async fn count_by_payment_status(&self, status: PaymentStatus) -> RepoResult<u64> {
        let rows: Vec<CountRow> = self
            .base
            .db()
            .query("SELECT count() AS count FROM orders WHERE payment_status = $status GROUP ALL")
            .bind(("status", status))
            .await?
            .take(0)?;
        Ok(rows.first().map(|r| r.count).unwrap_or(0))
    }

    /// Total order count
    pub async fn count(&self) -> RepoResult<u64> {
        let rows: Vec<CountRow> = self
            .base
            .db()
            .query("SELECT count() AS count FROM orders GROUP ALL")
            .await?
            .take(0)?;
        Ok(rows.first().map(|r| r.count).unwrap_or(0))
    }

    /// Revenue over paid orders
    pub async fn paid_revenue(&self) -> RepoResult<f64> {
        #[derive(serde::Deserialize)]
        struct RevenueRow {
            revenue: f64,
        }

        let rows: Vec<RevenueRow> = self
            .base
            .db()
            .query(
                "SELECT math::sum(total_amount) AS revenue FROM orders \
                 WHERE payment_status = 'paid' GROUP ALL",
            )
            .await?
            .take(0)?;
        Ok(rows.first().map(|r| r.revenue).unwrap_or(0.0))
    }
}
