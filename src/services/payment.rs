//! Payment Service - 支付网关模拟
//!
//! 模拟外部支付网关：固定延迟约 1 秒后返回成功。
//! 接入真实网关时只需替换 [`PaymentService::process`] 的实现，
//! 调用方的结算流程不变。

use std::time::Duration;

use serde::Serialize;

/// 支付处理结果
#[derive(Debug, Clone, Serialize)]
pub struct PaymentResult {
    pub success: bool,
    /// 模拟交易号
    pub transaction_id: String,
    pub message: String,
}

/// 支付网关模拟器
#[derive(Debug, Clone, Default)]
pub struct PaymentService;

impl PaymentService {
    pub fn new() -> Self {
        Self
    }

    /// 处理支付
    ///
    /// 模拟网关耗时后固定返回成功，不会失败。
    /// 调用方仍应检查 `success` 字段，保持与真实网关一致的调用方式。
    pub async fn process(&self, order_id: &str, amount: f64, method: &str) -> PaymentResult {
        tracing::info!(
            order_id = %order_id,
            amount = %amount,
            method = %method,
            "Processing payment"
        );

        // Simulated gateway latency
        tokio::time::sleep(Duration::from_secs(1)).await;

        let transaction_id = format!("txn_{}", uuid::Uuid::new_v4().simple());

        tracing::info!(
            order_id = %order_id,
            transaction_id = %transaction_id,
            "Payment completed"
        );

        PaymentResult {
            success: true,
            transaction_id,
            message: "Payment processed successfully".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_payment_always_succeeds() {
        let service = PaymentService::new();
        let result = service.process("orders:test", 1500.0, "card").await;

        assert!(result.success);
        assert!(result.transaction_id.starts_with("txn_"));
    }
}
