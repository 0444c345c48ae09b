//! Calculator Service - 选型计算器
//!
//! 按用户的设备清单估算所需容量/功率，并从目录中推荐匹配商品。
//! 数值都是粗略的工程估算，展示用途，不做精确建模。

use serde::{Deserialize, Serialize};
use surrealdb::Surreal;
use surrealdb::engine::local::Db;
use validator::Validate;

use crate::db::models::Product;
use crate::db::repository::ProductRepository;
use crate::utils::{AppError, AppResult, round2};

/// 充电宝充自身时假设的标准充电功率 (W)
const STANDARD_CHARGE_POWER_W: f64 = 10.0;
/// 容量安全余量 20%
const CAPACITY_SAFETY_MARGIN: f64 = 0.2;
/// UPS 功率安全余量 30%
const UPS_SAFETY_MARGIN: f64 = 0.3;
/// W → VA 换算的功率因数
const UPS_POWER_FACTOR: f64 = 0.6;

/// 待供电的设备
///
/// 上界挡住会让容量累加溢出 i64 的恶意输入
#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct DeviceInput {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    /// 设备电池容量 (mAh)
    #[validate(range(min = 0, max = 10_000_000))]
    pub battery_capacity: i64,
    /// 需要充满的次数
    #[validate(range(min = 1, max = 10_000))]
    pub charge_count: i64,
    /// 功耗 (W)，笔记本等设备使用
    #[validate(range(min = 0, max = 100_000))]
    pub power_consumption: Option<i64>,
}

/// 充电宝选型请求
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct PowerBankRequest {
    #[validate(length(min = 1, max = 100), nested)]
    pub devices: Vec<DeviceInput>,
    /// 需要续航的天数
    #[serde(default = "default_usage_days")]
    #[validate(range(min = 1, max = 30))]
    pub usage_days: i64,
    /// 充电效率系数 (0.8 = 20% 转换损耗)
    #[serde(default = "default_efficiency")]
    #[validate(range(min = 0.5, max = 1.0))]
    pub efficiency: f64,
}

fn default_usage_days() -> i64 {
    7
}

fn default_efficiency() -> f64 {
    0.8
}

/// 推荐商品 + 针对本次请求的估算标注
#[derive(Debug, Clone, Serialize)]
pub struct RecommendedPowerBank {
    #[serde(flatten)]
    pub product: Product,
    /// 充满该充电宝自身的估算时长 (小时)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimated_charge_time: Option<f64>,
    /// 能把设备清单完整充几轮
    #[serde(skip_serializing_if = "Option::is_none")]
    pub charge_cycles: Option<i64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DeviceDetail {
    pub name: String,
    pub battery_capacity: i64,
    pub charge_count: i64,
    pub total_capacity: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct PowerBankCalculation {
    pub total_devices: usize,
    pub device_details: Vec<DeviceDetail>,
    /// 设备清单的原始容量需求 (未计损耗)
    pub total_capacity_needed: i64,
    pub efficiency_factor: f64,
    pub safety_margin: f64,
    pub usage_days: i64,
    pub daily_capacity_needed: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct PowerBankResponse {
    /// 计入损耗和余量后的必要容量 (mAh)
    pub required_capacity: i64,
    pub recommended_products: Vec<RecommendedPowerBank>,
    pub calculation_details: PowerBankCalculation,
}

/// UPS 选型请求
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpsRequest {
    /// 负载总功率 (W)
    #[validate(range(min = 1.0))]
    pub total_power: f64,
    /// 期望的断电续航 (分钟)
    #[serde(default = "default_runtime_minutes")]
    #[validate(range(min = 1))]
    pub runtime_minutes: i64,
}

fn default_runtime_minutes() -> i64 {
    10
}

#[derive(Debug, Clone, Serialize)]
pub struct RecommendedUps {
    #[serde(flatten)]
    pub product: Product,
    /// 该机型在请求负载下的估算续航 (分钟)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimated_runtime_minutes: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct UpsCalculation {
    pub total_power: f64,
    pub runtime_minutes: i64,
    pub safety_margin: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct UpsResponse {
    /// 含余量的必要功率 (W)
    pub required_power: i64,
    /// 对应的视在功率 (VA)
    pub required_va: i64,
    pub recommended_products: Vec<RecommendedUps>,
    pub calculation_details: UpsCalculation,
}

/// 选型计算服务
#[derive(Debug, Clone)]
pub struct CalculatorService {
    products: ProductRepository,
}

impl CalculatorService {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            products: ProductRepository::new(db),
        }
    }

    /// 充电宝选型
    ///
    /// required = Σ(容量×次数) / 效率 × 1.2。推荐区间取
    /// [required, 2×required]，区间内无货时放宽为 ≥ required。
    pub async fn power_bank(&self, request: PowerBankRequest) -> AppResult<PowerBankResponse> {
        request
            .validate()
            .map_err(|e| AppError::validation(e.to_string()))?;

        let mut total_capacity_needed: i64 = 0;
        let mut device_details = Vec::with_capacity(request.devices.len());
        for device in &request.devices {
            let device_capacity = device.battery_capacity * device.charge_count;
            total_capacity_needed += device_capacity;
            device_details.push(DeviceDetail {
                name: device.name.clone(),
                battery_capacity: device.battery_capacity,
                charge_count: device.charge_count,
                total_capacity: device_capacity,
            });
        }

        let required_capacity = ((total_capacity_needed as f64 / request.efficiency)
            * (1.0 + CAPACITY_SAFETY_MARGIN)) as i64;

        let mut products = self
            .products
            .find_power_banks_by_capacity(required_capacity, Some(required_capacity * 2), 10)
            .await?;
        if products.is_empty() {
            products = self
                .products
                .find_power_banks_by_capacity(required_capacity, None, 10)
                .await?;
        }

        let recommended_products = products
            .into_iter()
            .map(|product| {
                let annotations = product.capacity.filter(|_| product.power.is_some()).map(
                    |capacity| {
                        let charge_time =
                            (capacity as f64 / 1000.0) / STANDARD_CHARGE_POWER_W;
                        let cycles = if total_capacity_needed > 0 {
                            ((capacity as f64 * request.efficiency)
                                / total_capacity_needed as f64)
                                as i64
                        } else {
                            0
                        };
                        ((charge_time * 10.0).round() / 10.0, cycles.max(1))
                    },
                );
                RecommendedPowerBank {
                    estimated_charge_time: annotations.map(|(t, _)| t),
                    charge_cycles: annotations.map(|(_, c)| c),
                    product,
                }
            })
            .collect();

        tracing::info!(
            required_capacity = %required_capacity,
            devices = %request.devices.len(),
            "Power bank calculation completed"
        );

        Ok(PowerBankResponse {
            required_capacity,
            recommended_products,
            calculation_details: PowerBankCalculation {
                total_devices: request.devices.len(),
                device_details,
                total_capacity_needed,
                efficiency_factor: request.efficiency,
                safety_margin: CAPACITY_SAFETY_MARGIN,
                usage_days: request.usage_days,
                daily_capacity_needed: round2(
                    total_capacity_needed as f64 / request.usage_days as f64,
                ),
            },
        })
    }

    /// UPS 选型
    ///
    /// required = 负载 × 1.3，VA = required / 0.6。
    /// 推荐功率 ≥ required 的 UPS，按功率升序取前 5。
    pub async fn ups(&self, request: UpsRequest) -> AppResult<UpsResponse> {
        request
            .validate()
            .map_err(|e| AppError::validation(e.to_string()))?;

        let required_power = (request.total_power * (1.0 + UPS_SAFETY_MARGIN)) as i64;
        let required_va = (required_power as f64 / UPS_POWER_FACTOR) as i64;

        let products = self.products.find_ups_by_min_power(required_power, 5).await?;

        let recommended_products = products
            .into_iter()
            .map(|product| RecommendedUps {
                estimated_runtime_minutes: product.power.map(|p| {
                    ((p as f64 / request.total_power) * request.runtime_minutes as f64).round()
                }),
                product,
            })
            .collect();

        Ok(UpsResponse {
            required_power,
            required_va,
            recommended_products,
            calculation_details: UpsCalculation {
                total_power: request.total_power,
                runtime_minutes: request.runtime_minutes,
                safety_margin: UPS_SAFETY_MARGIN,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_capacity_formula() {
        // 10000 mAh / 0.8 * 1.2 = 15000
        let total: f64 = 10000.0;
        let required = ((total / 0.8) * 1.2) as i64;
        assert_eq!(required, 15000);
    }

    #[test]
    fn test_device_input_rejects_oversized_values() {
        let request = PowerBankRequest {
            devices: vec![DeviceInput {
                name: "Oversized".to_string(),
                battery_capacity: i64::MAX / 2,
                charge_count: 10_000,
                power_consumption: None,
            }],
            usage_days: 7,
            efficiency: 0.8,
        };
        assert!(request.validate().is_err());

        let request = PowerBankRequest {
            devices: vec![DeviceInput {
                name: "Phone".to_string(),
                battery_capacity: 5000,
                charge_count: 100_000,
                power_consumption: None,
            }],
            usage_days: 7,
            efficiency: 0.8,
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_device_input_accepts_bounded_values() {
        let request = PowerBankRequest {
            devices: vec![DeviceInput {
                name: "Laptop".to_string(),
                battery_capacity: 10_000_000,
                charge_count: 10_000,
                power_consumption: Some(100),
            }],
            usage_days: 7,
            efficiency: 0.8,
        };
        assert!(request.validate().is_ok());
        // 单设备上限组合也远在 i64 范围之内
        assert!(10_000_000_i64
            .checked_mul(10_000)
            .and_then(|per_device| per_device.checked_mul(100))
            .is_some());
    }

    #[test]
    fn test_ups_power_and_va() {
        let required_power = (500.0_f64 * 1.3) as i64;
        assert_eq!(required_power, 650);
        assert_eq!((required_power as f64 / 0.6) as i64, 1083);
    }
}
