//! Calculator API Handlers

use axum::{Json, extract::State};

use crate::core::ServerState;
use crate::services::{PowerBankRequest, PowerBankResponse, UpsRequest, UpsResponse};
use crate::utils::AppResult;

/// POST /api/calculator/power-bank - 按设备清单推荐充电宝
pub async fn power_bank(
    State(state): State<ServerState>,
    Json(payload): Json<PowerBankRequest>,
) -> AppResult<Json<PowerBankResponse>> {
    let response = state.calculator.power_bank(payload).await?;
    Ok(Json(response))
}

/// POST /api/calculator/ups - 按负载功率推荐 UPS
pub async fn ups(
    State(state): State<ServerState>,
    Json(payload): Json<UpsRequest>,
) -> AppResult<Json<UpsResponse>> {
    let response = state.calculator.ups(payload).await?;
    Ok(Json(response))
}
