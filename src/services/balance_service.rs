use serde_json::Value;
use tracing::warn;

use crate::api::bank::models::BalanceResponse;
use crate::api::bank::ApiReply;
use crate::models::{BalanceResult, DEFAULT_ROLE};
use crate::utils::errors::AppError;

pub const MSG_BALANCE_FAILED: &str = "Failed to load balance";

/// Decode a balance reply
pub fn decode_balance(reply: &ApiReply) -> Result<BalanceResult, AppError> {
    if reply.is_network_failure() {
        return Err(AppError::Network(reply.error_or(MSG_BALANCE_FAILED)));
    }
    if !reply.ok {
        return Err(AppError::Request(reply.error_or(MSG_BALANCE_FAILED)));
    }

    let body = match &reply.body {
        Some(body @ Value::Object(_)) => body.clone(),
        _ => return Err(AppError::invalid_response()),
    };

    let balance: BalanceResponse = serde_json::from_value(body).map_err(|e| {
        warn!("Malformed balance reply: {}", e);
        AppError::invalid_response()
    })?;

    Ok(BalanceResult {
        balance: balance.balance.to_string(),
        account_type: balance
            .account_type
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| DEFAULT_ROLE.to_string()),
    })
}
