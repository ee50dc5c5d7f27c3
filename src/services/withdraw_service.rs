use serde_json::Value;
use tracing::warn;

use crate::api::bank::models::WithdrawResponse;
use crate::api::bank::ApiReply;
use crate::models::WithdrawResult;
use crate::utils::errors::AppError;

pub const MSG_WITHDRAW_FAILED: &str = "Withdraw failed";

/// Fixed amounts offered as one-touch buttons
pub const QUICK_AMOUNTS: [i64; 4] = [20, 40, 50, 100];

/// Validate operator entered amount. Must be a positive whole number.
pub fn validate_amount(input: &str) -> Result<i64, AppError> {
    let amount = input
        .trim()
        .parse::<i64>()
        .map_err(|_| AppError::Validation(format!("Invalid amount: {}", input.trim())))?;

    if amount <= 0 {
        return Err(AppError::Validation("Amount must be greater than zero".to_string()));
    }

    Ok(amount)
}

/// Decode a withdraw reply
pub fn decode_withdraw(reply: &ApiReply) -> Result<WithdrawResult, AppError> {
    if reply.is_network_failure() {
        return Err(AppError::Network(reply.error_or(MSG_WITHDRAW_FAILED)));
    }
    if !reply.ok {
        return Err(AppError::Request(reply.error_or(MSG_WITHDRAW_FAILED)));
    }

    let body = match &reply.body {
        Some(body @ Value::Object(_)) => body.clone(),
        _ => return Err(AppError::invalid_response()),
    };

    let response: WithdrawResponse = serde_json::from_value(body).map_err(|e| {
        warn!("Malformed withdraw reply: {}", e);
        AppError::invalid_response()
    })?;

    let mut bills: Vec<(u32, u32)> = response
        .bills
        .unwrap_or_default()
        .into_iter()
        .filter(|(_, count)| *count > 0)
        .filter_map(|(denomination, count)| denomination.parse::<u32>().ok().map(|d| (d, count)))
        .collect();
    bills.sort_by(|a, b| b.0.cmp(&a.0));

    Ok(WithdrawResult {
        balance: response.balance.to_string(),
        withdrawn: response.withdrawn,
        bills,
    })
}
