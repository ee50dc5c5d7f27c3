//! Balance models

/// Decoded balance reply
#[derive(Debug, Clone, PartialEq)]
pub struct BalanceResult {
    pub balance: String,
    pub account_type: String,
}

impl BalanceResult {
    /// Status line shown on the main screen
    pub fn status_line(&self, role: &str) -> String {
        format!(
            "Mode: {} | Balance: {} € ({})",
            role, self.balance, self.account_type
        )
    }
}
