//! Withdrawal models

/// Decoded withdrawal reply
#[derive(Debug, Clone, PartialEq)]
pub struct WithdrawResult {
    pub balance: String,
    pub withdrawn: Option<i64>,
    /// `(denomination, count)`, highest denomination first, zero counts skipped
    pub bills: Vec<(u32, u32)>,
}

impl WithdrawResult {
    pub fn summary(&self) -> String {
        let mut message = String::from("Withdraw successful.");
        if let Some(amount) = self.withdrawn {
            message.push_str(&format!("\nWithdrawn: {} €", amount));
        }
        if !self.bills.is_empty() {
            let bills: Vec<String> = self
                .bills
                .iter()
                .map(|(denomination, count)| format!("{} x {} €", count, denomination))
                .collect();
            message.push_str(&format!("\nBills: {}", bills.join(", ")));
        }
        message.push_str(&format!("\nNew balance: {}", self.balance));
        message
    }
}
