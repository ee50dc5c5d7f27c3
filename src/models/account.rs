//! Linked account and session models

/// Role assumed when the backend does not name one
pub const DEFAULT_ROLE: &str = "debit";

/// One account linked to a card, as reported by a successful login
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkedAccount {
    /// May be empty when the backend omitted it
    pub role: String,
    /// Always positive
    pub account_id: i64,
}

impl LinkedAccount {
    pub fn new(role: impl Into<String>, account_id: i64) -> Self {
        Self {
            role: role.into(),
            account_id,
        }
    }

    /// The role, or `"debit"` when the backend left it blank
    pub fn role_or_default(&self) -> &str {
        if self.role.is_empty() {
            DEFAULT_ROLE
        } else {
            &self.role
        }
    }
}

/// The account a main screen operates on, fixed for its lifetime
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub account_id: i64,
    pub role: String,
}

impl Session {
    pub fn title(&self) -> String {
        format!("Bank Automat - {} (Account {})", self.role, self.account_id)
    }
}
