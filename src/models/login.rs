//! Login outcome models

use super::account::LinkedAccount;

/// Why a login attempt did not produce any usable account
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginFailureReason {
    InvalidCredentials,
    CardLocked,
    NoLinkedAccounts,
    InvalidServerResponse,
    NetworkOrServerError,
}

/// Normalized result of a login request.
///
/// `Success` never carries an empty account list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    Success { accounts: Vec<LinkedAccount> },
    Failure { reason: LoginFailureReason, message: String },
}

impl LoginOutcome {
    pub fn failure(reason: LoginFailureReason, message: impl Into<String>) -> Self {
        LoginOutcome::Failure {
            reason,
            message: message.into(),
        }
    }
}
