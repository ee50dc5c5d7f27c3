//! Data models shared by the services and the kiosk shell
//!
//! Each model is the decoded, display-ready form of a backend reply.

pub mod account;
pub mod balance;
pub mod login;
pub mod transaction;
pub mod withdraw;

// Re-export commonly used types for convenience
pub use account::{LinkedAccount, Session, DEFAULT_ROLE};
pub use balance::BalanceResult;
pub use login::{LoginFailureReason, LoginOutcome};
pub use transaction::TransactionItem;
pub use withdraw::WithdrawResult;
