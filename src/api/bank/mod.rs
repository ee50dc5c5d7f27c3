pub mod client;
pub mod models;

pub use client::{BankClient, Transport};
pub use models::{clamp_limit, ApiReply, PageQuery};
