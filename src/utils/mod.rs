pub mod errors;
pub mod idle;
pub mod table;

pub use idle::IdleTimer;
pub use table::transactions_table;
