pub mod order;
pub mod product;
pub mod transaction_log;
