pub mod analytics;
pub mod checkout;
pub mod errors;
pub mod order;
pub mod ports;
