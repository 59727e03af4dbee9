pub mod analytics_service;
pub mod order_service;
