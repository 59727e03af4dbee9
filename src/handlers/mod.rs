pub mod analytics;
pub mod orders;
