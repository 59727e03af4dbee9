use std::collections::HashMap;

use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};

use super::analytics::{BrandSales, Dashboard};
use super::checkout::CartLine;
use super::errors::DomainError;
use super::order::{CheckoutReceipt, OrderDetails, OrderSummary, StatusUpdate};

pub trait OrderRepository: Send + Sync + 'static {
    /// True if the user exists and is not soft-deleted.
    fn user_exists(&self, user_id: i64) -> Result<bool, DomainError>;

    /// Current stock per non-deleted product among `product_ids`. Missing
    /// ids signal "not found or deleted", not zero stock.
    fn stock_levels(&self, product_ids: &[i64]) -> Result<HashMap<i64, i32>, DomainError>;

    /// Lowest-id order status and payment status, used as defaults when the
    /// caller supplies none.
    fn lowest_status_ids(&self) -> Result<(Option<i64>, Option<i64>), DomainError>;

    /// Atomically commit an order: conditional stock decrement, header, line
    /// items with prices captured at this moment, and an audit record
    /// attributed to `user_id`. Everything rolls back on any failure.
    fn create_order(
        &self,
        user_id: i64,
        order_status_id: i64,
        payment_status_id: i64,
        lines: &[CartLine],
    ) -> Result<CheckoutReceipt, DomainError>;

    /// Atomically apply a status change and, when present, create or
    /// overwrite the order's delivery record, audited as `acting_user_id`.
    fn update_status(
        &self,
        order_id: i64,
        update: &StatusUpdate,
        acting_user_id: i64,
    ) -> Result<(), DomainError>;

    fn find_by_id(&self, order_id: i64) -> Result<Option<OrderDetails>, DomainError>;

    /// Non-deleted orders, newest first.
    fn list(&self) -> Result<Vec<OrderSummary>, DomainError>;
}

/// Read-only aggregation over committed, non-deleted state.
pub trait AnalyticsRepository: Send + Sync + 'static {
    fn dashboard(&self) -> Result<Dashboard, DomainError>;

    fn brand_sales(&self) -> Result<Vec<BrandSales>, DomainError>;

    /// Name of a non-deleted brand, or `None` if absent or soft-deleted.
    fn brand_name(&self, brand_id: i64) -> Result<Option<String>, DomainError>;

    fn brand_revenue(
        &self,
        brand_id: i64,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<BigDecimal, DomainError>;
}
