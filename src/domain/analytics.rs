use bigdecimal::BigDecimal;
use chrono::{DateTime, Duration, Utc};

use super::errors::DomainError;

#[derive(Debug, Clone)]
pub struct RecentOrder {
    pub id: i64,
    pub customer: String,
    pub order_status: String,
    pub payment_status: String,
    pub order_date: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct LowStockProduct {
    pub id: i64,
    pub name: String,
    pub brand: String,
    pub stock_quantity: i32,
}

/// Dashboard rollup over non-deleted rows only.
#[derive(Debug, Clone)]
pub struct Dashboard {
    pub total_products: i64,
    pub total_orders: i64,
    pub total_users: i64,
    pub total_revenue: BigDecimal,
    pub recent_orders: Vec<RecentOrder>,
    pub low_stock_products: Vec<LowStockProduct>,
}

/// Per-brand order and revenue rollup over all time.
#[derive(Debug, Clone)]
pub struct BrandSales {
    pub brand_id: i64,
    pub brand_name: String,
    pub total_orders: i64,
    pub delivered_orders: i64,
    pub total_units: i64,
    pub total_revenue: BigDecimal,
    pub average_order_value: BigDecimal,
}

/// Revenue of one brand over an explicit date window.
#[derive(Debug, Clone)]
pub struct BrandRevenue {
    pub brand_id: i64,
    pub brand_name: String,
    pub revenue: BigDecimal,
    pub date_from: DateTime<Utc>,
    pub date_to: DateTime<Utc>,
}

/// Resolve an optional `[from, to]` window: `to` defaults to `now`, `from`
/// defaults to 30 days before the resolved `to`. An inverted window is a
/// validation failure.
pub fn resolve_window(
    from: Option<DateTime<Utc>>,
    to: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> Result<(DateTime<Utc>, DateTime<Utc>), DomainError> {
    let to = to.unwrap_or(now);
    let from = from.unwrap_or(to - Duration::days(30));
    if from > to {
        return Err(DomainError::Validation(
            "'from' must not be later than 'to'".into(),
        ));
    }
    Ok((from, to))
}
