use bigdecimal::BigDecimal;
use diesel::prelude::*;
use diesel::sql_types::{BigInt, Numeric, Text};
use serde_json::Value;

use crate::schema::{audit_log, delivered_orders, order_lines, orders};

#[derive(Debug, Insertable)]
#[diesel(table_name = orders)]
pub struct NewOrderRow {
    pub user_id: i64,
    pub order_status_id: i64,
    pub payment_status_id: i64,
    pub total_amount: BigDecimal,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = order_lines)]
pub struct NewOrderLineRow {
    pub order_id: i64,
    pub product_id: i64,
    pub quantity: i32,
    pub price_at_moment: BigDecimal,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = delivered_orders)]
pub struct NewDeliveredOrderRow {
    pub order_id: i64,
    pub delivery_date: chrono::DateTime<chrono::Utc>,
    pub courier_name: String,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = audit_log)]
pub struct NewAuditRow {
    pub user_id: i64,
    pub table_name: String,
    pub payload: Value,
}

/// Per-brand rollup row produced by the raw aggregation query; mirrors the
/// brand sales reporting view of the admin dashboard.
#[derive(Debug, QueryableByName)]
pub struct BrandSalesRow {
    #[diesel(sql_type = BigInt)]
    pub brand_id: i64,
    #[diesel(sql_type = Text)]
    pub brand_name: String,
    #[diesel(sql_type = BigInt)]
    pub total_orders: i64,
    #[diesel(sql_type = BigInt)]
    pub delivered_orders: i64,
    #[diesel(sql_type = BigInt)]
    pub total_units: i64,
    #[diesel(sql_type = Numeric)]
    pub total_revenue: BigDecimal,
}

#[derive(Debug, QueryableByName)]
pub struct RevenueRow {
    #[diesel(sql_type = Numeric)]
    pub revenue: BigDecimal,
}
