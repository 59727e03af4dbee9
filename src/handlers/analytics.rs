use actix_web::{web, HttpResponse};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::analytics::{BrandRevenue, BrandSales, Dashboard};
use crate::domain::errors::DomainError;
use crate::errors::ApiError;
use crate::AnalyticsApi;

// ── Response DTOs ────────────────────────────────────────────────────────────

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecentOrderResponse {
    pub id: i64,
    pub customer: String,
    pub order_status: String,
    pub payment_status: String,
    pub order_date: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LowStockProductResponse {
    pub id: i64,
    pub name: String,
    pub brand: String,
    pub stock_quantity: i32,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardResponse {
    pub total_products: i64,
    pub total_orders: i64,
    pub total_users: i64,
    pub total_revenue: String,
    pub recent_orders: Vec<RecentOrderResponse>,
    pub low_stock_products: Vec<LowStockProductResponse>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BrandSalesResponse {
    pub brand_id: i64,
    pub brand: String,
    pub orders: i64,
    pub delivered_orders: i64,
    pub units: i64,
    pub revenue: String,
    pub average_order_value: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BrandRevenueResponse {
    pub brand_id: i64,
    pub brand_name: String,
    pub revenue: String,
    pub date_from: String,
    pub date_to: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct RevenueWindowParams {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

fn to_dashboard_response(dashboard: Dashboard) -> DashboardResponse {
    DashboardResponse {
        total_products: dashboard.total_products,
        total_orders: dashboard.total_orders,
        total_users: dashboard.total_users,
        total_revenue: dashboard.total_revenue.to_string(),
        recent_orders: dashboard
            .recent_orders
            .into_iter()
            .map(|o| RecentOrderResponse {
                id: o.id,
                customer: o.customer,
                order_status: o.order_status,
                payment_status: o.payment_status,
                order_date: o.order_date.to_rfc3339(),
            })
            .collect(),
        low_stock_products: dashboard
            .low_stock_products
            .into_iter()
            .map(|p| LowStockProductResponse {
                id: p.id,
                name: p.name,
                brand: p.brand,
                stock_quantity: p.stock_quantity,
            })
            .collect(),
    }
}

fn to_brand_sales_response(sales: BrandSales) -> BrandSalesResponse {
    BrandSalesResponse {
        brand_id: sales.brand_id,
        brand: sales.brand_name,
        orders: sales.total_orders,
        delivered_orders: sales.delivered_orders,
        units: sales.total_units,
        revenue: sales.total_revenue.to_string(),
        average_order_value: sales.average_order_value.to_string(),
    }
}

fn to_brand_revenue_response(revenue: BrandRevenue) -> BrandRevenueResponse {
    BrandRevenueResponse {
        brand_id: revenue.brand_id,
        brand_name: revenue.brand_name,
        revenue: revenue.revenue.to_string(),
        date_from: revenue.date_from.to_rfc3339(),
        date_to: revenue.date_to.to_rfc3339(),
    }
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// GET /analytics/dashboard
///
/// Aggregate counts, revenue, recent orders and low-stock products over
/// non-deleted rows.
#[utoipa::path(
    get,
    path = "/analytics/dashboard",
    responses(
        (status = 200, description = "Dashboard rollup", body = DashboardResponse),
        (status = 500, description = "Internal server error"),
    ),
    tag = "analytics"
)]
pub async fn dashboard(service: web::Data<AnalyticsApi>) -> Result<HttpResponse, ApiError> {
    let dashboard = web::block(move || service.dashboard())
        .await
        .map_err(|e| ApiError::from(DomainError::Internal(e.to_string())))??;

    Ok(HttpResponse::Ok().json(to_dashboard_response(dashboard)))
}

/// GET /analytics/brands
///
/// Per-brand order and revenue rollup over all time.
#[utoipa::path(
    get,
    path = "/analytics/brands",
    responses(
        (status = 200, description = "Per-brand sales rollup", body = [BrandSalesResponse]),
        (status = 500, description = "Internal server error"),
    ),
    tag = "analytics"
)]
pub async fn brand_sales(service: web::Data<AnalyticsApi>) -> Result<HttpResponse, ApiError> {
    let sales = web::block(move || service.brand_sales())
        .await
        .map_err(|e| ApiError::from(DomainError::Internal(e.to_string())))??;

    let items: Vec<BrandSalesResponse> = sales.into_iter().map(to_brand_sales_response).collect();
    Ok(HttpResponse::Ok().json(items))
}

/// GET /analytics/brands/{id}/revenue
///
/// Revenue of one brand over `[from, to]`; defaults to the last 30 days
/// ending now when the window is omitted.
#[utoipa::path(
    get,
    path = "/analytics/brands/{id}/revenue",
    params(
        ("id" = i64, Path, description = "Brand id"),
        ("from" = Option<DateTime<Utc>>, Query, description = "Window start (RFC 3339)"),
        ("to" = Option<DateTime<Utc>>, Query, description = "Window end (RFC 3339)"),
    ),
    responses(
        (status = 200, description = "Brand revenue over the window", body = BrandRevenueResponse),
        (status = 400, description = "'from' later than 'to'"),
        (status = 404, description = "Brand not found"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "analytics"
)]
pub async fn brand_revenue(
    service: web::Data<AnalyticsApi>,
    path: web::Path<i64>,
    query: web::Query<RevenueWindowParams>,
) -> Result<HttpResponse, ApiError> {
    let brand_id = path.into_inner();
    let params = query.into_inner();

    let revenue = web::block(move || service.brand_revenue(brand_id, params.from, params.to))
        .await
        .map_err(|e| ApiError::from(DomainError::Internal(e.to_string())))??;

    Ok(HttpResponse::Ok().json(to_brand_revenue_response(revenue)))
}
