use actix_web::{web, HttpRequest, HttpResponse};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::checkout::{CartLine, CheckoutCommand};
use crate::domain::errors::DomainError;
use crate::domain::order::{DeliveryInfo, OrderDetails, OrderSummary, StatusUpdate};
use crate::errors::ApiError;
use crate::OrderApi;

/// Fallback audit actor when the caller does not identify itself.
const SYSTEM_USER_ID: i64 = 1;

/// Acting user for audit attribution, from the `X-User-Id` header.
fn acting_user(req: &HttpRequest) -> i64 {
    req.headers()
        .get("X-User-Id")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<i64>().ok())
        .filter(|id| *id > 0)
        .unwrap_or(SYSTEM_USER_ID)
}

// ── Request / response DTOs ──────────────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutItemRequest {
    pub product_id: i64,
    pub quantity: i32,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    pub user_id: i64,
    pub items: Vec<CheckoutItemRequest>,
    pub order_status_id: Option<i64>,
    pub payment_status_id: Option<i64>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutResponse {
    pub order_id: i64,
    /// Decimal amount as a string to avoid floating-point issues, e.g. "200.00"
    pub total_amount: String,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderUpdateRequest {
    pub id: i64,
    pub order_status_id: i64,
    pub payment_status_id: i64,
    pub delivery_date: Option<DateTime<Utc>>,
    pub courier_name: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryResponse {
    pub delivery_date: String,
    pub courier_name: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderSummaryResponse {
    pub id: i64,
    pub user_id: i64,
    pub customer_login: String,
    pub order_date: String,
    pub total_amount: String,
    pub order_status_id: i64,
    pub order_status: String,
    pub payment_status_id: i64,
    pub payment_status: String,
    pub delivery: Option<DeliveryResponse>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemResponse {
    pub product_id: i64,
    pub product_name: String,
    pub quantity: i32,
    pub price_at_moment: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderDetailsResponse {
    #[serde(flatten)]
    pub summary: OrderSummaryResponse,
    pub items: Vec<OrderItemResponse>,
}

fn to_summary_response(summary: OrderSummary) -> OrderSummaryResponse {
    OrderSummaryResponse {
        id: summary.id,
        user_id: summary.user_id,
        customer_login: summary.customer_login,
        order_date: summary.order_date.to_rfc3339(),
        total_amount: summary.total_amount.to_string(),
        order_status_id: summary.order_status_id,
        order_status: summary.order_status,
        payment_status_id: summary.payment_status_id,
        payment_status: summary.payment_status,
        delivery: summary.delivery.map(|d| DeliveryResponse {
            delivery_date: d.delivery_date.to_rfc3339(),
            courier_name: d.courier_name,
        }),
    }
}

fn to_details_response(details: OrderDetails) -> OrderDetailsResponse {
    OrderDetailsResponse {
        summary: to_summary_response(details.summary),
        items: details
            .items
            .into_iter()
            .map(|i| OrderItemResponse {
                product_id: i.product_id,
                product_name: i.product_name,
                quantity: i.quantity,
                price_at_moment: i.price_at_moment.to_string(),
            })
            .collect(),
    }
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// POST /checkout
///
/// Converts a submitted cart into a committed order. Duplicate product lines
/// are collapsed, stock is validated, and the order header, line items and
/// stock decrement are committed inside a single database transaction.
#[utoipa::path(
    post,
    path = "/checkout",
    request_body = CheckoutRequest,
    responses(
        (status = 201, description = "Order committed", body = CheckoutResponse),
        (status = 400, description = "Empty cart, non-positive quantity, or insufficient stock"),
        (status = 404, description = "User or products not found"),
        (status = 409, description = "Stock changed concurrently, retry with an adjusted cart"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "orders"
)]
pub async fn checkout(
    service: web::Data<OrderApi>,
    body: web::Json<CheckoutRequest>,
) -> Result<HttpResponse, ApiError> {
    let body = body.into_inner();
    let cmd = CheckoutCommand {
        user_id: body.user_id,
        items: body
            .items
            .into_iter()
            .map(|i| CartLine {
                product_id: i.product_id,
                quantity: i.quantity,
            })
            .collect(),
        order_status_id: body.order_status_id,
        payment_status_id: body.payment_status_id,
    };

    let receipt = web::block(move || service.checkout(cmd))
        .await
        .map_err(|e| ApiError::from(DomainError::Internal(e.to_string())))??;

    Ok(HttpResponse::Created().json(CheckoutResponse {
        order_id: receipt.order_id,
        total_amount: receipt.total_amount.to_string(),
    }))
}

/// PUT /orders/{id}
///
/// Applies an order-status / payment-status change and, optionally, delivery
/// info as one atomic update. A delivery date and courier name must be
/// supplied together or not at all.
#[utoipa::path(
    put,
    path = "/orders/{id}",
    params(("id" = i64, Path, description = "Order id")),
    request_body = OrderUpdateRequest,
    responses(
        (status = 204, description = "Order updated"),
        (status = 400, description = "Id mismatch or unpaired delivery fields"),
        (status = 404, description = "Order not found"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "orders"
)]
pub async fn update_order(
    service: web::Data<OrderApi>,
    path: web::Path<i64>,
    body: web::Json<OrderUpdateRequest>,
    req: HttpRequest,
) -> Result<HttpResponse, ApiError> {
    let order_id = path.into_inner();
    let body = body.into_inner();

    if body.id != order_id {
        return Err(DomainError::Validation("body id does not match path id".into()).into());
    }
    let delivery = DeliveryInfo::from_parts(body.delivery_date, body.courier_name)?;
    let update = StatusUpdate {
        order_status_id: body.order_status_id,
        payment_status_id: body.payment_status_id,
        delivery,
    };
    let acting_user_id = acting_user(&req);

    web::block(move || service.update_order(order_id, update, acting_user_id))
        .await
        .map_err(|e| ApiError::from(DomainError::Internal(e.to_string())))??;

    Ok(HttpResponse::NoContent().finish())
}

/// GET /orders
///
/// Returns all non-deleted orders, newest first, without their line items.
#[utoipa::path(
    get,
    path = "/orders",
    responses(
        (status = 200, description = "Orders, newest first", body = [OrderSummaryResponse]),
        (status = 500, description = "Internal server error"),
    ),
    tag = "orders"
)]
pub async fn list_orders(service: web::Data<OrderApi>) -> Result<HttpResponse, ApiError> {
    let summaries = web::block(move || service.list_orders())
        .await
        .map_err(|e| ApiError::from(DomainError::Internal(e.to_string())))??;

    let items: Vec<OrderSummaryResponse> = summaries.into_iter().map(to_summary_response).collect();
    Ok(HttpResponse::Ok().json(items))
}

/// GET /orders/{id}
///
/// Returns the order together with its line items and delivery info.
#[utoipa::path(
    get,
    path = "/orders/{id}",
    params(("id" = i64, Path, description = "Order id")),
    responses(
        (status = 200, description = "Order found", body = OrderDetailsResponse),
        (status = 404, description = "Order not found"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "orders"
)]
pub async fn get_order(
    service: web::Data<OrderApi>,
    path: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    let order_id = path.into_inner();
    let details = web::block(move || service.get_order(order_id))
        .await
        .map_err(|e| ApiError::from(DomainError::Internal(e.to_string())))??;

    Ok(HttpResponse::Ok().json(to_details_response(details)))
}
