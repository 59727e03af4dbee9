use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};

use super::errors::DomainError;

/// Returned to the caller after a committed checkout.
#[derive(Debug, Clone)]
pub struct CheckoutReceipt {
    pub order_id: i64,
    pub total_amount: BigDecimal,
}

/// Delivery information attached to an order. A date without a courier (or
/// the reverse) is never representable; construct via [`DeliveryInfo::from_parts`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryInfo {
    pub delivery_date: DateTime<Utc>,
    pub courier_name: String,
}

impl DeliveryInfo {
    /// Pair up optional delivery fields from a status-update request.
    ///
    /// Both present → `Some`, both absent → `None`, anything else is a
    /// validation failure. A blank courier name counts as absent.
    pub fn from_parts(
        delivery_date: Option<DateTime<Utc>>,
        courier_name: Option<String>,
    ) -> Result<Option<Self>, DomainError> {
        let courier = courier_name
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty());

        match (delivery_date, courier) {
            (Some(delivery_date), Some(courier_name)) => Ok(Some(Self {
                delivery_date,
                courier_name,
            })),
            (None, None) => Ok(None),
            (Some(_), None) => Err(DomainError::Validation(
                "a delivery date requires a courier name".into(),
            )),
            (None, Some(_)) => Err(DomainError::Validation(
                "a courier name requires a delivery date".into(),
            )),
        }
    }
}

/// Status change applied to an existing order, optionally together with
/// delivery info, as one atomic update.
#[derive(Debug, Clone)]
pub struct StatusUpdate {
    pub order_status_id: i64,
    pub payment_status_id: i64,
    pub delivery: Option<DeliveryInfo>,
}

#[derive(Debug, Clone)]
pub struct DeliverySummary {
    pub delivery_date: DateTime<Utc>,
    pub courier_name: String,
}

/// Order header projection used by the list endpoint.
#[derive(Debug, Clone)]
pub struct OrderSummary {
    pub id: i64,
    pub user_id: i64,
    pub customer_login: String,
    pub order_date: DateTime<Utc>,
    pub total_amount: BigDecimal,
    pub order_status_id: i64,
    pub order_status: String,
    pub payment_status_id: i64,
    pub payment_status: String,
    pub delivery: Option<DeliverySummary>,
}

#[derive(Debug, Clone)]
pub struct OrderLineView {
    pub product_id: i64,
    pub product_name: String,
    pub quantity: i32,
    pub price_at_moment: BigDecimal,
}

/// Full order projection: header plus line items.
#[derive(Debug, Clone)]
pub struct OrderDetails {
    pub summary: OrderSummary,
    pub items: Vec<OrderLineView>,
}
