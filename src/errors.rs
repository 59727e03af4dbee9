use actix_web::http::StatusCode;
use actix_web::HttpResponse;
use serde_json::{json, Value};
use thiserror::Error;

use crate::domain::errors::{DomainError, Shortage};

/// HTTP-facing wrapper around [`DomainError`]. Every error response carries a
/// machine-checkable `kind` plus a human-readable message; stock failures
/// additionally carry the full per-product detail list.
#[derive(Debug, Error)]
#[error(transparent)]
pub struct ApiError(#[from] pub DomainError);

fn shortage_details(shortages: &[Shortage]) -> Value {
    Value::Array(
        shortages
            .iter()
            .map(|s| {
                json!({
                    "productId": s.product_id,
                    "requested": s.requested,
                    "available": s.available,
                })
            })
            .collect(),
    )
}

impl ApiError {
    fn kind(&self) -> &'static str {
        match &self.0 {
            DomainError::Validation(_) => "validation",
            DomainError::UserNotFound(_) => "user_not_found",
            DomainError::OrderNotFound(_) => "order_not_found",
            DomainError::BrandNotFound(_) => "brand_not_found",
            DomainError::ProductsUnavailable(_) => "products_unavailable",
            DomainError::InsufficientStock(_) => "insufficient_stock",
            DomainError::ConcurrencyConflict(_) => "conflict",
            DomainError::MissingStatusConfiguration => "missing_status_configuration",
            DomainError::Internal(_) => "internal",
        }
    }

    fn details(&self) -> Option<Value> {
        match &self.0 {
            DomainError::ProductsUnavailable(ids) => Some(json!(ids)),
            DomainError::InsufficientStock(shortages)
            | DomainError::ConcurrencyConflict(shortages) => Some(shortage_details(shortages)),
            _ => None,
        }
    }
}

impl actix_web::ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match &self.0 {
            DomainError::Validation(_) | DomainError::InsufficientStock(_) => {
                StatusCode::BAD_REQUEST
            }
            DomainError::UserNotFound(_)
            | DomainError::OrderNotFound(_)
            | DomainError::BrandNotFound(_)
            | DomainError::ProductsUnavailable(_) => StatusCode::NOT_FOUND,
            DomainError::ConcurrencyConflict(_) => StatusCode::CONFLICT,
            DomainError::MissingStatusConfiguration | DomainError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        // Internal details stay in the logs, not in the response body.
        let message = match &self.0 {
            DomainError::Internal(detail) => {
                log::error!("internal error: {detail}");
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };

        let mut error = json!({
            "kind": self.kind(),
            "message": message,
        });
        if let Some(details) = self.details() {
            error["details"] = details;
        }

        HttpResponse::build(self.status_code()).json(json!({ "error": error }))
    }
}
