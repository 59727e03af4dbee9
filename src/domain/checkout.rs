use std::collections::HashMap;

use super::errors::{DomainError, Shortage};

/// One `(product, quantity)` pair of a submitted cart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartLine {
    pub product_id: i64,
    pub quantity: i32,
}

/// A validated checkout request, before any database work.
#[derive(Debug, Clone)]
pub struct CheckoutCommand {
    pub user_id: i64,
    pub items: Vec<CartLine>,
    pub order_status_id: Option<i64>,
    pub payment_status_id: Option<i64>,
}

/// Merge duplicate product ids into one summed quantity per product.
///
/// Runs before the stock check so that a cart listing the same product twice
/// is validated against its combined demand. Rejects empty carts and any line
/// with a non-positive quantity; first-occurrence order is preserved.
pub fn collapse_lines(items: &[CartLine]) -> Result<Vec<CartLine>, DomainError> {
    if items.is_empty() {
        return Err(DomainError::Validation("cart is empty".into()));
    }

    let mut index: HashMap<i64, usize> = HashMap::new();
    let mut collapsed: Vec<CartLine> = Vec::new();

    for item in items {
        if item.quantity < 1 {
            return Err(DomainError::Validation(format!(
                "quantity for product {} must be at least 1",
                item.product_id
            )));
        }
        match index.get(&item.product_id) {
            Some(&i) => collapsed[i].quantity += item.quantity,
            None => {
                index.insert(item.product_id, collapsed.len());
                collapsed.push(item.clone());
            }
        }
    }

    Ok(collapsed)
}

/// Compare collapsed demand against current stock levels.
///
/// `stock` comes from the catalog read and only contains non-deleted
/// products; an absent id therefore means "not found or deleted" and fails
/// the whole request before any per-line stock comparison. Otherwise every
/// short line is collected so the caller can report all problems at once.
///
/// Read-only pre-check: the commit-time conditional decrement is the actual
/// enforcement point under concurrency.
pub fn check_stock(lines: &[CartLine], stock: &HashMap<i64, i32>) -> Result<(), DomainError> {
    let mut missing: Vec<i64> = lines
        .iter()
        .filter(|l| !stock.contains_key(&l.product_id))
        .map(|l| l.product_id)
        .collect();
    if !missing.is_empty() {
        missing.sort_unstable();
        return Err(DomainError::ProductsUnavailable(missing));
    }

    let shortages: Vec<Shortage> = lines
        .iter()
        .filter_map(|l| {
            let available = stock[&l.product_id];
            (l.quantity > available).then(|| Shortage {
                product_id: l.product_id,
                requested: l.quantity,
                available,
            })
        })
        .collect();

    if shortages.is_empty() {
        Ok(())
    } else {
        Err(DomainError::InsufficientStock(shortages))
    }
}
