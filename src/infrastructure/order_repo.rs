use std::collections::HashMap;

use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use diesel::dsl::exists;
use diesel::prelude::*;
use diesel::result::DatabaseErrorKind;
use serde_json::json;

use crate::db::DbPool;
use crate::domain::checkout::CartLine;
use crate::domain::errors::{DomainError, Shortage};
use crate::domain::order::{
    CheckoutReceipt, DeliverySummary, OrderDetails, OrderLineView, OrderSummary, StatusUpdate,
};
use crate::domain::ports::OrderRepository;
use crate::schema::{
    audit_log, delivered_orders, order_lines, order_statuses, orders, payment_statuses, products,
    users,
};

use super::models::{NewAuditRow, NewDeliveredOrderRow, NewOrderLineRow, NewOrderRow};

// ── Error conversions (infrastructure concern only) ──────────────────────────

impl From<diesel::result::Error> for DomainError {
    fn from(e: diesel::result::Error) -> Self {
        DomainError::Internal(e.to_string())
    }
}

impl From<r2d2::Error> for DomainError {
    fn from(e: r2d2::Error) -> Self {
        DomainError::Internal(e.to_string())
    }
}

// ── Repository ────────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DieselOrderRepository {
    pool: DbPool,
}

impl DieselOrderRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

type SummaryRow = (
    i64,
    i64,
    String,
    DateTime<Utc>,
    BigDecimal,
    i64,
    String,
    i64,
    String,
    Option<(DateTime<Utc>, String)>,
);

fn to_summary(row: SummaryRow) -> OrderSummary {
    let (
        id,
        user_id,
        customer_login,
        order_date,
        total_amount,
        order_status_id,
        order_status,
        payment_status_id,
        payment_status,
        delivery,
    ) = row;
    OrderSummary {
        id,
        user_id,
        customer_login,
        order_date,
        total_amount,
        order_status_id,
        order_status,
        payment_status_id,
        payment_status,
        delivery: delivery.map(|(delivery_date, courier_name)| DeliverySummary {
            delivery_date,
            courier_name,
        }),
    }
}

fn load_summaries(
    conn: &mut PgConnection,
    order_id: Option<i64>,
) -> Result<Vec<OrderSummary>, DomainError> {
    let mut query = orders::table
        .inner_join(users::table)
        .inner_join(order_statuses::table)
        .inner_join(payment_statuses::table)
        .left_join(delivered_orders::table)
        .select((
            orders::id,
            orders::user_id,
            users::login,
            orders::order_date,
            orders::total_amount,
            orders::order_status_id,
            order_statuses::name,
            orders::payment_status_id,
            payment_statuses::name,
            (delivered_orders::delivery_date, delivered_orders::courier_name).nullable(),
        ))
        .filter(orders::is_deleted.eq(false))
        .order(orders::order_date.desc())
        .into_boxed();

    if let Some(id) = order_id {
        query = query.filter(orders::id.eq(id));
    }

    let rows: Vec<SummaryRow> = query.load(conn)?;

    Ok(rows.into_iter().map(to_summary).collect())
}

impl OrderRepository for DieselOrderRepository {
    fn user_exists(&self, user_id: i64) -> Result<bool, DomainError> {
        let mut conn = self.pool.get()?;
        let found = diesel::select(exists(
            users::table.filter(users::id.eq(user_id).and(users::is_deleted.eq(false))),
        ))
        .get_result(&mut conn)?;
        Ok(found)
    }

    fn stock_levels(&self, product_ids: &[i64]) -> Result<HashMap<i64, i32>, DomainError> {
        let mut conn = self.pool.get()?;
        let rows: Vec<(i64, i32)> = products::table
            .filter(
                products::id
                    .eq_any(product_ids)
                    .and(products::is_deleted.eq(false)),
            )
            .select((products::id, products::stock_quantity))
            .load(&mut conn)?;
        Ok(rows.into_iter().collect())
    }

    fn lowest_status_ids(&self) -> Result<(Option<i64>, Option<i64>), DomainError> {
        let mut conn = self.pool.get()?;
        let order_status = order_statuses::table
            .select(order_statuses::id)
            .order(order_statuses::id.asc())
            .first(&mut conn)
            .optional()?;
        let payment_status = payment_statuses::table
            .select(payment_statuses::id)
            .order(payment_statuses::id.asc())
            .first(&mut conn)
            .optional()?;
        Ok((order_status, payment_status))
    }

    fn create_order(
        &self,
        user_id: i64,
        order_status_id: i64,
        payment_status_id: i64,
        lines: &[CartLine],
    ) -> Result<CheckoutReceipt, DomainError> {
        let mut conn = self.pool.get()?;

        // Decrement in ascending product id so concurrent multi-line
        // checkouts take their row locks in the same order and cannot
        // deadlock each other.
        let mut lines = lines.to_vec();
        lines.sort_unstable_by_key(|l| l.product_id);

        conn.transaction::<_, DomainError, _>(|conn| {
            // 1. Conditional decrement per line. A zero row count means the
            //    product vanished or a concurrent checkout drained the stock
            //    after our advisory pre-check; either way the whole
            //    transaction rolls back. The updated row stays locked until
            //    commit, which also pins the price read below.
            for line in &lines {
                let updated = diesel::update(
                    products::table.filter(
                        products::id
                            .eq(line.product_id)
                            .and(products::is_deleted.eq(false))
                            .and(products::stock_quantity.ge(line.quantity)),
                    ),
                )
                .set(products::stock_quantity.eq(products::stock_quantity - line.quantity))
                .execute(conn)?;

                if updated == 0 {
                    let available: Option<i32> = products::table
                        .filter(
                            products::id
                                .eq(line.product_id)
                                .and(products::is_deleted.eq(false)),
                        )
                        .select(products::stock_quantity)
                        .first(conn)
                        .optional()?;
                    return Err(match available {
                        None => DomainError::ProductsUnavailable(vec![line.product_id]),
                        Some(available) => DomainError::ConcurrencyConflict(vec![Shortage {
                            product_id: line.product_id,
                            requested: line.quantity,
                            available,
                        }]),
                    });
                }
            }

            // 2. Capture current prices and compute the order total.
            let product_ids: Vec<i64> = lines.iter().map(|l| l.product_id).collect();
            let prices: HashMap<i64, BigDecimal> = products::table
                .filter(products::id.eq_any(&product_ids))
                .select((products::id, products::price))
                .load::<(i64, BigDecimal)>(conn)?
                .into_iter()
                .collect();

            let mut total = BigDecimal::from(0);
            let mut priced_lines: Vec<(i64, i32, BigDecimal)> = Vec::with_capacity(lines.len());
            for line in &lines {
                let price = prices.get(&line.product_id).cloned().ok_or_else(|| {
                    DomainError::Internal(format!(
                        "price missing for product {} after decrement",
                        line.product_id
                    ))
                })?;
                total += &price * BigDecimal::from(line.quantity);
                priced_lines.push((line.product_id, line.quantity, price));
            }

            // 3. Insert the order header and its lines.
            let order_id: i64 = diesel::insert_into(orders::table)
                .values(&NewOrderRow {
                    user_id,
                    order_status_id,
                    payment_status_id,
                    total_amount: total.clone(),
                })
                .returning(orders::id)
                .get_result(conn)?;

            let new_lines: Vec<NewOrderLineRow> = priced_lines
                .into_iter()
                .map(|(product_id, quantity, price_at_moment)| NewOrderLineRow {
                    order_id,
                    product_id,
                    quantity,
                    price_at_moment,
                })
                .collect();
            diesel::insert_into(order_lines::table)
                .values(&new_lines)
                .execute(conn)?;

            // 4. Audit record in the same transaction, attributed to the
            //    purchasing user.
            diesel::insert_into(audit_log::table)
                .values(&NewAuditRow {
                    user_id,
                    table_name: "orders".to_string(),
                    payload: json!({
                        "action": "checkout",
                        "order_id": order_id,
                        "total_amount": total.to_string(),
                    }),
                })
                .execute(conn)?;

            Ok(CheckoutReceipt {
                order_id,
                total_amount: total,
            })
        })
    }

    fn update_status(
        &self,
        order_id: i64,
        update: &StatusUpdate,
        acting_user_id: i64,
    ) -> Result<(), DomainError> {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            // Unknown status ids trip the foreign keys; report that as a
            // caller error, not an internal one.
            let updated = diesel::update(
                orders::table.filter(orders::id.eq(order_id).and(orders::is_deleted.eq(false))),
            )
            .set((
                orders::order_status_id.eq(update.order_status_id),
                orders::payment_status_id.eq(update.payment_status_id),
            ))
            .execute(conn)
            .map_err(|e| match e {
                diesel::result::Error::DatabaseError(
                    DatabaseErrorKind::ForeignKeyViolation,
                    _,
                ) => DomainError::Validation(
                    "unknown order status or payment status id".into(),
                ),
                other => other.into(),
            })?;

            if updated == 0 {
                return Err(DomainError::OrderNotFound(order_id));
            }

            // Delivery info creates or overwrites the order's single
            // delivered_orders record in the same transaction.
            if let Some(delivery) = &update.delivery {
                diesel::insert_into(delivered_orders::table)
                    .values(&NewDeliveredOrderRow {
                        order_id,
                        delivery_date: delivery.delivery_date,
                        courier_name: delivery.courier_name.clone(),
                    })
                    .on_conflict(delivered_orders::order_id)
                    .do_update()
                    .set((
                        delivered_orders::delivery_date.eq(delivery.delivery_date),
                        delivered_orders::courier_name.eq(&delivery.courier_name),
                    ))
                    .execute(conn)?;
            }

            diesel::insert_into(audit_log::table)
                .values(&NewAuditRow {
                    user_id: acting_user_id,
                    table_name: "orders".to_string(),
                    payload: json!({
                        "action": "status_update",
                        "order_id": order_id,
                        "order_status_id": update.order_status_id,
                        "payment_status_id": update.payment_status_id,
                        "delivery_updated": update.delivery.is_some(),
                    }),
                })
                .execute(conn)?;

            Ok(())
        })
    }

    fn find_by_id(&self, order_id: i64) -> Result<Option<OrderDetails>, DomainError> {
        let mut conn = self.pool.get()?;

        let Some(summary) = load_summaries(&mut conn, Some(order_id))?.into_iter().next() else {
            return Ok(None);
        };

        let items = order_lines::table
            .inner_join(products::table)
            .filter(order_lines::order_id.eq(order_id))
            .order(order_lines::product_id.asc())
            .select((
                order_lines::product_id,
                products::name,
                order_lines::quantity,
                order_lines::price_at_moment,
            ))
            .load::<(i64, String, i32, BigDecimal)>(&mut conn)?
            .into_iter()
            .map(
                |(product_id, product_name, quantity, price_at_moment)| OrderLineView {
                    product_id,
                    product_name,
                    quantity,
                    price_at_moment,
                },
            )
            .collect();

        Ok(Some(OrderDetails { summary, items }))
    }

    fn list(&self) -> Result<Vec<OrderSummary>, DomainError> {
        let mut conn = self.pool.get()?;
        load_summaries(&mut conn, None)
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use bigdecimal::BigDecimal;
    use chrono::{TimeZone, Utc};
    use diesel::prelude::*;

    use super::DieselOrderRepository;
    use crate::db::DbPool;
    use crate::domain::checkout::CartLine;
    use crate::domain::errors::{DomainError, Shortage};
    use crate::domain::order::{DeliveryInfo, StatusUpdate};
    use crate::domain::ports::OrderRepository;
    use crate::infrastructure::test_db::{
        seed_brand, seed_product, seed_statuses, seed_user, setup_db,
    };
    use crate::schema::{audit_log, delivered_orders, order_lines, orders, products};

    struct Fixture {
        user_id: i64,
        brand_id: i64,
        order_status_id: i64,
        payment_status_id: i64,
    }

    fn seed_fixture(pool: &DbPool) -> Fixture {
        let mut conn = pool.get().expect("Failed to get connection");
        let brand_id = seed_brand(&mut conn, "Acme");
        let user_id = seed_user(&mut conn, "alice");
        let (order_status_id, payment_status_id) = seed_statuses(&mut conn);
        Fixture {
            user_id,
            brand_id,
            order_status_id,
            payment_status_id,
        }
    }

    fn cart(product_id: i64, quantity: i32) -> CartLine {
        CartLine {
            product_id,
            quantity,
        }
    }

    fn dec(s: &str) -> BigDecimal {
        BigDecimal::from_str(s).expect("valid decimal")
    }

    fn stock_of(pool: &DbPool, product_id: i64) -> i32 {
        let mut conn = pool.get().expect("Failed to get connection");
        products::table
            .filter(products::id.eq(product_id))
            .select(products::stock_quantity)
            .first(&mut conn)
            .expect("stock query failed")
    }

    #[tokio::test]
    async fn checkout_commits_order_and_decrements_stock() {
        let (_container, pool) = setup_db().await;
        let fx = seed_fixture(&pool);
        let product_id = {
            let mut conn = pool.get().unwrap();
            seed_product(&mut conn, fx.brand_id, "Boots", "100.00", 4)
        };
        let repo = DieselOrderRepository::new(pool.clone());

        let receipt = repo
            .create_order(
                fx.user_id,
                fx.order_status_id,
                fx.payment_status_id,
                &[cart(product_id, 2)],
            )
            .expect("checkout failed");

        assert_eq!(receipt.total_amount, dec("200.00"));
        assert_eq!(stock_of(&pool, product_id), 2);

        let details = repo
            .find_by_id(receipt.order_id)
            .expect("find failed")
            .expect("order should exist");
        assert_eq!(details.summary.user_id, fx.user_id);
        assert_eq!(details.summary.customer_login, "alice");
        assert_eq!(details.summary.order_status, "New");
        assert_eq!(details.summary.total_amount, dec("200.00"));
        assert!(details.summary.delivery.is_none());
        assert_eq!(details.items.len(), 1);
        assert_eq!(details.items[0].product_name, "Boots");
        assert_eq!(details.items[0].quantity, 2);
        assert_eq!(details.items[0].price_at_moment, dec("100.00"));

        // Audit record lands in the same transaction, attributed to the buyer.
        let mut conn = pool.get().unwrap();
        let audited: i64 = audit_log::table
            .filter(audit_log::user_id.eq(fx.user_id))
            .count()
            .get_result(&mut conn)
            .unwrap();
        assert_eq!(audited, 1);
    }

    #[tokio::test]
    async fn total_amount_survives_later_price_change() {
        let (_container, pool) = setup_db().await;
        let fx = seed_fixture(&pool);
        let product_id = {
            let mut conn = pool.get().unwrap();
            seed_product(&mut conn, fx.brand_id, "Boots", "100.00", 10)
        };
        let repo = DieselOrderRepository::new(pool.clone());

        let receipt = repo
            .create_order(
                fx.user_id,
                fx.order_status_id,
                fx.payment_status_id,
                &[cart(product_id, 3)],
            )
            .expect("checkout failed");

        {
            let mut conn = pool.get().unwrap();
            diesel::update(products::table.filter(products::id.eq(product_id)))
                .set(products::price.eq(dec("999.99")))
                .execute(&mut conn)
                .unwrap();
        }

        let details = repo.find_by_id(receipt.order_id).unwrap().unwrap();
        assert_eq!(details.summary.total_amount, dec("300.00"));
        assert_eq!(details.items[0].price_at_moment, dec("100.00"));
    }

    #[tokio::test]
    async fn commit_fails_with_conflict_when_stock_raced_away() {
        let (_container, pool) = setup_db().await;
        let fx = seed_fixture(&pool);
        let product_id = {
            let mut conn = pool.get().unwrap();
            seed_product(&mut conn, fx.brand_id, "Boots", "50.00", 4)
        };
        let repo = DieselOrderRepository::new(pool.clone());

        repo.create_order(
            fx.user_id,
            fx.order_status_id,
            fx.payment_status_id,
            &[cart(product_id, 3)],
        )
        .expect("first checkout should commit");

        let err = repo
            .create_order(
                fx.user_id,
                fx.order_status_id,
                fx.payment_status_id,
                &[cart(product_id, 3)],
            )
            .unwrap_err();

        assert_eq!(
            err,
            DomainError::ConcurrencyConflict(vec![Shortage {
                product_id,
                requested: 3,
                available: 1,
            }])
        );
        assert_eq!(stock_of(&pool, product_id), 1);
    }

    #[tokio::test]
    async fn failed_commit_rolls_back_every_line() {
        let (_container, pool) = setup_db().await;
        let fx = seed_fixture(&pool);
        let (plenty, scarce) = {
            let mut conn = pool.get().unwrap();
            (
                seed_product(&mut conn, fx.brand_id, "Boots", "50.00", 5),
                seed_product(&mut conn, fx.brand_id, "Laces", "5.00", 1),
            )
        };
        let repo = DieselOrderRepository::new(pool.clone());

        let err = repo
            .create_order(
                fx.user_id,
                fx.order_status_id,
                fx.payment_status_id,
                &[cart(plenty, 2), cart(scarce, 2)],
            )
            .unwrap_err();
        assert!(matches!(err, DomainError::ConcurrencyConflict(_)));

        // No partial decrement, no half-committed order, no audit entry.
        assert_eq!(stock_of(&pool, plenty), 5);
        assert_eq!(stock_of(&pool, scarce), 1);
        let mut conn = pool.get().unwrap();
        let order_count: i64 = orders::table.count().get_result(&mut conn).unwrap();
        let line_count: i64 = order_lines::table.count().get_result(&mut conn).unwrap();
        let audit_count: i64 = audit_log::table.count().get_result(&mut conn).unwrap();
        assert_eq!((order_count, line_count, audit_count), (0, 0, 0));
    }

    #[tokio::test]
    async fn deleted_product_aborts_commit_as_unavailable() {
        let (_container, pool) = setup_db().await;
        let fx = seed_fixture(&pool);
        let product_id = {
            let mut conn = pool.get().unwrap();
            let id = seed_product(&mut conn, fx.brand_id, "Boots", "50.00", 5);
            diesel::update(products::table.filter(products::id.eq(id)))
                .set(products::is_deleted.eq(true))
                .execute(&mut conn)
                .unwrap();
            id
        };
        let repo = DieselOrderRepository::new(pool);

        let err = repo
            .create_order(
                fx.user_id,
                fx.order_status_id,
                fx.payment_status_id,
                &[cart(product_id, 1)],
            )
            .unwrap_err();
        assert_eq!(err, DomainError::ProductsUnavailable(vec![product_id]));
    }

    #[tokio::test]
    async fn concurrent_checkouts_for_same_stock_admit_exactly_one() {
        let (_container, pool) = setup_db().await;
        let fx = seed_fixture(&pool);
        let product_id = {
            let mut conn = pool.get().unwrap();
            seed_product(&mut conn, fx.brand_id, "Boots", "50.00", 4)
        };
        let repo = DieselOrderRepository::new(pool.clone());

        // Two checkouts of 3 units against a stock of 4: whatever the
        // interleaving, the conditional decrement lets only one commit.
        let handles: Vec<_> = (0..2)
            .map(|_| {
                let repo = repo.clone();
                let line = cart(product_id, 3);
                let (user, os, ps) = (fx.user_id, fx.order_status_id, fx.payment_status_id);
                std::thread::spawn(move || repo.create_order(user, os, ps, &[line]))
            })
            .collect();

        let results: Vec<_> = handles
            .into_iter()
            .map(|h| h.join().expect("checkout thread panicked"))
            .collect();

        let committed = results.iter().filter(|r| r.is_ok()).count();
        assert_eq!(committed, 1, "exactly one concurrent checkout may win");
        assert!(results
            .iter()
            .filter_map(|r| r.as_ref().err())
            .all(|e| matches!(e, DomainError::ConcurrencyConflict(_))));
        assert_eq!(stock_of(&pool, product_id), 1);
    }

    #[tokio::test]
    async fn opposite_order_carts_conflict_instead_of_deadlocking() {
        let (_container, pool) = setup_db().await;
        let fx = seed_fixture(&pool);
        let (boots, laces) = {
            let mut conn = pool.get().unwrap();
            (
                seed_product(&mut conn, fx.brand_id, "Boots", "50.00", 1),
                seed_product(&mut conn, fx.brand_id, "Laces", "5.00", 10),
            )
        };
        let repo = DieselOrderRepository::new(pool.clone());

        // Both carts need the single Boots unit but list their lines in
        // opposite order. Row locks are taken in ascending product id, so
        // the loser reports a conflict instead of tripping a database
        // deadlock.
        let carts = [
            vec![cart(boots, 1), cart(laces, 1)],
            vec![cart(laces, 1), cart(boots, 1)],
        ];
        let handles: Vec<_> = carts
            .into_iter()
            .map(|lines| {
                let repo = repo.clone();
                let (user, os, ps) = (fx.user_id, fx.order_status_id, fx.payment_status_id);
                std::thread::spawn(move || repo.create_order(user, os, ps, &lines))
            })
            .collect();

        let results: Vec<_> = handles
            .into_iter()
            .map(|h| h.join().expect("checkout thread panicked"))
            .collect();

        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
        assert!(results
            .iter()
            .filter_map(|r| r.as_ref().err())
            .all(|e| matches!(e, DomainError::ConcurrencyConflict(_))));
        assert_eq!(stock_of(&pool, boots), 0);
        assert_eq!(stock_of(&pool, laces), 9);
    }

    #[tokio::test]
    async fn status_update_rejects_unknown_status_ids() {
        let (_container, pool) = setup_db().await;
        let fx = seed_fixture(&pool);
        let product_id = {
            let mut conn = pool.get().unwrap();
            seed_product(&mut conn, fx.brand_id, "Boots", "50.00", 5)
        };
        let repo = DieselOrderRepository::new(pool.clone());
        let receipt = repo
            .create_order(
                fx.user_id,
                fx.order_status_id,
                fx.payment_status_id,
                &[cart(product_id, 1)],
            )
            .unwrap();

        let err = repo
            .update_status(
                receipt.order_id,
                &StatusUpdate {
                    order_status_id: 9999,
                    payment_status_id: fx.payment_status_id,
                    delivery: None,
                },
                1,
            )
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));

        // The rejected update leaves the order untouched.
        let details = repo.find_by_id(receipt.order_id).unwrap().unwrap();
        assert_eq!(details.summary.order_status_id, fx.order_status_id);
    }

    #[tokio::test]
    async fn status_update_applies_statuses_and_upserts_delivery() {
        let (_container, pool) = setup_db().await;
        let fx = seed_fixture(&pool);
        let product_id = {
            let mut conn = pool.get().unwrap();
            seed_product(&mut conn, fx.brand_id, "Boots", "50.00", 5)
        };
        let repo = DieselOrderRepository::new(pool.clone());
        let receipt = repo
            .create_order(
                fx.user_id,
                fx.order_status_id,
                fx.payment_status_id,
                &[cart(product_id, 1)],
            )
            .unwrap();

        let delivered_at = Utc.with_ymd_and_hms(2026, 8, 20, 10, 0, 0).unwrap();
        let update = StatusUpdate {
            order_status_id: fx.order_status_id,
            payment_status_id: fx.payment_status_id,
            delivery: Some(DeliveryInfo {
                delivery_date: delivered_at,
                courier_name: "Ivan".to_string(),
            }),
        };
        repo.update_status(receipt.order_id, &update, 1)
            .expect("status update failed");

        let details = repo.find_by_id(receipt.order_id).unwrap().unwrap();
        let delivery = details.summary.delivery.expect("delivery should be set");
        assert_eq!(delivery.courier_name, "Ivan");
        assert_eq!(delivery.delivery_date, delivered_at);

        // A second update overwrites the single delivery record in place.
        let update = StatusUpdate {
            delivery: Some(DeliveryInfo {
                delivery_date: delivered_at,
                courier_name: "Petr".to_string(),
            }),
            ..update
        };
        repo.update_status(receipt.order_id, &update, 1).unwrap();

        let mut conn = pool.get().unwrap();
        let couriers: Vec<String> = delivered_orders::table
            .filter(delivered_orders::order_id.eq(receipt.order_id))
            .select(delivered_orders::courier_name)
            .load(&mut conn)
            .unwrap();
        assert_eq!(couriers, vec!["Petr".to_string()]);
    }

    #[tokio::test]
    async fn status_update_without_delivery_keeps_existing_record() {
        let (_container, pool) = setup_db().await;
        let fx = seed_fixture(&pool);
        let product_id = {
            let mut conn = pool.get().unwrap();
            seed_product(&mut conn, fx.brand_id, "Boots", "50.00", 5)
        };
        let repo = DieselOrderRepository::new(pool.clone());
        let receipt = repo
            .create_order(
                fx.user_id,
                fx.order_status_id,
                fx.payment_status_id,
                &[cart(product_id, 1)],
            )
            .unwrap();

        let delivered_at = Utc.with_ymd_and_hms(2026, 8, 20, 10, 0, 0).unwrap();
        repo.update_status(
            receipt.order_id,
            &StatusUpdate {
                order_status_id: fx.order_status_id,
                payment_status_id: fx.payment_status_id,
                delivery: Some(DeliveryInfo {
                    delivery_date: delivered_at,
                    courier_name: "Ivan".to_string(),
                }),
            },
            1,
        )
        .unwrap();

        repo.update_status(
            receipt.order_id,
            &StatusUpdate {
                order_status_id: fx.order_status_id,
                payment_status_id: fx.payment_status_id,
                delivery: None,
            },
            1,
        )
        .unwrap();

        let details = repo.find_by_id(receipt.order_id).unwrap().unwrap();
        let delivery = details.summary.delivery.expect("delivery should remain");
        assert_eq!(delivery.courier_name, "Ivan");
    }

    #[tokio::test]
    async fn status_update_rejects_missing_or_soft_deleted_order() {
        let (_container, pool) = setup_db().await;
        let fx = seed_fixture(&pool);
        let product_id = {
            let mut conn = pool.get().unwrap();
            seed_product(&mut conn, fx.brand_id, "Boots", "50.00", 5)
        };
        let repo = DieselOrderRepository::new(pool.clone());
        let update = StatusUpdate {
            order_status_id: fx.order_status_id,
            payment_status_id: fx.payment_status_id,
            delivery: None,
        };

        assert_eq!(
            repo.update_status(9999, &update, 1).unwrap_err(),
            DomainError::OrderNotFound(9999)
        );

        let receipt = repo
            .create_order(
                fx.user_id,
                fx.order_status_id,
                fx.payment_status_id,
                &[cart(product_id, 1)],
            )
            .unwrap();
        {
            let mut conn = pool.get().unwrap();
            diesel::update(orders::table.filter(orders::id.eq(receipt.order_id)))
                .set(orders::is_deleted.eq(true))
                .execute(&mut conn)
                .unwrap();
        }
        assert_eq!(
            repo.update_status(receipt.order_id, &update, 1).unwrap_err(),
            DomainError::OrderNotFound(receipt.order_id)
        );
    }

    #[tokio::test]
    async fn soft_deleted_orders_are_invisible_to_reads() {
        let (_container, pool) = setup_db().await;
        let fx = seed_fixture(&pool);
        let product_id = {
            let mut conn = pool.get().unwrap();
            seed_product(&mut conn, fx.brand_id, "Boots", "50.00", 10)
        };
        let repo = DieselOrderRepository::new(pool.clone());
        let kept = repo
            .create_order(
                fx.user_id,
                fx.order_status_id,
                fx.payment_status_id,
                &[cart(product_id, 1)],
            )
            .unwrap();
        let hidden = repo
            .create_order(
                fx.user_id,
                fx.order_status_id,
                fx.payment_status_id,
                &[cart(product_id, 1)],
            )
            .unwrap();
        {
            let mut conn = pool.get().unwrap();
            diesel::update(orders::table.filter(orders::id.eq(hidden.order_id)))
                .set(orders::is_deleted.eq(true))
                .execute(&mut conn)
                .unwrap();
        }

        let listed = repo.list().unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, kept.order_id);
        assert!(repo.find_by_id(hidden.order_id).unwrap().is_none());
    }

    #[tokio::test]
    async fn stock_levels_exclude_soft_deleted_products() {
        let (_container, pool) = setup_db().await;
        let fx = seed_fixture(&pool);
        let (live, dead) = {
            let mut conn = pool.get().unwrap();
            let live = seed_product(&mut conn, fx.brand_id, "Boots", "50.00", 7);
            let dead = seed_product(&mut conn, fx.brand_id, "Laces", "5.00", 3);
            diesel::update(products::table.filter(products::id.eq(dead)))
                .set(products::is_deleted.eq(true))
                .execute(&mut conn)
                .unwrap();
            (live, dead)
        };
        let repo = DieselOrderRepository::new(pool);

        let stock = repo.stock_levels(&[live, dead]).unwrap();
        assert_eq!(stock.get(&live), Some(&7));
        assert!(!stock.contains_key(&dead));
    }

    #[tokio::test]
    async fn lowest_status_ids_pick_the_smallest_of_each_kind() {
        let (_container, pool) = setup_db().await;
        let repo = DieselOrderRepository::new(pool.clone());

        assert_eq!(repo.lowest_status_ids().unwrap(), (None, None));

        let (first_os, first_ps) = {
            let mut conn = pool.get().unwrap();
            let pair = seed_statuses(&mut conn);
            diesel::insert_into(crate::schema::order_statuses::table)
                .values(crate::schema::order_statuses::name.eq("Shipped"))
                .execute(&mut conn)
                .unwrap();
            pair
        };

        assert_eq!(
            repo.lowest_status_ids().unwrap(),
            (Some(first_os), Some(first_ps))
        );
    }

    #[tokio::test]
    async fn user_exists_ignores_soft_deleted_users() {
        let (_container, pool) = setup_db().await;
        let (alive, deleted) = {
            let mut conn = pool.get().unwrap();
            let alive = seed_user(&mut conn, "alice");
            let deleted = seed_user(&mut conn, "bob");
            diesel::update(crate::schema::users::table.filter(crate::schema::users::id.eq(deleted)))
                .set(crate::schema::users::is_deleted.eq(true))
                .execute(&mut conn)
                .unwrap();
            (alive, deleted)
        };
        let repo = DieselOrderRepository::new(pool);

        assert!(repo.user_exists(alive).unwrap());
        assert!(!repo.user_exists(deleted).unwrap());
        assert!(!repo.user_exists(424242).unwrap());
    }
}
