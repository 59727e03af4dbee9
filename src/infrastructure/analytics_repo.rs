use bigdecimal::{BigDecimal, RoundingMode};
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::sql_types::{BigInt, Timestamptz};

use crate::db::DbPool;
use crate::domain::analytics::{BrandSales, Dashboard, LowStockProduct, RecentOrder};
use crate::domain::errors::DomainError;
use crate::domain::ports::AnalyticsRepository;
use crate::schema::{brands, order_statuses, orders, payment_statuses, products, users};

use super::models::{BrandSalesRow, RevenueRow};

const RECENT_ORDERS_LIMIT: i64 = 5;
const LOW_STOCK_THRESHOLD: i32 = 10;
const LOW_STOCK_LIMIT: i64 = 8;

/// Per-brand rollup over non-deleted brands, products and orders. Units and
/// revenue only count lines whose owning order survives the soft-delete
/// filter.
const BRAND_SALES_SQL: &str = "\
    SELECT b.id AS brand_id, \
           b.name AS brand_name, \
           COUNT(DISTINCT o.id) AS total_orders, \
           COUNT(DISTINCT d.order_id) AS delivered_orders, \
           COALESCE(SUM(ol.quantity) FILTER (WHERE o.id IS NOT NULL), 0)::BIGINT AS total_units, \
           COALESCE(SUM(ol.price_at_moment * ol.quantity) FILTER (WHERE o.id IS NOT NULL), 0) AS total_revenue \
    FROM brands b \
    LEFT JOIN products p ON p.brand_id = b.id AND NOT p.is_deleted \
    LEFT JOIN order_lines ol ON ol.product_id = p.id \
    LEFT JOIN orders o ON o.id = ol.order_id AND NOT o.is_deleted \
    LEFT JOIN delivered_orders d ON d.order_id = o.id \
    WHERE NOT b.is_deleted \
    GROUP BY b.id, b.name \
    ORDER BY total_revenue DESC, b.id";

const BRAND_REVENUE_SQL: &str = "\
    SELECT COALESCE(SUM(ol.price_at_moment * ol.quantity), 0) AS revenue \
    FROM order_lines ol \
    JOIN orders o ON o.id = ol.order_id AND NOT o.is_deleted \
    JOIN products p ON p.id = ol.product_id AND NOT p.is_deleted \
    WHERE p.brand_id = $1 AND o.order_date BETWEEN $2 AND $3";

#[derive(Clone)]
pub struct DieselAnalyticsRepository {
    pool: DbPool,
}

impl DieselAnalyticsRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl AnalyticsRepository for DieselAnalyticsRepository {
    fn dashboard(&self) -> Result<Dashboard, DomainError> {
        let mut conn = self.pool.get()?;

        let total_products: i64 = products::table
            .filter(products::is_deleted.eq(false))
            .count()
            .get_result(&mut conn)?;
        let total_orders: i64 = orders::table
            .filter(orders::is_deleted.eq(false))
            .count()
            .get_result(&mut conn)?;
        let total_users: i64 = users::table
            .filter(users::is_deleted.eq(false))
            .count()
            .get_result(&mut conn)?;
        let total_revenue = orders::table
            .filter(orders::is_deleted.eq(false))
            .select(diesel::dsl::sum(orders::total_amount))
            .first::<Option<BigDecimal>>(&mut conn)?
            .unwrap_or_else(|| BigDecimal::from(0));

        let recent_orders = orders::table
            .inner_join(users::table)
            .inner_join(order_statuses::table)
            .inner_join(payment_statuses::table)
            .filter(orders::is_deleted.eq(false))
            .order(orders::order_date.desc())
            .limit(RECENT_ORDERS_LIMIT)
            .select((
                orders::id,
                users::login,
                order_statuses::name,
                payment_statuses::name,
                orders::order_date,
            ))
            .load::<(i64, String, String, String, DateTime<Utc>)>(&mut conn)?
            .into_iter()
            .map(
                |(id, customer, order_status, payment_status, order_date)| RecentOrder {
                    id,
                    customer,
                    order_status,
                    payment_status,
                    order_date,
                },
            )
            .collect();

        let low_stock_products = products::table
            .inner_join(brands::table)
            .filter(
                products::is_deleted
                    .eq(false)
                    .and(brands::is_deleted.eq(false))
                    .and(products::stock_quantity.lt(LOW_STOCK_THRESHOLD)),
            )
            .order(products::stock_quantity.asc())
            .limit(LOW_STOCK_LIMIT)
            .select((
                products::id,
                products::name,
                brands::name,
                products::stock_quantity,
            ))
            .load::<(i64, String, String, i32)>(&mut conn)?
            .into_iter()
            .map(|(id, name, brand, stock_quantity)| LowStockProduct {
                id,
                name,
                brand,
                stock_quantity,
            })
            .collect();

        Ok(Dashboard {
            total_products,
            total_orders,
            total_users,
            total_revenue,
            recent_orders,
            low_stock_products,
        })
    }

    fn brand_sales(&self) -> Result<Vec<BrandSales>, DomainError> {
        let mut conn = self.pool.get()?;
        let rows: Vec<BrandSalesRow> = diesel::sql_query(BRAND_SALES_SQL).load(&mut conn)?;

        Ok(rows
            .into_iter()
            .map(|row| {
                let average_order_value = if row.total_orders > 0 {
                    (&row.total_revenue / BigDecimal::from(row.total_orders))
                        .with_scale_round(2, RoundingMode::HalfUp)
                } else {
                    BigDecimal::from(0)
                };
                BrandSales {
                    brand_id: row.brand_id,
                    brand_name: row.brand_name,
                    total_orders: row.total_orders,
                    delivered_orders: row.delivered_orders,
                    total_units: row.total_units,
                    total_revenue: row.total_revenue,
                    average_order_value,
                }
            })
            .collect())
    }

    fn brand_name(&self, brand_id: i64) -> Result<Option<String>, DomainError> {
        let mut conn = self.pool.get()?;
        let name = brands::table
            .filter(brands::id.eq(brand_id).and(brands::is_deleted.eq(false)))
            .select(brands::name)
            .first(&mut conn)
            .optional()?;
        Ok(name)
    }

    fn brand_revenue(
        &self,
        brand_id: i64,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<BigDecimal, DomainError> {
        let mut conn = self.pool.get()?;
        let row: RevenueRow = diesel::sql_query(BRAND_REVENUE_SQL)
            .bind::<BigInt, _>(brand_id)
            .bind::<Timestamptz, _>(from)
            .bind::<Timestamptz, _>(to)
            .get_result(&mut conn)?;
        Ok(row.revenue)
    }
}
