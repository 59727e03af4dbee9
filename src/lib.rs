pub mod application;
pub mod db;
pub mod domain;
pub mod errors;
pub mod handlers;
pub mod infrastructure;
pub mod schema;

use actix_web::{middleware::Logger, web, App, HttpServer};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use application::analytics_service::AnalyticsService;
use application::order_service::OrderService;
use infrastructure::analytics_repo::DieselAnalyticsRepository;
use infrastructure::order_repo::DieselOrderRepository;

pub use db::{create_pool, DbPool};

/// Concrete service types wired into the HTTP handlers.
pub type OrderApi = OrderService<DieselOrderRepository>;
pub type AnalyticsApi = AnalyticsService<DieselAnalyticsRepository>;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Run any pending Diesel migrations against the pool's database.
pub fn run_migrations(pool: &DbPool) {
    let mut conn = pool.get().expect("Failed to get DB connection for migrations");
    conn.run_pending_migrations(MIGRATIONS)
        .expect("Failed to run database migrations");
}

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::orders::checkout,
        handlers::orders::update_order,
        handlers::orders::list_orders,
        handlers::orders::get_order,
        handlers::analytics::dashboard,
        handlers::analytics::brand_sales,
        handlers::analytics::brand_revenue,
    ),
    components(schemas(
        handlers::orders::CheckoutItemRequest,
        handlers::orders::CheckoutRequest,
        handlers::orders::CheckoutResponse,
        handlers::orders::OrderUpdateRequest,
        handlers::orders::DeliveryResponse,
        handlers::orders::OrderSummaryResponse,
        handlers::orders::OrderItemResponse,
        handlers::orders::OrderDetailsResponse,
        handlers::analytics::DashboardResponse,
        handlers::analytics::RecentOrderResponse,
        handlers::analytics::LowStockProductResponse,
        handlers::analytics::BrandSalesResponse,
        handlers::analytics::BrandRevenueResponse,
    )),
    tags(
        (name = "orders", description = "Checkout and order management"),
        (name = "analytics", description = "Read-only revenue aggregation"),
    )
)]
struct ApiDoc;

/// Build and return an actix-web `Server` bound to `host:port`.
///
/// The caller is responsible for `.await`-ing (or `tokio::spawn`-ing) the
/// returned server.
pub fn build_server(
    pool: DbPool,
    host: &str,
    port: u16,
) -> std::io::Result<actix_web::dev::Server> {
    let order_service = web::Data::new(OrderService::new(DieselOrderRepository::new(pool.clone())));
    let analytics_service =
        web::Data::new(AnalyticsService::new(DieselAnalyticsRepository::new(pool)));

    Ok(HttpServer::new(move || {
        App::new()
            .app_data(order_service.clone())
            .app_data(analytics_service.clone())
            .wrap(Logger::default())
            .route("/checkout", web::post().to(handlers::orders::checkout))
            .service(
                web::scope("/orders")
                    .route("", web::get().to(handlers::orders::list_orders))
                    .route("/{id}", web::get().to(handlers::orders::get_order))
                    .route("/{id}", web::put().to(handlers::orders::update_order)),
            )
            .service(
                web::scope("/analytics")
                    .route("/dashboard", web::get().to(handlers::analytics::dashboard))
                    .route("/brands", web::get().to(handlers::analytics::brand_sales))
                    .route(
                        "/brands/{id}/revenue",
                        web::get().to(handlers::analytics::brand_revenue),
                    ),
            )
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-docs/openapi.json", ApiDoc::openapi()),
            )
    })
    .bind((host.to_string(), port))?
    .run())
}
