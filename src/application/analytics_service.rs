use chrono::{DateTime, Utc};

use crate::domain::analytics::{resolve_window, BrandRevenue, BrandSales, Dashboard};
use crate::domain::errors::DomainError;
use crate::domain::ports::AnalyticsRepository;

pub struct AnalyticsService<R> {
    repo: R,
}

impl<R: AnalyticsRepository> AnalyticsService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn dashboard(&self) -> Result<Dashboard, DomainError> {
        self.repo.dashboard()
    }

    pub fn brand_sales(&self) -> Result<Vec<BrandSales>, DomainError> {
        self.repo.brand_sales()
    }

    /// Revenue of one brand over `[from, to]`; the window defaults to the
    /// last 30 days ending now when omitted.
    pub fn brand_revenue(
        &self,
        brand_id: i64,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> Result<BrandRevenue, DomainError> {
        let brand_name = self
            .repo
            .brand_name(brand_id)?
            .ok_or(DomainError::BrandNotFound(brand_id))?;

        let (from, to) = resolve_window(from, to, Utc::now())?;
        let revenue = self.repo.brand_revenue(brand_id, from, to)?;

        Ok(BrandRevenue {
            brand_id,
            brand_name,
            revenue,
            date_from: from,
            date_to: to,
        })
    }
}
