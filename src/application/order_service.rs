use crate::domain::checkout::{check_stock, collapse_lines, CheckoutCommand};
use crate::domain::errors::DomainError;
use crate::domain::order::{CheckoutReceipt, OrderDetails, OrderSummary, StatusUpdate};
use crate::domain::ports::OrderRepository;

pub struct OrderService<R> {
    repo: R,
}

impl<R: OrderRepository> OrderService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Run a submitted cart through the checkout pipeline: collapse duplicate
    /// lines, pre-check stock for user feedback, resolve default statuses,
    /// then hand off to the atomic commit. The commit re-enforces stock under
    /// row locks, so the pre-check here is advisory only.
    pub fn checkout(&self, cmd: CheckoutCommand) -> Result<CheckoutReceipt, DomainError> {
        let lines = collapse_lines(&cmd.items)?;

        if !self.repo.user_exists(cmd.user_id)? {
            return Err(DomainError::UserNotFound(cmd.user_id));
        }

        let product_ids: Vec<i64> = lines.iter().map(|l| l.product_id).collect();
        let stock = self.repo.stock_levels(&product_ids)?;
        check_stock(&lines, &stock)?;

        let (order_status_id, payment_status_id) =
            match (cmd.order_status_id, cmd.payment_status_id) {
                (Some(os), Some(ps)) => (os, ps),
                (os, ps) => {
                    // Default is the lowest-id status of each kind. Fragile
                    // (depends on seed order, not a marked default flag) but
                    // kept for compatibility with existing deployments.
                    let (lowest_os, lowest_ps) = self.repo.lowest_status_ids()?;
                    (
                        os.or(lowest_os)
                            .ok_or(DomainError::MissingStatusConfiguration)?,
                        ps.or(lowest_ps)
                            .ok_or(DomainError::MissingStatusConfiguration)?,
                    )
                }
            };

        self.repo
            .create_order(cmd.user_id, order_status_id, payment_status_id, &lines)
    }

    /// Apply a status change, optionally with delivery info, as one atomic
    /// update. Pairing of delivery date and courier is validated by the
    /// caller-side [`DeliveryInfo::from_parts`](crate::domain::order::DeliveryInfo::from_parts)
    /// before the `StatusUpdate` reaches this point.
    pub fn update_order(
        &self,
        order_id: i64,
        update: StatusUpdate,
        acting_user_id: i64,
    ) -> Result<(), DomainError> {
        self.repo.update_status(order_id, &update, acting_user_id)
    }

    pub fn get_order(&self, order_id: i64) -> Result<OrderDetails, DomainError> {
        self.repo
            .find_by_id(order_id)?
            .ok_or(DomainError::OrderNotFound(order_id))
    }

    pub fn list_orders(&self) -> Result<Vec<OrderSummary>, DomainError> {
        self.repo.list()
    }
}
