use std::sync::Arc;

use rust_decimal::Decimal;

use crate::{
    clients::UserDirectory,
    error::{AppError, AppResult},
    models::{NewOrder, NewOrderItem, Order, OrderStatus, UserSnapshot},
    repository::OrderStore,
    routes::params::normalize_page,
};

/// How status writes are checked against the order lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransitionPolicy {
    /// Any status may be written over any other; concurrent writers race and
    /// the last one wins.
    #[default]
    Permissive,
    /// Only transitions allowed by [`OrderStatus::can_transition_to`] are
    /// written, as a compare-and-set on the status that was read.
    Enforced,
}

/// One page of orders together with the normalized paging inputs.
#[derive(Debug)]
pub struct OrderPage {
    pub orders: Vec<Order>,
    pub page: u64,
    pub limit: u64,
    pub total: u64,
}

/// Orchestrates user validation, total computation, persistence and status
/// changes. Holds no mutable state of its own; clones share the store and the
/// directory client.
#[derive(Clone)]
pub struct OrderWorkflow {
    store: Arc<dyn OrderStore>,
    directory: Arc<dyn UserDirectory>,
    policy: TransitionPolicy,
}

impl OrderWorkflow {
    pub fn new(store: Arc<dyn OrderStore>, directory: Arc<dyn UserDirectory>) -> Self {
        Self {
            store,
            directory,
            policy: TransitionPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: TransitionPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> TransitionPolicy {
        self.policy
    }

    pub async fn create_order(&self, user_id: i32, items: Vec<NewOrderItem>) -> AppResult<Order> {
        tracing::info!(user_id, items = items.len(), "creating order");
        validate_items(&items)?;
        let total_amount = order_total(&items)?;

        let user = self.require_user(user_id).await?;

        let order = self
            .store
            .create(NewOrder {
                user_id,
                user_name: user.name,
                user_email: user.email,
                items,
                total_amount,
                status: OrderStatus::Pending,
            })
            .await?;

        tracing::info!(order_id = order.id, user_id, %total_amount, "order created");
        Ok(order)
    }

    pub async fn get_order(&self, id: i32) -> AppResult<Order> {
        tracing::debug!(order_id = id, "getting order");
        Ok(self.store.get_by_id(id).await?)
    }

    pub async fn update_status(&self, id: i32, status: OrderStatus) -> AppResult<Order> {
        tracing::info!(order_id = id, %status, "updating order status");
        let mut order = self.store.get_by_id(id).await?;

        match self.policy {
            TransitionPolicy::Permissive => {
                order.status = status;
                Ok(self.store.update(&order).await?)
            }
            TransitionPolicy::Enforced => self.transition(&order, status).await,
        }
    }

    pub async fn list_orders(&self, page: i64, limit: i64) -> AppResult<OrderPage> {
        let (page, limit) = normalize_page(page, limit);
        tracing::debug!(page, limit, "listing orders");

        let (orders, total) = self.store.list(page, limit).await?;
        Ok(OrderPage {
            orders,
            page,
            limit,
            total,
        })
    }

    pub async fn get_orders_by_user(&self, user_id: i32) -> AppResult<Vec<Order>> {
        tracing::debug!(user_id, "getting orders for user");
        self.require_user(user_id).await?;
        Ok(self.store.get_by_user_id(user_id).await?)
    }

    /// Cancelling an already cancelled order succeeds and re-stamps
    /// `updated_at`.
    pub async fn cancel_order(&self, id: i32) -> AppResult<Order> {
        tracing::info!(order_id = id, "cancelling order");
        let order = self.store.get_by_id(id).await?;

        match self.policy {
            TransitionPolicy::Permissive => {
                self.store.cancel(id).await?;
                Ok(self.store.get_by_id(id).await?)
            }
            TransitionPolicy::Enforced => self.transition(&order, OrderStatus::Cancelled).await,
        }
    }

    async fn require_user(&self, user_id: i32) -> AppResult<UserSnapshot> {
        match self.directory.validate_user(user_id).await? {
            Some(user) => Ok(user),
            None => Err(AppError::NotFound("User")),
        }
    }

    async fn transition(&self, current: &Order, next: OrderStatus) -> AppResult<Order> {
        if !current.status.can_transition_to(next) {
            return Err(AppError::Validation(format!(
                "order {} cannot move from {} to {}",
                current.id, current.status, next
            )));
        }

        let written = self
            .store
            .compare_and_set_status(current.id, current.status, next)
            .await?;
        if !written {
            let latest = self.store.get_by_id(current.id).await?;
            return Err(AppError::Conflict(format!(
                "order {} changed to {} while moving to {}",
                current.id, latest.status, next
            )));
        }

        Ok(self.store.get_by_id(current.id).await?)
    }
}

/// Scale of the `price` and `total_amount` columns.
pub const MONEY_SCALE: u32 = 2;

/// Largest amount a `DECIMAL(10, 2)` column holds: 99999999.99, with the
/// 9_999_999_999 mantissa split into 32-bit words.
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(1_410_065_407, 2, 0, false, MONEY_SCALE);

/// Reject item lists the store could not persist exactly.
pub fn validate_items(items: &[NewOrderItem]) -> AppResult<()> {
    if items.is_empty() {
        return Err(AppError::Validation("an order needs at least one item".into()));
    }
    for (index, item) in items.iter().enumerate() {
        if item.product_name.trim().is_empty() {
            return Err(AppError::Validation(format!(
                "item {index}: product_name is required"
            )));
        }
        if item.quantity < 1 {
            return Err(AppError::Validation(format!(
                "item {index}: quantity must be positive"
            )));
        }
        if item.price < Decimal::ZERO {
            return Err(AppError::Validation(format!(
                "item {index}: price must not be negative"
            )));
        }
        if item.price > MAX_AMOUNT {
            return Err(AppError::Validation(format!(
                "item {index}: price exceeds {MAX_AMOUNT}"
            )));
        }
        // "9.990" is fine, "0.335" would be rounded by the column.
        if item.price.normalize().scale() > MONEY_SCALE {
            return Err(AppError::Validation(format!(
                "item {index}: price has more than {MONEY_SCALE} decimal places"
            )));
        }
    }
    Ok(())
}

/// Sum of quantity × price over the items as supplied, bounded by what the
/// `total_amount` column holds.
pub fn order_total(items: &[NewOrderItem]) -> AppResult<Decimal> {
    let too_large = || AppError::Validation(format!("order total exceeds {MAX_AMOUNT}"));

    let mut total = Decimal::ZERO;
    for item in items {
        let line = item.line_total().ok_or_else(too_large)?;
        total = total.checked_add(line).ok_or_else(too_large)?;
    }
    if total > MAX_AMOUNT {
        return Err(too_large());
    }
    Ok(total)
}
