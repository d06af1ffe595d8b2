//! Persistence of orders and their line items.
//!
//! The workflow only talks to [`OrderStore`]; `SeaOrderStore` is the Postgres
//! implementation wired in by the binary.

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{NewOrder, Order, OrderStatus};

pub mod orders;

pub use orders::SeaOrderStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("row not found")]
    NotFound,

    #[error("{op} failed")]
    Db {
        op: &'static str,
        #[source]
        source: sea_orm::DbErr,
    },

    #[error("order row holds unknown status `{0}`")]
    InvalidStatus(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Relational store for orders. Every read returns orders with their items
/// already attached.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Insert the order and all of its items in one transaction. Nothing is
    /// visible if any insert fails.
    async fn create(&self, order: NewOrder) -> StoreResult<Order>;

    async fn get_by_id(&self, id: i32) -> StoreResult<Order>;

    /// Overwrite the mutable columns (user snapshot, total, status) and
    /// refresh `updated_at`.
    async fn update(&self, order: &Order) -> StoreResult<Order>;

    /// Single-column status write. `NotFound` when no row matched.
    async fn update_status(&self, id: i32, status: OrderStatus) -> StoreResult<()>;

    /// Write `next` only if the row still holds `expected`. Returns whether a
    /// row was changed.
    async fn compare_and_set_status(
        &self,
        id: i32,
        expected: OrderStatus,
        next: OrderStatus,
    ) -> StoreResult<bool>;

    /// One page ordered by creation time, newest first, plus the row count of
    /// the whole table.
    async fn list(&self, page: u64, limit: u64) -> StoreResult<(Vec<Order>, u64)>;

    async fn get_by_user_id(&self, user_id: i32) -> StoreResult<Vec<Order>>;

    async fn cancel(&self, id: i32) -> StoreResult<()> {
        self.update_status(id, OrderStatus::Cancelled).await
    }
}
