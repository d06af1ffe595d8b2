use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    AccessMode, ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection,
    DatabaseTransaction, DbErr, EntityTrait, IsolationLevel, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, TransactionTrait,
    ActiveValue::{NotSet, Set, Unchanged},
    sea_query::Expr,
};

use super::{OrderStore, StoreError, StoreResult};
use crate::{
    entity::{
        order_items::{ActiveModel as OrderItemActive, Column as OrderItemCol, Entity as OrderItems, Model as OrderItemModel},
        orders::{ActiveModel as OrderActive, Column as OrderCol, Entity as Orders, Model as OrderModel},
    },
    models::{NewOrder, Order, OrderItem, OrderStatus},
    routes::params::page_offset,
};

/// Postgres-backed [`OrderStore`]. The connection is handed in by the caller,
/// so several stores (or tests) can share or isolate pools as they need.
#[derive(Clone)]
pub struct SeaOrderStore {
    orm: DatabaseConnection,
}

impl SeaOrderStore {
    pub fn new(orm: DatabaseConnection) -> Self {
        Self { orm }
    }

    /// Reads of an order and its items see one snapshot.
    async fn read_txn(&self) -> StoreResult<DatabaseTransaction> {
        self.orm
            .begin_with_config(
                Some(IsolationLevel::RepeatableRead),
                Some(AccessMode::ReadOnly),
            )
            .await
            .map_err(db("begin read transaction"))
    }
}

#[async_trait]
impl OrderStore for SeaOrderStore {
    async fn create(&self, new_order: NewOrder) -> StoreResult<Order> {
        let txn = self.orm.begin().await.map_err(db("begin create order"))?;
        let now = Utc::now().naive_utc();

        let order = OrderActive {
            id: NotSet,
            user_id: Set(new_order.user_id),
            user_name: Set(new_order.user_name),
            user_email: Set(new_order.user_email),
            total_amount: Set(new_order.total_amount),
            status: Set(new_order.status.as_str().to_string()),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&txn)
        .await
        .map_err(db("insert order"))?;

        let mut items = Vec::with_capacity(new_order.items.len());
        for item in new_order.items {
            let row = OrderItemActive {
                id: NotSet,
                order_id: Set(order.id),
                product_name: Set(item.product_name),
                quantity: Set(item.quantity),
                price: Set(item.price),
                created_at: Set(now),
            }
            .insert(&txn)
            .await
            .map_err(db("insert order item"))?;
            items.push(order_item_from_entity(row));
        }

        txn.commit().await.map_err(db("commit create order"))?;

        tracing::debug!(order_id = order.id, items = items.len(), "order persisted");
        order_from_entity(order, items)
    }

    async fn get_by_id(&self, id: i32) -> StoreResult<Order> {
        let txn = self.read_txn().await?;

        let order = Orders::find_by_id(id)
            .one(&txn)
            .await
            .map_err(db("select order"))?
            .ok_or(StoreError::NotFound)?;
        let mut items = load_items(&txn, &[order.id]).await?;

        txn.commit().await.map_err(db("commit read"))?;

        let items = items.remove(&order.id).unwrap_or_default();
        order_from_entity(order, items)
    }

    async fn update(&self, order: &Order) -> StoreResult<Order> {
        let txn = self.orm.begin().await.map_err(db("begin update order"))?;

        let active = OrderActive {
            id: Unchanged(order.id),
            user_id: NotSet,
            user_name: Set(order.user_name.clone()),
            user_email: Set(order.user_email.clone()),
            total_amount: Set(order.total_amount),
            status: Set(order.status.as_str().to_string()),
            created_at: NotSet,
            updated_at: Set(Utc::now().naive_utc()),
        };
        let updated = match active.update(&txn).await {
            Ok(model) => model,
            Err(DbErr::RecordNotUpdated) => return Err(StoreError::NotFound),
            Err(source) => return Err(StoreError::Db { op: "update order", source }),
        };
        let mut items = load_items(&txn, &[updated.id]).await?;

        txn.commit().await.map_err(db("commit update order"))?;

        let items = items.remove(&updated.id).unwrap_or_default();
        order_from_entity(updated, items)
    }

    async fn update_status(&self, id: i32, status: OrderStatus) -> StoreResult<()> {
        let result = Orders::update_many()
            .col_expr(OrderCol::Status, Expr::value(status.as_str()))
            .col_expr(OrderCol::UpdatedAt, Expr::value(Utc::now().naive_utc()))
            .filter(OrderCol::Id.eq(id))
            .exec(&self.orm)
            .await
            .map_err(db("update order status"))?;

        if result.rows_affected == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn compare_and_set_status(
        &self,
        id: i32,
        expected: OrderStatus,
        next: OrderStatus,
    ) -> StoreResult<bool> {
        let result = Orders::update_many()
            .col_expr(OrderCol::Status, Expr::value(next.as_str()))
            .col_expr(OrderCol::UpdatedAt, Expr::value(Utc::now().naive_utc()))
            .filter(OrderCol::Id.eq(id))
            .filter(OrderCol::Status.eq(expected.as_str()))
            .exec(&self.orm)
            .await
            .map_err(db("compare-and-set order status"))?;

        Ok(result.rows_affected == 1)
    }

    async fn list(&self, page: u64, limit: u64) -> StoreResult<(Vec<Order>, u64)> {
        let txn = self.read_txn().await?;

        // No filter exists, so the total is the size of the whole table.
        let total = Orders::find()
            .count(&txn)
            .await
            .map_err(db("count orders"))?;

        let Some(offset) = page_offset(page, limit) else {
            txn.commit().await.map_err(db("commit read"))?;
            return Ok((Vec::new(), total));
        };

        let rows = Orders::find()
            .order_by_desc(OrderCol::CreatedAt)
            .order_by_desc(OrderCol::Id)
            .limit(limit)
            .offset(offset)
            .all(&txn)
            .await
            .map_err(db("list orders"))?;
        let orders = attach_items(&txn, rows).await?;

        txn.commit().await.map_err(db("commit read"))?;
        Ok((orders, total))
    }

    async fn get_by_user_id(&self, user_id: i32) -> StoreResult<Vec<Order>> {
        let txn = self.read_txn().await?;

        let rows = Orders::find()
            .filter(OrderCol::UserId.eq(user_id))
            .order_by_desc(OrderCol::CreatedAt)
            .order_by_desc(OrderCol::Id)
            .all(&txn)
            .await
            .map_err(db("list orders by user"))?;
        let orders = attach_items(&txn, rows).await?;

        txn.commit().await.map_err(db("commit read"))?;
        Ok(orders)
    }
}

fn db(op: &'static str) -> impl FnOnce(DbErr) -> StoreError {
    move |source| StoreError::Db { op, source }
}

async fn load_items<C: ConnectionTrait>(
    conn: &C,
    order_ids: &[i32],
) -> StoreResult<HashMap<i32, Vec<OrderItem>>> {
    let mut grouped: HashMap<i32, Vec<OrderItem>> = HashMap::new();
    if order_ids.is_empty() {
        return Ok(grouped);
    }

    let rows = OrderItems::find()
        .filter(OrderItemCol::OrderId.is_in(order_ids.iter().copied()))
        .order_by_asc(OrderItemCol::Id)
        .all(conn)
        .await
        .map_err(db("select order items"))?;

    for row in rows {
        grouped
            .entry(row.order_id)
            .or_default()
            .push(order_item_from_entity(row));
    }
    Ok(grouped)
}

async fn attach_items<C: ConnectionTrait>(
    conn: &C,
    rows: Vec<OrderModel>,
) -> StoreResult<Vec<Order>> {
    let ids: Vec<i32> = rows.iter().map(|row| row.id).collect();
    let mut items = load_items(conn, &ids).await?;

    rows.into_iter()
        .map(|row| {
            let order_items = items.remove(&row.id).unwrap_or_default();
            order_from_entity(row, order_items)
        })
        .collect()
}

fn order_from_entity(model: OrderModel, items: Vec<OrderItem>) -> StoreResult<Order> {
    let status = model
        .status
        .parse::<OrderStatus>()
        .map_err(|err| StoreError::InvalidStatus(err.0))?;

    Ok(Order {
        id: model.id,
        user_id: model.user_id,
        user_name: model.user_name,
        user_email: model.user_email,
        items,
        total_amount: model.total_amount,
        status,
        created_at: model.created_at,
        updated_at: model.updated_at,
    })
}

fn order_item_from_entity(model: OrderItemModel) -> OrderItem {
    OrderItem {
        id: model.id,
        order_id: model.order_id,
        product_name: model.product_name,
        quantity: model.quantity,
        price: model.price,
        created_at: model.created_at,
    }
}
