use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::format_timestamp;
use crate::models::{NewOrderItem, Order, OrderItem, OrderStatus};

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateOrderRequest {
    pub user_id: i32,
    pub items: Vec<NewOrderItem>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateOrderStatusRequest {
    pub status: OrderStatus,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct OrderItemView {
    pub id: i32,
    pub order_id: i32,
    pub product_name: String,
    pub quantity: i32,
    #[schema(value_type = String, example = "9.99")]
    pub price: Decimal,
    pub created_at: String,
}

/// Full wire representation of an order, timestamps as `YYYY-MM-DD HH:MM:SS`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct OrderView {
    pub id: i32,
    pub user_id: i32,
    pub user_name: String,
    pub user_email: String,
    pub items: Vec<OrderItemView>,
    #[schema(value_type = String, example = "24.98")]
    pub total_amount: Decimal,
    pub status: OrderStatus,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct OrderList {
    pub items: Vec<OrderView>,
}

impl From<OrderItem> for OrderItemView {
    fn from(item: OrderItem) -> Self {
        Self {
            id: item.id,
            order_id: item.order_id,
            product_name: item.product_name,
            quantity: item.quantity,
            price: item.price,
            created_at: format_timestamp(item.created_at),
        }
    }
}

impl From<Order> for OrderView {
    fn from(order: Order) -> Self {
        Self {
            id: order.id,
            user_id: order.user_id,
            user_name: order.user_name,
            user_email: order.user_email,
            items: order.items.into_iter().map(OrderItemView::from).collect(),
            total_amount: order.total_amount,
            status: order.status,
            created_at: format_timestamp(order.created_at),
            updated_at: format_timestamp(order.updated_at),
        }
    }
}

impl From<Vec<Order>> for OrderList {
    fn from(orders: Vec<Order>) -> Self {
        Self {
            items: orders.into_iter().map(OrderView::from).collect(),
        }
    }
}
