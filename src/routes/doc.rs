use utoipa::{OpenApi, openapi::OpenApi as OpenApiSpec};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{
        orders::{CreateOrderRequest, OrderItemView, OrderList, OrderView, UpdateOrderStatusRequest},
        users::{CreateUserRequest, UpdateUserRequest, UserList, UserView, ValidateUserResponse},
    },
    models::{NewOrderItem, OrderStatus, UserSnapshot},
    response::{ApiResponse, Meta},
    routes::{health, orders, params, users},
};

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        orders::create_order,
        orders::get_order,
        orders::update_order_status,
        orders::list_orders,
        orders::get_user_orders,
        orders::cancel_order
    ),
    components(
        schemas(
            OrderStatus,
            NewOrderItem,
            CreateOrderRequest,
            UpdateOrderStatusRequest,
            OrderItemView,
            OrderView,
            OrderList,
            params::Pagination,
            Meta,
            ApiResponse<OrderView>,
            ApiResponse<OrderList>
        )
    ),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Orders", description = "Order workflow endpoints"),
    )
)]
pub struct OrderApiDoc;

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        users::create_user,
        users::get_user,
        users::update_user,
        users::delete_user,
        users::list_users,
        users::validate_user
    ),
    components(
        schemas(
            UserSnapshot,
            CreateUserRequest,
            UpdateUserRequest,
            UserView,
            UserList,
            ValidateUserResponse,
            params::Pagination,
            Meta,
            ApiResponse<UserView>,
            ApiResponse<UserList>,
            ApiResponse<ValidateUserResponse>
        )
    ),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Users", description = "User directory endpoints"),
    )
)]
pub struct DirectoryApiDoc;

pub fn order_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", OrderApiDoc::openapi())
}

pub fn directory_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", DirectoryApiDoc::openapi())
}
