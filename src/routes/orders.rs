use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, patch, post},
};

use crate::{
    dto::orders::{CreateOrderRequest, OrderList, OrderView, UpdateOrderStatusRequest},
    error::AppResult,
    response::{ApiResponse, Meta},
    routes::params::Pagination,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/orders", get(list_orders).post(create_order))
        .route("/orders/{id}", get(get_order))
        .route("/orders/{id}/status", patch(update_order_status))
        .route("/orders/{id}/cancel", post(cancel_order))
        .route("/users/{user_id}/orders", get(get_user_orders))
}

#[utoipa::path(
    post,
    path = "/api/orders",
    request_body = CreateOrderRequest,
    responses(
        (status = 201, description = "Order created", body = ApiResponse<OrderView>),
        (status = 400, description = "Empty or malformed items"),
        (status = 404, description = "User not found"),
        (status = 503, description = "User directory unavailable"),
    ),
    tag = "Orders"
)]
pub async fn create_order(
    State(state): State<AppState>,
    Json(payload): Json<CreateOrderRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<OrderView>>)> {
    let order = state
        .orders
        .create_order(payload.user_id, payload.items)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            "Order created successfully",
            OrderView::from(order),
            Some(Meta::empty()),
        )),
    ))
}

#[utoipa::path(
    get,
    path = "/api/orders/{id}",
    params(("id" = i32, Path, description = "Order ID")),
    responses(
        (status = 200, description = "Order with its items", body = ApiResponse<OrderView>),
        (status = 404, description = "Order not found"),
    ),
    tag = "Orders"
)]
pub async fn get_order(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<ApiResponse<OrderView>>> {
    let order = state.orders.get_order(id).await?;
    Ok(Json(ApiResponse::success(
        "OK",
        OrderView::from(order),
        Some(Meta::empty()),
    )))
}

#[utoipa::path(
    patch,
    path = "/api/orders/{id}/status",
    params(("id" = i32, Path, description = "Order ID")),
    request_body = UpdateOrderStatusRequest,
    responses(
        (status = 200, description = "Order status updated", body = ApiResponse<OrderView>),
        (status = 400, description = "Illegal transition (enforced policy only)"),
        (status = 404, description = "Order not found"),
        (status = 409, description = "Status changed concurrently (enforced policy only)"),
    ),
    tag = "Orders"
)]
pub async fn update_order_status(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateOrderStatusRequest>,
) -> AppResult<Json<ApiResponse<OrderView>>> {
    let order = state.orders.update_status(id, payload.status).await?;
    Ok(Json(ApiResponse::success(
        "Order status updated successfully",
        OrderView::from(order),
        Some(Meta::empty()),
    )))
}

#[utoipa::path(
    get,
    path = "/api/orders",
    params(Pagination),
    responses(
        (status = 200, description = "Orders, newest first; total counts the whole table", body = ApiResponse<OrderList>),
    ),
    tag = "Orders"
)]
pub async fn list_orders(
    State(state): State<AppState>,
    Query(pagination): Query<Pagination>,
) -> AppResult<Json<ApiResponse<OrderList>>> {
    let (page, limit) = pagination.raw();
    let result = state.orders.list_orders(page, limit).await?;
    let meta = Meta::new(result.page, result.limit, result.total);
    Ok(Json(ApiResponse::success(
        "Ok",
        OrderList::from(result.orders),
        Some(meta),
    )))
}

#[utoipa::path(
    get,
    path = "/api/users/{user_id}/orders",
    params(("user_id" = i32, Path, description = "User ID")),
    responses(
        (status = 200, description = "All orders of the user, newest first", body = ApiResponse<OrderList>),
        (status = 404, description = "User not found"),
        (status = 503, description = "User directory unavailable"),
    ),
    tag = "Orders"
)]
pub async fn get_user_orders(
    State(state): State<AppState>,
    Path(user_id): Path<i32>,
) -> AppResult<Json<ApiResponse<OrderList>>> {
    let orders = state.orders.get_orders_by_user(user_id).await?;
    let meta = Meta::total(orders.len() as u64);
    Ok(Json(ApiResponse::success(
        "Ok",
        OrderList::from(orders),
        Some(meta),
    )))
}

#[utoipa::path(
    post,
    path = "/api/orders/{id}/cancel",
    params(("id" = i32, Path, description = "Order ID")),
    responses(
        (status = 200, description = "Order cancelled", body = ApiResponse<OrderView>),
        (status = 400, description = "Order already delivered (enforced policy only)"),
        (status = 404, description = "Order not found"),
    ),
    tag = "Orders"
)]
pub async fn cancel_order(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<ApiResponse<OrderView>>> {
    let order = state.orders.cancel_order(id).await?;
    Ok(Json(ApiResponse::success(
        "Order cancelled successfully",
        OrderView::from(order),
        Some(Meta::empty()),
    )))
}
