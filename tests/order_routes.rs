mod common;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use http_body_util::BodyExt;
use order_workflow::{
    routes::create_order_app, services::order_service::TransitionPolicy, state::AppState,
};
use serde_json::{Value, json};
use tower::ServiceExt;

fn app(h: &common::Harness) -> Router {
    create_order_app().with_state(AppState {
        orders: h.workflow.clone(),
    })
}

async fn send(app: Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut request = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            request = request.header(header::CONTENT_TYPE, "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };
    let response = app.oneshot(request.body(body).unwrap()).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

fn widget_order(user_id: i32) -> Value {
    json!({
        "user_id": user_id,
        "items": [
            { "product_name": "widget", "quantity": 2, "price": "9.99" },
            { "product_name": "gadget", "quantity": 1, "price": "5.00" }
        ]
    })
}

#[tokio::test]
async fn create_then_fetch_order() {
    let h = common::harness(TransitionPolicy::Permissive);

    let (status, body) = send(app(&h), "POST", "/api/orders", Some(widget_order(7))).await;
    assert_eq!(status, StatusCode::CREATED);
    let order = &body["data"];
    assert_eq!(order["status"], "PENDING");
    assert_eq!(order["total_amount"], "24.98");
    assert_eq!(order["user_name"], "Ada");
    assert_eq!(order["items"].as_array().unwrap().len(), 2);
    assert_eq!(order["created_at"], "2024-01-01 00:00:01");

    let id = order["id"].as_i64().unwrap();
    let (status, body) = send(app(&h), "GET", &format!("/api/orders/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["id"], id);
    assert_eq!(body["data"]["items"][0]["product_name"], "widget");
}

#[tokio::test]
async fn create_maps_failures_to_statuses() {
    let h = common::harness(TransitionPolicy::Permissive);

    let (status, body) = send(
        app(&h),
        "POST",
        "/api/orders",
        Some(json!({ "user_id": 7, "items": [] })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["data"]["error"].as_str().unwrap().contains("Invalid argument"));

    let (status, _) = send(app(&h), "POST", "/api/orders", Some(widget_order(99))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    h.directory.set_failing(true);
    let (status, body) = send(app(&h), "POST", "/api/orders", Some(widget_order(7))).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["message"], "User service unavailable");

    assert_eq!(h.store.order_count(), 0);
}

#[tokio::test]
async fn update_status_and_cancel() {
    let h = common::harness(TransitionPolicy::Permissive);
    let (_, body) = send(app(&h), "POST", "/api/orders", Some(widget_order(7))).await;
    let id = body["data"]["id"].as_i64().unwrap();

    let (status, body) = send(
        app(&h),
        "PATCH",
        &format!("/api/orders/{id}/status"),
        Some(json!({ "status": "SHIPPED" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "SHIPPED");
    assert_eq!(body["data"]["total_amount"], "24.98");

    let (status, body) = send(app(&h), "POST", &format!("/api/orders/{id}/cancel"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "CANCELLED");

    let (status, _) = send(app(&h), "POST", "/api/orders/999/cancel", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn enforced_policy_surfaces_bad_request_and_conflict() {
    let h = common::harness(TransitionPolicy::Enforced);
    let (_, body) = send(app(&h), "POST", "/api/orders", Some(widget_order(7))).await;
    let id = body["data"]["id"].as_i64().unwrap();
    let uri = format!("/api/orders/{id}/status");

    let (status, _) = send(app(&h), "PATCH", &uri, Some(json!({ "status": "DELIVERED" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    h.store
        .interfere_before_next_cas(order_workflow::models::OrderStatus::Cancelled);
    let (status, _) = send(app(&h), "PATCH", &uri, Some(json!({ "status": "PROCESSING" }))).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn list_reports_paging_meta() {
    let h = common::harness(TransitionPolicy::Permissive);
    for user_id in [7, 8, 7] {
        send(app(&h), "POST", "/api/orders", Some(widget_order(user_id))).await;
    }

    let (status, body) = send(app(&h), "GET", "/api/orders?page=0&limit=0", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["meta"], json!({ "page": 1, "per_page": 10, "total": 3 }));
    assert_eq!(body["data"]["items"].as_array().unwrap().len(), 3);

    let (_, body) = send(app(&h), "GET", "/api/orders?page=2&per_page=2", None).await;
    assert_eq!(body["meta"]["total"], 3);
    assert_eq!(body["data"]["items"].as_array().unwrap().len(), 1);

    let (status, body) = send(
        app(&h),
        "GET",
        "/api/orders?page=9223372036854775807&limit=10",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["meta"]["total"], 3);
    assert!(body["data"]["items"].as_array().unwrap().is_empty());

    let (status, body) = send(app(&h), "GET", "/api/users/7/orders", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["meta"]["total"], 2);

    let (status, _) = send(app(&h), "GET", "/api/users/99/orders", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn health_and_fallback() {
    let h = common::harness(TransitionPolicy::Permissive);

    let (status, body) = send(app(&h), "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "ok");

    let (status, body) = send(app(&h), "GET", "/api/nope", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Route not found");
    assert_eq!(body["data"]["error"], "Route not found");
}
