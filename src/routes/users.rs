use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
};

use crate::{
    dto::users::{CreateUserRequest, UpdateUserRequest, UserList, UserView, ValidateUserResponse},
    error::AppResult,
    response::ApiResponse,
    routes::params::Pagination,
    services::user_service,
    state::DirectoryState,
};

pub fn router() -> Router<DirectoryState> {
    Router::new()
        .route("/users", get(list_users).post(create_user))
        .route(
            "/users/{id}",
            get(get_user).put(update_user).delete(delete_user),
        )
        .route("/users/{id}/validate", get(validate_user))
}

#[utoipa::path(
    post,
    path = "/api/users",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created", body = ApiResponse<UserView>),
        (status = 400, description = "Missing name or invalid email"),
        (status = 409, description = "Email already registered"),
    ),
    tag = "Users"
)]
pub async fn create_user(
    State(state): State<DirectoryState>,
    Json(payload): Json<CreateUserRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<UserView>>)> {
    let resp = user_service::create_user(&state, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    get,
    path = "/api/users/{id}",
    params(("id" = i32, Path, description = "User ID")),
    responses(
        (status = 200, description = "User found", body = ApiResponse<UserView>),
        (status = 404, description = "Not Found"),
    ),
    tag = "Users"
)]
pub async fn get_user(
    State(state): State<DirectoryState>,
    Path(id): Path<i32>,
) -> AppResult<Json<ApiResponse<UserView>>> {
    let resp = user_service::get_user(&state, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/users/{id}",
    params(("id" = i32, Path, description = "User ID")),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "User updated", body = ApiResponse<UserView>),
        (status = 404, description = "Not Found"),
        (status = 409, description = "Email already registered"),
    ),
    tag = "Users"
)]
pub async fn update_user(
    State(state): State<DirectoryState>,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateUserRequest>,
) -> AppResult<Json<ApiResponse<UserView>>> {
    let resp = user_service::update_user(&state, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/users/{id}",
    params(("id" = i32, Path, description = "User ID")),
    responses(
        (status = 200, description = "User deleted"),
        (status = 404, description = "Not Found"),
    ),
    tag = "Users"
)]
pub async fn delete_user(
    State(state): State<DirectoryState>,
    Path(id): Path<i32>,
) -> AppResult<Json<ApiResponse<bool>>> {
    let resp = user_service::delete_user(&state, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/users",
    params(Pagination),
    responses(
        (status = 200, description = "Users, newest first", body = ApiResponse<UserList>),
    ),
    tag = "Users"
)]
pub async fn list_users(
    State(state): State<DirectoryState>,
    Query(pagination): Query<Pagination>,
) -> AppResult<Json<ApiResponse<UserList>>> {
    let resp = user_service::list_users(&state, pagination).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/users/{id}/validate",
    params(("id" = i32, Path, description = "User ID")),
    responses(
        (status = 200, description = "Whether the user exists, with its attributes", body = ApiResponse<ValidateUserResponse>),
    ),
    tag = "Users"
)]
pub async fn validate_user(
    State(state): State<DirectoryState>,
    Path(id): Path<i32>,
) -> AppResult<Json<ApiResponse<ValidateUserResponse>>> {
    let resp = user_service::validate_user(&state, id).await?;
    Ok(Json(resp))
}
