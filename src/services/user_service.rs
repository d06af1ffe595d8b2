use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, DbErr, EntityTrait, PaginatorTrait, QueryOrder, QuerySelect, SqlErr,
    ActiveValue::{NotSet, Set},
};

use crate::{
    dto::users::{CreateUserRequest, UpdateUserRequest, UserList, UserView, ValidateUserResponse},
    entity::users::{ActiveModel as UserActive, Column as UserCol, Entity as Users, Model as UserModel},
    error::{AppError, AppResult},
    models::{User, UserSnapshot},
    response::{ApiResponse, Meta},
    routes::params::{Pagination, normalize_page, page_offset},
    state::DirectoryState,
};

pub async fn create_user(
    state: &DirectoryState,
    payload: CreateUserRequest,
) -> AppResult<ApiResponse<UserView>> {
    let name = required("name", &payload.name)?;
    let email = validate_email(&payload.email)?;
    let now = Utc::now().naive_utc();

    let user = UserActive {
        id: NotSet,
        name: Set(name),
        email: Set(email),
        phone: Set(payload.phone.trim().to_string()),
        address: Set(payload.address.trim().to_string()),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(&state.orm)
    .await
    .map_err(unique_email)?;

    tracing::info!(user_id = user.id, "user created");
    Ok(ApiResponse::success(
        "User created successfully",
        UserView::from(user_from_entity(user)),
        Some(Meta::empty()),
    ))
}

pub async fn get_user(state: &DirectoryState, id: i32) -> AppResult<ApiResponse<UserView>> {
    let user = find_user(state, id).await?.ok_or(AppError::NotFound("User"))?;
    Ok(ApiResponse::success(
        "OK",
        UserView::from(user),
        Some(Meta::empty()),
    ))
}

pub async fn update_user(
    state: &DirectoryState,
    id: i32,
    payload: UpdateUserRequest,
) -> AppResult<ApiResponse<UserView>> {
    let existing = Users::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound("User"))?;

    let mut active: UserActive = existing.into();
    if let Some(name) = payload.name {
        active.name = Set(required("name", &name)?);
    }
    if let Some(email) = payload.email {
        active.email = Set(validate_email(&email)?);
    }
    if let Some(phone) = payload.phone {
        active.phone = Set(phone.trim().to_string());
    }
    if let Some(address) = payload.address {
        active.address = Set(address.trim().to_string());
    }
    active.updated_at = Set(Utc::now().naive_utc());
    let user = active.update(&state.orm).await.map_err(unique_email)?;

    tracing::info!(user_id = user.id, "user updated");
    Ok(ApiResponse::success(
        "User updated successfully",
        UserView::from(user_from_entity(user)),
        Some(Meta::empty()),
    ))
}

pub async fn delete_user(state: &DirectoryState, id: i32) -> AppResult<ApiResponse<bool>> {
    let result = Users::delete_by_id(id).exec(&state.orm).await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound("User"));
    }

    tracing::info!(user_id = id, "user deleted");
    Ok(ApiResponse::success(
        "User deleted successfully",
        true,
        Some(Meta::empty()),
    ))
}

pub async fn list_users(
    state: &DirectoryState,
    pagination: Pagination,
) -> AppResult<ApiResponse<UserList>> {
    let (page, limit) = pagination.raw();
    let (page, limit) = normalize_page(page, limit);

    let total = Users::find().count(&state.orm).await?;
    let items = match page_offset(page, limit) {
        Some(offset) => Users::find()
            .order_by_desc(UserCol::CreatedAt)
            .order_by_desc(UserCol::Id)
            .limit(limit)
            .offset(offset)
            .all(&state.orm)
            .await?
            .into_iter()
            .map(|model| UserView::from(user_from_entity(model)))
            .collect(),
        None => Vec::new(),
    };

    Ok(ApiResponse::success(
        "Ok",
        UserList { items },
        Some(Meta::new(page, limit, total)),
    ))
}

/// Unknown users are answered with `is_valid = false` rather than an error,
/// so callers can tell them apart from a failing directory.
pub async fn validate_user(
    state: &DirectoryState,
    id: i32,
) -> AppResult<ApiResponse<ValidateUserResponse>> {
    tracing::debug!(user_id = id, "validating user");
    let user = find_user(state, id).await?;
    let data = ValidateUserResponse {
        is_valid: user.is_some(),
        user: user.as_ref().map(UserSnapshot::from),
    };
    Ok(ApiResponse::success("OK", data, Some(Meta::empty())))
}

async fn find_user(state: &DirectoryState, id: i32) -> AppResult<Option<User>> {
    Ok(Users::find_by_id(id)
        .one(&state.orm)
        .await?
        .map(user_from_entity))
}

fn required(field: &str, value: &str) -> AppResult<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(AppError::Validation(format!("{field} is required")));
    }
    Ok(value.to_string())
}

fn validate_email(email: &str) -> AppResult<String> {
    let email = required("email", email)?;
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && domain.contains('.') => {
            Ok(email.to_lowercase())
        }
        _ => Err(AppError::Validation("email is not valid".into())),
    }
}

fn unique_email(err: DbErr) -> AppError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => {
            AppError::Conflict("email is already registered".into())
        }
        _ => AppError::OrmError(err),
    }
}

fn user_from_entity(model: UserModel) -> User {
    User {
        id: model.id,
        name: model.name,
        email: model.email,
        phone: model.phone,
        address: model.address,
        created_at: model.created_at,
        updated_at: model.updated_at,
    }
}
