// handlers/protected/profile.rs - /api/profile handlers

use axum::{extract::rejection::JsonRejection, extract::State, Json};
use serde_json::{json, Value};

use crate::database::models::{ChangePasswordRequest, UpdateProfileRequest, User};
use crate::database::UserRepository;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::services::AuthService;

use super::{deleted, found};

/// GET /api/profile
pub async fn get_profile(user: AuthUser, State(users): State<UserRepository>) -> ApiResult<User> {
    let profile = found(users.find_by_id(user.user_id).await?, "User")?;
    Ok(ApiResponse::success(profile))
}

/// PUT /api/profile - Partial update; 409 if the new email belongs to someone else
pub async fn update_profile(
    user: AuthUser,
    State(users): State<UserRepository>,
    payload: Result<Json<UpdateProfileRequest>, JsonRejection>,
) -> ApiResult<User> {
    let Json(req) = payload?;
    req.validate().map_err(ApiError::validation_error)?;

    let profile = found(users.update_profile(user.user_id, &req).await?, "User")?;
    Ok(ApiResponse::success(profile))
}

/// PUT /api/profile/password - 401 when the current password is wrong
pub async fn change_password(
    user: AuthUser,
    State(auth): State<AuthService>,
    payload: Result<Json<ChangePasswordRequest>, JsonRejection>,
) -> ApiResult<Value> {
    let Json(req) = payload?;
    auth.change_password(user.user_id, &req).await?;
    Ok(ApiResponse::success(json!({ "message": "Password updated successfully" })))
}

/// DELETE /api/profile - Outstanding tokens stop working at the next request
pub async fn delete_profile(user: AuthUser, State(users): State<UserRepository>) -> ApiResult<()> {
    let removed = users.delete(user.user_id).await?;
    if removed {
        tracing::info!(user_id = user.user_id, "Deleted account");
    }
    deleted(removed, "User")
}
