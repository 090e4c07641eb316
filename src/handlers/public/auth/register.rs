// handlers/public/auth/register.rs - POST /auth/register handler

use axum::{extract::rejection::JsonRejection, extract::State, Json};

use crate::database::models::CreateUserRequest;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::{AuthService, Session};

/// POST /auth/register - Create an account and receive a token
///
/// Body: `{"first_name", "last_name", "email", "password"}`.
/// 201 with `{token, expires_at, user}`; 409 when the email is taken.
pub async fn register_post(
    State(auth): State<AuthService>,
    payload: Result<Json<CreateUserRequest>, JsonRejection>,
) -> ApiResult<Session> {
    let Json(req) = payload?;
    let session = auth.register(&req).await?;
    Ok(ApiResponse::created(session))
}
