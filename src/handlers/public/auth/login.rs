// handlers/public/auth/login.rs - POST /auth/login handler

use axum::{extract::rejection::JsonRejection, extract::State, Json};

use crate::database::models::LoginRequest;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::{AuthService, Session};

/// POST /auth/login - Exchange email and password for a token
pub async fn login_post(
    State(auth): State<AuthService>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<Session> {
    let Json(req) = payload?;
    let session = auth.login(&req).await?;
    Ok(ApiResponse::success(session))
}
