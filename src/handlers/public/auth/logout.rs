// handlers/public/auth/logout.rs - POST /auth/logout handler

use serde_json::{json, Value};

use crate::middleware::ApiResponse;

/// POST /auth/logout - Tokens are stateless; the client discards its copy.
pub async fn logout_post() -> ApiResponse<Value> {
    ApiResponse::success(json!({ "message": "Logged out successfully" }))
}
