// handlers/public/system.rs - GET / and GET /health

use axum::extract::State;
use serde_json::{json, Value};
use sqlx::PgPool;

use crate::database::DatabaseManager;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};

/// GET / - Service description
pub async fn root() -> ApiResponse<Value> {
    ApiResponse::success(json!({
        "name": "Playlists API",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "Bands, members and per-band playlists",
        "endpoints": {
            "auth": "/auth/register, /auth/login, /auth/logout (public)",
            "profile": "/api/profile[/password] (protected)",
            "bands": "/api/bands[/:band_id] (protected)",
            "members": "/api/bands/:band_id/members[/:member_id] (protected)",
            "playlists": "/api/bands/:band_id/playlists[/:playlist_id] (protected)",
            "songs": "/api/bands/:band_id/playlists/:playlist_id/songs[/:song_id] (protected)",
            "artists": "/api/bands/:band_id/artists?q= (protected)"
        }
    }))
}

/// GET /health - Liveness plus a store round trip
pub async fn health(State(pool): State<PgPool>) -> ApiResult<Value> {
    if let Err(e) = DatabaseManager::health_check(&pool).await {
        tracing::error!("Health check failed: {}", e);
        return Err(ApiError::service_unavailable("Database unavailable"));
    }

    Ok(ApiResponse::success(json!({
        "status": "ok",
        "database": "ok"
    })))
}
