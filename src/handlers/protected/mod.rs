// handlers/protected/mod.rs - Protected handlers (bearer token required)
//
// Route Prefix: /api/*
// Every handler receives the caller as an `AuthUser` and passes its id
// explicitly into the repositories.

pub mod bands;
pub mod members;
pub mod playlists;
pub mod profile;
pub mod songs;

use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};

/// Absent and not-owned both surface as the same 404.
fn found<T>(value: Option<T>, what: &str) -> Result<T, ApiError> {
    value.ok_or_else(|| ApiError::not_found(format!("{what} not found")))
}

fn deleted(removed: bool, what: &str) -> ApiResult<()> {
    if removed {
        Ok(ApiResponse::no_content())
    } else {
        Err(ApiError::not_found(format!("{what} not found")))
    }
}
