// handlers/protected/bands.rs - /api/bands handlers

use axum::{
    extract::rejection::{JsonRejection, PathRejection},
    extract::{Path, State},
    Json,
};

use crate::database::models::{Band, BandWithMembers, CreateBandRequest, UpdateBandRequest};
use crate::database::{BandRepository, BandScope};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};

use super::{deleted, found};

/// GET /api/bands - The caller's bands with members, newest first
pub async fn list(user: AuthUser, State(bands): State<BandRepository>) -> ApiResult<Vec<BandWithMembers>> {
    Ok(ApiResponse::success(bands.list(user.user_id).await?))
}

/// POST /api/bands - Band and initial members are created atomically
pub async fn create(
    user: AuthUser,
    State(bands): State<BandRepository>,
    payload: Result<Json<CreateBandRequest>, JsonRejection>,
) -> ApiResult<BandWithMembers> {
    let Json(req) = payload?;
    req.validate().map_err(ApiError::validation_error)?;

    // The owner can disappear between the auth gate and the insert
    let band = bands
        .create(user.user_id, &req)
        .await?
        .ok_or_else(|| ApiError::unauthorized("Invalid or expired token"))?;
    Ok(ApiResponse::created(band))
}

/// GET /api/bands/:band_id
pub async fn get(
    user: AuthUser,
    State(bands): State<BandRepository>,
    path: Result<Path<i32>, PathRejection>,
) -> ApiResult<BandWithMembers> {
    let Path(band_id) = path?;
    let band = found(bands.get(BandScope::new(user.user_id, band_id)).await?, "Band")?;
    Ok(ApiResponse::success(band))
}

/// PUT /api/bands/:band_id
pub async fn update(
    user: AuthUser,
    State(bands): State<BandRepository>,
    path: Result<Path<i32>, PathRejection>,
    payload: Result<Json<UpdateBandRequest>, JsonRejection>,
) -> ApiResult<Band> {
    let Path(band_id) = path?;
    let Json(req) = payload?;
    req.validate().map_err(ApiError::validation_error)?;

    let band = found(bands.update(BandScope::new(user.user_id, band_id), &req).await?, "Band")?;
    Ok(ApiResponse::success(band))
}

/// DELETE /api/bands/:band_id - Cascades to members, playlists and songs
pub async fn delete(
    user: AuthUser,
    State(bands): State<BandRepository>,
    path: Result<Path<i32>, PathRejection>,
) -> ApiResult<()> {
    let Path(band_id) = path?;
    deleted(bands.delete(BandScope::new(user.user_id, band_id)).await?, "Band")
}
