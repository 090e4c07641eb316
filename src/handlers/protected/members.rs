// handlers/protected/members.rs - /api/bands/:band_id/members handlers

use axum::{
    extract::rejection::{JsonRejection, PathRejection},
    extract::{Path, State},
    Json,
};

use crate::database::models::{BandMember, MemberRequest};
use crate::database::{BandRepository, BandScope};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};

use super::{deleted, found};

pub async fn list(
    user: AuthUser,
    State(bands): State<BandRepository>,
    path: Result<Path<i32>, PathRejection>,
) -> ApiResult<Vec<BandMember>> {
    let Path(band_id) = path?;
    let members = found(bands.list_members(BandScope::new(user.user_id, band_id)).await?, "Band")?;
    Ok(ApiResponse::success(members))
}

pub async fn create(
    user: AuthUser,
    State(bands): State<BandRepository>,
    path: Result<Path<i32>, PathRejection>,
    payload: Result<Json<MemberRequest>, JsonRejection>,
) -> ApiResult<BandMember> {
    let Path(band_id) = path?;
    let Json(req) = payload?;
    req.validate().map_err(ApiError::validation_error)?;

    let member = found(bands.add_member(BandScope::new(user.user_id, band_id), &req).await?, "Band")?;
    Ok(ApiResponse::created(member))
}

pub async fn get(
    user: AuthUser,
    State(bands): State<BandRepository>,
    path: Result<Path<(i32, i32)>, PathRejection>,
) -> ApiResult<BandMember> {
    let Path((band_id, member_id)) = path?;
    let member = found(
        bands.get_member(BandScope::new(user.user_id, band_id), member_id).await?,
        "Member",
    )?;
    Ok(ApiResponse::success(member))
}

pub async fn update(
    user: AuthUser,
    State(bands): State<BandRepository>,
    path: Result<Path<(i32, i32)>, PathRejection>,
    payload: Result<Json<MemberRequest>, JsonRejection>,
) -> ApiResult<BandMember> {
    let Path((band_id, member_id)) = path?;
    let Json(req) = payload?;
    req.validate().map_err(ApiError::validation_error)?;

    let member = found(
        bands
            .update_member(BandScope::new(user.user_id, band_id), member_id, &req)
            .await?,
        "Member",
    )?;
    Ok(ApiResponse::success(member))
}

pub async fn delete(
    user: AuthUser,
    State(bands): State<BandRepository>,
    path: Result<Path<(i32, i32)>, PathRejection>,
) -> ApiResult<()> {
    let Path((band_id, member_id)) = path?;
    deleted(
        bands.delete_member(BandScope::new(user.user_id, band_id), member_id).await?,
        "Member",
    )
}
