// handlers/protected/playlists.rs - /api/bands/:band_id/playlists and artist search

use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;

use crate::database::models::{BandPlaylist, PlaylistRequest, PlaylistWithSongs};
use crate::database::{BandScope, PlaylistRepository};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};

use super::{deleted, found};

pub async fn list(
    user: AuthUser,
    State(playlists): State<PlaylistRepository>,
    path: Result<Path<i32>, PathRejection>,
) -> ApiResult<Vec<PlaylistWithSongs>> {
    let Path(band_id) = path?;
    let all = found(playlists.list(BandScope::new(user.user_id, band_id)).await?, "Band")?;
    Ok(ApiResponse::success(all))
}

pub async fn create(
    user: AuthUser,
    State(playlists): State<PlaylistRepository>,
    path: Result<Path<i32>, PathRejection>,
    payload: Result<Json<PlaylistRequest>, JsonRejection>,
) -> ApiResult<PlaylistWithSongs> {
    let Path(band_id) = path?;
    let Json(req) = payload?;
    req.validate().map_err(ApiError::validation_error)?;

    let playlist = found(
        playlists.create(BandScope::new(user.user_id, band_id), &req).await?,
        "Band",
    )?;
    Ok(ApiResponse::created(playlist))
}

pub async fn get(
    user: AuthUser,
    State(playlists): State<PlaylistRepository>,
    path: Result<Path<(i32, i32)>, PathRejection>,
) -> ApiResult<PlaylistWithSongs> {
    let Path((band_id, playlist_id)) = path?;
    let scope = BandScope::new(user.user_id, band_id).playlist(playlist_id);
    let playlist = found(playlists.get(scope).await?, "Playlist")?;
    Ok(ApiResponse::success(playlist))
}

pub async fn update(
    user: AuthUser,
    State(playlists): State<PlaylistRepository>,
    path: Result<Path<(i32, i32)>, PathRejection>,
    payload: Result<Json<PlaylistRequest>, JsonRejection>,
) -> ApiResult<BandPlaylist> {
    let Path((band_id, playlist_id)) = path?;
    let Json(req) = payload?;
    req.validate().map_err(ApiError::validation_error)?;

    let scope = BandScope::new(user.user_id, band_id).playlist(playlist_id);
    let playlist = found(playlists.update(scope, &req).await?, "Playlist")?;
    Ok(ApiResponse::success(playlist))
}

pub async fn delete(
    user: AuthUser,
    State(playlists): State<PlaylistRepository>,
    path: Result<Path<(i32, i32)>, PathRejection>,
) -> ApiResult<()> {
    let Path((band_id, playlist_id)) = path?;
    let scope = BandScope::new(user.user_id, band_id).playlist(playlist_id);
    deleted(playlists.delete(scope).await?, "Playlist")
}

#[derive(Debug, Default, Deserialize)]
pub struct ArtistQuery {
    #[serde(default)]
    pub q: String,
}

/// GET /api/bands/:band_id/artists?q= - Autocomplete over the band's songs
pub async fn artists(
    user: AuthUser,
    State(playlists): State<PlaylistRepository>,
    path: Result<Path<i32>, PathRejection>,
    query: Result<Query<ArtistQuery>, QueryRejection>,
) -> ApiResult<Vec<String>> {
    let Path(band_id) = path?;
    let Query(query) = query?;

    let names = found(
        playlists.artists(BandScope::new(user.user_id, band_id), &query.q).await?,
        "Band",
    )?;
    Ok(ApiResponse::success(names))
}
