// handlers/protected/songs.rs - /api/bands/:band_id/playlists/:playlist_id/songs handlers

use axum::{
    extract::rejection::{JsonRejection, PathRejection},
    extract::{Path, State},
    Json,
};

use crate::database::models::{PlaylistSong, SongRequest};
use crate::database::{BandScope, PlaylistRepository};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};

use super::{deleted, found};

/// Songs ordered by position, then insertion time
pub async fn list(
    user: AuthUser,
    State(playlists): State<PlaylistRepository>,
    path: Result<Path<(i32, i32)>, PathRejection>,
) -> ApiResult<Vec<PlaylistSong>> {
    let Path((band_id, playlist_id)) = path?;
    let scope = BandScope::new(user.user_id, band_id).playlist(playlist_id);
    let songs = found(playlists.list_songs(scope).await?, "Playlist")?;
    Ok(ApiResponse::success(songs))
}

pub async fn create(
    user: AuthUser,
    State(playlists): State<PlaylistRepository>,
    path: Result<Path<(i32, i32)>, PathRejection>,
    payload: Result<Json<SongRequest>, JsonRejection>,
) -> ApiResult<PlaylistSong> {
    let Path((band_id, playlist_id)) = path?;
    let Json(req) = payload?;
    req.validate().map_err(ApiError::validation_error)?;

    let scope = BandScope::new(user.user_id, band_id).playlist(playlist_id);
    let song = found(playlists.add_song(scope, &req).await?, "Playlist")?;
    Ok(ApiResponse::created(song))
}

pub async fn get(
    user: AuthUser,
    State(playlists): State<PlaylistRepository>,
    path: Result<Path<(i32, i32, i32)>, PathRejection>,
) -> ApiResult<PlaylistSong> {
    let Path((band_id, playlist_id, song_id)) = path?;
    let scope = BandScope::new(user.user_id, band_id).playlist(playlist_id);
    let song = found(playlists.get_song(scope, song_id).await?, "Song")?;
    Ok(ApiResponse::success(song))
}

pub async fn update(
    user: AuthUser,
    State(playlists): State<PlaylistRepository>,
    path: Result<Path<(i32, i32, i32)>, PathRejection>,
    payload: Result<Json<SongRequest>, JsonRejection>,
) -> ApiResult<PlaylistSong> {
    let Path((band_id, playlist_id, song_id)) = path?;
    let Json(req) = payload?;
    req.validate().map_err(ApiError::validation_error)?;

    let scope = BandScope::new(user.user_id, band_id).playlist(playlist_id);
    let song = found(playlists.update_song(scope, song_id, &req).await?, "Song")?;
    Ok(ApiResponse::success(song))
}

pub async fn delete(
    user: AuthUser,
    State(playlists): State<PlaylistRepository>,
    path: Result<Path<(i32, i32, i32)>, PathRejection>,
) -> ApiResult<()> {
    let Path((band_id, playlist_id, song_id)) = path?;
    let scope = BandScope::new(user.user_id, band_id).playlist(playlist_id);
    deleted(playlists.delete_song(scope, song_id).await?, "Song")
}
