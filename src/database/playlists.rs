use std::collections::HashMap;

use sqlx::{PgExecutor, PgPool};

use crate::database::manager::DatabaseError;
use crate::database::models::{BandPlaylist, PlaylistRequest, PlaylistSong, PlaylistWithSongs, SongRequest};
use crate::database::scope::{absent_on_orphan, ensure_owned, BandScope, PlaylistScope};

const PLAYLIST_COLUMNS: &str = "id, band_id, name, description, created_at, updated_at";
const SONG_COLUMNS: &str = "id, playlist_id, artist, song, notes, position, created_at, updated_at";
const SONG_ORDER: &str = "ORDER BY position ASC, created_at ASC, id ASC";

/// Most suggestions returned by [`PlaylistRepository::artists`]
pub const ARTIST_SUGGESTION_LIMIT: i64 = 10;

/// Band playlists and their songs. Every call is gated by the band's owner.
#[derive(Clone)]
pub struct PlaylistRepository {
    pool: PgPool,
}

impl PlaylistRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// The band's playlists, newest first, each with its ordered songs.
    pub async fn list(&self, scope: BandScope) -> Result<Option<Vec<PlaylistWithSongs>>, DatabaseError> {
        if !ensure_owned(&self.pool, &scope).await? {
            return Ok(None);
        }

        let playlists = sqlx::query_as::<_, BandPlaylist>(&format!(
            "SELECT {PLAYLIST_COLUMNS} FROM band_playlists
             WHERE band_id = $1
             ORDER BY created_at DESC, id DESC"
        ))
        .bind(scope.band_id)
        .fetch_all(&self.pool)
        .await?;

        if playlists.is_empty() {
            return Ok(Some(Vec::new()));
        }

        let playlist_ids: Vec<i32> = playlists.iter().map(|p| p.id).collect();
        let songs = sqlx::query_as::<_, PlaylistSong>(&format!(
            "SELECT {SONG_COLUMNS} FROM band_playlist_songs WHERE playlist_id = ANY($1) {SONG_ORDER}"
        ))
        .bind(&playlist_ids)
        .fetch_all(&self.pool)
        .await?;

        let mut by_playlist: HashMap<i32, Vec<PlaylistSong>> = HashMap::new();
        for song in songs {
            by_playlist.entry(song.playlist_id).or_default().push(song);
        }

        Ok(Some(
            playlists
                .into_iter()
                .map(|playlist| {
                    let songs = by_playlist.remove(&playlist.id).unwrap_or_default();
                    PlaylistWithSongs::new(playlist, songs)
                })
                .collect(),
        ))
    }

    pub async fn get(&self, scope: PlaylistScope) -> Result<Option<PlaylistWithSongs>, DatabaseError> {
        if !ensure_owned(&self.pool, &scope.band()).await? {
            return Ok(None);
        }

        let playlist = sqlx::query_as::<_, BandPlaylist>(&format!(
            "SELECT {PLAYLIST_COLUMNS} FROM band_playlists WHERE id = $1 AND band_id = $2"
        ))
        .bind(scope.playlist_id)
        .bind(scope.band_id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(playlist) = playlist else {
            return Ok(None);
        };

        let songs = select_songs(&self.pool, playlist.id).await?;
        Ok(Some(PlaylistWithSongs::new(playlist, songs)))
    }

    /// A new playlist, returned in the same shape as reads (no songs yet).
    pub async fn create(
        &self,
        scope: BandScope,
        req: &PlaylistRequest,
    ) -> Result<Option<PlaylistWithSongs>, DatabaseError> {
        if !ensure_owned(&self.pool, &scope).await? {
            return Ok(None);
        }

        let result = sqlx::query_as::<_, BandPlaylist>(&format!(
            "INSERT INTO band_playlists (band_id, name, description)
             VALUES ($1, $2, $3)
             RETURNING {PLAYLIST_COLUMNS}"
        ))
        .bind(scope.band_id)
        .bind(req.name.trim())
        .bind(req.description.trim())
        .fetch_one(&self.pool)
        .await
        .map_err(DatabaseError::from);

        Ok(absent_on_orphan(result)?.map(|playlist| PlaylistWithSongs::new(playlist, Vec::new())))
    }

    pub async fn update(
        &self,
        scope: PlaylistScope,
        req: &PlaylistRequest,
    ) -> Result<Option<BandPlaylist>, DatabaseError> {
        if !ensure_owned(&self.pool, &scope.band()).await? {
            return Ok(None);
        }

        let playlist = sqlx::query_as::<_, BandPlaylist>(&format!(
            "UPDATE band_playlists SET name = $1, description = $2, updated_at = NOW()
             WHERE id = $3 AND band_id = $4
             RETURNING {PLAYLIST_COLUMNS}"
        ))
        .bind(req.name.trim())
        .bind(req.description.trim())
        .bind(scope.playlist_id)
        .bind(scope.band_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(playlist)
    }

    /// Songs cascade with the playlist.
    pub async fn delete(&self, scope: PlaylistScope) -> Result<bool, DatabaseError> {
        if !ensure_owned(&self.pool, &scope.band()).await? {
            return Ok(false);
        }

        let result = sqlx::query("DELETE FROM band_playlists WHERE id = $1 AND band_id = $2")
            .bind(scope.playlist_id)
            .bind(scope.band_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn list_songs(&self, scope: PlaylistScope) -> Result<Option<Vec<PlaylistSong>>, DatabaseError> {
        if !ensure_owned(&self.pool, &scope).await? {
            return Ok(None);
        }
        Ok(Some(select_songs(&self.pool, scope.playlist_id).await?))
    }

    pub async fn get_song(
        &self,
        scope: PlaylistScope,
        song_id: i32,
    ) -> Result<Option<PlaylistSong>, DatabaseError> {
        if !ensure_owned(&self.pool, &scope).await? {
            return Ok(None);
        }

        let song = sqlx::query_as::<_, PlaylistSong>(&format!(
            "SELECT {SONG_COLUMNS} FROM band_playlist_songs WHERE id = $1 AND playlist_id = $2"
        ))
        .bind(song_id)
        .bind(scope.playlist_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(song)
    }

    pub async fn add_song(
        &self,
        scope: PlaylistScope,
        req: &SongRequest,
    ) -> Result<Option<PlaylistSong>, DatabaseError> {
        if !ensure_owned(&self.pool, &scope).await? {
            return Ok(None);
        }

        let result = sqlx::query_as::<_, PlaylistSong>(&format!(
            "INSERT INTO band_playlist_songs (playlist_id, artist, song, notes, position)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {SONG_COLUMNS}"
        ))
        .bind(scope.playlist_id)
        .bind(req.artist.trim())
        .bind(req.song.trim())
        .bind(req.notes.trim())
        .bind(req.position)
        .fetch_one(&self.pool)
        .await
        .map_err(DatabaseError::from);

        absent_on_orphan(result)
    }

    pub async fn update_song(
        &self,
        scope: PlaylistScope,
        song_id: i32,
        req: &SongRequest,
    ) -> Result<Option<PlaylistSong>, DatabaseError> {
        if !ensure_owned(&self.pool, &scope).await? {
            return Ok(None);
        }

        let song = sqlx::query_as::<_, PlaylistSong>(&format!(
            "UPDATE band_playlist_songs
             SET artist = $1, song = $2, notes = $3, position = $4, updated_at = NOW()
             WHERE id = $5 AND playlist_id = $6
             RETURNING {SONG_COLUMNS}"
        ))
        .bind(req.artist.trim())
        .bind(req.song.trim())
        .bind(req.notes.trim())
        .bind(req.position)
        .bind(song_id)
        .bind(scope.playlist_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(song)
    }

    pub async fn delete_song(&self, scope: PlaylistScope, song_id: i32) -> Result<bool, DatabaseError> {
        if !ensure_owned(&self.pool, &scope).await? {
            return Ok(false);
        }

        let result = sqlx::query("DELETE FROM band_playlist_songs WHERE id = $1 AND playlist_id = $2")
            .bind(song_id)
            .bind(scope.playlist_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Distinct artists across the band's playlists whose name contains
    /// `query`, case-insensitively. A blank query suggests nothing.
    pub async fn artists(&self, scope: BandScope, query: &str) -> Result<Option<Vec<String>>, DatabaseError> {
        if !ensure_owned(&self.pool, &scope).await? {
            return Ok(None);
        }

        let query = query.trim();
        if query.is_empty() {
            return Ok(Some(Vec::new()));
        }

        let rows: Vec<(String,)> = sqlx::query_as(
            "SELECT DISTINCT s.artist
             FROM band_playlist_songs s
             JOIN band_playlists p ON p.id = s.playlist_id
             WHERE p.band_id = $1 AND s.artist ILIKE $2 ESCAPE '\\'
             ORDER BY s.artist
             LIMIT $3",
        )
        .bind(scope.band_id)
        .bind(contains_pattern(query))
        .bind(ARTIST_SUGGESTION_LIMIT)
        .fetch_all(&self.pool)
        .await?;

        Ok(Some(rows.into_iter().map(|(artist,)| artist).collect()))
    }
}

async fn select_songs<'e, E>(executor: E, playlist_id: i32) -> Result<Vec<PlaylistSong>, DatabaseError>
where
    E: PgExecutor<'e>,
{
    let songs = sqlx::query_as::<_, PlaylistSong>(&format!(
        "SELECT {SONG_COLUMNS} FROM band_playlist_songs WHERE playlist_id = $1 {SONG_ORDER}"
    ))
    .bind(playlist_id)
    .fetch_all(executor)
    .await?;
    Ok(songs)
}

/// `%query%` with LIKE metacharacters in `query` matched literally.
fn contains_pattern(query: &str) -> String {
    let mut pattern = String::with_capacity(query.len() + 2);
    pattern.push('%');
    for c in query.chars() {
        if matches!(c, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pattern_wraps_query() {
        assert_eq!(contains_pattern("que"), "%que%");
    }

    #[test]
    fn pattern_escapes_metacharacters() {
        assert_eq!(contains_pattern("100%"), "%100\\%%");
        assert_eq!(contains_pattern("a_b"), "%a\\_b%");
        assert_eq!(contains_pattern("c\\d"), "%c\\\\d%");
    }
}
