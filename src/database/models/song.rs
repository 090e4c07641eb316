use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::{within, TITLE_MAX};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PlaylistSong {
    pub id: i32,
    pub playlist_id: i32,
    pub artist: String,
    pub song: String,
    pub notes: String,
    pub position: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SongRequest {
    pub artist: String,
    pub song: String,
    pub notes: String,
    pub position: i32,
}

impl SongRequest {
    pub fn validate(&self) -> Result<(), String> {
        if self.artist.trim().is_empty() || self.song.trim().is_empty() {
            return Err("Artist and song are required".to_string());
        }
        within(&self.artist, TITLE_MAX, "Artist")?;
        within(&self.song, TITLE_MAX, "Song")?;
        within(&self.notes, usize::MAX, "Notes")?;
        if self.position < 0 {
            return Err("Position must be zero or greater".to_string());
        }
        Ok(())
    }
}
