use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::{require, within, PlaylistSong, TITLE_MAX};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct BandPlaylist {
    pub id: i32,
    pub band_id: i32,
    pub name: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaylistWithSongs {
    #[serde(flatten)]
    pub playlist: BandPlaylist,
    pub songs: Vec<PlaylistSong>,
    pub song_count: usize,
}

impl PlaylistWithSongs {
    pub fn new(playlist: BandPlaylist, songs: Vec<PlaylistSong>) -> Self {
        Self {
            song_count: songs.len(),
            playlist,
            songs,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PlaylistRequest {
    pub name: String,
    pub description: String,
}

impl PlaylistRequest {
    pub fn validate(&self) -> Result<(), String> {
        require(&self.name, "Playlist name is required")?;
        within(&self.name, TITLE_MAX, "Playlist name")?;
        within(&self.description, usize::MAX, "Description")
    }
}
