pub mod band;
pub mod member;
pub mod playlist;
pub mod song;
pub mod user;

pub use band::{Band, BandWithMembers, CreateBandRequest, UpdateBandRequest};
pub use member::{BandMember, MemberRequest};
pub use playlist::{BandPlaylist, PlaylistRequest, PlaylistWithSongs};
pub use song::{PlaylistSong, SongRequest};
pub use user::{ChangePasswordRequest, CreateUserRequest, LoginRequest, UpdateProfileRequest, User};

fn require(value: &str, message: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        return Err(message.to_string());
    }
    Ok(())
}

/// Column widths from the migrations, in characters.
pub const PERSON_NAME_MAX: usize = 100;
pub const EMAIL_MAX: usize = 255;
pub const TITLE_MAX: usize = 255;
pub const ROLE_MAX: usize = 100;
pub const PHONE_MAX: usize = 50;

/// Fits a VARCHAR(`max`) column; Postgres text also cannot hold NUL.
fn within(value: &str, max: usize, field: &str) -> Result<(), String> {
    if value.contains('\0') {
        return Err(format!("{} contains invalid characters", field));
    }
    if value.trim().chars().count() > max {
        return Err(format!("{} must be at most {} characters", field, max));
    }
    Ok(())
}

fn trimmed(value: &str) -> String {
    value.trim().to_string()
}
