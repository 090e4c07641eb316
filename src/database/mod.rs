pub mod bands;
pub mod manager;
pub mod models;
pub mod playlists;
pub mod scope;
pub mod users;

pub use bands::BandRepository;
pub use manager::{DatabaseError, DatabaseManager};
pub use playlists::PlaylistRepository;
pub use scope::{BandScope, OwnershipChain, PlaylistScope};
pub use users::UserRepository;
