//! Ownership chains for band-owned resources.
//!
//! Every member, playlist and song operation names its full ancestor chain
//! plus the caller's id. The chain is verified top-down (band first) before
//! the nested row is touched, and every failure collapses to `None` so a
//! caller cannot tell "not yours" from "does not exist".

use std::fmt;

use async_trait::async_trait;
use sqlx::PgPool;

use crate::database::manager::DatabaseError;

#[async_trait]
pub trait OwnershipChain: fmt::Display + Send + Sync {
    /// The authenticated identity the chain must terminate at.
    fn owner_id(&self) -> i32;

    /// Walk the chain from the root. `false` on the first broken link.
    async fn verify(&self, pool: &PgPool) -> Result<bool, DatabaseError>;
}

/// A band as seen by one owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BandScope {
    pub owner_id: i32,
    pub band_id: i32,
}

impl BandScope {
    pub fn new(owner_id: i32, band_id: i32) -> Self {
        Self { owner_id, band_id }
    }

    pub fn playlist(self, playlist_id: i32) -> PlaylistScope {
        PlaylistScope {
            owner_id: self.owner_id,
            band_id: self.band_id,
            playlist_id,
        }
    }
}

#[async_trait]
impl OwnershipChain for BandScope {
    fn owner_id(&self) -> i32 {
        self.owner_id
    }

    async fn verify(&self, pool: &PgPool) -> Result<bool, DatabaseError> {
        band_owned(pool, self.owner_id, self.band_id).await
    }
}

impl fmt::Display for BandScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "band {} of user {}", self.band_id, self.owner_id)
    }
}

/// A playlist reached through its band.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaylistScope {
    pub owner_id: i32,
    pub band_id: i32,
    pub playlist_id: i32,
}

impl PlaylistScope {
    pub fn band(&self) -> BandScope {
        BandScope::new(self.owner_id, self.band_id)
    }
}

#[async_trait]
impl OwnershipChain for PlaylistScope {
    fn owner_id(&self) -> i32 {
        self.owner_id
    }

    async fn verify(&self, pool: &PgPool) -> Result<bool, DatabaseError> {
        if !self.band().verify(pool).await? {
            return Ok(false);
        }

        let (exists,): (bool,) = sqlx::query_as(
            "SELECT EXISTS(SELECT 1 FROM band_playlists WHERE id = $1 AND band_id = $2)",
        )
        .bind(self.playlist_id)
        .bind(self.band_id)
        .fetch_one(pool)
        .await?;

        Ok(exists)
    }
}

impl fmt::Display for PlaylistScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "playlist {} in band {} of user {}",
            self.playlist_id, self.band_id, self.owner_id
        )
    }
}

async fn band_owned(pool: &PgPool, owner_id: i32, band_id: i32) -> Result<bool, DatabaseError> {
    let (exists,): (bool,) =
        sqlx::query_as("SELECT EXISTS(SELECT 1 FROM bands WHERE id = $1 AND owner_id = $2)")
            .bind(band_id)
            .bind(owner_id)
            .fetch_one(pool)
            .await?;

    Ok(exists)
}

/// Verify `scope`, logging the miss. Callers return `None` on `false`
/// before touching any nested row.
pub async fn ensure_owned<S>(pool: &PgPool, scope: &S) -> Result<bool, DatabaseError>
where
    S: OwnershipChain + ?Sized,
{
    let owned = scope.verify(pool).await?;
    if !owned {
        tracing::warn!(owner_id = scope.owner_id(), "Ownership check failed for {}", scope);
    }
    Ok(owned)
}

/// An insert whose parent vanished between verification and write
/// (concurrent delete) reads as absent rather than as a store failure.
pub fn absent_on_orphan<T>(result: Result<T, DatabaseError>) -> Result<Option<T>, DatabaseError> {
    match result {
        Ok(row) => Ok(Some(row)),
        Err(e) if e.is_foreign_key_violation() => Ok(None),
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn playlist_scope_extends_band_scope() {
        let scope = BandScope::new(3, 10).playlist(42);
        assert_eq!(scope.owner_id, 3);
        assert_eq!(scope.band(), BandScope::new(3, 10));
        assert_eq!(scope.to_string(), "playlist 42 in band 10 of user 3");
    }

    #[test]
    fn orphaned_insert_passes_other_errors_through() {
        let ok: Result<Option<i32>, _> = absent_on_orphan(Ok(5));
        assert_eq!(ok.unwrap(), Some(5));

        let err = absent_on_orphan::<i32>(Err(DatabaseError::Sqlx(sqlx::Error::RowNotFound)));
        assert!(err.is_err());
    }
}
