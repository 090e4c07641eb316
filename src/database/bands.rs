use std::collections::HashMap;

use sqlx::{PgExecutor, PgPool};

use crate::database::manager::DatabaseError;
use crate::database::models::{
    Band, BandMember, BandWithMembers, CreateBandRequest, MemberRequest, UpdateBandRequest,
};
use crate::database::scope::{absent_on_orphan, ensure_owned, BandScope};

const BAND_COLUMNS: &str = "id, name, description, owner_id, created_at, updated_at";
const MEMBER_COLUMNS: &str = "id, band_id, name, role, email, phone, created_at, updated_at";

/// Bands and their members, always filtered by the owning user.
#[derive(Clone)]
pub struct BandRepository {
    pool: PgPool,
}

impl BandRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// All of the owner's bands, newest first, each with its members.
    pub async fn list(&self, owner_id: i32) -> Result<Vec<BandWithMembers>, DatabaseError> {
        let bands = sqlx::query_as::<_, Band>(&format!(
            "SELECT {BAND_COLUMNS} FROM bands WHERE owner_id = $1 ORDER BY created_at DESC, id DESC"
        ))
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;

        if bands.is_empty() {
            return Ok(Vec::new());
        }

        // The band query above already scoped by owner; members are fetched
        // in one round trip without re-checking each band.
        let band_ids: Vec<i32> = bands.iter().map(|b| b.id).collect();
        let members = sqlx::query_as::<_, BandMember>(&format!(
            "SELECT {MEMBER_COLUMNS} FROM band_members
             WHERE band_id = ANY($1)
             ORDER BY created_at ASC, id ASC"
        ))
        .bind(&band_ids)
        .fetch_all(&self.pool)
        .await?;

        let mut by_band: HashMap<i32, Vec<BandMember>> = HashMap::new();
        for member in members {
            by_band.entry(member.band_id).or_default().push(member);
        }

        Ok(bands
            .into_iter()
            .map(|band| {
                let members = by_band.remove(&band.id).unwrap_or_default();
                BandWithMembers::new(band, members)
            })
            .collect())
    }

    pub async fn get(&self, scope: BandScope) -> Result<Option<BandWithMembers>, DatabaseError> {
        let band = sqlx::query_as::<_, Band>(&format!(
            "SELECT {BAND_COLUMNS} FROM bands WHERE id = $1 AND owner_id = $2"
        ))
        .bind(scope.band_id)
        .bind(scope.owner_id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(band) = band else {
            return Ok(None);
        };

        let members = select_members(&self.pool, band.id).await?;
        Ok(Some(BandWithMembers::new(band, members)))
    }

    /// Insert the band and its initial members in one transaction.
    /// `None` when the owner no longer exists.
    pub async fn create(
        &self,
        owner_id: i32,
        req: &CreateBandRequest,
    ) -> Result<Option<BandWithMembers>, DatabaseError> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query_as::<_, Band>(&format!(
            "INSERT INTO bands (name, description, owner_id)
             VALUES ($1, $2, $3)
             RETURNING {BAND_COLUMNS}"
        ))
        .bind(req.name.trim())
        .bind(req.description.trim())
        .bind(owner_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(DatabaseError::from);

        let Some(band) = absent_on_orphan(result)? else {
            tracing::warn!("Band insert for missing user {}", owner_id);
            return Ok(None);
        };

        let mut members = Vec::with_capacity(req.members.len());
        for member in &req.members {
            // An error here drops `tx` uncommitted, rolling back the band too
            members.push(insert_member(&mut *tx, band.id, member).await?);
        }

        tx.commit().await?;

        tracing::info!(
            "Created band {} for user {} with {} members",
            band.id,
            owner_id,
            members.len()
        );
        Ok(Some(BandWithMembers::new(band, members)))
    }

    pub async fn update(
        &self,
        scope: BandScope,
        req: &UpdateBandRequest,
    ) -> Result<Option<Band>, DatabaseError> {
        let band = sqlx::query_as::<_, Band>(&format!(
            "UPDATE bands SET name = $1, description = $2, updated_at = NOW()
             WHERE id = $3 AND owner_id = $4
             RETURNING {BAND_COLUMNS}"
        ))
        .bind(req.name.trim())
        .bind(req.description.trim())
        .bind(scope.band_id)
        .bind(scope.owner_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(band)
    }

    /// Members, playlists and songs go with the band via FK cascades.
    pub async fn delete(&self, scope: BandScope) -> Result<bool, DatabaseError> {
        let result = sqlx::query("DELETE FROM bands WHERE id = $1 AND owner_id = $2")
            .bind(scope.band_id)
            .bind(scope.owner_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn list_members(&self, scope: BandScope) -> Result<Option<Vec<BandMember>>, DatabaseError> {
        if !ensure_owned(&self.pool, &scope).await? {
            return Ok(None);
        }
        Ok(Some(select_members(&self.pool, scope.band_id).await?))
    }

    pub async fn get_member(
        &self,
        scope: BandScope,
        member_id: i32,
    ) -> Result<Option<BandMember>, DatabaseError> {
        if !ensure_owned(&self.pool, &scope).await? {
            return Ok(None);
        }

        let member = sqlx::query_as::<_, BandMember>(&format!(
            "SELECT {MEMBER_COLUMNS} FROM band_members WHERE id = $1 AND band_id = $2"
        ))
        .bind(member_id)
        .bind(scope.band_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(member)
    }

    /// Re-verifies the band even when the caller already has.
    pub async fn add_member(
        &self,
        scope: BandScope,
        req: &MemberRequest,
    ) -> Result<Option<BandMember>, DatabaseError> {
        if !ensure_owned(&self.pool, &scope).await? {
            return Ok(None);
        }
        absent_on_orphan(insert_member(&self.pool, scope.band_id, req).await)
    }

    pub async fn update_member(
        &self,
        scope: BandScope,
        member_id: i32,
        req: &MemberRequest,
    ) -> Result<Option<BandMember>, DatabaseError> {
        if !ensure_owned(&self.pool, &scope).await? {
            return Ok(None);
        }

        let member = sqlx::query_as::<_, BandMember>(&format!(
            "UPDATE band_members
             SET name = $1, role = $2, email = $3, phone = $4, updated_at = NOW()
             WHERE id = $5 AND band_id = $6
             RETURNING {MEMBER_COLUMNS}"
        ))
        .bind(req.name.trim())
        .bind(req.role.trim())
        .bind(req.email())
        .bind(req.phone())
        .bind(member_id)
        .bind(scope.band_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(member)
    }

    pub async fn delete_member(&self, scope: BandScope, member_id: i32) -> Result<bool, DatabaseError> {
        if !ensure_owned(&self.pool, &scope).await? {
            return Ok(false);
        }

        let result = sqlx::query("DELETE FROM band_members WHERE id = $1 AND band_id = $2")
            .bind(member_id)
            .bind(scope.band_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

async fn select_members<'e, E>(executor: E, band_id: i32) -> Result<Vec<BandMember>, DatabaseError>
where
    E: PgExecutor<'e>,
{
    let members = sqlx::query_as::<_, BandMember>(&format!(
        "SELECT {MEMBER_COLUMNS} FROM band_members WHERE band_id = $1 ORDER BY created_at ASC, id ASC"
    ))
    .bind(band_id)
    .fetch_all(executor)
    .await?;
    Ok(members)
}

async fn insert_member<'e, E>(executor: E, band_id: i32, req: &MemberRequest) -> Result<BandMember, DatabaseError>
where
    E: PgExecutor<'e>,
{
    let member = sqlx::query_as::<_, BandMember>(&format!(
        "INSERT INTO band_members (band_id, name, role, email, phone)
         VALUES ($1, $2, $3, $4, $5)
         RETURNING {MEMBER_COLUMNS}"
    ))
    .bind(band_id)
    .bind(req.name.trim())
    .bind(req.role.trim())
    .bind(req.email())
    .bind(req.phone())
    .fetch_one(executor)
    .await?;
    Ok(member)
}
