use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::{require, within, BandMember, MemberRequest, TITLE_MAX};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Band {
    pub id: i32,
    pub name: String,
    pub description: String,
    pub owner_id: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A band together with its members, as returned by band reads.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BandWithMembers {
    #[serde(flatten)]
    pub band: Band,
    pub members: Vec<BandMember>,
    pub member_count: usize,
}

impl BandWithMembers {
    pub fn new(band: Band, members: Vec<BandMember>) -> Self {
        Self {
            member_count: members.len(),
            band,
            members,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CreateBandRequest {
    pub name: String,
    pub description: String,
    pub members: Vec<MemberRequest>,
}

impl CreateBandRequest {
    pub fn validate(&self) -> Result<(), String> {
        require(&self.name, "Band name is required")?;
        within(&self.name, TITLE_MAX, "Band name")?;
        within(&self.description, usize::MAX, "Description")?;
        self.members.iter().try_for_each(MemberRequest::validate)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct UpdateBandRequest {
    pub name: String,
    pub description: String,
}

impl UpdateBandRequest {
    pub fn validate(&self) -> Result<(), String> {
        require(&self.name, "Band name is required")?;
        within(&self.name, TITLE_MAX, "Band name")?;
        within(&self.description, usize::MAX, "Description")
    }
}
