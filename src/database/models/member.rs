use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::{within, EMAIL_MAX, PHONE_MAX, ROLE_MAX, TITLE_MAX};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct BandMember {
    pub id: i32,
    pub band_id: i32,
    pub name: String,
    pub role: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MemberRequest {
    pub name: String,
    pub role: String,
    pub email: Option<String>,
    pub phone: Option<String>,
}

impl MemberRequest {
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() || self.role.trim().is_empty() {
            return Err("Name and role are required".to_string());
        }
        within(&self.name, TITLE_MAX, "Name")?;
        within(&self.role, ROLE_MAX, "Role")?;
        within(self.email().unwrap_or_default(), EMAIL_MAX, "Email")?;
        within(self.phone().unwrap_or_default(), PHONE_MAX, "Phone")
    }

    /// Blank optional contact fields are stored as NULL.
    pub fn email(&self) -> Option<&str> {
        non_blank(self.email.as_deref())
    }

    pub fn phone(&self) -> Option<&str> {
        non_blank(self.phone.as_deref())
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_and_role_required() {
        let req = MemberRequest {
            name: "Alice".into(),
            ..Default::default()
        };
        assert_eq!(req.validate().unwrap_err(), "Name and role are required");
    }

    #[test]
    fn contact_fields_fit_their_columns() {
        let mut req = MemberRequest {
            name: "Alice".into(),
            role: "Drums".into(),
            phone: Some("5".repeat(PHONE_MAX)),
            ..Default::default()
        };
        assert!(req.validate().is_ok());

        req.phone = Some("5".repeat(PHONE_MAX + 1));
        assert_eq!(req.validate().unwrap_err(), "Phone must be at most 50 characters");

        req.phone = None;
        req.email = Some(format!("{}@x.com", "a".repeat(EMAIL_MAX)));
        assert_eq!(req.validate().unwrap_err(), "Email must be at most 255 characters");

        req.email = None;
        req.name = "x".repeat(TITLE_MAX + 1);
        assert_eq!(req.validate().unwrap_err(), "Name must be at most 255 characters");
    }

    #[test]
    fn blank_contacts_become_none() {
        let req = MemberRequest {
            name: "Alice".into(),
            role: "Drums".into(),
            email: Some("  ".into()),
            phone: Some(" 555 ".into()),
        };
        assert!(req.validate().is_ok());
        assert_eq!(req.email(), None);
        assert_eq!(req.phone(), Some("555"));
    }
}
