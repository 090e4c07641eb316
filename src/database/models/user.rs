use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::{require, trimmed, within, EMAIL_MAX, PERSON_NAME_MAX};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CreateUserRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
}

impl CreateUserRequest {
    pub fn validate(&self) -> Result<(), String> {
        if self.email.trim().is_empty() || self.password.is_empty() {
            return Err("Email and password are required".to_string());
        }
        validate_email(&self.email)?;
        within(&self.first_name, PERSON_NAME_MAX, "First name")?;
        within(&self.last_name, PERSON_NAME_MAX, "Last name")
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl LoginRequest {
    pub fn validate(&self) -> Result<(), String> {
        if self.email.trim().is_empty() || self.password.is_empty() {
            return Err("Email and password are required".to_string());
        }
        Ok(())
    }
}

/// Partial profile update; absent fields keep their stored value.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct UpdateProfileRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
}

impl UpdateProfileRequest {
    pub fn validate(&self) -> Result<(), String> {
        if let Some(email) = self.email.as_deref() {
            validate_email(email)?;
        }
        within(self.first_name.as_deref().unwrap_or_default(), PERSON_NAME_MAX, "First name")?;
        within(self.last_name.as_deref().unwrap_or_default(), PERSON_NAME_MAX, "Last name")
    }

    pub fn email(&self) -> Option<String> {
        self.email.as_deref().map(trimmed)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

impl ChangePasswordRequest {
    pub fn validate(&self) -> Result<(), String> {
        require(&self.current_password, "Current password is required")?;
        require(&self.new_password, "New password is required")
    }
}

/// One `@`, with something on both sides of it.
pub fn validate_email(email: &str) -> Result<(), String> {
    let email = email.trim();
    within(email, EMAIL_MAX, "Email")?;
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() && !domain.contains('@') => Ok(()),
        _ => Err("Invalid email format".to_string()),
    }
}
