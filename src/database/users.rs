use sqlx::PgPool;

use crate::auth::{hash_password, verify_password};
use crate::database::manager::DatabaseError;
use crate::database::models::{CreateUserRequest, UpdateProfileRequest, User};

const USER_COLUMNS: &str = "id, first_name, last_name, email, password_hash, created_at, updated_at";

/// Credential store: identities and their bcrypt password hashes.
///
/// Lookups return `Option` so "no such user" stays distinct from a failed query.
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Register a new identity. Duplicate email is `DatabaseError::Conflict`.
    pub async fn create(&self, req: &CreateUserRequest) -> Result<User, DatabaseError> {
        let email = req.email.trim();

        if self.find_by_email(email).await?.is_some() {
            return Err(email_taken());
        }

        let password_hash = hash_password(&req.password).await?;

        let result = sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (first_name, last_name, email, password_hash)
             VALUES ($1, $2, $3, $4)
             RETURNING {USER_COLUMNS}"
        ))
        .bind(req.first_name.trim())
        .bind(req.last_name.trim())
        .bind(email)
        .bind(&password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(DatabaseError::from);

        // The pre-check can race with a concurrent registration; the unique
        // index settles it.
        result.map_err(conflict_on_duplicate)
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError> {
        let user = sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1"))
            .bind(email.trim())
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    pub async fn find_by_id(&self, id: i32) -> Result<Option<User>, DatabaseError> {
        let user = sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    /// Compare `password` against the identity's stored hash.
    pub async fn verify_password(&self, user: &User, password: &str) -> Result<bool, DatabaseError> {
        Ok(verify_password(password, &user.password_hash).await?)
    }

    pub async fn update_password(&self, id: i32, new_password: &str) -> Result<(), DatabaseError> {
        let password_hash = hash_password(new_password).await?;

        let result = sqlx::query("UPDATE users SET password_hash = $1, updated_at = NOW() WHERE id = $2")
            .bind(&password_hash)
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound("user not found".to_string()));
        }
        Ok(())
    }

    /// Apply the present fields of `req`; `None` when the identity is gone.
    pub async fn update_profile(
        &self,
        id: i32,
        req: &UpdateProfileRequest,
    ) -> Result<Option<User>, DatabaseError> {
        let email = req.email();

        if let Some(email) = email.as_deref() {
            if let Some(existing) = self.find_by_email(email).await? {
                if existing.id != id {
                    return Err(email_taken());
                }
            }
        }

        let result = sqlx::query_as::<_, User>(&format!(
            "UPDATE users
             SET first_name = COALESCE($1, first_name),
                 last_name = COALESCE($2, last_name),
                 email = COALESCE($3, email),
                 updated_at = NOW()
             WHERE id = $4
             RETURNING {USER_COLUMNS}"
        ))
        .bind(req.first_name.as_deref().map(str::trim))
        .bind(req.last_name.as_deref().map(str::trim))
        .bind(email)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(DatabaseError::from);

        result.map_err(conflict_on_duplicate)
    }

    /// Remove the identity; owned bands go with it through the FK cascade.
    pub async fn delete(&self, id: i32) -> Result<bool, DatabaseError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

fn email_taken() -> DatabaseError {
    DatabaseError::Conflict("Email already registered".to_string())
}

fn conflict_on_duplicate(err: DatabaseError) -> DatabaseError {
    if err.is_unique_violation() {
        email_taken()
    } else {
        err
    }
}
