use serde::Serialize;
use thiserror::Error;

use crate::auth::{password, IssuedToken, TokenError, TokenService};
use crate::database::models::{ChangePasswordRequest, CreateUserRequest, LoginRequest, User};
use crate::database::{DatabaseError, UserRepository};

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Email already registered")]
    EmailTaken,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Unauthenticated")]
    Unauthenticated,

    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Token(#[from] TokenError),

    #[error(transparent)]
    Store(DatabaseError),
}

impl From<DatabaseError> for AuthError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::Conflict(_) => AuthError::EmailTaken,
            other => AuthError::Store(other),
        }
    }
}

impl From<password::PasswordError> for AuthError {
    fn from(err: password::PasswordError) -> Self {
        AuthError::Store(DatabaseError::Hash(err))
    }
}

/// An identity together with a freshly issued token.
#[derive(Debug, Clone, Serialize)]
pub struct Session {
    pub token: String,
    pub expires_at: chrono::DateTime<chrono::Utc>,
    pub user: User,
}

impl Session {
    fn new(user: User, issued: IssuedToken) -> Self {
        Self {
            token: issued.token,
            expires_at: issued.expires_at,
            user,
        }
    }
}

/// Registration, login and per-request authentication.
#[derive(Clone)]
pub struct AuthService {
    users: UserRepository,
    tokens: TokenService,
}

impl AuthService {
    pub fn new(users: UserRepository, tokens: TokenService) -> Self {
        Self { users, tokens }
    }

    pub fn tokens(&self) -> &TokenService {
        &self.tokens
    }

    pub async fn register(&self, req: &CreateUserRequest) -> Result<Session, AuthError> {
        req.validate().map_err(AuthError::Validation)?;

        let user = self.users.create(req).await?;
        let issued = self.tokens.issue(user.id, &user.email)?;

        tracing::info!(user_id = user.id, "Registered new user");
        Ok(Session::new(user, issued))
    }

    /// Unknown email and wrong password are indistinguishable to the caller.
    pub async fn login(&self, req: &LoginRequest) -> Result<Session, AuthError> {
        req.validate().map_err(AuthError::Validation)?;

        let Some(user) = self.users.find_by_email(&req.email).await? else {
            password::verify_dummy(&req.password).await?;
            tracing::warn!("Login failed: unknown email");
            return Err(AuthError::InvalidCredentials);
        };

        if !self.users.verify_password(&user, &req.password).await? {
            tracing::warn!(user_id = user.id, "Login failed: wrong password");
            return Err(AuthError::InvalidCredentials);
        }

        let issued = self.tokens.issue(user.id, &user.email)?;
        tracing::info!(user_id = user.id, "User logged in");
        Ok(Session::new(user, issued))
    }

    /// Replace the password after re-checking the current one.
    pub async fn change_password(&self, user_id: i32, req: &ChangePasswordRequest) -> Result<(), AuthError> {
        req.validate().map_err(AuthError::Validation)?;

        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or(AuthError::Unauthenticated)?;

        if !self.users.verify_password(&user, &req.current_password).await? {
            tracing::warn!(user_id, "Password change rejected: current password mismatch");
            return Err(AuthError::InvalidCredentials);
        }

        self.users.update_password(user_id, &req.new_password).await?;
        tracing::info!(user_id, "Password changed");
        Ok(())
    }

    /// Validate `token` and confirm its subject still exists.
    ///
    /// Every token failure, and a subject deleted after issuance, is
    /// `Unauthenticated`. Store failures propagate as `Store`.
    pub async fn authenticate(&self, token: &str) -> Result<User, AuthError> {
        let claims = self.tokens.validate(token).map_err(|e| {
            tracing::warn!("Token rejected: {}", e);
            AuthError::Unauthenticated
        })?;

        match self.users.find_by_id(claims.user_id).await? {
            Some(user) => Ok(user),
            None => {
                tracing::warn!(user_id = claims.user_id, "Token subject no longer exists");
                Err(AuthError::Unauthenticated)
            }
        }
    }
}
