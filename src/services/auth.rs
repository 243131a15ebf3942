//! Authentication service: account registration, login, JWT issuance

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::Utc;
use validator::Validate;

use crate::{
    config::AuthConfig,
    error::{AppError, AppResult},
    models::user::{RegisterUser, Role, User, UserClaims},
    repository::Repository,
};

#[derive(Clone)]
pub struct AuthService {
    repository: Repository,
    config: AuthConfig,
}

impl AuthService {
    pub fn new(repository: Repository, config: AuthConfig) -> Self {
        Self { repository, config }
    }

    /// Register a new member account
    pub async fn register(&self, request: RegisterUser) -> AppResult<User> {
        request.validate()?;

        if self.repository.users.email_exists(&request.email).await? {
            return Err(AppError::Conflict(format!(
                "A user with email {} already exists",
                request.email
            )));
        }

        let password_hash = Self::hash_password(&request.password)?;

        let user = self
            .repository
            .users
            .create(
                &request.email,
                &password_hash,
                request.first_name.as_deref(),
                request.last_name.as_deref(),
                Role::Member,
            )
            .await?;

        tracing::info!("User {} registered: {}", user.id, user.email);

        Ok(user)
    }

    /// Verify credentials and issue a JWT token
    pub async fn login(&self, email: &str, password: &str) -> AppResult<(String, User)> {
        let user = self
            .repository
            .users
            .get_by_email(email)
            .await?
            .ok_or_else(|| AppError::Authentication("Invalid email or password".to_string()))?;

        Self::verify_password(password, &user.password_hash)
            .map_err(|_| AppError::Authentication("Invalid email or password".to_string()))?;

        let now = Utc::now().timestamp();
        let claims = UserClaims {
            sub: user.email.clone(),
            user_id: user.id,
            role: user.role,
            exp: now + (self.config.jwt_expiration_hours as i64) * 3600,
            iat: now,
        };

        let token = claims
            .create_token(&self.config.jwt_secret)
            .map_err(|e| AppError::Internal(format!("Failed to create token: {}", e)))?;

        Ok((token, user))
    }

    /// Get user by ID
    pub async fn get_user(&self, id: i32) -> AppResult<User> {
        self.repository.users.get_by_id(id).await
    }

    fn hash_password(password: &str) -> AppResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))
    }

    fn verify_password(password: &str, hash: &str) -> Result<(), argon2::password_hash::Error> {
        let parsed = PasswordHash::new(hash)?;
        Argon2::default().verify_password(password.as_bytes(), &parsed)
    }
}
