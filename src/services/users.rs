//! Authentication and user management service

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::Utc;
use uuid::Uuid;
use validator::Validate;

use crate::{
    config::AuthConfig,
    error::{AppError, AppResult},
    models::user::{AddMember, MemberSummary, RegisterUser, Role, User, UserClaims},
    repository::Repository,
};

/// Password assigned to admin-created members until they change it
const DEFAULT_MEMBER_PASSWORD: &str = "password123";

#[derive(Clone)]
pub struct UsersService {
    repository: Repository,
    config: AuthConfig,
}

impl UsersService {
    pub fn new(repository: Repository, config: AuthConfig) -> Self {
        Self { repository, config }
    }

    /// Authenticate user by email and return a JWT token
    pub async fn authenticate(&self, email: &str, password: &str) -> AppResult<(String, User)> {
        let user = self
            .repository
            .users
            .get_by_email(email)
            .await?
            .ok_or_else(|| AppError::Authentication("Invalid credentials".to_string()))?;

        if !self.verify_password(&user, password)? {
            return Err(AppError::Authentication("Invalid credentials".to_string()));
        }

        let token = self.create_token_for_user(&user)?;
        Ok((token, user))
    }

    /// Register a new user. Role defaults to member; admins are only
    /// created through seeding or by another admin.
    pub async fn register(&self, request: RegisterUser) -> AppResult<(String, User)> {
        request
            .validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        if self.repository.users.email_exists(&request.email).await? {
            return Err(AppError::Conflict(
                "User with this email already exists".to_string(),
            ));
        }

        if self
            .repository
            .users
            .username_exists(&request.username)
            .await?
        {
            return Err(AppError::Conflict("Username already exists".to_string()));
        }

        let password_hash = self.hash_password(&request.password)?;
        let user = self
            .repository
            .users
            .create(&request, &password_hash, Role::Member)
            .await?;

        tracing::info!("Registered new member {} ({})", user.username, user.id);

        let token = self.create_token_for_user(&user)?;
        Ok((token, user))
    }

    /// Add a member account directly, with the default password.
    /// The email doubles as the username since none is supplied.
    pub async fn add_member(&self, request: AddMember) -> AppResult<User> {
        request
            .validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        if self.repository.users.email_exists(&request.email).await? {
            return Err(AppError::Conflict(
                "User with this email already exists".to_string(),
            ));
        }

        let member = RegisterUser {
            username: request.email.clone(),
            name: request.name,
            email: request.email,
            password: DEFAULT_MEMBER_PASSWORD.to_string(),
            phone: request.phone,
        };
        let password_hash = self.hash_password(&member.password)?;
        let user = self
            .repository
            .users
            .create(&member, &password_hash, Role::Member)
            .await?;

        tracing::info!("Admin added member {} ({})", user.email, user.id);
        Ok(user)
    }

    /// Seed the default admin account on first run.
    /// Skipped as soon as any admin-role user exists.
    pub async fn seed_admin(&self) -> AppResult<()> {
        if self.repository.users.admin_exists().await? {
            return Ok(());
        }

        let admin = RegisterUser {
            username: "admin".to_string(),
            name: "Library Administrator".to_string(),
            email: "admin@leafstack.com".to_string(),
            password: "admin123".to_string(),
            phone: None,
        };
        let password_hash = self.hash_password(&admin.password)?;
        let user = self
            .repository
            .users
            .create(&admin, &password_hash, Role::Admin)
            .await?;

        tracing::info!("Seeded default admin account {} ({})", user.email, user.id);
        Ok(())
    }

    /// Create JWT token for a user
    fn create_token_for_user(&self, user: &User) -> AppResult<String> {
        let now = Utc::now().timestamp();
        let exp = now + (self.config.jwt_expiration_hours as i64 * 3600);

        let claims = UserClaims {
            sub: user.id.to_string(),
            user_id: user.id,
            email: user.email.clone(),
            role: user.role,
            exp,
            iat: now,
        };

        claims
            .create_token(&self.config.jwt_secret)
            .map_err(|e| AppError::Internal(format!("Failed to create token: {}", e)))
    }

    /// Verify user password
    fn verify_password(&self, user: &User, password: &str) -> AppResult<bool> {
        let parsed_hash = PasswordHash::new(&user.password)
            .map_err(|_| AppError::Internal("Invalid password hash".to_string()))?;
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok())
    }

    /// Hash a password using Argon2
    fn hash_password(&self, password: &str) -> AppResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();
        let hash = argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))?;
        Ok(hash.to_string())
    }

    /// Get user by ID
    pub async fn get_by_id(&self, id: Uuid) -> AppResult<User> {
        self.repository.users.get_by_id(id).await
    }

    /// List member-role users for the admin roster
    pub async fn list_members(&self) -> AppResult<Vec<MemberSummary>> {
        let members = self.repository.users.list_members().await?;
        Ok(members.into_iter().map(MemberSummary::from).collect())
    }

    /// Delete a user and cascade their borrow history
    pub async fn delete_user(&self, id: Uuid) -> AppResult<()> {
        self.repository.users.delete(id).await?;
        tracing::info!("Deleted user {} and their borrow history", id);
        Ok(())
    }
}
