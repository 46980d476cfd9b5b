//! User service implementation
//!
//! This service handles registration, login and logout, profile management,
//! password changes, avatar uploads and account deletion.

use tracing::{debug, info, warn};
use crate::database::DatabaseService;
use crate::models::{
    ActivityAction, ChangePasswordRequest, CreateUserRequest, EntityType, LoginRequest, PublicUser,
    RegisterRequest, UpdateUserRequest, User, UserStatus,
};
use crate::services::activity::ActivityService;
use crate::services::auth::AuthService;
use crate::services::image_host::ImageHostClient;
use crate::utils::errors::{EventHubError, Result};
use crate::utils::helpers::{is_valid_email, is_valid_username, normalize_whitespace};
use crate::utils::logging::log_user_action;

pub const MIN_PASSWORD_LENGTH: usize = 8;
const MAX_NAME_LENGTH: usize = 100;

/// User service for managing user operations
#[derive(Clone)]
pub struct UserService {
    db: DatabaseService,
    auth: AuthService,
    activity: ActivityService,
    image_host: Option<ImageHostClient>,
}

impl UserService {
    /// Create a new UserService instance
    pub fn new(
        db: DatabaseService,
        auth: AuthService,
        activity: ActivityService,
        image_host: Option<ImageHostClient>,
    ) -> Self {
        Self { db, auth, activity, image_host }
    }

    /// Register a new account and sign it in
    pub async fn register(&self, request: RegisterRequest) -> Result<(User, String)> {
        let name = validate_name(&request.name)?;
        validate_username(&request.username)?;
        validate_email(&request.email)?;
        validate_password(&request.password)?;

        let password_hash = self.auth.hash_password(&request.password)?;
        let created = self.db.users
            .create(CreateUserRequest {
                name,
                username: request.username,
                email: request.email,
                password_hash,
            })
            .await?;

        self.db.users.set_status(created.id, UserStatus::Online).await?;
        let user = User { status: UserStatus::Online, ..created };
        let token = self.auth.issue_token(&user)?;

        info!(user_id = user.id, username = %user.username, "New user registered");
        self.activity
            .record(user.id, ActivityAction::Created, EntityType::User, user.id, &PublicUser::from(&user))
            .await;

        Ok((user, token))
    }

    /// Verify credentials and issue a session token
    pub async fn login(&self, request: LoginRequest) -> Result<(User, String)> {
        let login = request.login.trim();
        let user = match self.db.users.find_by_login(login).await? {
            Some(user) => user,
            None => {
                debug!(login = %login, "Login for unknown user");
                return Err(EventHubError::Unauthorized("Invalid credentials".to_string()));
            }
        };

        if !self.auth.verify_password(&request.password, &user.password_hash)? {
            warn!(user_id = user.id, "Login with wrong password");
            return Err(EventHubError::Unauthorized("Invalid credentials".to_string()));
        }

        self.db.users.set_status(user.id, UserStatus::Online).await?;
        let user = User { status: UserStatus::Online, ..user };
        let token = self.auth.issue_token(&user)?;

        log_user_action(user.id, "login", None);
        Ok((user, token))
    }

    /// Mark the user offline
    pub async fn logout(&self, user_id: i64) -> Result<()> {
        self.db.users.set_status(user_id, UserStatus::Offline).await?;
        log_user_action(user_id, "logout", None);
        Ok(())
    }

    /// Get user by ID
    pub async fn get_user(&self, user_id: i64) -> Result<User> {
        self.db.require_user(user_id).await
    }

    /// Users whose username or name starts with `query`
    pub async fn search(&self, query: &str, limit: i64) -> Result<Vec<PublicUser>> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }
        let users = self.db.users.search(query, limit.clamp(1, 50)).await?;
        Ok(users.iter().map(PublicUser::from).collect())
    }

    /// Update user profile
    pub async fn update_profile(&self, user: &User, mut request: UpdateUserRequest) -> Result<User> {
        // avatars only change through upload_avatar
        request.avatar_url = None;
        if request.is_empty() {
            return Err(EventHubError::Validation("Nothing to update".to_string()));
        }
        if let Some(name) = &request.name {
            request.name = Some(validate_name(name)?);
        }
        if let Some(username) = &request.username {
            validate_username(username)?;
        }
        if let Some(email) = &request.email {
            validate_email(email)?;
        }

        let updated = self.db.users.update(user.id, request).await?;
        info!(user_id = user.id, "User profile updated");
        self.activity
            .record(user.id, ActivityAction::Updated, EntityType::User, user.id, &PublicUser::from(&updated))
            .await;

        Ok(updated)
    }

    /// Replace the password after checking the current one
    pub async fn change_password(&self, user: &User, request: ChangePasswordRequest) -> Result<()> {
        if !self.auth.verify_password(&request.current_password, &user.password_hash)? {
            return Err(EventHubError::Validation("Current password is incorrect".to_string()));
        }
        validate_password(&request.new_password)?;

        let hash = self.auth.hash_password(&request.new_password)?;
        self.db.users.update_password(user.id, &hash).await?;
        log_user_action(user.id, "change_password", None);
        Ok(())
    }

    /// Upload an avatar to the image host and store its URL
    pub async fn upload_avatar(&self, user: &User, filename: &str, bytes: Vec<u8>) -> Result<User> {
        let image_host = self.image_host
            .as_ref()
            .ok_or_else(|| EventHubError::Validation("Avatar upload is not enabled".to_string()))?;

        let url = image_host.upload(filename, bytes).await?;
        let updated = self.db.users
            .update(user.id, UpdateUserRequest { avatar_url: Some(url), ..Default::default() })
            .await?;

        log_user_action(user.id, "upload_avatar", updated.avatar_url.as_deref());
        self.activity
            .record(user.id, ActivityAction::Updated, EntityType::User, user.id, &PublicUser::from(&updated))
            .await;

        Ok(updated)
    }

    /// Delete the account; organizers must remove their events first
    pub async fn delete_account(&self, user: &User) -> Result<()> {
        let organized = self.db.events.count_organized(user.id).await?;
        if organized > 0 {
            return Err(EventHubError::InvalidState(format!(
                "You still organize {} event(s); delete them before deleting your account",
                organized
            )));
        }

        // recorded first: the row's actor reference is nulled by the delete
        self.activity
            .record(user.id, ActivityAction::Deleted, EntityType::User, user.id, &PublicUser::from(user))
            .await;

        if !self.db.users.delete(user.id).await? {
            return Err(EventHubError::not_found("User", user.id));
        }
        info!(user_id = user.id, "User account deleted");
        Ok(())
    }
}

fn validate_name(name: &str) -> Result<String> {
    let name = normalize_whitespace(name);
    if name.is_empty() || name.chars().count() > MAX_NAME_LENGTH {
        return Err(EventHubError::Validation(format!(
            "Name must be between 1 and {} characters",
            MAX_NAME_LENGTH
        )));
    }
    Ok(name)
}

fn validate_username(username: &str) -> Result<()> {
    if !is_valid_username(username) {
        return Err(EventHubError::Validation(
            "Username must be 3-30 letters, digits, dots, dashes or underscores".to_string(),
        ));
    }
    Ok(())
}

fn validate_email(email: &str) -> Result<()> {
    if !is_valid_email(email) {
        return Err(EventHubError::Validation("Invalid email address".to_string()));
    }
    Ok(())
}

fn validate_password(password: &str) -> Result<()> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(EventHubError::Validation(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LENGTH
        )));
    }
    Ok(())
}
