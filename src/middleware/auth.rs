//! Authentication middleware
//!
//! Extractors that resolve the session token (cookie or `Authorization: Bearer`)
//! to the calling user, and restrict admin routes to users holding a grant.

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header, request::Parts, HeaderMap},
};
use cookie::Cookie;
use tracing::{debug, warn};
use crate::models::User;
use crate::state::AppState;
use crate::utils::errors::{EventHubError, Result};

/// Authenticated caller
#[derive(Debug, Clone)]
pub struct AuthUser(pub User);

/// Authenticated caller with an admin grant
#[derive(Debug, Clone)]
pub struct AdminUser(pub User);

/// Pull the session token out of the request, cookie first
pub fn session_token(headers: &HeaderMap, cookie_name: &str) -> Option<String> {
    let from_cookie = headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|raw| Cookie::split_parse(raw).filter_map(|c| c.ok()))
        .find(|c| c.name() == cookie_name && !c.value().is_empty())
        .map(|c| c.value().to_string());

    from_cookie.or_else(|| {
        headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
    })
}

async fn authenticate(parts: &Parts, state: &AppState) -> Result<User> {
    let auth = &state.services.auth_service;
    let token = session_token(&parts.headers, auth.cookie_name())
        .ok_or_else(|| EventHubError::Unauthorized("Not authenticated".to_string()))?;

    let claims = auth.verify_token(&token).map_err(|e| {
        debug!(error = %e, "Rejected session token");
        EventHubError::Unauthorized("Invalid or expired session".to_string())
    })?;

    // A token may outlive its account
    state.services.db.users.find_by_id(claims.sub).await?.ok_or_else(|| {
        warn!(user_id = claims.sub, "Session token for a missing user");
        EventHubError::Unauthorized("Account no longer exists".to_string())
    })
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = EventHubError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self> {
        authenticate(parts, state).await.map(AuthUser)
    }
}

#[async_trait]
impl FromRequestParts<AppState> for AdminUser {
    type Rejection = EventHubError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self> {
        let user = authenticate(parts, state).await?;

        if !state.settings.features.admin_panel {
            return Err(EventHubError::Forbidden("Admin panel is disabled".to_string()));
        }

        if !state.services.admin_service.is_admin(user.id).await? {
            warn!(user_id = user.id, "Unauthorized admin access attempt");
            return Err(EventHubError::Forbidden("Admin privileges required".to_string()));
        }

        debug!(user_id = user.id, "Admin authentication successful");
        Ok(AdminUser(user))
    }
}
