//! Bearer-credential authentication.
//!
//! Credentials are issued outside this service; the directory only maps a
//! presented token to the identity configured for it. Role checks happen
//! here too, so the client-side admin gate is advisory only.

use crate::{
    api::{AppState, error::ApiError},
    config::app::UserConfig,
    errors::Error,
    models::{CurrentUser, Role},
};
use axum::{
    Json, async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use std::collections::HashMap;

/// The authenticated caller of a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    /// Display name, stamped into `addedBy` / `soldBy`
    pub name: String,
    /// Role
    pub role: Role,
}

impl Identity {
    /// Fails with [`Error::Forbidden`] unless the caller is an administrator.
    ///
    /// # Errors
    /// Returns [`Error::Forbidden`] for non-admin identities.
    pub fn require_admin(&self, action: &str) -> Result<(), Error> {
        if self.role == Role::Admin {
            Ok(())
        } else {
            tracing::warn!(user = %self.name, action, "Admin-only action refused");
            Err(Error::Forbidden {
                action: action.to_string(),
            })
        }
    }
}

/// Token → identity lookup table.
#[derive(Debug, Default, Clone)]
pub struct UserDirectory {
    by_token: HashMap<String, Identity>,
}

impl UserDirectory {
    /// Builds the directory from `[[users]]` entries.
    #[must_use]
    pub fn from_config(users: &[UserConfig]) -> Self {
        let by_token = users
            .iter()
            .map(|user| {
                (
                    user.token.clone(),
                    Identity {
                        name: user.name.clone(),
                        role: user.role,
                    },
                )
            })
            .collect();
        Self { by_token }
    }

    /// Identity for a presented token.
    #[must_use]
    pub fn resolve(&self, token: &str) -> Option<&Identity> {
        self.by_token.get(token)
    }

    /// Number of configured users.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_token.len()
    }

    /// Whether no users are configured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_token.is_empty()
    }
}

#[async_trait]
impl FromRequestParts<AppState> for Identity {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(str::trim)
            .ok_or(ApiError(Error::Unauthorized))?;

        state
            .users
            .resolve(token)
            .cloned()
            .ok_or(ApiError(Error::Unauthorized))
    }
}

/// `GET /auth/me`
pub async fn me(identity: Identity) -> Json<CurrentUser> {
    Json(CurrentUser {
        name: identity.name,
        role: identity.role,
    })
}
