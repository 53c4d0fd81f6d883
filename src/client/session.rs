//! Authenticated identity, passed explicitly to every component.
//!
//! A session is created once after login and consumed by [`SessionContext::end`]
//! on logout. Components never look the credential up on their own.

use crate::{
    client::StockClient,
    errors::Result,
    models::{CurrentUser, Role},
};
use std::fmt;

/// Who is acting, and the credential proving it.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionContext {
    user: CurrentUser,
    credential: String,
}

impl SessionContext {
    /// Session from the result of an external login.
    #[must_use]
    pub fn new(name: impl Into<String>, role: Role, credential: impl Into<String>) -> Self {
        Self {
            user: CurrentUser {
                name: name.into(),
                role,
            },
            credential: credential.into(),
        }
    }

    /// Session for a credential, with the identity confirmed by the service.
    ///
    /// # Errors
    /// Returns [`crate::errors::Error::Unauthorized`] for an unknown credential,
    /// or a transport error.
    pub async fn establish(client: &StockClient, credential: impl Into<String>) -> Result<Self> {
        let credential = credential.into();
        let user: CurrentUser = client.get("/auth/me", &credential).await?;
        tracing::info!(user = %user.name, role = user.role.as_str(), "Session established");
        Ok(Self { user, credential })
    }

    /// The acting user.
    #[must_use]
    pub const fn current_user(&self) -> &CurrentUser {
        &self.user
    }

    /// Bearer credential for requests.
    #[must_use]
    pub fn credential(&self) -> &str {
        &self.credential
    }

    /// Whether admin-only actions should be offered.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.user.role == Role::Admin
    }

    /// Ends the session (logout). The credential is dropped with it.
    pub fn end(self) {
        tracing::info!(user = %self.user.name, "Session ended");
    }
}

impl fmt::Debug for SessionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionContext")
            .field("user", &self.user)
            .field("credential", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::errors::Error;
    use crate::test_utils::*;

    #[test]
    fn test_session_accessors() {
        let session = SessionContext::new("Amira", Role::Admin, "secret");
        assert_eq!(session.current_user().name, "Amira");
        assert_eq!(session.credential(), "secret");
        assert!(session.is_admin());
        assert!(!SessionContext::new("Omar", Role::Staff, "t").is_admin());
    }

    #[test]
    fn test_debug_redacts_credential() {
        let session = SessionContext::new("Amira", Role::Admin, "secret");
        let printed = format!("{session:?}");
        assert!(!printed.contains("secret"));
        assert!(printed.contains("Amira"));
    }

    #[tokio::test]
    async fn test_establish_resolves_identity() -> Result<()> {
        let (base_url, _db) = spawn_test_server().await?;
        let client = StockClient::new(base_url);

        let session = SessionContext::establish(&client, STAFF_TOKEN).await?;
        assert_eq!(session.current_user().name, "Omar");
        assert_eq!(session.current_user().role, Role::Staff);
        session.end();

        let rejected = SessionContext::establish(&client, "unknown").await;
        assert!(matches!(rejected.unwrap_err(), Error::Unauthorized));

        Ok(())
    }
}
