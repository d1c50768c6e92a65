//! Signed-in principal and bearer token.

use core::fmt;

use crate::models::PrincipalView;

/// The client's authentication state.
///
/// Populated by a successful login and cleared by logout. Holds the bearer
/// token sent on admin-only calls; `Debug` never prints it.
#[derive(Clone, Default)]
pub struct AuthState {
    session: Option<(String, PrincipalView)>,
    last_error: Option<String>,
}

impl AuthState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a successful login.
    pub fn sign_in(&mut self, token: String, user: PrincipalView) {
        self.session = Some((token, user));
        self.last_error = None;
    }

    /// Record a failed login. Any existing session is dropped.
    pub fn fail(&mut self, error: impl Into<String>) {
        self.session = None;
        self.last_error = Some(error.into());
    }

    /// Discard the token and user.
    pub fn sign_out(&mut self) {
        self.session = None;
        self.last_error = None;
    }

    #[must_use]
    pub fn token(&self) -> Option<&str> {
        self.session.as_ref().map(|(token, _)| token.as_str())
    }

    #[must_use]
    pub fn user(&self) -> Option<&PrincipalView> {
        self.session.as_ref().map(|(_, user)| user)
    }

    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        self.session.is_some()
    }

    /// Whether the signed-in principal may use admin-only operations.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.user().is_some_and(|user| user.role.is_admin())
    }

    #[must_use]
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }
}

impl fmt::Debug for AuthState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthState")
            .field("token", &self.token().map(|_| "[REDACTED]"))
            .field("user", &self.user())
            .field("last_error", &self.last_error)
            .finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::types::{Email, PrincipalId, Role};

    fn principal(role: Role) -> PrincipalView {
        PrincipalView {
            id: PrincipalId::new(1),
            email: Email::parse("admin@example.com").unwrap(),
            name: "Admin".to_owned(),
            role,
            is_active: true,
            permissions: Vec::new(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_sign_in_and_out() {
        let mut auth = AuthState::new();
        assert!(!auth.is_authenticated());

        auth.sign_in("tok".to_owned(), principal(Role::Admin));
        assert_eq!(auth.token(), Some("tok"));
        assert!(auth.is_admin());

        auth.sign_out();
        assert!(auth.token().is_none());
        assert!(auth.user().is_none());
    }

    #[test]
    fn test_non_admin_role_is_not_admin() {
        let mut auth = AuthState::new();
        auth.sign_in("tok".to_owned(), principal(Role::Manager));
        assert!(auth.is_authenticated());
        assert!(!auth.is_admin());
    }

    #[test]
    fn test_failure_drops_session() {
        let mut auth = AuthState::new();
        auth.sign_in("tok".to_owned(), principal(Role::Admin));
        auth.fail("Invalid credentials");

        assert!(!auth.is_authenticated());
        assert_eq!(auth.last_error(), Some("Invalid credentials"));
    }

    #[test]
    fn test_debug_hides_token() {
        let mut auth = AuthState::new();
        auth.sign_in("secret-token-value".to_owned(), principal(Role::Admin));
        assert!(!format!("{auth:?}").contains("secret-token-value"));
    }
}
