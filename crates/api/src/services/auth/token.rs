//! Signed session tokens (HS256 JWT).

use core::fmt;

use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use orchard_core::models::PrincipalView;
use orchard_core::{PrincipalId, Role};

use super::AuthError;

/// Lifetime of an issued token.
pub const TOKEN_TTL_HOURS: i64 = 24;

/// Claims carried by a session token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Principal ID.
    pub sub: PrincipalId,
    pub email: String,
    pub role: Role,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    /// Claims for `principal`, valid for [`TOKEN_TTL_HOURS`] from now.
    #[must_use]
    pub fn for_principal(principal: &PrincipalView) -> Self {
        let now = Utc::now();
        Self {
            sub: principal.id,
            email: principal.email.to_string(),
            role: principal.role,
            iat: now.timestamp(),
            exp: (now + Duration::hours(TOKEN_TTL_HOURS)).timestamp(),
        }
    }
}

/// Signing and verification keys derived from the configured secret.
#[derive(Clone)]
pub struct TokenKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl TokenKeys {
    #[must_use]
    pub fn from_secret(secret: &SecretString) -> Self {
        let bytes = secret.expose_secret().as_bytes();
        Self {
            encoding: EncodingKey::from_secret(bytes),
            decoding: DecodingKey::from_secret(bytes),
        }
    }

    /// Sign `claims` into a compact token.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::TokenEncoding` if signing fails.
    pub fn sign(&self, claims: &Claims) -> Result<String, AuthError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding)
            .map_err(AuthError::TokenEncoding)
    }

    /// Verify a token's signature and expiry and return its claims.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::TokenExpired` for an expired token and
    /// `AuthError::InvalidToken` for any other validation failure.
    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        let validation = Validation::new(Algorithm::HS256);
        let data = decode::<Claims>(token, &self.decoding, &validation)?;
        Ok(data.claims)
    }
}

impl fmt::Debug for TokenKeys {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("TokenKeys([REDACTED])")
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use orchard_core::Email;

    use super::*;

    fn keys(secret: &str) -> TokenKeys {
        TokenKeys::from_secret(&SecretString::from(secret.to_owned()))
    }

    fn principal() -> PrincipalView {
        PrincipalView {
            id: PrincipalId::new(7),
            email: Email::parse("owner@orchard.test").unwrap(),
            name: "Owner".to_owned(),
            role: Role::SuperAdmin,
            is_active: true,
            permissions: Vec::new(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_sign_and_verify() {
        let keys = keys("k3Y!9zQ@w7#Lm2$Xp5%Rt8^Vb4&Nc6*J");
        let claims = Claims::for_principal(&principal());
        let token = keys.sign(&claims).unwrap();

        let decoded = keys.verify(&token).unwrap();
        assert_eq!(decoded.sub, PrincipalId::new(7));
        assert_eq!(decoded.email, "owner@orchard.test");
        assert_eq!(decoded.role, Role::SuperAdmin);
        assert_eq!(decoded.exp - decoded.iat, TOKEN_TTL_HOURS * 3600);
    }

    #[test]
    fn test_expired_token_rejected() {
        let keys = keys("k3Y!9zQ@w7#Lm2$Xp5%Rt8^Vb4&Nc6*J");
        let mut claims = Claims::for_principal(&principal());
        claims.iat -= 3 * 24 * 3600;
        claims.exp = claims.iat + 3600;
        let token = keys.sign(&claims).unwrap();

        assert!(matches!(keys.verify(&token), Err(AuthError::TokenExpired)));
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = keys("k3Y!9zQ@w7#Lm2$Xp5%Rt8^Vb4&Nc6*J")
            .sign(&Claims::for_principal(&principal()))
            .unwrap();

        let other = keys("Zx8&Wq2!Hy6@Pl4#Mn0$Ks9%Dj3^Fg7*");
        assert!(matches!(other.verify(&token), Err(AuthError::InvalidToken(_))));
        assert!(matches!(other.verify("not.a.token"), Err(AuthError::InvalidToken(_))));
    }

    #[test]
    fn test_debug_is_redacted() {
        assert_eq!(format!("{:?}", keys("anything")), "TokenKeys([REDACTED])");
    }
}
