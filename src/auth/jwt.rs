use std::time::Duration;

use axum::extract::FromRef;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use time::{Duration as TimeDuration, OffsetDateTime};
use tracing::debug;
use uuid::Uuid;

use crate::auth::repo_types::User;
use crate::config::JwtConfig;
use crate::error::AuthError;
use crate::state::AppState;

/// Access-token claims. The frontend decodes `user_id`, `email` and `exp`,
/// so the field names are part of the contract.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub user_id: Uuid,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub username: Option<String>,
    pub iat: usize,
    pub exp: usize,
}

/// Holds JWT signing and verification keys with the access-token TTL.
#[derive(Clone)]
pub struct JwtKeys {
    pub encoding: EncodingKey,
    pub decoding: DecodingKey,
    pub access_ttl: Duration,
}

impl FromRef<AppState> for JwtKeys {
    fn from_ref(state: &AppState) -> Self {
        let JwtConfig { key, ttl_minutes } = state.config.jwt.clone();
        Self {
            encoding: EncodingKey::from_secret(key.as_bytes()),
            decoding: DecodingKey::from_secret(key.as_bytes()),
            access_ttl: Duration::from_secs((ttl_minutes as u64) * 60),
        }
    }
}

impl JwtKeys {
    /// Sign an access token for `user`. Returns the token together with its
    /// expiry so the caller can stamp the cookie with the same instant.
    pub fn sign_access(&self, user: &User) -> Result<(String, OffsetDateTime), AuthError> {
        let now = OffsetDateTime::now_utc();
        let expires_at = now + TimeDuration::seconds(self.access_ttl.as_secs() as i64);
        let claims = Claims {
            user_id: user.id,
            email: user.email.clone(),
            username: user.username.clone(),
            iat: now.unix_timestamp() as usize,
            exp: expires_at.unix_timestamp() as usize,
        };
        let token = encode(&Header::default(), &claims, &self.encoding)
            .map_err(AuthError::TokenCreation)?;
        debug!(user_id = %user.id, "access token signed");
        Ok((token, expires_at))
    }

    /// Verify signature and expiry, returning the claims.
    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        let data = decode::<Claims>(token, &self.decoding, &Validation::default()).map_err(
            |e| {
                debug!(error = %e, "jwt verification failed");
                AuthError::InvalidAccessToken
            },
        )?;
        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys_with_secret(secret: &str) -> JwtKeys {
        JwtKeys {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            access_ttl: Duration::from_secs(5 * 60),
        }
    }

    fn sample_user(username: Option<&str>) -> User {
        User {
            id: Uuid::new_v4(),
            email: "fern@example.com".into(),
            username: username.map(|u| u.to_string()),
            password_hash: "unused".into(),
        }
    }

    #[test]
    fn sign_and_verify_roundtrip() {
        let keys = keys_with_secret("dev-secret");
        let user = sample_user(Some("planter"));
        let (token, expires_at) = keys.sign_access(&user).expect("sign access");
        let claims = keys.verify(&token).expect("verify token");
        assert_eq!(claims.user_id, user.id);
        assert_eq!(claims.email, user.email);
        assert_eq!(claims.username.as_deref(), Some("planter"));
        assert_eq!(claims.exp as i64, expires_at.unix_timestamp());
    }

    #[test]
    fn verify_rejects_expired_token() {
        let keys = keys_with_secret("dev-secret");
        let user = sample_user(None);
        let now = OffsetDateTime::now_utc();
        let claims = Claims {
            user_id: user.id,
            email: user.email.clone(),
            username: None,
            iat: (now - TimeDuration::hours(2)).unix_timestamp() as usize,
            exp: (now - TimeDuration::hours(1)).unix_timestamp() as usize,
        };
        let token = encode(&Header::default(), &claims, &keys.encoding).expect("encode");
        let err = keys.verify(&token).unwrap_err();
        assert!(matches!(err, AuthError::InvalidAccessToken));
    }

    #[test]
    fn verify_rejects_wrong_key() {
        let signer = keys_with_secret("secret-a");
        let other = keys_with_secret("secret-b");
        let (token, _) = signer.sign_access(&sample_user(None)).expect("sign access");
        let err = other.verify(&token).unwrap_err();
        assert!(matches!(err, AuthError::InvalidAccessToken));
    }

    #[test]
    fn claims_json_uses_user_id_string_and_omits_missing_username() {
        let user = sample_user(None);
        let claims = Claims {
            user_id: user.id,
            email: user.email.clone(),
            username: None,
            iat: 1,
            exp: 2,
        };
        let json = serde_json::to_value(&claims).expect("serialize claims");
        assert_eq!(json["user_id"], user.id.to_string());
        assert!(json.get("username").is_none());

        let with_name = Claims {
            username: Some("planter".into()),
            ..claims
        };
        let json = serde_json::to_value(&with_name).expect("serialize claims");
        assert_eq!(json["username"], "planter");
    }

    #[tokio::test]
    async fn keys_from_state_use_configured_ttl() {
        let state = AppState::fake();
        let keys = JwtKeys::from_ref(&state);
        assert_eq!(keys.access_ttl, Duration::from_secs(5 * 60));
    }
}
