use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts},
};
use axum_extra::extract::CookieJar;
use tracing::warn;
use uuid::Uuid;

use crate::auth::cookies::ACCESS_COOKIE_NAME;
use crate::auth::jwt::JwtKeys;
use crate::error::AuthError;

/// Extracts and validates the access token, returning the user ID.
/// A `Bearer` Authorization header wins; without one the `access_token`
/// cookie is consulted.
#[derive(Debug)]
pub struct AuthUser(pub Uuid);

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    JwtKeys: FromRef<S>,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let keys = JwtKeys::from_ref(state);

        let token = if let Some(auth_header) = parts.headers.get(header::AUTHORIZATION) {
            let value = auth_header
                .to_str()
                .map_err(|_| AuthError::InvalidAccessToken)?;
            value
                .strip_prefix("Bearer ")
                .ok_or(AuthError::InvalidAccessToken)?
                .to_string()
        } else {
            match CookieJar::from_headers(&parts.headers).get(ACCESS_COOKIE_NAME) {
                Some(cookie) => cookie.value().to_string(),
                None => {
                    warn!("request without access token");
                    return Err(AuthError::InvalidAccessToken);
                }
            }
        };

        let claims = keys.verify(&token)?;
        Ok(AuthUser(claims.user_id))
    }
}
