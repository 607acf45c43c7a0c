use axum_extra::extract::cookie::{Cookie, SameSite};
use time::OffsetDateTime;

pub const ACCESS_COOKIE_NAME: &str = "access_token";
pub const REFRESH_COOKIE_NAME: &str = "refresh_token";

/// Build a session cookie with the hardening attributes shared by both
/// tokens: HttpOnly, Secure, SameSite=Strict, Path=/.
pub fn session_cookie(
    name: &'static str,
    value: String,
    expires: OffsetDateTime,
) -> Cookie<'static> {
    Cookie::build((name, value))
        .path("/")
        .http_only(true)
        .secure(true)
        .same_site(SameSite::Strict)
        .expires(expires)
        .build()
}

/// Build a cookie that instructs the browser to drop `name`: empty value,
/// expiry at the Unix epoch.
pub fn expired_cookie(name: &'static str) -> Cookie<'static> {
    Cookie::build((name, ""))
        .path("/")
        .http_only(true)
        .secure(true)
        .same_site(SameSite::Strict)
        .expires(OffsetDateTime::UNIX_EPOCH)
        .build()
}
