//! Reading and writing the encrypted auth cookie.

use std::cmp::max;

use axum_extra::extract::{
    PrivateCookieJar,
    cookie::{Cookie, SameSite},
};
use time::{Duration, OffsetDateTime, UtcOffset};

use crate::{
    Error,
    auth::{Token, UserID},
};

pub(crate) const COOKIE_TOKEN: &str = "token";
/// The default duration for which auth cookies are valid.
pub const DEFAULT_COOKIE_DURATION: Duration = Duration::minutes(5);

fn build_token_cookie(value: String, expires_at: OffsetDateTime) -> Cookie<'static> {
    Cookie::build((COOKIE_TOKEN, value))
        .expires(expires_at)
        .http_only(true)
        .same_site(SameSite::Strict)
        .secure(true)
        .build()
}

/// Log in `user_id` by adding a token cookie that expires `duration` from now.
///
/// # Errors
///
/// Returns [Error::JSONSerializationError] if the token could not be serialized.
pub fn set_auth_cookie(
    jar: PrivateCookieJar,
    user_id: UserID,
    duration: Duration,
    local_offset: UtcOffset,
) -> Result<PrivateCookieJar, Error> {
    let token = Token::new(user_id, duration, local_offset);
    let value = token.to_cookie_value()?;

    Ok(jar.add(build_token_cookie(value, token.expires_at)))
}

/// Overwrite the token cookie with a placeholder that the client deletes straight away.
pub fn invalidate_auth_cookie(jar: PrivateCookieJar) -> PrivateCookieJar {
    jar.add(
        Cookie::build((COOKIE_TOKEN, "deleted"))
            .expires(OffsetDateTime::UNIX_EPOCH)
            .max_age(Duration::ZERO)
            .http_only(true)
            .same_site(SameSite::Strict)
            .secure(true),
    )
}

/// Read the token from the auth cookie.
///
/// # Errors
///
/// Returns:
/// - [Error::CookieMissing] if there is no auth cookie,
/// - [Error::InvalidToken] if the cookie's value is not a token,
/// - [Error::TokenExpired] if the token has expired.
pub(crate) fn get_token_from_cookies(jar: &PrivateCookieJar) -> Result<Token, Error> {
    let cookie = jar.get(COOKIE_TOKEN).ok_or(Error::CookieMissing)?;
    let token = Token::from_cookie_value(cookie.value_trimmed())?;

    if token.is_expired() {
        return Err(Error::TokenExpired);
    }

    Ok(token)
}

/// Push the token's expiry out to at least `duration` from now.
///
/// A token that already outlives `duration`, e.g. after "remember me", is left as is.
///
/// # Errors
///
/// Returns the same errors as [get_token_from_cookies], and the jar is left untouched.
pub(crate) fn extend_auth_cookie_duration_if_needed(
    jar: PrivateCookieJar,
    duration: Duration,
    local_offset: UtcOffset,
) -> Result<PrivateCookieJar, Error> {
    let token = get_token_from_cookies(&jar)?;
    let extended = Token::new(token.user_id, duration, local_offset);

    let token = Token {
        user_id: token.user_id,
        expires_at: max(token.expires_at, extended.expires_at),
    };
    let value = token.to_cookie_value()?;

    Ok(jar.add(build_token_cookie(value, token.expires_at)))
}
