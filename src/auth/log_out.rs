//! Log-out route handler.

use axum::response::{IntoResponse, Redirect, Response};
use axum_extra::extract::PrivateCookieJar;

use crate::{auth::invalidate_auth_cookie, endpoints};

/// Invalidate the auth cookie and send the client back to the home page.
pub async fn get_log_out(jar: PrivateCookieJar) -> Response {
    let jar = invalidate_auth_cookie(jar);

    (jar, Redirect::to(endpoints::ROOT)).into_response()
}

#[cfg(test)]
mod log_out_tests {
    use axum::http::{StatusCode, header::SET_COOKIE};
    use axum_extra::extract::{PrivateCookieJar, cookie::Cookie};
    use time::{Duration, OffsetDateTime, UtcOffset};

    use crate::{
        app_state::create_cookie_key,
        auth::{COOKIE_TOKEN, DEFAULT_COOKIE_DURATION, UserID, set_auth_cookie},
        endpoints,
    };

    use super::get_log_out;

    #[tokio::test]
    async fn log_out_deletes_token_and_goes_home() {
        let jar = set_auth_cookie(
            PrivateCookieJar::new(create_cookie_key("42")),
            UserID::new(123),
            DEFAULT_COOKIE_DURATION,
            UtcOffset::UTC,
        )
        .unwrap();

        let response = get_log_out(jar).await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers().get("location").unwrap(), endpoints::ROOT);

        let token_cookie = response
            .headers()
            .get_all(SET_COOKIE)
            .iter()
            .filter_map(|header| Cookie::parse(header.to_str().ok()?.to_owned()).ok())
            .find(|cookie| cookie.name() == COOKIE_TOKEN)
            .expect("No token cookie in response");

        assert_eq!(
            token_cookie.expires_datetime(),
            Some(OffsetDateTime::UNIX_EPOCH)
        );
        assert_eq!(token_cookie.max_age(), Some(Duration::ZERO));
    }
}
