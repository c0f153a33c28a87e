//! Middleware that only lets requests with a valid auth cookie through.

use axum::{
    extract::{FromRef, FromRequestParts, Request, State},
    http::{StatusCode, header::SET_COOKIE},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};
use axum_htmx::HxRedirect;
use time::Duration;

use crate::{
    AppState,
    auth::{
        build_log_in_redirect_url,
        cookie::{extend_auth_cookie_duration_if_needed, get_token_from_cookies},
    },
    timezone::get_local_offset,
};

/// How long a session is kept alive after each request.
const SESSION_EXTENSION: Duration = Duration::minutes(5);

/// The state needed for the auth middleware
#[derive(Clone)]
pub struct AuthState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
    /// The local timezone as a canonical timezone name, e.g. "Asia/Kolkata".
    pub local_timezone: String,
}

impl FromRef<AppState> for AuthState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

impl FromRef<AuthState> for Key {
    fn from_ref(state: &AuthState) -> Self {
        state.cookie_key.clone()
    }
}

/// Run `request` if it carries a valid token, otherwise answer with `redirect_to_log_in`.
///
/// The user's ID is added to the request extensions, and the session is
/// extended on the way out.
async fn auth_guard_internal(
    state: AuthState,
    request: Request,
    next: Next,
    redirect_to_log_in: impl Fn(String) -> Response,
) -> Response {
    let log_in_url = build_log_in_redirect_url(&request);

    let Some(local_offset) = get_local_offset(&state.local_timezone) else {
        tracing::error!(
            "Invalid timezone {}. Redirecting to log in page.",
            state.local_timezone
        );
        return redirect_to_log_in(log_in_url);
    };

    let (mut parts, body) = request.into_parts();
    let jar = match PrivateCookieJar::from_request_parts(&mut parts, &state).await {
        Ok(jar) => jar,
        Err(error) => {
            tracing::error!("Could not get cookie jar: {error:?}. Redirecting to log in page.");
            return redirect_to_log_in(log_in_url);
        }
    };

    let user_id = match get_token_from_cookies(&jar) {
        Ok(token) => token.user_id,
        Err(error) => {
            tracing::debug!("Rejected request to {}: {error}", parts.uri);
            return redirect_to_log_in(log_in_url);
        }
    };

    parts.extensions.insert(user_id);
    let response = next.run(Request::from_parts(parts, body)).await;

    let jar = match extend_auth_cookie_duration_if_needed(jar.clone(), SESSION_EXTENSION, local_offset)
    {
        Ok(extended_jar) => extended_jar,
        Err(error) => {
            tracing::error!("Could not extend session: {error}. Keeping the old cookie.");
            jar
        }
    };

    let (mut parts, body) = response.into_parts();
    for cookie in jar.into_response().headers().get_all(SET_COOKIE) {
        parts.headers.append(SET_COOKIE, cookie.to_owned());
    }

    Response::from_parts(parts, body)
}

/// Guard for pages: sends logged out users to the log-in page with a 303 redirect.
///
/// Handlers behind this guard can take `Extension(user_id): Extension<UserID>`.
pub async fn auth_guard(State(state): State<AuthState>, request: Request, next: Next) -> Response {
    auth_guard_internal(state, request, next, |log_in_url| {
        Redirect::to(&log_in_url).into_response()
    })
    .await
}

/// Guard for HTMX endpoints: sends logged out users to the log-in page with an `HX-Redirect`.
///
/// Handlers behind this guard can take `Extension(user_id): Extension<UserID>`.
pub async fn auth_guard_hx(
    State(state): State<AuthState>,
    request: Request,
    next: Next,
) -> Response {
    auth_guard_internal(state, request, next, |log_in_url| {
        (HxRedirect(log_in_url), StatusCode::OK).into_response()
    })
    .await
}
