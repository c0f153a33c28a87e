//! The log-in page and the endpoint that checks a user's email and password.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::{Form, PrivateCookieJar, cookie::Key};
use axum_htmx::HxRedirect;
use maud::{Markup, html};
use rusqlite::Connection;
use serde::Deserialize;
use time::Duration;

use crate::{
    AppState, Error,
    auth::{
        invalidate_auth_cookie, normalize_redirect_url, set_auth_cookie,
        user::{Email, get_user_by_email},
    },
    endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, base, link, loading_spinner, log_in_register, password_input,
        text_input,
    },
    timezone::get_local_offset,
};

pub const UNKNOWN_EMAIL_ERROR_MSG: &str = "That email address doesn't exist, please try again.";
pub const INVALID_CREDENTIALS_ERROR_MSG: &str = "Incorrect password, please try again.";
const INTERNAL_ERROR_MSG: &str = "An internal error occurred. Please try again later.";

/// How long the auth cookie should last if the user selects "remember me" at log-in.
const REMEMBER_ME_COOKIE_DURATION: Duration = Duration::days(7);

#[derive(Default)]
struct LogInFormErrors<'a> {
    email: Option<&'a str>,
    password: Option<&'a str>,
}

fn log_in_form(email: &str, errors: LogInFormErrors, redirect_url: Option<&str>) -> Markup {
    html! {
        form
            hx-post=(endpoints::LOG_IN_API)
            hx-swap="outerHTML"
            hx-indicator="#indicator"
            hx-disabled-elt="#email, #password, #submit-button"
            class="space-y-4 md:space-y-6"
        {
            @if let Some(redirect_url) = redirect_url {
                input type="hidden" name="redirect_url" value=(redirect_url);
            }

            (text_input("email", "Email", "email", email, errors.email))

            (password_input("", 0, errors.password))

            div class="flex items-center gap-x-3"
            {
                input
                    type="checkbox"
                    name="remember_me"
                    id="remember_me"
                    class="rounded-xs";

                label
                    for="remember_me"
                    class="block text-sm font-medium text-gray-900 dark:text-white"
                {
                    "Keep me logged in for one week"
                }
            }

            button type="submit" id="submit-button" class=(BUTTON_PRIMARY_STYLE)
            {
                span class="inline htmx-indicator" id="indicator" { (loading_spinner()) }
                "Log in"
            }

            p class="text-sm font-light text-gray-500 dark:text-gray-400"
            {
                "Don't have an account? "
                (link(endpoints::REGISTER_VIEW, "Register here"))
            }
        }
    }
}

fn parse_redirect_url(raw_url: Option<&str>, source: &str) -> Option<String> {
    let raw_url = raw_url?;
    let redirect_url = normalize_redirect_url(raw_url);

    if redirect_url.is_none() {
        tracing::warn!("Invalid redirect URL from {source}: {raw_url}");
    }

    redirect_url
}

#[derive(Deserialize)]
pub struct RedirectQuery {
    pub redirect_url: Option<String>,
}

/// Display the log-in page.
pub async fn get_log_in_page(Query(query): Query<RedirectQuery>) -> Response {
    let redirect_url = parse_redirect_url(query.redirect_url.as_deref(), "log-in query");
    let form = log_in_form("", LogInFormErrors::default(), redirect_url.as_deref());
    let content = log_in_register("Log in to your account", &form);

    base("Log In", &[], &content).into_response()
}

/// The state needed to perform a login.
#[derive(Debug, Clone)]
pub struct LoginState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
    /// The duration for which cookies used for authentication are valid.
    pub cookie_duration: Duration,
    /// The local timezone as a canonical timezone name, e.g. "Asia/Kolkata".
    pub local_timezone: String,
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for LoginState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            cookie_duration: state.cookie_duration,
            local_timezone: state.local_timezone.clone(),
            db_connection: state.db_connection.clone(),
        }
    }
}

impl FromRef<LoginState> for Key {
    fn from_ref(state: &LoginState) -> Self {
        state.cookie_key.clone()
    }
}

/// The raw data entered by the user in the log-in form.
#[derive(Clone, Deserialize)]
pub struct LogInData {
    pub email: String,

    /// Checked against the stored hash, so no strength check is needed here.
    pub password: String,

    /// Set to any value when the "remember me" checkbox is ticked, absent otherwise.
    pub remember_me: Option<String>,

    /// Where to go after logging in. Only same-site paths are honoured.
    pub redirect_url: Option<String>,
}

/// Handler for log-in requests via the POST method.
///
/// On success the auth cookie is set and the client is redirected to the
/// requested page, or the dashboard. Otherwise the form is sent back with an
/// error under the email or password field.
pub async fn post_log_in(
    State(state): State<LoginState>,
    jar: PrivateCookieJar,
    Form(user_data): Form<LogInData>,
) -> Response {
    let redirect_url = parse_redirect_url(user_data.redirect_url.as_deref(), "log-in form");
    let redirect_url = redirect_url.as_deref();
    let form_with_errors =
        |errors: LogInFormErrors| log_in_form(&user_data.email, errors, redirect_url);

    let unknown_email = || {
        form_with_errors(LogInFormErrors {
            email: Some(UNKNOWN_EMAIL_ERROR_MSG),
            password: None,
        })
        .into_response()
    };
    let internal_error = || {
        form_with_errors(LogInFormErrors {
            email: None,
            password: Some(INTERNAL_ERROR_MSG),
        })
        .into_response()
    };

    let Ok(email) = Email::new(&user_data.email) else {
        return unknown_email();
    };

    let user = {
        let connection = match state.db_connection.lock() {
            Ok(connection) => connection,
            Err(error) => {
                tracing::error!("could not acquire database lock: {error}");
                return internal_error();
            }
        };

        get_user_by_email(&email, &connection)
    };

    let user = match user {
        Ok(user) => user,
        Err(Error::NotFound) => return unknown_email(),
        Err(error) => {
            tracing::error!("Unhandled error while fetching user {email}: {error}");
            return internal_error();
        }
    };

    match user.password_hash.verify(&user_data.password) {
        Ok(true) => {}
        Ok(false) => {
            return form_with_errors(LogInFormErrors {
                email: None,
                password: Some(INVALID_CREDENTIALS_ERROR_MSG),
            })
            .into_response();
        }
        Err(error) => {
            tracing::error!("Unhandled error while verifying credentials: {error}");
            return internal_error();
        }
    }

    let cookie_duration = if user_data.remember_me.is_some() {
        REMEMBER_ME_COOKIE_DURATION
    } else {
        state.cookie_duration
    };

    let Some(local_offset) = get_local_offset(&state.local_timezone) else {
        return Error::InvalidTimezoneError(state.local_timezone).into_alert_response();
    };

    let redirect_url = redirect_url.unwrap_or(endpoints::DASHBOARD_VIEW);

    match set_auth_cookie(jar.clone(), user.id, cookie_duration, local_offset) {
        Ok(jar) => {
            tracing::info!("User {} logged in", user.id);
            (
                StatusCode::SEE_OTHER,
                HxRedirect(redirect_url.to_owned()),
                jar,
            )
                .into_response()
        }
        Err(error) => {
            tracing::error!("Error setting auth cookie: {error}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                HxRedirect(endpoints::INTERNAL_ERROR_VIEW.to_owned()),
                invalidate_auth_cookie(jar),
            )
                .into_response()
        }
    }
}

/// Create a log-in state with the default cookie duration, for tests of routes that need log-in.
#[cfg(test)]
pub(crate) fn test_log_in_state(db_connection: Arc<Mutex<Connection>>) -> LoginState {
    LoginState {
        cookie_key: crate::app_state::create_cookie_key("foobar"),
        cookie_duration: crate::auth::DEFAULT_COOKIE_DURATION,
        local_timezone: "Etc/UTC".to_owned(),
        db_connection,
    }
}
