//! The registration page and the endpoint that creates new users.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, State},
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
        PasswordHash, ValidatedPassword, set_auth_cookie,
        user::{Email, NewUser, UserName, create_user},
    },
    endpoints,
    error_pages::get_internal_server_error_redirect,
    html::{
        BUTTON_PRIMARY_STYLE, FORM_ERROR_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, base,
        link, loading_spinner, log_in_register, password_input, text_input,
    },
    timezone::get_local_offset,
};

/// The minimum number of characters the password should have to be considered valid on the client side (server-side validation is done on top of this validation).
const PASSWORD_INPUT_MIN_LENGTH: u8 = 14;

pub const DUPLICATE_EMAIL_ERROR_MSG: &str =
    "You have already signed up with this email, log in instead";

/// What the user typed, echoed back when the form has errors.
#[derive(Default)]
struct RegisterFormValues<'a> {
    name: &'a str,
    email: &'a str,
    password: &'a str,
    is_admin: bool,
}

#[derive(Default)]
struct RegisterFormErrors<'a> {
    name: Option<&'a str>,
    email: Option<&'a str>,
    password: Option<&'a str>,
    confirm_password: Option<&'a str>,
}

fn confirm_password_input(min_length: u8, error_message: Option<&str>) -> Markup {
    html! {
        div
        {
            label for="confirm-password" class=(FORM_LABEL_STYLE) { "Confirm password" }

            input
                type="password"
                name="confirm_password"
                id="confirm-password"
                placeholder="••••••••"
                class=(FORM_TEXT_INPUT_STYLE)
                required
                minlength=(min_length)
                autofocus[error_message.is_some()];

            @if let Some(error_message) = error_message
            {
                p class=(FORM_ERROR_STYLE) { (error_message) }
            }
        }
    }
}

fn registration_form(values: RegisterFormValues, errors: RegisterFormErrors) -> Markup {
    let duplicate_email = errors.email == Some(DUPLICATE_EMAIL_ERROR_MSG);

    html! {
        form
            hx-post=(endpoints::USERS)
            hx-swap="outerHTML"
            hx-indicator="#indicator"
            hx-disabled-elt="#submit-button"
            class="space-y-4 md:space-y-6"
        {
            (text_input("name", "Name", "text", values.name, errors.name))

            @if duplicate_email {
                div
                {
                    label for="email" class=(FORM_LABEL_STYLE) { "Email" }

                    input
                        type="email"
                        name="email"
                        id="email"
                        class=(FORM_TEXT_INPUT_STYLE)
                        required
                        value=(values.email);

                    p class=(FORM_ERROR_STYLE)
                    {
                        (DUPLICATE_EMAIL_ERROR_MSG) " "
                        (link(endpoints::LOG_IN_VIEW, "here"))
                    }
                }
            } @else {
                (text_input("email", "Email", "email", values.email, errors.email))
            }

            (password_input(values.password, PASSWORD_INPUT_MIN_LENGTH, errors.password))
            (confirm_password_input(PASSWORD_INPUT_MIN_LENGTH, errors.confirm_password))

            div class="flex items-center gap-x-3"
            {
                input
                    type="checkbox"
                    name="admin"
                    id="admin"
                    class="rounded-xs"
                    checked[values.is_admin];

                label
                    for="admin"
                    class="block text-sm font-medium text-gray-900 dark:text-white"
                {
                    "Admin account"
                }
            }

            button type="submit" id="submit-button" class=(BUTTON_PRIMARY_STYLE)
            {
                span class="inline htmx-indicator" id="indicator" { (loading_spinner()) }
                "Create account"
            }

            p class="text-sm font-light text-gray-500 dark:text-gray-400"
            {
                "Already have an account? "
                (link(endpoints::LOG_IN_VIEW, "Log in here"))
            }
        }
    }
}

/// Display the registration page.
pub async fn get_register_page() -> Response {
    let form = registration_form(RegisterFormValues::default(), RegisterFormErrors::default());
    let content = log_in_register("Create an account", &form);

    base("Register", &[], &content).into_response()
}

/// The state needed for creating a new user.
#[derive(Debug, Clone)]
pub struct RegistrationState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
    /// The duration for which cookies used for authentication are valid.
    pub cookie_duration: Duration,
    /// The local timezone as a canonical timezone name, e.g. "Asia/Kolkata".
    pub local_timezone: String,
    pub db_connection: Arc<Mutex<Connection>>,
    /// The bcrypt cost for new passwords.
    pub hash_cost: u32,
}

impl FromRef<AppState> for RegistrationState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            cookie_duration: state.cookie_duration,
            local_timezone: state.local_timezone.clone(),
            db_connection: state.db_connection.clone(),
            hash_cost: PasswordHash::DEFAULT_COST,
        }
    }
}

impl FromRef<RegistrationState> for Key {
    fn from_ref(state: &RegistrationState) -> Self {
        state.cookie_key.clone()
    }
}

#[derive(Deserialize)]
pub struct RegisterForm {
    pub name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    /// Present when the "admin account" checkbox is ticked.
    pub admin: Option<String>,
}

fn form_with_errors(user_data: &RegisterForm, errors: RegisterFormErrors) -> Response {
    let values = RegisterFormValues {
        name: &user_data.name,
        email: &user_data.email,
        password: &user_data.password,
        is_admin: user_data.admin.is_some(),
    };

    registration_form(values, errors).into_response()
}

/// Create a user from the registration form, log them in and send them to the dashboard.
///
/// Invalid fields are reported under the matching input.
pub async fn register_user(
    State(state): State<RegistrationState>,
    jar: PrivateCookieJar,
    Form(user_data): Form<RegisterForm>,
) -> Response {
    let name = match UserName::new(&user_data.name) {
        Ok(name) => name,
        Err(error) => {
            return form_with_errors(&user_data, RegisterFormErrors {
                name: Some(&error.to_string()),
                ..Default::default()
            });
        }
    };

    let email = match Email::new(&user_data.email) {
        Ok(email) => email,
        Err(error) => {
            return form_with_errors(&user_data, RegisterFormErrors {
                email: Some(&error.to_string()),
                ..Default::default()
            });
        }
    };

    let validated_password =
        match ValidatedPassword::new(&user_data.password, &[name.as_ref(), email.as_ref()]) {
            Ok(password) => password,
            Err(error) => {
                return form_with_errors(&user_data, RegisterFormErrors {
                    password: Some(&error.to_string()),
                    ..Default::default()
                });
            }
        };

    if user_data.password != user_data.confirm_password {
        return form_with_errors(&user_data, RegisterFormErrors {
            confirm_password: Some("Passwords do not match"),
            ..Default::default()
        });
    }

    let password_hash = match PasswordHash::new(validated_password, state.hash_cost) {
        Ok(hash) => hash,
        Err(error) => {
            tracing::error!("an error occurred while hashing a password: {error}");
            return get_internal_server_error_redirect();
        }
    };

    let Some(local_offset) = get_local_offset(&state.local_timezone) else {
        return Error::InvalidTimezoneError(state.local_timezone).into_alert_response();
    };

    let new_user = NewUser {
        name,
        email,
        password_hash,
        is_admin: user_data.admin.is_some(),
    };

    let user = {
        let connection = match state.db_connection.lock() {
            Ok(connection) => connection,
            Err(error) => {
                tracing::error!("could not acquire database lock: {error}");
                return Error::DatabaseLockError.into_alert_response();
            }
        };

        create_user(new_user, &connection)
    };

    let user = match user {
        Ok(user) => user,
        Err(Error::DuplicateEmail) => {
            return form_with_errors(&user_data, RegisterFormErrors {
                email: Some(DUPLICATE_EMAIL_ERROR_MSG),
                ..Default::default()
            });
        }
        Err(error) => {
            tracing::error!("An unhandled error occurred while inserting a new user: {error}");
            return get_internal_server_error_redirect();
        }
    };

    tracing::info!("Registered user {} (admin: {})", user.id, user.is_admin);

    match set_auth_cookie(jar, user.id, state.cookie_duration, local_offset) {
        Ok(jar) => (
            StatusCode::SEE_OTHER,
            HxRedirect(endpoints::DASHBOARD_VIEW.to_owned()),
            jar,
        )
            .into_response(),
        Err(error) => {
            tracing::error!("An error occurred while setting the auth cookie: {error}");
            get_internal_server_error_redirect()
        }
    }
}
