//! The home, about and profile pages.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use axum_extra::extract::PrivateCookieJar;
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    auth::{Email, UserID, get_token_from_cookies, get_user_by_id},
    endpoints,
    html::{BUTTON_PRIMARY_STYLE, LINK_STYLE, PAGE_CONTAINER_STYLE, base, link},
    navigation::NavBar,
};

const CARD_STYLE: &str = "w-full max-w-md p-6 space-y-4 bg-white rounded-lg shadow \
    dark:bg-gray-800 dark:border dark:border-gray-700";

/// The landing page. Logged in users get a link to the dashboard, everyone else
/// gets links to log in or register.
pub async fn get_home_page(jar: PrivateCookieJar) -> Response {
    let is_logged_in = get_token_from_cookies(&jar).is_ok();

    home_view(is_logged_in).into_response()
}

fn home_view(is_logged_in: bool) -> Markup {
    let content = html!(
        div class=(PAGE_CONTAINER_STYLE)
        {
            div class=(CARD_STYLE)
            {
                h1 class="text-2xl font-bold" { "Daybook" }

                p { "Keep track of the daily income and expenses of your transport business." }

                @if is_logged_in {
                    a href=(endpoints::DASHBOARD_VIEW) class={"block text-center " (BUTTON_PRIMARY_STYLE)}
                    {
                        "Go to the dashboard"
                    }
                } @else {
                    a href=(endpoints::LOG_IN_VIEW) class={"block text-center " (BUTTON_PRIMARY_STYLE)}
                    {
                        "Log in"
                    }

                    p class="text-sm"
                    {
                        "New here? "
                        (link(endpoints::REGISTER_VIEW, "Register"))
                    }
                }

                p class="text-sm" { (link(endpoints::ABOUT_VIEW, "About Daybook")) }
            }
        }
    );

    base("Home", &[], &content)
}

/// A short description of the application.
pub async fn get_about_page() -> Response {
    let content = html!(
        div class=(PAGE_CONTAINER_STYLE)
        {
            div class=(CARD_STYLE)
            {
                h1 class="text-2xl font-bold" { "About Daybook" }

                p
                {
                    "Daybook records what a transport office takes in and pays out each day. "
                    "Every day has one record with income such as memos, luggage and rokadi, "
                    "and expenses such as diesel, advances and staff payments."
                }

                p
                {
                    "The dashboard sums the current month by category and the table lists "
                    "every day of a month with its totals."
                }

                p class="text-sm" { (link(endpoints::ROOT, "Back to home")) }
            }
        }
    );

    base("About", &[], &content).into_response()
}

/// The state needed for the profile page.
#[derive(Debug, Clone)]
pub struct ProfileState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for ProfileState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The Gravatar URL for `email`, keyed on the MD5 hash of the trimmed, lower-cased address.
pub fn gravatar_url(email: &Email) -> String {
    let normalized = email.as_ref().trim().to_lowercase();
    let hash = md5::compute(normalized.as_bytes());

    format!("https://www.gravatar.com/avatar/{hash:x}?s=160&d=identicon")
}

/// Show the logged in user's name, email, role and avatar.
pub async fn get_profile_page(
    State(state): State<ProfileState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let user = {
        let connection = state
            .db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;

        get_user_by_id(user_id, &connection)
            .inspect_err(|error| tracing::error!("could not get user {user_id}: {error}"))?
    };

    let nav_bar = NavBar::new(endpoints::PROFILE_VIEW).into_html();
    let role = if user.is_admin { "Admin" } else { "User" };

    let content = html!(
        (nav_bar)

        div class=(PAGE_CONTAINER_STYLE)
        {
            div class={(CARD_STYLE) " flex flex-col items-center text-center"}
            {
                img
                    src=(gravatar_url(&user.email))
                    alt={"Avatar of " (user.name)}
                    width="160"
                    height="160"
                    class="rounded-full";

                h1 id="profile-name" class="text-2xl font-bold" { (user.name) }

                dl class="grid grid-cols-2 gap-2 text-left"
                {
                    dt class="font-medium" { "Email" }
                    dd id="profile-email" { (user.email) }

                    dt class="font-medium" { "Role" }
                    dd id="profile-role" { (role) }
                }

                a href=(endpoints::LOG_OUT) class=(LINK_STYLE) { "Log out" }
            }
        }
    );

    Ok(base("Profile", &[], &content).into_response())
}
