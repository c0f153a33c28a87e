//! The API endpoints URIs.
//!
//! For endpoints that take a date parameter, e.g., '/records/{date}/edit', use [format_endpoint].

use time::Date;

/// The landing page.
pub const ROOT: &str = "/";
/// A short description of the app.
pub const ABOUT_VIEW: &str = "/about";
/// The monthly summary of income and expenses for logged in users.
pub const DASHBOARD_VIEW: &str = "/dashboard";
/// The day-by-day table of records for a month.
pub const TABLE_VIEW: &str = "/table";
/// The page showing the logged in user's details.
pub const PROFILE_VIEW: &str = "/profile";
/// The page for adding a new daily record.
pub const NEW_RECORD_VIEW: &str = "/records/new";
/// The page for editing the record for a date.
pub const EDIT_RECORD_VIEW: &str = "/records/{date}/edit";
/// The route for getting the registration page.
pub const REGISTER_VIEW: &str = "/register";
/// The route for getting the log in page.
pub const LOG_IN_VIEW: &str = "/log_in";
/// The page to display when an internal server error occurs.
pub const INTERNAL_ERROR_VIEW: &str = "/error";
/// The route for static files.
pub const STATIC: &str = "/static";

/// The route for logging in a user.
pub const LOG_IN_API: &str = "/api/log_in";
/// The route for the client to log out the current user.
pub const LOG_OUT: &str = "/api/log_out";
/// The route to register users.
pub const USERS: &str = "/api/users";
/// The route to create daily records.
pub const RECORDS_API: &str = "/api/records";
/// The route to update or delete the record for a single date.
pub const RECORD: &str = "/api/records/{date}";

/// Replace the parameter in `endpoint_path` with `date` formatted as YYYY-MM-DD.
///
/// A parameter is a string that starts with a left brace, followed by
/// lowercase letters or underscores, and ends with a right brace.
/// For example, in the endpoint path '/records/{date}', '{date}' is the parameter.
///
/// If no parameter is found in `endpoint_path`, the function returns the
/// the original `endpoint_path`.
pub fn format_endpoint(endpoint_path: &str, date: Date) -> String {
    let Some(param_start) = endpoint_path.find('{') else {
        return endpoint_path.to_owned();
    };

    let param_end = endpoint_path[param_start..]
        .find('}')
        .map(|offset| param_start + offset + 1)
        .unwrap_or(endpoint_path.len());

    format!(
        "{}{}{}",
        &endpoint_path[..param_start],
        date,
        &endpoint_path[param_end..]
    )
}
