//! Defines the app level error type and conversions to rendered HTML pages and alerts.
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use time::Date;

use crate::{
    alert::Alert,
    error_pages::{ForbiddenError, InternalServerError, NotFoundError},
    record::MAX_AMOUNT,
};

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The auth cookie is missing from the cookie jar in the request.
    #[error("no auth cookie in the cookie jar")]
    CookieMissing,

    /// The auth cookie was present but its token could not be read.
    #[error("could not parse the auth token: {0}")]
    InvalidToken(String),

    /// The auth token has passed its expiry date.
    #[error("the auth token has expired")]
    TokenExpired,

    /// The user provided a password that is too easy to guess.
    #[error("password is too weak: {0}")]
    TooWeak(String),

    /// An unexpected error occurred with the underlying hashing library.
    ///
    /// The error string should only be logged for debugging on the server.
    /// When communicating with the application client this error should be
    /// replaced with a general error type indicating an internal server error.
    #[error("hashing failed: {0}")]
    HashingError(String),

    /// The name given at registration is empty or too long.
    #[error("{0}")]
    InvalidUserName(String),

    /// The email given at registration is not a usable email address.
    #[error("{0}")]
    InvalidEmail(String),

    /// A user has already registered with the email address.
    #[error("a user with this email already exists")]
    DuplicateEmail,

    /// The logged in user tried to do something only an admin may do.
    #[error("this action requires an admin account")]
    AdminOnly,

    /// A record already exists for the date.
    ///
    /// There is exactly one income and one expense row per day, so the
    /// existing record should be edited instead.
    #[error("a record for {0} already exists")]
    DuplicateDate(Date),

    /// An amount is negative or larger than the most a single entry may hold.
    #[error("{amount} is not a valid amount for {category}")]
    AmountOutOfRange {
        /// The label of the category.
        category: &'static str,
        amount: i64,
    },

    /// The month or year used to filter records is malformed.
    #[error("invalid record period: {0}")]
    InvalidPeriod(String),

    /// The requested resource was not found.
    ///
    /// For HTTP request handlers, the client should check that the parameters
    /// (e.g., date) are correct and that the resource has been created.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// Tried to update a record that does not exist
    #[error("tried to update the record for {0}, which is not in the database")]
    UpdateMissingRecord(Date),

    /// Tried to delete a record that does not exist
    #[error("tried to delete the record for {0}, which is not in the database")]
    DeleteMissingRecord(Date),

    /// The columns of a ledger table do not line up with its known categories.
    #[error("table \"{table}\" has {got} value columns, expected {want}")]
    SchemaMismatch {
        /// The name of the table.
        table: &'static str,
        /// The number of categories the application knows about.
        want: usize,
        /// The number of value columns found in the database.
        got: usize,
    },

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// An error occurred while getting the local timezone from a canonical timezone string.
    #[error("invalid timezone {0}")]
    InvalidTimezoneError(String),

    /// An error occurred while serializing a struct as JSON
    #[error("could not serialize as JSON: {0}")]
    JSONSerializationError(String),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// A request or response body could not be read while logging it.
    #[error("could not read the message body")]
    BodyReadError,
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            // Code 2067 occurs when a UNIQUE constraint failed.
            rusqlite::Error::SqliteFailure(sql_error, Some(ref desc))
                if sql_error.extended_code == 2067 && desc.ends_with("user.email") =>
            {
                Error::DuplicateEmail
            }
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::NotFound => NotFoundError.into_response(),
            Error::AdminOnly => ForbiddenError.into_response(),
            Error::InvalidTimezoneError(timezone) => InternalServerError {
                description: "Invalid Timezone Settings",
                fix: &format!(
                    "Could not get local timezone \"{timezone}\". Check your server settings and \
                    ensure the timezone has been set to valid, canonical timezone string"
                ),
            }
            .into_response(),
            Error::SchemaMismatch { table, want, got } => InternalServerError {
                description: "Database Schema Mismatch",
                fix: &format!(
                    "The table \"{table}\" has {got} value columns but {want} were expected. \
                    Check that the database was created by this version of the application."
                ),
            }
            .into_response(),
            Error::DatabaseLockError => InternalServerError::default().into_response(),
            // Any errors that are not handled above are not intended to be shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                InternalServerError::default().into_response()
            }
        }
    }
}

impl Error {
    /// Convert the error into an HTTP response with an HTML alert.
    pub fn into_alert_response(self) -> Response {
        let (status_code, alert) = match self {
            Error::InvalidTimezoneError(timezone) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Alert::Error {
                    message: "Invalid Timezone Settings".to_owned(),
                    details: format!(
                        "Could not get local timezone \"{timezone}\". Check your server settings and \
                    ensure the timezone has been set to valid, canonical timezone string"
                    ),
                },
            ),
            Error::DuplicateDate(date) => (
                StatusCode::BAD_REQUEST,
                Alert::Error {
                    message: "Duplicate record".to_owned(),
                    details: format!(
                        "A record for {date} already exists. \
                        Edit the existing record or choose a different date."
                    ),
                },
            ),
            Error::AmountOutOfRange { category, amount } => (
                StatusCode::BAD_REQUEST,
                Alert::Error {
                    message: "Invalid amount".to_owned(),
                    details: format!(
                        "{amount} is not a valid amount for {category}. \
                        Amounts must be whole rupees between 0 and {MAX_AMOUNT}.",
                    ),
                },
            ),
            Error::InvalidPeriod(reason) => (
                StatusCode::BAD_REQUEST,
                Alert::Error {
                    message: "Invalid month".to_owned(),
                    details: reason,
                },
            ),
            Error::UpdateMissingRecord(date) => (
                StatusCode::NOT_FOUND,
                Alert::Error {
                    message: "Could not update record".to_owned(),
                    details: format!("The record for {date} could not be found."),
                },
            ),
            Error::DeleteMissingRecord(date) => (
                StatusCode::NOT_FOUND,
                Alert::Error {
                    message: "Could not delete record".to_owned(),
                    details: format!(
                        "The record for {date} could not be found. \
                        Try refreshing the page to see if the record has already been deleted."
                    ),
                },
            ),
            Error::NotFound => (
                StatusCode::NOT_FOUND,
                Alert::Error {
                    message: "Not found".to_owned(),
                    details: "The requested resource could not be found.".to_owned(),
                },
            ),
            Error::AdminOnly => (
                StatusCode::FORBIDDEN,
                Alert::Error {
                    message: "Admins only".to_owned(),
                    details: "Only admin users can do this. Ask an admin for help.".to_owned(),
                },
            ),
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Alert::Error {
                        message: "Something went wrong".to_owned(),
                        details:
                            "An unexpected error occurred, check the server logs for more details."
                                .to_owned(),
                    },
                )
            }
        };

        (status_code, alert.into_html()).into_response()
    }
}

#[cfg(test)]
mod tests {
    use axum::{http::StatusCode, response::IntoResponse};
    use rusqlite::Connection;
    use time::macros::date;

    use crate::Error;

    #[test]
    fn no_rows_maps_to_not_found() {
        let error: Error = rusqlite::Error::QueryReturnedNoRows.into();

        assert_eq!(error, Error::NotFound);
    }

    #[test]
    fn unique_email_violation_maps_to_duplicate_email() {
        let connection = Connection::open_in_memory().unwrap();
        connection
            .execute("CREATE TABLE user (email TEXT UNIQUE)", ())
            .unwrap();
        connection
            .execute("INSERT INTO user (email) VALUES ('a@b.c')", ())
            .unwrap();

        let error: Error = connection
            .execute("INSERT INTO user (email) VALUES ('a@b.c')", ())
            .unwrap_err()
            .into();

        assert_eq!(error, Error::DuplicateEmail);
    }

    #[test]
    fn alert_status_codes() {
        let cases = [
            (
                Error::DuplicateDate(date!(2023 - 03 - 15)),
                StatusCode::BAD_REQUEST,
            ),
            (
                Error::InvalidPeriod("bad".to_owned()),
                StatusCode::BAD_REQUEST,
            ),
            (
                Error::UpdateMissingRecord(date!(2023 - 03 - 15)),
                StatusCode::NOT_FOUND,
            ),
            (
                Error::DeleteMissingRecord(date!(2023 - 03 - 15)),
                StatusCode::NOT_FOUND,
            ),
            (Error::AdminOnly, StatusCode::FORBIDDEN),
            (Error::DatabaseLockError, StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (error, want_status) in cases {
            let got_status = error.into_alert_response().status();
            assert_eq!(got_status, want_status, "want {want_status}, got {got_status}");
        }
    }

    #[test]
    fn page_status_codes() {
        assert_eq!(
            Error::NotFound.into_response().status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            Error::AdminOnly.into_response().status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            Error::DatabaseLockError.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
