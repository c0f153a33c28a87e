//! Defines the endpoint for updating a daily record.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::Form;
use axum_htmx::HxRedirect;
use rusqlite::Connection;

use crate::{
    AppState, Error, endpoints,
    record::{
        core::{DailyRecord, parse_date_key, update_record},
        form::RecordForm,
    },
};

/// The state needed to update a record.
#[derive(Debug, Clone)]
pub struct EditRecordState {
    /// The database connection for managing records.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for EditRecordState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler for overwriting the record for the date in the path.
///
/// The date in the URL is the key, any date in the form body is ignored.
/// Redirects to the table view on success.
pub async fn edit_record_endpoint(
    State(state): State<EditRecordState>,
    Path(date): Path<String>,
    Form(form): Form<RecordForm>,
) -> Response {
    let date = match parse_date_key(&date) {
        Ok(date) => date,
        Err(error) => return error.into_alert_response(),
    };
    let record = DailyRecord {
        date,
        ..DailyRecord::from(form)
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match update_record(&record, &connection) {
        Ok(()) => {
            tracing::info!("updated record for {date}");
            (
                HxRedirect(endpoints::TABLE_VIEW.to_owned()),
                StatusCode::SEE_OTHER,
            )
                .into_response()
        }
        Err(error @ (Error::UpdateMissingRecord(_) | Error::AmountOutOfRange { .. })) => {
            tracing::warn!("Could not update record for {date}: {error}");
            error.into_alert_response()
        }
        Err(error) => {
            tracing::error!("Could not update record for {date}: {error}");
            error.into_alert_response()
        }
    }
}
