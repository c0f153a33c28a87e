//! Defines the endpoint for deleting a daily record.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Path, State},
    response::{IntoResponse, Response},
};
use maud::html;
use rusqlite::Connection;

use crate::{
    AppState, Error,
    alert::Alert,
    record::core::{delete_record, parse_date_key},
    report::{RecordPeriod, detail_table_view, get_detail_table},
};

/// The state needed to delete a record.
#[derive(Debug, Clone)]
pub struct DeleteRecordState {
    /// The database connection for managing records.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DeleteRecordState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler for deleting the income and expenses for a date.
///
/// Responds with the detail table for the month of the deleted record, so the
/// rows and the totals row are replaced together, and a success alert that is
/// swapped into the alert container out of band.
pub async fn delete_record_endpoint(
    State(state): State<DeleteRecordState>,
    Path(date): Path<String>,
) -> Response {
    let date = match parse_date_key(&date) {
        Ok(date) => date,
        Err(error) => return error.into_alert_response(),
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match delete_record(date, &connection) {
        Ok(()) => tracing::info!("deleted record for {date}"),
        Err(error @ Error::DeleteMissingRecord(_)) => {
            tracing::warn!("{error}");
            return error.into_alert_response();
        }
        Err(error) => {
            tracing::error!("Could not delete record for {date}: {error}");
            return error.into_alert_response();
        }
    }

    let period = RecordPeriod::containing(date);
    let table = match get_detail_table(period, &connection) {
        Ok(table) => table,
        Err(error) => {
            tracing::error!("could not get detail table for {period} after delete: {error}");
            return error.into_alert_response();
        }
    };

    let alert = Alert::Success {
        message: "Record deleted".to_owned(),
        details: format!("The income and expenses for {date} were deleted."),
    };

    html!(
        (detail_table_view(period, &table))
        div hx-swap-oob="beforeend:#alert-container" { (alert.into_html()) }
    )
    .into_response()
}
