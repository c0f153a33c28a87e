//! Defines the endpoint for adding a daily record.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::Form;
use axum_htmx::HxRedirect;
use rusqlite::Connection;

use crate::{
    AppState, Error, endpoints,
    record::{
        core::{DailyRecord, create_record},
        form::RecordForm,
    },
};

/// The state needed to add a record.
#[derive(Debug, Clone)]
pub struct CreateRecordState {
    /// The database connection for managing records.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CreateRecordState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler for adding a daily record, redirects to the table view on success.
pub async fn create_record_endpoint(
    State(state): State<CreateRecordState>,
    Form(form): Form<RecordForm>,
) -> Response {
    let record = DailyRecord::from(form);

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match create_record(&record, &connection) {
        Ok(()) => {
            tracing::info!("created record for {}", record.date);
            (
                HxRedirect(endpoints::TABLE_VIEW.to_owned()),
                StatusCode::SEE_OTHER,
            )
                .into_response()
        }
        Err(error @ Error::DuplicateDate(_)) => error.into_alert_response(),
        Err(error @ Error::AmountOutOfRange { .. }) => {
            tracing::warn!("Could not create record for {}: {error}", record.date);
            error.into_alert_response()
        }
        Err(error) => {
            tracing::error!("Could not create record for {}: {error}", record.date);
            error.into_alert_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{extract::State, http::StatusCode};
    use axum_extra::extract::Form;
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{
        db::initialize,
        endpoints,
        record::{
            core::{DailyRecord, ExpenseRecord, IncomeRecord, create_record, get_record},
            form::RecordForm,
        },
        test_utils::assert_hx_redirect,
    };

    use super::{CreateRecordState, create_record_endpoint};

    fn get_test_state() -> CreateRecordState {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();

        CreateRecordState {
            db_connection: Arc::new(Mutex::new(connection)),
        }
    }

    fn scenario_form() -> RecordForm {
        serde_html_form::from_str("date=2023-03-15&jalgaon_memo=500&advance=100").unwrap()
    }

    #[tokio::test]
    async fn creates_record_and_redirects_to_table() {
        let state = get_test_state();

        let response = create_record_endpoint(State(state.clone()), Form(scenario_form())).await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_hx_redirect(&response, endpoints::TABLE_VIEW);
        let connection = state.db_connection.lock().unwrap();
        assert_eq!(
            get_record(date!(2023 - 03 - 15), &connection),
            Ok(DailyRecord {
                date: date!(2023 - 03 - 15),
                income: IncomeRecord {
                    jalgaon_memo: 500,
                    ..Default::default()
                },
                expenses: ExpenseRecord {
                    advance: 100,
                    ..Default::default()
                },
            })
        );
    }

    #[tokio::test]
    async fn duplicate_date_is_a_bad_request() {
        let state = get_test_state();
        {
            let connection = state.db_connection.lock().unwrap();
            create_record(&DailyRecord::empty(date!(2023 - 03 - 15)), &connection).unwrap();
        }

        let response = create_record_endpoint(State(state.clone()), Form(scenario_form())).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let connection = state.db_connection.lock().unwrap();
        assert_eq!(
            get_record(date!(2023 - 03 - 15), &connection),
            Ok(DailyRecord::empty(date!(2023 - 03 - 15))),
            "the existing record should be unchanged"
        );
    }
}
