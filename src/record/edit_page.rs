//! Defines the route handler for the page for editing a daily record.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Path, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    endpoints::{self, format_endpoint},
    html::{BUTTON_PRIMARY_STYLE, FORM_CONTAINER_STYLE, base, loading_spinner},
    navigation::NavBar,
    record::{
        core::{DailyRecord, get_record, parse_date_key},
        form::record_form_fields,
    },
};

fn edit_record_view(record: &DailyRecord) -> Markup {
    let nav_bar = NavBar::new(endpoints::EDIT_RECORD_VIEW).into_html();
    let update_url = format_endpoint(endpoints::RECORD, record.date);
    let spinner = loading_spinner();

    let content = html! {
        (nav_bar)

        div class=(FORM_CONTAINER_STYLE)
        {
            form
                hx-put=(update_url)
                hx-target-error="#alert-container"
                class="w-full space-y-4 md:space-y-6 pb-24 lg:pb-8"
            {
                h2 class="text-xl font-bold" { "Edit Record for " (record.date) }

                (record_form_fields(record, false))

                button type="submit" id="submit-button" tabindex="0" class=(BUTTON_PRIMARY_STYLE)
                {
                    span
                        id="indicator"
                        class="inline htmx-indicator"
                    {
                        (spinner)
                    }
                    " Update Record"
                }
            }
        }
    };

    base("Edit Record", &[], &content)
}

/// The state needed for the edit record page.
#[derive(Debug, Clone)]
pub struct EditRecordPageState {
    /// The database connection for reading records.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for EditRecordPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Renders the page for editing the record for a date.
///
/// Dates without a record render the 404 page.
pub async fn get_edit_record_page(
    State(state): State<EditRecordPageState>,
    Path(date): Path<String>,
) -> Result<Response, Error> {
    let date = parse_date_key(&date)?;

    let record = {
        let connection = state
            .db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;

        get_record(date, &connection)?
    };

    Ok(edit_record_view(&record).into_response())
}
