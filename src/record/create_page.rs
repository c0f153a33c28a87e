//! Defines the route handler for the page for adding a daily record.

use axum::{
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};

use crate::{
    AppState, Error, endpoints,
    html::{BUTTON_PRIMARY_STYLE, FORM_CONTAINER_STYLE, base, loading_spinner},
    navigation::NavBar,
    record::{core::DailyRecord, form::record_form_fields},
    timezone::local_today,
};

fn new_record_view(record: &DailyRecord) -> Markup {
    let nav_bar = NavBar::new(endpoints::NEW_RECORD_VIEW).into_html();
    let spinner = loading_spinner();

    let content = html! {
        (nav_bar)

        div class=(FORM_CONTAINER_STYLE)
        {
            form
                hx-post=(endpoints::RECORDS_API)
                hx-target-error="#alert-container"
                class="w-full space-y-4 md:space-y-6 pb-24 lg:pb-8"
            {
                h2 class="text-xl font-bold" { "Add Record" }

                (record_form_fields(record, true))

                button type="submit" id="submit-button" tabindex="0" class=(BUTTON_PRIMARY_STYLE)
                {
                    span
                        id="indicator"
                        class="inline htmx-indicator"
                    {
                        (spinner)
                    }
                    " Save Record"
                }
            }
        }
    };

    base("Add Record", &[], &content)
}

/// The state needed for the add record page.
#[derive(Debug, Clone)]
pub struct NewRecordPageState {
    /// The local timezone as a canonical timezone name, e.g. "Asia/Kolkata".
    pub local_timezone: String,
}

impl FromRef<AppState> for NewRecordPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// Renders the page for adding a record, with the date set to today.
pub async fn get_new_record_page(
    State(state): State<NewRecordPageState>,
) -> Result<Response, Error> {
    let today = local_today(&state.local_timezone)?;

    Ok(new_record_view(&DailyRecord::empty(today)).into_response())
}
