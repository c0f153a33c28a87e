//! The detail table: one row per day with selected income and expense columns.

use std::sync::{Arc, Mutex};

use axum::{
    Form,
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;
use serde::Deserialize;

use crate::{
    AppState, Error,
    endpoints::{self, format_endpoint},
    html::{
        BUTTON_DELETE_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, LINK_STYLE,
        PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE,
        TABLE_TOTAL_ROW_STYLE, base, format_rupees, link,
    },
    navigation::NavBar,
    record::{ExpenseRecord, IncomeRecord},
    report::{
        aggregation::{DetailTable, TOTAL_LABEL},
        period::{RecordPeriod, get_rows_in_period},
    },
    timezone::local_today,
};

const TABLE_CONTAINER_ID: &str = "record-table";

/// The state needed for displaying the detail table.
#[derive(Debug, Clone)]
pub struct TableState {
    /// The database connection for reading records.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Asia/Kolkata".
    pub local_timezone: String,
}

impl FromRef<AppState> for TableState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// The month picker on the table page.
#[derive(Debug, Deserialize)]
pub struct MonthPickerForm {
    /// The picked month as "YYYY-MM".
    pub mpicker: String,
}

/// Build the detail table for `period`.
///
/// # Errors
///
/// Returns [Error::SqlError] if the records could not be read.
pub fn get_detail_table(period: RecordPeriod, connection: &Connection) -> Result<DetailTable, Error> {
    let income = get_rows_in_period::<IncomeRecord>(period, connection)?;
    let expenses = get_rows_in_period::<ExpenseRecord>(period, connection)?;

    Ok(DetailTable::new(&income, &expenses))
}

fn load_detail_table(
    period: RecordPeriod,
    db_connection: &Mutex<Connection>,
) -> Result<DetailTable, Error> {
    let connection = db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    get_detail_table(period, &connection)
        .inspect_err(|error| tracing::error!("could not get detail table for {period}: {error}"))
}

/// Display the detail table for the current month.
pub async fn get_table_page(State(state): State<TableState>) -> Result<Response, Error> {
    let period = RecordPeriod::containing(local_today(&state.local_timezone)?);
    let table = load_detail_table(period, &state.db_connection)?;

    Ok(table_page_view(period, &table).into_response())
}

/// Swap in the detail table for the picked month.
pub async fn post_table(
    State(state): State<TableState>,
    Form(form): Form<MonthPickerForm>,
) -> Response {
    let period = match RecordPeriod::parse_month_picker(&form.mpicker) {
        Ok(period) => period,
        Err(error) => {
            tracing::warn!("rejected month picker value {:?}: {error}", form.mpicker);
            return error.into_alert_response();
        }
    };

    match load_detail_table(period, &state.db_connection) {
        Ok(table) => detail_table_view(period, &table).into_response(),
        Err(error) => error.into_alert_response(),
    }
}

fn month_picker(period: RecordPeriod) -> Markup {
    html!(
        form
            hx-post=(endpoints::TABLE_VIEW)
            hx-trigger="change"
            hx-target={"#" (TABLE_CONTAINER_ID)}
            hx-target-error="#alert-container"
            hx-swap="outerHTML"
            class="flex items-center gap-2"
        {
            label for="mpicker" class=(FORM_LABEL_STYLE) { "Month" }
            input
                id="mpicker"
                name="mpicker"
                type="month"
                value=(period.month_picker_value())
                required
                class=(FORM_TEXT_INPUT_STYLE);
        }
    )
}

/// The detail table with its totals row.
///
/// Deleting a row swaps in a fresh copy of this table so the totals stay in
/// step with the rows.
pub fn detail_table_view(period: RecordPeriod, table: &DetailTable) -> Markup {
    // The date, amount and action columns.
    let column_count = table.headers.len() + 2;

    html!(
        div id=(TABLE_CONTAINER_ID) class="overflow-x-auto rounded-lg shadow"
        {
            table class="w-full text-sm text-left text-gray-500 dark:text-gray-400"
            {
                caption class="p-4 text-lg font-semibold text-left text-gray-900 dark:text-white"
                {
                    (period)
                }

                thead class=(TABLE_HEADER_STYLE)
                {
                    tr
                    {
                        th scope="col" class=(TABLE_CELL_STYLE) { "Date" }

                        @for header in &table.headers {
                            th scope="col" class={(TABLE_CELL_STYLE) " text-right"} { (header) }
                        }

                        th scope="col" class=(TABLE_CELL_STYLE) { "Actions" }
                    }
                }

                tbody
                {
                    @for row in &table.rows {
                        tr class=(TABLE_ROW_STYLE)
                        {
                            th scope="row" class={(TABLE_CELL_STYLE) " whitespace-nowrap"}
                            {
                                time datetime=(row.date) { (row.date) }
                            }

                            @for amount in &row.amounts {
                                td class={(TABLE_CELL_STYLE) " text-right tabular-nums"}
                                {
                                    (format_rupees(*amount))
                                }
                            }

                            td class={(TABLE_CELL_STYLE) " flex gap-4"}
                            {
                                a
                                    href=(format_endpoint(endpoints::EDIT_RECORD_VIEW, row.date))
                                    class=(LINK_STYLE)
                                {
                                    "Edit"
                                }

                                button
                                    hx-delete=(format_endpoint(endpoints::RECORD, row.date))
                                    hx-confirm={
                                        "Are you sure you want to delete the record for "
                                        (row.date) "? This cannot be undone."
                                    }
                                    hx-target={"#" (TABLE_CONTAINER_ID)}
                                    hx-target-error="#alert-container"
                                    hx-swap="outerHTML"
                                    class=(BUTTON_DELETE_STYLE)
                                {
                                    "Delete"
                                }
                            }
                        }
                    }

                    @if table.rows.is_empty() {
                        tr class=(TABLE_ROW_STYLE)
                        {
                            td colspan=(column_count) class={(TABLE_CELL_STYLE) " text-center"}
                            {
                                "Nothing recorded for " (period) ". "
                                (link(endpoints::NEW_RECORD_VIEW, "Add a record"))
                            }
                        }
                    }
                }

                tfoot
                {
                    tr class=(TABLE_TOTAL_ROW_STYLE)
                    {
                        th scope="row" class=(TABLE_CELL_STYLE) { (TOTAL_LABEL) }

                        @for total in &table.totals {
                            td class={(TABLE_CELL_STYLE) " text-right tabular-nums"}
                            {
                                (format_rupees(*total))
                            }
                        }

                        td class=(TABLE_CELL_STYLE) {}
                    }
                }
            }
        }
    )
}

fn table_page_view(period: RecordPeriod, table: &DetailTable) -> Markup {
    let nav_bar = NavBar::new(endpoints::TABLE_VIEW).into_html();

    let content = html!(
        (nav_bar)

        div class={(PAGE_CONTAINER_STYLE) " max-w-full pb-24 lg:pb-8"}
        {
            div class="w-full flex justify-between flex-wrap items-end gap-4 mb-4"
            {
                h1 class="text-xl font-bold" { "Daily records" }

                (month_picker(period))
            }

            (detail_table_view(period, table))
        }
    );

    base("Table", &[], &content)
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{Form, extract::State, http::StatusCode};
    use rusqlite::Connection;
    use scraper::{ElementRef, Html, Selector};
    use time::macros::date;

    use crate::{
        db::initialize,
        endpoints::{self, format_endpoint},
        html::format_rupees,
        record::{DailyRecord, ExpenseRecord, IncomeRecord, create_record},
        test_utils::{
            assert_hx_endpoint, assert_status_ok, assert_valid_html, must_get_form,
            parse_html_document, parse_html_fragment,
        },
        timezone::local_today,
    };

    use super::{MonthPickerForm, TableState, get_table_page, post_table};

    fn get_test_state() -> TableState {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();

        TableState {
            db_connection: Arc::new(Mutex::new(connection)),
            local_timezone: "Etc/UTC".to_owned(),
        }
    }

    fn insert(state: &TableState, record: DailyRecord) {
        let connection = state.db_connection.lock().unwrap();
        create_record(&record, &connection).unwrap();
    }

    fn record(date: time::Date, jalgaon_memo: i64, advance: i64) -> DailyRecord {
        DailyRecord {
            date,
            income: IncomeRecord {
                jalgaon_memo,
                ..Default::default()
            },
            expenses: ExpenseRecord {
                advance,
                ..Default::default()
            },
        }
    }

    fn cell_texts(row: ElementRef<'_>) -> Vec<String> {
        row.select(&Selector::parse("th, td").unwrap())
            .map(|cell| cell.text().collect::<String>().trim().to_owned())
            .collect()
    }

    #[track_caller]
    fn must_get_body_rows(html: &Html) -> Vec<ElementRef<'_>> {
        html.select(&Selector::parse("tbody tr").unwrap()).collect()
    }

    #[track_caller]
    fn must_get_totals_row(html: &Html) -> Vec<String> {
        let row = html
            .select(&Selector::parse("tfoot tr").unwrap())
            .next()
            .expect("want totals row in table footer");
        cell_texts(row)
    }

    #[tokio::test]
    async fn page_shows_current_month_with_picker() {
        let state = get_test_state();
        let today = local_today("Etc/UTC").unwrap();
        insert(&state, record(today, 500, 100));

        let response = get_table_page(State(state)).await.unwrap();

        assert_status_ok(&response);
        let document = parse_html_document(response).await;
        assert_valid_html(&document);
        let form = must_get_form(&document);
        assert_hx_endpoint(&form, endpoints::TABLE_VIEW, "hx-post");
        let picker = form
            .select(&Selector::parse("input[name=mpicker]").unwrap())
            .next()
            .expect("want month picker");
        assert_eq!(picker.value().attr("type"), Some("month"));
        let want_month = format!("{:04}-{:02}", today.year(), u8::from(today.month()));
        assert_eq!(picker.value().attr("value"), Some(want_month.as_str()));
        assert_eq!(must_get_body_rows(&document).len(), 1);
    }

    #[tokio::test]
    async fn header_has_date_categories_and_actions() {
        let state = get_test_state();

        let response = get_table_page(State(state)).await.unwrap();

        let document = parse_html_document(response).await;
        let headers = document
            .select(&Selector::parse("thead th").unwrap())
            .map(|cell| cell.text().collect::<String>())
            .collect::<Vec<_>>();
        assert_eq!(headers.len(), 15, "got headers {headers:?}");
        assert_eq!(headers.first().map(String::as_str), Some("Date"));
        assert_eq!(headers.get(1).map(String::as_str), Some("Jalgaon memo"));
        assert_eq!(headers.get(9).map(String::as_str), Some("Advance"));
        assert_eq!(headers.last().map(String::as_str), Some("Actions"));
    }

    #[tokio::test]
    async fn picked_month_returns_table_fragment() {
        let state = get_test_state();
        insert(&state, record(date!(2023 - 03 - 01), 100, 10));
        insert(&state, record(date!(2023 - 03 - 15), 400, 20));
        insert(&state, record(date!(2023 - 04 - 01), 999, 999));

        let response = post_table(
            State(state),
            Form(MonthPickerForm {
                mpicker: "2023-03".to_owned(),
            }),
        )
        .await;

        assert_status_ok(&response);
        let fragment = parse_html_fragment(response).await;
        let rows = must_get_body_rows(&fragment);
        assert_eq!(rows.len(), 2);
        let first = cell_texts(rows[0]);
        assert_eq!(first[0], "2023-03-01");
        assert_eq!(first[1], format_rupees(100));
        assert_eq!(first[9], format_rupees(10));

        let totals = must_get_totals_row(&fragment);
        assert_eq!(totals[0], "Total");
        assert_eq!(totals[1], format_rupees(500));
        assert_eq!(totals[9], format_rupees(30));
    }

    #[tokio::test]
    async fn rows_link_to_edit_and_delete() {
        let state = get_test_state();
        insert(&state, record(date!(2023 - 03 - 15), 1, 1));

        let response = post_table(
            State(state),
            Form(MonthPickerForm {
                mpicker: "2023-03".to_owned(),
            }),
        )
        .await;

        let fragment = parse_html_fragment(response).await;
        let row = must_get_body_rows(&fragment)[0];
        let edit_link = row
            .select(&Selector::parse("a").unwrap())
            .next()
            .expect("want edit link");
        assert_eq!(
            edit_link.value().attr("href"),
            Some(format_endpoint(endpoints::EDIT_RECORD_VIEW, date!(2023 - 03 - 15)).as_str())
        );
        let delete_button = row
            .select(&Selector::parse("button").unwrap())
            .next()
            .expect("want delete button");
        assert_eq!(
            delete_button.value().attr("hx-delete"),
            Some(format_endpoint(endpoints::RECORD, date!(2023 - 03 - 15)).as_str())
        );
        assert_eq!(delete_button.value().attr("hx-target"), Some("#record-table"));
        assert_eq!(delete_button.value().attr("hx-swap"), Some("outerHTML"));
        assert!(delete_button.value().attr("hx-confirm").is_some());
    }

    #[tokio::test]
    async fn empty_month_has_zero_totals() {
        let state = get_test_state();

        let response = post_table(
            State(state),
            Form(MonthPickerForm {
                mpicker: "2023-03".to_owned(),
            }),
        )
        .await;

        let fragment = parse_html_fragment(response).await;
        let totals = must_get_totals_row(&fragment);
        assert_eq!(totals.len(), 15);
        assert!(
            totals[1..14].iter().all(|total| *total == format_rupees(0)),
            "want zero totals, got {totals:?}"
        );
    }

    #[tokio::test]
    async fn invalid_month_is_bad_request() {
        let state = get_test_state();

        let response = post_table(
            State(state),
            Form(MonthPickerForm {
                mpicker: "2023-13".to_owned(),
            }),
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
