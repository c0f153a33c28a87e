//! The dashboard: the current month's income and expenses by category.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error, endpoints,
    html::{
        HeadElement, PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE,
        TABLE_TOTAL_ROW_STYLE, base, format_rupees, link,
    },
    navigation::NavBar,
    record::{ExpenseRecord, IncomeRecord},
    report::{
        aggregation::{CategorySummary, MonthlyOverview, TOTAL_LABEL},
        charts::{DashboardChart, category_chart, charts_script, charts_view},
        period::{RecordPeriod, get_rows_in_period},
    },
    timezone::local_today,
};

/// The state needed for displaying the dashboard page.
#[derive(Debug, Clone)]
pub struct DashboardState {
    /// The database connection for reading records.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Asia/Kolkata".
    pub local_timezone: String,
}

impl FromRef<AppState> for DashboardState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// Sum the income and expenses recorded in `period`.
///
/// # Errors
///
/// Returns [Error::SqlError] if the records could not be read.
pub fn get_monthly_overview(
    period: RecordPeriod,
    connection: &Connection,
) -> Result<MonthlyOverview, Error> {
    let income = get_rows_in_period::<IncomeRecord>(period, connection)?;
    let expenses = get_rows_in_period::<ExpenseRecord>(period, connection)?;

    Ok(MonthlyOverview::new(&income, &expenses))
}

/// Display the current month's summaries.
pub async fn get_dashboard_page(State(state): State<DashboardState>) -> Result<Response, Error> {
    let period = RecordPeriod::containing(local_today(&state.local_timezone)?);

    let overview = {
        let connection = state
            .db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;

        get_monthly_overview(period, &connection)
            .inspect_err(|error| tracing::error!("could not get summary for {period}: {error}"))?
    };

    Ok(dashboard_view(period, &overview).into_response())
}

fn stat_card(title: &str, amount: i64) -> Markup {
    html!(
        div class="p-4 bg-white rounded-lg shadow dark:bg-gray-800"
        {
            p class="text-sm text-gray-500 dark:text-gray-400" { (title) }
            p class="text-2xl font-bold" { (format_rupees(amount)) }
        }
    )
}

fn summary_table(title: &str, summary: &CategorySummary) -> Markup {
    html!(
        div
        {
            h3 class="text-xl font-semibold mb-4" { (title) }

            div class="overflow-x-auto rounded-lg shadow"
            {
                table class="w-full text-sm text-left text-gray-500 dark:text-gray-400"
                {
                    thead class=(TABLE_HEADER_STYLE)
                    {
                        tr
                        {
                            th scope="col" class=(TABLE_CELL_STYLE) { "Category" }
                            th scope="col" class={(TABLE_CELL_STYLE) " text-right"} { "Amount" }
                        }
                    }

                    tbody
                    {
                        @for (label, sum) in summary.entries_with_total() {
                            @let row_style = if label == TOTAL_LABEL {
                                TABLE_TOTAL_ROW_STYLE
                            } else {
                                TABLE_ROW_STYLE
                            };

                            tr class=(row_style)
                            {
                                th scope="row" class=(TABLE_CELL_STYLE) { (label) }
                                td class={(TABLE_CELL_STYLE) " text-right"} { (format_rupees(sum)) }
                            }
                        }
                    }
                }
            }
        }
    )
}

fn dashboard_view(period: RecordPeriod, overview: &MonthlyOverview) -> Markup {
    let nav_bar = NavBar::new(endpoints::DASHBOARD_VIEW).into_html();
    let subtitle = period.to_string();
    let charts = [
        DashboardChart {
            id: "income-chart",
            options: category_chart("Income", &subtitle, &overview.income).to_string(),
        },
        DashboardChart {
            id: "expenses-chart",
            options: category_chart("Expenses", &subtitle, &overview.expenses).to_string(),
        },
    ];

    let content = html!(
        (nav_bar)

        div
            id="dashboard-content"
            class={(PAGE_CONTAINER_STYLE) " max-w-screen-xl pb-24 lg:pb-8"}
        {
            div class="w-full flex justify-between flex-wrap items-end mb-4"
            {
                h1 class="text-xl font-bold" { "Summary for " (period) }

                p { (link(endpoints::TABLE_VIEW, "See every day")) }
            }

            section class="w-full grid grid-cols-2 lg:grid-cols-4 gap-4 mb-4"
            {
                (stat_card("Income", overview.income.total()))
                (stat_card("Expenses", overview.expenses.total()))
                (stat_card("Total", overview.combined_total()))
                (stat_card("Net", overview.net()))
            }

            (charts_view(&charts))

            section class="w-full grid grid-cols-1 xl:grid-cols-2 gap-4"
            {
                (summary_table("Income", &overview.income))
                (summary_table("Expenses", &overview.expenses))
            }
        }
    );

    let scripts = [
        HeadElement::ScriptLink("/static/echarts.6.0.0.min.js".to_owned()),
        charts_script(&charts),
    ];

    base("Dashboard", &scripts, &content)
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::extract::State;
    use rusqlite::Connection;
    use scraper::{Html, Selector};
    use time::macros::date;

    use crate::{
        db::initialize,
        html::format_rupees,
        record::{DailyRecord, ExpenseRecord, IncomeRecord, create_record},
        report::period::RecordPeriod,
        test_utils::{assert_status_ok, assert_valid_html, parse_html_document},
        timezone::local_today,
    };

    use super::{DashboardState, get_dashboard_page, get_monthly_overview};

    fn get_test_connection() -> Connection {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        connection
    }

    fn scenario_record(date: time::Date) -> DailyRecord {
        DailyRecord {
            date,
            income: IncomeRecord {
                jalgaon_memo: 500,
                ..Default::default()
            },
            expenses: ExpenseRecord {
                advance: 100,
                ..Default::default()
            },
        }
    }

    #[test]
    fn march_2023_scenario() {
        let connection = get_test_connection();
        create_record(&scenario_record(date!(2023 - 03 - 15)), &connection).unwrap();
        // Records outside the month are ignored.
        create_record(&scenario_record(date!(2023 - 04 - 01)), &connection).unwrap();

        let overview =
            get_monthly_overview(RecordPeriod::new(3, 2023).unwrap(), &connection).unwrap();

        assert!(overview.income.categories().contains(&("Jalgaon memo", 500)));
        assert_eq!(overview.income.total(), 500);
        assert!(overview.expenses.categories().contains(&("Advance", 100)));
        assert_eq!(overview.expenses.total(), 100);
        assert_eq!(overview.combined_total(), 600);
    }

    #[test]
    fn empty_month_has_zero_totals() {
        let connection = get_test_connection();

        let overview =
            get_monthly_overview(RecordPeriod::new(3, 2023).unwrap(), &connection).unwrap();

        assert_eq!(overview.income.total(), 0);
        assert_eq!(overview.expenses.total(), 0);
        assert_eq!(overview.combined_total(), 0);
    }

    #[tokio::test]
    async fn dashboard_shows_current_month() {
        let connection = get_test_connection();
        let today = local_today("Etc/UTC").unwrap();
        create_record(&scenario_record(today), &connection).unwrap();
        let state = DashboardState {
            db_connection: Arc::new(Mutex::new(connection)),
            local_timezone: "Etc/UTC".to_owned(),
        };

        let response = get_dashboard_page(State(state)).await.unwrap();

        assert_status_ok(&response);
        let document = parse_html_document(response).await;
        assert_valid_html(&document);
        assert_summary_total(&document, 0, &format_rupees(500));
        assert_summary_total(&document, 1, &format_rupees(100));
        let chart_count = document
            .select(&Selector::parse("#charts [id$=-chart]").unwrap())
            .count();
        assert_eq!(chart_count, 2, "want 2 charts, got {chart_count}");
    }

    #[track_caller]
    fn assert_summary_total(document: &Html, table_index: usize, want: &str) {
        let table = document
            .select(&Selector::parse("table").unwrap())
            .nth(table_index)
            .unwrap_or_else(|| panic!("no table at index {table_index}"));
        let last_row = table
            .select(&Selector::parse("tbody tr").unwrap())
            .last()
            .expect("table has no rows");
        let cells = last_row
            .select(&Selector::parse("th, td").unwrap())
            .map(|cell| cell.text().collect::<String>())
            .collect::<Vec<_>>();

        assert_eq!(cells, ["Total", want], "want totals row, got {cells:?}");
    }
}
