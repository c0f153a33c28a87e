//! Monthly reports over the daily records: the dashboard and the detail table.

mod aggregation;
mod charts;
mod dashboard;
mod period;
mod table;

pub use aggregation::{CategorySummary, DetailRow, DetailTable, MonthlyOverview, TOTAL_LABEL};
pub use dashboard::{get_dashboard_page, get_monthly_overview};
pub use period::{RecordPeriod, get_rows_in_period};
pub use table::{detail_table_view, get_detail_table, get_table_page, post_table};
