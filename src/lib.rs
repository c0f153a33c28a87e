//! Daybook is a web app for keeping the daily books of a transport business.
//!
//! Each day has one record of income and expenses. The dashboard sums the
//! current month by category and the table lists every day of a month.
//!
//! This library provides a REST API that directly serves HTML pages.

use std::{net::SocketAddr, time::Duration};

use axum_server::Handle;
use tokio::signal;

mod alert;
mod app_state;
mod auth;
mod db;
mod endpoints;
mod error;
mod error_pages;
mod html;
mod logging;
mod navigation;
mod pages;
mod record;
mod report;
mod routing;
mod timezone;

#[cfg(test)]
mod test_utils;

pub use app_state::AppState;
pub use auth::{
    Email, NewUser, PasswordHash, User, UserID, UserName, ValidatedPassword, create_user,
    get_user_by_email, get_user_by_id,
};
pub use db::initialize as initialize_db;
pub use error::Error;
pub use logging::{LOG_BODY_LENGTH_LIMIT, logging_middleware};
pub use record::{
    DailyRecord, ExpenseCategory, ExpenseRecord, IncomeCategory, IncomeRecord, Ledger,
    LedgerCategory, create_record, delete_record, get_record, update_record,
};
pub use report::{
    CategorySummary, DetailRow, DetailTable, MonthlyOverview, RecordPeriod, TOTAL_LABEL,
    get_detail_table, get_monthly_overview, get_rows_in_period,
};
pub use routing::build_router;

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        if let Err(error) = signal::ctrl_c().await {
            tracing::error!("failed to install Ctrl+C handler: {error}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(error) => {
                tracing::error!("failed to install terminate signal handler: {error}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}
