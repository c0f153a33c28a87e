//! Daily income and expense records and the pages for adding, editing and deleting them.

mod core;
mod create_endpoint;
mod create_page;
mod delete_endpoint;
mod edit_endpoint;
mod edit_page;
mod form;

pub use core::{
    DailyRecord, ExpenseCategory, ExpenseRecord, IncomeCategory, IncomeRecord, Ledger,
    LedgerCategory, MAX_AMOUNT, create_record, create_record_tables, delete_record, get_record,
    update_record, verify_column_count,
};
pub use create_endpoint::create_record_endpoint;
pub use create_page::get_new_record_page;
pub use delete_endpoint::delete_record_endpoint;
pub use edit_endpoint::edit_record_endpoint;
pub use edit_page::get_edit_record_page;
