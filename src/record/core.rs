//! The income and expense ledgers and the combined daily record stored in them.
//!
//! Each calendar day has exactly one row in `income` and one in `expenses`.
//! `expenses.date` references `income.date`, so the pair is created, updated
//! and deleted together.

use rusqlite::{Connection, Row, Transaction, params_from_iter, types::Value};
use serde::Serialize;
use time::{Date, macros::format_description};

use crate::Error;

/// A named amount column of a ledger table.
pub trait LedgerCategory: Copy + PartialEq + 'static {
    /// Every category, in display order.
    const ALL: &'static [Self];

    /// The database column and form field name.
    fn column(self) -> &'static str;

    /// The human readable name shown in tables and charts.
    fn label(self) -> &'static str;
}

/// One day's amounts in a ledger table, keyed elsewhere by date.
pub trait Ledger: Sized {
    type Category: LedgerCategory;

    /// The name of the database table.
    const TABLE: &'static str;

    fn amount(&self, category: Self::Category) -> i64;

    /// Build a record from a row that has a column per category.
    fn from_row(row: &Row) -> Result<Self, rusqlite::Error>;

    /// The sum of every category.
    fn total(&self) -> i64 {
        Self::Category::ALL
            .iter()
            .map(|&category| self.amount(category))
            .sum()
    }
}

/// The sources of income recorded each day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IncomeCategory {
    JalgaonMemo,
    JalgaonLuggage,
    DhuleMemo,
    ManmohanMemo,
    NashikLuggage,
    Rokadi,
    ReturnTicket,
    LabPayment,
    Difference,
}

impl LedgerCategory for IncomeCategory {
    const ALL: &'static [Self] = &[
        Self::JalgaonMemo,
        Self::JalgaonLuggage,
        Self::DhuleMemo,
        Self::ManmohanMemo,
        Self::NashikLuggage,
        Self::Rokadi,
        Self::ReturnTicket,
        Self::LabPayment,
        Self::Difference,
    ];

    fn column(self) -> &'static str {
        match self {
            Self::JalgaonMemo => "jalgaon_memo",
            Self::JalgaonLuggage => "jalgaon_luggage",
            Self::DhuleMemo => "dhule_memo",
            Self::ManmohanMemo => "manmohan_memo",
            Self::NashikLuggage => "nashik_luggage",
            Self::Rokadi => "rokadi",
            Self::ReturnTicket => "return_ticket",
            Self::LabPayment => "lab_payment",
            Self::Difference => "difference",
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::JalgaonMemo => "Jalgaon memo",
            Self::JalgaonLuggage => "Jalgaon luggage",
            Self::DhuleMemo => "Dhule office memo",
            Self::ManmohanMemo => "Manmohan memo",
            Self::NashikLuggage => "Nashik office luggage",
            Self::Rokadi => "Rokadi",
            Self::ReturnTicket => "Return ticket payment",
            Self::LabPayment => "Lab payment",
            Self::Difference => "Difference amount of payment",
        }
    }
}

/// The kinds of spending recorded each day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExpenseCategory {
    Advance,
    Diesel,
    OtherExpenses,
    Maintenance,
    ChartCommission,
    DriversSalary,
    CleanerSalary,
    HinduzaFinance,
    RoadTax,
    Gprs,
    BedsheetWashing,
    JayAmbe,
    Pigmi,
    StaffPayment,
}

impl LedgerCategory for ExpenseCategory {
    const ALL: &'static [Self] = &[
        Self::Advance,
        Self::Diesel,
        Self::OtherExpenses,
        Self::Maintenance,
        Self::ChartCommission,
        Self::DriversSalary,
        Self::CleanerSalary,
        Self::HinduzaFinance,
        Self::RoadTax,
        Self::Gprs,
        Self::BedsheetWashing,
        Self::JayAmbe,
        Self::Pigmi,
        Self::StaffPayment,
    ];

    fn column(self) -> &'static str {
        match self {
            Self::Advance => "advance",
            Self::Diesel => "diesel",
            Self::OtherExpenses => "other_expenses",
            Self::Maintenance => "maintenance",
            Self::ChartCommission => "chart_commission",
            Self::DriversSalary => "drivers_salary",
            Self::CleanerSalary => "cleaner_salary",
            Self::HinduzaFinance => "hinduza_finance",
            Self::RoadTax => "road_tax",
            Self::Gprs => "gprs",
            Self::BedsheetWashing => "bedsheet_washing",
            Self::JayAmbe => "jay_ambe",
            Self::Pigmi => "pigmi",
            Self::StaffPayment => "staff_payment",
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Advance => "Advance",
            Self::Diesel => "Diesel",
            Self::OtherExpenses => "Other expenses",
            Self::Maintenance => "Maintenance",
            Self::ChartCommission => "Chart commission",
            Self::DriversSalary => "Drivers payment",
            Self::CleanerSalary => "Cleaner payment",
            Self::HinduzaFinance => "Hinduza finance",
            Self::RoadTax => "Road tax",
            Self::Gprs => "GPRS",
            Self::BedsheetWashing => "Bed sheet washing",
            Self::JayAmbe => "Jay Ambe",
            Self::Pigmi => "Pigmi",
            Self::StaffPayment => "Staff payment",
        }
    }
}

/// A day's income, in whole rupees.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IncomeRecord {
    pub jalgaon_memo: i64,
    pub jalgaon_luggage: i64,
    pub dhule_memo: i64,
    pub manmohan_memo: i64,
    pub nashik_luggage: i64,
    pub rokadi: i64,
    pub return_ticket: i64,
    pub lab_payment: i64,
    pub difference: i64,
}

impl Ledger for IncomeRecord {
    type Category = IncomeCategory;

    const TABLE: &'static str = "income";

    fn amount(&self, category: IncomeCategory) -> i64 {
        match category {
            IncomeCategory::JalgaonMemo => self.jalgaon_memo,
            IncomeCategory::JalgaonLuggage => self.jalgaon_luggage,
            IncomeCategory::DhuleMemo => self.dhule_memo,
            IncomeCategory::ManmohanMemo => self.manmohan_memo,
            IncomeCategory::NashikLuggage => self.nashik_luggage,
            IncomeCategory::Rokadi => self.rokadi,
            IncomeCategory::ReturnTicket => self.return_ticket,
            IncomeCategory::LabPayment => self.lab_payment,
            IncomeCategory::Difference => self.difference,
        }
    }

    fn from_row(row: &Row) -> Result<Self, rusqlite::Error> {
        Ok(Self {
            jalgaon_memo: row.get("jalgaon_memo")?,
            jalgaon_luggage: row.get("jalgaon_luggage")?,
            dhule_memo: row.get("dhule_memo")?,
            manmohan_memo: row.get("manmohan_memo")?,
            nashik_luggage: row.get("nashik_luggage")?,
            rokadi: row.get("rokadi")?,
            return_ticket: row.get("return_ticket")?,
            lab_payment: row.get("lab_payment")?,
            difference: row.get("difference")?,
        })
    }
}

/// A day's expenses, in whole rupees.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExpenseRecord {
    pub advance: i64,
    pub diesel: i64,
    pub other_expenses: i64,
    pub maintenance: i64,
    pub chart_commission: i64,
    pub drivers_salary: i64,
    pub cleaner_salary: i64,
    pub hinduza_finance: i64,
    pub road_tax: i64,
    pub gprs: i64,
    pub bedsheet_washing: i64,
    pub jay_ambe: i64,
    pub pigmi: i64,
    pub staff_payment: i64,
}

impl Ledger for ExpenseRecord {
    type Category = ExpenseCategory;

    const TABLE: &'static str = "expenses";

    fn amount(&self, category: ExpenseCategory) -> i64 {
        match category {
            ExpenseCategory::Advance => self.advance,
            ExpenseCategory::Diesel => self.diesel,
            ExpenseCategory::OtherExpenses => self.other_expenses,
            ExpenseCategory::Maintenance => self.maintenance,
            ExpenseCategory::ChartCommission => self.chart_commission,
            ExpenseCategory::DriversSalary => self.drivers_salary,
            ExpenseCategory::CleanerSalary => self.cleaner_salary,
            ExpenseCategory::HinduzaFinance => self.hinduza_finance,
            ExpenseCategory::RoadTax => self.road_tax,
            ExpenseCategory::Gprs => self.gprs,
            ExpenseCategory::BedsheetWashing => self.bedsheet_washing,
            ExpenseCategory::JayAmbe => self.jay_ambe,
            ExpenseCategory::Pigmi => self.pigmi,
            ExpenseCategory::StaffPayment => self.staff_payment,
        }
    }

    fn from_row(row: &Row) -> Result<Self, rusqlite::Error> {
        Ok(Self {
            advance: row.get("advance")?,
            diesel: row.get("diesel")?,
            other_expenses: row.get("other_expenses")?,
            maintenance: row.get("maintenance")?,
            chart_commission: row.get("chart_commission")?,
            drivers_salary: row.get("drivers_salary")?,
            cleaner_salary: row.get("cleaner_salary")?,
            hinduza_finance: row.get("hinduza_finance")?,
            road_tax: row.get("road_tax")?,
            gprs: row.get("gprs")?,
            bedsheet_washing: row.get("bedsheet_washing")?,
            jay_ambe: row.get("jay_ambe")?,
            pigmi: row.get("pigmi")?,
            staff_payment: row.get("staff_payment")?,
        })
    }
}

/// Everything recorded for one day: the unit that is created, edited and deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailyRecord {
    pub date: Date,
    pub income: IncomeRecord,
    pub expenses: ExpenseRecord,
}

impl DailyRecord {
    /// A record for `date` with every amount set to zero.
    pub fn empty(date: Date) -> Self {
        Self {
            date,
            income: IncomeRecord::default(),
            expenses: ExpenseRecord::default(),
        }
    }
}

/// The largest amount, in rupees, accepted for one category on one day.
///
/// Summing every category over a month stays far below `i64::MAX`.
pub const MAX_AMOUNT: i64 = 1_000_000_000_000;

fn check_amounts<L: Ledger>(record: &L) -> Result<(), Error> {
    match L::Category::ALL
        .iter()
        .find(|&&category| !(0..=MAX_AMOUNT).contains(&record.amount(category)))
    {
        Some(&category) => Err(Error::AmountOutOfRange {
            category: category.label(),
            amount: record.amount(category),
        }),
        None => Ok(()),
    }
}

/// Parse a date taken from a URL path, e.g. "2023-03-15".
///
/// # Errors
///
/// Returns [Error::NotFound] if `raw` is not a valid date, since no record can
/// exist for it.
pub fn parse_date_key(raw: &str) -> Result<Date, Error> {
    Date::parse(raw, format_description!("[year]-[month]-[day]")).map_err(|error| {
        tracing::debug!("could not parse record date {raw:?}: {error}");
        Error::NotFound
    })
}

fn value_columns<L: Ledger>() -> impl Iterator<Item = &'static str> {
    L::Category::ALL.iter().map(|category| category.column())
}

fn amounts<L: Ledger>(record: &L) -> impl Iterator<Item = Value> + '_ {
    L::Category::ALL
        .iter()
        .map(|&category| Value::Integer(record.amount(category)))
}

/// Create the table for the ledger `L`.
///
/// `references` names the table whose `date` every row must match, if any.
fn create_ledger_table<L: Ledger>(
    connection: &Connection,
    references: Option<&str>,
) -> Result<(), rusqlite::Error> {
    let foreign_key = references
        .map(|table| format!(" REFERENCES {table}(date) ON DELETE CASCADE ON UPDATE CASCADE"))
        .unwrap_or_default();
    let columns = value_columns::<L>()
        .map(|column| format!("{column} INTEGER NOT NULL DEFAULT 0"))
        .collect::<Vec<_>>()
        .join(",\n");

    connection.execute(
        &format!(
            "CREATE TABLE IF NOT EXISTS {} (
                date TEXT PRIMARY KEY{foreign_key},
                {columns}
            )",
            L::TABLE
        ),
        (),
    )?;

    Ok(())
}

/// Create the `income` and `expenses` tables.
///
/// # Errors
///
/// This function will return an error if the SQL query failed.
pub fn create_record_tables(connection: &Connection) -> Result<(), rusqlite::Error> {
    create_ledger_table::<IncomeRecord>(connection, None)?;
    create_ledger_table::<ExpenseRecord>(connection, Some(IncomeRecord::TABLE))?;

    Ok(())
}

/// Check that the ledger table for `L` has exactly one value column per category.
///
/// # Errors
///
/// Returns [Error::SchemaMismatch] if the counts differ, so that columns are
/// never shown under the wrong label.
pub fn verify_column_count<L: Ledger>(connection: &Connection) -> Result<(), Error> {
    let statement = connection.prepare(&format!("SELECT * FROM {} LIMIT 0", L::TABLE))?;
    // Every column except the date key holds an amount.
    let got = statement.column_count().saturating_sub(1);
    let want = L::Category::ALL.len();

    if got != want {
        tracing::error!(
            "table \"{}\" has {got} value columns, expected {want}",
            L::TABLE
        );
        return Err(Error::SchemaMismatch {
            table: L::TABLE,
            want,
            got,
        });
    }

    Ok(())
}

fn insert<L: Ledger>(
    transaction: &Transaction,
    date: Date,
    record: &L,
) -> Result<(), rusqlite::Error> {
    let columns = value_columns::<L>().collect::<Vec<_>>();
    let placeholders = (2..=columns.len() + 1)
        .map(|index| format!("?{index}"))
        .collect::<Vec<_>>()
        .join(", ");
    let params = std::iter::once(Value::Text(date.to_string())).chain(amounts(record));

    transaction.execute(
        &format!(
            "INSERT INTO {} (date, {}) VALUES (?1, {placeholders})",
            L::TABLE,
            columns.join(", ")
        ),
        params_from_iter(params),
    )?;

    Ok(())
}

/// Overwrite every amount of the row for `date`, returning the number of rows changed.
fn update<L: Ledger>(
    transaction: &Transaction,
    date: Date,
    record: &L,
) -> Result<usize, rusqlite::Error> {
    let assignments = value_columns::<L>()
        .enumerate()
        .map(|(index, column)| format!("{column} = ?{}", index + 2))
        .collect::<Vec<_>>()
        .join(", ");
    let params = std::iter::once(Value::Text(date.to_string())).chain(amounts(record));

    transaction.execute(
        &format!("UPDATE {} SET {assignments} WHERE date = ?1", L::TABLE),
        params_from_iter(params),
    )
}

/// Get the row of the ledger `L` for `date`.
///
/// # Errors
///
/// Returns [Error::NotFound] if there is no row for `date`.
pub fn get_ledger_row<L: Ledger>(date: Date, connection: &Connection) -> Result<L, Error> {
    connection
        .prepare(&format!("SELECT * FROM {} WHERE date = ?1", L::TABLE))?
        .query_row([date], |row| L::from_row(row))
        .map_err(Error::from)
}

fn is_duplicate_key(error: &rusqlite::Error) -> bool {
    // 1555 is a PRIMARY KEY constraint failure, 2067 a UNIQUE constraint failure.
    matches!(
        error,
        rusqlite::Error::SqliteFailure(sql_error, _)
            if sql_error.extended_code == 1555 || sql_error.extended_code == 2067
    )
}

/// Insert the income and expense rows of `record` in one transaction.
///
/// # Errors
///
/// Returns:
/// - [Error::AmountOutOfRange] if an amount is negative or above [MAX_AMOUNT],
/// - [Error::DuplicateDate] if there is already a record for the date,
/// - [Error::SqlError] if another SQL related error occurred.
///
/// Nothing is written if an error is returned.
pub fn create_record(record: &DailyRecord, connection: &Connection) -> Result<(), Error> {
    check_amounts(&record.income)?;
    check_amounts(&record.expenses)?;

    let transaction = connection.unchecked_transaction()?;

    let inserted = insert(&transaction, record.date, &record.income)
        .and_then(|()| insert(&transaction, record.date, &record.expenses));

    match inserted {
        Ok(()) => {}
        Err(error) if is_duplicate_key(&error) => return Err(Error::DuplicateDate(record.date)),
        Err(error) => return Err(error.into()),
    }

    transaction.commit()?;

    Ok(())
}

/// Get the income and expenses recorded for `date`.
///
/// # Errors
///
/// Returns [Error::NotFound] if either row is missing.
pub fn get_record(date: Date, connection: &Connection) -> Result<DailyRecord, Error> {
    Ok(DailyRecord {
        date,
        income: get_ledger_row(date, connection)?,
        expenses: get_ledger_row(date, connection)?,
    })
}

/// Overwrite every amount recorded for `record.date` in one transaction.
///
/// # Errors
///
/// Returns [Error::UpdateMissingRecord] if there is no record for the date,
/// or [Error::AmountOutOfRange] if an amount is negative or above [MAX_AMOUNT].
/// Nothing is written in either case.
pub fn update_record(record: &DailyRecord, connection: &Connection) -> Result<(), Error> {
    check_amounts(&record.income)?;
    check_amounts(&record.expenses)?;

    let transaction = connection.unchecked_transaction()?;

    if update(&transaction, record.date, &record.income)? == 0
        || update(&transaction, record.date, &record.expenses)? == 0
    {
        return Err(Error::UpdateMissingRecord(record.date));
    }

    transaction.commit()?;

    Ok(())
}

/// Delete the income and expense rows for `date` in one transaction.
///
/// # Errors
///
/// Returns [Error::DeleteMissingRecord] if there is no record for the date.
/// Deleting the same date twice therefore fails the second time and leaves
/// the other records untouched.
pub fn delete_record(date: Date, connection: &Connection) -> Result<(), Error> {
    let transaction = connection.unchecked_transaction()?;

    transaction.execute(
        &format!("DELETE FROM {} WHERE date = ?1", ExpenseRecord::TABLE),
        [date],
    )?;
    let deleted = transaction.execute(
        &format!("DELETE FROM {} WHERE date = ?1", IncomeRecord::TABLE),
        [date],
    )?;

    if deleted == 0 {
        return Err(Error::DeleteMissingRecord(date));
    }

    transaction.commit()?;

    Ok(())
}
