//! Sets up the application's database.

use rusqlite::{Connection, Transaction as SqlTransaction, TransactionBehavior};

use crate::{
    Error,
    auth::create_user_table,
    record::{ExpenseRecord, IncomeRecord, create_record_tables, verify_column_count},
};

/// Create the tables for users and daily records if they do not exist, and
/// check that the record tables line up with the known categories.
///
/// Foreign keys are enabled on `connection` so that deleting a day's income
/// also deletes its expenses.
///
/// # Errors
///
/// Returns [Error::SchemaMismatch] if an existing record table has a different
/// number of amount columns, or [Error::SqlError] if a query fails.
pub fn initialize(connection: &Connection) -> Result<(), Error> {
    connection.pragma_update(None, "foreign_keys", "ON")?;

    let transaction = SqlTransaction::new_unchecked(connection, TransactionBehavior::Exclusive)?;

    create_user_table(&transaction)?;
    create_record_tables(&transaction)?;

    transaction.commit()?;

    verify_column_count::<IncomeRecord>(connection)?;
    verify_column_count::<ExpenseRecord>(connection)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use rusqlite::Connection;

    use crate::{Error, db::initialize};

    #[test]
    fn initialize_is_idempotent() {
        let connection = Connection::open_in_memory().unwrap();

        initialize(&connection).unwrap();

        assert_eq!(initialize(&connection), Ok(()));
    }

    #[test]
    fn initialize_enables_foreign_keys() {
        let connection = Connection::open_in_memory().unwrap();

        initialize(&connection).unwrap();

        let enabled: i64 = connection
            .pragma_query_value(None, "foreign_keys", |row| row.get(0))
            .unwrap();
        assert_eq!(enabled, 1);
    }

    #[test]
    fn initialize_rejects_foreign_expense_table() {
        let connection = Connection::open_in_memory().unwrap();
        connection
            .execute(
                "CREATE TABLE expenses (date TEXT PRIMARY KEY, diesel INTEGER)",
                (),
            )
            .unwrap();

        let result = initialize(&connection);

        assert_eq!(
            result,
            Err(Error::SchemaMismatch {
                table: "expenses",
                want: 14,
                got: 1
            })
        );
    }
}
