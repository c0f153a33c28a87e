use std::error::Error;
use std::path::Path;
use std::process::exit;

use clap::Parser;
use rusqlite::Connection;
use time::{Date, Duration, OffsetDateTime};

use daybook::{
    DailyRecord, Email, ExpenseRecord, IncomeRecord, NewUser, PasswordHash, UserName,
    ValidatedPassword, create_record, create_user, initialize_db,
};

/// A utility for creating a test database for the daybook server.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to save the SQLite database to.
    #[arg(long, short)]
    output_path: String,
}

/// The number of days of sample records, ending today.
const SAMPLE_DAYS: i64 = 31;

/// Create and populate a database for manual testing.
fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let output_path = Path::new(&args.output_path);

    if output_path.extension().is_none_or(|extension| extension.is_empty()) {
        eprintln!("Output path must include a file extension (e.g., 'daybook.db').");
        exit(1);
    }

    if output_path.is_file() {
        eprintln!("File already exists at {output_path:?}!");
        exit(1);
    }

    println!("Creating database at {output_path:?}");
    let conn = Connection::open(output_path)?;

    initialize_db(&conn)?;

    println!("Creating admin user test@example.com with the password 'test'...");

    let password_hash = PasswordHash::new(
        ValidatedPassword::new_unchecked("test"),
        PasswordHash::DEFAULT_COST,
    )?;

    create_user(
        NewUser {
            name: UserName::new_unchecked("Test"),
            email: Email::new_unchecked("test@example.com"),
            password_hash,
            is_admin: true,
        },
        &conn,
    )?;

    println!("Creating {SAMPLE_DAYS} days of records...");

    let today = OffsetDateTime::now_utc().date();
    for days_ago in (0..SAMPLE_DAYS).rev() {
        let date = today - Duration::days(days_ago);
        create_record(&sample_record(date), &conn)?;
    }

    println!("Success!");

    Ok(())
}

/// Plausible amounts that vary from day to day.
fn sample_record(date: Date) -> DailyRecord {
    let day = i64::from(date.day());
    let weekday = i64::from(date.weekday().number_from_monday());

    DailyRecord {
        date,
        income: IncomeRecord {
            jalgaon_memo: 4_000 + day * 150,
            jalgaon_luggage: 800 + weekday * 40,
            dhule_memo: 2_500 + (day % 7) * 100,
            manmohan_memo: 1_200,
            nashik_luggage: 600 + weekday * 25,
            rokadi: 3_000 + (day % 5) * 250,
            return_ticket: if weekday >= 6 { 900 } else { 400 },
            lab_payment: if day % 10 == 0 { 1_500 } else { 0 },
            difference: day % 3 * 10,
        },
        expenses: ExpenseRecord {
            advance: if day % 4 == 0 { 1_000 } else { 0 },
            diesel: 3_500 + weekday * 100,
            other_expenses: 200 + (day % 6) * 50,
            maintenance: if day % 14 == 0 { 2_800 } else { 0 },
            chart_commission: 300,
            drivers_salary: if day == 1 { 18_000 } else { 0 },
            cleaner_salary: if day == 1 { 9_000 } else { 0 },
            hinduza_finance: if day == 5 { 22_500 } else { 0 },
            road_tax: if day == 10 { 6_000 } else { 0 },
            gprs: if day == 1 { 350 } else { 0 },
            bedsheet_washing: 120,
            jay_ambe: 150,
            pigmi: 100,
            staff_payment: if weekday == 7 { 1_200 } else { 0 },
        },
    }
}
