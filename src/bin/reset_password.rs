use std::{error::Error, io, path::Path, process::exit};

use clap::Parser;
use rusqlite::Connection;

use daybook::{Email, PasswordHash, User, ValidatedPassword, get_user_by_email};

/// A utility for changing the password of a registered user.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to the application SQLite database.
    #[arg(long)]
    db_path: String,

    /// The email the user logs in with.
    #[arg(long)]
    email: String,
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    let db_path = Path::new(&args.db_path);

    if let Err(message) = check_db_path(db_path) {
        print_error(message);
        exit(1);
    }

    let mut connection = Connection::open(db_path)?;
    let email = Email::new(&args.email)?;
    let user = get_user_by_email(&email, &connection).map_err(|error| {
        format!("Could not load the user with the email {email} from {db_path:?}: {error}")
    })?;

    println!("Resetting password for {} ({})", user.name, user.email);

    let Some(password_hash) = read_new_password(&user) else {
        println!("No password entered, nothing changed.");
        return Ok(());
    };

    set_password(&mut connection, &user, &password_hash)?;
    println!("Password updated successfully!");

    Ok(())
}

fn check_db_path(db_path: &Path) -> Result<(), String> {
    if db_path.extension().is_none_or(|extension| extension.is_empty()) {
        return Err("Database path must include a file extension (e.g., 'daybook.db').".to_owned());
    }

    if !db_path.is_file() {
        return Err(format!("File does not exist at {db_path:?}!"));
    }

    Ok(())
}

/// Read a password without echoing it. `None` means stdin was closed or unreadable.
fn prompt(message: &str) -> Option<String> {
    match rpassword::prompt_password(message) {
        Ok(password) => Some(password),
        Err(error) if error.kind() == io::ErrorKind::UnexpectedEof => None,
        Err(error) => {
            print_error(format!("Could not read password from stdin: {error}"));
            None
        }
    }
}

/// Ask for a strong password twice until both entries match, then hash it.
fn read_new_password(user: &User) -> Option<PasswordHash> {
    let user_inputs = [user.name.as_ref(), user.email.as_ref()];

    loop {
        println!();

        let password = prompt("Enter a new password: ")?;
        let validated_password = match ValidatedPassword::new(&password, &user_inputs) {
            Ok(validated_password) => validated_password,
            Err(error) => {
                print_error(error);
                continue;
            }
        };

        if prompt("Enter the same password again: ")? != password {
            print_error("Passwords must match, try again.");
            continue;
        }

        match PasswordHash::new(validated_password, PasswordHash::DEFAULT_COST) {
            Ok(password_hash) => return Some(password_hash),
            Err(error) => print_error(format!("Could not hash password: {error}. Try again.")),
        }
    }
}

fn print_error(error: impl ToString) {
    let message = error.to_string();
    let mut chars = message.chars();
    let message = match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    };

    eprintln!("\x1b[31;1m{message}\x1b[0m");
}

/// Store `password_hash` for `user`, committing only if exactly one row changed.
fn set_password(
    connection: &mut Connection,
    user: &User,
    password_hash: &PasswordHash,
) -> Result<(), rusqlite::Error> {
    let transaction = connection.transaction()?;

    let rows_affected = transaction.execute(
        "UPDATE user SET password = ?1 WHERE id = ?2",
        (password_hash.to_string(), user.id.as_i64()),
    )?;

    if rows_affected != 1 {
        print_error(format!(
            "Updating password affected {rows_affected} user(s), expected 1. Rolling back..."
        ));
        transaction.rollback()?;
        return Err(rusqlite::Error::StatementChangedRows(rows_affected));
    }

    transaction.commit()
}
