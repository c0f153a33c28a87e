//! Code for creating the user table, registering users and fetching them from the database.

use std::fmt::Display;

use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};
use unicode_segmentation::UnicodeSegmentation;

use crate::{Error, auth::PasswordHash};

/// A newtype wrapper for integer user IDs.
///
/// This helps disambiguate user IDs from other integers, leading to better compile time
/// errors.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct UserID(i64);

impl UserID {
    /// Create a new user ID.
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// Cast the user ID to a 64 bit integer.
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl Display for UserID {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// The longest name or email address, in characters, that a user can register with.
pub const MAX_FIELD_LENGTH: usize = 100;

/// A non-empty display name of at most [MAX_FIELD_LENGTH] graphemes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserName(String);

impl UserName {
    /// Trim and validate a name entered by a user.
    ///
    /// # Errors
    ///
    /// Returns [Error::InvalidUserName] if the name is empty or too long.
    pub fn new(raw_name: &str) -> Result<Self, Error> {
        let name = raw_name.trim();

        if name.is_empty() {
            return Err(Error::InvalidUserName("Name cannot be empty".to_owned()));
        }

        if name.graphemes(true).count() > MAX_FIELD_LENGTH {
            return Err(Error::InvalidUserName(format!(
                "Name must be at most {MAX_FIELD_LENGTH} characters long"
            )));
        }

        Ok(Self(name.to_owned()))
    }

    /// Create a name without validation, e.g. for names read back from the database.
    pub fn new_unchecked(name: &str) -> Self {
        Self(name.to_owned())
    }
}

impl AsRef<str> for UserName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Display for UserName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// A lower-cased email address used to log in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Email(String);

impl Email {
    /// Trim, lower-case and validate an email address entered by a user.
    ///
    /// Only a basic sanity check is done: the address must have some text on
    /// both sides of a single '@'.
    ///
    /// # Errors
    ///
    /// Returns [Error::InvalidEmail] if the address is malformed or too long.
    pub fn new(raw_email: &str) -> Result<Self, Error> {
        let email = raw_email.trim().to_lowercase();

        if email.chars().count() > MAX_FIELD_LENGTH {
            return Err(Error::InvalidEmail(format!(
                "Email must be at most {MAX_FIELD_LENGTH} characters long"
            )));
        }

        match email.split_once('@') {
            Some((local, domain))
                if !local.is_empty() && !domain.is_empty() && !domain.contains('@') =>
            {
                Ok(Self(email))
            }
            _ => Err(Error::InvalidEmail(format!(
                "\"{}\" is not a valid email address",
                raw_email.trim()
            ))),
        }
    }

    /// Create an email without validation, e.g. for emails read back from the database.
    pub fn new_unchecked(email: &str) -> Self {
        Self(email.to_owned())
    }
}

impl AsRef<str> for Email {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Display for Email {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// A registered user of the application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// The user's ID in the application database.
    pub id: UserID,
    /// The name shown on the user's profile.
    pub name: UserName,
    /// The email the user logs in with, unique across all users.
    pub email: Email,
    /// The user's password hash.
    pub password_hash: PasswordHash,
    /// Whether the user may perform admin-only actions such as deleting records.
    pub is_admin: bool,
}

/// The details needed to register a new user.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: UserName,
    pub email: Email,
    pub password_hash: PasswordHash,
    pub is_admin: bool,
}

/// Create the user table.
///
/// # Errors
///
/// This function will return an error if the SQL query failed.
pub fn create_user_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS user (
                id INTEGER PRIMARY KEY,
                name TEXT NOT NULL,
                email TEXT NOT NULL UNIQUE,
                password TEXT NOT NULL,
                is_admin INTEGER NOT NULL DEFAULT 0
                )",
        (),
    )?;

    Ok(())
}

/// Create and insert a new user into the database.
///
/// # Errors
///
/// Returns:
/// - [Error::DuplicateEmail] if a user with the same email already exists,
/// - [Error::SqlError] if another SQL related error occurred.
pub fn create_user(new_user: NewUser, connection: &Connection) -> Result<User, Error> {
    connection.execute(
        "INSERT INTO user (name, email, password, is_admin) VALUES (?1, ?2, ?3, ?4)",
        (
            new_user.name.as_ref(),
            new_user.email.as_ref(),
            new_user.password_hash.to_string(),
            new_user.is_admin,
        ),
    )?;

    let id = UserID::new(connection.last_insert_rowid());

    Ok(User {
        id,
        name: new_user.name,
        email: new_user.email,
        password_hash: new_user.password_hash,
        is_admin: new_user.is_admin,
    })
}

fn map_user_row(row: &Row) -> Result<User, rusqlite::Error> {
    let raw_name: String = row.get("name")?;
    let raw_email: String = row.get("email")?;
    let raw_password_hash: String = row.get("password")?;

    Ok(User {
        id: UserID::new(row.get("id")?),
        name: UserName::new_unchecked(&raw_name),
        email: Email::new_unchecked(&raw_email),
        password_hash: PasswordHash::new_unchecked(&raw_password_hash),
        is_admin: row.get("is_admin")?,
    })
}

/// Get the user from the database with an ID equal to `user_id`.
///
/// # Errors
///
/// This function will return an error if:
/// - `user_id` does not belong to a registered user ([Error::NotFound]).
/// - there was an error trying to access the database.
pub fn get_user_by_id(user_id: UserID, connection: &Connection) -> Result<User, Error> {
    connection
        .prepare("SELECT id, name, email, password, is_admin FROM user WHERE id = :id")?
        .query_row(&[(":id", &user_id.as_i64())], map_user_row)
        .map_err(|error| error.into())
}

/// Get the user that registered with `email`.
///
/// # Errors
///
/// This function will return an error if:
/// - no user registered with `email` ([Error::NotFound]).
/// - there was an error trying to access the database.
pub fn get_user_by_email(email: &Email, connection: &Connection) -> Result<User, Error> {
    connection
        .prepare("SELECT id, name, email, password, is_admin FROM user WHERE email = :email")?
        .query_row(&[(":email", email.as_ref())], map_user_row)
        .map_err(|error| error.into())
}
