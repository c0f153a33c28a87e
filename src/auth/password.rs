//! Password strength checks and bcrypt hashing.
//!
//! A raw password becomes a [ValidatedPassword] once it passes the strength
//! check, and a [PasswordHash] once it has been salted and hashed for storage.

use std::fmt::Display;

use bcrypt::{hash, verify};
use serde::{Deserialize, Serialize};
use zxcvbn::{Score, feedback::Feedback, zxcvbn};

use crate::Error;

/// A password that is strong enough to be stored, but has not been hashed yet.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedPassword(String);

impl ValidatedPassword {
    /// Check that `raw_password` is hard to guess.
    ///
    /// `user_inputs` are words the user has already given us, e.g. their name
    /// and email, which make a password weaker if it contains them.
    ///
    /// # Errors
    ///
    /// Returns [Error::TooWeak] with a hint for making the password stronger
    /// if it scores below three out of four.
    pub fn new(raw_password: &str, user_inputs: &[&str]) -> Result<Self, Error> {
        let analysis = zxcvbn(raw_password, user_inputs);

        if matches!(analysis.score(), Score::Three | Score::Four) {
            return Ok(Self(raw_password.to_owned()));
        }

        let feedback = analysis
            .feedback()
            .map(ToString::to_string)
            .unwrap_or_else(|| Feedback::default().to_string());

        Err(Error::TooWeak(feedback))
    }

    /// Wrap `raw_password` without checking its strength.
    ///
    /// Only for passwords that have been checked elsewhere, or for tests.
    pub fn new_unchecked(raw_password: &str) -> Self {
        Self(raw_password.to_owned())
    }
}

// Never print the password itself.
impl Display for ValidatedPassword {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("********")
    }
}

/// A bcrypt hash of a [ValidatedPassword], as stored in the user table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PasswordHash(String);

impl PasswordHash {
    /// The bcrypt cost used for passwords entered through the web app.
    pub const DEFAULT_COST: u32 = bcrypt::DEFAULT_COST;

    /// Salt and hash `password` with `cost` rounds.
    ///
    /// # Errors
    ///
    /// Returns [Error::HashingError] if bcrypt rejects the cost or fails internally.
    pub fn new(password: ValidatedPassword, cost: u32) -> Result<Self, Error> {
        hash(&password.0, cost)
            .map(Self)
            .map_err(|error| Error::HashingError(error.to_string()))
    }

    /// Wrap an existing hash, e.g. one read back from the database.
    pub fn new_unchecked(raw_password_hash: &str) -> Self {
        Self(raw_password_hash.to_owned())
    }

    /// Check that `raw_password` matches this hash.
    ///
    /// # Errors
    ///
    /// Returns [Error::HashingError] if the stored hash is malformed.
    pub fn verify(&self, raw_password: &str) -> Result<bool, Error> {
        verify(raw_password, &self.0).map_err(|error| Error::HashingError(error.to_string()))
    }
}

impl Display for PasswordHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use crate::Error;

    use super::{PasswordHash, ValidatedPassword};

    #[test]
    fn empty_password_is_too_weak() {
        assert!(matches!(
            ValidatedPassword::new("", &[]),
            Err(Error::TooWeak(_))
        ));
    }

    #[test]
    fn common_password_is_too_weak() {
        assert!(matches!(
            ValidatedPassword::new("password1234", &[]),
            Err(Error::TooWeak(_))
        ));
    }

    #[test]
    fn password_made_of_user_details_is_too_weak() {
        let result = ValidatedPassword::new(
            "sunilpatil1985",
            &["Sunil Patil", "sunilpatil1985@example.com"],
        );

        assert!(matches!(result, Err(Error::TooWeak(_))));
    }

    #[test]
    fn long_unusual_password_is_accepted() {
        assert!(ValidatedPassword::new("diesel-ledger-jalgaon-nashik-42", &[]).is_ok());
    }

    #[test]
    fn display_hides_password() {
        let password = ValidatedPassword::new_unchecked("hunter2");

        assert_eq!(password.to_string(), "********");
    }

    #[test]
    fn verify_known_hash() {
        let hash = PasswordHash::new_unchecked(
            "$2b$12$Gwf0uvxH3L7JLfo0CC/NCOoijK2vQ/wbgP.LeNup8vj6gg31IiFkm",
        );

        assert!(hash.verify("okon").unwrap());
        assert!(!hash.verify("thewrongpassword").unwrap());
    }

    #[test]
    fn verify_fails_on_malformed_hash() {
        let hash = PasswordHash::new_unchecked("not a bcrypt hash");

        assert!(matches!(hash.verify("okon"), Err(Error::HashingError(_))));
    }

    #[test]
    fn hashes_are_salted() {
        let password = ValidatedPassword::new_unchecked("turkeysgogobblegobble");
        let hash = PasswordHash::new(password.clone(), 4).unwrap();
        let other_hash = PasswordHash::new(password, 4).unwrap();

        assert_ne!(hash, other_hash);
        assert!(hash.verify("turkeysgogobblegobble").unwrap());
        assert!(other_hash.verify("turkeysgogobblegobble").unwrap());
    }
}
