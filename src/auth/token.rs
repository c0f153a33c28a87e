//! The session token stored, encrypted, in the auth cookie.

use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime, UtcOffset};

use crate::{Error, auth::UserID};

mod datetime_format {
    //! Serializes expiry times with a two digit hour.
    //!
    //! The default [time::OffsetDateTime] serializer writes midnight as
    //! "0:00:00.0", which its own parser then rejects.
    use serde::{Deserialize, Deserializer, Serializer};
    use time::{
        OffsetDateTime, format_description::BorrowedFormatItem, macros::format_description,
    };

    /// e.g. "2021-01-01 00:00:00.0 +05:30:00".
    const TOKEN_DATE_TIME_FORMAT: &[BorrowedFormatItem] = format_description!(
        "[year]-[month]-[day] [hour]:[minute]:[second].[subsecond] [offset_hour \
             sign:mandatory]:[offset_minute]:[offset_second]"
    );

    pub fn serialize<S>(date_time: &OffsetDateTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let text = date_time
            .format(TOKEN_DATE_TIME_FORMAT)
            .map_err(serde::ser::Error::custom)?;
        serializer.serialize_str(&text)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<OffsetDateTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let text = String::deserialize(deserializer)?;
        OffsetDateTime::parse(&text, TOKEN_DATE_TIME_FORMAT).map_err(serde::de::Error::custom)
    }
}

/// Who is logged in and until when.
#[derive(Serialize, Deserialize, Debug, PartialEq, Clone, Copy)]
pub struct Token {
    pub user_id: UserID,

    #[serde(with = "datetime_format")]
    pub expires_at: OffsetDateTime,
}

impl Token {
    /// A token for `user_id` that expires `duration` from now, in the local time `local_offset`.
    pub fn new(user_id: UserID, duration: Duration, local_offset: UtcOffset) -> Self {
        Self {
            user_id,
            expires_at: OffsetDateTime::now_utc().to_offset(local_offset) + duration,
        }
    }

    pub fn is_expired(&self) -> bool {
        self.expires_at <= OffsetDateTime::now_utc()
    }

    /// Serialize the token as the auth cookie's value.
    pub(super) fn to_cookie_value(self) -> Result<String, Error> {
        serde_json::to_string(&self).map_err(|error| {
            tracing::error!("could not serialize auth token: {error}");
            Error::JSONSerializationError(error.to_string())
        })
    }

    /// Parse an auth cookie's value.
    pub(super) fn from_cookie_value(value: &str) -> Result<Self, Error> {
        serde_json::from_str(value).map_err(|error| Error::InvalidToken(error.to_string()))
    }
}
