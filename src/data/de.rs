//! Lenient deserializers for the Ergast-style JSON envelope
//!
//! The API encodes every number as a decimal string (`"total": "480"`), while
//! the degraded sentinel payload uses bare numbers. These helpers accept both.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer};
use std::fmt::Display;
use std::str::FromStr;

#[derive(Deserialize)]
#[serde(untagged)]
enum StringOrNumber<T> {
    Number(T),
    Text(String),
}

/// Deserializes a number sent either as a JSON number or a numeric string.
pub fn number<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr + Deserialize<'de> + Default,
    T::Err: Display,
{
    match Option::<StringOrNumber<T>>::deserialize(deserializer)? {
        Some(StringOrNumber::Number(n)) => Ok(n),
        Some(StringOrNumber::Text(s)) if s.trim().is_empty() => Ok(T::default()),
        Some(StringOrNumber::Text(s)) => s.trim().parse().map_err(serde::de::Error::custom),
        None => Ok(T::default()),
    }
}

/// Like [`number`], but empty, null, or non-numeric text becomes `None`.
///
/// Used for fields such as `position` and `grid` where upstream sometimes
/// sends placeholders instead of a value.
pub fn optional_number<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr + Deserialize<'de>,
{
    Ok(
        match Option::<StringOrNumber<T>>::deserialize(deserializer)? {
            Some(StringOrNumber::Number(n)) => Some(n),
            Some(StringOrNumber::Text(s)) => s.trim().parse().ok(),
            None => None,
        },
    )
}

/// Parses a `YYYY-MM-DD` date, mapping anything unparsable to `None`.
pub fn optional_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.and_then(|s| NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok()))
}
