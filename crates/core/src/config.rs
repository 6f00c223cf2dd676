//! Environment variable helpers for the `from_env` constructors.

use std::str::FromStr;

use crate::error::CoreError;

/// Read `key` from the environment, falling back to `default` when unset.
///
/// A set-but-unparsable value is an error rather than a silent fallback.
pub fn env_or<T>(key: &'static str, default: T) -> Result<T, CoreError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => parse_value(key, &raw),
        Err(_) => Ok(default),
    }
}

/// Parse a raw configuration value for `key`.
pub fn parse_value<T>(key: &'static str, raw: &str) -> Result<T, CoreError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim().parse().map_err(|e: T::Err| CoreError::Config {
        key,
        message: format!("cannot parse {raw:?}: {e}"),
    })
}
