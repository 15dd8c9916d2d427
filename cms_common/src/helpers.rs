use std::{fmt::Display, str::FromStr};

/// Parse a boolean flag from a string value, or return the given default value otherwise.
pub fn parse_boolean_flag(value: Option<String>, default: bool) -> bool {
    let value = match value {
        Some(v) => v,
        None => return default,
    };
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => true,
        "0" | "false" | "no" | "off" => false,
        _ => default,
    }
}

/// Parse a value from an (optional) environment string. If the value is missing or cannot be parsed, the default is
/// returned, along with the parse error message, if any, so that the caller can decide how loudly to complain.
pub fn parse_env_or_default<T>(value: Option<String>, default: T) -> (T, Option<String>)
where
    T: FromStr,
    T::Err: Display,
{
    match value {
        None => (default, None),
        Some(s) => match s.trim().parse::<T>() {
            Ok(v) => (v, None),
            Err(e) => (default, Some(format!("'{s}' is not valid. {e}"))),
        },
    }
}
