use crate::error::{CoreError, Result};

pub const MAX_TITLE_LEN: usize = 200;
pub const MAX_CATEGORY_LEN: usize = 64;
pub const MAX_TEXT_LEN: usize = 2000;
pub const MAX_LINK_LEN: usize = 2048;
pub const MAX_REASON_LEN: usize = 1000;

/// Trimmed, non-empty, at most `max` characters.
pub fn required(field: &str, value: &str, max: usize) -> Result<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(CoreError::invalid_argument(format!("{} is required", field)));
    }
    if value.chars().count() > max {
        return Err(CoreError::invalid_argument(format!(
            "{} must be at most {} characters",
            field, max
        )));
    }
    Ok(value.to_string())
}

/// Like [`required`], but blank input collapses to `None`.
pub fn optional(field: &str, value: Option<&str>, max: usize) -> Result<Option<String>> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(v) => required(field, v, max).map(Some),
    }
}

/// Absolute http(s) URL without whitespace.
pub fn link(value: &str) -> Result<String> {
    let value = required("Link", value, MAX_LINK_LEN)?;
    let rest = value
        .strip_prefix("https://")
        .or_else(|| value.strip_prefix("http://"))
        .ok_or_else(|| CoreError::invalid_argument("Link must start with http:// or https://"))?;

    if rest.is_empty() || rest.starts_with('/') || value.chars().any(char::is_whitespace) {
        return Err(CoreError::invalid_argument("Link is not a valid URL"));
    }
    Ok(value)
}

pub fn price_cents(value: Option<i64>) -> Result<Option<i64>> {
    match value {
        Some(cents) if cents < 0 => Err(CoreError::invalid_argument("Price cannot be negative")),
        other => Ok(other),
    }
}
