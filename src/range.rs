//! Version range checks over raw version strings.
//!
//! Every argument is parsed before a verdict is returned, so a malformed bound
//! fails even when the other bound alone would decide the answer.

use crate::version::{ParseError, Version};

/// Returns `true` if `subject` is strictly older than `upper_exclusive`.
pub fn is_older_than(subject: &str, upper_exclusive: &str) -> Result<bool, ParseError> {
    let current = Version::from_str(subject)?;
    let upper = Version::from_str(upper_exclusive)?;

    Ok(current.is_older_than(&upper))
}

/// Returns `true` if `subject` lies in `[lower_inclusive, upper_exclusive)`.
pub fn is_between(subject: &str, lower_inclusive: &str, upper_exclusive: &str) -> Result<bool, ParseError> {
    let current = Version::from_str(subject)?;
    let lower = Version::from_str(lower_inclusive)?;
    let older = is_older_than(subject, upper_exclusive)?;

    Ok(current >= lower && older)
}
