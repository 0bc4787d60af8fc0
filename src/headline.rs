//! New-value rule for the resume headline

/// Appended to the current headline when no override is configured
pub const TERMINATOR: char = '.';

/// What the commit stage should do
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeadlineChange {
    /// The computed value equals the current one; nothing to commit
    Unchanged,
    Replace(String),
}

/// Compute the headline to commit from the current one.
///
/// An override always wins; otherwise the terminator is appended unless the
/// headline already ends with it.
pub fn next_headline(current: &str, override_value: Option<&str>) -> HeadlineChange {
    let next = match override_value {
        Some(value) if !value.is_empty() => value.to_string(),
        _ if current.ends_with(TERMINATOR) => current.to_string(),
        _ => format!("{}{}", current, TERMINATOR),
    };

    if next == current {
        HeadlineChange::Unchanged
    } else {
        HeadlineChange::Replace(next)
    }
}

#[cfg(test)]
#[path = "headline_test.rs"]
mod headline_test;
