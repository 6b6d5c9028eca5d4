//! Redaction helpers for log lines that may carry credentials.
//!
//! A plain text-substitution utility with no shared state with the auth
//! core: field values in `key=value; key=value;` log lines are replaced
//! before the line is emitted.

use regex::Regex;

/// Fields masked by [`scrub`].
pub const SENSITIVE_FIELDS: &[&str] = &["password", "secret", "token"];

const REDACTION: &str = "***";
const SEPARATOR: char = ';';

/// Mask the value of each named `key=value` field in a log message.
#[must_use]
pub fn mask_fields(fields: &[&str], redaction: &str, message: &str, separator: char) -> String {
    let names = fields
        .iter()
        .map(|field| regex::escape(field))
        .collect::<Vec<_>>()
        .join("|");
    let pattern = format!(
        "({names})=[^{separator}]*",
        separator = regex::escape(&separator.to_string())
    );
    match Regex::new(&pattern) {
        Ok(re) => re
            .replace_all(message, format!("${{1}}={redaction}"))
            .into_owned(),
        Err(_) => message.to_string(),
    }
}

/// Mask the default sensitive fields with `***`.
#[must_use]
pub fn scrub(message: &str) -> String {
    mask_fields(SENSITIVE_FIELDS, REDACTION, message, SEPARATOR)
}
