//! Input validation and sanitization helpers for the signup flow.

use chrono::{Datelike, NaiveDate, Utc};

use super::errors::{AuthError, AuthResult};

/// Minimum age accepted at registration, in whole years.
pub const MIN_AGE_YEARS: i32 = 16;

/// Sanitize one string field: trim surrounding whitespace, drop control
/// characters, and neutralize HTML markup so stored values are inert if
/// ever rendered.
pub fn sanitize(input: &str) -> String {
    let trimmed = input.trim();
    let mut out = String::with_capacity(trimmed.len());
    for c in trimmed.chars() {
        if c.is_control() {
            continue;
        }
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Syntactic email check: one `@`, non-empty local part, and a domain with
/// at least one dot and a two-letter-plus final label.
pub fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || local.contains(char::is_whitespace) {
        return false;
    }
    let Some((host, tld)) = domain.rsplit_once('.') else {
        return false;
    };
    if host.is_empty() || tld.len() < 2 {
        return false;
    }
    domain
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-')
}

/// Parse a `YYYY-MM-DD` string into a real calendar date.
pub fn parse_date(value: &str) -> AuthResult<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| AuthError::InvalidDate)
}

/// Whole-year age on `today` for someone born on `dob`.
pub fn age_on(dob: NaiveDate, today: NaiveDate) -> i32 {
    let mut age = today.year() - dob.year();
    if (today.month(), today.day()) < (dob.month(), dob.day()) {
        age -= 1;
    }
    age
}

/// Parse a date of birth and enforce the minimum-age requirement.
pub fn parse_dob(value: &str) -> AuthResult<NaiveDate> {
    let dob = parse_date(value)?;
    if age_on(dob, Utc::now().date_naive()) < MIN_AGE_YEARS {
        return Err(AuthError::Underage);
    }
    Ok(dob)
}
